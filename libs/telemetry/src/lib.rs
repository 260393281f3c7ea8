//! Tracing setup shared by the promise notification binaries.
//!
//! Keeps the subscriber wiring in one place so every worker logs the same
//! way: fmt output filtered by `RUST_LOG` (info by default), switchable to
//! JSON lines for log shippers via `PN_JSON_LOGS=1`.

use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Safe to call more than once; later calls
/// keep the first subscriber.
pub fn install(service_name: &str) {
    let fmt_layer = if json_logs() {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok();

    tracing::debug!(service = service_name, "telemetry installed");
}

fn json_logs() -> bool {
    std::env::var("PN_JSON_LOGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent() {
        install("test-service");
        install("test-service");
    }
}
