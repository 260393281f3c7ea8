//! Kakao egress worker. Consumes meeting-created dispatch requests from the
//! bus and delivers invitation memos to each recipient's "to me" channel.

mod sender;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_nats::Client as Nats;
use futures::StreamExt;
use pn_core::{DispatchRequest, DispatchResult, dispatch, notify_subject};

use crate::sender::KakaoMemoSender;

#[derive(Clone)]
struct AppConfig {
    tenant: String,
    api_base: String,
    memo_path: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    pn_telemetry::install("egress-kakao");

    let nats_url = std::env::var("NATS_URL").unwrap_or_else(|_| "nats://127.0.0.1:4222".into());
    let tenant = std::env::var("TENANT").unwrap_or_else(|_| "acme".into());
    let api_base =
        std::env::var("KAKAO_API_BASE").unwrap_or_else(|_| "https://kapi.kakao.com".into());
    let memo_path = std::env::var("KAKAO_MEMO_PATH")
        .unwrap_or_else(|_| "/v2/api/talk/memo/default/send".into());

    let config = AppConfig {
        tenant,
        api_base,
        memo_path,
    };

    let nats = async_nats::connect(nats_url).await?;
    run(nats, config).await
}

async fn run(nats: Nats, config: AppConfig) -> Result<()> {
    let subject = notify_subject(&config.tenant);
    let mut sub = nats.subscribe(subject.clone()).await?;
    tracing::info!("egress-kakao subscribed to {subject}");

    // The client's timeouts bound how long one recipient can hold up a
    // batch; a timed-out call is a single failed outcome.
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(10))
        .build()?;
    let sender = Arc::new(KakaoMemoSender::new(http, config.api_base, config.memo_path));

    while let Some(msg) = sub.next().await {
        let request: DispatchRequest = match serde_json::from_slice(&msg.payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("bad dispatch request: {e}");
                let result = DispatchResult::failure(0, format!("bad dispatch request: {e}"));
                publish_result(&nats, msg.reply, &result).await;
                continue;
            }
        };

        let sender = sender.clone();
        let nats = nats.clone();
        let tenant = config.tenant.clone();
        let reply = msg.reply;
        tokio::spawn(async move {
            let result = handle_request(sender.as_ref(), &tenant, &request).await;
            publish_result(&nats, reply, &result).await;
        });
    }

    Ok(())
}

async fn handle_request(
    sender: &KakaoMemoSender,
    tenant: &str,
    request: &DispatchRequest,
) -> DispatchResult {
    let result = dispatch(sender, &request.recipients, &request.template).await;

    metrics::counter!("notifications_dispatched", "tenant" => tenant.to_string())
        .increment(result.sent_count as u64);
    let failed = result.total_count - result.sent_count;
    if failed > 0 {
        metrics::counter!("memo_send_failures", "tenant" => tenant.to_string())
            .increment(failed as u64);
    }

    tracing::info!(
        meeting_id = request.meeting_id,
        sent = result.sent_count,
        total = result.total_count,
        partial = result.is_partial_success(),
        "dispatch complete"
    );
    result
}

/// Replies with the serialized result when the request carried a reply
/// subject; the meeting service uses it for auditing.
async fn publish_result(nats: &Nats, reply: Option<async_nats::Subject>, result: &DispatchResult) {
    let Some(reply) = reply else { return };
    let payload = serde_json::to_vec(result).unwrap_or_else(|_| b"{}".to_vec());
    if let Err(e) = nats.publish(reply, payload.into()).await {
        tracing::warn!("failed to publish dispatch result: {e}");
    }
}
