//! NATS subject helpers for the notification bus.

use std::borrow::Cow;

/// Normalizes identifiers to be subject-safe (replace spaces, trim).
fn norm<S: AsRef<str>>(s: S) -> Cow<'static, str> {
    let mut t = s
        .as_ref()
        .trim()
        .replace([' ', '\t', '\n', '\r', '*', '>', '/'], "-");
    if t.is_empty() {
        t = "unknown".into();
    }
    Cow::Owned(t)
}

/// Dispatch requests published by the meeting service after commit, consumed
/// by the kakao egress worker.
///
/// ```
/// use pn_core::notify_subject;
///
/// assert_eq!(notify_subject("acme"), "promise.notify.out.acme.kakao");
/// assert_eq!(notify_subject("two words"), "promise.notify.out.two-words.kakao");
/// ```
pub fn notify_subject(tenant: &str) -> String {
    format!("promise.notify.out.{}.kakao", norm(tenant))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tenant_becomes_unknown() {
        assert_eq!(notify_subject("  "), "promise.notify.out.unknown.kakao");
    }

    #[test]
    fn wildcards_are_stripped() {
        assert_eq!(notify_subject("a>b*c"), "promise.notify.out.a-b-c.kakao");
    }
}
