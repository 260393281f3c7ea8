//! Renders a meeting invitation into the Kakao text-template payload.
//!
//! The memo API takes a `template_object` form field whose value is a JSON
//! string of shape `{"object_type":"text","text":...,"link"?:{...}}`. The
//! renderer is pure and permissive: missing optional fields simply drop their
//! line (or the whole `link` object).

use serde_json::{Value, json};

use crate::types::TemplatePayload;

/// Builds the Kakao template object for one dispatch call.
///
/// ```
/// use pn_core::{TemplatePayload, render_template};
///
/// let template = render_template(&TemplatePayload {
///     inviter: "Alice".into(),
///     title: None,
///     date: "2025-08-20 14:00".into(),
///     place: "Gangnam Station".into(),
///     meeting_url: None,
/// });
/// assert_eq!(template["object_type"], "text");
/// assert!(template.get("link").is_none());
/// ```
pub fn render_template(payload: &TemplatePayload) -> Value {
    let mut text = format!("🎉 {}님의 약속 초대\n\n", payload.inviter);
    if let Some(title) = trimmed(&payload.title) {
        text.push_str(&format!("📋 {title}\n"));
    }
    text.push_str(&format!("🕒 {}\n", payload.date));
    text.push_str(&format!("📍 {}\n\n", payload.place));
    text.push_str("약속 준비 완료! 😊");

    let mut template = json!({
        "object_type": "text",
        "text": text,
    });
    if let Some(url) = trimmed(&payload.meeting_url) {
        template.as_object_mut().unwrap().insert(
            "link".into(),
            json!({ "web_url": url, "mobile_web_url": url }),
        );
    }
    template
}

/// Serializes a rendered template to the wire string.
///
/// Falls back to an empty object on encoding errors: a malformed template
/// must not abort the batch, the provider rejects it per recipient instead.
pub fn encode_template(template: &Value) -> String {
    serde_json::to_string(template).unwrap_or_else(|_| "{}".into())
}

fn trimmed(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
