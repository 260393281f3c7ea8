use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Internal identifier of a meeting participant.
pub type UserId = i64;

/// Recipient id -> Kakao access token.
///
/// Built by the meeting service from participants who granted messaging
/// consent and still hold a valid token. Dispatch treats it as read-only;
/// the map size is the batch's `total_count`.
pub type RecipientTokens = BTreeMap<UserId, String>;

/// Message content shared by every send of one dispatch call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplatePayload {
    /// Display name of the inviting participant.
    pub inviter: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Pre-formatted date/time text.
    pub date: String,
    pub place: String,
    /// Detail page for the meeting, rendered as the template link when set.
    #[serde(default)]
    pub meeting_url: Option<String>,
}

/// Dispatch request published by the meeting service once the meeting
/// transaction has committed (participants are only visible after commit).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchRequest {
    pub meeting_id: i64,
    #[serde(default)]
    pub recipients: RecipientTokens,
    pub template: TemplatePayload,
}
