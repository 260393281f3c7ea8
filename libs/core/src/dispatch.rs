//! Batch dispatch of invitation memos with per-recipient failure isolation.
//!
//! One dispatch call covers one recipient set and one shared message. Sends
//! run sequentially in map order; a failed recipient is logged and counted,
//! never propagated, so the remaining recipients are always attempted. The
//! caller gets a [`DispatchResult`] back, not an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::template::{encode_template, render_template};
use crate::types::{RecipientTokens, TemplatePayload, UserId};

/// Failure of a single memo send attempt.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("kakao transport error: {0}")]
    Transport(String),
    #[error("kakao api status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Sends one `template_object` to the "to me" channel of the account behind
/// an access token. Each recipient's own token scopes the destination, so no
/// receiver list is needed.
#[async_trait]
pub trait MemoSender: Send + Sync {
    async fn send_memo(
        &self,
        access_token: &str,
        template_object: &str,
        user_id: UserId,
    ) -> Result<(), SendError>;
}

/// Aggregate outcome of one dispatch call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchResult {
    /// True iff at least one send succeeded.
    pub success: bool,
    pub sent_count: usize,
    pub total_count: usize,
    pub message: String,
}

impl DispatchResult {
    fn tally(sent_count: usize, total_count: usize) -> Self {
        let failed = total_count - sent_count;
        Self {
            success: sent_count > 0,
            sent_count,
            total_count,
            message: format!("sent {sent_count}/{total_count} ({failed} failed)"),
        }
    }

    /// Batch-level degrade: nothing was sent, the message carries the
    /// diagnostic. Used when a dispatch call fails before the send loop.
    pub fn failure(total_count: usize, message: impl Into<String>) -> Self {
        Self {
            success: false,
            sent_count: 0,
            total_count,
            message: message.into(),
        }
    }

    /// Some recipients were reached, some were not.
    pub fn is_partial_success(&self) -> bool {
        self.success && self.sent_count > 0 && self.sent_count < self.total_count
    }

    /// No message was delivered at all.
    pub fn is_complete_failure(&self) -> bool {
        !self.success || self.sent_count == 0
    }
}

/// Renders the template once and sends it to every recipient in turn.
///
/// The returned future resolves only after every recipient was attempted;
/// no partial tallies are observable mid-batch.
pub async fn dispatch<S>(
    sender: &S,
    recipients: &RecipientTokens,
    template: &TemplatePayload,
) -> DispatchResult
where
    S: MemoSender + ?Sized,
{
    // Content is identical for every recipient; only the bearer token varies.
    let template_object = encode_template(&render_template(template));

    let mut sent_count = 0usize;
    for (&user_id, access_token) in recipients {
        match sender.send_memo(access_token, &template_object, user_id).await {
            Ok(()) => sent_count += 1,
            Err(err) => {
                tracing::warn!(user_id, error = %err, "memo send failed");
            }
        }
    }

    DispatchResult::tally(sent_count, recipients.len())
}
