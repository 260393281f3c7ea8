//! Promise notification core contracts and value types.
//!
//! This crate exposes the data structures exchanged between the meeting service
//! and the egress workers, the invitation template renderer, and the batch
//! dispatch logic with its per-recipient failure isolation.

pub mod dispatch;
pub mod subjects;
pub mod template;
pub mod types;

pub use dispatch::{DispatchResult, MemoSender, SendError, dispatch};
pub use subjects::notify_subject;
pub use template::{encode_template, render_template};
pub use types::{DispatchRequest, RecipientTokens, TemplatePayload, UserId};
