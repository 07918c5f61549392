//! Reply service seam
//!
//! The submission cycle talks to the remote response generator only through
//! this trait, so the HTTP providers and the test doubles are interchangeable.

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::state::Message;

#[async_trait]
pub trait ReplyService: Send + Sync {
    /// Generate the next assistant reply for `prior`, the transcript without
    /// its seed message or any pending placeholder.
    async fn generate_reply(&self, prior: Vec<Message>) -> Result<String, ServiceError>;

    /// Model identifier shown in the header.
    fn model(&self) -> &str;
}
