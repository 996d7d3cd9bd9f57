//! # Domain Traits
//!
//! Abstract interface for the messaging platform.
//! Allows the relay logic to run against Matrix or an in-memory double.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::types::InboundMessage;

/// Abstract interface for a Messaging Client (e.g., Matrix)
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Send a plain message to a chat. Returns the id of the sent message.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String>;

    /// Reply to a received message in its own chat. Returns the id of the reply.
    async fn reply_to(&self, message: &InboundMessage, text: &str) -> Result<String>;
}
