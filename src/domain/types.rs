//! # Domain Types
//!
//! Common data structures passed between the platform adapter and the relay logic.

/// A message received from a user, normalized away from the platform event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Platform id of the message, used to thread replies.
    pub id: String,
    pub sender: Sender,
    /// Chat (room) the message was posted in.
    pub chat_id: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: String,
    pub display_name: String,
    pub handle: Option<String>,
}

impl InboundMessage {
    /// Text posted to the broadcast channel for this message.
    pub fn forward_text(&self) -> String {
        let mut text = format!("{}\n\n {}", self.body, self.sender.display_name);
        if let Some(handle) = &self.sender.handle {
            text.push_str(&format!(" (@{handle})"));
        }
        text
    }

    /// First word of the body, used for command detection.
    pub fn command(&self) -> Option<&str> {
        self.body.split_whitespace().next()
    }
}
