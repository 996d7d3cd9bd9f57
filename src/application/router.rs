//! # Command Router
//!
//! Routes incoming messages either to the greeting command or to the relay.

use std::sync::Arc;

use crate::application::relay::RelayHandler;
use crate::domain::types::InboundMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Greeting,
    Relay,
}

pub struct CommandRouter {
    greeting_command: String,
    handler: Arc<RelayHandler>,
}

impl CommandRouter {
    pub fn new(greeting_command: String, handler: Arc<RelayHandler>) -> Self {
        Self {
            greeting_command,
            handler,
        }
    }

    pub fn classify(&self, message: &InboundMessage) -> Route {
        match message.command() {
            Some(cmd) if cmd == self.greeting_command => Route::Greeting,
            _ => Route::Relay,
        }
    }

    /// Dispatches a message. Never fails; handler errors are absorbed at the handler boundary.
    pub async fn route(&self, message: &InboundMessage) {
        let route = self.classify(message);
        tracing::debug!(
            "Router dispatching route={:?} sender='{}' chat='{}'",
            route,
            message.sender.id,
            message.chat_id
        );

        match route {
            Route::Greeting => self.handler.on_greeting(message).await,
            Route::Relay => self.handler.on_message(message).await,
        }
    }
}
