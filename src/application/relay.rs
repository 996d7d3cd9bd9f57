//! # Relay Handler
//!
//! Forwards every direct message to the broadcast channel and answers the sender
//! with a rotating canned response. Also answers the greeting command.
//!
//! `handle` and `greet` return typed errors; `on_message` and `on_greeting` are the
//! boundaries used by the sync loop and never fail.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::error::HandlerError;
use crate::application::rotation::{ResponsePool, Rotation, RotationState};
use crate::domain::config::{ConfigError, RelayConfig, USER_NAME_PLACEHOLDER};
use crate::domain::traits::MessagingClient;
use crate::domain::types::InboundMessage;
use crate::strings::logs;

/// What `handle` did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Message came from the broadcast channel itself.
    Ignored,
    Relayed { response: String },
}

pub struct RelayHandler {
    client: Arc<dyn MessagingClient>,
    channel: String,
    pool: ResponsePool,
    welcome_template: String,
    fallback: String,
    rotation: Mutex<Rotation>,
}

impl RelayHandler {
    pub fn new(
        client: Arc<dyn MessagingClient>,
        config: &RelayConfig,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            channel: config.channel.clone(),
            pool: ResponsePool::new(config.responses.clone())?,
            welcome_template: config.welcome_message.clone(),
            fallback: config.fallback_message.clone(),
            rotation: Mutex::new(Rotation::new(rng)),
        })
    }

    /// Builds a handler seeded from OS entropy.
    pub fn from_config(
        client: Arc<dyn MessagingClient>,
        config: &RelayConfig,
    ) -> Result<Self, ConfigError> {
        Self::new(client, config, StdRng::from_entropy())
    }

    /// Snapshot of the rotation memory.
    #[allow(dead_code)]
    pub async fn rotation_state(&self) -> RotationState {
        self.rotation.lock().await.state.clone()
    }

    /// Filter, forward, select, reply.
    ///
    /// The rotation lock is held from selection until the reply is delivered, and the
    /// selection is only committed on success.
    pub async fn handle(&self, message: &InboundMessage) -> Result<Outcome, HandlerError> {
        let sender = &message.sender;
        tracing::info!("{}", logs::message_received(&sender.display_name, &sender.id));

        if message.chat_id == self.channel {
            tracing::debug!("{}", logs::ignoring_channel(&self.channel));
            return Ok(Outcome::Ignored);
        }

        self.client
            .send_message(&self.channel, &message.forward_text())
            .await
            .map_err(|source| HandlerError::Forward {
                channel: self.channel.clone(),
                source,
            })?;
        tracing::info!("{}", logs::message_forwarded(&sender.display_name, &sender.id));

        let mut rotation = self.rotation.lock().await;
        let response = rotation.select(&self.pool).to_string();
        tracing::debug!(
            "Selected response (previous: {:?}, first run: {})",
            rotation.state.last_response(),
            rotation.state.is_first_run()
        );
        self.client
            .reply_to(message, &response)
            .await
            .map_err(|source| HandlerError::Reply { source })?;
        rotation.state.commit(&response);
        drop(rotation);

        tracing::info!("{}", logs::response_sent(&sender.display_name, &sender.id));
        Ok(Outcome::Relayed { response })
    }

    /// Relay boundary: errors are logged and answered with the fallback text.
    pub async fn on_message(&self, message: &InboundMessage) {
        if let Err(e) = self.handle(message).await {
            self.recover(message, &e).await;
        }
    }

    pub fn welcome_text(&self, user_name: &str) -> String {
        self.welcome_template.replace(USER_NAME_PLACEHOLDER, user_name)
    }

    pub async fn greet(&self, message: &InboundMessage) -> Result<(), HandlerError> {
        let sender = &message.sender;
        let text = self.welcome_text(&sender.display_name);
        self.client
            .reply_to(message, &text)
            .await
            .map_err(|source| HandlerError::Greeting { source })?;
        tracing::info!("{}", logs::welcome_sent(&sender.display_name, &sender.id));
        Ok(())
    }

    /// Greeting boundary, same contract as `on_message`.
    pub async fn on_greeting(&self, message: &InboundMessage) {
        if let Err(e) = self.greet(message).await {
            self.recover(message, &e).await;
        }
    }

    async fn recover(&self, message: &InboundMessage, error: &HandlerError) {
        tracing::error!("{}", logs::handler_error(error.operation(), &error.to_string()));
        if let Err(e) = self.client.reply_to(message, &self.fallback).await {
            tracing::error!("{}", logs::fallback_fail(&e.to_string()));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::types::Sender;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    pub const CHANNEL: &str = "!broadcast:example.org";
    pub const FALLBACK: &str = "An error occurred, please try again later";

    /// Records every send; can be told to fail forwards or the next N replies.
    #[derive(Default)]
    pub struct MockClient {
        pub sent: std::sync::Mutex<Vec<(String, String)>>,
        pub replies: std::sync::Mutex<Vec<(String, String)>>,
        pub fail_send: AtomicBool,
        pub failing_replies: AtomicUsize,
    }

    impl MockClient {
        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn reply_texts(&self) -> Vec<String> {
            self.replies
                .lock()
                .unwrap()
                .iter()
                .map(|(_, text)| text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl MessagingClient for MockClient {
        async fn send_message(&self, chat_id: &str, text: &str) -> Result<String> {
            if self.fail_send.load(Ordering::SeqCst) {
                return Err(anyhow!("network unreachable"));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((chat_id.to_string(), text.to_string()));
            Ok(format!("$sent{}", sent.len()))
        }

        async fn reply_to(&self, message: &InboundMessage, text: &str) -> Result<String> {
            let failing = self.failing_replies.load(Ordering::SeqCst);
            if failing > 0 {
                self.failing_replies.store(failing - 1, Ordering::SeqCst);
                return Err(anyhow!("reply rejected"));
            }
            let mut replies = self.replies.lock().unwrap();
            replies.push((message.id.clone(), text.to_string()));
            Ok(format!("$reply{}", replies.len()))
        }
    }

    pub fn relay_config(responses: &[&str]) -> RelayConfig {
        RelayConfig {
            channel: CHANNEL.to_string(),
            greeting_command: "/start".to_string(),
            welcome_message: "Hi {user_name}!".to_string(),
            fallback_message: FALLBACK.to_string(),
            responses: responses.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn handler(responses: &[&str]) -> (Arc<MockClient>, RelayHandler) {
        let client = Arc::new(MockClient::default());
        let handler = RelayHandler::new(
            client.clone(),
            &relay_config(responses),
            StdRng::seed_from_u64(11),
        )
        .unwrap();
        (client, handler)
    }

    pub fn message_from(
        name: &str,
        handle: Option<&str>,
        chat_id: &str,
        body: &str,
    ) -> InboundMessage {
        InboundMessage {
            id: format!("$event-{name}-{body}"),
            sender: Sender {
                id: format!("@{}:example.org", name.to_lowercase()),
                display_name: name.to_string(),
                handle: handle.map(str::to_string),
            },
            chat_id: chat_id.to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_forward_and_first_reply() {
        let (client, handler) = handler(&["A", "B", "C"]);
        let message = message_from("Ann", Some("ann99"), "!dm-ann:example.org", "hi");

        let outcome = handler.handle(&message).await.unwrap();

        assert_eq!(outcome, Outcome::Relayed { response: "A".to_string() });
        assert_eq!(
            client.sent(),
            vec![(CHANNEL.to_string(), "hi\n\n Ann (@ann99)".to_string())]
        );
        assert_eq!(
            *client.replies.lock().unwrap(),
            vec![(message.id.clone(), "A".to_string())]
        );
        let state = handler.rotation_state().await;
        assert!(!state.is_first_run());
        assert_eq!(state.last_response(), Some("A"));
    }

    #[tokio::test]
    async fn test_forward_without_handle() {
        let (client, handler) = handler(&["A"]);
        handler
            .on_message(&message_from("Ann", None, "!dm-ann:example.org", "hi"))
            .await;
        assert_eq!(client.sent()[0].1, "hi\n\n Ann");
    }

    #[tokio::test]
    async fn test_channel_messages_ignored() {
        let (client, handler) = handler(&["A", "B"]);
        let message = message_from("Ann", Some("ann99"), CHANNEL, "hi");

        assert_eq!(handler.handle(&message).await.unwrap(), Outcome::Ignored);
        handler.on_message(&message).await;

        assert!(client.sent().is_empty());
        assert!(client.reply_texts().is_empty());
        assert_eq!(handler.rotation_state().await, RotationState::default());
    }

    #[tokio::test]
    async fn test_forward_failure_sends_fallback() {
        let (client, handler) = handler(&["A", "B"]);
        client.fail_send.store(true, Ordering::SeqCst);
        let message = message_from("Ann", None, "!dm-ann:example.org", "hi");

        let err = handler.handle(&message).await.unwrap_err();
        assert!(matches!(err, HandlerError::Forward { .. }));
        assert_eq!(err.operation(), "handle");

        handler.on_message(&message).await;
        assert_eq!(client.reply_texts(), vec![FALLBACK]);
        assert_eq!(handler.rotation_state().await, RotationState::default());

        // Recovers once the platform does.
        client.fail_send.store(false, Ordering::SeqCst);
        handler.on_message(&message).await;
        assert_eq!(client.reply_texts(), vec![FALLBACK, "A"]);
    }

    #[tokio::test]
    async fn test_reply_failure_keeps_rotation() {
        let (client, handler) = handler(&["A", "B"]);
        client.failing_replies.store(1, Ordering::SeqCst);
        let message = message_from("Ann", None, "!dm-ann:example.org", "hi");

        handler.on_message(&message).await;

        assert_eq!(client.sent().len(), 1);
        assert_eq!(client.reply_texts(), vec![FALLBACK]);
        assert_eq!(handler.rotation_state().await, RotationState::default());
    }

    #[tokio::test]
    async fn test_fallback_failure_is_swallowed() {
        let (client, handler) = handler(&["A", "B"]);
        client.fail_send.store(true, Ordering::SeqCst);
        client.failing_replies.store(1, Ordering::SeqCst);
        let message = message_from("Ann", None, "!dm-ann:example.org", "hi");

        handler.on_message(&message).await;

        assert!(client.reply_texts().is_empty());
        assert_eq!(client.failing_replies.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sequence_never_repeats() {
        let (client, handler) = handler(&["A", "B", "C"]);
        for i in 0..30 {
            let name = if i % 2 == 0 { "Ann" } else { "Li" };
            let chat = format!("!dm-{name}:example.org");
            handler
                .on_message(&message_from(name, None, &chat, &format!("msg {i}")))
                .await;
        }

        let replies = client.reply_texts();
        assert_eq!(replies.len(), 30);
        assert_eq!(replies[0], "A");
        for pair in replies.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(client.sent().len(), 30);
    }

    #[tokio::test]
    async fn test_single_response_repeats() {
        let (client, handler) = handler(&["only"]);
        for i in 0..3 {
            handler
                .on_message(&message_from("Ann", None, "!dm-ann:example.org", &i.to_string()))
                .await;
        }
        assert_eq!(client.reply_texts(), vec!["only", "only", "only"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_messages_never_repeat() {
        let (client, handler) = handler(&["A", "B", "C"]);
        let handler = Arc::new(handler);

        let tasks: Vec<_> = (0..40)
            .map(|i| {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let chat = format!("!dm-{i}:example.org");
                    handler
                        .on_message(&message_from("Ann", None, &chat, &i.to_string()))
                        .await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let replies = client.reply_texts();
        assert_eq!(replies.len(), 40);
        assert_eq!(replies[0], "A");
        for pair in replies.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[tokio::test]
    async fn test_greeting() {
        let (client, handler) = handler(&["A", "B"]);
        let message = message_from("Li", None, "!dm-li:example.org", "/start");

        handler.on_greeting(&message).await;

        assert_eq!(client.reply_texts(), vec!["Hi Li!"]);
        assert!(client.sent().is_empty());
        assert_eq!(handler.rotation_state().await, RotationState::default());
    }

    #[tokio::test]
    async fn test_greeting_failure_sends_fallback() {
        let (client, handler) = handler(&["A"]);
        client.failing_replies.store(1, Ordering::SeqCst);
        let message = message_from("Li", None, "!dm-li:example.org", "/start");

        let err = handler.greet(&message).await.unwrap_err();
        assert_eq!(err.operation(), "greet");

        client.failing_replies.store(1, Ordering::SeqCst);
        handler.on_greeting(&message).await;
        assert_eq!(client.reply_texts(), vec![FALLBACK]);
    }

    #[test]
    fn test_empty_pool_rejected() {
        let client = Arc::new(MockClient::default());
        let result = RelayHandler::from_config(client, &relay_config(&[]));
        assert!(matches!(result, Err(ConfigError::NoResponses)));
    }
}
