//! # Matrix Service Adapter
//!
//! Implements the `MessagingClient` trait for the Matrix protocol using the `matrix_sdk`.
//! Also converts room message events into `InboundMessage`s for the relay logic.

use crate::domain::traits::MessagingClient;
use crate::domain::types::{InboundMessage, Sender};
use anyhow::{Context, Result};
use async_trait::async_trait;
use matrix_sdk::Client;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::relation::InReplyTo;
use matrix_sdk::ruma::events::room::message::{
    MessageType, OriginalSyncRoomMessageEvent, Relation, RoomMessageEventContent,
};
use matrix_sdk::ruma::{EventId, MilliSecondsSinceUnixEpoch, RoomId};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Clone)]
pub struct MatrixClient {
    client: Client,
}

impl MatrixClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn room(&self, chat_id: &str) -> Result<Room> {
        let room_id = RoomId::parse(chat_id).with_context(|| format!("Invalid room id {chat_id}"))?;
        self.client
            .get_room(&room_id)
            .with_context(|| format!("Bot is not in room {chat_id}"))
    }
}

#[async_trait]
impl MessagingClient for MatrixClient {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String> {
        tracing::debug!("Bot sending message to {}: {}", chat_id, text);
        let response = self
            .room(chat_id)?
            .send(RoomMessageEventContent::text_plain(text))
            .await?;
        Ok(response.event_id.to_string())
    }

    async fn reply_to(&self, message: &InboundMessage, text: &str) -> Result<String> {
        let room = self.room(&message.chat_id)?;
        let event_id = EventId::parse(&message.id)
            .with_context(|| format!("Invalid event id {}", message.id))?;

        let mut content = RoomMessageEventContent::text_plain(text);
        content.relates_to = Some(Relation::Reply {
            in_reply_to: InReplyTo::new(event_id),
        });

        tracing::debug!("Bot replying in {}: {}", message.chat_id, text);
        let response = room.send(content).await?;
        Ok(response.event_id.to_string())
    }
}

/// Builds an `InboundMessage` from a text message event. Non-text messages yield `None`.
///
/// The display name comes from the room member; the user id localpart is used as the
/// handle when it differs from the display name, and as the display name otherwise.
pub async fn inbound_message(
    room: &Room,
    event: &OriginalSyncRoomMessageEvent,
) -> Option<InboundMessage> {
    let MessageType::Text(text) = &event.content.msgtype else {
        return None;
    };

    let member_name = match room.get_member_no_sync(&event.sender).await {
        Ok(Some(member)) => member.display_name().map(str::to_string),
        Ok(None) => None,
        Err(e) => {
            tracing::debug!("Member lookup for {} failed: {}", event.sender, e);
            None
        }
    };

    let localpart = event.sender.localpart().to_string();
    let (display_name, handle) = split_name(member_name, localpart);

    Some(InboundMessage {
        id: event.event_id.to_string(),
        sender: Sender {
            id: event.sender.to_string(),
            display_name,
            handle,
        },
        chat_id: room.room_id().to_string(),
        body: text.body.clone(),
    })
}

fn split_name(member_name: Option<String>, localpart: String) -> (String, Option<String>) {
    match member_name {
        Some(name) if !name.trim().is_empty() && name != localpart => (name, Some(localpart)),
        _ => (localpart, None),
    }
}

/// True when the event predates `start`, i.e. it was replayed by the initial sync.
pub fn sent_before(ts: MilliSecondsSinceUnixEpoch, start: SystemTime) -> bool {
    let event_time = UNIX_EPOCH + Duration::from_millis(ts.get().into());
    event_time < start
}
