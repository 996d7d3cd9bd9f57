//! # Main Entry Point
//!
//! Initializes the relay bot:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix
//! - Application: Rotation, Relay Handler, Router, Logging
//!

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::RoomId,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::SyncRoomMessageEvent,
    },
};
use std::sync::Arc;

use crate::application::relay::RelayHandler;
use crate::application::router::CommandRouter;
use crate::domain::config::AppConfig;
use crate::domain::paths;
use crate::infrastructure::matrix::{self, MatrixClient};
use crate::strings::logs;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Configuration
    let config_path = paths::config_path();
    let config = AppConfig::load(&config_path)?;

    // 2. Logging Setup
    let _guard = application::logging::init(&config.system)?;
    tracing::info!(
        "{}",
        logs::config_loaded(&config.services.matrix.username, &config_path)
    );
    for warning in config.relay.warnings() {
        tracing::warn!("{}", warning);
    }

    if let Err(e) = run(config).await {
        tracing::error!("{}", logs::fatal(&format!("{e:#}")));
        return Err(e);
    }
    Ok(())
}

async fn run(config: AppConfig) -> Result<()> {
    tracing::info!("{}", logs::STARTING);
    let matrix_config = &config.services.matrix;

    // 3. Matrix Login
    let client = Client::builder()
        .homeserver_url(&matrix_config.homeserver)
        .build()
        .await
        .context("Failed to build Matrix client")?;

    client
        .matrix_auth()
        .login_username(&matrix_config.username, &matrix_config.password()?)
        .initial_device_display_name("relay")
        .send()
        .await
        .context("Failed to log in")?;
    tracing::info!("{}", logs::LOGIN_SUCCESS);

    if let Some(name) = &matrix_config.display_name {
        tracing::info!("{}", logs::setting_display_name(name));
        if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
            tracing::warn!("{}", logs::set_display_name_fail(&e.to_string()));
        }
    }

    let channel = RoomId::parse(&config.relay.channel)
        .with_context(|| format!("Invalid relay.channel {}", config.relay.channel))?;
    tracing::info!("{}", logs::channel_joining(channel.as_str()));
    if let Err(e) = client.join_room_by_id(&channel).await {
        tracing::error!("{}", logs::channel_join_fail(channel.as_str(), &e.to_string()));
    }

    // 4. Relay Components
    let messaging = Arc::new(MatrixClient::new(client.clone()));
    let handler = Arc::new(RelayHandler::from_config(messaging, &config.relay)?);
    let router = Arc::new(CommandRouter::new(
        config.relay.greeting_command.clone(),
        handler,
    ));

    // 5. Event Handlers
    let start_time = std::time::SystemTime::now();

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = router.clone();
        async move {
            let Some(original) = ev.as_original() else {
                return;
            };
            // Ignore history replayed by the initial sync
            if matrix::sent_before(ev.origin_server_ts(), start_time) {
                return;
            }
            if original.sender == room.own_user_id() {
                return;
            }

            match matrix::inbound_message(&room, original).await {
                Some(message) => router.route(&message).await,
                None => tracing::debug!("{}", logs::ignoring_non_text(room.room_id().as_str())),
            }
        }
    });

    // Accept invites so users can open a direct chat with the bot
    client.add_event_handler(
        |ev: StrippedRoomMemberEvent, room: Room, client: Client| async move {
            if ev.content.membership != MembershipState::Invite
                || client.user_id() != Some(&*ev.state_key)
            {
                return;
            }
            tracing::info!("{}", logs::invite_received(room.room_id().as_str()));
            if let Err(e) = room.join().await {
                tracing::error!(
                    "{}",
                    logs::join_invite_fail(room.room_id().as_str(), &e.to_string())
                );
            }
        },
    );

    // 6. Sync Loop
    tracing::info!("{}", logs::SYNC_LOOP_START);
    tokio::select! {
        res = client.sync(SyncSettings::default()) => {
            res.context("Sync loop failed")?;
        }
        res = tokio::signal::ctrl_c() => {
            res.context("Unable to listen for shutdown signal")?;
            tracing::info!("{}", logs::SHUTDOWN);
        }
    }

    Ok(())
}
