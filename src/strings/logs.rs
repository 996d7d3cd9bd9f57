pub fn config_loaded(user: &str, path: &str) -> String {
    format!("Loaded configuration for user {user} from {path}")
}

pub const STARTING: &str = "Starting relay bot...";
pub const LOGIN_SUCCESS: &str = "Logged in successfully!";

pub fn setting_display_name(name: &str) -> String {
    format!("Setting display name to: {name}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";
pub const SHUTDOWN: &str = "Shutting down...";

pub fn channel_joining(room: &str) -> String {
    format!("Joining broadcast room {room}...")
}

pub fn channel_join_fail(room: &str, err: &str) -> String {
    format!("Failed to join broadcast room {room}: {err}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id}")
}

pub fn join_invite_fail(room_id: &str, err: &str) -> String {
    format!("Failed to join room {room_id} after invite: {err}")
}

pub fn message_received(name: &str, id: &str) -> String {
    format!("Received message from user {name} (ID: {id})")
}

pub fn ignoring_channel(channel: &str) -> String {
    format!("Ignoring message from channel {channel}")
}

pub fn ignoring_non_text(room_id: &str) -> String {
    format!("Ignoring non-text message in {room_id}")
}

pub fn message_forwarded(name: &str, id: &str) -> String {
    format!("Forwarded message from user {name} (ID: {id}) to channel")
}

pub fn response_sent(name: &str, id: &str) -> String {
    format!("Sent response message to user {name} (ID: {id})")
}

pub fn welcome_sent(name: &str, id: &str) -> String {
    format!("Sent welcome message to user {name} (ID: {id})")
}

pub fn handler_error(operation: &str, err: &str) -> String {
    format!("Error in {operation}: {err}")
}

pub fn fallback_fail(err: &str) -> String {
    format!("Failed to send fallback reply: {err}")
}

pub fn fatal(err: &str) -> String {
    format!("Fatal error: {err}")
}
