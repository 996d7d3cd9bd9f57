//! # Messages
//!
//! Contains constant strings for user-facing messages and startup diagnostics.

/// Default fallback reply when handling a message fails.
pub const GENERIC_ERROR: &str = "⚠️ An error occurred, please try again later.";

pub const CONFIG_READ_ERROR: &str = "Failed to read config file";
pub const CONFIG_PARSE_ERROR: &str = "Failed to parse YAML";
pub const WELCOME_WITHOUT_PLACEHOLDER: &str =
    "relay.welcome_message has no {user_name} placeholder; every user gets the same greeting";
