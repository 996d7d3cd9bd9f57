//! # Strings Module
//!
//! Centralizes user-facing strings and log line formats.

pub mod logs;
pub mod messages;
