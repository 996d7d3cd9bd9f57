//! # Application Layer
//!
//! Contains the core logic and orchestration of the bot:
//! response rotation, the relay handler, command routing and logging setup.

pub mod error;
pub mod logging;
pub mod relay;
pub mod rotation;
pub mod router;
