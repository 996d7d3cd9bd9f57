use thiserror::Error;

/// Failures inside a message handler. Always logged and answered with the
/// fallback reply; never returned to the sync loop.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to forward message to {channel}: {source}")]
    Forward {
        channel: String,
        source: anyhow::Error,
    },
    #[error("failed to send reply: {source}")]
    Reply { source: anyhow::Error },
    #[error("failed to send welcome message: {source}")]
    Greeting { source: anyhow::Error },
}

impl HandlerError {
    /// Name of the handler the failure happened in, for log lines.
    pub fn operation(&self) -> &'static str {
        match self {
            HandlerError::Forward { .. } | HandlerError::Reply { .. } => "handle",
            HandlerError::Greeting { .. } => "greet",
        }
    }
}
