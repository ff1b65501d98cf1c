//! Error types shared across chatreel crates.

/// Top-level error type for chatreel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatreelError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Encoder unavailable: {message}")]
    EncoderUnavailable { message: String },

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("Composition error: {message}")]
    Composition { message: String },

    #[error("Script error: {message}")]
    Script { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ChatreelError.
pub type ChatreelResult<T> = Result<T, ChatreelError>;

impl ChatreelError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn encoder_unavailable(msg: impl Into<String>) -> Self {
        Self::EncoderUnavailable {
            message: msg.into(),
        }
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition {
            message: msg.into(),
        }
    }

    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script {
            message: msg.into(),
        }
    }
}
