/// Convenience result type used across ghostink.
pub type GhostResult<T> = Result<T, GhostError>;

/// Top-level error taxonomy used by compositor, scheduler and transport APIs.
#[derive(thiserror::Error, Debug)]
pub enum GhostError {
    /// Invalid user-provided configuration or mismatched buffer geometry.
    #[error("validation error: {0}")]
    Validation(String),

    /// The panel could not be reached or initialised.
    #[error("device init error: {0}")]
    DeviceInit(String),

    /// A source image could not be read or decoded.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// A blocking write to the panel failed or timed out.
    #[error("transport write error: {0}")]
    Transport(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error (typically I/O with attached context).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GhostError {
    /// Build a [`GhostError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GhostError::DeviceInit`].
    pub fn device_init(msg: impl Into<String>) -> Self {
        Self::DeviceInit(msg.into())
    }

    /// Build a [`GhostError::ImageDecode`].
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`GhostError::Transport`].
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Build a [`GhostError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` when the slideshow loop must stop instead of skipping the frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DeviceInit(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
