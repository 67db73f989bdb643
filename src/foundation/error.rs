/// Convenience result type used across overlayer.
pub type OverlayerResult<T> = Result<T, OverlayerError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only [`OverlayerError::Decode`] and [`OverlayerError::TransparencyUnattainable`] are meant to
/// reach an end user; the remaining variants describe caller mistakes or internal recoveries.
#[derive(thiserror::Error, Debug)]
pub enum OverlayerError {
    /// Invalid user-provided geometry, options or template data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Input bytes are not a decodable raster.
    #[error("decode error: {0}")]
    Decode(String),

    /// The preparation pipeline could not produce a usable alpha channel.
    #[error("cannot prepare overlay: {0}")]
    TransparencyUnattainable(String),

    /// The external matting service failed or is not configured.
    #[error("matting unavailable: {0}")]
    MattingUnavailable(String),

    /// A gesture was started while another one is active, or updated when none is.
    #[error("gesture error: {0}")]
    Gesture(String),

    /// An operation referenced a hotspot id that does not exist.
    #[error("unknown mark '{0}'")]
    UnknownMark(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayerError {
    /// Build a [`OverlayerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`OverlayerError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`OverlayerError::TransparencyUnattainable`] value.
    pub fn transparency(msg: impl Into<String>) -> Self {
        Self::TransparencyUnattainable(msg.into())
    }

    /// Build a [`OverlayerError::MattingUnavailable`] value.
    pub fn matting(msg: impl Into<String>) -> Self {
        Self::MattingUnavailable(msg.into())
    }

    /// Build a [`OverlayerError::Gesture`] value.
    pub fn gesture(msg: impl Into<String>) -> Self {
        Self::Gesture(msg.into())
    }

    /// Build a [`OverlayerError::UnknownMark`] value.
    pub fn unknown_mark(id: impl Into<String>) -> Self {
        Self::UnknownMark(id.into())
    }

    /// Build a [`OverlayerError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error should be shown to the person editing the template.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::TransparencyUnattainable(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
