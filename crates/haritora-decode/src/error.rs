use serde::Serialize;

/// Why a routed payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The payload is shorter than the channel's minimum.
    #[error("payload too short ({len} bytes, need {min})")]
    TooShort { len: usize, min: usize },

    /// The binary fields could not be unpacked.
    #[error("malformed binary payload: {0}")]
    MalformedBinary(String),

    /// The payload is not valid text, or too short for its text format.
    #[error("invalid text payload: {0}")]
    InvalidText(String),
}

/// Tag-only form of [`DecodeError`] carried on events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorKind {
    TooShort,
    MalformedBinary,
    InvalidText,
}

impl DecodeError {
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::TooShort { .. } => DecodeErrorKind::TooShort,
            DecodeError::MalformedBinary(_) => DecodeErrorKind::MalformedBinary,
            DecodeError::InvalidText(_) => DecodeErrorKind::InvalidText,
        }
    }
}

impl DecodeErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeErrorKind::TooShort => "too_short",
            DecodeErrorKind::MalformedBinary => "malformed_binary",
            DecodeErrorKind::InvalidText => "invalid_text",
        }
    }
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(err: std::str::Utf8Error) -> Self {
        DecodeError::InvalidText(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
