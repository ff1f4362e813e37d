/// Errors that can occur while extracting frames from the byte stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A frame exceeded the configured maximum size and was dropped.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading from the byte source.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source reached EOF.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
