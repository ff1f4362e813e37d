use std::io::{ErrorKind, Read};

use haritora_transport::SourceStream;
use tracing::debug;

use crate::codec::{Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::extractor::FrameExtractor;

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    extractor: FrameExtractor,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            extractor: FrameExtractor::with_config(config),
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached. A
    /// trailing fragment with no terminator is dropped at EOF.
    /// `Err(FrameError::FrameTooLarge)` is recoverable: keep reading.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(next) = self.extractor.next_frame() {
                return next;
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                let pending = self.extractor.pending();
                if pending > 0 {
                    debug!(pending, "dropping unterminated fragment at EOF");
                    self.extractor.reset();
                }
                return Err(FrameError::ConnectionClosed);
            }

            self.extractor.push(&chunk[..read]);
        }
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        self.extractor.config()
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    /// Yields frames until the stream closes; `ConnectionClosed` ends iteration.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Err(FrameError::ConnectionClosed) => None,
            other => Some(other),
        }
    }
}

impl FrameReader<SourceStream> {
    /// Create a frame reader for a `SourceStream` and apply read timeout from config.
    pub fn with_config_source(inner: SourceStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

fn transport_to_frame_error(err: haritora_transport::TransportError) -> FrameError {
    match err {
        haritora_transport::TransportError::Io(io)
        | haritora_transport::TransportError::Accept(io) => FrameError::Io(io),
        haritora_transport::TransportError::Bind { source, .. }
        | haritora_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
    }
}
