use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::codec::{decode_frame, Frame, FrameConfig, TERMINATOR};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Push-based frame extractor.
///
/// Feed raw bytes with [`push`](Self::push) as they arrive, then drain complete
/// frames with [`next_frame`](Self::next_frame) or [`frames`](Self::frames).
/// An incomplete trailing fragment stays buffered until its terminator shows up
/// in a later push.
#[derive(Debug)]
pub struct FrameExtractor {
    buf: BytesMut,
    config: FrameConfig,
    discarding: bool,
}

impl FrameExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create an extractor with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            discarding: false,
        }
    }

    /// Append received bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        trace!(len = chunk.len(), pending = self.buf.len(), "push");
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete, non-empty frame, or `None` if more bytes are needed.
    ///
    /// An oversized frame yields one `Err(FrameTooLarge)`; the rest of it is
    /// skipped up to the next terminator and extraction carries on from there.
    pub fn next_frame(&mut self) -> Option<Result<Frame>> {
        loop {
            if self.discarding && !self.skip_to_terminator() {
                return None;
            }

            let before = self.buf.len();
            match decode_frame(&mut self.buf, self.config.max_frame_size) {
                Ok(Some(frame)) if frame.is_empty() => continue,
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => return None,
                Err(err) => {
                    if self.buf.len() == before {
                        // Unterminated and already over the limit.
                        self.buf.clear();
                        self.discarding = true;
                    }
                    debug!(%err, "dropping oversized frame");
                    return Some(Err(err));
                }
            }
        }
    }

    /// Lazily iterate over the frames currently extractable.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { extractor: self }
    }

    /// Bytes buffered but not yet part of a complete frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drop any buffered fragment, e.g. when the byte source disconnects.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    /// Current extractor configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Update maximum frame size for subsequent extraction.
    pub fn set_max_frame_size(&mut self, max_frame_size: usize) {
        self.config.max_frame_size = max_frame_size;
    }

    fn skip_to_terminator(&mut self) -> bool {
        match self.buf.iter().position(|&b| b == TERMINATOR) {
            Some(pos) => {
                self.buf.advance(pos + 1);
                self.discarding = false;
                true
            }
            None => {
                self.buf.clear();
                false
            }
        }
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`FrameExtractor::frames`].
pub struct Frames<'a> {
    extractor: &'a mut FrameExtractor,
}

impl Iterator for Frames<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.extractor.next_frame()
    }
}
