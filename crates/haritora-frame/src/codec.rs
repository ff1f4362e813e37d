use bytes::{Buf, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Line terminator separating frames on the wire.
pub const TERMINATOR: u8 = b'\n';

/// Separator between a frame's label and its payload.
pub const LABEL_DELIMITER: u8 = b':';

/// Default maximum frame size: 4 KiB. Real frames are well under 64 bytes.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4 * 1024;

/// One newline-delimited record, terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Split into `(label, payload)` at the first `:`.
    ///
    /// Returns `None` if the frame has no delimiter. The payload may itself
    /// contain `:` bytes (binary IMU packets often do).
    pub fn split_label(&self) -> Option<(Bytes, Bytes)> {
        let pos = self.data.iter().position(|&b| b == LABEL_DELIMITER)?;
        Some((self.data.slice(..pos), self.data.slice(pos + 1..)))
    }
}

/// Decode one frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a terminator yet. On success,
/// consumes the frame and its terminator from the buffer.
///
/// A terminated frame longer than `max_frame_size` is consumed and reported as
/// [`FrameError::FrameTooLarge`]. An unterminated fragment that already exceeds
/// the limit is reported the same way but left in the buffer; the caller
/// decides how to resync.
pub fn decode_frame(src: &mut BytesMut, max_frame_size: usize) -> Result<Option<Frame>> {
    let Some(pos) = src.iter().position(|&b| b == TERMINATOR) else {
        if src.len() > max_frame_size {
            return Err(FrameError::FrameTooLarge {
                size: src.len(),
                max: max_frame_size,
            });
        }
        return Ok(None); // Need more data
    };

    if pos > max_frame_size {
        src.advance(pos + 1);
        return Err(FrameError::FrameTooLarge {
            size: pos,
            max: max_frame_size,
        });
    }

    let data = src.split_to(pos).freeze();
    src.advance(1);
    Ok(Some(Frame { data }))
}

/// Configuration for frame extraction.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum frame size in bytes, terminator excluded. Default: 4 KiB.
    pub max_frame_size: usize,
    /// Read timeout for blocking reads from the byte source.
    pub read_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            read_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_line() {
        let mut buf = BytesMut::from(&b"a0:7f7f7f7f7f7f\n"[..]);
        let frame = decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE)
            .unwrap()
            .unwrap();

        assert_eq!(frame.data.as_ref(), b"a0:7f7f7f7f7f7f");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_line() {
        let mut buf = BytesMut::from(&b"r0:1100"[..]);
        let result = decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.as_ref(), b"r0:1100");
    }

    #[test]
    fn test_decode_leaves_following_bytes() {
        let mut buf = BytesMut::from(&b"a0:first\na1:sec"[..]);
        let frame = decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE)
            .unwrap()
            .unwrap();
        assert_eq!(frame.data.as_ref(), b"a0:first");
        assert_eq!(buf.as_ref(), b"a1:sec");
    }

    #[test]
    fn test_decode_empty_line() {
        let mut buf = BytesMut::from(&b"\n"[..]);
        let frame = decode_frame(&mut buf, DEFAULT_MAX_FRAME_SIZE)
            .unwrap()
            .unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_decode_terminated_frame_too_large() {
        let mut buf = BytesMut::from(&b"a0:0123456789\na1:ok\n"[..]);
        let result = decode_frame(&mut buf, 8);
        assert!(matches!(
            result,
            Err(FrameError::FrameTooLarge { size: 13, max: 8 })
        ));
        assert_eq!(buf.as_ref(), b"a1:ok\n");
    }

    #[test]
    fn test_decode_unterminated_fragment_too_large() {
        let mut buf = BytesMut::from(&b"a0:0123456789"[..]);
        let result = decode_frame(&mut buf, 8);
        assert!(matches!(result, Err(FrameError::FrameTooLarge { .. })));
        assert_eq!(buf.len(), 13);
    }

    #[test]
    fn test_frame_at_limit_is_accepted() {
        let mut buf = BytesMut::from(&b"a0:12345\n"[..]);
        let frame = decode_frame(&mut buf, 8).unwrap().unwrap();
        assert_eq!(frame.len(), 8);
    }

    #[test]
    fn test_split_label_at_first_delimiter() {
        let frame = Frame::new(&b"X0:\x01:\x02"[..]);
        let (label, payload) = frame.split_label().unwrap();
        assert_eq!(label.as_ref(), b"X0");
        assert_eq!(payload.as_ref(), b"\x01:\x02");
    }

    #[test]
    fn test_split_label_without_delimiter() {
        let frame = Frame::new(&b"no delimiter here"[..]);
        assert!(frame.split_label().is_none());
    }

    #[test]
    fn test_split_label_empty_payload() {
        let frame = Frame::new(&b"a1:"[..]);
        let (label, payload) = frame.split_label().unwrap();
        assert_eq!(label.as_ref(), b"a1");
        assert!(payload.is_empty());
    }
}
