//! Newline frame extraction and channel labels for dongle streams.
//!
//! The relayed stream is a sequence of `<label>:<payload>\n` records:
//! - `X<n>` carries a binary IMU packet for tracker `n`
//! - `a<n>` carries discovery / status text for tracker `n`
//! - `r<n>` carries the button status string for tracker `n`
//!
//! Frames split across socket reads are reassembled; oversized frames are
//! dropped without losing sync on the stream.

pub mod codec;
pub mod error;
pub mod extractor;
pub mod label;
pub mod reader;

pub use codec::{
    decode_frame, Frame, FrameConfig, DEFAULT_MAX_FRAME_SIZE, LABEL_DELIMITER, TERMINATOR,
};
pub use error::{FrameError, Result};
pub use extractor::{FrameExtractor, Frames};
pub use label::{Channel, Label, LabelSet, A0, A1, R0, X0, X1};
pub use reader::FrameReader;
