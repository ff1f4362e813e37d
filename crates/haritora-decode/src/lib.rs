//! Decoders for HaritoraX tracker frames.
//!
//! [`Pipeline`] ties everything together: raw bytes go in, frames are
//! extracted and routed by label, and each routed payload comes out as exactly
//! one [`TrackerEvent`]. Decode failures are events too; nothing in here
//! tears down the byte source.

pub mod button;
pub mod discovery;
pub mod error;
pub mod event;
pub mod imu;
pub mod pipeline;

pub use button::{ButtonState, ButtonTracker};
pub use discovery::{decode_discovery, SEARCHING_SENTINEL};
pub use error::{DecodeError, DecodeErrorKind, Result};
pub use event::{Button, Gravity, Rotation, TrackerEvent};
pub use imu::{decode_imu_packet, IMU_FIELDS_LEN, MIN_IMU_PAYLOAD};
pub use pipeline::{EventSink, Pipeline, PipelineConfig, PipelineStats};
