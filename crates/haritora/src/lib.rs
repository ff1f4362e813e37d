//! Decode HaritoraX Wireless tracker data relayed from the GX6 dongle.
//!
//! The dongle's serial stream is echoed to a local TCP socket by a serial
//! terminal. This crate turns that byte stream into typed tracker events:
//! orientation, gravity, button presses and discovery status.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP byte source the relay connects to
//! - [`frame`]: newline frame extraction and channel labels
//! - [`decode`]: IMU / discovery / button decoders and the routing pipeline

/// Re-export transport types.
pub mod transport {
    pub use haritora_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use haritora_frame::*;
}

/// Re-export decoder types.
pub mod decode {
    pub use haritora_decode::*;
}
