//! Local TCP byte source for relayed dongle streams.
//!
//! The GX6 dongle speaks over a serial port. A serial terminal (RealTerm or
//! similar) captures that stream and echoes it to a local TCP socket, which is
//! what this crate listens on. Everything above it only sees a [`SourceStream`]
//! implementing `Read`.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::SourceStream;
pub use tcp::{TcpSource, DEFAULT_HOST, DEFAULT_PORT};
