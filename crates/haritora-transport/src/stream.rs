use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

use crate::error::Result;

/// A connected byte-source stream. Implements `Read + Write`.
pub struct SourceStream {
    inner: TcpStream,
    peer: Option<SocketAddr>,
}

impl Read for SourceStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for SourceStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl SourceStream {
    pub(crate) fn from_tcp(inner: TcpStream) -> Self {
        let peer = inner.peer_addr().ok();
        Self { inner, peer }
    }

    /// Address of the connected peer, if the OS reported one.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Close the write half, signalling EOF to the peer.
    pub fn finish(&self) -> Result<()> {
        self.inner.shutdown(Shutdown::Write).map_err(Into::into)
    }
}

impl std::fmt::Debug for SourceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceStream")
            .field("peer", &self.peer)
            .finish()
    }
}
