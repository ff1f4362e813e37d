use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::SourceStream;

/// Host the serial relay echoes to by default.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port the serial relay echoes to by default.
pub const DEFAULT_PORT: u16 = 9876;

/// TCP listener that accepts relay connections one at a time.
#[derive(Debug)]
pub struct TcpSource {
    listener: TcpListener,
    local: SocketAddr,
}

impl TcpSource {
    /// Bind and listen on `addr` (e.g. `"127.0.0.1:9876"`). Port 0 picks a free port.
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let shown = addr.to_string();
        let listener = TcpListener::bind(&addr).map_err(|source| TransportError::Bind {
            addr: shown.clone(),
            source,
        })?;
        let local = listener.local_addr().map_err(|source| TransportError::Bind {
            addr: shown,
            source,
        })?;

        info!(%local, "byte source listening");
        Ok(Self { listener, local })
    }

    /// Block until the next relay connects.
    pub fn accept(&self) -> Result<SourceStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted byte source connection");
        Ok(SourceStream::from_tcp(stream))
    }

    /// Connect to a listening byte source.
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<SourceStream> {
        let shown = addr.to_string();
        let stream = TcpStream::connect(&addr).map_err(|source| TransportError::Connect {
            addr: shown.clone(),
            source,
        })?;
        debug!(addr = %shown, "connected to byte source");
        Ok(SourceStream::from_tcp(stream))
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::thread;

    use super::*;

    #[test]
    fn bind_on_ephemeral_port_reports_address() {
        let source = TcpSource::bind("127.0.0.1:0").unwrap();
        let addr = source.local_addr();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn accept_reads_what_client_writes() {
        let source = TcpSource::bind("127.0.0.1:0").unwrap();
        let addr = source.local_addr();

        let client = thread::spawn(move || {
            let mut stream = TcpSource::connect(addr).unwrap();
            stream.write_all(b"a0:7f7f7f7f7f7f\n").unwrap();
            stream.finish().unwrap();
        });

        let mut stream = source.accept().unwrap();
        assert!(stream.peer_addr().is_some());

        let mut received = Vec::new();
        stream.read_to_end(&mut received).unwrap();
        client.join().unwrap();

        assert_eq!(received, b"a0:7f7f7f7f7f7f\n");
    }

    #[test]
    fn connect_to_closed_port_fails() {
        let addr = {
            let source = TcpSource::bind("127.0.0.1:0").unwrap();
            source.local_addr()
        };
        let err = TcpSource::connect(addr).unwrap_err();
        match err {
            TransportError::Connect { addr: shown, .. } => assert_eq!(shown, addr.to_string()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bind_conflict_reports_address() {
        let first = TcpSource::bind("127.0.0.1:0").unwrap();
        let addr = first.local_addr();
        let err = TcpSource::bind(addr).unwrap_err();
        match err {
            TransportError::Bind { addr: shown, .. } => assert_eq!(shown, addr.to_string()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
