use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use haritora_decode::{EventSink, Pipeline, TrackerEvent};
use haritora_frame::FrameReader;
use haritora_transport::{TcpSource, TransportError};
use tracing::{info, warn};

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_event, OutputFormat};

/// Prints events and tracks the `--count` limit across connections.
///
/// Also finishes once `running` is cleared by the Ctrl-C handler, so a relay
/// that keeps streaming cannot hold the listener open.
pub struct PrintSink {
    pub format: OutputFormat,
    pub source: String,
    pub printed: usize,
    pub limit: Option<usize>,
    running: Arc<AtomicBool>,
}

impl PrintSink {
    pub fn new(
        format: OutputFormat,
        source: impl Into<String>,
        limit: Option<usize>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            format,
            source: source.into(),
            printed: 0,
            limit,
            running,
        }
    }
}

impl EventSink for PrintSink {
    fn emit(&mut self, event: TrackerEvent) {
        print_event(&event, &self.source, self.format);
        self.printed = self.printed.saturating_add(1);
    }

    fn is_done(&self) -> bool {
        !self.running.load(Ordering::SeqCst)
            || self.limit.is_some_and(|limit| self.printed >= limit)
    }
}

pub fn run(args: ListenArgs, format: OutputFormat, debug: bool) -> CliResult<i32> {
    let read_timeout = args
        .read_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let config = args.pipeline.to_config(read_timeout, debug);

    let addr = format!("{}:{}", args.host, args.port);
    let source =
        TcpSource::bind(addr.as_str()).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut pipeline = Pipeline::with_config(config);
    let mut sink = PrintSink::new(format, String::new(), args.count, running);

    while !sink.is_done() {
        let stream = match source.accept() {
            Ok(stream) => stream,
            Err(err) if is_transient_accept_error(&err) => {
                warn!(%err, "accept failed, waiting for the next connection");
                continue;
            }
            Err(err) => return Err(transport_error("accept failed", err)),
        };
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!(%peer, "connection established");

        let mut frames = FrameReader::with_config_source(stream, pipeline.config().frame.clone())
            .map_err(|err| frame_error("stream setup failed", err))?;
        sink.source = peer.clone();

        match pipeline.drain_frames(&mut frames, &mut sink) {
            Ok(emitted) => info!(%peer, emitted, "connection closed"),
            Err(err) => warn!(%peer, %err, "connection dropped"),
        }
    }

    let stats = pipeline.stats();
    info!(
        frames = stats.frames,
        events = stats.events,
        decode_errors = stats.decode_errors,
        "listener stopped"
    );
    Ok(SUCCESS)
}

/// Accept failures caused by a single client going away before the
/// handshake finished. The listening socket itself is still usable.
fn is_transient_accept_error(err: &TransportError) -> bool {
    match err {
        TransportError::Accept(io) => matches!(
            io.kind(),
            ErrorKind::ConnectionAborted
                | ErrorKind::ConnectionReset
                | ErrorKind::Interrupted
                | ErrorKind::TimedOut
        ),
        _ => false,
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
