use std::io::Read;

use haritora_frame::{
    Channel, Frame, FrameConfig, FrameError, FrameExtractor, FrameReader, Label, LabelSet,
};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::button::ButtonTracker;
use crate::discovery::decode_discovery;
use crate::error::DecodeError;
use crate::event::TrackerEvent;
use crate::imu::decode_imu_packet;

/// Receives decoded events.
pub trait EventSink {
    fn emit(&mut self, event: TrackerEvent);

    /// Checked after every frame; `true` stops the drain early.
    fn is_done(&self) -> bool {
        false
    }
}

impl<F: FnMut(TrackerEvent)> EventSink for F {
    fn emit(&mut self, event: TrackerEvent) {
        self(event)
    }
}

impl EventSink for Vec<TrackerEvent> {
    fn emit(&mut self, event: TrackerEvent) {
        self.push(event);
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub frame: FrameConfig,
    pub labels: LabelSet,
    /// Log every raw frame at debug level.
    pub log_raw_frames: bool,
}

/// Counters kept across the pipeline's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub frames: u64,
    pub events: u64,
    pub decode_errors: u64,
    pub no_delimiter: u64,
    pub unrecognized_labels: u64,
    pub oversized_frames: u64,
}

/// Frame extraction, label routing and per-channel decoding.
///
/// Button state is owned here and outlives any single connection.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    extractor: FrameExtractor,
    buttons: ButtonTracker,
    stats: PipelineStats,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with explicit configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            extractor: FrameExtractor::with_config(config.frame.clone()),
            config,
            buttons: ButtonTracker::new(),
            stats: PipelineStats::default(),
        }
    }

    /// Route one frame to its decoder.
    ///
    /// Returns `None` for frames without a `:` and for labels outside the
    /// configured set. Every routed frame yields exactly one event, with
    /// decode failures reported as [`TrackerEvent::DecodeFailed`].
    pub fn route(&mut self, frame: &Frame) -> Option<TrackerEvent> {
        self.stats.frames += 1;
        if self.config.log_raw_frames {
            debug!(frame = ?frame.data, "raw frame");
        }

        let Some((raw_label, payload)) = frame.split_label() else {
            self.stats.no_delimiter += 1;
            trace!(len = frame.len(), "dropping frame without delimiter");
            return None;
        };

        let Some(label) = self.config.labels.resolve(&raw_label) else {
            self.stats.unrecognized_labels += 1;
            debug!(
                label = %String::from_utf8_lossy(&raw_label),
                "ignoring unrecognized label"
            );
            return None;
        };

        let event = match self.decode(label, &payload) {
            Ok(event) => event,
            Err(err) => {
                self.stats.decode_errors += 1;
                warn!(%label, kind = err.kind().as_str(), %err, "decode failed");
                TrackerEvent::DecodeFailed {
                    tracker: Some(label.tracker),
                    kind: err.kind(),
                    message: err.to_string(),
                    payload: payload.to_vec(),
                }
            }
        };

        self.stats.events += 1;
        log_event(&event);
        Some(event)
    }

    fn decode(&mut self, label: Label, payload: &[u8]) -> Result<TrackerEvent, DecodeError> {
        match label.channel {
            Channel::Imu => {
                let (rotation, gravity) = decode_imu_packet(payload)?;
                Ok(TrackerEvent::RotationGravity {
                    tracker: label.tracker,
                    rotation,
                    gravity,
                })
            }
            Channel::Discovery => decode_discovery(label.tracker, payload),
            Channel::Button => self.buttons.process(label.tracker, payload),
        }
    }

    /// Feed a raw chunk from the byte source and decode every frame it completes.
    ///
    /// A trailing fragment is kept for the next push.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<TrackerEvent> {
        self.extractor.push(chunk);

        let mut events = Vec::new();
        while let Some(next) = self.extractor.next_frame() {
            match next {
                Ok(frame) => events.extend(self.route(&frame)),
                Err(err) => self.record_frame_error(&err),
            }
        }
        events
    }

    /// Drain a byte stream to EOF, handing each event to `sink`.
    pub fn drain<R: Read>(
        &mut self,
        reader: R,
        sink: &mut impl EventSink,
    ) -> Result<u64, FrameError> {
        let mut frames = FrameReader::with_config(reader, self.config.frame.clone());
        self.drain_frames(&mut frames, sink)
    }

    /// Drain an existing frame reader to EOF, handing each event to `sink`.
    ///
    /// Returns the number of events emitted. Oversized frames are skipped;
    /// only an I/O failure on the stream or a finished sink ends the drain
    /// before EOF.
    pub fn drain_frames<R: Read>(
        &mut self,
        frames: &mut FrameReader<R>,
        sink: &mut impl EventSink,
    ) -> Result<u64, FrameError> {
        let mut emitted = 0u64;
        loop {
            match frames.read_frame() {
                Ok(frame) => {
                    if let Some(event) = self.route(&frame) {
                        sink.emit(event);
                        emitted += 1;
                    }
                    if sink.is_done() {
                        return Ok(emitted);
                    }
                }
                Err(FrameError::ConnectionClosed) => return Ok(emitted),
                Err(err @ FrameError::FrameTooLarge { .. }) => self.record_frame_error(&err),
                Err(err) => return Err(err),
            }
        }
    }

    fn record_frame_error(&mut self, err: &FrameError) {
        self.stats.oversized_frames += 1;
        warn!(%err, "frame dropped");
    }

    /// Button edge-detection state.
    pub fn buttons(&self) -> &ButtonTracker {
        &self.buttons
    }

    /// Mutable button state, e.g. to seed counters.
    pub fn buttons_mut(&mut self) -> &mut ButtonTracker {
        &mut self.buttons
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Forget a partially received frame left over from [`push`](Self::push).
    pub fn reset_stream(&mut self) {
        self.extractor.reset();
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn log_event(event: &TrackerEvent) {
    match event {
        TrackerEvent::RotationGravity {
            tracker,
            rotation: r,
            gravity: g,
        } => info!(
            tracker,
            rx = r.x,
            ry = r.y,
            rz = r.z,
            rw = r.w,
            gx = g.x,
            gy = g.y,
            gz = g.z,
            "imu"
        ),
        TrackerEvent::DiscoveryStatus {
            tracker,
            searching: true,
            ..
        } => info!(tracker, "searching for tracker"),
        TrackerEvent::DiscoveryStatus {
            tracker, raw_text, ..
        } => info!(tracker, text = %raw_text, "status text"),
        TrackerEvent::ButtonPressed {
            tracker,
            button,
            count,
        } => info!(
            tracker,
            button = button.as_str(),
            count,
            presses = event.presses().unwrap_or_default(),
            "button pressed"
        ),
        TrackerEvent::NoButtonChange { tracker } => {
            info!(tracker, "button status without a new press")
        }
        TrackerEvent::DecodeFailed { .. } => {}
    }
}
