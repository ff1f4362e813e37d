//! Button status channel (`r<n>`).
//!
//! The payload is a hex string such as `110060800400`. The digit at offset 6
//! is a 4-bit counter bumped by the dongle on every main-button press, the
//! digit at offset 9 is the same for the sub button. Presses are detected by
//! comparing each counter against the last value seen for that tracker.

use std::collections::HashMap;

use serde::Serialize;
use tracing::trace;

use crate::error::{DecodeError, Result};
use crate::event::{Button, TrackerEvent};

/// Minimum button payload length in characters.
pub const MIN_BUTTON_PAYLOAD: usize = 10;

/// Character offset of the main-button counter.
pub const MAIN_COUNT_OFFSET: usize = 6;

/// Character offset of the sub-button counter.
pub const SUB_COUNT_OFFSET: usize = 9;

/// Last observed counter pair for one tracker. Each value is in `0..=15`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    pub main: u8,
    pub sub: u8,
}

impl ButtonState {
    pub const fn new(main: u8, sub: u8) -> Self {
        Self { main, sub }
    }

    /// Read the counter pair out of a button payload.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)?;
        let chars: Vec<char> = text.chars().collect();
        if chars.len() < MIN_BUTTON_PAYLOAD {
            return Err(DecodeError::InvalidText(format!(
                "button status needs {MIN_BUTTON_PAYLOAD} characters, got {}",
                chars.len()
            )));
        }

        Ok(Self {
            main: hex_digit(&chars, MAIN_COUNT_OFFSET)?,
            sub: hex_digit(&chars, SUB_COUNT_OFFSET)?,
        })
    }
}

fn hex_digit(chars: &[char], offset: usize) -> Result<u8> {
    chars
        .get(offset)
        .and_then(|c| c.to_digit(16))
        .and_then(|digit| u8::try_from(digit).ok())
        .ok_or_else(|| DecodeError::InvalidText(format!("no hex digit at offset {offset}")))
}

/// Edge detector over per-tracker button counters.
///
/// State lives for as long as the tracker does and survives byte-source
/// reconnects. A tracker never seen before starts at `(0, 0)`.
#[derive(Debug, Default, Clone)]
pub struct ButtonTracker {
    states: HashMap<u8, ButtonState>,
}

impl ButtonTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stored counters for `tracker`.
    pub fn state(&self, tracker: u8) -> ButtonState {
        self.states.get(&tracker).copied().unwrap_or_default()
    }

    /// Overwrite the stored counters for `tracker`.
    pub fn set_state(&mut self, tracker: u8, state: ButtonState) {
        self.states.insert(tracker, state);
    }

    /// Decode a button payload and compare it against the stored counters.
    ///
    /// Main takes precedence: when both counters moved, only the main press
    /// is reported and the sub counter is left for the next frame. Stored
    /// state is untouched on error or when nothing changed.
    pub fn process(&mut self, tracker: u8, payload: &[u8]) -> Result<TrackerEvent> {
        let observed = ButtonState::parse(payload)?;
        let stored = self.state(tracker);
        trace!(tracker, ?observed, ?stored, "button status");

        if observed.main != stored.main {
            self.set_state(
                tracker,
                ButtonState {
                    main: observed.main,
                    ..stored
                },
            );
            return Ok(TrackerEvent::ButtonPressed {
                tracker,
                button: Button::Main,
                count: observed.main,
            });
        }

        if observed.sub != stored.sub {
            self.set_state(
                tracker,
                ButtonState {
                    sub: observed.sub,
                    ..stored
                },
            );
            return Ok(TrackerEvent::ButtonPressed {
                tracker,
                button: Button::Sub,
                count: observed.sub,
            });
        }

        Ok(TrackerEvent::NoButtonChange { tracker })
    }

    /// Trackers with stored state.
    pub fn trackers(&self) -> impl Iterator<Item = u8> + '_ {
        self.states.keys().copied()
    }
}
