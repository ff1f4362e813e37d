use std::fmt;

use serde::Serialize;

use crate::error::DecodeErrorKind;

/// Orientation quaternion, already scaled for the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Gravity vector in units of g.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gravity {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Which tracker button changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Main,
    Sub,
}

impl Button {
    pub fn as_str(self) -> &'static str {
        match self {
            Button::Main => "main",
            Button::Sub => "sub",
        }
    }
}

/// A decoded record handed to the event sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackerEvent {
    RotationGravity {
        tracker: u8,
        rotation: Rotation,
        gravity: Gravity,
    },
    DiscoveryStatus {
        tracker: u8,
        searching: bool,
        raw_text: String,
    },
    /// `count` is the raw 4-bit counter from the dongle. It wraps at 16, so
    /// two presses between frames show up as one transition.
    ButtonPressed {
        tracker: u8,
        button: Button,
        count: u8,
    },
    NoButtonChange {
        tracker: u8,
    },
    DecodeFailed {
        tracker: Option<u8>,
        kind: DecodeErrorKind,
        message: String,
        payload: Vec<u8>,
    },
}

impl TrackerEvent {
    /// Tracker index the event concerns.
    pub fn tracker(&self) -> Option<u8> {
        match self {
            TrackerEvent::RotationGravity { tracker, .. }
            | TrackerEvent::DiscoveryStatus { tracker, .. }
            | TrackerEvent::ButtonPressed { tracker, .. }
            | TrackerEvent::NoButtonChange { tracker } => Some(*tracker),
            TrackerEvent::DecodeFailed { tracker, .. } => *tracker,
        }
    }

    /// Stable snake_case name, matching the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            TrackerEvent::RotationGravity { .. } => "rotation_gravity",
            TrackerEvent::DiscoveryStatus { .. } => "discovery_status",
            TrackerEvent::ButtonPressed { .. } => "button_pressed",
            TrackerEvent::NoButtonChange { .. } => "no_button_change",
            TrackerEvent::DecodeFailed { .. } => "decode_failed",
        }
    }

    /// Press count as the dongle's companion software displays it (`count + 1`).
    pub fn presses(&self) -> Option<u16> {
        match self {
            TrackerEvent::ButtonPressed { count, .. } => Some(u16::from(*count) + 1),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TrackerEvent::DecodeFailed { .. })
    }
}

impl fmt::Display for TrackerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerEvent::RotationGravity {
                tracker,
                rotation: r,
                gravity: g,
            } => write!(
                f,
                "tracker {tracker} rotation ({}, {}, {}, {}) gravity ({}, {}, {})",
                r.x, r.y, r.z, r.w, g.x, g.y, g.z
            ),
            TrackerEvent::DiscoveryStatus {
                tracker,
                searching: true,
                ..
            } => write!(f, "searching for tracker {tracker}"),
            TrackerEvent::DiscoveryStatus {
                tracker, raw_text, ..
            } => write!(f, "tracker {tracker} status: {raw_text}"),
            TrackerEvent::ButtonPressed {
                tracker, button, ..
            } => write!(
                f,
                "tracker {tracker} {} button pressed, {} presses",
                button.as_str(),
                self.presses().unwrap_or_default()
            ),
            TrackerEvent::NoButtonChange { tracker } => {
                write!(f, "tracker {tracker} button status unchanged")
            }
            TrackerEvent::DecodeFailed {
                tracker: Some(tracker),
                message,
                ..
            } => write!(f, "tracker {tracker} decode failed: {message}"),
            TrackerEvent::DecodeFailed { message, .. } => write!(f, "decode failed: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let event = TrackerEvent::ButtonPressed {
            tracker: 0,
            button: Button::Main,
            count: 8,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "button_pressed");
        assert_eq!(json["button"], "main");
        assert_eq!(json["count"], 8);
        assert_eq!(json["event"], event.name());
    }

    #[test]
    fn decode_failed_serializes_kind() {
        let event = TrackerEvent::DecodeFailed {
            tracker: Some(1),
            kind: DecodeErrorKind::TooShort,
            message: "payload too short (3 bytes, need 20)".to_string(),
            payload: vec![1, 2, 3],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "too_short");
        assert_eq!(json["tracker"], 1);
        assert!(event.is_error());
    }

    #[test]
    fn presses_is_count_plus_one() {
        let event = TrackerEvent::ButtonPressed {
            tracker: 0,
            button: Button::Sub,
            count: 15,
        };
        assert_eq!(event.presses(), Some(16));
        assert_eq!(TrackerEvent::NoButtonChange { tracker: 0 }.presses(), None);
    }

    #[test]
    fn display_reads_like_operator_log() {
        let searching = TrackerEvent::DiscoveryStatus {
            tracker: 1,
            searching: true,
            raw_text: "7f7f7f7f7f7f".to_string(),
        };
        assert_eq!(searching.to_string(), "searching for tracker 1");

        let pressed = TrackerEvent::ButtonPressed {
            tracker: 0,
            button: Button::Main,
            count: 8,
        };
        assert_eq!(
            pressed.to_string(),
            "tracker 0 main button pressed, 9 presses"
        );
    }
}
