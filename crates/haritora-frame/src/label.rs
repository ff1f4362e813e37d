//! Channel labels.
//!
//! A label is a one-byte channel prefix followed by the decimal tracker index,
//! e.g. `X0`, `a1`, `r0`. Only labels present in the active [`LabelSet`] are
//! routed; anything else is ignored so new dongle channels don't break decoding.

use std::fmt;

/// Decoder a frame's payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Binary IMU packet (rotation + gravity).
    Imu,
    /// Tracker discovery / status text.
    Discovery,
    /// Button press counters.
    Button,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Imu, Channel::Discovery, Channel::Button];

    /// Wire prefix byte.
    pub const fn prefix(self) -> u8 {
        match self {
            Channel::Imu => b'X',
            Channel::Discovery => b'a',
            Channel::Button => b'r',
        }
    }

    pub fn from_prefix(prefix: u8) -> Option<Self> {
        match prefix {
            b'X' => Some(Channel::Imu),
            b'a' => Some(Channel::Discovery),
            b'r' => Some(Channel::Button),
            _ => None,
        }
    }
}

/// A channel plus the tracker index it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    pub channel: Channel,
    pub tracker: u8,
}

/// IMU data, tracker 0.
pub const X0: Label = Label::new(Channel::Imu, 0);

/// IMU data, tracker 1.
pub const X1: Label = Label::new(Channel::Imu, 1);

/// Discovery / status, tracker 0.
pub const A0: Label = Label::new(Channel::Discovery, 0);

/// Discovery / status, tracker 1.
pub const A1: Label = Label::new(Channel::Discovery, 1);

/// Button status, tracker 0.
pub const R0: Label = Label::new(Channel::Button, 0);

impl Label {
    pub const fn new(channel: Channel, tracker: u8) -> Self {
        Self { channel, tracker }
    }

    /// Parse a wire label. Rejects unknown prefixes, non-digit or
    /// zero-padded indices, and indices above 255.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let (&prefix, digits) = raw.split_first()?;
        let channel = Channel::from_prefix(prefix)?;

        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }
        if digits.len() > 1 && digits[0] == b'0' {
            return None;
        }

        let tracker = std::str::from_utf8(digits).ok()?.parse().ok()?;
        Some(Self { channel, tracker })
    }

    /// Wire form of the label.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.channel.prefix() as char, self.tracker)
    }
}

/// Labels the router accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    /// The labels the GX6 dongle is known to send.
    pub fn observed() -> Self {
        Self {
            labels: vec![X0, X1, A0, A1, R0],
        }
    }

    /// Every channel for trackers `0..count`.
    pub fn for_trackers(count: u8) -> Self {
        let labels = (0..count)
            .flat_map(|tracker| {
                Channel::ALL
                    .into_iter()
                    .map(move |channel| Label::new(channel, tracker))
            })
            .collect();
        Self { labels }
    }

    /// Add a label to the set.
    pub fn with_label(mut self, label: Label) -> Self {
        if !self.contains(&label) {
            self.labels.push(label);
        }
        self
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// Parse a raw label and return it if the set accepts it.
    pub fn resolve(&self, raw: &[u8]) -> Option<Label> {
        Label::parse(raw).filter(|label| self.contains(label))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::observed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_observed_labels() {
        assert_eq!(Label::parse(b"X0"), Some(X0));
        assert_eq!(Label::parse(b"X1"), Some(X1));
        assert_eq!(Label::parse(b"a0"), Some(A0));
        assert_eq!(Label::parse(b"a1"), Some(A1));
        assert_eq!(Label::parse(b"r0"), Some(R0));
    }

    #[test]
    fn parses_multi_digit_index() {
        assert_eq!(
            Label::parse(b"X12"),
            Some(Label::new(Channel::Imu, 12))
        );
    }

    #[test]
    fn rejects_malformed_labels() {
        assert_eq!(Label::parse(b""), None);
        assert_eq!(Label::parse(b"X"), None);
        assert_eq!(Label::parse(b"z9"), None);
        assert_eq!(Label::parse(b"x0"), None);
        assert_eq!(Label::parse(b"X00"), None);
        assert_eq!(Label::parse(b"X-1"), None);
        assert_eq!(Label::parse(b"X256"), None);
        assert_eq!(Label::parse(b" X0"), None);
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(X1.encode(), "X1");
        assert_eq!(Label::new(Channel::Button, 3).to_string(), "r3");
    }

    #[test]
    fn observed_set_has_single_button_label() {
        let set = LabelSet::default();
        assert_eq!(set.len(), 5);
        assert_eq!(set.resolve(b"r0"), Some(R0));
        assert_eq!(set.resolve(b"r1"), None);
        assert_eq!(set.resolve(b"X2"), None);
    }

    #[test]
    fn for_trackers_covers_every_channel() {
        let set = LabelSet::for_trackers(3);
        assert_eq!(set.len(), 9);
        for channel in Channel::ALL {
            for tracker in 0..3 {
                assert!(set.contains(&Label::new(channel, tracker)));
            }
        }
        assert!(!set.contains(&Label::new(Channel::Imu, 3)));
    }

    #[test]
    fn with_label_extends_without_duplicates() {
        let set = LabelSet::observed()
            .with_label(Label::new(Channel::Button, 1))
            .with_label(R0);
        assert_eq!(set.len(), 6);
        assert_eq!(set.resolve(b"r1"), Some(Label::new(Channel::Button, 1)));
    }
}
