//! Tracker discovery / status channel (`a<n>`).
//!
//! While the dongle is pairing it repeats a fixed sentinel. Anything else is
//! status text whose meaning isn't known yet; it is passed through verbatim.

use crate::error::Result;
use crate::event::TrackerEvent;

/// Payload the dongle sends while searching for a tracker.
pub const SEARCHING_SENTINEL: &str = "7f7f7f7f7f7f";

/// Decode a discovery payload for `tracker`.
pub fn decode_discovery(tracker: u8, payload: &[u8]) -> Result<TrackerEvent> {
    let text = std::str::from_utf8(payload)?;
    Ok(TrackerEvent::DiscoveryStatus {
        tracker,
        searching: text.trim() == SEARCHING_SENTINEL,
        raw_text: text.to_string(),
    })
}
