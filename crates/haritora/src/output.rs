use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use haritora_decode::{PipelineStats, TrackerEvent};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    #[serde(flatten)]
    event: &'a TrackerEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    presses: Option<u16>,
    source: &'a str,
    timestamp: String,
}

pub fn print_event(event: &TrackerEvent, source: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EventOutput {
                event,
                presses: event.presses(),
                source,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT", "TRACKER", "SOURCE", "DETAIL"])
                .add_row(vec![
                    event.name().to_string(),
                    tracker_cell(event),
                    source.to_string(),
                    event_detail(event),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("[{source}] {event}");
        }
    }
}

pub fn print_stats(stats: &PipelineStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(stats).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["COUNTER", "VALUE"])
                .add_row(vec!["frames".to_string(), stats.frames.to_string()])
                .add_row(vec!["events".to_string(), stats.events.to_string()])
                .add_row(vec![
                    "decode_errors".to_string(),
                    stats.decode_errors.to_string(),
                ])
                .add_row(vec![
                    "no_delimiter".to_string(),
                    stats.no_delimiter.to_string(),
                ])
                .add_row(vec![
                    "unrecognized_labels".to_string(),
                    stats.unrecognized_labels.to_string(),
                ])
                .add_row(vec![
                    "oversized_frames".to_string(),
                    stats.oversized_frames.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frames={} events={} decode_errors={} no_delimiter={} unrecognized_labels={} oversized_frames={}",
                stats.frames,
                stats.events,
                stats.decode_errors,
                stats.no_delimiter,
                stats.unrecognized_labels,
                stats.oversized_frames
            );
        }
    }
}

fn tracker_cell(event: &TrackerEvent) -> String {
    event
        .tracker()
        .map(|tracker| tracker.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn event_detail(event: &TrackerEvent) -> String {
    match event {
        TrackerEvent::RotationGravity {
            rotation: r,
            gravity: g,
            ..
        } => format!(
            "rot=({:.4}, {:.4}, {:.4}, {:.4}) grav=({:.4}, {:.4}, {:.4})",
            r.x, r.y, r.z, r.w, g.x, g.y, g.z
        ),
        TrackerEvent::DiscoveryStatus {
            searching: true, ..
        } => "searching".to_string(),
        TrackerEvent::DiscoveryStatus { raw_text, .. } => raw_text.clone(),
        TrackerEvent::ButtonPressed { button, count, .. } => format!(
            "{} count={count} presses={}",
            button.as_str(),
            event.presses().unwrap_or_default()
        ),
        TrackerEvent::NoButtonChange { .. } => "unchanged".to_string(),
        TrackerEvent::DecodeFailed {
            message, payload, ..
        } => format!("{message} payload={}", payload_preview(payload)),
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
