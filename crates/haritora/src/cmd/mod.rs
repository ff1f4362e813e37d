use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use haritora_decode::PipelineConfig;
use haritora_frame::{FrameConfig, LabelSet, DEFAULT_MAX_FRAME_SIZE};
use haritora_transport::{DEFAULT_HOST, DEFAULT_PORT};

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod listen;
pub mod replay;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Listen for the serial relay and print decoded tracker events.
    Listen(ListenArgs),
    /// Decode a captured byte stream from a file or stdin.
    Replay(ReplayArgs),
    /// Relay a captured byte stream to a listening decoder.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, debug: bool) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format, debug),
        Command::Replay(args) => replay::run(args, format, debug),
        Command::Send(args) => send::run(args),
        Command::Version(args) => version::run(args),
    }
}

/// Decoder options shared by `listen` and `replay`.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Accept labels for trackers 0..N on every channel (default: the labels the dongle sends).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..))]
    pub trackers: Option<u8>,
    /// Largest frame accepted before it is dropped, in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,
}

impl PipelineArgs {
    pub fn to_config(&self, read_timeout: Option<Duration>, debug: bool) -> PipelineConfig {
        PipelineConfig {
            frame: FrameConfig {
                max_frame_size: self.max_frame_size,
                read_timeout,
            },
            labels: self
                .trackers
                .map(LabelSet::for_trackers)
                .unwrap_or_default(),
            log_raw_frames: debug,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind.
    #[arg(long, env = "HARITORA_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Port to bind.
    #[arg(long, short = 'p', env = "HARITORA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Exit after printing N events.
    #[arg(long)]
    pub count: Option<usize>,
    /// Drop a connection that stays silent this long (e.g. 30s, 500ms).
    #[arg(long)]
    pub read_timeout: Option<String>,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Capture file to decode, or `-` for stdin.
    pub input: PathBuf,
    /// Print pipeline counters after the events.
    #[arg(long)]
    pub stats: bool,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Capture file to send, or `-` for stdin.
    pub input: PathBuf,
    /// Decoder host.
    #[arg(long, env = "HARITORA_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Decoder port.
    #[arg(long, short = 'p', env = "HARITORA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open `path` for reading; `-` means stdin.
pub fn open_input(path: &Path) -> CliResult<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(std::io::stdin().lock()));
    }
    let file = File::open(path)
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
    Ok(Box::new(file))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    })
}
