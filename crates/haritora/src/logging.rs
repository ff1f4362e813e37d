use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use tracing_subscriber::fmt::writer::{MakeWriter, MakeWriterExt};

use crate::exit::{io_error, CliResult};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }
}

/// Create `debug_log_<unix-seconds>.txt` in the working directory.
pub fn open_debug_log() -> CliResult<(PathBuf, File)> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let path = PathBuf::from(format!("debug_log_{stamp}.txt"));
    let file = File::create(&path)
        .map_err(|err| io_error(&format!("failed creating {}", path.display()), err))?;
    Ok((path, file))
}

/// Install the global subscriber on stderr, teeing into `log_file` when given.
pub fn init_logging(format: LogFormat, level: LogLevel, log_file: Option<File>) {
    match log_file {
        Some(file) => install(format, level, std::io::stderr.and(Mutex::new(file))),
        None => install(format, level, std::io::stderr),
    }
}

fn install<W>(format: LogFormat, level: LogLevel, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
