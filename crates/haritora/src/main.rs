mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, open_debug_log, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "haritora",
    version,
    about = "Decode HaritoraX Wireless tracker data relayed from the GX6 dongle"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Log raw frames at debug level and copy all logs to debug_log_<time>.txt.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    let (level, log_file) = if cli.debug {
        match open_debug_log() {
            Ok(opened) => (LogLevel::Debug, Some(opened)),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(err.code);
            }
        }
    } else {
        (cli.log_level, None)
    };

    let log_path = log_file.as_ref().map(|(path, _)| path.clone());
    init_logging(cli.log_format, level, log_file.map(|(_, file)| file));
    if let Some(path) = log_path {
        tracing::debug!(path = %path.display(), "debug mode enabled, logging raw frames");
    }

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format, cli.debug);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listen_defaults() {
        let cli = Cli::try_parse_from(["haritora", "listen"]).expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.host, "127.0.0.1");
                assert_eq!(args.port, 9876);
                assert_eq!(args.count, None);
                assert_eq!(args.pipeline.trackers, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.debug);
    }

    #[test]
    fn parses_global_debug_after_subcommand() {
        let cli = Cli::try_parse_from(["haritora", "listen", "--port", "9000", "--debug"])
            .expect("debug flag should parse");
        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Listen(ref args) if args.port == 9000));
    }

    #[test]
    fn parses_replay_with_stdin() {
        let cli = Cli::try_parse_from(["haritora", "--format", "json", "replay", "-"])
            .expect("replay args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Replay(_)));
    }

    #[test]
    fn rejects_zero_trackers() {
        let err = Cli::try_parse_from(["haritora", "listen", "--trackers", "0"])
            .expect_err("zero trackers should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
