use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use haritora_decode::Pipeline;
use tracing::info;

use crate::cmd::listen::PrintSink;
use crate::cmd::{open_input, ReplayArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_stats, OutputFormat};

pub fn run(args: ReplayArgs, format: OutputFormat, debug: bool) -> CliResult<i32> {
    let input = open_input(&args.input)?;
    let mut pipeline = Pipeline::with_config(args.pipeline.to_config(None, debug));
    let mut sink = PrintSink::new(
        format,
        args.input.display().to_string(),
        None,
        Arc::new(AtomicBool::new(true)),
    );

    let emitted = pipeline
        .drain(input, &mut sink)
        .map_err(|err| frame_error("replay failed", err))?;

    let stats = pipeline.stats();
    info!(
        emitted,
        frames = stats.frames,
        decode_errors = stats.decode_errors,
        no_delimiter = stats.no_delimiter,
        unrecognized_labels = stats.unrecognized_labels,
        "replay finished"
    );
    if args.stats {
        print_stats(&stats, format);
    }

    Ok(SUCCESS)
}
