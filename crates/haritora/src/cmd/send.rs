use haritora_transport::TcpSource;
use tracing::info;

use crate::cmd::{open_input, SendArgs};
use crate::exit::{io_error, transport_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let mut input = open_input(&args.input)?;

    let addr = format!("{}:{}", args.host, args.port);
    let mut stream =
        TcpSource::connect(addr.as_str()).map_err(|err| transport_error("connect failed", err))?;

    let sent = std::io::copy(&mut input, &mut stream)
        .map_err(|err| io_error("send failed", err))?;
    stream
        .finish()
        .map_err(|err| transport_error("shutdown failed", err))?;

    info!(%addr, sent, "capture sent");
    Ok(SUCCESS)
}
