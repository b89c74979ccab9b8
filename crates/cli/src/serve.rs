//! NDJSON request loop for long-lived clients.
//!
//! Reads one request per line from stdin and writes exactly one response
//! line per request to stdout.
//!
//! ```text
//! $ sfpilot serve
//! {"id":"1","op":"session.start","input":{"orgAlias":"dev"}}
//! {"schemaVersion":1,"id":"1","op":"session.start","ok":true,"message":"Connected to dev as admin@dev.example","data":{...},"durationMs":5230}
//! {"id":"2","op":"form.picklist","input":{"label":"Stage","value":"Prospecting"}}
//! {"schemaVersion":1,"id":"2","op":"form.picklist","ok":false,"error":{"code":"SESSION_EXPIRED",...},"durationMs":12}
//! {"op":"quit"}
//! {"schemaVersion":1,"op":"quit","ok":true,"message":"bye","durationMs":0}
//! ```
//!
//! The loop ends on `quit`, end of input, or the shutdown future, and always
//! closes the browser session on the way out.

use std::future::Future;

use sfpilot::Error;
use sfpilot::protocol::{CommandRequest, CommandResponse};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::ops::{OpContext, handle};

/// `op` echoed for lines that could not be parsed as a request.
pub const UNPARSED_OP: &str = "unknown";

pub async fn serve<R, W, S>(cx: &OpContext, input: R, mut output: W, shutdown: S) -> anyhow::Result<()>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
	S: Future<Output = ()>,
{
	let mut reader = BufReader::new(input);
	let mut line = String::new();
	tokio::pin!(shutdown);

	info!(target = "sfpilot.serve", "ready");
	loop {
		line.clear();
		let read = tokio::select! {
			read = reader.read_line(&mut line) => read?,
			() = &mut shutdown => {
				info!(target = "sfpilot.serve", "interrupted");
				break;
			}
		};
		if read == 0 {
			debug!(target = "sfpilot.serve", "end of input");
			break;
		}

		let trimmed = line.trim();
		if trimmed.is_empty() {
			continue;
		}

		let request: CommandRequest = match serde_json::from_str(trimmed) {
			Ok(request) => request,
			Err(e) => {
				let error = Error::InvalidInput(format!("malformed request: {e}"));
				let response = CommandResponse::failure(None, UNPARSED_OP, error.to_command_error());
				write_response(&mut output, &response).await?;
				continue;
			}
		};

		let quit = request.op == "quit";
		let response = handle(cx, request).await;
		write_response(&mut output, &response).await?;
		if quit && response.ok {
			break;
		}
	}

	if cx.session().close().await {
		info!(target = "sfpilot.serve", "closed session on exit");
	}
	Ok(())
}

pub async fn write_response<W: AsyncWrite + Unpin>(output: &mut W, response: &CommandResponse) -> anyhow::Result<()> {
	let json = serde_json::to_string(response)?;
	output.write_all(json.as_bytes()).await?;
	output.write_all(b"\n").await?;
	output.flush().await?;
	Ok(())
}
