//! Wires configuration to concrete adapters and runs one subcommand.

use std::io::Write;
use std::sync::Arc;

use serde_json::Value;
use sfpilot::credentials::CredentialCache;
use sfpilot::protocol::{CommandRequest, CommandResponse};
use sfpilot::{Error, SessionCoordinator};
use tracing::debug;

use crate::cli::{Cli, Commands, ExecArgs};
use crate::config::PilotConfig;
use crate::ops::{OpContext, handle};
use crate::playwright::PlaywrightEngine;
use crate::serve::serve;
use crate::sf_cli::SfCli;

pub fn build_context(config: &PilotConfig) -> OpContext {
	let source = Arc::new(SfCli::new(config.sf_bin.clone()));
	let credentials = Arc::new(CredentialCache::new(source, config.session.credential_ttl()));
	let session = SessionCoordinator::new(
		Arc::new(PlaywrightEngine::new()),
		credentials,
		config.timeouts.clone(),
		config.session.clone(),
	);
	OpContext::new(session, config.browser.clone())
}

/// Runs the parsed command. `Ok(false)` means an operation answered with
/// `ok: false` and the process should exit non-zero.
pub async fn run(cli: Cli) -> anyhow::Result<bool> {
	let config = PilotConfig::resolve(&cli)?;
	debug!(target = "sfpilot.serve", ?config, "resolved configuration");
	let cx = build_context(&config);

	match cli.command {
		Commands::Serve => {
			let shutdown = async {
				let _ = tokio::signal::ctrl_c().await;
			};
			serve(&cx, tokio::io::stdin(), tokio::io::stdout(), shutdown).await?;
			Ok(true)
		}
		Commands::Exec(args) => print_response(&exec(&cx, &args).await),
		Commands::Orgs => {
			let args = ExecArgs {
				op: "org.list".into(),
				input: None,
			};
			print_response(&exec(&cx, &args).await)
		}
	}
}

/// One request, one response. Any browser the operation opened is closed
/// before returning.
pub async fn exec(cx: &OpContext, args: &ExecArgs) -> CommandResponse {
	let input = match args.input.as_deref().map(serde_json::from_str::<Value>) {
		None => Value::Object(Default::default()),
		Some(Ok(input)) => input,
		Some(Err(e)) => {
			let error = Error::InvalidInput(format!("--input is not valid JSON: {e}"));
			return CommandResponse::failure(None, args.op.clone(), error.to_command_error());
		}
	};

	let request = CommandRequest {
		id: None,
		op: args.op.clone(),
		input,
	};
	let response = handle(cx, request).await;
	cx.session().close().await;
	response
}

fn print_response(response: &CommandResponse) -> anyhow::Result<bool> {
	let mut stdout = std::io::stdout().lock();
	serde_json::to_writer(&mut stdout, response)?;
	writeln!(stdout)?;
	stdout.flush()?;
	Ok(response.ok)
}
