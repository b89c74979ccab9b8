#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sfpilot::protocol::args::BrowserKind;

/// Root CLI for sfpilot.
#[derive(Parser, Debug)]
#[command(name = "sfpilot")]
#[command(about = "Reliable Salesforce Lightning automation over Playwright")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Configuration file (default: <config dir>/sfpilot/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Browser engine to launch sessions with
	#[arg(long, global = true, value_name = "ENGINE", value_parser = parse_browser)]
	pub browser: Option<BrowserKind>,

	/// Show the browser window
	#[arg(long, global = true)]
	pub headed: bool,

	/// Org alias used when session.start gives none
	#[arg(long, global = true, value_name = "ALIAS")]
	pub org: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Stream request envelopes over stdin/stdout (NDJSON).
	Serve,
	/// Execute a single operation and exit.
	Exec(ExecArgs),
	/// List locally authorized orgs.
	Orgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
	/// Operation name (for example: ping, org.list, session.status).
	#[arg(value_name = "OP")]
	pub op: String,

	/// JSON object for operation input.
	#[arg(long, value_name = "JSON")]
	pub input: Option<String>,
}

fn parse_browser(s: &str) -> Result<BrowserKind, String> {
	s.parse()
}
