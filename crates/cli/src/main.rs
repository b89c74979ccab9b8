use clap::Parser;
use sfpilot_cli::{app, cli::Cli, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	match app::run(cli).await {
		Ok(true) => {}
		Ok(false) => std::process::exit(1),
		Err(err) => {
			eprintln!("sfpilot: {err:#}");
			std::process::exit(2);
		}
	}
}
