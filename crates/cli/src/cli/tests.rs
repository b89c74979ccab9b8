use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_serve_command() {
	let cli = Cli::try_parse_from(["sfpilot", "serve"]).unwrap();
	assert!(matches!(cli.command, Commands::Serve));
	assert_eq!(cli.verbose, 0);
	assert!(!cli.headed);
}

#[test]
fn parse_exec_with_input() {
	let args = vec!["sfpilot", "exec", "nav.objectHome", "--input", r#"{"objectName":"Account"}"#];
	let cli = Cli::try_parse_from(args).unwrap();

	match cli.command {
		Commands::Exec(args) => {
			assert_eq!(args.op, "nav.objectHome");
			assert_eq!(args.input.as_deref(), Some(r#"{"objectName":"Account"}"#));
		}
		_ => panic!("Expected Exec command"),
	}
}

#[test]
fn exec_input_is_optional() {
	let cli = Cli::try_parse_from(["sfpilot", "exec", "ping"]).unwrap();
	match cli.command {
		Commands::Exec(args) => assert!(args.input.is_none()),
		_ => panic!("Expected Exec command"),
	}
}

#[test]
fn global_flags_after_subcommand() {
	let args = vec!["sfpilot", "serve", "-vv", "--browser", "firefox", "--headed", "--org", "dev"];
	let cli = Cli::try_parse_from(args).unwrap();
	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.browser, Some(BrowserKind::Firefox));
	assert!(cli.headed);
	assert_eq!(cli.org.as_deref(), Some("dev"));
}

#[test]
fn config_path_flag() {
	let cli = Cli::try_parse_from(["sfpilot", "--config", "/tmp/sfpilot.json", "orgs"]).unwrap();
	assert_eq!(cli.config, Some(PathBuf::from("/tmp/sfpilot.json")));
	assert!(matches!(cli.command, Commands::Orgs));
}

#[test]
fn unknown_browser_is_rejected() {
	assert!(Cli::try_parse_from(["sfpilot", "--browser", "opera", "serve"]).is_err());
}

#[test]
fn exec_requires_op() {
	assert!(Cli::try_parse_from(["sfpilot", "exec"]).is_err());
}
