use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter used when `RUST_LOG` is unset. Directives match module paths.
fn default_filter(verbosity: u8) -> &'static str {
	// 0 = errors only, and nothing from the Playwright driver bindings
	// 1 (-v) = info for the sfpilot crates, warn for everything else
	// 2+ (-vv) = debug for everything
	match verbosity {
		0 => "error,playwright_rs=off",
		1 => "warn,sfpilot=info,sfpilot_cli=info",
		_ => "debug",
	}
}

/// Logs go to stderr; stdout carries protocol responses only.
pub fn init_logging(verbosity: u8) {
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_filters_parse_and_name_the_crate_modules() {
		for verbosity in 0..=3 {
			let filter = default_filter(verbosity);
			assert!(EnvFilter::try_new(filter).is_ok(), "{filter}");
		}
		let info = default_filter(1);
		assert!(info.contains("sfpilot=info"));
		assert!(info.contains("sfpilot_cli=info"));
		assert!(!info.contains("sfpilot."));
	}
}
