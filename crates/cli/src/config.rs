//! Runtime configuration: config file, then environment, then flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use sfpilot::config::{BrowserSettings, SessionSettings, Timeouts};
use sfpilot::protocol::args::Viewport;

use crate::cli::Cli;

pub const CONFIG_DIR: &str = "sfpilot";
pub const CONFIG_FILE: &str = "config.json";

/// Everything the server reads at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PilotConfig {
	pub timeouts: Timeouts,
	pub browser: BrowserSettings,
	pub session: SessionSettings,
	/// Explicit `sf` binary; otherwise found on `PATH`.
	pub sf_bin: Option<PathBuf>,
}

impl PilotConfig {
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
	}

	/// Reads `path`, or the default location when `None`. A missing default
	/// file yields the built-in defaults; a missing explicit file is an error.
	pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
		let (path, required) = match path {
			Some(path) => (path.to_path_buf(), true),
			None => match Self::default_path() {
				Some(path) => (path, false),
				None => return Ok(Self::default()),
			},
		};

		if !path.exists() {
			if required {
				bail!("config file not found: {}", path.display());
			}
			return Ok(Self::default());
		}

		let content = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
		serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
	}

	/// Applies `SFPILOT_*` overrides. `lookup` is `std::env::var` in production.
	pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
		if let Some(browser) = lookup("SFPILOT_BROWSER") {
			self.browser.browser = browser.parse().map_err(anyhow::Error::msg).context("SFPILOT_BROWSER")?;
		}
		if let Some(headless) = lookup("SFPILOT_HEADLESS") {
			self.browser.headless = parse_flag(&headless).context("SFPILOT_HEADLESS")?;
		}
		if let Some(viewport) = lookup("SFPILOT_VIEWPORT") {
			self.browser.viewport = parse_viewport(&viewport).context("SFPILOT_VIEWPORT")?;
		}
		if let Some(org) = lookup("SFPILOT_DEFAULT_ORG").filter(|s| !s.is_empty()) {
			self.session.default_org = Some(org);
		}
		if let Some(bin) = lookup("SFPILOT_SF_BIN").filter(|s| !s.is_empty()) {
			self.sf_bin = Some(PathBuf::from(bin));
		}
		Ok(())
	}

	pub fn apply_flags(&mut self, cli: &Cli) {
		if let Some(browser) = cli.browser {
			self.browser.browser = browser;
		}
		if cli.headed {
			self.browser.headless = false;
		}
		if let Some(org) = &cli.org {
			self.session.default_org = Some(org.clone());
		}
	}

	/// File, environment and flags, in increasing precedence.
	pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
		let mut config = Self::load(cli.config.as_deref())?;
		config.apply_env(|key| std::env::var(key).ok())?;
		config.apply_flags(cli);
		Ok(config)
	}
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		other => bail!("expected a boolean, got {other:?}"),
	}
}

/// `WIDTHxHEIGHT`, e.g. `1280x800`.
fn parse_viewport(value: &str) -> anyhow::Result<Viewport> {
	let re = regex_lite::Regex::new(r"^\s*(\d{2,5})\s*[xX]\s*(\d{2,5})\s*$")?;
	let Some(caps) = re.captures(value) else {
		bail!("expected WIDTHxHEIGHT, got {value:?}");
	};
	Ok(Viewport {
		width: caps[1].parse()?,
		height: caps[2].parse()?,
	})
}
