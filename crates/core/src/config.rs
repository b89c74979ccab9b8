//! Tunable policy: timeouts, poll intervals, browser and session settings.
//!
//! The defaults are empirical values for a typical Lightning org. All fields
//! are plain milliseconds/seconds so a JSON config file can override them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sfpilot_protocol::args::{BrowserKind, Viewport};

/// Per-operation timeouts and poll intervals, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timeouts {
	pub spinner_ms: u64,
	pub stencil_ms: u64,
	pub navigation_ms: u64,
	pub element_ms: u64,
	pub modal_ms: u64,
	pub toast_ms: u64,
	/// Saves are slow on busy orgs; the toast wait after a save uses this.
	pub save_toast_ms: u64,
	pub form_ms: u64,
	pub page_ready_ms: u64,
	pub spinner_poll_ms: u64,
	pub navigation_poll_ms: u64,
	pub element_poll_ms: u64,
	pub picklist_settle_ms: u64,
	pub quick_find_settle_ms: u64,
	pub launcher_fallback_ms: u64,
}

impl Default for Timeouts {
	fn default() -> Self {
		Self {
			spinner_ms: 15_000,
			stencil_ms: 15_000,
			navigation_ms: 30_000,
			element_ms: 10_000,
			modal_ms: 10_000,
			toast_ms: 10_000,
			save_toast_ms: 20_000,
			form_ms: 15_000,
			page_ready_ms: 20_000,
			spinner_poll_ms: 250,
			navigation_poll_ms: 500,
			element_poll_ms: 200,
			picklist_settle_ms: 300,
			quick_find_settle_ms: 800,
			launcher_fallback_ms: 1_000,
		}
	}
}

impl Timeouts {
	pub fn spinner(&self) -> Duration {
		Duration::from_millis(self.spinner_ms)
	}

	pub fn stencil(&self) -> Duration {
		Duration::from_millis(self.stencil_ms)
	}

	pub fn navigation(&self) -> Duration {
		Duration::from_millis(self.navigation_ms)
	}

	pub fn element(&self) -> Duration {
		Duration::from_millis(self.element_ms)
	}

	pub fn modal(&self) -> Duration {
		Duration::from_millis(self.modal_ms)
	}

	pub fn toast(&self) -> Duration {
		Duration::from_millis(self.toast_ms)
	}

	pub fn save_toast(&self) -> Duration {
		Duration::from_millis(self.save_toast_ms)
	}

	pub fn form(&self) -> Duration {
		Duration::from_millis(self.form_ms)
	}

	pub fn page_ready(&self) -> Duration {
		Duration::from_millis(self.page_ready_ms)
	}

	pub fn spinner_poll(&self) -> Duration {
		Duration::from_millis(self.spinner_poll_ms)
	}

	pub fn navigation_poll(&self) -> Duration {
		Duration::from_millis(self.navigation_poll_ms)
	}

	pub fn element_poll(&self) -> Duration {
		Duration::from_millis(self.element_poll_ms)
	}

	pub fn picklist_settle(&self) -> Duration {
		Duration::from_millis(self.picklist_settle_ms)
	}

	pub fn quick_find_settle(&self) -> Duration {
		Duration::from_millis(self.quick_find_settle_ms)
	}

	pub fn launcher_fallback(&self) -> Duration {
		Duration::from_millis(self.launcher_fallback_ms)
	}
}

/// Browser launch defaults; `session.start` arguments override them per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserSettings {
	pub browser: BrowserKind,
	pub headless: bool,
	pub viewport: Viewport,
	pub user_agent: Option<String>,
}

impl Default for BrowserSettings {
	fn default() -> Self {
		Self {
			browser: BrowserKind::Chromium,
			headless: true,
			viewport: Viewport::default(),
			user_agent: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
	/// Org used by `session.start` when no alias is given.
	pub default_org: Option<String>,
	/// Cached org credentials older than this are refetched.
	pub credential_ttl_secs: u64,
	/// Interval of the background credential-freshness check.
	pub refresh_interval_secs: u64,
}

impl Default for SessionSettings {
	fn default() -> Self {
		Self {
			default_org: None,
			credential_ttl_secs: 30 * 60,
			refresh_interval_secs: 30 * 60,
		}
	}
}

impl SessionSettings {
	pub fn credential_ttl(&self) -> Duration {
		Duration::from_secs(self.credential_ttl_secs)
	}

	pub fn refresh_interval(&self) -> Duration {
		Duration::from_secs(self.refresh_interval_secs)
	}
}
