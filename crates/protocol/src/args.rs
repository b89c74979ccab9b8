//! Typed argument records, one per operation.
//!
//! Field names are camelCase on the wire. Optional fields fall back to the
//! configured defaults of the running server.

use serde::{Deserialize, Serialize};

/// Browser engine family to launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
	#[default]
	Chromium,
	Firefox,
	Webkit,
}

impl std::fmt::Display for BrowserKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			BrowserKind::Chromium => write!(f, "chromium"),
			BrowserKind::Firefox => write!(f, "firefox"),
			BrowserKind::Webkit => write!(f, "webkit"),
		}
	}
}

impl std::str::FromStr for BrowserKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"chromium" | "chrome" => Ok(BrowserKind::Chromium),
			"firefox" => Ok(BrowserKind::Firefox),
			"webkit" | "safari" => Ok(BrowserKind::Webkit),
			_ => Err(format!("unknown browser: {s}")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
	pub width: u32,
	pub height: u32,
}

impl Default for Viewport {
	fn default() -> Self {
		Self { width: 1920, height: 1080 }
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionArgs {
	/// Org alias or username known to the credential source.
	#[serde(default)]
	pub org_alias: Option<String>,
	#[serde(default)]
	pub browser: Option<BrowserKind>,
	#[serde(default)]
	pub headless: Option<bool>,
	#[serde(default)]
	pub viewport: Option<Viewport>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheArgs {
	#[serde(default)]
	pub org_alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateArgs {
	/// Relative in-app path (`/lightning/...`) or absolute URL on the instance.
	pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectHomeArgs {
	pub object_name: String,
	/// List view API name to open instead of the default.
	#[serde(default)]
	pub filter: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordMode {
	#[default]
	View,
	Edit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordArgs {
	pub record_id: String,
	#[serde(default)]
	pub object_name: Option<String>,
	#[serde(default)]
	pub mode: RecordMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecordArgs {
	pub object_name: String,
	#[serde(default)]
	pub record_type_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedListArgs {
	pub object_name: String,
	pub record_id: String,
	/// Relationship API name, e.g. `Contacts`.
	pub relationship: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupArgs {
	/// Setup node name, e.g. `Users` or `CustomSettings`. Omit for Setup home.
	#[serde(default)]
	pub section: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectManagerArgs {
	pub object_name: String,
	/// Friendly (`Fields`, `Triggers`) or path (`FieldsAndRelationships`) section name.
	#[serde(default)]
	pub section: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAppArgs {
	pub app_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillFieldArgs {
	pub label: String,
	pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PicklistArgs {
	pub label: String,
	pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupArgs {
	pub label: String,
	pub search: String,
	/// Zero-based result index; out-of-range values select the first result.
	#[serde(default)]
	pub index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxArgs {
	pub label: String,
	pub checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateArgs {
	pub label: String,
	/// Date in the format the org's locale expects, e.g. `12/31/2026`.
	pub date: String,
	#[serde(default)]
	pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickArgs {
	pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveArgs {
	#[serde(default)]
	pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickFindArgs {
	pub term: String,
	/// Result entry to click after searching; `true` opens the entry matching `term`.
	#[serde(default)]
	pub open: Option<QuickFindOpen>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuickFindOpen {
	Term(bool),
	Entry(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitArgs {
	/// Named condition: `spinners`, `stencils`, `app`, `form`, `modal`, `modalClosed`,
	/// `toast`, `listView`, `recordPage`, `setupPage`, `smart`.
	pub condition: String,
	#[serde(default)]
	pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureArgs {
	#[serde(default)]
	pub full_page: bool,
}
