use serde::Serialize;
use tokio::time::Instant;

/// Lifecycle of the browser session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
	#[default]
	Disconnected,
	Connecting,
	Connected,
	Error,
}

impl SessionStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			SessionStatus::Disconnected => "disconnected",
			SessionStatus::Connecting => "connecting",
			SessionStatus::Connected => "connected",
			SessionStatus::Error => "error",
		}
	}
}

impl std::fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Point-in-time view of the session, safe to serialize (no tokens).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
	pub status: SessionStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub org_alias: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub org_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub instance_url: Option<String>,
	/// Seconds since the last successful liveness check.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub idle_secs: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_error: Option<String>,
}

#[derive(Debug, Default)]
pub(super) struct Snapshot {
	pub info: SessionInfo,
	pub last_activity: Option<Instant>,
}

impl Snapshot {
	pub fn view(&self) -> SessionInfo {
		let mut info = self.info.clone();
		info.idle_secs = self.last_activity.map(|at| at.elapsed().as_secs());
		info
	}
}
