use serde_json::json;
use sfpilot_protocol::{CommandError, ErrorCode};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("no active session")]
	SessionNotStarted,

	#[error("session no longer responds: {reason}")]
	SessionExpired { reason: String },

	#[error("org not found: {alias}")]
	OrgNotFound { alias: String },

	#[error("authentication failed for {alias}: {message}")]
	AuthenticationFailed { alias: String, message: String },

	#[error("credential source failed: {0}")]
	CredentialSource(String),

	#[error("{action}: no element found for {target:?}")]
	ElementNotFound { action: &'static str, target: String },

	#[error("select picklist value: no option {value:?} in {label:?}")]
	OptionNotFound { label: String, value: String },

	#[error("select lookup result: no results in {label:?} for {search:?}")]
	NoLookupResults { label: String, search: String },

	#[error("open app: app launcher search input not found while looking for {app:?}")]
	LauncherSearchNotFound { app: String },

	#[error("open app: no app launcher entry matched {app:?}")]
	LauncherEntryNotFound { app: String },

	#[error("timeout after {ms}ms waiting for: {condition}")]
	Timeout { condition: String, ms: u64 },

	#[error("navigation timeout after {ms}ms at {url}: {detail}")]
	NavigationTimeout { url: String, ms: u64, detail: String },

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("{action} failed: {message}")]
	Engine { action: &'static str, message: String },

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Wraps a browser engine failure with the action that was attempted.
	pub fn engine(action: &'static str, err: impl std::fmt::Display) -> Self {
		Error::Engine {
			action,
			message: err.to_string(),
		}
	}

	pub fn element_not_found(action: &'static str, target: impl Into<String>) -> Self {
		Error::ElementNotFound {
			action,
			target: target.into(),
		}
	}

	pub fn code(&self) -> ErrorCode {
		match self {
			Error::SessionNotStarted => ErrorCode::SessionNotStarted,
			Error::SessionExpired { .. } => ErrorCode::SessionExpired,
			Error::OrgNotFound { .. } => ErrorCode::OrgNotFound,
			Error::AuthenticationFailed { .. } | Error::CredentialSource(_) => ErrorCode::AuthenticationFailed,
			Error::ElementNotFound { .. }
			| Error::OptionNotFound { .. }
			| Error::NoLookupResults { .. }
			| Error::LauncherSearchNotFound { .. }
			| Error::LauncherEntryNotFound { .. } => ErrorCode::ElementNotFound,
			Error::Timeout { .. } => ErrorCode::Timeout,
			Error::NavigationTimeout { .. } => ErrorCode::NavigationTimeout,
			Error::InvalidInput(_) => ErrorCode::InvalidInput,
			Error::Engine { message, .. } => classify_engine_message(message),
			Error::Json(_) => ErrorCode::InternalError,
		}
	}

	/// Remediation hint shown next to the error.
	pub fn suggestion(&self) -> &'static str {
		match self {
			Error::LauncherSearchNotFound { .. } => {
				"The App Launcher opened without a search box. Capture the page to inspect it, or navigate by URL instead."
			}
			Error::LauncherEntryNotFound { .. } => {
				"Check the app name as shown in the App Launcher and that the user has access to it."
			}
			Error::OptionNotFound { .. } => "Check the picklist value spelling; capture the page to see the available options.",
			Error::NoLookupResults { .. } => "Try a broader search term or confirm the related record exists.",
			_ => match self.code() {
				ErrorCode::SessionNotStarted => "Start a session with session.start before using page operations.",
				ErrorCode::SessionExpired => "The browser session stopped responding. Run session.start again to restart it.",
				ErrorCode::OrgNotFound => "Check the alias against org.list, or authorize the org with `sf org login web`.",
				ErrorCode::AuthenticationFailed => "Re-authenticate the org with `sf org login web` and start a new session.",
				ErrorCode::NavigationTimeout => {
					"The page did not finish loading. Check network access to the org, then retry or raise the navigation timeout."
				}
				ErrorCode::InvalidInput => "Check the operation name and its arguments.",
				_ => "Use page.capture to inspect the current page state, then retry.",
			},
		}
	}

	/// Structured context for the failure envelope.
	pub fn details(&self) -> Option<serde_json::Value> {
		match self {
			Error::OrgNotFound { alias } | Error::AuthenticationFailed { alias, .. } => Some(json!({ "orgAlias": alias })),
			Error::ElementNotFound { action, target } => Some(json!({ "action": action, "target": target })),
			Error::OptionNotFound { label, value } => Some(json!({ "label": label, "value": value })),
			Error::NoLookupResults { label, search } => Some(json!({ "label": label, "search": search })),
			Error::LauncherSearchNotFound { app } | Error::LauncherEntryNotFound { app } => Some(json!({ "appName": app })),
			Error::Timeout { condition, ms } => Some(json!({ "condition": condition, "timeoutMs": ms })),
			Error::NavigationTimeout { url, ms, detail } => Some(json!({ "url": url, "timeoutMs": ms, "detail": detail })),
			Error::Engine { action, .. } => Some(json!({ "action": action })),
			_ => None,
		}
	}

	pub fn to_command_error(&self) -> CommandError {
		CommandError {
			code: self.code(),
			message: self.to_string(),
			suggestion: self.suggestion().to_string(),
			details: self.details(),
		}
	}
}

/// Engine messages are free text; pick the closest code.
fn classify_engine_message(msg: &str) -> ErrorCode {
	let lower = msg.to_ascii_lowercase();
	if lower.contains("timeout") {
		ErrorCode::Timeout
	} else if lower.contains("target closed") || lower.contains("has been closed") || lower.contains("browser has disconnected") {
		ErrorCode::SessionExpired
	} else if lower.contains("not found") || lower.contains("no element") || lower.contains("waiting for locator") {
		ErrorCode::ElementNotFound
	} else {
		ErrorCode::EngineError
	}
}
