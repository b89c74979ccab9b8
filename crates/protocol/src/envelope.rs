use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current request/response schema version.
///
/// Increment this when making breaking changes to the envelope shape.
pub const SCHEMA_VERSION: u32 = 1;

fn default_input() -> Value {
	Value::Object(serde_json::Map::new())
}

/// Single operation request, one JSON object per line.
///
/// ```json
/// {"id": "1", "op": "navigate", "input": {"path": "/lightning/o/Account/list"}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
	/// Request identifier echoed in the response for correlation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,

	/// Operation name (e.g. `"session.start"`, `"form.picklist"`).
	pub op: String,

	/// Operation-specific arguments; deserialized into a record from [`crate::args`].
	#[serde(default = "default_input")]
	pub input: Value,
}

/// Single operation response.
///
/// On success `data` and/or `message` are present; on failure only `error` is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
	pub schema_version: u32,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,

	pub op: String,

	/// Whether the operation succeeded.
	pub ok: bool,

	/// Human-readable summary of what happened.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,

	/// Operation-specific result payload.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
}

impl CommandResponse {
	pub fn success(id: Option<String>, op: impl Into<String>, message: Option<String>, data: Option<Value>) -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			id,
			op: op.into(),
			ok: true,
			message,
			data,
			error: None,
			duration_ms: None,
		}
	}

	pub fn failure(id: Option<String>, op: impl Into<String>, error: CommandError) -> Self {
		Self {
			schema_version: SCHEMA_VERSION,
			id,
			op: op.into(),
			ok: false,
			message: None,
			data: None,
			error: Some(error),
			duration_ms: None,
		}
	}

	/// Attach the wall-clock duration of the operation.
	pub fn with_duration_ms(mut self, ms: u64) -> Self {
		self.duration_ms = Some(ms);
		self
	}
}

/// Error information for failed operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,

	/// Human-readable error message.
	pub message: String,

	/// What the caller can do about it.
	pub suggestion: String,

	/// Additional structured context (label, search term, timeout...).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// An operation needing a page ran without an active session.
	SessionNotStarted,
	/// The page handle stopped responding.
	SessionExpired,
	/// The credential source has no matching org.
	OrgNotFound,
	/// Credential or browser bootstrap failed.
	AuthenticationFailed,
	/// No element matched the resolved queries.
	ElementNotFound,
	/// An interaction wait ran out of time.
	Timeout,
	/// A navigation wait ran out of time.
	NavigationTimeout,
	/// Arguments were missing or malformed.
	InvalidInput,
	/// The browser engine reported a failure.
	EngineError,
	/// Unknown/internal error.
	InternalError,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorCode::SessionNotStarted => "SESSION_NOT_STARTED",
			ErrorCode::SessionExpired => "SESSION_EXPIRED",
			ErrorCode::OrgNotFound => "ORG_NOT_FOUND",
			ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
			ErrorCode::ElementNotFound => "ELEMENT_NOT_FOUND",
			ErrorCode::Timeout => "TIMEOUT",
			ErrorCode::NavigationTimeout => "NAVIGATION_TIMEOUT",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::EngineError => "ENGINE_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_input_defaults_to_empty_object() {
		let req: CommandRequest = serde_json::from_str(r#"{"op":"ping"}"#).unwrap();
		assert_eq!(req.op, "ping");
		assert!(req.id.is_none());
		assert_eq!(req.input, serde_json::json!({}));
	}

	#[test]
	fn failure_serializes_code_and_suggestion() {
		let resp = CommandResponse::failure(
			Some("7".into()),
			"navigate",
			CommandError {
				code: ErrorCode::SessionNotStarted,
				message: "no active session".into(),
				suggestion: "Run session.start first".into(),
				details: None,
			},
		);
		let json = serde_json::to_value(&resp).unwrap();
		assert_eq!(json["ok"], false);
		assert_eq!(json["id"], "7");
		assert_eq!(json["error"]["code"], "SESSION_NOT_STARTED");
		assert_eq!(json["error"]["suggestion"], "Run session.start first");
		assert!(json.get("data").is_none());
	}

	#[test]
	fn error_code_display_matches_serde() {
		for code in [ErrorCode::NavigationTimeout, ErrorCode::OrgNotFound, ErrorCode::ElementNotFound] {
			let serialized = serde_json::to_value(code).unwrap();
			assert_eq!(serialized, code.to_string());
		}
	}
}
