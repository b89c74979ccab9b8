//! Control-protocol operations.
//!
//! Each operation is an [`OpDef`](def::OpDef) registered in [`registry`].
//! [`handle`] turns any request into exactly one response: unknown names
//! and malformed input become `INVALID_INPUT`, every other failure keeps the
//! code of the underlying [`sfpilot::Error`].

pub mod def;
pub mod form;
pub mod nav;
pub mod org;
pub mod page;
pub mod record;
pub mod registry;
pub mod session;
pub mod wait;

use sfpilot::Error;
use sfpilot::protocol::{CommandRequest, CommandResponse};
use tokio::time::Instant;
use tracing::{debug, info};

pub use self::def::OpContext;
pub use self::registry::{OP_NAMES, OpId, lookup_op, op_name, run_op};

/// Executes one request and builds its response, duration included.
pub async fn handle(cx: &OpContext, request: CommandRequest) -> CommandResponse {
	let started = Instant::now();
	let CommandRequest { id, op, input } = request;

	let result = match lookup_op(&op) {
		Some(op_id) => run_op(op_id, input, cx).await,
		None => Err(Error::InvalidInput(format!("unknown operation: {op}"))),
	};
	let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

	let response = match result {
		Ok(outcome) => {
			debug!(target = "sfpilot.serve", op = outcome.op, elapsed_ms, "ok");
			CommandResponse::success(id, op, outcome.message, outcome.data)
		}
		Err(err) => {
			info!(target = "sfpilot.serve", %op, code = %err.code(), error = %err, elapsed_ms, "failed");
			CommandResponse::failure(id, op, err.to_command_error())
		}
	};
	response.with_duration_ms(elapsed_ms)
}

#[cfg(test)]
pub(crate) mod testing {
	use std::sync::Arc;

	use serde_json::Value;
	use sfpilot::config::{BrowserSettings, SessionSettings, Timeouts};
	use sfpilot::credentials::CredentialCache;
	use sfpilot::protocol::{CommandRequest, CommandResponse};
	use sfpilot::testing::{FakeCredentials, FakeEngine, FakePage};
	use sfpilot::SessionCoordinator;

	use super::{OpContext, handle};

	pub struct Harness {
		pub engine: FakeEngine,
		pub creds: FakeCredentials,
		pub cx: OpContext,
	}

	impl Harness {
		pub fn new() -> Self {
			let engine = FakeEngine::new();
			let creds = FakeCredentials::with_org("dev");
			let settings = SessionSettings::default();
			let cache = Arc::new(CredentialCache::new(Arc::new(creds.clone()), settings.credential_ttl()));
			let session = SessionCoordinator::new(Arc::new(engine.clone()), cache, Timeouts::default(), settings);
			Self {
				engine,
				creds,
				cx: OpContext::new(session, BrowserSettings::default()),
			}
		}

		pub async fn call(&self, op: &str, input: Value) -> CommandResponse {
			let request = CommandRequest {
				id: Some("t".into()),
				op: op.to_string(),
				input,
			};
			handle(&self.cx, request).await
		}

		/// Starts a session on `dev` and returns its page.
		pub async fn started(&self) -> FakePage {
			let resp = self.call("session.start", serde_json::json!({ "orgAlias": "dev" })).await;
			assert!(resp.ok, "session.start failed: {:?}", resp.error);
			self.engine.last_page().expect("page after start")
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use sfpilot::protocol::ErrorCode;

	use super::testing::Harness;

	#[tokio::test(start_paused = true)]
	async fn unknown_op_is_invalid_input() {
		let h = Harness::new();
		let resp = h.call("form.explode", json!({})).await;
		assert!(!resp.ok);
		assert_eq!(resp.id.as_deref(), Some("t"));
		assert_eq!(resp.op, "form.explode");
		let error = resp.error.unwrap();
		assert_eq!(error.code, ErrorCode::InvalidInput);
		assert!(error.message.contains("unknown operation: form.explode"));
		assert!(resp.duration_ms.is_some());
	}

	#[tokio::test(start_paused = true)]
	async fn malformed_input_is_invalid_input_before_touching_the_session() {
		let h = Harness::new();
		let resp = h.call("form.picklist", json!({ "label": "Stage" })).await;
		let error = resp.error.unwrap();
		assert_eq!(error.code, ErrorCode::InvalidInput);
		assert!(error.message.contains("form.picklist"));
		assert!(error.message.contains("value"));
	}

	#[tokio::test(start_paused = true)]
	async fn page_ops_without_session_are_not_started() {
		let h = Harness::new();
		for (op, input) in [
			("navigate", json!({ "path": "/lightning/page/home" })),
			("form.fill", json!({ "label": "Name", "value": "Acme" })),
			("page.capture", json!({})),
			("wait", json!({ "condition": "spinners" })),
		] {
			let resp = h.call(op, input).await;
			let error = resp.error.unwrap_or_else(|| panic!("{op} should fail"));
			assert_eq!(error.code, ErrorCode::SessionNotStarted, "{op}");
			assert!(error.suggestion.contains("session.start"));
		}
		assert_eq!(h.engine.launches(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn ping_answers_without_data() {
		let h = Harness::new();
		let resp = h.call("ping", json!({})).await;
		assert!(resp.ok);
		assert_eq!(resp.message.as_deref(), Some("pong"));
		assert!(resp.data.is_none());
	}
}
