//! Session lifecycle operations.

use serde::Serialize;
use sfpilot::protocol::args::StartSessionArgs;
use sfpilot::session::Refresh;
use sfpilot::{Error, SessionConfig, SessionInfo};
use tracing::info;

use crate::ops::def::{BoxFut, NoArgs, OpContext, OpDef, OpOutcome};

pub struct StartOp;

impl OpDef for StartOp {
	const NAME: &'static str = "session.start";

	type Raw = StartSessionArgs;
	type Data = SessionInfo;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let alias = raw
				.org_alias
				.filter(|alias| !alias.trim().is_empty())
				.or_else(|| cx.session().settings().default_org.clone())
				.ok_or_else(|| Error::InvalidInput("orgAlias is required when no default org is configured".into()))?;

			let mut browser = cx.browser().clone();
			if let Some(kind) = raw.browser {
				browser.browser = kind;
			}
			if let Some(headless) = raw.headless {
				browser.headless = headless;
			}
			if let Some(viewport) = raw.viewport {
				browser.viewport = viewport;
			}

			info!(target = "sfpilot.session", %alias, browser = %browser.browser, headless = browser.headless, "session.start");
			let info = cx
				.session()
				.start(SessionConfig {
					org_alias: alias.clone(),
					browser,
				})
				.await?;

			let message = match &info.username {
				Some(username) => format!("Connected to {alias} as {username}"),
				None => format!("Connected to {alias}"),
			};
			Ok(OpOutcome::new(info).message(message))
		})
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct Closed {
	pub closed: bool,
}

/// Always succeeds.
pub struct CloseOp;

impl OpDef for CloseOp {
	const NAME: &'static str = "session.close";

	type Raw = NoArgs;
	type Data = Closed;

	fn execute<'a>(_raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let closed = cx.session().close().await;
			let message = if closed { "Session closed" } else { "No active session" };
			Ok(OpOutcome::new(Closed { closed }).message(message))
		})
	}
}

pub struct StatusOp;

impl OpDef for StatusOp {
	const NAME: &'static str = "session.status";

	type Raw = NoArgs;
	type Data = SessionInfo;

	fn execute<'a>(_raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let info = cx.session().status();
			let message = format!("Session {}", info.status);
			Ok(OpOutcome::new(info).message(message))
		})
	}
}

pub struct RefreshOp;

impl OpDef for RefreshOp {
	const NAME: &'static str = "session.refresh";

	type Raw = NoArgs;
	type Data = Refresh;

	fn execute<'a>(_raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let refresh = cx.session().refresh_token().await?;
			let message = if refresh.reauthenticated {
				"Credentials refreshed; page re-authenticated"
			} else {
				"Credentials refreshed; page still signed in"
			};
			Ok(OpOutcome::new(refresh).message(message))
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use sfpilot::engine::Page;
	use sfpilot::protocol::ErrorCode;
	use sfpilot::testing::LANDING_URL;

	use crate::ops::testing::Harness;

	#[tokio::test(start_paused = true)]
	async fn start_reports_connected_session() {
		let h = Harness::new();
		let resp = h.call("session.start", json!({ "orgAlias": "dev", "headless": false })).await;
		assert!(resp.ok, "{:?}", resp.error);
		let data = resp.data.unwrap();
		assert_eq!(data["status"], "connected");
		assert_eq!(data["orgAlias"], "dev");
		assert_eq!(data["instanceUrl"], "https://acme.my.salesforce.com");
		assert!(data.get("accessToken").is_none());
		assert_eq!(resp.message.as_deref(), Some("Connected to dev as admin@dev.example"));
		assert_eq!(h.engine.last_page().unwrap().url().await.unwrap(), LANDING_URL);
	}

	#[tokio::test(start_paused = true)]
	async fn start_without_alias_or_default_is_invalid_input() {
		let h = Harness::new();
		let resp = h.call("session.start", json!({})).await;
		assert_eq!(resp.error.unwrap().code, ErrorCode::InvalidInput);
		assert_eq!(h.engine.launches(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn start_unknown_org_is_org_not_found() {
		let h = Harness::new();
		let resp = h.call("session.start", json!({ "orgAlias": "prod" })).await;
		let error = resp.error.unwrap();
		assert_eq!(error.code, ErrorCode::OrgNotFound);
		assert_eq!(error.details.unwrap()["orgAlias"], "prod");
		assert_eq!(h.engine.launches(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn status_then_close_is_idempotent() {
		let h = Harness::new();
		h.started().await;

		let status = h.call("session.status", json!({})).await;
		assert_eq!(status.data.unwrap()["status"], "connected");

		let first = h.call("session.close", json!({})).await;
		assert!(first.ok);
		assert_eq!(first.data.unwrap()["closed"], true);

		let second = h.call("session.close", json!({})).await;
		assert!(second.ok);
		assert_eq!(second.data.unwrap()["closed"], false);
		assert_eq!(second.message.as_deref(), Some("No active session"));

		let status = h.call("session.status", json!({})).await;
		assert_eq!(status.data.unwrap()["status"], "disconnected");
		assert_eq!(h.engine.live_browsers(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn refresh_keeps_a_signed_in_page() {
		let h = Harness::new();
		h.started().await;
		let calls_before = h.creds.org_info_calls();

		let resp = h.call("session.refresh", json!({})).await;
		assert!(resp.ok, "{:?}", resp.error);
		assert_eq!(resp.data.unwrap()["reauthenticated"], false);
		assert_eq!(h.creds.org_info_calls(), calls_before + 1);
	}

	#[tokio::test(start_paused = true)]
	async fn refresh_brings_back_an_expired_session() {
		let h = Harness::new();
		let page = h.started().await;
		page.fail_evaluate(true);

		let resp = h.call("form.click", json!({ "label": "Save" })).await;
		assert_eq!(resp.error.unwrap().code, ErrorCode::SessionExpired);

		let resp = h.call("session.refresh", json!({})).await;
		assert!(resp.ok, "{:?}", resp.error);
		assert_eq!(resp.data.unwrap()["reauthenticated"], true);
		assert_eq!(h.creds.entry_url_calls(), 2);

		page.fail_evaluate(false);
		let status = h.call("session.status", json!({})).await;
		assert_eq!(status.data.unwrap()["status"], "connected");
		let resp = h.call("page.info", json!({})).await;
		assert!(resp.ok, "{:?}", resp.error);
	}

	#[tokio::test(start_paused = true)]
	async fn refresh_without_session_is_not_started() {
		let h = Harness::new();
		let resp = h.call("session.refresh", json!({})).await;
		assert_eq!(resp.error.unwrap().code, ErrorCode::SessionNotStarted);
	}
}
