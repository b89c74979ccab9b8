//! Page inspection and loop control.

use serde::Serialize;
use sfpilot::engine::ScreenshotOptions;
use sfpilot::protocol::ImagePayload;
use sfpilot::protocol::args::CaptureArgs;
use sfpilot::wait::PageKind;

use crate::ops::def::{BoxFut, NoArgs, OpContext, OpDef, OpOutcome};

/// Screenshot as a base64 PNG.
pub struct CaptureOp;

impl OpDef for CaptureOp {
	const NAME: &'static str = "page.capture";

	type Raw = CaptureArgs;
	type Data = ImagePayload;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			let bytes = page
				.screenshot(ScreenshotOptions {
					full_page: raw.full_page,
				})
				.await?;
			let message = format!("Captured {} bytes", bytes.len());
			Ok(OpOutcome::new(ImagePayload::png(&bytes)).message(message))
		})
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
	pub url: String,
	pub title: String,
	pub page_kind: PageKind,
}

pub struct InfoOp;

impl OpDef for InfoOp {
	const NAME: &'static str = "page.info";

	type Raw = NoArgs;
	type Data = PageInfo;

	fn execute<'a>(_raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			let url = page.url().await?;
			let title = page.title().await?;
			let info = PageInfo {
				page_kind: PageKind::classify(&url),
				url,
				title,
			};
			Ok(OpOutcome::new(info))
		})
	}
}

pub struct PingOp;

impl OpDef for PingOp {
	const NAME: &'static str = "ping";

	type Raw = NoArgs;
	type Data = ();

	fn execute<'a>(_raw: Self::Raw, _cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async { Ok(OpOutcome::done("pong")) })
	}
}

/// Acknowledges; the serve loop stops after answering it.
pub struct QuitOp;

impl OpDef for QuitOp {
	const NAME: &'static str = "quit";

	type Raw = NoArgs;
	type Data = ();

	fn execute<'a>(_raw: Self::Raw, _cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async { Ok(OpOutcome::done("bye")) })
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use sfpilot::protocol::ImagePayload;
	use sfpilot::testing::{LANDING_URL, TEST_PNG};

	use crate::ops::testing::Harness;

	#[tokio::test(start_paused = true)]
	async fn capture_returns_png_payload() {
		let h = Harness::new();
		h.started().await;

		let resp = h.call("page.capture", json!({ "fullPage": true })).await;
		assert!(resp.ok, "{:?}", resp.error);
		let payload: ImagePayload = serde_json::from_value(resp.data.unwrap()).unwrap();
		assert_eq!(payload.mime_type, "image/png");
		assert_eq!(payload.decode().unwrap(), TEST_PNG);
	}

	#[tokio::test(start_paused = true)]
	async fn info_classifies_current_url() {
		let h = Harness::new();
		let page = h.started().await;
		page.set_title("Home | Salesforce");

		let resp = h.call("page.info", json!({})).await;
		let data = resp.data.unwrap();
		assert_eq!(data["url"], LANDING_URL);
		assert_eq!(data["title"], "Home | Salesforce");
		assert_eq!(data["pageKind"], "generic");
	}
}
