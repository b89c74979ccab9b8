use std::sync::Arc;

use tracing::warn;

use crate::engine::{BrowserProcess, BrowserSession, Page};

/// Browser handles owned by the session, released together.
#[derive(Default)]
pub(super) struct Resources {
	pub browser: Option<Box<dyn BrowserProcess>>,
	pub context: Option<Box<dyn BrowserSession>>,
	pub page: Option<Arc<dyn Page>>,
}

impl Resources {
	/// Closes page, context and browser in that order. Failures are logged
	/// and never stop the remaining steps.
	pub async fn release(mut self) {
		if let Some(page) = self.page.take() {
			if let Err(err) = page.close().await {
				warn!(target = "sfpilot.session", error = %err, "page close failed");
			}
		}
		if let Some(context) = self.context.take() {
			if let Err(err) = context.close().await {
				warn!(target = "sfpilot.session", error = %err, "context close failed");
			}
		}
		if let Some(browser) = self.browser.take() {
			if let Err(err) = browser.close().await {
				warn!(target = "sfpilot.session", error = %err, "browser close failed");
			}
		}
	}
}
