//! Engine traits implemented over the Playwright bindings.
//!
//! The Playwright driver starts lazily on the first launch so commands that
//! never open a browser (`ping`, `org.list`) do not pay for it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sfpilot::engine::{
	BrowserEngine, BrowserProcess, BrowserSession, ContextOptions, GotoOptions, LaunchOptions, LoadState, Page,
	ScreenshotOptions,
};
use sfpilot::protocol::args::BrowserKind;
use sfpilot::{Error, Result};
use tokio::sync::OnceCell;
use tracing::debug;

#[derive(Default)]
pub struct PlaywrightEngine {
	driver: OnceCell<Arc<pw::Playwright>>,
}

impl PlaywrightEngine {
	pub fn new() -> Self {
		Self::default()
	}

	async fn driver(&self) -> Result<&Arc<pw::Playwright>> {
		self.driver
			.get_or_try_init(|| async {
				debug!(target = "sfpilot.engine", "starting playwright driver");
				pw::Playwright::launch()
					.await
					.map(Arc::new)
					.map_err(|e| Error::engine("start playwright", e))
			})
			.await
	}
}

#[async_trait]
impl BrowserEngine for PlaywrightEngine {
	async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserProcess>> {
		let driver = self.driver().await?;
		let browser_type = match options.browser {
			BrowserKind::Chromium => driver.chromium(),
			BrowserKind::Firefox => driver.firefox(),
			BrowserKind::Webkit => driver.webkit(),
		};
		debug!(target = "sfpilot.engine", browser = %options.browser, headless = options.headless, "launching");
		let browser = browser_type
			.launch_with_options(pw::LaunchOptions::default().headless(options.headless))
			.await
			.map_err(|e| Error::engine("launch browser", e))?;
		Ok(Box::new(PwBrowser { browser }))
	}
}

struct PwBrowser {
	browser: pw::Browser,
}

#[async_trait]
impl BrowserProcess for PwBrowser {
	async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn BrowserSession>> {
		let mut builder = pw::BrowserContextOptions::builder().viewport(pw::Viewport {
			width: options.viewport.width,
			height: options.viewport.height,
		});
		if let Some(user_agent) = &options.user_agent {
			builder = builder.user_agent(user_agent.clone());
		}
		let context = self
			.browser
			.new_context_with_options(builder.build())
			.await
			.map_err(|e| Error::engine("create browser context", e))?;
		Ok(Box::new(PwContext { context }))
	}

	async fn close(&self) -> Result<()> {
		self.browser.close().await.map_err(|e| Error::engine("close browser", e))
	}
}

struct PwContext {
	context: pw::BrowserContext,
}

#[async_trait]
impl BrowserSession for PwContext {
	async fn new_page(&self) -> Result<Arc<dyn Page>> {
		let page = self.context.new_page().await.map_err(|e| Error::engine("open page", e))?;
		Ok(Arc::new(PwPage { page }))
	}

	async fn close(&self) -> Result<()> {
		self.context.close().await.map_err(|e| Error::engine("close browser context", e))
	}
}

struct PwPage {
	page: pw::Page,
}

impl PwPage {
	async fn first(&self, query: &str) -> pw::Locator {
		self.page.locator(query).await.first()
	}
}

/// Bounds an element action; the bindings' own per-action options differ
/// between versions, a local timeout does not.
async fn bounded<T, F>(action: &'static str, query: &str, timeout: Duration, fut: F) -> Result<T>
where
	F: Future<Output = pw::Result<T>>,
{
	match tokio::time::timeout(timeout, fut).await {
		Ok(result) => result.map_err(|e| Error::engine(action, e)),
		Err(_) => Err(Error::Engine {
			action,
			message: format!("Timeout {}ms exceeded waiting for {query}", timeout.as_millis()),
		}),
	}
}

fn wait_until(state: LoadState) -> pw::WaitUntil {
	match state {
		LoadState::Load => pw::WaitUntil::Load,
		LoadState::DomContentLoaded => pw::WaitUntil::DomContentLoaded,
		LoadState::NetworkIdle => pw::WaitUntil::NetworkIdle,
		LoadState::Commit => pw::WaitUntil::Commit,
	}
}

/// Wraps `script` so its value comes back as JSON text; `undefined` becomes `null`.
fn json_expression(script: &str) -> String {
	format!("JSON.stringify(({script}) ?? null)")
}

#[async_trait]
impl Page for PwPage {
	async fn goto(&self, url: &str, options: GotoOptions) -> Result<()> {
		let goto = pw::GotoOptions::new()
			.timeout(options.timeout)
			.wait_until(wait_until(options.wait_until));
		self.page.goto(url, Some(goto)).await.map_err(|e| Error::engine("navigate", e))?;
		Ok(())
	}

	async fn url(&self) -> Result<String> {
		Ok(self.page.url())
	}

	async fn title(&self) -> Result<String> {
		self.page.title().await.map_err(|e| Error::engine("read title", e))
	}

	async fn evaluate(&self, script: &str) -> Result<Value> {
		let raw = self
			.page
			.evaluate_value(&json_expression(script))
			.await
			.map_err(|e| Error::engine("evaluate", e))?;
		Ok(serde_json::from_str(&raw)?)
	}

	async fn screenshot(&self, options: ScreenshotOptions) -> Result<Vec<u8>> {
		let shot = pw::ScreenshotOptions::builder().full_page(options.full_page).build();
		self.page.screenshot(Some(shot)).await.map_err(|e| Error::engine("capture screenshot", e))
	}

	async fn close(&self) -> Result<()> {
		self.page.close().await.map_err(|e| Error::engine("close page", e))
	}

	async fn count(&self, query: &str) -> Result<usize> {
		self.page
			.locator(query)
			.await
			.count()
			.await
			.map_err(|e| Error::engine("count elements", e))
	}

	async fn is_visible(&self, query: &str) -> Result<bool> {
		self.first(query)
			.await
			.is_visible()
			.await
			.map_err(|e| Error::engine("check visibility", e))
	}

	async fn click(&self, query: &str, timeout: Duration) -> Result<()> {
		let locator = self.first(query).await;
		bounded("click", query, timeout, locator.click(None)).await
	}

	async fn fill(&self, query: &str, value: &str, timeout: Duration) -> Result<()> {
		let locator = self.first(query).await;
		bounded("fill", query, timeout, locator.fill(value, None)).await
	}

	async fn press(&self, query: &str, key: &str, timeout: Duration) -> Result<()> {
		let locator = self.first(query).await;
		bounded("press key", query, timeout, locator.press(key, None)).await
	}

	async fn text_content(&self, query: &str) -> Result<Option<String>> {
		self.first(query)
			.await
			.text_content()
			.await
			.map_err(|e| Error::engine("read text", e))
	}

	async fn is_checked(&self, query: &str) -> Result<bool> {
		self.first(query)
			.await
			.is_checked()
			.await
			.map_err(|e| Error::engine("read checked state", e))
	}
}
