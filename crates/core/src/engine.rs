//! Browser engine capability surface.
//!
//! sfpilot never talks to a browser directly. It consumes these traits, which
//! the binary implements over Playwright; tests implement them with
//! [`crate::testing`]. Element operations act on the *first* element matching
//! a Playwright selector string. Scoping uses `>>` chaining and visibility
//! filtering uses `>> visible=true`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sfpilot_protocol::args::{BrowserKind, Viewport};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
	pub browser: BrowserKind,
	pub headless: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
	pub viewport: Viewport,
	pub user_agent: Option<String>,
}

/// Load event `goto` resolves on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
	Load,
	#[default]
	DomContentLoaded,
	NetworkIdle,
	Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GotoOptions {
	pub wait_until: LoadState,
	pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenshotOptions {
	pub full_page: bool,
}

#[async_trait]
pub trait BrowserEngine: Send + Sync {
	async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserProcess>>;
}

#[async_trait]
pub trait BrowserProcess: Send + Sync {
	async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn BrowserSession>>;
	async fn close(&self) -> Result<()>;
}

/// An isolated browsing context (cookies, storage) inside a browser process.
#[async_trait]
pub trait BrowserSession: Send + Sync {
	async fn new_page(&self) -> Result<Arc<dyn Page>>;
	async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait Page: Send + Sync {
	async fn goto(&self, url: &str, options: GotoOptions) -> Result<()>;
	async fn url(&self) -> Result<String>;
	async fn title(&self) -> Result<String>;
	/// Evaluates a JavaScript expression and returns its JSON value.
	async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
	async fn screenshot(&self, options: ScreenshotOptions) -> Result<Vec<u8>>;
	async fn close(&self) -> Result<()>;

	/// Number of elements matching `query`.
	async fn count(&self, query: &str) -> Result<usize>;
	async fn is_visible(&self, query: &str) -> Result<bool>;
	async fn click(&self, query: &str, timeout: Duration) -> Result<()>;
	async fn fill(&self, query: &str, value: &str, timeout: Duration) -> Result<()>;
	async fn press(&self, query: &str, key: &str, timeout: Duration) -> Result<()>;
	async fn text_content(&self, query: &str) -> Result<Option<String>>;
	async fn is_checked(&self, query: &str) -> Result<bool>;
}
