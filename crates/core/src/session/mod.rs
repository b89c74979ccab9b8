//! Session and navigation coordinator.
//!
//! One [`SessionCoordinator`] is built by the composition root and shared by
//! every operation handler. It owns the only browser process, context and page
//! of the process; starting a new session always tears the previous one down
//! first.

mod resources;
mod status;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use self::resources::Resources;
use self::status::Snapshot;
pub use self::status::{SessionInfo, SessionStatus};
use crate::config::{BrowserSettings, SessionSettings, Timeouts};
use crate::credentials::{CredentialCache, OrgInfo};
use crate::engine::{BrowserEngine, ContextOptions, GotoOptions, LaunchOptions, LoadState, Page};
use crate::error::{Error, Result};
use crate::locate::any_visible;
use crate::selectors;
use crate::url::UrlBuilder;
use crate::wait::{PageKind, Waiter, is_transient_auth_url};

const LIVENESS_CHECK: &str = "1 + 1";

/// What `start` needs beyond the coordinator's own settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
	pub org_alias: String,
	pub browser: BrowserSettings,
}

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
	pub url: String,
	pub page_kind: PageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Refresh {
	/// Whether the page had to go through the entry URL again.
	pub reauthenticated: bool,
}

struct Active {
	alias: String,
	urls: UrlBuilder,
	resources: Resources,
}

impl Active {
	fn page(&self) -> Result<Arc<dyn Page>> {
		self.resources.page.clone().ok_or(Error::SessionNotStarted)
	}
}

#[derive(Default)]
struct State {
	active: Option<Active>,
	monitor: Option<JoinHandle<()>>,
}

pub struct SessionCoordinator {
	engine: Arc<dyn BrowserEngine>,
	credentials: Arc<CredentialCache>,
	timeouts: Timeouts,
	settings: SessionSettings,
	state: Mutex<State>,
	snapshot: parking_lot::Mutex<Snapshot>,
	status_tx: broadcast::Sender<SessionStatus>,
}

impl SessionCoordinator {
	pub fn new(
		engine: Arc<dyn BrowserEngine>,
		credentials: Arc<CredentialCache>,
		timeouts: Timeouts,
		settings: SessionSettings,
	) -> Self {
		let (status_tx, _) = broadcast::channel(16);
		Self {
			engine,
			credentials,
			timeouts,
			settings,
			state: Mutex::new(State::default()),
			snapshot: parking_lot::Mutex::new(Snapshot::default()),
			status_tx,
		}
	}

	pub fn timeouts(&self) -> &Timeouts {
		&self.timeouts
	}

	pub fn settings(&self) -> &SessionSettings {
		&self.settings
	}

	pub fn credentials(&self) -> &Arc<CredentialCache> {
		&self.credentials
	}

	/// Status transitions from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<SessionStatus> {
		self.status_tx.subscribe()
	}

	pub fn status(&self) -> SessionInfo {
		self.snapshot.lock().view()
	}

	fn set_status(&self, status: SessionStatus) {
		self.snapshot.lock().info.status = status;
		debug!(target = "sfpilot.session", %status, "status");
		let _ = self.status_tx.send(status);
	}

	/// Starts a session for `config.org_alias`, replacing any current one.
	pub async fn start(&self, config: SessionConfig) -> Result<SessionInfo> {
		let mut state = self.state.lock().await;
		if self.shutdown(&mut state).await {
			self.set_status(SessionStatus::Disconnected);
		}

		{
			let mut snap = self.snapshot.lock();
			*snap = Snapshot::default();
			snap.info.org_alias = Some(config.org_alias.clone());
		}
		self.set_status(SessionStatus::Connecting);
		info!(target = "sfpilot.session", alias = %config.org_alias, browser = %config.browser.browser, "starting session");

		match self.bootstrap(&config).await {
			Ok((active, org)) => {
				{
					let mut snap = self.snapshot.lock();
					snap.info.org_id = Some(org.org_id);
					snap.info.username = Some(org.username);
					snap.info.instance_url = Some(active.urls.base().to_string());
					snap.last_activity = Some(Instant::now());
				}
				state.monitor = Some(self.spawn_monitor(active.alias.clone()));
				state.active = Some(active);
				self.set_status(SessionStatus::Connected);
				Ok(self.status())
			}
			Err(err) => {
				let err = classify_start_failure(err, &config.org_alias);
				warn!(target = "sfpilot.session", alias = %config.org_alias, error = %err, "session start failed");
				self.snapshot.lock().info.last_error = Some(err.to_string());
				self.set_status(SessionStatus::Error);
				Err(err)
			}
		}
	}

	/// Acquires credentials and browser handles, releasing whatever was
	/// acquired if a later step fails.
	async fn bootstrap(&self, config: &SessionConfig) -> Result<(Active, OrgInfo)> {
		let alias = config.org_alias.as_str();
		let org = self.credentials.get(alias, false).await?;
		let urls = UrlBuilder::new(&org.instance_url)?;
		let entry_url = self.credentials.entry_url(alias, None).await?;

		let mut resources = Resources::default();
		match self.open_browser(config, &entry_url, &mut resources).await {
			Ok(()) => Ok((
				Active {
					alias: alias.to_string(),
					urls,
					resources,
				},
				org,
			)),
			Err(err) => {
				resources.release().await;
				Err(err)
			}
		}
	}

	async fn open_browser(&self, config: &SessionConfig, entry_url: &str, resources: &mut Resources) -> Result<()> {
		let launch = LaunchOptions {
			browser: config.browser.browser,
			headless: config.browser.headless,
		};
		let browser = resources.browser.insert(self.engine.launch(&launch).await?);
		let context_options = ContextOptions {
			viewport: config.browser.viewport,
			user_agent: config.browser.user_agent.clone(),
		};
		let context = resources.context.insert(browser.new_context(&context_options).await?);
		let page = resources.page.insert(context.new_page().await?);

		page.goto(entry_url, self.goto_options()).await?;
		Waiter::new(&**page, &self.timeouts).app_ready(self.timeouts.navigation()).await
	}

	fn goto_options(&self) -> GotoOptions {
		GotoOptions {
			wait_until: LoadState::DomContentLoaded,
			timeout: self.timeouts.navigation(),
		}
	}

	fn spawn_monitor(&self, alias: String) -> JoinHandle<()> {
		let credentials = Arc::clone(&self.credentials);
		let every = self.settings.refresh_interval();
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				match credentials.get(&alias, true).await {
					Ok(_) => debug!(target = "sfpilot.session", %alias, "background credential refresh"),
					Err(err) => warn!(target = "sfpilot.session", %alias, error = %err, "background credential refresh failed"),
				}
			}
		})
	}

	/// Returns the live page, after checking it still answers.
	///
	/// Fails with [`Error::SessionNotStarted`] when there is no session and
	/// [`Error::SessionExpired`] when the page no longer responds. Once
	/// expired, the session stays expired until [`refresh_token`](Self::refresh_token)
	/// or [`start`](Self::start) succeeds.
	pub async fn ensure(&self) -> Result<Arc<dyn Page>> {
		let state = self.state.lock().await;
		let active = state.active.as_ref().ok_or(Error::SessionNotStarted)?;
		let page = active.page()?;
		{
			let snap = self.snapshot.lock();
			if snap.info.status == SessionStatus::Error {
				let reason = snap.info.last_error.clone().unwrap_or_else(|| "session expired".to_string());
				return Err(Error::SessionExpired { reason });
			}
		}
		match liveness(&*page).await {
			Ok(()) => {
				self.snapshot.lock().last_activity = Some(Instant::now());
				Ok(page)
			}
			Err(reason) => Err(self.expired(reason)),
		}
	}

	/// Marks the session usable again after a successful refresh.
	fn revive(&self) {
		let was_error = {
			let mut snap = self.snapshot.lock();
			snap.last_activity = Some(Instant::now());
			let was_error = snap.info.status == SessionStatus::Error;
			if was_error {
				snap.info.last_error = None;
			}
			was_error
		};
		if was_error {
			self.set_status(SessionStatus::Connected);
		}
	}

	fn expired(&self, reason: String) -> Error {
		warn!(target = "sfpilot.session", %reason, "session stopped responding");
		self.snapshot.lock().info.last_error = Some(reason.clone());
		self.set_status(SessionStatus::Error);
		Error::SessionExpired { reason }
	}

	/// Navigates to `path` (in-app path or absolute URL) and waits for the
	/// page type it lands on.
	pub async fn navigate(&self, path: &str) -> Result<Navigation> {
		let page = self.ensure().await?;
		let target = {
			let state = self.state.lock().await;
			let active = state.active.as_ref().ok_or(Error::SessionNotStarted)?;
			active.urls.resolve(path)?
		};
		debug!(target = "sfpilot.session", url = %target, "navigate");

		let options = self.goto_options();
		page.goto(&target, options).await.map_err(|err| match err {
			Error::Engine { message, .. } if message.to_ascii_lowercase().contains("timeout") => Error::NavigationTimeout {
				url: target.clone(),
				ms: u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX),
				detail: message,
			},
			other => other,
		})?;

		let page_kind = Waiter::new(&*page, &self.timeouts)
			.navigation_ready(self.timeouts.page_ready())
			.await?;
		Ok(Navigation {
			url: page.url().await?,
			page_kind,
		})
	}

	/// Refetches credentials. The page is sent back through the entry URL
	/// when it fails the liveness check or no longer looks signed in. This is
	/// the recovery path for an expired session, so it skips [`ensure`](Self::ensure).
	pub async fn refresh_token(&self) -> Result<Refresh> {
		let (alias, page) = {
			let state = self.state.lock().await;
			let active = state.active.as_ref().ok_or(Error::SessionNotStarted)?;
			(active.alias.clone(), active.page()?)
		};

		let org = self.credentials.get(&alias, true).await?;
		{
			let mut snap = self.snapshot.lock();
			snap.info.org_id = Some(org.org_id);
			snap.info.username = Some(org.username);
		}

		let signed_in = match liveness(&*page).await {
			Ok(()) => {
				let url = page.url().await?;
				!is_transient_auth_url(&url) && any_visible(&*page, &selectors::app_shell()).await
			}
			Err(reason) => {
				debug!(target = "sfpilot.session", %alias, %reason, "liveness check failed during refresh");
				false
			}
		};

		if signed_in {
			debug!(target = "sfpilot.session", %alias, "page still authenticated, keeping it");
		} else {
			info!(target = "sfpilot.session", %alias, "re-entering org through entry url");
			let entry_url = self.credentials.entry_url(&alias, None).await?;
			page.goto(&entry_url, self.goto_options()).await?;
			Waiter::new(&*page, &self.timeouts).app_ready(self.timeouts.navigation()).await?;
		}
		self.revive();
		Ok(Refresh {
			reauthenticated: !signed_in,
		})
	}

	/// Stops background checks and releases every browser handle. Never fails.
	/// Returns whether there was a session to close.
	pub async fn close(&self) -> bool {
		let mut state = self.state.lock().await;
		let closed = self.shutdown(&mut state).await;
		*self.snapshot.lock() = Snapshot::default();
		self.set_status(SessionStatus::Disconnected);
		if closed {
			info!(target = "sfpilot.session", "session closed");
		}
		closed
	}

	async fn shutdown(&self, state: &mut State) -> bool {
		if let Some(monitor) = state.monitor.take() {
			monitor.abort();
		}
		match state.active.take() {
			Some(active) => {
				debug!(target = "sfpilot.session", alias = %active.alias, "tearing down session");
				active.resources.release().await;
				true
			}
			None => false,
		}
	}
}

async fn liveness(page: &dyn Page) -> std::result::Result<(), String> {
	match page.evaluate(LIVENESS_CHECK).await {
		Ok(value) if value.as_i64() == Some(2) => Ok(()),
		Ok(other) => Err(format!("liveness check returned {other}")),
		Err(err) => Err(err.to_string()),
	}
}

/// Start failures surface as either a missing org or a failed sign-in.
fn classify_start_failure(err: Error, alias: &str) -> Error {
	match err {
		Error::OrgNotFound { .. } | Error::AuthenticationFailed { .. } => err,
		other => Error::AuthenticationFailed {
			alias: alias.to_string(),
			message: other.to_string(),
		},
	}
}

impl std::fmt::Debug for SessionCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionCoordinator").field("status", &self.status()).finish_non_exhaustive()
	}
}
