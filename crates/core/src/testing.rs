//! Scripted doubles for the engine and credential traits.
//!
//! [`FakePage`] keeps a map of selector strings to element state. Queries are
//! matched exactly after stripping `visible=true` and `nth=N` segments, which
//! are then applied as filters. Elements can appear or vanish on a virtual-time
//! schedule or in response to clicks and fills, so waits can be exercised
//! under `#[tokio::test(start_paused = true)]`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time::Instant;

use crate::credentials::{CredentialSource, OrgInfo, OrgSummary};
use crate::engine::{BrowserEngine, BrowserProcess, BrowserSession, ContextOptions, GotoOptions, LaunchOptions, Page, ScreenshotOptions};
use crate::error::{Error, Result};

/// Bytes returned by [`FakePage`] screenshots.
pub const TEST_PNG: &[u8] = &[0x89, b'P', b'N', b'G'];

/// Where pages created by [`FakeEngine`] land after the frontdoor redirect.
pub const LANDING_URL: &str = "https://acme.lightning.force.com/lightning/page/home";

/// Shell marker shown on pages created by [`FakeEngine`].
pub const SHELL_MARKER: &str = "one-appnav";

type TeardownLog = Arc<Mutex<Vec<&'static str>>>;

/// A scripted change to page state.
#[derive(Debug, Clone)]
pub enum Effect {
	Show(String),
	Hide(String),
	Remove(String),
	ShowAfter(String, Duration),
	RemoveAfter(String, Duration),
	SetUrl(String),
	SetUrlAfter(String, Duration),
	ToggleChecked(String),
}

/// Something the code under test did to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	Goto(String),
	Click(String),
	Fill(String, String),
	Press(String, String),
	Evaluate(String),
	Screenshot,
	Close,
}

#[derive(Debug, Clone)]
struct Element {
	visible: bool,
	count: usize,
	checked: bool,
	text: Option<String>,
	appear_at: Option<Instant>,
	vanish_at: Option<Instant>,
}

impl Element {
	fn new(visible: bool) -> Self {
		Self {
			visible,
			count: 1,
			checked: false,
			text: None,
			appear_at: None,
			vanish_at: None,
		}
	}

	fn present(&self, now: Instant) -> usize {
		if self.appear_at.is_some_and(|t| now < t) || self.vanish_at.is_some_and(|t| now >= t) {
			0
		} else {
			self.count
		}
	}
}

struct Query {
	key: String,
	visible_only: bool,
	nth: Option<usize>,
}

fn parse_query(query: &str) -> Query {
	let mut parts = Vec::new();
	let mut visible_only = false;
	let mut nth = None;
	for part in query.split(">>").map(str::trim) {
		if part == "visible=true" {
			visible_only = true;
		} else if let Some(n) = part.strip_prefix("nth=").and_then(|n| n.parse().ok()) {
			nth = Some(n);
		} else {
			parts.push(part);
		}
	}
	Query {
		key: parts.join(" >> "),
		visible_only,
		nth,
	}
}

fn key(query: &str) -> String {
	parse_query(query).key
}

struct PageState {
	url: String,
	url_script: Vec<(Instant, String)>,
	title: String,
	ready_state: String,
	elements: HashMap<String, Element>,
	on_click: HashMap<String, Vec<Effect>>,
	on_fill: HashMap<String, Vec<Effect>>,
	redirects: Vec<(String, String)>,
	evaluations: HashMap<String, Value>,
	actions: Vec<Action>,
	fail_evaluate: bool,
	fail_goto: Option<String>,
	closed: bool,
}

impl PageState {
	fn tick(&mut self) {
		let now = Instant::now();
		self.url_script.sort_by_key(|(at, _)| *at);
		while self.url_script.first().is_some_and(|(at, _)| *at <= now) {
			let (_, url) = self.url_script.remove(0);
			self.url = url;
		}
	}

	fn count(&self, query: &Query) -> usize {
		let Some(el) = self.elements.get(&query.key) else {
			return 0;
		};
		if query.visible_only && !el.visible {
			return 0;
		}
		let n = el.present(Instant::now());
		match query.nth {
			Some(i) => usize::from(i < n),
			None => n,
		}
	}

	fn element_mut(&mut self, query: &str) -> &mut Element {
		self.elements.entry(key(query)).or_insert_with(|| Element::new(true))
	}

	fn apply(&mut self, effects: &[Effect]) {
		let now = Instant::now();
		for effect in effects {
			match effect {
				Effect::Show(q) => {
					let el = self.element_mut(q);
					el.visible = true;
					el.count = el.count.max(1);
					el.appear_at = None;
					el.vanish_at = None;
				}
				Effect::Hide(q) => self.element_mut(q).visible = false,
				Effect::Remove(q) => {
					self.elements.remove(&key(q));
				}
				Effect::ShowAfter(q, after) => {
					let mut el = Element::new(true);
					el.appear_at = Some(now + *after);
					self.elements.insert(key(q), el);
				}
				Effect::RemoveAfter(q, after) => self.element_mut(q).vanish_at = Some(now + *after),
				Effect::SetUrl(url) => self.url = url.clone(),
				Effect::SetUrlAfter(url, after) => self.url_script.push((now + *after, url.clone())),
				Effect::ToggleChecked(q) => {
					let el = self.element_mut(q);
					el.checked = !el.checked;
				}
			}
		}
	}

	fn ensure_open(&self, action: &'static str) -> Result<()> {
		if self.closed {
			Err(Error::engine(action, "Target page, context or browser has been closed"))
		} else {
			Ok(())
		}
	}

	fn require(&self, action: &'static str, query: &str, timeout: Duration) -> Result<()> {
		self.ensure_open(action)?;
		if self.count(&parse_query(query)) == 0 {
			return Err(Error::engine(
				action,
				format!("Timeout {}ms exceeded waiting for locator('{query}')", timeout.as_millis()),
			));
		}
		Ok(())
	}
}

/// Scripted [`Page`]. Clones share state.
#[derive(Clone)]
pub struct FakePage {
	state: Arc<Mutex<PageState>>,
	teardown: Option<TeardownLog>,
}

impl FakePage {
	pub fn new(url: &str) -> Self {
		Self {
			state: Arc::new(Mutex::new(PageState {
				url: url.to_string(),
				url_script: Vec::new(),
				title: "Lightning Experience".to_string(),
				ready_state: "complete".to_string(),
				elements: HashMap::new(),
				on_click: HashMap::new(),
				on_fill: HashMap::new(),
				redirects: Vec::new(),
				evaluations: HashMap::new(),
				actions: Vec::new(),
				fail_evaluate: false,
				fail_goto: None,
				closed: false,
			})),
			teardown: None,
		}
	}

	fn with_teardown(mut self, log: TeardownLog) -> Self {
		self.teardown = Some(log);
		self
	}

	pub fn show(&self, query: &str) {
		self.state.lock().apply(&[Effect::Show(query.to_string())]);
	}

	/// Present in the DOM but hidden by style.
	pub fn insert_hidden(&self, query: &str) {
		self.state.lock().elements.insert(key(query), Element::new(false));
	}

	pub fn show_after(&self, query: &str, after: Duration) {
		self.state.lock().apply(&[Effect::ShowAfter(query.to_string(), after)]);
	}

	pub fn hide(&self, query: &str) {
		self.state.lock().apply(&[Effect::Hide(query.to_string())]);
	}

	pub fn remove(&self, query: &str) {
		self.state.lock().apply(&[Effect::Remove(query.to_string())]);
	}

	pub fn remove_after(&self, query: &str, after: Duration) {
		self.state.lock().apply(&[Effect::RemoveAfter(query.to_string(), after)]);
	}

	/// Visible element matching `query` `n` times.
	pub fn set_count(&self, query: &str, n: usize) {
		let mut state = self.state.lock();
		let el = state.element_mut(query);
		el.visible = true;
		el.count = n;
	}

	pub fn set_text(&self, query: &str, text: &str) {
		self.state.lock().element_mut(query).text = Some(text.to_string());
	}

	pub fn set_checked(&self, query: &str, checked: bool) {
		self.state.lock().element_mut(query).checked = checked;
	}

	pub fn checked(&self, query: &str) -> bool {
		self.state.lock().elements.get(&key(query)).is_some_and(|el| el.checked)
	}

	pub fn text(&self, query: &str) -> Option<String> {
		self.state.lock().elements.get(&key(query)).and_then(|el| el.text.clone())
	}

	pub fn set_url(&self, url: &str) {
		self.state.lock().url = url.to_string();
	}

	pub fn set_url_after(&self, url: &str, after: Duration) {
		self.state.lock().apply(&[Effect::SetUrlAfter(url.to_string(), after)]);
	}

	pub fn set_title(&self, title: &str) {
		self.state.lock().title = title.to_string();
	}

	pub fn set_ready_state(&self, ready_state: &str) {
		self.state.lock().ready_state = ready_state.to_string();
	}

	/// `goto` to any URL containing `pattern` lands on `to` instead.
	pub fn redirect(&self, pattern: &str, to: &str) {
		self.state.lock().redirects.push((pattern.to_string(), to.to_string()));
	}

	pub fn on_click(&self, query: &str, effects: impl IntoIterator<Item = Effect>) {
		self.state.lock().on_click.entry(key(query)).or_default().extend(effects);
	}

	pub fn on_fill(&self, query: &str, effects: impl IntoIterator<Item = Effect>) {
		self.state.lock().on_fill.entry(key(query)).or_default().extend(effects);
	}

	pub fn set_evaluation(&self, script: &str, value: Value) {
		self.state.lock().evaluations.insert(script.to_string(), value);
	}

	/// Makes every `evaluate` fail as if the page had crashed.
	pub fn fail_evaluate(&self, fail: bool) {
		self.state.lock().fail_evaluate = fail;
	}

	/// Makes every later `goto` fail with an engine error carrying `message`.
	pub fn fail_goto(&self, message: &str) {
		self.state.lock().fail_goto = Some(message.to_string());
	}

	pub fn actions(&self) -> Vec<Action> {
		self.state.lock().actions.clone()
	}

	pub fn clicks(&self) -> Vec<String> {
		self.actions()
			.into_iter()
			.filter_map(|a| match a {
				Action::Click(q) => Some(q),
				_ => None,
			})
			.collect()
	}

	pub fn fills(&self) -> Vec<(String, String)> {
		self.actions()
			.into_iter()
			.filter_map(|a| match a {
				Action::Fill(q, v) => Some((q, v)),
				_ => None,
			})
			.collect()
	}

	pub fn presses(&self) -> Vec<(String, String)> {
		self.actions()
			.into_iter()
			.filter_map(|a| match a {
				Action::Press(q, k) => Some((q, k)),
				_ => None,
			})
			.collect()
	}

	pub fn gotos(&self) -> Vec<String> {
		self.actions()
			.into_iter()
			.filter_map(|a| match a {
				Action::Goto(url) => Some(url),
				_ => None,
			})
			.collect()
	}

	pub fn is_closed(&self) -> bool {
		self.state.lock().closed
	}
}

#[async_trait]
impl Page for FakePage {
	async fn goto(&self, url: &str, _options: GotoOptions) -> Result<()> {
		let mut state = self.state.lock();
		state.ensure_open("goto")?;
		state.actions.push(Action::Goto(url.to_string()));
		if let Some(message) = &state.fail_goto {
			return Err(Error::engine("goto", message));
		}
		let target = state
			.redirects
			.iter()
			.find(|(pattern, _)| url.contains(pattern.as_str()))
			.map(|(_, to)| to.clone())
			.unwrap_or_else(|| url.to_string());
		state.url = target;
		Ok(())
	}

	async fn url(&self) -> Result<String> {
		let mut state = self.state.lock();
		state.ensure_open("url")?;
		state.tick();
		Ok(state.url.clone())
	}

	async fn title(&self) -> Result<String> {
		let state = self.state.lock();
		state.ensure_open("title")?;
		Ok(state.title.clone())
	}

	async fn evaluate(&self, script: &str) -> Result<Value> {
		let mut state = self.state.lock();
		state.actions.push(Action::Evaluate(script.to_string()));
		if state.fail_evaluate {
			return Err(Error::engine("evaluate", "Target page, context or browser has been closed"));
		}
		state.ensure_open("evaluate")?;
		if let Some(value) = state.evaluations.get(script) {
			return Ok(value.clone());
		}
		if script.contains("document.readyState") {
			return Ok(Value::String(state.ready_state.clone()));
		}
		if script.trim() == "1 + 1" {
			return Ok(json!(2));
		}
		Ok(Value::Null)
	}

	async fn screenshot(&self, _options: ScreenshotOptions) -> Result<Vec<u8>> {
		let mut state = self.state.lock();
		state.ensure_open("screenshot")?;
		state.actions.push(Action::Screenshot);
		Ok(TEST_PNG.to_vec())
	}

	async fn close(&self) -> Result<()> {
		{
			let mut state = self.state.lock();
			state.closed = true;
			state.actions.push(Action::Close);
		}
		if let Some(log) = &self.teardown {
			log.lock().push("page");
		}
		Ok(())
	}

	async fn count(&self, query: &str) -> Result<usize> {
		let state = self.state.lock();
		state.ensure_open("count")?;
		Ok(state.count(&parse_query(query)))
	}

	async fn is_visible(&self, query: &str) -> Result<bool> {
		let state = self.state.lock();
		state.ensure_open("is_visible")?;
		let mut q = parse_query(query);
		q.visible_only = true;
		Ok(state.count(&q) > 0)
	}

	async fn click(&self, query: &str, timeout: Duration) -> Result<()> {
		let mut state = self.state.lock();
		state.require("click", query, timeout)?;
		state.actions.push(Action::Click(query.to_string()));
		if let Some(effects) = state.on_click.get(&key(query)).cloned() {
			state.apply(&effects);
		}
		Ok(())
	}

	async fn fill(&self, query: &str, value: &str, timeout: Duration) -> Result<()> {
		let mut state = self.state.lock();
		state.require("fill", query, timeout)?;
		state.actions.push(Action::Fill(query.to_string(), value.to_string()));
		state.element_mut(query).text = Some(value.to_string());
		if let Some(effects) = state.on_fill.get(&key(query)).cloned() {
			state.apply(&effects);
		}
		Ok(())
	}

	async fn press(&self, query: &str, key: &str, timeout: Duration) -> Result<()> {
		let mut state = self.state.lock();
		state.require("press", query, timeout)?;
		state.actions.push(Action::Press(query.to_string(), key.to_string()));
		Ok(())
	}

	async fn text_content(&self, query: &str) -> Result<Option<String>> {
		let state = self.state.lock();
		state.ensure_open("text_content")?;
		let q = parse_query(query);
		if state.count(&q) == 0 {
			return Ok(None);
		}
		Ok(state.elements.get(&q.key).and_then(|el| el.text.clone()))
	}

	async fn is_checked(&self, query: &str) -> Result<bool> {
		let state = self.state.lock();
		state.require("is_checked", query, Duration::ZERO)?;
		Ok(state.elements.get(&key(query)).is_some_and(|el| el.checked))
	}
}

#[derive(Default)]
struct EngineState {
	launches: AtomicUsize,
	live_browsers: AtomicUsize,
	max_live_browsers: AtomicUsize,
	fail_launch: AtomicBool,
	without_shell: AtomicBool,
	teardown: TeardownLog,
	pages: Mutex<Vec<FakePage>>,
}

/// Scripted [`BrowserEngine`].
///
/// Pages it creates follow the frontdoor redirect to [`LANDING_URL`] and show
/// [`SHELL_MARKER`] unless [`FakeEngine::without_shell`] is set.
#[derive(Clone, Default)]
pub struct FakeEngine {
	state: Arc<EngineState>,
}

impl FakeEngine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn fail_launch(&self, fail: bool) {
		self.state.fail_launch.store(fail, Ordering::SeqCst);
	}

	/// New pages never render the application shell.
	pub fn without_shell(&self, without: bool) {
		self.state.without_shell.store(without, Ordering::SeqCst);
	}

	pub fn launches(&self) -> usize {
		self.state.launches.load(Ordering::SeqCst)
	}

	pub fn live_browsers(&self) -> usize {
		self.state.live_browsers.load(Ordering::SeqCst)
	}

	pub fn max_live_browsers(&self) -> usize {
		self.state.max_live_browsers.load(Ordering::SeqCst)
	}

	/// Close calls in the order they happened: "page", "context", "browser".
	pub fn teardown_log(&self) -> Vec<&'static str> {
		self.state.teardown.lock().clone()
	}

	pub fn last_page(&self) -> Option<FakePage> {
		self.state.pages.lock().last().cloned()
	}
}

#[async_trait]
impl BrowserEngine for FakeEngine {
	async fn launch(&self, _options: &LaunchOptions) -> Result<Box<dyn BrowserProcess>> {
		if self.state.fail_launch.load(Ordering::SeqCst) {
			return Err(Error::engine("launch browser", "Executable doesn't exist"));
		}
		self.state.launches.fetch_add(1, Ordering::SeqCst);
		let live = self.state.live_browsers.fetch_add(1, Ordering::SeqCst) + 1;
		self.state.max_live_browsers.fetch_max(live, Ordering::SeqCst);
		Ok(Box::new(FakeBrowser {
			state: Arc::clone(&self.state),
		}))
	}
}

struct FakeBrowser {
	state: Arc<EngineState>,
}

#[async_trait]
impl BrowserProcess for FakeBrowser {
	async fn new_context(&self, _options: &ContextOptions) -> Result<Box<dyn BrowserSession>> {
		Ok(Box::new(FakeContext {
			state: Arc::clone(&self.state),
		}))
	}

	async fn close(&self) -> Result<()> {
		self.state.teardown.lock().push("browser");
		self.state.live_browsers.fetch_sub(1, Ordering::SeqCst);
		Ok(())
	}
}

struct FakeContext {
	state: Arc<EngineState>,
}

#[async_trait]
impl BrowserSession for FakeContext {
	async fn new_page(&self) -> Result<Arc<dyn Page>> {
		let page = FakePage::new("about:blank").with_teardown(Arc::clone(&self.state.teardown));
		page.redirect("/secur/frontdoor.jsp", LANDING_URL);
		if !self.state.without_shell.load(Ordering::SeqCst) {
			page.show(SHELL_MARKER);
		}
		self.state.pages.lock().push(page.clone());
		Ok(Arc::new(page))
	}

	async fn close(&self) -> Result<()> {
		self.state.teardown.lock().push("context");
		Ok(())
	}
}

#[derive(Default)]
struct CredentialState {
	orgs: Mutex<HashMap<String, OrgInfo>>,
	auth_failure: Mutex<Option<String>>,
	org_info_calls: AtomicUsize,
	entry_url_calls: AtomicUsize,
	list_calls: AtomicUsize,
}

/// In-memory [`CredentialSource`] with call counters.
#[derive(Clone, Default)]
pub struct FakeCredentials {
	state: Arc<CredentialState>,
}

impl FakeCredentials {
	pub fn with_org(alias: &str) -> Self {
		let creds = Self::default();
		creds.add_org(Self::sample_org(alias));
		creds
	}

	pub fn sample_org(alias: &str) -> OrgInfo {
		OrgInfo {
			alias: Some(alias.to_string()),
			org_id: "00D5g000004XyZaEAK".to_string(),
			access_token: "00D5g000004XyZa!fake-token".to_string(),
			instance_url: "https://acme.my.salesforce.com".to_string(),
			username: format!("admin@{alias}.example"),
			status: Some("Connected".to_string()),
			api_version: Some("61.0".to_string()),
		}
	}

	pub fn add_org(&self, info: OrgInfo) {
		let alias = info.alias.clone().unwrap_or_else(|| info.username.clone());
		self.state.orgs.lock().insert(alias, info);
	}

	/// Known orgs report an expired authorization from now on.
	pub fn fail_auth(&self, message: &str) {
		*self.state.auth_failure.lock() = Some(message.to_string());
	}

	pub fn org_info_calls(&self) -> usize {
		self.state.org_info_calls.load(Ordering::SeqCst)
	}

	pub fn entry_url_calls(&self) -> usize {
		self.state.entry_url_calls.load(Ordering::SeqCst)
	}

	pub fn list_calls(&self) -> usize {
		self.state.list_calls.load(Ordering::SeqCst)
	}

	fn lookup(&self, alias: &str) -> Result<OrgInfo> {
		let info = self.state.orgs.lock().get(alias).cloned();
		let info = info.ok_or_else(|| Error::OrgNotFound { alias: alias.to_string() })?;
		if let Some(message) = self.state.auth_failure.lock().clone() {
			return Err(Error::AuthenticationFailed {
				alias: alias.to_string(),
				message,
			});
		}
		Ok(info)
	}
}

#[async_trait]
impl CredentialSource for FakeCredentials {
	async fn org_info(&self, alias: &str) -> Result<OrgInfo> {
		self.state.org_info_calls.fetch_add(1, Ordering::SeqCst);
		self.lookup(alias)
	}

	async fn entry_url(&self, alias: &str, path: Option<&str>) -> Result<String> {
		self.state.entry_url_calls.fetch_add(1, Ordering::SeqCst);
		let info = self.lookup(alias)?;
		let ret = path.unwrap_or("/lightning/page/home");
		Ok(format!("{}/secur/frontdoor.jsp?sid=fake&retURL={ret}", info.instance_url))
	}

	async fn list_orgs(&self) -> Result<Vec<OrgSummary>> {
		self.state.list_calls.fetch_add(1, Ordering::SeqCst);
		let mut orgs: Vec<OrgSummary> = self
			.state
			.orgs
			.lock()
			.values()
			.map(|info| OrgSummary {
				alias: info.alias.clone(),
				username: info.username.clone(),
				is_active: info.status.as_deref() == Some("Connected"),
				org_id: Some(info.org_id.clone()),
			})
			.collect();
		orgs.sort_by(|a, b| a.alias.cmp(&b.alias));
		Ok(orgs)
	}
}
