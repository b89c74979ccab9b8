//! Wait strategy engine.
//!
//! Every wait polls page state until a condition holds or its deadline
//! passes. Spinner and stencil waits are best-effort and report
//! [`Outcome::TimedOut`] instead of failing. The remaining waits are hard and
//! fail with [`Error::Timeout`], or [`Error::NavigationTimeout`] for the
//! bootstrap wait and [`Waiter::navigation_ready`]. Chained sub-waits only get a slice of what is left of the
//! caller's deadline, see [`Deadline::half`].

mod bootstrap;
mod page_kind;
mod toast;

use std::time::Duration;

use tracing::debug;

pub use self::bootstrap::{in_app_namespace, is_transient_auth_url};
pub use self::page_kind::{PageKind, looks_like_view};
pub use self::toast::{Toast, ToastKind, ToastWait};
use crate::config::Timeouts;
use crate::engine::Page;
use crate::error::{Error, Result};
use crate::locate::{any_visible, find_visible};
use crate::poll::{Deadline, poll_until};
use crate::selectors::{self, Candidates};

/// Result of a best-effort wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Satisfied,
	TimedOut,
}

impl Outcome {
	pub fn is_satisfied(self) -> bool {
		self == Outcome::Satisfied
	}
}

/// Runs named waits against one page with one timeout policy.
#[derive(Clone, Copy)]
pub struct Waiter<'a> {
	page: &'a dyn Page,
	timeouts: &'a Timeouts,
}

impl<'a> Waiter<'a> {
	pub fn new(page: &'a dyn Page, timeouts: &'a Timeouts) -> Self {
		Self { page, timeouts }
	}

	pub fn page(&self) -> &'a dyn Page {
		self.page
	}

	pub fn timeouts(&self) -> &'a Timeouts {
		self.timeouts
	}

	/// Waits until no loading spinner is visible. Never fails.
	pub async fn no_spinners(&self, timeout: Duration) -> Outcome {
		self.until_gone(&selectors::spinners(), &Deadline::after(timeout)).await
	}

	/// Waits until no stencil placeholder is visible. Never fails.
	pub async fn no_stencils(&self, timeout: Duration) -> Outcome {
		self.until_gone(&selectors::stencils(), &Deadline::after(timeout)).await
	}

	/// Waits for a record form container, then lets spinners and stencils clear.
	pub async fn form_ready(&self, timeout: Duration) -> Result<()> {
		self.marker_then_settle(&selectors::form_containers(), timeout).await
	}

	pub async fn list_view_ready(&self, timeout: Duration) -> Result<()> {
		self.marker_then_settle(&selectors::list_view(), timeout).await
	}

	pub async fn record_page_ready(&self, timeout: Duration) -> Result<()> {
		self.marker_then_settle(&selectors::record_page(), timeout).await
	}

	pub async fn setup_page_ready(&self, timeout: Duration) -> Result<()> {
		self.marker_then_settle(&selectors::setup_page(), timeout).await
	}

	pub async fn modal_visible(&self, timeout: Duration) -> Result<()> {
		let deadline = Deadline::after(timeout);
		self.marker(&selectors::modal(), &deadline).await.map(|_| ())
	}

	pub async fn modal_closed(&self, timeout: Duration) -> Result<()> {
		let deadline = Deadline::after(timeout);
		let modal = selectors::modal();
		match self.until_gone(&modal, &deadline).await {
			Outcome::Satisfied => Ok(()),
			Outcome::TimedOut => Err(Error::Timeout {
				condition: format!("{} to close", modal.concept()),
				ms: millis(timeout),
			}),
		}
	}

	/// Classifies the current URL and runs exactly one matching readiness wait.
	pub async fn smart(&self, timeout: Duration) -> Result<PageKind> {
		let url = self.page.url().await?;
		let kind = PageKind::classify(&url);
		debug!(target = "sfpilot.wait", %url, kind = kind.as_str(), "smart wait");
		match kind {
			PageKind::Form => self.form_ready(timeout).await?,
			PageKind::Record => self.record_page_ready(timeout).await?,
			PageKind::ListView => self.list_view_ready(timeout).await?,
			PageKind::Setup => self.setup_page_ready(timeout).await?,
			PageKind::Generic => self.app_ready(timeout).await?,
		}
		Ok(kind)
	}

	/// [`smart`](Self::smart) after a navigation. A page that never reaches
	/// its readiness marker is a [`Error::NavigationTimeout`], whatever its kind.
	pub async fn navigation_ready(&self, timeout: Duration) -> Result<PageKind> {
		match self.smart(timeout).await {
			Err(Error::Timeout { condition, ms }) => {
				let url = self.page.url().await.unwrap_or_default();
				Err(Error::NavigationTimeout {
					url,
					ms,
					detail: format!("{condition} never became ready"),
				})
			}
			other => other,
		}
	}

	async fn marker_then_settle(&self, marker: &Candidates, timeout: Duration) -> Result<()> {
		let deadline = Deadline::after(timeout);
		self.marker(marker, &deadline).await?;
		self.until_gone(&selectors::spinners(), &deadline.half()).await;
		self.until_gone(&selectors::stencils(), &deadline.half()).await;
		Ok(())
	}

	/// Hard wait for any visible candidate.
	async fn marker(&self, marker: &Candidates, deadline: &Deadline) -> Result<String> {
		find_visible(self.page, marker, deadline, self.timeouts.element_poll())
			.await
			.ok_or_else(|| Error::Timeout {
				condition: marker.concept().to_string(),
				ms: millis(deadline.budget()),
			})
	}

	async fn until_gone(&self, candidates: &Candidates, deadline: &Deadline) -> Outcome {
		let page = self.page;
		let gone = poll_until(self.timeouts.spinner_poll(), deadline, move || async move {
			(!any_visible(page, candidates).await).then_some(())
		})
		.await;
		match gone {
			Some(()) => Outcome::Satisfied,
			None => {
				debug!(
					target = "sfpilot.wait",
					concept = candidates.concept(),
					timeout_ms = millis(deadline.budget()),
					"still visible after timeout, continuing"
				);
				Outcome::TimedOut
			}
		}
	}
}

fn millis(d: Duration) -> u64 {
	u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
	use tokio::time::Instant;

	use super::*;
	use crate::testing::FakePage;

	const RECORD_URL: &str = "https://acme.lightning.force.com/lightning/r/Account/0015g00000AbCdEAAZ/view";

	#[tokio::test(start_paused = true)]
	async fn best_effort_wait_returns_immediately_when_clear() {
		let page = FakePage::new(RECORD_URL);
		page.insert_hidden("lightning-spinner");
		let timeouts = Timeouts::default();
		let started = Instant::now();
		let outcome = Waiter::new(&page, &timeouts).no_spinners(timeouts.spinner()).await;
		assert_eq!(outcome, Outcome::Satisfied);
		assert_eq!(started.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn lingering_spinner_times_out_without_error() {
		let page = FakePage::new(RECORD_URL);
		page.show("div.slds-spinner");
		let timeouts = Timeouts::default();
		let started = Instant::now();
		let outcome = Waiter::new(&page, &timeouts).no_spinners(Duration::from_secs(3)).await;
		assert_eq!(outcome, Outcome::TimedOut);
		assert_eq!(started.elapsed(), Duration::from_secs(3));
	}

	#[tokio::test(start_paused = true)]
	async fn stencils_clear_on_next_poll() {
		let page = FakePage::new(RECORD_URL);
		page.show("force-placeholder2");
		page.remove_after("force-placeholder2", Duration::from_millis(600));
		let timeouts = Timeouts::default();
		let started = Instant::now();
		let outcome = Waiter::new(&page, &timeouts).no_stencils(timeouts.stencil()).await;
		assert!(outcome.is_satisfied());
		assert_eq!(started.elapsed(), Duration::from_millis(750));
	}

	#[tokio::test(start_paused = true)]
	async fn form_ready_fails_only_after_full_timeout() {
		let page = FakePage::new("https://acme.lightning.force.com/lightning/o/Account/new");
		let timeouts = Timeouts::default();
		let started = Instant::now();
		let err = Waiter::new(&page, &timeouts).form_ready(Duration::from_secs(5)).await.unwrap_err();
		assert_eq!(started.elapsed(), Duration::from_secs(5));
		assert!(matches!(err, Error::Timeout { ms: 5000, .. }));
	}

	#[tokio::test(start_paused = true)]
	async fn form_ready_chains_settle_waits_inside_budget() {
		let page = FakePage::new("https://acme.lightning.force.com/lightning/o/Account/new");
		page.show_after("records-record-edit-form", Duration::from_secs(2));
		page.show("lightning-spinner");
		let timeouts = Timeouts::default();
		let started = Instant::now();
		Waiter::new(&page, &timeouts).form_ready(Duration::from_secs(10)).await.unwrap();
		// marker at 2s, spinner slice is half of the 8s left, stencils are already clear
		assert_eq!(started.elapsed(), Duration::from_secs(6));
	}

	#[tokio::test(start_paused = true)]
	async fn modal_waits_track_dialog_state() {
		let page = FakePage::new(RECORD_URL);
		let timeouts = Timeouts::default();
		let waiter = Waiter::new(&page, &timeouts);
		page.show_after("section[role=\"dialog\"]", Duration::from_millis(400));
		waiter.modal_visible(timeouts.modal()).await.unwrap();
		page.remove_after("section[role=\"dialog\"]", Duration::from_millis(300));
		waiter.modal_closed(timeouts.modal()).await.unwrap();

		page.show("div.uiModal");
		let started = Instant::now();
		let err = waiter.modal_closed(Duration::from_secs(2)).await.unwrap_err();
		assert!(matches!(err, Error::Timeout { .. }));
		assert_eq!(started.elapsed(), Duration::from_secs(2));
	}

	#[tokio::test(start_paused = true)]
	async fn smart_wait_dispatches_to_one_wait() {
		let timeouts = Timeouts::default();

		let page = FakePage::new(RECORD_URL);
		page.show("records-highlights2");
		let kind = Waiter::new(&page, &timeouts).smart(Duration::from_secs(5)).await.unwrap();
		assert_eq!(kind, PageKind::Record);

		let page = FakePage::new("https://acme.lightning.force.com/lightning/o/Contact/list?filterName=Recent");
		page.show("lst-list-view-manager");
		let kind = Waiter::new(&page, &timeouts).smart(Duration::from_secs(5)).await.unwrap();
		assert_eq!(kind, PageKind::ListView);

		// only the form marker exists, so any other dispatch would time out
		let page = FakePage::new("https://acme.lightning.force.com/lightning/r/Account/0015g00000AbCdEAAZ/edit");
		page.show("lightning-record-edit-form");
		let started = Instant::now();
		let kind = Waiter::new(&page, &timeouts).smart(Duration::from_secs(5)).await.unwrap();
		assert_eq!(kind, PageKind::Form);
		assert_eq!(started.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn navigation_ready_reports_missing_marker_as_navigation_timeout() {
		let timeouts = Timeouts::default();
		let page = FakePage::new("https://acme.lightning.force.com/lightning/o/Account/list");

		let err = Waiter::new(&page, &timeouts).smart(Duration::from_secs(4)).await.unwrap_err();
		assert!(matches!(err, Error::Timeout { .. }));

		let err = Waiter::new(&page, &timeouts).navigation_ready(Duration::from_secs(4)).await.unwrap_err();
		assert_eq!(err.code(), sfpilot_protocol::ErrorCode::NavigationTimeout);
		assert!(matches!(
			err,
			Error::NavigationTimeout { ref url, ms: 4000, ref detail }
				if url.ends_with("/lightning/o/Account/list") && detail.contains("list view")
		));
	}
}
