//! Navigation and framework bootstrap: the one wait whose failure is fatal.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{Waiter, millis};
use crate::error::{Error, Result};
use crate::locate::find_visible;
use crate::poll::{Deadline, poll_until};
use crate::selectors;

/// Consecutive equal URL samples that count as "done redirecting".
const STABLE_SAMPLES: usize = 3;

const READY_STATE: &str = "document.readyState";

const AUTH_HOSTS: &[&str] = &["login.salesforce.com", "test.salesforce.com"];

/// Whether `url` is a login, frontdoor or classic redirect hop rather than
/// the Lightning application itself.
pub fn is_transient_auth_url(url: &str) -> bool {
	let Ok(parsed) = Url::parse(url) else {
		return true;
	};
	let host = parsed.host_str().unwrap_or_default();
	let path = parsed.path();
	AUTH_HOSTS.contains(&host)
		|| path.starts_with("/secur/")
		|| path.contains("frontdoor.jsp")
		|| (host.ends_with(".my.salesforce.com") && !path.starts_with("/lightning"))
}

/// Whether `url` is inside the Lightning URL namespace.
pub fn in_app_namespace(url: &str) -> bool {
	!is_transient_auth_url(url) && Url::parse(url).is_ok_and(|u| u.path().starts_with("/lightning"))
}

impl Waiter<'_> {
	/// Waits until the Lightning application has booted on the current page.
	///
	/// Leaving the auth domains, URL debounce and document readiness are
	/// bounded by the deadline but do not fail on their own. Only a missing
	/// application shell is an error.
	pub async fn app_ready(&self, timeout: Duration) -> Result<()> {
		let deadline = Deadline::after(timeout);
		let page = self.page;
		let interval = self.timeouts.navigation_poll();

		let entered = poll_until(interval, &deadline, move || async move {
			let url = page.url().await.ok()?;
			in_app_namespace(&url).then_some(url)
		})
		.await;
		if entered.is_none() {
			debug!(target = "sfpilot.wait", "never left the authentication redirects");
		}

		if !self.url_stable(&deadline).await {
			debug!(target = "sfpilot.wait", "url still changing");
		}

		let loaded = poll_until(interval, &deadline, move || async move {
			match page.evaluate(READY_STATE).await {
				Ok(Value::String(state)) if state == "complete" || state == "interactive" => Some(()),
				_ => None,
			}
		})
		.await;
		if loaded.is_none() {
			debug!(target = "sfpilot.wait", "document never reported ready");
		}

		let shell = selectors::app_shell();
		if find_visible(page, &shell, &deadline.rest(), self.timeouts.element_poll()).await.is_none() {
			let url = page.url().await.unwrap_or_default();
			return Err(Error::NavigationTimeout {
				url,
				ms: millis(timeout),
				detail: format!("{} never rendered", shell.concept()),
			});
		}

		self.until_gone(&selectors::spinners(), &deadline.half()).await;
		Ok(())
	}

	/// Samples the URL until it holds still for [`STABLE_SAMPLES`] samples.
	async fn url_stable(&self, deadline: &Deadline) -> bool {
		let interval = self.timeouts.navigation_poll();
		let mut last = self.page.url().await.ok();
		let mut same = 1;
		while same < STABLE_SAMPLES {
			let remaining = deadline.remaining();
			if remaining.is_zero() {
				return false;
			}
			tokio::time::sleep(interval.min(remaining)).await;
			let current = self.page.url().await.ok();
			if current == last {
				same += 1;
			} else {
				same = 1;
				last = current;
			}
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use tokio::time::Instant;

	use super::*;
	use crate::config::Timeouts;
	use crate::testing::{FakePage, LANDING_URL, SHELL_MARKER};

	const FRONTDOOR: &str = "https://acme.my.salesforce.com/secur/frontdoor.jsp?sid=x";

	#[test]
	fn auth_hops_are_transient() {
		assert!(is_transient_auth_url(FRONTDOOR));
		assert!(is_transient_auth_url("https://login.salesforce.com/?un=admin"));
		assert!(is_transient_auth_url("https://acme.my.salesforce.com/home/home.jsp"));
		assert!(!is_transient_auth_url(LANDING_URL));
		assert!(in_app_namespace(LANDING_URL));
		assert!(in_app_namespace("https://acme.my.salesforce.com/lightning/o/Account/list"));
		assert!(!in_app_namespace("about:blank"));
	}

	#[tokio::test(start_paused = true)]
	async fn follows_redirects_then_finds_shell() {
		let page = FakePage::new(FRONTDOOR);
		page.set_url_after("https://acme.my.salesforce.com/home/home.jsp", Duration::from_millis(700));
		page.set_url_after(LANDING_URL, Duration::from_millis(1500));
		page.show(SHELL_MARKER);
		let timeouts = Timeouts::default();
		let started = Instant::now();
		Waiter::new(&page, &timeouts).app_ready(timeouts.navigation()).await.unwrap();
		// landing seen at 1.5s, then two more equal samples 500ms apart
		assert_eq!(started.elapsed(), Duration::from_millis(2500));
	}

	#[tokio::test(start_paused = true)]
	async fn missing_shell_is_a_navigation_timeout_at_the_deadline() {
		let page = FakePage::new(LANDING_URL);
		let timeouts = Timeouts::default();
		let started = Instant::now();
		let err = Waiter::new(&page, &timeouts).app_ready(Duration::from_secs(8)).await.unwrap_err();
		assert_eq!(started.elapsed(), Duration::from_secs(8));
		match err {
			Error::NavigationTimeout { url, ms, .. } => {
				assert_eq!(url, LANDING_URL);
				assert_eq!(ms, 8000);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn stuck_redirect_still_succeeds_when_shell_renders() {
		let page = FakePage::new(FRONTDOOR);
		page.show("header#oneHeader");
		let timeouts = Timeouts::default();
		Waiter::new(&page, &timeouts).app_ready(Duration::from_secs(4)).await.unwrap();
	}

	#[tokio::test(start_paused = true)]
	async fn late_shell_is_found_before_the_deadline() {
		let page = FakePage::new(LANDING_URL);
		page.show_after("div.slds-global-header", Duration::from_secs(3));
		let timeouts = Timeouts::default();
		let started = Instant::now();
		Waiter::new(&page, &timeouts).app_ready(Duration::from_secs(10)).await.unwrap();
		assert_eq!(started.elapsed(), Duration::from_secs(3));
	}

	#[tokio::test(start_paused = true)]
	async fn document_readiness_is_bounded_but_not_fatal() {
		let page = FakePage::new(LANDING_URL);
		page.set_ready_state("loading");
		page.show(SHELL_MARKER);
		let timeouts = Timeouts::default();
		let started = Instant::now();
		Waiter::new(&page, &timeouts).app_ready(Duration::from_secs(4)).await.unwrap();
		assert_eq!(started.elapsed(), Duration::from_secs(4));
	}
}
