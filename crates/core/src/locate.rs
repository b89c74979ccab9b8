//! "First visible match wins" resolution over [`Candidates`].

use std::time::Duration;

use tracing::trace;

use crate::engine::Page;
use crate::error::{Error, Result};
use crate::poll::{Deadline, poll_until};
use crate::selectors::{Candidates, visible};

/// Tries every candidate once, in order. Returns the visibility-filtered
/// query of the first candidate with a visible match.
///
/// Lookup failures (a page mid-navigation, an invalid selector for this
/// engine) count as "no match" for that candidate.
pub async fn first_visible(page: &dyn Page, candidates: &Candidates) -> Option<String> {
	for query in candidates.queries() {
		let filtered = visible(query);
		match page.count(&filtered).await {
			Ok(n) if n > 0 => return Some(filtered),
			Ok(_) => {}
			Err(err) => trace!(target = "sfpilot.ui", %query, error = %err, "candidate lookup failed"),
		}
	}
	None
}

/// First candidate present in the DOM, visible or not.
pub async fn first_present(page: &dyn Page, candidates: &Candidates) -> Option<String> {
	for query in candidates.queries() {
		if let Ok(n) = page.count(query).await {
			if n > 0 {
				return Some(query.clone());
			}
		}
	}
	None
}

/// Whether any candidate currently has a visible match.
pub async fn any_visible(page: &dyn Page, candidates: &Candidates) -> bool {
	first_visible(page, candidates).await.is_some()
}

/// Polls [`first_visible`] until a candidate matches or `deadline` passes.
pub async fn find_visible(page: &dyn Page, candidates: &Candidates, deadline: &Deadline, interval: Duration) -> Option<String> {
	poll_until(interval, deadline, move || first_visible(page, candidates)).await
}

/// [`find_visible`], failing with [`Error::ElementNotFound`] naming `action`
/// and the candidates' concept.
pub async fn require_visible(
	page: &dyn Page,
	candidates: &Candidates,
	deadline: &Deadline,
	interval: Duration,
	action: &'static str,
) -> Result<String> {
	find_visible(page, candidates, deadline, interval)
		.await
		.ok_or_else(|| Error::element_not_found(action, candidates.concept()))
}
