//! Composite Lightning interactions built from selectors and waits.
//!
//! Every error raised here names the action attempted and the label, search
//! term or app name involved.

mod fields;
mod launcher;
mod lookup;
mod picklist;
mod record;
mod setup;

use std::time::Duration;

pub use self::record::SaveOutcome;
use crate::config::Timeouts;
use crate::engine::Page;
use crate::error::Result;
use crate::locate::require_visible;
use crate::poll::Deadline;
use crate::selectors::{self, Candidates};
use crate::wait::Waiter;

/// UI pattern handlers bound to one page.
#[derive(Clone, Copy)]
pub struct Ui<'a> {
	page: &'a dyn Page,
	timeouts: &'a Timeouts,
}

impl<'a> Ui<'a> {
	pub fn new(page: &'a dyn Page, timeouts: &'a Timeouts) -> Self {
		Self { page, timeouts }
	}

	fn waiter(&self) -> Waiter<'a> {
		Waiter::new(self.page, self.timeouts)
	}

	fn element_deadline(&self) -> Deadline {
		Deadline::after(self.timeouts.element())
	}

	async fn resolve(&self, candidates: &Candidates, deadline: &Deadline, action: &'static str) -> Result<String> {
		require_visible(self.page, candidates, deadline, self.timeouts.element_poll(), action).await
	}

	fn remaining_or_poll(&self, deadline: &Deadline) -> Duration {
		deadline.remaining().max(self.timeouts.element_poll())
	}

	/// Fills a text or textarea field found by its label.
	pub async fn fill_field(&self, label: &str, value: &str) -> Result<()> {
		let deadline = self.element_deadline();
		let input = self.resolve(&selectors::text_input(label), &deadline, "fill field").await?;
		self.page.fill(&input, value, self.remaining_or_poll(&deadline)).await
	}

	/// Clicks a button found by its label, name or title.
	pub async fn click_button(&self, label: &str) -> Result<()> {
		let deadline = self.element_deadline();
		let button = self.resolve(&selectors::button(label), &deadline, "click button").await?;
		self.page.click(&button, self.remaining_or_poll(&deadline)).await
	}
}
