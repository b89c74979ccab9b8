use tracing::debug;

use super::Ui;
use crate::error::{Error, Result};
use crate::locate::find_visible;
use crate::poll::Deadline;
use crate::selectors::{self, Candidates};

impl Ui<'_> {
	/// Sets a checkbox to `checked`, clicking only when the state differs.
	///
	/// Returns whether a click was needed.
	pub async fn set_checkbox(&self, label: &str, checked: bool) -> Result<bool> {
		let deadline = self.element_deadline();
		let input = self.resolve(&selectors::checkbox(label), &deadline, "set checkbox").await?;
		if self.page.is_checked(&input).await? == checked {
			debug!(target = "sfpilot.ui", label, checked, "checkbox already in state");
			return Ok(false);
		}
		self.page.click(&input, self.remaining_or_poll(&deadline)).await?;
		Ok(true)
	}

	/// Fills a date field, and its time part when `time` is given.
	///
	/// Each input is blurred with Tab afterwards since the components only
	/// commit their value on blur.
	pub async fn fill_date(&self, label: &str, date: &str, time: Option<&str>) -> Result<()> {
		let deadline = self.element_deadline();
		let scope = self.resolve(&selectors::field_scope(label), &deadline, "fill date").await?;

		self.fill_and_blur(&selectors::date_part().within(&scope), &deadline, date, "fill date", label)
			.await?;
		if let Some(time) = time {
			self.fill_and_blur(&selectors::time_part().within(&scope), &deadline, time, "fill time", label)
				.await?;
		}
		Ok(())
	}

	async fn fill_and_blur(
		&self,
		part: &Candidates,
		deadline: &Deadline,
		value: &str,
		action: &'static str,
		label: &str,
	) -> Result<()> {
		let input = find_visible(self.page, part, deadline, self.timeouts.element_poll())
			.await
			.ok_or_else(|| Error::element_not_found(action, format!("{} of {label}", part.concept())))?;
		let timeout = self.remaining_or_poll(deadline);
		self.page.fill(&input, value, timeout).await?;
		self.page.press(&input, "Tab", timeout).await
	}
}
