use tracing::debug;

use super::Ui;
use crate::error::{Error, Result};
use crate::locate::find_visible;
use crate::poll::settle;
use crate::selectors;

impl Ui<'_> {
	/// Opens the picklist labelled `label` and picks `value`.
	///
	/// Exact value, title and text matches are tried before partial text.
	pub async fn select_picklist(&self, label: &str, value: &str) -> Result<()> {
		const ACTION: &str = "select picklist value";
		let deadline = self.element_deadline();
		let poll = self.timeouts.element_poll();

		let trigger = self.resolve(&selectors::picklist_trigger(label), &deadline, ACTION).await?;
		self.page.click(&trigger, self.remaining_or_poll(&deadline)).await?;

		let options = selectors::picklist_options();
		if find_visible(self.page, &options, &deadline, poll).await.is_none() {
			return Err(Error::element_not_found(ACTION, format!("{} for {label}", options.concept())));
		}

		let option = find_visible(self.page, &selectors::picklist_option(value), &deadline.half(), poll)
			.await
			.ok_or_else(|| Error::OptionNotFound {
				label: label.to_string(),
				value: value.to_string(),
			})?;
		debug!(target = "sfpilot.ui", label, value, %option, "picklist option");
		self.page.click(&option, self.remaining_or_poll(&deadline)).await?;
		settle(self.timeouts.picklist_settle()).await;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use tokio::time::Instant;

	use crate::Error;
	use crate::config::Timeouts;
	use crate::testing::{Effect, FakePage};
	use crate::ui::Ui;

	const TRIGGER: &str = "lightning-combobox:has(label:text-is(\"Stage\")) button";

	fn page_with_options(options: &[&str]) -> FakePage {
		let page = FakePage::new("https://acme.lightning.force.com/lightning/o/Opportunity/new");
		page.show(TRIGGER);
		let mut effects = vec![Effect::Show("lightning-base-combobox div[role=\"listbox\"]".to_string())];
		effects.extend(options.iter().map(|q| Effect::Show(q.to_string())));
		page.on_click(TRIGGER, effects);
		page
	}

	#[tokio::test(start_paused = true)]
	async fn exact_option_is_preferred_over_partial_text() {
		let page = page_with_options(&[
			"[role=\"option\"]:has-text(\"Closed Won\")",
			"lightning-base-combobox-item[data-value=\"Closed Won\"]",
		]);
		let timeouts = Timeouts::default();
		let started = Instant::now();
		Ui::new(&page, &timeouts).select_picklist("Stage", "Closed Won").await.unwrap();
		assert_eq!(
			page.clicks(),
			vec![
				format!("{TRIGGER} >> visible=true"),
				"lightning-base-combobox-item[data-value=\"Closed Won\"] >> visible=true".to_string(),
			]
		);
		assert_eq!(started.elapsed(), timeouts.picklist_settle());
	}

	#[tokio::test(start_paused = true)]
	async fn closest_text_match_is_the_fallback() {
		let page = page_with_options(&["[role=\"option\"]:has-text(\"Prospecting\")"]);
		let timeouts = Timeouts::default();
		Ui::new(&page, &timeouts).select_picklist("Stage", "Prospecting").await.unwrap();
		assert_eq!(page.clicks().len(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn missing_option_reports_label_and_value() {
		let page = page_with_options(&[]);
		let timeouts = Timeouts::default();
		let err = Ui::new(&page, &timeouts).select_picklist("Stage", "Closed Lost").await.unwrap_err();
		assert!(matches!(err, Error::OptionNotFound { ref label, ref value } if label == "Stage" && value == "Closed Lost"));
		assert_eq!(page.clicks().len(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn options_that_never_open_are_element_not_found() {
		let page = FakePage::new("about:blank");
		page.show(TRIGGER);
		let timeouts = Timeouts::default();
		let started = Instant::now();
		let err = Ui::new(&page, &timeouts).select_picklist("Stage", "Closed Lost").await.unwrap_err();
		assert!(matches!(err, Error::ElementNotFound { action: "select picklist value", .. }));
		assert_eq!(started.elapsed(), Duration::from_secs(10));
	}
}
