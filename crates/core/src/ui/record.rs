use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use super::Ui;
use crate::error::Result;
use crate::selectors;
use crate::wait::{Toast, ToastWait, looks_like_view};

/// How a save was confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SaveOutcome {
	/// A toast reported the result.
	Toast { toast: Toast },
	/// No toast was seen but the page moved to a record view URL.
	ViewUrl { url: String },
	/// The click went through but nothing confirmed the save.
	Unverified { url: String },
}

impl SaveOutcome {
	pub fn message(&self) -> String {
		match self {
			SaveOutcome::Toast { toast } => format!("Saved: {}", toast.message),
			SaveOutcome::ViewUrl { .. } => "Saved (record view loaded, no toast seen)".to_string(),
			SaveOutcome::Unverified { .. } => "Save clicked; no confirmation was observed".to_string(),
		}
	}
}

impl Ui<'_> {
	/// Clicks Save and reports how the result was confirmed.
	///
	/// A missing toast is not an error: the URL is checked instead, and if it
	/// is not a record view the outcome is [`SaveOutcome::Unverified`].
	pub async fn save_record(&self, toast_timeout: Option<Duration>) -> Result<SaveOutcome> {
		let deadline = self.element_deadline();
		let button = self.resolve(&selectors::save_button(), &deadline, "save record").await?;
		self.page.click(&button, self.remaining_or_poll(&deadline)).await?;

		let timeout = toast_timeout.unwrap_or_else(|| self.timeouts.save_toast());
		let outcome = match self.waiter().toast(timeout).await {
			ToastWait::Shown(toast) => SaveOutcome::Toast { toast },
			ToastWait::TimedOut { .. } => {
				let url = self.page.url().await?;
				if looks_like_view(&url) {
					SaveOutcome::ViewUrl { url }
				} else {
					SaveOutcome::Unverified { url }
				}
			}
		};
		info!(target = "sfpilot.ui", ?outcome, "save");
		Ok(outcome)
	}

	/// Clicks Cancel and lets any edit dialog close.
	pub async fn cancel_edit(&self) -> Result<()> {
		let deadline = self.element_deadline();
		let button = self.resolve(&selectors::cancel_button(), &deadline, "cancel edit").await?;
		self.page.click(&button, self.remaining_or_poll(&deadline)).await?;
		if let Err(err) = self.waiter().modal_closed(self.timeouts.modal()).await {
			debug!(target = "sfpilot.ui", error = %err, "dialog still open after cancel");
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use tokio::time::Instant;

	use super::SaveOutcome;
	use crate::Error;
	use crate::config::Timeouts;
	use crate::testing::{Effect, FakePage};
	use crate::ui::Ui;
	use crate::wait::ToastKind;

	const EDIT_URL: &str = "https://acme.lightning.force.com/lightning/r/Account/0015g00000AbCdEAAZ/edit";
	const VIEW_URL: &str = "https://acme.lightning.force.com/lightning/r/Account/0015g00000AbCdEAAZ/view";
	const SAVE: &str = "button[name=\"SaveEdit\"]";

	fn edit_page() -> FakePage {
		let page = FakePage::new(EDIT_URL);
		page.show(SAVE);
		page
	}

	#[tokio::test(start_paused = true)]
	async fn toast_confirms_save() {
		let page = edit_page();
		page.on_click(
			SAVE,
			[
				Effect::ShowAfter("div.forceToastMessage".to_string(), Duration::from_secs(2)),
				Effect::Show("div.forceToastMessage >> .slds-theme_success".to_string()),
			],
		);
		let timeouts = Timeouts::default();
		let outcome = Ui::new(&page, &timeouts).save_record(None).await.unwrap();
		let SaveOutcome::Toast { toast } = outcome else {
			panic!("expected toast, got {outcome:?}");
		};
		assert_eq!(toast.kind, ToastKind::Success);
	}

	#[tokio::test(start_paused = true)]
	async fn view_url_counts_as_saved_without_toast() {
		let page = edit_page();
		page.on_click(SAVE, [Effect::SetUrlAfter(VIEW_URL.to_string(), Duration::from_secs(1))]);
		let timeouts = Timeouts::default();
		let started = Instant::now();
		let outcome = Ui::new(&page, &timeouts).save_record(Some(Duration::from_secs(5))).await.unwrap();
		assert_eq!(outcome, SaveOutcome::ViewUrl { url: VIEW_URL.to_string() });
		assert_eq!(started.elapsed(), Duration::from_secs(5));
	}

	#[tokio::test(start_paused = true)]
	async fn unconfirmed_save_is_not_an_error() {
		let page = edit_page();
		let timeouts = Timeouts::default();
		let outcome = Ui::new(&page, &timeouts).save_record(None).await.unwrap();
		assert_eq!(outcome, SaveOutcome::Unverified { url: EDIT_URL.to_string() });
	}

	#[tokio::test(start_paused = true)]
	async fn missing_save_button_is_element_not_found() {
		let page = FakePage::new(EDIT_URL);
		let timeouts = Timeouts::default();
		let err = Ui::new(&page, &timeouts).save_record(None).await.unwrap_err();
		assert!(matches!(err, Error::ElementNotFound { action: "save record", .. }));
	}

	#[tokio::test(start_paused = true)]
	async fn cancel_tolerates_a_lingering_dialog() {
		let page = FakePage::new(EDIT_URL);
		page.show("button[name=\"CancelEdit\"]");
		page.show("section[role=\"dialog\"]");
		let timeouts = Timeouts::default();
		Ui::new(&page, &timeouts).cancel_edit().await.unwrap();
		assert_eq!(page.clicks().len(), 1);
	}
}
