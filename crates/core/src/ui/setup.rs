use super::Ui;
use crate::error::{Error, Result};
use crate::locate::find_visible;
use crate::poll::{Deadline, settle};
use crate::selectors;

impl Ui<'_> {
	/// Types `term` into Setup Quick Find and optionally opens the entry named `open`.
	///
	/// The whole chain, including the wait for the opened page, fits in the
	/// navigation timeout.
	pub async fn quick_find(&self, term: &str, open: Option<&str>) -> Result<()> {
		let deadline = Deadline::after(self.timeouts.navigation());
		let step = self.timeouts.element();

		let find = deadline.capped(step);
		let input = self.resolve(&selectors::quick_find_input(), &find, "quick find").await?;
		self.page.fill(&input, term, self.remaining_or_poll(&find)).await?;
		// results are debounced client-side with no readiness marker
		settle(self.timeouts.quick_find_settle().min(deadline.remaining())).await;

		let Some(entry) = open else {
			return Ok(());
		};
		let result = selectors::quick_find_result(entry);
		let pick = deadline.capped(step);
		let link = find_visible(self.page, &result, &pick, self.timeouts.element_poll())
			.await
			.ok_or_else(|| Error::element_not_found("open quick find result", result.concept()))?;
		self.page.click(&link, self.remaining_or_poll(&pick)).await?;
		self.waiter()
			.navigation_ready(deadline.capped(self.timeouts.page_ready()).remaining())
			.await?;
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

	const SETUP_HOME: &str = "https://acme.lightning.force.com/lightning/setup/SetupOneHome/home";
	const PROFILES: &str = "div.tree-nav a:text-is(\"Profiles\")";

	#[tokio::test(start_paused = true)]
	async fn fills_then_settles() {
		let page = FakePage::new(SETUP_HOME);
		page.show("input.filter-box");
		let timeouts = Timeouts::default();
		let started = Instant::now();
		Ui::new(&page, &timeouts).quick_find("Profiles", None).await.unwrap();
		assert_eq!(started.elapsed(), timeouts.quick_find_settle());
		assert_eq!(page.fills(), vec![("input.filter-box >> visible=true".to_string(), "Profiles".to_string())]);
		assert!(page.clicks().is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn opens_matching_entry() {
		let page = FakePage::new(SETUP_HOME);
		page.show("input.filter-box");
		page.show("one-setup-app-container");
		page.on_fill("input.filter-box", [Effect::Show(PROFILES.to_string())]);
		page.on_click(
			PROFILES,
			[Effect::SetUrl("https://acme.lightning.force.com/lightning/setup/EnhancedProfiles/home".to_string())],
		);
		let timeouts = Timeouts::default();
		Ui::new(&page, &timeouts).quick_find("Profiles", Some("Profiles")).await.unwrap();
		assert_eq!(page.clicks(), vec![format!("{PROFILES} >> visible=true")]);
	}

	#[tokio::test(start_paused = true)]
	async fn slow_result_and_unready_page_stay_inside_navigation_budget() {
		let page = FakePage::new(SETUP_HOME);
		page.show("input.filter-box");
		page.on_fill("input.filter-box", [Effect::ShowAfter(PROFILES.to_string(), Duration::from_secs(9))]);
		page.on_click(
			PROFILES,
			[Effect::SetUrl("https://acme.lightning.force.com/lightning/setup/EnhancedProfiles/home".to_string())],
		);
		let timeouts = Timeouts {
			navigation_ms: 15_000,
			..Timeouts::default()
		};

		let started = Instant::now();
		let err = Ui::new(&page, &timeouts).quick_find("Profiles", Some("Profiles")).await.unwrap_err();
		assert!(matches!(err, Error::NavigationTimeout { .. }), "{err:?}");
		assert!(started.elapsed() <= timeouts.navigation());
	}

	#[tokio::test(start_paused = true)]
	async fn missing_entry_names_it() {
		let page = FakePage::new(SETUP_HOME);
		page.show("input.filter-box");
		let timeouts = Timeouts::default();
		let err = Ui::new(&page, &timeouts).quick_find("Flows", Some("Flows")).await.unwrap_err();
		assert!(matches!(err, Error::ElementNotFound { ref target, .. } if target == "Quick Find result Flows"));
	}
}
