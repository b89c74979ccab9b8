use tracing::debug;

use super::Ui;
use crate::error::{Error, Result};
use crate::locate::find_visible;
use crate::poll::{Deadline, settle};
use crate::selectors;

impl Ui<'_> {
	/// Opens an app through the App Launcher and waits for it to load.
	pub async fn open_app(&self, app: &str) -> Result<()> {
		let deadline = Deadline::after(self.timeouts.navigation());
		let poll = self.timeouts.element_poll();
		let step = self.timeouts.element();

		let button = self
			.resolve(&selectors::app_launcher_button(), &deadline.capped(step), "open app launcher")
			.await?;
		self.page.click(&button, self.remaining_or_poll(&deadline.capped(step))).await?;

		let panel = deadline.capped(self.timeouts.modal());
		if find_visible(self.page, &selectors::app_launcher_panel(), &panel, poll).await.is_none() {
			debug!(target = "sfpilot.ui", app, "launcher panel marker not seen, settling instead");
			settle(self.timeouts.launcher_fallback().min(deadline.remaining())).await;
		}

		let find = deadline.capped(step);
		let search = find_visible(self.page, &selectors::app_launcher_search(), &find, poll)
			.await
			.ok_or_else(|| Error::LauncherSearchNotFound { app: app.to_string() })?;
		self.page.fill(&search, app, self.remaining_or_poll(&find)).await?;

		let pick = deadline.capped(step);
		let entry = find_visible(self.page, &selectors::app_launcher_entry(app), &pick, poll)
			.await
			.ok_or_else(|| Error::LauncherEntryNotFound { app: app.to_string() })?;
		self.page.click(&entry, self.remaining_or_poll(&pick)).await?;

		self.waiter().navigation_ready(deadline.remaining()).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use tokio::time::Instant;

	use crate::Error;
	use crate::config::Timeouts;
	use crate::testing::{Effect, FakePage, LANDING_URL, SHELL_MARKER};
	use crate::ui::Ui;

	const BUTTON: &str = "one-app-launcher-header button";
	const PANEL: &str = "one-app-launcher-modal";
	const SEARCH: &str = "one-app-launcher-search-bar input";
	const ENTRY: &str = "one-app-launcher-menu-item a[data-label=\"Sales\"]";

	fn launcher_page(with_panel: bool, with_search: bool, with_entry: bool) -> FakePage {
		let page = FakePage::new("https://acme.lightning.force.com/lightning/setup/SetupOneHome/home");
		page.show(BUTTON);
		let mut opened = Vec::new();
		if with_panel {
			opened.push(Effect::Show(PANEL.to_string()));
		}
		if with_search {
			opened.push(Effect::Show(SEARCH.to_string()));
		}
		page.on_click(BUTTON, opened);
		if with_entry {
			page.on_fill(SEARCH, [Effect::ShowAfter(ENTRY.to_string(), Duration::from_millis(400))]);
			page.on_click(
				ENTRY,
				[Effect::SetUrl(LANDING_URL.to_string()), Effect::Show(SHELL_MARKER.to_string())],
			);
		}
		page
	}

	#[tokio::test(start_paused = true)]
	async fn opens_app_through_search() {
		let page = launcher_page(true, true, true);
		let timeouts = Timeouts::default();
		Ui::new(&page, &timeouts).open_app("Sales").await.unwrap();
		assert_eq!(page.fills(), vec![(format!("{SEARCH} >> visible=true"), "Sales".to_string())]);
		assert_eq!(page.clicks().last().unwrap(), &format!("{ENTRY} >> visible=true"));
	}

	#[tokio::test(start_paused = true)]
	async fn unreliable_panel_marker_falls_back_to_a_delay() {
		let page = launcher_page(false, true, true);
		let timeouts = Timeouts::default();
		let started = Instant::now();
		Ui::new(&page, &timeouts).open_app("Sales").await.unwrap();
		assert!(started.elapsed() >= timeouts.modal() + timeouts.launcher_fallback());
	}

	#[tokio::test(start_paused = true)]
	async fn missing_search_and_missing_entry_fail_differently() {
		let timeouts = Timeouts::default();

		let page = launcher_page(true, false, false);
		let err = Ui::new(&page, &timeouts).open_app("Sales").await.unwrap_err();
		assert!(matches!(err, Error::LauncherSearchNotFound { ref app } if app == "Sales"));

		let page = launcher_page(true, true, false);
		let err = Ui::new(&page, &timeouts).open_app("Sales").await.unwrap_err();
		assert!(matches!(err, Error::LauncherEntryNotFound { ref app } if app == "Sales"));
	}

	#[tokio::test(start_paused = true)]
	async fn every_step_shares_the_navigation_budget() {
		let page = launcher_page(false, false, false);
		let timeouts = Timeouts {
			navigation_ms: 12_000,
			..Timeouts::default()
		};
		let started = Instant::now();
		let err = Ui::new(&page, &timeouts).open_app("Sales").await.unwrap_err();
		assert!(matches!(err, Error::LauncherSearchNotFound { .. }), "{err:?}");
		assert!(started.elapsed() <= timeouts.navigation());
	}
}
