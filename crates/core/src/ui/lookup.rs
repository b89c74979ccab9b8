use tracing::debug;

use super::Ui;
use crate::error::{Error, Result};
use crate::locate::find_visible;
use crate::selectors;

impl Ui<'_> {
	/// Searches a lookup field and picks one result.
	///
	/// An `index` past the end of the result list selects the first result.
	/// Returns the index actually selected.
	pub async fn select_lookup(&self, label: &str, search: &str, index: Option<usize>) -> Result<usize> {
		const ACTION: &str = "select lookup result";
		let deadline = self.element_deadline();

		let input = self.resolve(&selectors::lookup_input(label), &deadline, ACTION).await?;
		self.page.click(&input, self.remaining_or_poll(&deadline)).await?;
		self.page.fill(&input, search, self.remaining_or_poll(&deadline)).await?;

		let no_results = || Error::NoLookupResults {
			label: label.to_string(),
			search: search.to_string(),
		};
		let results = find_visible(self.page, &selectors::lookup_results(), &deadline, self.timeouts.element_poll())
			.await
			.ok_or_else(no_results)?;
		let count = self.page.count(&results).await?;
		if count == 0 {
			return Err(no_results());
		}

		let wanted = index.unwrap_or(0);
		let chosen = if wanted < count {
			wanted
		} else {
			debug!(target = "sfpilot.ui", label, wanted, count, "lookup index out of range, using first result");
			0
		};
		self.page
			.click(&format!("{results} >> nth={chosen}"), self.remaining_or_poll(&deadline))
			.await?;
		Ok(chosen)
	}
}
