//! Form field operations. Fields are addressed by their visible label.

use serde::Serialize;
use sfpilot::protocol::args::{CheckboxArgs, ClickArgs, DateArgs, FillFieldArgs, LookupArgs, PicklistArgs};
use sfpilot::ui::Ui;

use crate::ops::def::{BoxFut, OpContext, OpDef, OpOutcome};

pub struct FillOp;

impl OpDef for FillOp {
	const NAME: &'static str = "form.fill";

	type Raw = FillFieldArgs;
	type Data = ();

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			Ui::new(&*page, cx.timeouts()).fill_field(&raw.label, &raw.value).await?;
			Ok(OpOutcome::done(format!("Filled {}", raw.label)))
		})
	}
}

pub struct PicklistOp;

impl OpDef for PicklistOp {
	const NAME: &'static str = "form.picklist";

	type Raw = PicklistArgs;
	type Data = ();

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			Ui::new(&*page, cx.timeouts()).select_picklist(&raw.label, &raw.value).await?;
			Ok(OpOutcome::done(format!("Selected {} in {}", raw.value, raw.label)))
		})
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupPick {
	/// Index actually clicked; 0 when the requested one was out of range.
	pub selected_index: usize,
}

pub struct LookupOp;

impl OpDef for LookupOp {
	const NAME: &'static str = "form.lookup";

	type Raw = LookupArgs;
	type Data = LookupPick;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			let selected_index = Ui::new(&*page, cx.timeouts())
				.select_lookup(&raw.label, &raw.search, raw.index)
				.await?;
			Ok(OpOutcome::new(LookupPick { selected_index })
				.message(format!("Selected result {selected_index} for {:?} in {}", raw.search, raw.label)))
		})
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckboxState {
	pub checked: bool,
	/// False when the box already had the requested state.
	pub changed: bool,
}

pub struct CheckboxOp;

impl OpDef for CheckboxOp {
	const NAME: &'static str = "form.checkbox";

	type Raw = CheckboxArgs;
	type Data = CheckboxState;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			let changed = Ui::new(&*page, cx.timeouts()).set_checkbox(&raw.label, raw.checked).await?;
			let verb = if raw.checked { "Checked" } else { "Unchecked" };
			let message = if changed {
				format!("{verb} {}", raw.label)
			} else {
				format!("{} already {}", raw.label, verb.to_ascii_lowercase())
			};
			Ok(OpOutcome::new(CheckboxState {
				checked: raw.checked,
				changed,
			})
			.message(message))
		})
	}
}

pub struct DateOp;

impl OpDef for DateOp {
	const NAME: &'static str = "form.date";

	type Raw = DateArgs;
	type Data = ();

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			Ui::new(&*page, cx.timeouts())
				.fill_date(&raw.label, &raw.date, raw.time.as_deref())
				.await?;
			let value = match &raw.time {
				Some(time) => format!("{} {time}", raw.date),
				None => raw.date.clone(),
			};
			Ok(OpOutcome::done(format!("Set {} to {value}", raw.label)))
		})
	}
}

pub struct ClickOp;

impl OpDef for ClickOp {
	const NAME: &'static str = "form.click";

	type Raw = ClickArgs;
	type Data = ();

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			Ui::new(&*page, cx.timeouts()).click_button(&raw.label).await?;
			Ok(OpOutcome::done(format!("Clicked {}", raw.label)))
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use sfpilot::protocol::ErrorCode;

	use crate::ops::testing::Harness;

	#[tokio::test(start_paused = true)]
	async fn fill_reaches_the_labelled_input() {
		let h = Harness::new();
		let page = h.started().await;
		page.show("input[aria-label=\"Account Name\"]");

		let resp = h.call("form.fill", json!({ "label": "Account Name", "value": "Acme" })).await;
		assert!(resp.ok, "{:?}", resp.error);
		assert_eq!(resp.message.as_deref(), Some("Filled Account Name"));
		assert!(resp.data.is_none());
		assert_eq!(
			page.fills(),
			vec![("input[aria-label=\"Account Name\"] >> visible=true".to_string(), "Acme".to_string())]
		);
	}

	#[tokio::test(start_paused = true)]
	async fn click_missing_button_names_the_label() {
		let h = Harness::new();
		h.started().await;

		let resp = h.call("form.click", json!({ "label": "Submit for Approval" })).await;
		let error = resp.error.unwrap();
		assert_eq!(error.code, ErrorCode::ElementNotFound);
		assert!(error.message.contains("Submit for Approval"));
		assert!(error.suggestion.contains("page.capture"));
	}

	#[tokio::test(start_paused = true)]
	async fn lookup_without_index_is_accepted() {
		let h = Harness::new();
		h.started().await;

		// no lookup input on the page: fails on the element, not on the missing index
		let resp = h.call("form.lookup", json!({ "label": "Account Name", "search": "Acme" })).await;
		assert_eq!(resp.error.unwrap().code, ErrorCode::ElementNotFound);
	}

	#[tokio::test(start_paused = true)]
	async fn checkbox_requires_checked_flag() {
		let h = Harness::new();
		let resp = h.call("form.checkbox", json!({ "label": "Active" })).await;
		assert_eq!(resp.error.unwrap().code, ErrorCode::InvalidInput);
	}
}
