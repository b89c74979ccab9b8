//! Record edit lifecycle and Setup Quick Find.

use std::time::Duration;

use serde::Serialize;
use sfpilot::protocol::args::{QuickFindArgs, QuickFindOpen, SaveArgs};
use sfpilot::ui::{SaveOutcome, Ui};
use sfpilot::wait::ToastKind;

use crate::ops::def::{BoxFut, NoArgs, OpContext, OpDef, OpOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
	/// False only when an error toast answered the save.
	pub saved: bool,
	#[serde(flatten)]
	pub outcome: SaveOutcome,
}

impl SaveReport {
	fn new(outcome: SaveOutcome) -> Self {
		let saved = !matches!(&outcome, SaveOutcome::Toast { toast } if toast.kind == ToastKind::Error);
		Self { saved, outcome }
	}

	fn message(&self) -> String {
		match &self.outcome {
			SaveOutcome::Toast { toast } if !self.saved => format!("Save rejected: {}", toast.message),
			outcome => outcome.message(),
		}
	}
}

/// Clicks Save. An unconfirmed save is still a success; the payload says
/// how (or whether) it was confirmed.
pub struct SaveOp;

impl OpDef for SaveOp {
	const NAME: &'static str = "record.save";

	type Raw = SaveArgs;
	type Data = SaveReport;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			let outcome = Ui::new(&*page, cx.timeouts())
				.save_record(raw.timeout_ms.map(Duration::from_millis))
				.await?;
			let report = SaveReport::new(outcome);
			let message = report.message();
			Ok(OpOutcome::new(report).message(message))
		})
	}
}

pub struct CancelOp;

impl OpDef for CancelOp {
	const NAME: &'static str = "record.cancel";

	type Raw = NoArgs;
	type Data = ();

	fn execute<'a>(_raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			Ui::new(&*page, cx.timeouts()).cancel_edit().await?;
			Ok(OpOutcome::done("Edit cancelled"))
		})
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickFindResult {
	pub term: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub opened: Option<String>,
}

pub struct QuickFindOp;

impl OpDef for QuickFindOp {
	const NAME: &'static str = "setup.quickFind";

	type Raw = QuickFindArgs;
	type Data = QuickFindResult;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let opened = match raw.open {
				Some(QuickFindOpen::Term(true)) => Some(raw.term.clone()),
				Some(QuickFindOpen::Entry(entry)) => Some(entry),
				Some(QuickFindOpen::Term(false)) | None => None,
			};

			let page = cx.page().await?;
			Ui::new(&*page, cx.timeouts()).quick_find(&raw.term, opened.as_deref()).await?;

			let message = match &opened {
				Some(entry) => format!("Opened {entry} from Quick Find"),
				None => format!("Searched Quick Find for {}", raw.term),
			};
			Ok(OpOutcome::new(QuickFindResult { term: raw.term, opened }).message(message))
		})
	}
}
