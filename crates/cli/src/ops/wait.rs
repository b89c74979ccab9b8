//! Runs one named readiness wait against the live page.

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use sfpilot::Error;
use sfpilot::config::Timeouts;
use sfpilot::protocol::args::WaitArgs;
use sfpilot::wait::{PageKind, Toast, Waiter};

use crate::ops::def::{BoxFut, OpContext, OpDef, OpOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
	Spinners,
	Stencils,
	App,
	Form,
	Modal,
	ModalClosed,
	Toast,
	ListView,
	RecordPage,
	SetupPage,
	Smart,
}

impl Condition {
	pub const ALL: [Condition; 11] = [
		Condition::Spinners,
		Condition::Stencils,
		Condition::App,
		Condition::Form,
		Condition::Modal,
		Condition::ModalClosed,
		Condition::Toast,
		Condition::ListView,
		Condition::RecordPage,
		Condition::SetupPage,
		Condition::Smart,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Condition::Spinners => "spinners",
			Condition::Stencils => "stencils",
			Condition::App => "app",
			Condition::Form => "form",
			Condition::Modal => "modal",
			Condition::ModalClosed => "modalClosed",
			Condition::Toast => "toast",
			Condition::ListView => "listView",
			Condition::RecordPage => "recordPage",
			Condition::SetupPage => "setupPage",
			Condition::Smart => "smart",
		}
	}

	/// Configured budget used when the request names none.
	pub fn default_timeout(self, timeouts: &Timeouts) -> Duration {
		match self {
			Condition::Spinners => timeouts.spinner(),
			Condition::Stencils => timeouts.stencil(),
			Condition::App => timeouts.navigation(),
			Condition::Form => timeouts.form(),
			Condition::Modal | Condition::ModalClosed => timeouts.modal(),
			Condition::Toast => timeouts.toast(),
			Condition::ListView | Condition::RecordPage | Condition::SetupPage | Condition::Smart => timeouts.page_ready(),
		}
	}
}

impl FromStr for Condition {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Condition::ALL.into_iter().find(|c| c.as_str() == s).ok_or_else(|| {
			let known: Vec<&str> = Condition::ALL.iter().map(|c| c.as_str()).collect();
			Error::InvalidInput(format!("unknown wait condition {s:?}; expected one of {}", known.join(", ")))
		})
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitReport {
	pub condition: &'static str,
	/// False only for the best-effort waits (spinners, stencils) that ran out of time.
	pub satisfied: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_kind: Option<PageKind>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub toast: Option<Toast>,
}

impl WaitReport {
	fn new(condition: Condition, satisfied: bool) -> Self {
		Self {
			condition: condition.as_str(),
			satisfied,
			page_kind: None,
			toast: None,
		}
	}
}

pub struct WaitOp;

impl OpDef for WaitOp {
	const NAME: &'static str = "wait";

	type Raw = WaitArgs;
	type Data = WaitReport;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let condition: Condition = raw.condition.parse()?;
			let timeout = raw
				.timeout_ms
				.map(Duration::from_millis)
				.unwrap_or_else(|| condition.default_timeout(cx.timeouts()));

			let page = cx.page().await?;
			let waiter = Waiter::new(&*page, cx.timeouts());
			let report = match condition {
				Condition::Spinners => WaitReport::new(condition, waiter.no_spinners(timeout).await.is_satisfied()),
				Condition::Stencils => WaitReport::new(condition, waiter.no_stencils(timeout).await.is_satisfied()),
				Condition::App => {
					waiter.app_ready(timeout).await?;
					WaitReport::new(condition, true)
				}
				Condition::Form => {
					waiter.form_ready(timeout).await?;
					WaitReport::new(condition, true)
				}
				Condition::Modal => {
					waiter.modal_visible(timeout).await?;
					WaitReport::new(condition, true)
				}
				Condition::ModalClosed => {
					waiter.modal_closed(timeout).await?;
					WaitReport::new(condition, true)
				}
				Condition::Toast => WaitReport {
					toast: Some(waiter.toast(timeout).await.require()?),
					..WaitReport::new(condition, true)
				},
				Condition::ListView => {
					waiter.list_view_ready(timeout).await?;
					WaitReport::new(condition, true)
				}
				Condition::RecordPage => {
					waiter.record_page_ready(timeout).await?;
					WaitReport::new(condition, true)
				}
				Condition::SetupPage => {
					waiter.setup_page_ready(timeout).await?;
					WaitReport::new(condition, true)
				}
				Condition::Smart => WaitReport {
					page_kind: Some(waiter.smart(timeout).await?),
					..WaitReport::new(condition, true)
				},
			};

			let message = if report.satisfied {
				format!("{} ready", condition.as_str())
			} else {
				format!("{} still present after {}ms; continuing", condition.as_str(), timeout.as_millis())
			};
			Ok(OpOutcome::new(report).message(message))
		})
	}
}
