use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{Waiter, millis};
use crate::error::{Error, Result};
use crate::locate::{find_visible, first_present};
use crate::poll::Deadline;
use crate::selectors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
	Success,
	Error,
	Warning,
	Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
	pub kind: ToastKind,
	pub message: String,
}

/// Outcome of waiting for a toast. Callers decide whether no toast is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastWait {
	Shown(Toast),
	TimedOut { after: Duration },
}

impl ToastWait {
	pub fn shown(self) -> Option<Toast> {
		match self {
			ToastWait::Shown(toast) => Some(toast),
			ToastWait::TimedOut { .. } => None,
		}
	}

	/// Treats a missing toast as [`Error::Timeout`].
	pub fn require(self) -> Result<Toast> {
		match self {
			ToastWait::Shown(toast) => Ok(toast),
			ToastWait::TimedOut { after } => Err(Error::Timeout {
				condition: selectors::toast_container().concept().to_string(),
				ms: millis(after),
			}),
		}
	}
}

impl Waiter<'_> {
	/// Waits for a toast, then reads and classifies it.
	///
	/// Type markers are checked success, error, warning in that order and the
	/// first hit wins. A toast without any marker is [`ToastKind::Info`].
	pub async fn toast(&self, timeout: Duration) -> ToastWait {
		let deadline = Deadline::after(timeout);
		let container = selectors::toast_container();
		let Some(found) = find_visible(self.page, &container, &deadline, self.timeouts.element_poll()).await else {
			debug!(target = "sfpilot.wait", timeout_ms = millis(timeout), "no toast");
			return ToastWait::TimedOut { after: timeout };
		};

		let markers = [
			(ToastKind::Success, selectors::toast_success()),
			(ToastKind::Error, selectors::toast_error()),
			(ToastKind::Warning, selectors::toast_warning()),
		];
		let mut kind = ToastKind::Info;
		for (candidate, marker) in markers {
			if first_present(self.page, &marker.within(&found)).await.is_some() {
				kind = candidate;
				break;
			}
		}

		let message = self.toast_text(&found).await;
		debug!(target = "sfpilot.wait", ?kind, %message, "toast shown");
		ToastWait::Shown(Toast { kind, message })
	}

	async fn toast_text(&self, container: &str) -> String {
		for query in selectors::toast_message().within(container).queries() {
			if let Ok(Some(text)) = self.page.text_content(query).await {
				let text = text.trim();
				if !text.is_empty() {
					return text.to_string();
				}
			}
		}
		match self.page.text_content(container).await {
			Ok(Some(text)) => text.trim().to_string(),
			_ => String::new(),
		}
	}
}
