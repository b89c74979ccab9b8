//! Operation plumbing: the execute contract, outcome types and shared context.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sfpilot::Result;
use sfpilot::SessionCoordinator;
use sfpilot::config::{BrowserSettings, Timeouts};
use sfpilot::engine::Page;

/// Everything an operation may touch. One per process.
pub struct OpContext {
	session: SessionCoordinator,
	browser: BrowserSettings,
}

impl OpContext {
	pub fn new(session: SessionCoordinator, browser: BrowserSettings) -> Self {
		Self { session, browser }
	}

	pub fn session(&self) -> &SessionCoordinator {
		&self.session
	}

	/// Launch defaults that `session.start` arguments override.
	pub fn browser(&self) -> &BrowserSettings {
		&self.browser
	}

	pub fn timeouts(&self) -> &Timeouts {
		self.session.timeouts()
	}

	/// The live page, or `SESSION_NOT_STARTED` / `SESSION_EXPIRED`.
	pub async fn page(&self) -> Result<Arc<dyn Page>> {
		self.session.ensure().await
	}
}

/// Input record for operations that take none. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoArgs {}

/// Typed result of one operation.
#[derive(Debug, Clone)]
pub struct OpOutcome<T> {
	pub message: Option<String>,
	pub data: T,
}

impl<T> OpOutcome<T> {
	pub fn new(data: T) -> Self {
		Self { message: None, data }
	}

	pub fn message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}
}

impl OpOutcome<()> {
	/// Outcome with only a human-readable summary.
	pub fn done(message: impl Into<String>) -> Self {
		Self::new(()).message(message)
	}
}

/// Type-erased outcome for the dispatcher.
#[derive(Debug, Clone)]
pub struct ErasedOutcome {
	pub op: &'static str,
	pub message: Option<String>,
	pub data: Option<serde_json::Value>,
}

impl<T: Serialize> OpOutcome<T> {
	pub fn erase(self, op: &'static str) -> Result<ErasedOutcome> {
		let data = match serde_json::to_value(self.data)? {
			serde_json::Value::Null => None,
			value => Some(value),
		};
		Ok(ErasedOutcome {
			op,
			message: self.message,
			data,
		})
	}
}

/// Boxing alias: stable async in trait without `async_trait`.
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Canonical operation trait. Each operation is
/// `pub struct XxxOp; impl OpDef for XxxOp { ... }`.
pub trait OpDef: 'static {
	const NAME: &'static str;

	type Raw: DeserializeOwned;
	type Data: Serialize;

	/// Execute the operation. **Must not print**; the caller writes the response.
	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, Result<OpOutcome<Self::Data>>>;
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn unit_data_erases_to_none() {
		let erased = OpOutcome::done("Filled Name").erase("form.fill").unwrap();
		assert_eq!(erased.op, "form.fill");
		assert_eq!(erased.message.as_deref(), Some("Filled Name"));
		assert!(erased.data.is_none());
	}

	#[test]
	fn typed_data_erases_to_json() {
		#[derive(Serialize)]
		#[serde(rename_all = "camelCase")]
		struct Picked {
			selected_index: usize,
		}
		let erased = OpOutcome::new(Picked { selected_index: 2 }).erase("form.lookup").unwrap();
		assert_eq!(erased.data, Some(json!({ "selectedIndex": 2 })));
		assert!(erased.message.is_none());
	}

	#[test]
	fn no_args_accepts_any_object() {
		let _: NoArgs = serde_json::from_value(json!({})).unwrap();
		let _: NoArgs = serde_json::from_value(json!({ "ignored": true })).unwrap();
	}
}
