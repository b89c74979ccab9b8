//! Operation registry and generated dispatch glue.

/// The registry macro: generates an `OpId` enum, `lookup_op`, `op_name`,
/// `OP_NAMES` and `run_op`.
///
/// ```rust,ignore
/// op_registry! {
///   Ping => crate::ops::page::PingOp { names: ["ping"] },
///   Navigate => crate::ops::nav::NavigateOp { names: ["navigate", "nav.goto"] },
/// }
/// ```
macro_rules! op_registry {
	(
		$(
			$id:ident => $ty:path {
				names: [ $($name:literal),+ $(,)? ]
			}
		),+ $(,)?
	) => {
		#[derive(Debug, Clone, Copy, PartialEq, Eq)]
		pub enum OpId { $($id),+ }

		pub fn lookup_op(name: &str) -> Option<OpId> {
			match name {
				$(
					$($name)|+ => Some(OpId::$id),
				)+
				_ => None,
			}
		}

		pub fn op_name(id: OpId) -> &'static str {
			match id {
				$(
					OpId::$id => <$ty as $crate::ops::def::OpDef>::NAME,
				)+
			}
		}

		/// Primary names of every registered operation.
		pub const OP_NAMES: &[&str] = &[$(<$ty as $crate::ops::def::OpDef>::NAME),+];

		/// Run an operation by `OpId`, returning a type-erased outcome.
		///
		/// This function is the *only* place that:
		/// - deserializes `Raw`
		/// - awaits `execute(...)`
		pub async fn run_op(
			id: OpId,
			input: serde_json::Value,
			cx: &$crate::ops::def::OpContext,
		) -> sfpilot::Result<$crate::ops::def::ErasedOutcome> {
			match id {
				$(
					OpId::$id => {
						type Op = $ty;

						let raw: <Op as $crate::ops::def::OpDef>::Raw = serde_json::from_value(input).map_err(|e| {
							sfpilot::Error::InvalidInput(format!("{}: {}", <Op as $crate::ops::def::OpDef>::NAME, e))
						})?;

						let outcome = <Op as $crate::ops::def::OpDef>::execute(raw, cx).await?;
						outcome.erase(<Op as $crate::ops::def::OpDef>::NAME)
					}
				)+
			}
		}
	};
}

op_registry! {
	SessionStart => crate::ops::session::StartOp { names: ["session.start"] },
	SessionClose => crate::ops::session::CloseOp { names: ["session.close"] },
	SessionStatus => crate::ops::session::StatusOp { names: ["session.status"] },
	SessionRefresh => crate::ops::session::RefreshOp { names: ["session.refresh"] },
	OrgList => crate::ops::org::ListOp { names: ["org.list"] },
	OrgClearCache => crate::ops::org::ClearCacheOp { names: ["org.clearCache"] },
	Navigate => crate::ops::nav::NavigateOp { names: ["navigate"] },
	NavObjectHome => crate::ops::nav::ObjectHomeOp { names: ["nav.objectHome"] },
	NavRecord => crate::ops::nav::RecordOp { names: ["nav.record"] },
	NavNewRecord => crate::ops::nav::NewRecordOp { names: ["nav.newRecord"] },
	NavRelatedList => crate::ops::nav::RelatedListOp { names: ["nav.relatedList"] },
	NavSetup => crate::ops::nav::SetupOp { names: ["nav.setup"] },
	NavObjectManager => crate::ops::nav::ObjectManagerOp { names: ["nav.objectManager"] },
	NavApp => crate::ops::nav::AppOp { names: ["nav.app"] },
	FormFill => crate::ops::form::FillOp { names: ["form.fill"] },
	FormPicklist => crate::ops::form::PicklistOp { names: ["form.picklist"] },
	FormLookup => crate::ops::form::LookupOp { names: ["form.lookup"] },
	FormCheckbox => crate::ops::form::CheckboxOp { names: ["form.checkbox"] },
	FormDate => crate::ops::form::DateOp { names: ["form.date"] },
	FormClick => crate::ops::form::ClickOp { names: ["form.click"] },
	RecordSave => crate::ops::record::SaveOp { names: ["record.save"] },
	RecordCancel => crate::ops::record::CancelOp { names: ["record.cancel"] },
	SetupQuickFind => crate::ops::record::QuickFindOp { names: ["setup.quickFind"] },
	Wait => crate::ops::wait::WaitOp { names: ["wait"] },
	PageCapture => crate::ops::page::CaptureOp { names: ["page.capture"] },
	PageInfo => crate::ops::page::InfoOp { names: ["page.info"] },
	Ping => crate::ops::page::PingOp { names: ["ping"] },
	Quit => crate::ops::page::QuitOp { names: ["quit"] },
}
