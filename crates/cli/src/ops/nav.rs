//! Navigation operations: raw paths, URL-builder targets and the App Launcher.

use sfpilot::protocol::args::{
	NavigateArgs, NewRecordArgs, ObjectHomeArgs, ObjectManagerArgs, OpenAppArgs, RecordArgs, RelatedListArgs, SetupArgs,
};
use sfpilot::session::Navigation;
use sfpilot::ui::Ui;
use sfpilot::url;
use sfpilot::wait::PageKind;
use tracing::info;

use crate::ops::def::{BoxFut, OpContext, OpDef, OpOutcome};

async fn go(cx: &OpContext, path: String) -> sfpilot::Result<OpOutcome<Navigation>> {
	info!(target = "sfpilot.session", %path, "navigate");
	let nav = cx.session().navigate(&path).await?;
	let message = format!("Navigated to {} ({})", nav.url, nav.page_kind.as_str());
	Ok(OpOutcome::new(nav).message(message))
}

pub struct NavigateOp;

impl OpDef for NavigateOp {
	const NAME: &'static str = "navigate";

	type Raw = NavigateArgs;
	type Data = Navigation;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(go(cx, raw.path))
	}
}

pub struct ObjectHomeOp;

impl OpDef for ObjectHomeOp {
	const NAME: &'static str = "nav.objectHome";

	type Raw = ObjectHomeArgs;
	type Data = Navigation;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(go(cx, url::object_list(&raw.object_name, raw.filter.as_deref())))
	}
}

pub struct RecordOp;

impl OpDef for RecordOp {
	const NAME: &'static str = "nav.record";

	type Raw = RecordArgs;
	type Data = Navigation;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(go(cx, url::record(&raw.record_id, raw.object_name.as_deref(), raw.mode)))
	}
}

pub struct NewRecordOp;

impl OpDef for NewRecordOp {
	const NAME: &'static str = "nav.newRecord";

	type Raw = NewRecordArgs;
	type Data = Navigation;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(go(cx, url::new_record(&raw.object_name, raw.record_type_id.as_deref())))
	}
}

pub struct RelatedListOp;

impl OpDef for RelatedListOp {
	const NAME: &'static str = "nav.relatedList";

	type Raw = RelatedListArgs;
	type Data = Navigation;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(go(cx, url::related_list(&raw.object_name, &raw.record_id, &raw.relationship)))
	}
}

pub struct SetupOp;

impl OpDef for SetupOp {
	const NAME: &'static str = "nav.setup";

	type Raw = SetupArgs;
	type Data = Navigation;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(go(cx, url::setup(raw.section.as_deref())))
	}
}

pub struct ObjectManagerOp;

impl OpDef for ObjectManagerOp {
	const NAME: &'static str = "nav.objectManager";

	type Raw = ObjectManagerArgs;
	type Data = Navigation;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(go(cx, url::object_manager(&raw.object_name, raw.section.as_deref())))
	}
}

/// Opens an app through the App Launcher rather than by URL, so apps are
/// addressed by the label users see.
pub struct AppOp;

impl OpDef for AppOp {
	const NAME: &'static str = "nav.app";

	type Raw = OpenAppArgs;
	type Data = Navigation;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let page = cx.page().await?;
			info!(target = "sfpilot.ui", app = %raw.app_name, "open app");
			Ui::new(&*page, cx.timeouts()).open_app(&raw.app_name).await?;
			let url = page.url().await?;
			let nav = Navigation {
				page_kind: PageKind::classify(&url),
				url,
			};
			Ok(OpOutcome::new(nav).message(format!("Opened {}", raw.app_name)))
		})
	}
}
