//! Org discovery and credential cache maintenance.

use serde::Serialize;
use sfpilot::credentials::OrgSummary;
use sfpilot::protocol::args::ClearCacheArgs;

use crate::ops::def::{BoxFut, NoArgs, OpContext, OpDef, OpOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct OrgList {
	pub orgs: Vec<OrgSummary>,
}

pub struct ListOp;

impl OpDef for ListOp {
	const NAME: &'static str = "org.list";

	type Raw = NoArgs;
	type Data = OrgList;

	fn execute<'a>(_raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let orgs = cx.session().credentials().list_orgs().await?;
			let message = format!("{} authorized org(s)", orgs.len());
			Ok(OpOutcome::new(OrgList { orgs }).message(message))
		})
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct Cleared {
	pub cleared: usize,
}

pub struct ClearCacheOp;

impl OpDef for ClearCacheOp {
	const NAME: &'static str = "org.clearCache";

	type Raw = ClearCacheArgs;
	type Data = Cleared;

	fn execute<'a>(raw: Self::Raw, cx: &'a OpContext) -> BoxFut<'a, sfpilot::Result<OpOutcome<Self::Data>>> {
		Box::pin(async move {
			let cleared = cx.session().credentials().clear(raw.org_alias.as_deref());
			let message = match raw.org_alias {
				Some(alias) => format!("Cleared cached credentials for {alias}"),
				None => format!("Cleared {cleared} cached org(s)"),
			};
			Ok(OpOutcome::new(Cleared { cleared }).message(message))
		})
	}
}
