//! Lightning URL builder.
//!
//! Pure functions from navigation targets to in-app paths, plus
//! [`UrlBuilder`] which resolves them against an org's instance URL.

use sfpilot_protocol::args::RecordMode;
use url::Url;
use url::form_urlencoded::byte_serialize;

use crate::error::{Error, Result};

pub const LIGHTNING_HOME: &str = "/lightning/page/home";
pub const SETUP_HOME: &str = "/lightning/setup/SetupOneHome/home";

fn encode(value: &str) -> String {
	byte_serialize(value.as_bytes()).collect()
}

/// `/lightning/o/{object}/list`
pub fn object_home(object: &str) -> String {
	format!("/lightning/o/{object}/list")
}

/// Object list view, optionally a named filter (`Recent`, `AllAccounts`, ...).
pub fn object_list(object: &str, filter: Option<&str>) -> String {
	match filter {
		Some(filter) => format!("{}?filterName={}", object_home(object), encode(filter)),
		None => object_home(object),
	}
}

pub fn new_record(object: &str, record_type_id: Option<&str>) -> String {
	match record_type_id {
		Some(id) => format!("/lightning/o/{object}/new?recordTypeId={}", encode(id)),
		None => format!("/lightning/o/{object}/new"),
	}
}

/// Record page. Without an object name Lightning resolves the type from the id prefix.
pub fn record(record_id: &str, object: Option<&str>, mode: RecordMode) -> String {
	let mode = match mode {
		RecordMode::View => "view",
		RecordMode::Edit => "edit",
	};
	match object {
		Some(object) => format!("/lightning/r/{object}/{record_id}/{mode}"),
		None => format!("/lightning/r/{record_id}/{mode}"),
	}
}

pub fn related_list(object: &str, record_id: &str, relationship: &str) -> String {
	format!("/lightning/r/{object}/{record_id}/related/{relationship}/view")
}

/// Setup home, or `/lightning/setup/{section}/home`.
pub fn setup(section: Option<&str>) -> String {
	match section {
		Some(section) => format!("/lightning/setup/{section}/home"),
		None => SETUP_HOME.to_string(),
	}
}

/// `/lightning/setup/ObjectManager/{object}/{Section}/view`, with friendly
/// section names mapped to their URL segment. Defaults to `Details`.
pub fn object_manager(object: &str, section: Option<&str>) -> String {
	let section = section.map_or("Details", object_manager_section);
	format!("/lightning/setup/ObjectManager/{object}/{section}/view")
}

/// Maps a tab name as shown in Object Manager to its URL segment. Unknown
/// names pass through unchanged.
pub fn object_manager_section(name: &str) -> &str {
	let key: String = name
		.chars()
		.filter(|c| c.is_ascii_alphanumeric())
		.map(|c| c.to_ascii_lowercase())
		.collect();
	match key.as_str() {
		"details" => "Details",
		"fields" | "fieldsrelationships" | "fieldsandrelationships" => "FieldsAndRelationships",
		"layouts" | "pagelayouts" => "PageLayouts",
		"lightningpages" | "recordpages" | "lightningrecordpages" => "LightningPages",
		"buttons" | "actions" | "buttonslinksandactions" | "buttonslinksactions" => "ButtonsLinksActions",
		"compactlayouts" => "CompactLayouts",
		"fieldsets" => "FieldSets",
		"recordtypes" => "RecordTypes",
		"relatedlookupfilters" | "lookupfilters" => "RelatedLookupFilters",
		"searchlayouts" => "SearchLayouts",
		"triggers" | "apextriggers" => "ApexTriggers",
		"validationrules" | "validation" => "ValidationRules",
		"limits" => "Limits",
		_ => name,
	}
}

/// Resolves in-app paths against an org's instance URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
	base: Url,
}

impl UrlBuilder {
	pub fn new(instance_url: &str) -> Result<Self> {
		let base = Url::parse(instance_url).map_err(|e| Error::InvalidInput(format!("instance url {instance_url:?}: {e}")))?;
		if base.cannot_be_a_base() {
			return Err(Error::InvalidInput(format!("instance url {instance_url:?} is not a base url")));
		}
		Ok(Self { base })
	}

	pub fn base(&self) -> &str {
		self.base.as_str().trim_end_matches('/')
	}

	/// Absolute URLs pass through; anything else is joined to the instance root.
	pub fn resolve(&self, path: &str) -> Result<String> {
		if let Ok(absolute) = Url::parse(path) {
			if absolute.has_host() {
				return Ok(absolute.into());
			}
		}
		let path = if path.starts_with('/') { path.to_string() } else { format!("/{path}") };
		self.base
			.join(&path)
			.map(Into::into)
			.map_err(|e| Error::InvalidInput(format!("path {path:?}: {e}")))
	}
}
