use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

static FORM_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(edit|new)$").unwrap());
static RELATED_LIST_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/lightning/r/[^/]+/[^/]+/related/[^/]+/view$").unwrap());
static RECORD_PATH: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^/lightning/r/(?:[A-Za-z0-9_]+/)?[A-Za-z0-9]{15,18}/view$").unwrap());
static LIST_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/lightning/o/[A-Za-z0-9_]+/(list|home)$").unwrap());

/// Page shape inferred from the URL, used to pick a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageKind {
	/// Record create or edit form.
	Form,
	Record,
	/// Object list view, object home or a related list.
	ListView,
	Setup,
	Generic,
}

impl PageKind {
	pub fn classify(url: &str) -> PageKind {
		let path = path_of(url);
		let path = path.trim_end_matches('/');
		if FORM_PATH.is_match(path) {
			PageKind::Form
		} else if RELATED_LIST_PATH.is_match(path) {
			PageKind::ListView
		} else if RECORD_PATH.is_match(path) {
			PageKind::Record
		} else if LIST_PATH.is_match(path) {
			PageKind::ListView
		} else if path.starts_with("/lightning/setup/") {
			PageKind::Setup
		} else {
			PageKind::Generic
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			PageKind::Form => "form",
			PageKind::Record => "record",
			PageKind::ListView => "listView",
			PageKind::Setup => "setup",
			PageKind::Generic => "generic",
		}
	}
}

/// Whether `url` is a record "view" URL, as reached after a successful save.
pub fn looks_like_view(url: &str) -> bool {
	path_of(url).trim_end_matches('/').ends_with("/view")
}

fn path_of(url: &str) -> String {
	match Url::parse(url) {
		Ok(parsed) => parsed.path().to_string(),
		Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
	}
}
