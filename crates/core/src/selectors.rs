//! Selector registry: ordered query candidates for Lightning UI concepts.
//!
//! Lightning renders one semantic field through several component families
//! (record form, quick-create modal, inline edit, Aura fallbacks). Every
//! concept is therefore a list of Playwright selectors tried in order.
//! Semantic attributes, ARIA labels and framework tag names come first;
//! generated class names and loose text matches come last.
//!
//! Everything here is a pure function of its inputs.

/// Ordered alternatives for one UI concept, most stable first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
	concept: String,
	queries: Vec<String>,
}

impl Candidates {
	pub fn new<I, S>(concept: impl Into<String>, queries: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			concept: concept.into(),
			queries: queries.into_iter().map(Into::into).collect(),
		}
	}

	/// Human-readable name used in errors and logs ("picklist Stage").
	pub fn concept(&self) -> &str {
		&self.concept
	}

	pub fn queries(&self) -> &[String] {
		&self.queries
	}

	/// Each candidate scoped inside `scope`.
	pub fn within(&self, scope: &str) -> Candidates {
		Candidates {
			concept: self.concept.clone(),
			queries: self.queries.iter().map(|q| format!("{scope} >> {q}")).collect(),
		}
	}
}

/// Restricts a selector to visible matches.
pub fn visible(query: &str) -> String {
	format!("{query} >> visible=true")
}

/// Escapes a value for use inside a double-quoted selector string.
pub fn quote(value: &str) -> String {
	let mut out = String::with_capacity(value.len() + 2);
	out.push('"');
	for c in value.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'"' => out.push_str("\\\""),
			'\n' | '\r' => out.push(' '),
			_ => out.push(c),
		}
	}
	out.push('"');
	out
}

// Page-state markers

pub fn spinners() -> Candidates {
	Candidates::new(
		"loading spinner",
		[
			"lightning-spinner",
			"div.slds-spinner_container",
			"div.slds-spinner",
			"div.forceInlineSpinner",
			"div.loadingSpinner",
		],
	)
}

pub fn stencils() -> Candidates {
	Candidates::new(
		"stencil placeholder",
		[
			"force-placeholder2",
			"records-placeholder",
			"div.forcePlaceholder",
			"div.slds-skeleton",
			"div.stencil",
		],
	)
}

/// Structural markers of the rendered Lightning shell.
pub fn app_shell() -> Candidates {
	Candidates::new(
		"application shell",
		[
			"one-appnav",
			"one-app-nav-bar",
			"header#oneHeader",
			"div.slds-global-header",
			"div.oneGlobalNav",
			"div.desktop.container.oneOne",
		],
	)
}

pub fn form_containers() -> Candidates {
	Candidates::new(
		"record form",
		[
			"records-record-layout-event-broker",
			"records-lwc-detail-panel",
			"lightning-record-edit-form",
			"records-record-edit-form",
			"force-record-layout-section",
			"div.forceRecordLayout",
			"div.slds-form",
		],
	)
}

pub fn list_view() -> Candidates {
	Candidates::new(
		"list view",
		[
			"lst-list-view-manager",
			"lst-object-home",
			"div.forceListViewManager",
			"lightning-datatable",
			"table[role=\"grid\"]",
		],
	)
}

pub fn record_page() -> Candidates {
	Candidates::new(
		"record page",
		[
			"records-lwc-highlights-panel",
			"records-highlights2",
			"flexipage-record-home-template-desktop2",
			"force-record-layout-block",
			"div.forceHighlightsPanel",
		],
	)
}

pub fn setup_page() -> Candidates {
	Candidates::new(
		"setup page",
		[
			"one-setup-app-container",
			"div.setupcontent",
			"div.onesetupSetupLayout",
			"iframe[title*=\"Salesforce - \"]",
			"div.setup-tree",
		],
	)
}

// Dialogs and notifications

pub fn modal() -> Candidates {
	Candidates::new(
		"modal dialog",
		[
			"section[role=\"dialog\"]",
			"div[role=\"dialog\"]",
			"div.uiModal",
			"section.slds-modal",
		],
	)
}

pub fn toast_container() -> Candidates {
	Candidates::new(
		"toast",
		[
			"div.forceToastMessage",
			"div.slds-notify_toast",
			"div.toastContainer div.slds-notify",
		],
	)
}

/// Message text inside a toast container.
pub fn toast_message() -> Candidates {
	Candidates::new(
		"toast message",
		["span.toastMessage", "div.toastContent", "div.slds-notify__content", "h2"],
	)
}

/// Type markers checked inside the toast, in classification order.
pub fn toast_success() -> Candidates {
	Candidates::new(
		"success toast",
		[".slds-theme_success", ".slds-theme--success", "[data-key=\"success\"]"],
	)
}

pub fn toast_error() -> Candidates {
	Candidates::new(
		"error toast",
		[".slds-theme_error", ".slds-theme--error", "[data-key=\"error\"]"],
	)
}

pub fn toast_warning() -> Candidates {
	Candidates::new(
		"warning toast",
		[".slds-theme_warning", ".slds-theme--warning", "[data-key=\"warning\"]"],
	)
}

// Buttons

pub fn button(label: &str) -> Candidates {
	let q = quote(label);
	Candidates::new(
		format!("button {label}"),
		[
			format!("button[name={q}]"),
			format!("button[title={q}]"),
			format!("button[aria-label={q}]"),
			format!("lightning-button >> button:text-is({q})"),
			format!("a[role=\"button\"][title={q}]"),
			format!("button:text-is({q})"),
			format!("button:has-text({q})"),
		],
	)
}

pub fn save_button() -> Candidates {
	Candidates::new(
		"Save button",
		[
			"records-form-footer button[name=\"SaveEdit\"]",
			"button[name=\"SaveEdit\"]",
			"button[title=\"Save\"]",
			"lightning-button >> button:text-is(\"Save\")",
			"button:text-is(\"Save\")",
		],
	)
}

pub fn cancel_button() -> Candidates {
	Candidates::new(
		"Cancel button",
		[
			"records-form-footer button[name=\"CancelEdit\"]",
			"button[name=\"CancelEdit\"]",
			"button[title=\"Cancel\"]",
			"lightning-button >> button:text-is(\"Cancel\")",
			"button:text-is(\"Cancel\")",
		],
	)
}

// Form fields

/// Structural container of a labelled field; used to scope inner inputs.
pub fn field_scope(label: &str) -> Candidates {
	let q = quote(label);
	Candidates::new(
		format!("field {label}"),
		[
			format!("lightning-input:has(label:text-is({q}))"),
			format!("lightning-input:has(legend:text-is({q}))"),
			format!("lightning-textarea:has(label:text-is({q}))"),
			format!("records-record-layout-item[field-label={q}]"),
			format!("div.slds-form-element:has(label:text-is({q}))"),
			format!("div.slds-form-element:has(legend:text-is({q}))"),
			format!("div.uiInput:has(label:has-text({q}))"),
		],
	)
}

pub fn text_input(label: &str) -> Candidates {
	let q = quote(label);
	Candidates::new(
		format!("field {label}"),
		[
			format!("lightning-input:has(label:text-is({q})) input"),
			format!("lightning-textarea:has(label:text-is({q})) textarea"),
			format!("input[aria-label={q}]"),
			format!("textarea[aria-label={q}]"),
			format!("records-record-layout-item[field-label={q}] input"),
			format!("div.slds-form-element:has(label:text-is({q})) input"),
			format!("div.uiInput:has(label:has-text({q})) input"),
			format!("div.uiInput:has(label:has-text({q})) textarea"),
		],
	)
}

/// Control that opens a picklist.
pub fn picklist_trigger(label: &str) -> Candidates {
	let q = quote(label);
	Candidates::new(
		format!("picklist {label}"),
		[
			format!("lightning-combobox:has(label:text-is({q})) button"),
			format!("lightning-picklist:has(label:text-is({q})) button"),
			format!("button[role=\"combobox\"][aria-label={q}]"),
			format!("button[aria-label*={q}]"),
			format!("div.uiInput:has(span:text-is({q})) a.select"),
			format!("lightning-combobox:has-text({q}) button"),
		],
	)
}

/// The open options list of a picklist or combobox.
pub fn picklist_options() -> Candidates {
	Candidates::new(
		"picklist options",
		[
			"lightning-base-combobox div[role=\"listbox\"]",
			"div[role=\"listbox\"]",
			"div.select-options",
			"ul.uiMenuList",
		],
	)
}

/// Option entries for `value`: exact matches first, then closest text.
pub fn picklist_option(value: &str) -> Candidates {
	let q = quote(value);
	Candidates::new(
		format!("option {value}"),
		[
			format!("lightning-base-combobox-item[data-value={q}]"),
			format!("[role=\"option\"][data-value={q}]"),
			format!("[role=\"option\"][title={q}]"),
			format!("[role=\"option\"]:text-is({q})"),
			format!("div.select-options a[title={q}]"),
			format!("[role=\"option\"]:has-text({q})"),
			format!("div.select-options a:has-text({q})"),
		],
	)
}

pub fn lookup_input(label: &str) -> Candidates {
	let q = quote(label);
	Candidates::new(
		format!("lookup {label}"),
		[
			format!("lightning-lookup:has(label:text-is({q})) input"),
			format!("records-record-layout-lookup:has(label:text-is({q})) input"),
			format!("lightning-grouped-combobox:has(label:text-is({q})) input"),
			format!("input[role=\"combobox\"][aria-label={q}]"),
			format!("div.uiInput:has(label:has-text({q})) input.uiAutocomplete"),
			format!("div.slds-form-element:has(label:text-is({q})) input[role=\"combobox\"]"),
		],
	)
}

/// Record results in an open lookup dropdown, excluding search/new actions.
pub fn lookup_results() -> Candidates {
	Candidates::new(
		"lookup results",
		[
			"lightning-base-combobox-item[data-value]:not([data-value^=\"action\"])",
			"div[role=\"listbox\"] [role=\"option\"]:not([data-value^=\"action\"])",
			"div.lookup__menu li.lookup__item.default",
			"ul.lookup__list li[role=\"presentation\"] a",
		],
	)
}

pub fn checkbox(label: &str) -> Candidates {
	let q = quote(label);
	Candidates::new(
		format!("checkbox {label}"),
		[
			format!("lightning-input:has(label:has-text({q})) input[type=\"checkbox\"]"),
			format!("input[type=\"checkbox\"][aria-label={q}]"),
			format!("input[type=\"checkbox\"][name={q}]"),
			format!("records-record-layout-item[field-label={q}] input[type=\"checkbox\"]"),
			format!("div.uiInput:has(label:has-text({q})) input[type=\"checkbox\"]"),
		],
	)
}

/// Date input relative to a field scope.
pub fn date_part() -> Candidates {
	Candidates::new(
		"date input",
		[
			"lightning-datepicker input",
			"input[type=\"date\"]",
			"div.uiInputDate input",
			"input[name$=\"date\" i]",
		],
	)
}

/// Time input relative to a field scope.
pub fn time_part() -> Candidates {
	Candidates::new(
		"time input",
		[
			"lightning-timepicker input",
			"input[type=\"time\"]",
			"div.uiInputTime input",
			"input[name$=\"time\" i]",
		],
	)
}

// App launcher

pub fn app_launcher_button() -> Candidates {
	Candidates::new(
		"App Launcher",
		[
			"one-app-launcher-header button",
			"button[title=\"App Launcher\"]",
			"div.appLauncher button",
			"div.slds-icon-waffle",
		],
	)
}

pub fn app_launcher_panel() -> Candidates {
	Candidates::new(
		"App Launcher panel",
		[
			"one-app-launcher-modal",
			"one-app-launcher-menu",
			"div.appLauncherMenu",
			"section[role=\"dialog\"]:has-text(\"App Launcher\")",
		],
	)
}

pub fn app_launcher_search() -> Candidates {
	Candidates::new(
		"App Launcher search",
		[
			"one-app-launcher-search-bar input",
			"input[placeholder=\"Search apps and items...\"]",
			"input[placeholder*=\"Search apps\"]",
			"section[role=\"dialog\"] input[type=\"search\"]",
			"div.appLauncherMenu input",
		],
	)
}

pub fn app_launcher_entry(app: &str) -> Candidates {
	let q = quote(app);
	Candidates::new(
		format!("app {app}"),
		[
			format!("one-app-launcher-menu-item a[data-label={q}]"),
			format!("a[data-label={q}]"),
			format!("one-app-launcher-app-tile[data-name={q}] a"),
			format!("one-app-launcher-menu-item:has(b:text-is({q})) a"),
			format!("one-app-launcher-menu-item:has-text({q}) a"),
			format!("one-app-launcher-app-tile:has-text({q})"),
		],
	)
}

// Setup

pub fn quick_find_input() -> Candidates {
	Candidates::new(
		"Quick Find",
		[
			"input.filter-box",
			"input[placeholder=\"Quick Find\"]",
			"input[placeholder*=\"Quick Find\"]",
			"div.quickFindInput input",
		],
	)
}

pub fn quick_find_result(entry: &str) -> Candidates {
	let q = quote(entry);
	Candidates::new(
		format!("Quick Find result {entry}"),
		[
			format!("div.tree-nav a:text-is({q})"),
			format!("a.tree-node-link:text-is({q})"),
			format!("div.setup-tree a:text-is({q})"),
			format!("div.tree-nav a:has-text({q})"),
			format!("div.setup-tree a:has-text({q})"),
		],
	)
}
