//! Org credentials from the Salesforce `sf` CLI.
//!
//! Every call runs `sf ... --json` and parses its envelope:
//!
//! ```json
//! {"status": 0, "result": {...}}
//! {"status": 1, "name": "NamedOrgNotFoundError", "message": "No authorization information found for dev."}
//! ```
//!
//! Access tokens are never logged.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sfpilot::credentials::{CredentialSource, OrgInfo, OrgSummary};
use sfpilot::{Error, Result};
use tokio::process::Command;
use tracing::debug;

const CANDIDATE_BINARIES: [&str; 2] = ["sf", "sfdx"];

/// Error names and message fragments the CLI uses for an unknown alias/username.
const ORG_NOT_FOUND_NAMES: [&str; 4] = [
	"NamedOrgNotFoundError",
	"NamedOrgNotFound",
	"NoOrgFound",
	"NoAuthInfoFound",
];
const ORG_NOT_FOUND_MESSAGES: [&str; 3] = [
	"no authorization information found",
	"no org configuration found",
	"no authinfo found",
];

#[derive(Debug, Deserialize)]
struct Envelope {
	#[serde(default)]
	status: i64,
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisplayResult {
	id: String,
	access_token: String,
	instance_url: String,
	username: String,
	#[serde(default)]
	alias: Option<String>,
	#[serde(default)]
	connected_status: Option<String>,
	#[serde(default)]
	status: Option<String>,
	#[serde(default)]
	api_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenResult {
	url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListResult {
	non_scratch_orgs: Vec<ListedOrg>,
	scratch_orgs: Vec<ListedOrg>,
	sandboxes: Vec<ListedOrg>,
	dev_hubs: Vec<ListedOrg>,
	other: Vec<ListedOrg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedOrg {
	username: String,
	#[serde(default)]
	alias: Option<String>,
	#[serde(default)]
	org_id: Option<String>,
	#[serde(default)]
	connected_status: Option<String>,
	#[serde(default)]
	status: Option<String>,
}

impl ListedOrg {
	fn is_active(&self) -> bool {
		self.connected_status.as_deref() == Some("Connected") || self.status.as_deref() == Some("Active")
	}
}

/// [`CredentialSource`] backed by the `sf` executable.
#[derive(Debug, Clone)]
pub struct SfCli {
	bin: Option<PathBuf>,
}

impl SfCli {
	/// `bin` pins the executable; otherwise `sf` then `sfdx` are looked up on
	/// `PATH` at call time.
	pub fn new(bin: Option<PathBuf>) -> Self {
		Self { bin }
	}

	fn binary(&self) -> Result<PathBuf> {
		if let Some(bin) = &self.bin {
			return Ok(bin.clone());
		}
		CANDIDATE_BINARIES
			.iter()
			.find_map(|name| which::which(name).ok())
			.ok_or_else(|| Error::CredentialSource("Salesforce CLI not found on PATH (tried sf, sfdx); set SFPILOT_SF_BIN".into()))
	}

	/// Runs the CLI with `--json` and returns raw stdout.
	async fn run(&self, args: &[&str]) -> Result<String> {
		let bin = self.binary()?;
		debug!(target = "sfpilot.credentials", bin = %bin.display(), command = %args.join(" "), "running sf");

		let output = Command::new(&bin)
			.args(args)
			.arg("--json")
			.env("SF_AUTOUPDATE_DISABLE", "true")
			.stdin(Stdio::null())
			.kill_on_drop(true)
			.output()
			.await
			.map_err(|e| Error::CredentialSource(format!("failed to run {}: {e}", bin.display())))?;

		let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
		if stdout.trim().is_empty() {
			let stderr = String::from_utf8_lossy(&output.stderr);
			return Err(Error::CredentialSource(format!(
				"{} exited with {} and no JSON output: {}",
				bin.display(),
				output.status,
				stderr.trim()
			)));
		}
		Ok(stdout)
	}
}

#[async_trait]
impl CredentialSource for SfCli {
	async fn org_info(&self, alias: &str) -> Result<OrgInfo> {
		let stdout = self.run(&["org", "display", "--target-org", alias]).await?;
		let info = parse_org_display(alias, &stdout)?;
		debug!(
			target = "sfpilot.credentials",
			alias,
			instance = %info.instance_url,
			username = %info.username,
			"org display"
		);
		Ok(info)
	}

	async fn entry_url(&self, alias: &str, path: Option<&str>) -> Result<String> {
		let mut args = vec!["org", "open", "--target-org", alias, "--url-only"];
		if let Some(path) = path {
			args.extend(["--path", path]);
		}
		let stdout = self.run(&args).await?;
		parse_open(alias, &stdout)
	}

	async fn list_orgs(&self) -> Result<Vec<OrgSummary>> {
		let stdout = self.run(&["org", "list"]).await?;
		parse_org_list(&stdout)
	}
}

/// Unwraps a success envelope into its typed `result`.
fn unwrap_result<T: DeserializeOwned>(alias: Option<&str>, stdout: &str) -> Result<T> {
	let envelope: Envelope = serde_json::from_str(stdout.trim())
		.map_err(|e| Error::CredentialSource(format!("unreadable Salesforce CLI output: {e}")))?;

	if envelope.status != 0 {
		return Err(classify_failure(alias, &envelope));
	}

	let result = envelope
		.result
		.ok_or_else(|| Error::CredentialSource("Salesforce CLI reported success without a result".into()))?;
	serde_json::from_value(result).map_err(|e| Error::CredentialSource(format!("unexpected Salesforce CLI result: {e}")))
}

fn classify_failure(alias: Option<&str>, envelope: &Envelope) -> Error {
	let name = envelope.name.as_deref().unwrap_or_default();
	let message = envelope.message.clone().unwrap_or_else(|| format!("status {}", envelope.status));

	let Some(alias) = alias else {
		return Error::CredentialSource(message);
	};

	let lower = message.to_ascii_lowercase();
	let missing = ORG_NOT_FOUND_NAMES.iter().any(|n| name.eq_ignore_ascii_case(n))
		|| ORG_NOT_FOUND_MESSAGES.iter().any(|m| lower.contains(m));
	if missing {
		Error::OrgNotFound { alias: alias.to_string() }
	} else {
		Error::AuthenticationFailed {
			alias: alias.to_string(),
			message,
		}
	}
}

pub(crate) fn parse_org_display(alias: &str, stdout: &str) -> Result<OrgInfo> {
	let display: DisplayResult = unwrap_result(Some(alias), stdout)?;
	Ok(OrgInfo {
		alias: display.alias.or_else(|| Some(alias.to_string())),
		org_id: display.id,
		access_token: display.access_token,
		instance_url: display.instance_url,
		username: display.username,
		status: display.connected_status.or(display.status),
		api_version: display.api_version,
	})
}

pub(crate) fn parse_open(alias: &str, stdout: &str) -> Result<String> {
	let open: OpenResult = unwrap_result(Some(alias), stdout)?;
	url::Url::parse(&open.url).map_err(|e| Error::AuthenticationFailed {
		alias: alias.to_string(),
		message: format!("entry url is not a valid url: {e}"),
	})?;
	Ok(open.url)
}

/// Flattens every org group, keeping the first entry per username.
pub(crate) fn parse_org_list(stdout: &str) -> Result<Vec<OrgSummary>> {
	let list: ListResult = unwrap_result(None, stdout)?;
	let mut orgs: Vec<OrgSummary> = Vec::new();
	let groups = [list.non_scratch_orgs, list.sandboxes, list.dev_hubs, list.scratch_orgs, list.other];
	for org in groups.into_iter().flatten() {
		if orgs.iter().any(|o| o.username == org.username) {
			continue;
		}
		orgs.push(OrgSummary {
			is_active: org.is_active(),
			alias: org.alias,
			username: org.username,
			org_id: org.org_id,
		});
	}
	Ok(orgs)
}

#[cfg(test)]
mod tests {
	use sfpilot::protocol::ErrorCode;

	use super::*;

	const DISPLAY_OK: &str = r#"{
		"status": 0,
		"result": {
			"id": "00D5g000004XyZaEAK",
			"apiVersion": "62.0",
			"accessToken": "00D5g000004XyZa!AQ0AQ.secret",
			"instanceUrl": "https://acme.my.salesforce.com",
			"username": "admin@acme.example",
			"clientId": "PlatformCLI",
			"connectedStatus": "Connected",
			"alias": "acme"
		},
		"warnings": []
	}"#;

	#[test]
	fn display_maps_to_org_info() {
		let info = parse_org_display("acme", DISPLAY_OK).unwrap();
		assert_eq!(info.org_id, "00D5g000004XyZaEAK");
		assert_eq!(info.instance_url, "https://acme.my.salesforce.com");
		assert_eq!(info.username, "admin@acme.example");
		assert_eq!(info.status.as_deref(), Some("Connected"));
		assert_eq!(info.api_version.as_deref(), Some("62.0"));
		assert!(!format!("{info:?}").contains("secret"));
	}

	#[test]
	fn display_without_alias_keeps_requested_name() {
		let stdout = r#"{"status":0,"result":{"id":"00D000000000001","accessToken":"t","instanceUrl":"https://x.my.salesforce.com","username":"u@x.example"}}"#;
		let info = parse_org_display("u@x.example", stdout).unwrap();
		assert_eq!(info.alias.as_deref(), Some("u@x.example"));
		assert!(info.status.is_none());
	}

	#[test]
	fn unknown_alias_is_org_not_found() {
		let stdout = r#"{"status":1,"name":"NamedOrgNotFoundError","message":"No authorization information found for nope.","exitCode":1}"#;
		let err = parse_org_display("nope", stdout).unwrap_err();
		assert!(matches!(err, Error::OrgNotFound { ref alias } if alias == "nope"));
		assert_eq!(err.code(), ErrorCode::OrgNotFound);
	}

	#[test]
	fn missing_auth_message_without_known_name_is_org_not_found() {
		let stdout = r#"{"status":1,"name":"SomethingNew","message":"No AuthInfo found for name nope"}"#;
		assert!(matches!(parse_org_display("nope", stdout), Err(Error::OrgNotFound { .. })));
	}

	#[test]
	fn expired_refresh_token_is_authentication_failure() {
		let stdout = r#"{"status":1,"name":"RefreshTokenAuthError","message":"Error authenticating with the refresh token due to: expired access/refresh token"}"#;
		let err = parse_org_display("acme", stdout).unwrap_err();
		match err {
			Error::AuthenticationFailed { alias, message } => {
				assert_eq!(alias, "acme");
				assert!(message.contains("expired access/refresh token"));
			}
			other => panic!("expected AuthenticationFailed, got {other:?}"),
		}
	}

	#[test]
	fn non_json_output_is_a_source_error() {
		let err = parse_org_display("acme", "Warning: update available\n").unwrap_err();
		assert!(matches!(err, Error::CredentialSource(_)));
		assert_eq!(err.code(), ErrorCode::AuthenticationFailed);
	}

	#[test]
	fn open_returns_frontdoor_url() {
		let stdout = r#"{"status":0,"result":{"orgId":"00D5g000004XyZaEAK","url":"https://acme.my.salesforce.com/secur/frontdoor.jsp?sid=abc&retURL=%2Flightning%2Fsetup%2FSetupOneHome%2Fhome","username":"admin@acme.example"}}"#;
		let url = parse_open("acme", stdout).unwrap();
		assert!(url.starts_with("https://acme.my.salesforce.com/secur/frontdoor.jsp?"));
	}

	#[test]
	fn open_rejects_relative_url() {
		let stdout = r#"{"status":0,"result":{"url":"/secur/frontdoor.jsp"}}"#;
		assert!(matches!(parse_open("acme", stdout), Err(Error::AuthenticationFailed { .. })));
	}

	#[test]
	fn list_flattens_groups_and_dedupes() {
		let stdout = r#"{
			"status": 0,
			"result": {
				"other": [],
				"sandboxes": [{"username":"admin@acme.example.uat","alias":"uat","orgId":"00D000000000002AAA","connectedStatus":"Connected"}],
				"nonScratchOrgs": [
					{"username":"admin@acme.example","alias":"acme","orgId":"00D5g000004XyZaEAK","connectedStatus":"Connected"},
					{"username":"admin@acme.example.uat","alias":"uat","orgId":"00D000000000002AAA","connectedStatus":"Connected"},
					{"username":"old@legacy.example","orgId":"00D000000000003AAA","connectedStatus":"RefreshTokenAuthError"}
				],
				"devHubs": [{"username":"admin@acme.example","alias":"acme","orgId":"00D5g000004XyZaEAK","connectedStatus":"Connected"}],
				"scratchOrgs": [{"username":"test-xyz@example.com","alias":"scratch","orgId":"00D000000000004AAA","status":"Active"}]
			}
		}"#;
		let orgs = parse_org_list(stdout).unwrap();
		let names: Vec<&str> = orgs.iter().map(|o| o.username.as_str()).collect();
		assert_eq!(
			names,
			vec![
				"admin@acme.example",
				"admin@acme.example.uat",
				"old@legacy.example",
				"test-xyz@example.com"
			]
		);
		assert!(orgs[0].is_active);
		assert!(!orgs[2].is_active);
		assert!(orgs[2].alias.is_none());
		assert!(orgs[3].is_active);
	}

	#[test]
	fn list_failure_has_no_alias_to_blame() {
		let stdout = r#"{"status":1,"name":"Error","message":"boom"}"#;
		assert!(matches!(parse_org_list(stdout), Err(Error::CredentialSource(ref m)) if m == "boom"));
	}

	#[tokio::test]
	async fn missing_binary_is_reported() {
		let source = SfCli::new(Some(PathBuf::from("/nonexistent/sfpilot-test/sf")));
		let err = source.org_info("acme").await.unwrap_err();
		assert!(matches!(err, Error::CredentialSource(ref m) if m.contains("failed to run")));
	}
}
