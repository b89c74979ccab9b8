//! Org credentials: the external source contract and a TTL cache over it.

mod cache;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use cache::{CachedOrg, CredentialCache};

use crate::error::Result;

/// Org metadata and access token as reported by the credential source.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgInfo {
	#[serde(default)]
	pub alias: Option<String>,
	pub org_id: String,
	pub access_token: String,
	pub instance_url: String,
	pub username: String,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub api_version: Option<String>,
}

impl std::fmt::Debug for OrgInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OrgInfo")
			.field("alias", &self.alias)
			.field("org_id", &self.org_id)
			.field("access_token", &"<redacted>")
			.field("instance_url", &self.instance_url)
			.field("username", &self.username)
			.field("status", &self.status)
			.finish()
	}
}

/// One locally authorized org, as listed by the credential source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgSummary {
	#[serde(default)]
	pub alias: Option<String>,
	pub username: String,
	#[serde(default)]
	pub is_active: bool,
	#[serde(default)]
	pub org_id: Option<String>,
}

/// External collaborator that owns org authorization (the `sf` CLI in production).
///
/// Implementations classify failures: a missing org is
/// [`Error::OrgNotFound`](crate::Error::OrgNotFound), anything else
/// [`Error::AuthenticationFailed`](crate::Error::AuthenticationFailed) or
/// [`Error::CredentialSource`](crate::Error::CredentialSource).
#[async_trait]
pub trait CredentialSource: Send + Sync {
	async fn org_info(&self, alias: &str) -> Result<OrgInfo>;

	/// One-time authenticated entry (frontdoor) URL, optionally landing on `path`.
	async fn entry_url(&self, alias: &str, path: Option<&str>) -> Result<String>;

	async fn list_orgs(&self) -> Result<Vec<OrgSummary>>;
}

/// Whether `id` follows the org id convention: 15 or 18 alphanumerics starting with `00D`.
pub fn is_org_id(id: &str) -> bool {
	matches!(id.len(), 15 | 18) && id.starts_with("00D") && id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn org_id_convention() {
		assert!(is_org_id("00D5g000004XyZaEAK"));
		assert!(is_org_id("00D5g000004XyZa"));
		assert!(!is_org_id("0015g000004XyZaEAK"));
		assert!(!is_org_id("00D5g000004XyZ"));
		assert!(!is_org_id("00D5g000004XyZ-EAK"));
	}

	#[test]
	fn debug_output_redacts_token() {
		let info = OrgInfo {
			alias: Some("dev".into()),
			org_id: "00D5g000004XyZaEAK".into(),
			access_token: "00D!secret".into(),
			instance_url: "https://acme.my.salesforce.com".into(),
			username: "admin@acme.dev".into(),
			status: Some("Connected".into()),
			api_version: None,
		};
		let rendered = format!("{info:?}");
		assert!(!rendered.contains("secret"));
		assert!(rendered.contains("admin@acme.dev"));
	}
}
