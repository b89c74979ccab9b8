use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{CredentialSource, OrgInfo, OrgSummary};
use crate::error::Result;

/// A cached credential with its fetch and expiry times.
#[derive(Debug, Clone)]
pub struct CachedOrg {
	pub info: OrgInfo,
	pub fetched_at: Instant,
	pub expires_at: Instant,
}

impl CachedOrg {
	pub fn is_stale(&self) -> bool {
		Instant::now() >= self.expires_at
	}
}

/// Org credential cache keyed by alias.
///
/// Entries older than the TTL are refetched lazily on the next read. Entry
/// URLs are one-time tokens and are never cached.
pub struct CredentialCache {
	source: Arc<dyn CredentialSource>,
	ttl: Duration,
	entries: Mutex<HashMap<String, CachedOrg>>,
}

impl CredentialCache {
	pub fn new(source: Arc<dyn CredentialSource>, ttl: Duration) -> Self {
		Self {
			source,
			ttl,
			entries: Mutex::new(HashMap::new()),
		}
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Returns credentials for `alias`, hitting the source only when there is
	/// no fresh entry or `force_refresh` is set.
	pub async fn get(&self, alias: &str, force_refresh: bool) -> Result<OrgInfo> {
		if !force_refresh {
			let mut entries = self.entries.lock();
			match entries.get(alias) {
				Some(entry) if !entry.is_stale() => return Ok(entry.info.clone()),
				Some(_) => {
					debug!(target = "sfpilot.credentials", alias, "cached credentials expired");
					entries.remove(alias);
				}
				None => {}
			}
		}

		debug!(target = "sfpilot.credentials", alias, force_refresh, "fetching org credentials");
		let info = self.source.org_info(alias).await?;
		let fetched_at = Instant::now();
		self.entries.lock().insert(
			alias.to_string(),
			CachedOrg {
				info: info.clone(),
				fetched_at,
				expires_at: fetched_at + self.ttl,
			},
		);
		Ok(info)
	}

	/// The cached entry for `alias`, fresh or not.
	pub fn cached(&self, alias: &str) -> Option<CachedOrg> {
		self.entries.lock().get(alias).cloned()
	}

	/// Drops one alias, or every entry when `alias` is `None`. Returns how many were removed.
	pub fn clear(&self, alias: Option<&str>) -> usize {
		let mut entries = self.entries.lock();
		match alias {
			Some(alias) => usize::from(entries.remove(alias).is_some()),
			None => {
				let n = entries.len();
				entries.clear();
				n
			}
		}
	}

	pub async fn entry_url(&self, alias: &str, path: Option<&str>) -> Result<String> {
		self.source.entry_url(alias, path).await
	}

	pub async fn list_orgs(&self) -> Result<Vec<OrgSummary>> {
		self.source.list_orgs().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;
	use crate::testing::FakeCredentials;

	const TTL: Duration = Duration::from_secs(30 * 60);

	fn cache(source: &FakeCredentials) -> CredentialCache {
		CredentialCache::new(Arc::new(source.clone()), TTL)
	}

	#[tokio::test(start_paused = true)]
	async fn second_fetch_within_ttl_uses_cache() {
		let source = FakeCredentials::with_org("dev");
		let cache = cache(&source);
		let first = cache.get("dev", false).await.unwrap();
		tokio::time::advance(Duration::from_secs(29 * 60)).await;
		let second = cache.get("dev", false).await.unwrap();
		assert_eq!(first, second);
		assert_eq!(source.org_info_calls(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn forced_refresh_always_hits_source() {
		let source = FakeCredentials::with_org("dev");
		let cache = cache(&source);
		cache.get("dev", false).await.unwrap();
		cache.get("dev", true).await.unwrap();
		cache.get("dev", true).await.unwrap();
		assert_eq!(source.org_info_calls(), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn fetch_after_ttl_refetches() {
		let source = FakeCredentials::with_org("dev");
		let cache = cache(&source);
		cache.get("dev", false).await.unwrap();
		tokio::time::advance(TTL).await;
		assert!(cache.cached("dev").unwrap().is_stale());
		cache.get("dev", false).await.unwrap();
		assert_eq!(source.org_info_calls(), 2);
		assert!(!cache.cached("dev").unwrap().is_stale());
	}

	#[tokio::test(start_paused = true)]
	async fn clear_forces_next_fetch() {
		let source = FakeCredentials::with_org("dev");
		let cache = cache(&source);
		cache.get("dev", false).await.unwrap();
		assert_eq!(cache.clear(Some("dev")), 1);
		assert_eq!(cache.clear(Some("dev")), 0);
		cache.get("dev", false).await.unwrap();
		assert_eq!(source.org_info_calls(), 2);
		assert_eq!(cache.clear(None), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn unknown_org_is_not_cached() {
		let source = FakeCredentials::with_org("dev");
		let cache = cache(&source);
		let err = cache.get("nope", false).await.unwrap_err();
		assert!(matches!(err, Error::OrgNotFound { ref alias } if alias == "nope"));
		assert!(cache.cached("nope").is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn entry_urls_are_never_cached() {
		let source = FakeCredentials::with_org("dev");
		let cache = cache(&source);
		cache.entry_url("dev", None).await.unwrap();
		cache.entry_url("dev", None).await.unwrap();
		assert_eq!(source.entry_url_calls(), 2);
	}
}
