//! Bundle resolution, caching and revalidation control

use crate::bundle::Bundle;
use crate::entry::{BundleEntry, TimeToLive};
use crate::loader::{ContentLoader, DATABASE_FORMAT};
use crate::locale::BundleLocale;
use crate::name::candidate_names;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use resbundle_common::{BundleError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What the resolver does when a loader reports a store failure during
/// the candidate loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorPolicy {
    /// Log the failure and treat the candidate as empty, continuing
    /// the fallback loop.
    #[default]
    Degrade,
    /// Fail the lookup with the store error.
    Propagate,
}

/// Configuration for a [`BundleResolver`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Time-to-live for cached entries, as sentinel-encoded
    /// milliseconds on the wire (see [`TimeToLive`])
    pub ttl: TimeToLive,
    /// Upper bound on any single loader call; a store round-trip that
    /// exceeds it counts as a store failure
    #[serde(with = "duration_millis", rename = "store_timeout_millis")]
    pub store_timeout: Duration,
    /// Store failure handling during candidate loading
    pub on_store_error: StoreErrorPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ttl: TimeToLive::default(),
            store_timeout: Duration::from_secs(10),
            on_store_error: StoreErrorPolicy::default(),
        }
    }
}

impl ResolverConfig {
    /// A config with the given sentinel-encoded TTL, validated here at
    /// construction time
    pub fn with_ttl_millis(millis: i64) -> Result<Self> {
        Ok(Self {
            ttl: TimeToLive::from_millis(millis)?,
            ..Self::default()
        })
    }

    /// A config with the given TTL duration
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: TimeToLive::Duration(ttl),
            ..Self::default()
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// One cache slot per `(base name, locale)` pair.
///
/// The entry is swapped atomically so readers never block; the claim
/// flag makes expiry-triggered reloads single-flight per slot.
struct Slot {
    entry: ArcSwap<BundleEntry>,
    reloading: AtomicBool,
}

impl Slot {
    fn new(entry: BundleEntry) -> Self {
        Self {
            entry: ArcSwap::from_pointee(entry),
            reloading: AtomicBool::new(false),
        }
    }
}

/// Clears the slot's reload claim when the winning caller is done,
/// including on early returns and cancellation.
struct ReloadClaim<'a>(&'a AtomicBool);

impl Drop for ReloadClaim<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Outcome of one pass over the candidate list.
struct CandidateScan {
    entry: Option<BundleEntry>,
    /// True if at least one candidate was skipped because of a store
    /// failure under [`StoreErrorPolicy::Degrade`]
    degraded: bool,
}

/// Resolves bundles by base name and locale, caching the results.
///
/// Resolution tries candidate names from most to least specific and
/// materializes the first candidate with non-empty contents. Cached
/// entries are served lock-free until their lease ages past the TTL;
/// an expired entry is revalidated against the store's last-modified
/// watermark before any contents are re-read.
///
/// Concurrency policy: **stale-while-revalidate**. When an entry
/// expires, the first caller to notice claims the slot and revalidates
/// inline; concurrent callers for the same pair return the existing
/// stale snapshot immediately instead of waiting on store I/O.
/// Reloads of different pairs are fully independent.
pub struct BundleResolver {
    loader: Arc<dyn ContentLoader>,
    config: ResolverConfig,
    cache: DashMap<(String, BundleLocale), Arc<Slot>>,
}

impl BundleResolver {
    /// Create a resolver over the given content loader.
    ///
    /// The TTL inside `config` is already validated: an out-of-range
    /// sentinel cannot construct a [`TimeToLive`].
    pub fn new(loader: Arc<dyn ContentLoader>, config: ResolverConfig) -> Self {
        debug!(
            ttl_millis = config.ttl.as_millis(),
            store_timeout_millis = config.store_timeout.as_millis() as u64,
            policy = ?config.on_store_error,
            "bundle resolver initialized"
        );
        Self {
            loader,
            config,
            cache: DashMap::new(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Number of cached `(base name, locale)` entries
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Resolve the best-matching bundle for a base name and locale.
    ///
    /// Returns `Ok(None)` when no candidate in the fallback chain has
    /// any contents, so callers can chain to a parent bundle of their
    /// own. A present bundle is never empty.
    pub async fn resolve(
        &self,
        base_name: &str,
        locale: &BundleLocale,
    ) -> Result<Option<Bundle>> {
        if base_name.is_empty() {
            return Err(BundleError::invalid_argument("base name is empty"));
        }

        if self.config.ttl == TimeToLive::DontCache {
            let scan = self.scan_candidates(base_name, locale).await?;
            return Ok(scan.entry.map(|e| Bundle::from_entry(&e)));
        }

        let key = (base_name.to_string(), locale.clone());

        // Shard guard is dropped before any await below
        let slot = self.cache.get(&key).map(|r| Arc::clone(r.value()));

        match slot {
            Some(slot) => {
                let entry = slot.entry.load_full();
                if entry.is_fresh(&self.config.ttl) {
                    return Ok(Some(Bundle::from_entry(&entry)));
                }

                if slot
                    .reloading
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    let _claim = ReloadClaim(&slot.reloading);
                    self.revalidate(&key, &slot, &entry).await
                } else {
                    debug!(
                        base_name,
                        %locale,
                        "revalidation already in flight, serving stale snapshot"
                    );
                    Ok(Some(Bundle::from_entry(&entry)))
                }
            }
            None => {
                let scan = self.scan_candidates(base_name, locale).await?;
                match scan.entry {
                    Some(entry) => {
                        let bundle = Bundle::from_entry(&entry);
                        self.cache.insert(key, Arc::new(Slot::new(entry)));
                        Ok(Some(bundle))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    /// Revalidate an expired entry. Only the claim holder gets here.
    async fn revalidate(
        &self,
        key: &(String, BundleLocale),
        slot: &Slot,
        entry: &BundleEntry,
    ) -> Result<Option<Bundle>> {
        let (base_name, locale) = key;

        let needs_reload = match self
            .bounded(self.loader.needs_reload(
                base_name,
                locale,
                DATABASE_FORMAT,
                entry.watermark_ms(),
            ))
            .await
        {
            Ok(Ok(changed)) => changed,
            Ok(Err(e)) => {
                warn!(base_name, error = %e, "reload check failed, assuming stale");
                true
            }
            Err(_) => {
                warn!(base_name, "reload check timed out, assuming stale");
                true
            }
        };

        if !needs_reload {
            let refreshed = Arc::new(entry.extend_lease());
            slot.entry.store(Arc::clone(&refreshed));
            debug!(base_name, %locale, "store unchanged, lease extended");
            return Ok(Some(Bundle::from_entry(&refreshed)));
        }

        match self.scan_candidates(base_name, locale).await {
            Ok(CandidateScan {
                entry: Some(new_entry),
                ..
            }) => {
                let bundle = Bundle::from_entry(&new_entry);
                slot.entry.store(Arc::new(new_entry));
                info!(base_name, %locale, name = bundle.name(), "bundle reloaded");
                Ok(Some(bundle))
            }
            Ok(CandidateScan {
                entry: None,
                degraded: false,
            }) => {
                // The store is authoritative: the contents are gone
                self.cache.remove(key);
                info!(base_name, %locale, "bundle no longer in store, evicted");
                Ok(None)
            }
            Ok(CandidateScan {
                entry: None,
                degraded: true,
            }) => {
                warn!(base_name, %locale, "reload degraded by store failure, serving last good entry");
                let refreshed = Arc::new(entry.extend_lease());
                slot.entry.store(Arc::clone(&refreshed));
                Ok(Some(Bundle::from_entry(&refreshed)))
            }
            Err(e) => {
                warn!(base_name, %locale, error = %e, "reload failed, serving last good entry");
                let refreshed = Arc::new(entry.extend_lease());
                slot.entry.store(Arc::clone(&refreshed));
                Ok(Some(Bundle::from_entry(&refreshed)))
            }
        }
    }

    /// Try every candidate name, most specific first; the first
    /// non-empty result wins.
    async fn scan_candidates(
        &self,
        base_name: &str,
        locale: &BundleLocale,
    ) -> Result<CandidateScan> {
        let mut degraded = false;

        for candidate in candidate_names(base_name, locale) {
            debug!(candidate = %candidate, "trying candidate");

            let contents = match self.bounded(self.loader.load_contents(&candidate)).await {
                Ok(Ok(contents)) => contents,
                Ok(Err(e)) => {
                    if self.config.on_store_error == StoreErrorPolicy::Propagate {
                        return Err(e);
                    }
                    error!(candidate = %candidate, error = %e, "store failure, treating candidate as empty");
                    degraded = true;
                    continue;
                }
                Err(_) => {
                    let e = BundleError::store(format!(
                        "load of {candidate} timed out after {:?}",
                        self.config.store_timeout
                    ));
                    if self.config.on_store_error == StoreErrorPolicy::Propagate {
                        return Err(e);
                    }
                    error!(candidate = %candidate, error = %e, "store failure, treating candidate as empty");
                    degraded = true;
                    continue;
                }
            };

            if !contents.is_empty() {
                info!(candidate = %candidate, entries = contents.len(), "bundle loaded");
                return Ok(CandidateScan {
                    entry: Some(BundleEntry::new(candidate, contents)),
                    degraded,
                });
            }
        }

        debug!(base_name, %locale, "no candidate produced contents");
        Ok(CandidateScan {
            entry: None,
            degraded,
        })
    }

    /// Bound a loader call by the configured store timeout so a hung
    /// store round-trip cannot wedge a slot's claim.
    async fn bounded<F, T>(&self, call: F) -> std::result::Result<T, tokio::time::error::Elapsed>
    where
        F: Future<Output = T>,
    {
        tokio::time::timeout(self.config.store_timeout, call).await
    }
}

impl std::fmt::Debug for BundleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleResolver")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.ttl, TimeToLive::NoExpiration);
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert_eq!(config.on_store_error, StoreErrorPolicy::Degrade);
    }

    #[test]
    fn config_from_ttl_millis_validates() {
        let config = ResolverConfig::with_ttl_millis(2500).unwrap();
        assert_eq!(config.ttl, TimeToLive::Duration(Duration::from_millis(2500)));

        let err = ResolverConfig::with_ttl_millis(-7).unwrap_err();
        assert!(matches!(err, BundleError::InvalidArgument { .. }));
    }

    #[test]
    fn config_deserialization_rejects_invalid_ttl() {
        let config: ResolverConfig = serde_json::from_str(
            r#"{"ttl": 1000, "store_timeout_millis": 250, "on_store_error": "propagate"}"#,
        )
        .unwrap();
        assert_eq!(config.ttl, TimeToLive::Duration(Duration::from_millis(1000)));
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.on_store_error, StoreErrorPolicy::Propagate);

        assert!(serde_json::from_str::<ResolverConfig>(r#"{"ttl": -3}"#).is_err());
    }
}
