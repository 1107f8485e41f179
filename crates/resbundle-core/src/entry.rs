//! Cached bundle snapshots and time-to-live policy

use crate::loader::BundleContents;
use resbundle_common::{BundleError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Time-to-live policy for cached bundle entries.
///
/// The wire representation is a signed millisecond count using the
/// classic resource-bundle sentinel encoding: `-2` means the cache
/// never expires, `-1` disables caching entirely, and any
/// non-negative value is a duration. Values below `-2` are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeToLive {
    /// Cached entries never expire; the store is never re-checked
    NoExpiration,
    /// Entries are not cached at all; every lookup re-resolves
    DontCache,
    /// Entries expire after the given duration, then are revalidated
    Duration(Duration),
}

impl TimeToLive {
    /// Sentinel millisecond value for [`TimeToLive::NoExpiration`]
    pub const NO_EXPIRATION_MILLIS: i64 = -2;

    /// Sentinel millisecond value for [`TimeToLive::DontCache`]
    pub const DONT_CACHE_MILLIS: i64 = -1;

    /// Decode a millisecond value, validating the sentinel range.
    ///
    /// Anything below the no-expiration sentinel is rejected with an
    /// invalid-argument error. This is the construction-time check:
    /// a bad TTL never reaches first use.
    pub fn from_millis(millis: i64) -> Result<Self> {
        match millis {
            Self::NO_EXPIRATION_MILLIS => Ok(Self::NoExpiration),
            Self::DONT_CACHE_MILLIS => Ok(Self::DontCache),
            ms if ms >= 0 => Ok(Self::Duration(Duration::from_millis(ms as u64))),
            ms => Err(BundleError::invalid_argument(format!(
                "invalid time-to-live: {ms}"
            ))),
        }
    }

    /// The millisecond encoding of this policy
    pub fn as_millis(&self) -> i64 {
        match self {
            Self::NoExpiration => Self::NO_EXPIRATION_MILLIS,
            Self::DontCache => Self::DONT_CACHE_MILLIS,
            Self::Duration(d) => d.as_millis() as i64,
        }
    }
}

impl Default for TimeToLive {
    /// Defaults to no expiration, matching the classic control default
    fn default() -> Self {
        Self::NoExpiration
    }
}

impl Serialize for TimeToLive {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_millis())
    }
}

impl<'de> Deserialize<'de> for TimeToLive {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        Self::from_millis(millis).map_err(serde::de::Error::custom)
    }
}

/// An immutable snapshot of a resolved bundle plus the metadata needed
/// to decide when to revalidate it.
///
/// Entries are superseded, never mutated: a reload or lease extension
/// produces a new entry, and facades over the old one remain valid
/// snapshots. The lease clock (`loaded_at`) drives TTL aging; the
/// store watermark (`watermark_ms`) is only ever set when contents are
/// actually read from the store, so extending a lease cannot mask a
/// store change.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    name: String,
    contents: Arc<BundleContents>,
    loaded_at: Instant,
    watermark_ms: i64,
}

impl BundleEntry {
    /// Create an entry for freshly loaded contents.
    ///
    /// The lease starts now and the watermark is the current UTC time
    /// in milliseconds.
    pub fn new(name: impl Into<String>, contents: BundleContents) -> Self {
        Self {
            name: name.into(),
            contents: Arc::new(contents),
            loaded_at: Instant::now(),
            watermark_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// The resolved name of the winning candidate
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared handle to the contents
    pub fn contents(&self) -> &Arc<BundleContents> {
        &self.contents
    }

    /// UTC milliseconds captured when the contents were read from the
    /// store; compared against the store's `MAX(last_modified)`
    pub fn watermark_ms(&self) -> i64 {
        self.watermark_ms
    }

    /// True if the entry's lease has not yet aged past the TTL
    pub fn is_fresh(&self, ttl: &TimeToLive) -> bool {
        match ttl {
            TimeToLive::NoExpiration => true,
            TimeToLive::DontCache => false,
            TimeToLive::Duration(d) => self.loaded_at.elapsed() < *d,
        }
    }

    /// A new entry with the same contents and watermark but a fresh
    /// lease, used when the store reports no change after expiry
    pub fn extend_lease(&self) -> Self {
        Self {
            name: self.name.clone(),
            contents: Arc::clone(&self.contents),
            loaded_at: Instant::now(),
            watermark_ms: self.watermark_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_sentinel_decoding() {
        assert_eq!(TimeToLive::from_millis(-2).unwrap(), TimeToLive::NoExpiration);
        assert_eq!(TimeToLive::from_millis(-1).unwrap(), TimeToLive::DontCache);
        assert_eq!(
            TimeToLive::from_millis(1500).unwrap(),
            TimeToLive::Duration(Duration::from_millis(1500))
        );
        assert_eq!(
            TimeToLive::from_millis(0).unwrap(),
            TimeToLive::Duration(Duration::ZERO)
        );
    }

    #[test]
    fn ttl_rejects_values_below_sentinel() {
        let err = TimeToLive::from_millis(-3).unwrap_err();
        assert!(matches!(err, BundleError::InvalidArgument { .. }));
    }

    #[test]
    fn ttl_millis_round_trip() {
        for millis in [-2, -1, 0, 1000, 3_600_000] {
            assert_eq!(TimeToLive::from_millis(millis).unwrap().as_millis(), millis);
        }
    }

    #[test]
    fn ttl_serde_uses_integer_encoding() {
        let json = serde_json::to_string(&TimeToLive::NoExpiration).unwrap();
        assert_eq!(json, "-2");

        let ttl: TimeToLive = serde_json::from_str("250").unwrap();
        assert_eq!(ttl, TimeToLive::Duration(Duration::from_millis(250)));

        assert!(serde_json::from_str::<TimeToLive>("-3").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn entry_freshness_tracks_lease_age() {
        let entry = BundleEntry::new("Msg_fr", BundleContents::new());
        let ttl = TimeToLive::Duration(Duration::from_millis(1000));

        assert!(entry.is_fresh(&ttl));
        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(entry.is_fresh(&ttl));
        tokio::time::advance(Duration::from_millis(2)).await;
        assert!(!entry.is_fresh(&ttl));

        assert!(entry.is_fresh(&TimeToLive::NoExpiration));
        assert!(!entry.is_fresh(&TimeToLive::DontCache));
    }

    #[tokio::test(start_paused = true)]
    async fn lease_extension_keeps_contents_and_watermark() {
        let mut contents = BundleContents::new();
        contents.insert("k".into(), "v".into());
        let entry = BundleEntry::new("Msg", contents);
        let ttl = TimeToLive::Duration(Duration::from_millis(100));

        tokio::time::advance(Duration::from_millis(150)).await;
        assert!(!entry.is_fresh(&ttl));

        let extended = entry.extend_lease();
        assert!(extended.is_fresh(&ttl));
        assert_eq!(extended.watermark_ms(), entry.watermark_ms());
        assert!(Arc::ptr_eq(extended.contents(), entry.contents()));
    }
}
