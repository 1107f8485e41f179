//! Pluggable content loading capability

use crate::locale::BundleLocale;
use async_trait::async_trait;
use resbundle_common::Result;
use std::collections::HashMap;

/// Key/value contents of one resolved bundle.
///
/// An empty map is a valid result meaning "no data for this exact
/// locale combination"; it is how the fallback algorithm decides to
/// try the next candidate.
pub type BundleContents = HashMap<String, String>;

/// Format tag for database-backed bundles.
///
/// The resolver passes this tag on every reload check; loaders that
/// only produce this format reject any other tag.
pub const DATABASE_FORMAT: &str = "bundle.database";

/// Capability for loading bundle contents from a backing store.
///
/// The default implementation executes parameterized queries against a
/// relational database; alternative implementations may use any other
/// source. Implementations manage their own connection lifetime per
/// call and release it deterministically on every exit path.
#[async_trait]
pub trait ContentLoader: Send + Sync {
    /// Load all contents of the bundle with the given fully qualified
    /// name (for example `ButtonLabel_fr_CA_UNIX`).
    ///
    /// Never encodes "no data" as an error: an empty map means the
    /// store has no rows for this exact combination. I/O failures are
    /// reported as [`BundleError::Store`](resbundle_common::BundleError)
    /// so callers can tell "no data" from "could not reach the store".
    async fn load_contents(&self, bundle_name: &str) -> Result<BundleContents>;

    /// True if the store has data for `base_name` modified strictly
    /// after `watermark_ms` (UTC milliseconds).
    ///
    /// When the store records no timestamp at all for `base_name`,
    /// implementations must return `Ok(true)`: a missing signal is
    /// treated as "assume changed", since a false negative here would
    /// pin stale contents forever.
    async fn needs_reload(
        &self,
        base_name: &str,
        locale: &BundleLocale,
        format: &str,
        watermark_ms: i64,
    ) -> Result<bool>;
}
