//! Test fixtures for exercising the resolver without a real store.
//!
//! [`MemoryLoader`] is an in-memory [`ContentLoader`] with call
//! recording, injectable latency and failure switches, so tests can
//! assert exact store-call counts, force slow reloads and simulate
//! outages.

use crate::loader::{BundleContents, ContentLoader, DATABASE_FORMAT};
use crate::locale::BundleLocale;
use async_trait::async_trait;
use parking_lot::Mutex;
use resbundle_common::{BundleError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory content loader for tests.
pub struct MemoryLoader {
    bundles: Mutex<HashMap<String, BundleContents>>,
    last_modified: Mutex<HashMap<String, i64>>,
    load_calls: Mutex<Vec<String>>,
    reload_calls: AtomicUsize,
    load_delay: Mutex<Option<Duration>>,
    reload_delay: Mutex<Option<Duration>>,
    fail_loads: AtomicBool,
    fail_loads_for: Mutex<Vec<String>>,
    fail_reload_checks: AtomicBool,
}

impl MemoryLoader {
    /// An empty loader
    pub fn new() -> Self {
        Self {
            bundles: Mutex::new(HashMap::new()),
            last_modified: Mutex::new(HashMap::new()),
            load_calls: Mutex::new(Vec::new()),
            reload_calls: AtomicUsize::new(0),
            load_delay: Mutex::new(None),
            reload_delay: Mutex::new(None),
            fail_loads: AtomicBool::new(false),
            fail_loads_for: Mutex::new(Vec::new()),
            fail_reload_checks: AtomicBool::new(false),
        }
    }

    /// Builder-style fixture insertion, keyed by full bundle name
    #[must_use]
    pub fn with_bundle(self, name: &str, pairs: &[(&str, &str)]) -> Self {
        self.insert_bundle(name, pairs);
        self
    }

    /// Insert or replace a bundle fixture
    pub fn insert_bundle(&self, name: &str, pairs: &[(&str, &str)]) {
        let contents = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.bundles.lock().insert(name.to_string(), contents);
    }

    /// Remove a bundle fixture
    pub fn remove_bundle(&self, name: &str) {
        self.bundles.lock().remove(name);
    }

    /// Set the last-modified watermark (UTC millis) for a base name.
    ///
    /// Absent base names make `needs_reload` answer `true`, per the
    /// conservative contract.
    pub fn set_last_modified(&self, base_name: &str, millis: i64) {
        self.last_modified
            .lock()
            .insert(base_name.to_string(), millis);
    }

    /// Delay every `load_contents` answer
    pub fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.lock() = Some(delay);
    }

    /// Delay every `needs_reload` answer
    pub fn set_reload_delay(&self, delay: Duration) {
        *self.reload_delay.lock() = Some(delay);
    }

    /// Make every `load_contents` call fail with a store error
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make `load_contents` fail for one specific bundle name only
    pub fn set_fail_load_for(&self, bundle_name: &str) {
        self.fail_loads_for.lock().push(bundle_name.to_string());
    }

    /// Make every `needs_reload` call fail with a store error
    pub fn set_fail_reload_checks(&self, fail: bool) {
        self.fail_reload_checks.store(fail, Ordering::SeqCst);
    }

    /// Every bundle name passed to `load_contents`, in call order
    pub fn load_calls(&self) -> Vec<String> {
        self.load_calls.lock().clone()
    }

    /// Number of `load_contents` calls so far
    pub fn load_call_count(&self) -> usize {
        self.load_calls.lock().len()
    }

    /// Number of `needs_reload` calls so far
    pub fn reload_call_count(&self) -> usize {
        self.reload_calls.load(Ordering::SeqCst)
    }

    /// Forget all recorded calls
    pub fn reset_counters(&self) {
        self.load_calls.lock().clear();
        self.reload_calls.store(0, Ordering::SeqCst);
    }
}

impl Default for MemoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentLoader for MemoryLoader {
    async fn load_contents(&self, bundle_name: &str) -> Result<BundleContents> {
        self.load_calls.lock().push(bundle_name.to_string());

        let delay = *self.load_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_loads.load(Ordering::SeqCst)
            || self.fail_loads_for.lock().iter().any(|n| n == bundle_name)
        {
            return Err(BundleError::store("simulated store outage"));
        }

        Ok(self
            .bundles
            .lock()
            .get(bundle_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn needs_reload(
        &self,
        base_name: &str,
        _locale: &BundleLocale,
        format: &str,
        watermark_ms: i64,
    ) -> Result<bool> {
        self.reload_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.reload_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if format != DATABASE_FORMAT {
            return Err(BundleError::unsupported_format(format));
        }

        if self.fail_reload_checks.load(Ordering::SeqCst) {
            return Err(BundleError::store("simulated store outage"));
        }

        // Missing signal means "assume changed"
        Ok(self
            .last_modified
            .lock()
            .get(base_name)
            .map_or(true, |&last_modified| last_modified > watermark_ms))
    }
}
