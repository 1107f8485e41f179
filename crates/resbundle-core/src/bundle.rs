//! Read-only bundle facade handed to callers

use crate::entry::BundleEntry;
use crate::loader::BundleContents;
use std::collections::hash_map;
use std::collections::HashSet;
use std::sync::Arc;

/// A resolved, read-only bundle.
///
/// Wraps one cache entry's contents; immutable once constructed. After
/// a reload a fresh facade wraps the new entry, while existing facades
/// keep serving their snapshot.
///
/// A bundle may chain to a parent bundle: lookups fall back to the
/// parent when a key is absent locally, and [`Bundle::keys`] merges
/// the parent's keys in without letting them shadow local ones.
#[derive(Debug, Clone)]
pub struct Bundle {
    name: String,
    contents: Arc<BundleContents>,
    parent: Option<Arc<Bundle>>,
}

impl Bundle {
    /// Create a bundle over the given contents
    pub fn new(name: impl Into<String>, contents: BundleContents) -> Self {
        Self {
            name: name.into(),
            contents: Arc::new(contents),
            parent: None,
        }
    }

    pub(crate) fn from_entry(entry: &BundleEntry) -> Self {
        Self {
            name: entry.name().to_string(),
            contents: Arc::clone(entry.contents()),
            parent: None,
        }
    }

    /// Attach a parent bundle for locale fallback chaining
    #[must_use]
    pub fn with_parent(mut self, parent: Arc<Bundle>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The resolved name of the candidate this bundle was loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent bundle, when one is attached
    pub fn parent(&self) -> Option<&Arc<Bundle>> {
        self.parent.as_ref()
    }

    /// Look up a value, falling back to the parent chain
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.contents.get(key) {
            Some(value) => Some(value.as_str()),
            None => self.parent.as_deref().and_then(|p| p.get(key)),
        }
    }

    /// Look up a value in this bundle only, without parent fallback
    pub fn get_local(&self, key: &str) -> Option<&str> {
        self.contents.get(key).map(String::as_str)
    }

    /// True if the key resolves locally or through the parent chain
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries in this bundle's own contents
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// True if this bundle's own contents are empty
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Iterate every key in this bundle plus every parent-chain key
    /// not already present in a nearer bundle.
    ///
    /// The iterator is finite and restartable: each call starts a new
    /// pass. Local keys always win over parent keys.
    pub fn keys(&self) -> Keys<'_> {
        let mut remaining = Vec::new();
        let mut parent = self.parent.as_deref();
        while let Some(bundle) = parent {
            remaining.push(bundle);
            parent = bundle.parent.as_deref();
        }

        Keys {
            current: self.contents.keys(),
            remaining,
            yielded: HashSet::new(),
        }
    }
}

/// Iterator over a bundle's keys including unshadowed parent keys.
///
/// Yields the local keys first, then walks the parent chain skipping
/// any key a nearer bundle already provided.
pub struct Keys<'a> {
    current: hash_map::Keys<'a, String, String>,
    remaining: Vec<&'a Bundle>,
    yielded: HashSet<&'a str>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            if let Some(key) = self.current.next() {
                if self.yielded.insert(key.as_str()) {
                    return Some(key.as_str());
                }
                continue;
            }
            if self.remaining.is_empty() {
                return None;
            }
            self.current = self.remaining.remove(0).contents.keys();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(pairs: &[(&str, &str)]) -> BundleContents {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn get_returns_local_values() {
        let bundle = Bundle::new("Msg_fr", contents(&[("greeting", "Bonjour")]));
        assert_eq!(bundle.get("greeting"), Some("Bonjour"));
        assert_eq!(bundle.get("missing"), None);
        assert!(bundle.contains_key("greeting"));
    }

    #[test]
    fn get_falls_back_to_parent_chain() {
        let root = Arc::new(Bundle::new("Msg", contents(&[("farewell", "Bye")])));
        let bundle =
            Bundle::new("Msg_fr", contents(&[("greeting", "Bonjour")])).with_parent(root);

        assert_eq!(bundle.get("greeting"), Some("Bonjour"));
        assert_eq!(bundle.get("farewell"), Some("Bye"));
        assert_eq!(bundle.get_local("farewell"), None);
    }

    #[test]
    fn local_values_shadow_parent_values() {
        let parent = Arc::new(Bundle::new("Msg", contents(&[("b", "parent"), ("c", "C")])));
        let bundle =
            Bundle::new("Msg_fr", contents(&[("a", "A"), ("b", "local")])).with_parent(parent);

        assert_eq!(bundle.get("b"), Some("local"));
    }

    #[test]
    fn keys_merge_parent_without_duplicates() {
        let parent = Arc::new(Bundle::new("Msg", contents(&[("b", "parent"), ("c", "C")])));
        let bundle =
            Bundle::new("Msg_fr", contents(&[("a", "A"), ("b", "local")])).with_parent(parent);

        let mut keys: Vec<&str> = bundle.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b", "c"]);

        // Restartable: a second pass yields the same set
        let mut again: Vec<&str> = bundle.keys().collect();
        again.sort_unstable();
        assert_eq!(again, keys);
    }

    #[test]
    fn keys_walk_a_longer_chain() {
        let grandparent = Arc::new(Bundle::new("Msg", contents(&[("x", "1"), ("y", "2")])));
        let parent = Arc::new(
            Bundle::new("Msg_fr", contents(&[("y", "3"), ("z", "4")])).with_parent(grandparent),
        );
        let bundle = Bundle::new("Msg_fr_CA", contents(&[("z", "5")])).with_parent(parent);

        let mut keys: Vec<&str> = bundle.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["x", "y", "z"]);
    }

    #[test]
    fn keys_of_bundle_without_parent() {
        let bundle = Bundle::new("Msg", contents(&[("only", "one")]));
        assert_eq!(bundle.keys().collect::<Vec<_>>(), vec!["only"]);
    }
}
