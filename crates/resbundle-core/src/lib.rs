//! # Resbundle Core
//!
//! Locale-aware resource bundles whose authoritative storage is a
//! relational database (or any other pluggable content source).
//!
//! This crate owns the bundle-resolution-and-caching control logic:
//!
//! - Locale fallback: candidate bundle names are tried from most to
//!   least specific (`Msg_fr_CA_X`, `Msg_fr_CA`, `Msg_fr`, `Msg`)
//! - In-memory caching with a configurable time-to-live
//! - Revalidation against the store's last-modified watermark once an
//!   entry's lease expires, without re-querying unchanged contents
//! - A pluggable [`ContentLoader`] capability for the actual storage
//!
//! # Example
//!
//! ```
//! use resbundle_core::testing::MemoryLoader;
//! use resbundle_core::{BundleLocale, BundleResolver, ResolverConfig};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let loader = MemoryLoader::new()
//!     .with_bundle("Msg_fr", &[("greeting", "Bonjour")])
//!     .with_bundle("Msg", &[("greeting", "Hello")]);
//!
//! let resolver = BundleResolver::new(Arc::new(loader), ResolverConfig::default());
//! let locale = BundleLocale::new("fr", "CA", "");
//!
//! let bundle = resolver.resolve("Msg", &locale).await.unwrap().unwrap();
//! assert_eq!(bundle.name(), "Msg_fr");
//! assert_eq!(bundle.get("greeting"), Some("Bonjour"));
//! # });
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bundle;
pub mod entry;
pub mod loader;
pub mod locale;
pub mod name;
pub mod resolver;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bundle::{Bundle, Keys};
pub use entry::{BundleEntry, TimeToLive};
pub use loader::{BundleContents, ContentLoader, DATABASE_FORMAT};
pub use locale::BundleLocale;
pub use name::{candidate_names, full_name, BundleName};
pub use resolver::{BundleResolver, ResolverConfig, StoreErrorPolicy};

// Re-export the shared error surface
pub use resbundle_common::{BundleError, Result};
