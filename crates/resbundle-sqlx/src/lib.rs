//! # Resbundle Sqlx
//!
//! Default database-backed [`ContentLoader`](resbundle_core::ContentLoader)
//! implementation over a `sqlx` Postgres pool.
//!
//! The expected table shape (name is configurable, `Bundle` by
//! default):
//!
//! ```sql
//! CREATE TABLE "Bundle" (
//!     name          TEXT   NOT NULL,
//!     language      TEXT   NOT NULL DEFAULT '',
//!     country       TEXT   NOT NULL DEFAULT '',
//!     variant       TEXT   NOT NULL DEFAULT '',
//!     key           TEXT   NOT NULL,
//!     value         TEXT   NOT NULL,
//!     last_modified BIGINT NOT NULL
//! );
//! ```
//!
//! `last_modified` is a UTC millisecond count; the reload check
//! compares `MAX(last_modified)` against the cached entry's load
//! watermark.
//!
//! # Example
//!
//! ```no_run
//! use resbundle_core::{BundleLocale, BundleResolver, ResolverConfig};
//! use resbundle_sqlx::SqlContentLoader;
//! use std::sync::Arc;
//!
//! # async fn example() -> resbundle_core::Result<()> {
//! let pool = sqlx::PgPool::connect_lazy("postgres://localhost/app")
//!     .expect("valid connection string");
//! let loader = SqlContentLoader::with_table(pool, "translations");
//!
//! let resolver = BundleResolver::new(Arc::new(loader), ResolverConfig::default());
//! let bundle = resolver.resolve("Msg", &BundleLocale::new("fr", "CA", "")).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod loader;

pub use config::SqlLoaderConfig;
pub use loader::SqlContentLoader;
