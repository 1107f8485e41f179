//! SQL-backed content loader

use crate::config::SqlLoaderConfig;
use async_trait::async_trait;
use resbundle_common::{BundleError, Result};
use resbundle_core::{BundleContents, BundleLocale, BundleName, ContentLoader, DATABASE_FORMAT};
use sqlx::PgPool;
use tracing::{debug, trace};

/// Loads bundle contents from a relational database via parameterized
/// queries.
///
/// Connections are acquired from the pool per call and released on
/// every exit path, including errors. I/O failures surface as
/// [`BundleError::Store`]; an empty result set is a normal "no data
/// for this candidate" outcome, not a failure.
pub struct SqlContentLoader {
    pool: PgPool,
    config: SqlLoaderConfig,
}

impl SqlContentLoader {
    /// Loader over the default table and queries
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, SqlLoaderConfig::default())
    }

    /// Loader with both default queries rewritten against `table_name`
    pub fn with_table(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self::with_config(pool, SqlLoaderConfig::for_table(table_name))
    }

    /// Loader with an explicit configuration
    pub fn with_config(pool: PgPool, config: SqlLoaderConfig) -> Self {
        debug!(
            table = config.table_name(),
            load_query = config.load_query(),
            reload_query = config.reload_query(),
            "sql content loader initialized"
        );
        Self { pool, config }
    }

    /// The active configuration
    pub fn config(&self) -> &SqlLoaderConfig {
        &self.config
    }
}

#[async_trait]
impl ContentLoader for SqlContentLoader {
    async fn load_contents(&self, bundle_name: &str) -> Result<BundleContents> {
        let name = BundleName::parse(bundle_name)?;

        trace!(bundle_name, query = self.config.load_query(), "loading bundle contents");

        let rows: Vec<(String, String)> = sqlx::query_as(self.config.load_query())
            .bind(name.base())
            .bind(name.language())
            .bind(name.country())
            .bind(name.variant())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                BundleError::store_with_source(
                    format!("failed to load contents of {bundle_name}"),
                    e,
                )
            })?;

        Ok(rows.into_iter().collect())
    }

    async fn needs_reload(
        &self,
        base_name: &str,
        locale: &BundleLocale,
        format: &str,
        watermark_ms: i64,
    ) -> Result<bool> {
        if format != DATABASE_FORMAT {
            return Err(BundleError::unsupported_format(format));
        }

        trace!(
            base_name,
            %locale,
            query = self.config.reload_query(),
            "checking bundle last-modified"
        );

        // MAX over an empty table yields a single NULL row, hence the
        // nested option
        let row: Option<Option<i64>> = sqlx::query_scalar(self.config.reload_query())
            .bind(base_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                BundleError::store_with_source(
                    format!("failed to check last-modified for {base_name}"),
                    e,
                )
            })?;
        let last_modified = row.flatten();

        // No timestamp at all means "assume changed"
        Ok(last_modified.map_or(true, |ms| ms > watermark_ms))
    }
}

impl std::fmt::Debug for SqlContentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlContentLoader")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/resbundle_test").unwrap()
    }

    #[tokio::test]
    async fn constructors_resolve_configuration_up_front() {
        let loader = SqlContentLoader::new(lazy_pool());
        assert_eq!(loader.config().table_name(), "Bundle");

        let loader = SqlContentLoader::with_table(lazy_pool(), "translations");
        assert!(loader.config().load_query().contains("FROM translations "));
        assert!(loader.config().reload_query().contains("FROM translations "));
    }

    #[tokio::test]
    async fn unsupported_format_is_rejected_without_store_access() {
        // connect_lazy never dials; rejecting the format must not
        // touch the pool at all
        let loader = SqlContentLoader::new(lazy_pool());
        let err = loader
            .needs_reload("Msg", &BundleLocale::root(), "bundle.properties", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BundleError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn empty_bundle_name_is_rejected_without_store_access() {
        let loader = SqlContentLoader::new(lazy_pool());
        let err = loader.load_contents("").await.unwrap_err();
        assert!(matches!(err, BundleError::InvalidArgument { .. }));
    }
}
