//! Query configuration for the SQL content loader

use serde::Deserialize;

/// Table name and query templates for [`SqlContentLoader`].
///
/// Defaults derive from the `Bundle` table. Overriding the table name
/// rewrites both query templates consistently; overriding a query
/// template replaces it wholesale. Configuration is resolved at
/// construction time only.
///
/// The load query takes exactly four positional parameters (name,
/// language, country, variant); the reload-check query takes one (the
/// base name).
///
/// [`SqlContentLoader`]: crate::SqlContentLoader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlLoaderConfig {
    table_name: String,
    load_query: String,
    reload_query: String,
}

impl SqlLoaderConfig {
    /// Table name used when none is configured
    pub const DEFAULT_TABLE: &'static str = "Bundle";

    /// Configuration for the given table, with both query templates
    /// rendered from it
    pub fn for_table(table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        let load_query = format!(
            "SELECT DISTINCT key, value FROM {table_name} \
             WHERE name = $1 AND language = $2 AND country = $3 AND variant = $4"
        );
        let reload_query = format!("SELECT MAX(last_modified) FROM {table_name} WHERE name = $1");
        Self {
            table_name,
            load_query,
            reload_query,
        }
    }

    /// Replace both query templates wholesale.
    ///
    /// The queries must keep the positional parameter shape: four
    /// parameters for load, one for the reload check.
    #[must_use]
    pub fn with_queries(
        mut self,
        load_query: impl Into<String>,
        reload_query: impl Into<String>,
    ) -> Self {
        self.load_query = load_query.into();
        self.reload_query = reload_query.into();
        self
    }

    /// The configured table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The query used to load a bundle's key/value rows
    pub fn load_query(&self) -> &str {
        &self.load_query
    }

    /// The query used to read the base name's max last-modified
    pub fn reload_query(&self) -> &str {
        &self.reload_query
    }
}

impl Default for SqlLoaderConfig {
    fn default() -> Self {
        Self::for_table(Self::DEFAULT_TABLE)
    }
}

impl<'de> Deserialize<'de> for SqlLoaderConfig {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            table_name: Option<String>,
            load_query: Option<String>,
            reload_query: Option<String>,
        }

        let raw = Raw::deserialize(deserializer)?;

        // Table override rewrites both templates; explicit query
        // overrides then win over the rendered defaults.
        let mut config = match raw.table_name {
            Some(table) => Self::for_table(table),
            None => Self::default(),
        };
        if let Some(load_query) = raw.load_query {
            config.load_query = load_query;
        }
        if let Some(reload_query) = raw.reload_query {
            config.reload_query = reload_query;
        }
        Ok(config)
    }
}
