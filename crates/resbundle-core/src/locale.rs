//! Locale value type used for bundle resolution

use resbundle_common::BundleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A locale as used for bundle naming: language, country and variant.
///
/// Components are carried exactly as supplied by the caller; the core
/// performs no case normalization or validation of character sets.
/// Missing components are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleLocale {
    language: String,
    country: String,
    variant: String,
}

impl BundleLocale {
    /// Create a locale from language, country and variant components
    pub fn new(
        language: impl Into<String>,
        country: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            country: country.into(),
            variant: variant.into(),
        }
    }

    /// The root locale: all components empty
    pub fn root() -> Self {
        Self::default()
    }

    /// Language component, or `""` when absent
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Country component, or `""` when absent
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Variant component, or `""` when absent
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// True if all components are empty
    pub fn is_root(&self) -> bool {
        self.language.is_empty() && self.country.is_empty() && self.variant.is_empty()
    }

    /// The non-empty components in language, country, variant order
    pub(crate) fn components(&self) -> Vec<&str> {
        [
            self.language.as_str(),
            self.country.as_str(),
            self.variant.as_str(),
        ]
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect()
    }
}

impl fmt::Display for BundleLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components().join("_"))
    }
}

impl FromStr for BundleLocale {
    type Err = BundleError;

    /// Parse a locale from the `fr_CA_UNIX` shape.
    ///
    /// Segments beyond the third are ignored; an empty string is the
    /// root locale.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('_');
        Ok(Self {
            language: segments.next().unwrap_or("").to_string(),
            country: segments.next().unwrap_or("").to_string(),
            variant: segments.next().unwrap_or("").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_display_joins_non_empty_components() {
        assert_eq!(BundleLocale::new("fr", "CA", "X").to_string(), "fr_CA_X");
        assert_eq!(BundleLocale::new("fr", "", "").to_string(), "fr");
        assert_eq!(BundleLocale::new("fr", "", "X").to_string(), "fr_X");
        assert_eq!(BundleLocale::root().to_string(), "");
    }

    #[test]
    fn locale_from_str() {
        let locale: BundleLocale = "fr_CA_UNIX".parse().unwrap();
        assert_eq!(locale.language(), "fr");
        assert_eq!(locale.country(), "CA");
        assert_eq!(locale.variant(), "UNIX");

        let bare: BundleLocale = "de".parse().unwrap();
        assert_eq!(bare.language(), "de");
        assert_eq!(bare.country(), "");
        assert_eq!(bare.variant(), "");

        let root: BundleLocale = "".parse().unwrap();
        assert!(root.is_root());
    }

    #[test]
    fn locale_components_preserve_case() {
        let locale = BundleLocale::new("FR", "ca", "Unix");
        assert_eq!(locale.language(), "FR");
        assert_eq!(locale.country(), "ca");
        assert_eq!(locale.variant(), "Unix");
    }
}
