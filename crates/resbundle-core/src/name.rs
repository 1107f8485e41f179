//! Bundle name parsing and candidate generation

use crate::locale::BundleLocale;
use resbundle_common::{BundleError, Result};

/// A composite bundle identifier split into its components.
///
/// A full bundle name like `ButtonLabel_fr_CA_UNIX` carries the base
/// name plus up to three locale components joined by `_`. Components
/// past the fourth segment are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleName {
    base: String,
    language: String,
    country: String,
    variant: String,
}

impl BundleName {
    /// Parse a composite bundle identifier.
    ///
    /// The first segment is the base name; segments two to four map to
    /// language, country and variant, defaulting to `""` when absent.
    /// No validation of character sets is performed. An empty input is
    /// rejected.
    pub fn parse(bundle_name: &str) -> Result<Self> {
        if bundle_name.is_empty() {
            return Err(BundleError::invalid_argument("bundle name is empty"));
        }

        let mut segments = bundle_name.split('_');
        Ok(Self {
            base: segments.next().unwrap_or("").to_string(),
            language: segments.next().unwrap_or("").to_string(),
            country: segments.next().unwrap_or("").to_string(),
            variant: segments.next().unwrap_or("").to_string(),
        })
    }

    /// Base name (first segment)
    pub fn base(&self) -> &str {
        &self.base
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

    /// The locale part of this name
    pub fn locale(&self) -> BundleLocale {
        BundleLocale::new(
            self.language.clone(),
            self.country.clone(),
            self.variant.clone(),
        )
    }
}

/// Build the fully qualified bundle name for a base name and locale.
///
/// The base name is joined with the non-empty locale components in
/// language, country, variant order, mirroring standard resource
/// bundle naming.
pub fn full_name(base_name: &str, locale: &BundleLocale) -> String {
    let components = locale.components();
    if components.is_empty() {
        return base_name.to_string();
    }
    format!("{}_{}", base_name, components.join("_"))
}

/// Ordered candidate names for a resolution request, most specific
/// first.
///
/// Generated by progressively dropping trailing locale components from
/// the fully qualified name. The list never contains duplicates and
/// always ends with the bare base name.
pub fn candidate_names(base_name: &str, locale: &BundleLocale) -> Vec<String> {
    let components = locale.components();
    let mut candidates = Vec::with_capacity(components.len() + 1);

    for end in (0..=components.len()).rev() {
        if end == 0 {
            candidates.push(base_name.to_string());
        } else {
            candidates.push(format!("{}_{}", base_name, components[..end].join("_")));
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_full_name() {
        let name = BundleName::parse("ButtonLabel_fr_CA_UNIX").unwrap();
        assert_eq!(name.base(), "ButtonLabel");
        assert_eq!(name.language(), "fr");
        assert_eq!(name.country(), "CA");
        assert_eq!(name.variant(), "UNIX");
    }

    #[test]
    fn parse_partial_names() {
        let name = BundleName::parse("Msg").unwrap();
        assert_eq!(name.base(), "Msg");
        assert_eq!(name.language(), "");
        assert_eq!(name.country(), "");
        assert_eq!(name.variant(), "");

        let name = BundleName::parse("Msg_fr").unwrap();
        assert_eq!(name.language(), "fr");
        assert_eq!(name.country(), "");
    }

    #[test]
    fn parse_ignores_extra_segments() {
        let name = BundleName::parse("Msg_fr_CA_X_extra_more").unwrap();
        assert_eq!(name.variant(), "X");
    }

    #[test]
    fn parse_rejects_empty_input() {
        let err = BundleName::parse("").unwrap_err();
        assert!(matches!(
            err,
            resbundle_common::BundleError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn candidates_most_specific_first() {
        let locale = BundleLocale::new("fr", "CA", "X");
        assert_eq!(
            candidate_names("Msg", &locale),
            vec!["Msg_fr_CA_X", "Msg_fr_CA", "Msg_fr", "Msg"]
        );
    }

    #[test]
    fn candidates_skip_empty_components() {
        let locale = BundleLocale::new("fr", "", "X");
        assert_eq!(
            candidate_names("Msg", &locale),
            vec!["Msg_fr_X", "Msg_fr", "Msg"]
        );

        let locale = BundleLocale::new("fr", "", "");
        assert_eq!(candidate_names("Msg", &locale), vec!["Msg_fr", "Msg"]);
    }

    #[test]
    fn candidates_for_root_locale() {
        assert_eq!(candidate_names("Msg", &BundleLocale::root()), vec!["Msg"]);
    }

    #[test]
    fn full_name_matches_first_candidate() {
        let locale = BundleLocale::new("fr", "CA", "X");
        assert_eq!(full_name("Msg", &locale), "Msg_fr_CA_X");
        assert_eq!(full_name("Msg", &BundleLocale::root()), "Msg");
    }

    proptest! {
        /// For any identifier with N underscore-separated segments the
        /// parse yields segment 0 as the base and each optional
        /// component equal to its segment when present, else "".
        #[test]
        fn parse_maps_segments(segments in prop::collection::vec("[a-zA-Z0-9]{0,6}", 1..7)) {
            let input = segments.join("_");
            prop_assume!(!input.is_empty());

            let name = BundleName::parse(&input).unwrap();
            let get = |i: usize| segments.get(i).map(String::as_str).unwrap_or("");

            prop_assert_eq!(name.base(), get(0));
            prop_assert_eq!(name.language(), get(1));
            prop_assert_eq!(name.country(), get(2));
            prop_assert_eq!(name.variant(), get(3));
        }

        /// Candidate lists never contain duplicates and always end
        /// with the bare base name.
        #[test]
        fn candidates_unique_and_end_with_base(
            base in "[a-zA-Z][a-zA-Z0-9]{0,8}",
            language in "[a-z]{0,3}",
            country in "[A-Z]{0,3}",
            variant in "[a-zA-Z]{0,4}",
        ) {
            let locale = BundleLocale::new(language, country, variant);
            let candidates = candidate_names(&base, &locale);

            prop_assert_eq!(candidates.last().map(String::as_str), Some(base.as_str()));
            let mut seen = std::collections::HashSet::new();
            for candidate in &candidates {
                prop_assert!(seen.insert(candidate.clone()));
            }
        }
    }
}
