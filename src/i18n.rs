//! Locales and translation lookup.
//!
//! The site speaks three languages. Every translatable string lives in a flat
//! key → text catalog per locale (`locales/{en,pt,de}.toml`, compiled into
//! the binary). The same catalog serves two consumers:
//!
//! - the generator, which pre-renders pages in the default locale and embeds
//!   the full table so the browser-side switcher can swap languages without
//!   a page load;
//! - the contact service, which localizes the confirmation email.
//!
//! ## Fallback
//!
//! Lookups never fail. A key missing (or empty) in the requested locale
//! falls back to English, and a key missing from English falls back to the
//! key itself. `lumalima check` reports the gaps via [`Catalog::missing_keys`].
//!
//! ## Preference resolution
//!
//! The visitor's choice is kept in browser storage under [`STORAGE_KEY`].
//! [`Locale::detect`] is the reference for what `site.js` does at startup:
//! a valid stored value wins, then the browser language prefix, then English.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Browser storage key holding the visitor's locale preference.
pub const STORAGE_KEY: &str = "lumalima-language";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog for {locale} is not valid TOML: {source}")]
    Parse {
        locale: Locale,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown locale: {0}")]
    UnknownLocale(String),
}

/// A supported display language.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Pt,
    De,
}

impl Locale {
    /// All locales in switcher order.
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Pt, Locale::De];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pt => "pt",
            Self::De => "de",
        }
    }

    /// Name of the language in that language, as shown in the switcher.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Pt => "Português",
            Self::De => "Deutsch",
        }
    }

    pub const fn flag(self) -> &'static str {
        match self {
            Self::En => "🇬🇧",
            Self::Pt => "🇵🇹",
            Self::De => "🇩🇪",
        }
    }

    /// Parse a locale code, case-insensitive and tolerant of region tags
    /// (`pt-BR`, `de_CH`).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "pt" => Some(Self::Pt),
            "de" => Some(Self::De),
            _ => None,
        }
    }

    /// Resolve the startup locale from a stored preference and the
    /// browser's reported language.
    ///
    /// The stored value must be an exact code (`en`, `pt`, `de`); anything
    /// else is ignored and detection falls through to the browser language,
    /// which only needs the right prefix (`pt-PT`, `de-AT`).
    pub fn detect(stored: Option<&str>, browser_language: &str) -> Self {
        if let Some(saved) = stored
            && let Some(locale) = Self::ALL.into_iter().find(|l| l.as_str() == saved)
        {
            return locale;
        }
        let browser = browser_language.to_lowercase();
        if browser.starts_with("pt") {
            Self::Pt
        } else if browser.starts_with("de") {
            Self::De
        } else {
            Self::En
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CatalogError::UnknownLocale(s.to_string()))
    }
}

const EN: &str = include_str!("../locales/en.toml");
const PT: &str = include_str!("../locales/pt.toml");
const DE: &str = include_str!("../locales/de.toml");

/// Result of [`Catalog::coverage`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coverage {
    pub missing: Vec<(Locale, Vec<String>)>,
    /// Referenced by content, absent from English. These render their
    /// folder-derived fallback in every locale.
    pub undefined: Vec<String>,
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.undefined.is_empty() && self.missing.iter().all(|(_, keys)| keys.is_empty())
    }
}

/// Translation tables for every locale.
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: BTreeMap<Locale, BTreeMap<String, String>>,
}

impl Catalog {
    /// The catalogs compiled into the binary.
    pub fn builtin() -> &'static Catalog {
        static BUILTIN: OnceLock<Catalog> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Catalog::from_sources(&[(Locale::En, EN), (Locale::Pt, PT), (Locale::De, DE)])
                .expect("bundled catalogs must parse")
        })
    }

    /// Build a catalog from TOML sources, one per locale.
    pub fn from_sources(sources: &[(Locale, &str)]) -> Result<Self, CatalogError> {
        let mut tables = BTreeMap::new();
        for (locale, source) in sources {
            let table: BTreeMap<String, String> = toml::from_str(source)
                .map_err(|source| CatalogError::Parse {
                    locale: *locale,
                    source,
                })?;
            tables.insert(*locale, table);
        }
        Ok(Self { tables })
    }

    fn entry(&self, locale: Locale, key: &str) -> Option<&str> {
        self.tables
            .get(&locale)
            .and_then(|t| t.get(key))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Look up `key` in `locale`, falling back to English.
    pub fn lookup(&self, locale: Locale, key: &str) -> Option<&str> {
        self.entry(locale, key).or_else(|| self.entry(Locale::En, key))
    }

    /// Translate `key`, falling back to English and then to the key itself.
    pub fn t<'a>(&'a self, locale: Locale, key: &'a str) -> &'a str {
        self.lookup(locale, key).unwrap_or(key)
    }

    /// Translate `key`, falling back to English and then to `fallback`.
    ///
    /// Used for content-derived keys, where the folder name makes a better
    /// last resort than the raw key.
    pub fn t_or<'a>(&'a self, locale: Locale, key: &str, fallback: &'a str) -> &'a str {
        self.lookup(locale, key).unwrap_or(fallback)
    }

    /// Whether `key` exists in the English table.
    pub fn contains(&self, key: &str) -> bool {
        self.entry(Locale::En, key).is_some()
    }

    /// English keys that `locale` does not translate (they fall back).
    pub fn missing_keys(&self, locale: Locale) -> Vec<&str> {
        let Some(english) = self.tables.get(&Locale::En) else {
            return Vec::new();
        };
        english
            .iter()
            .filter(|(key, text)| !text.is_empty() && self.entry(locale, key).is_none())
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Gaps across all catalogs: untranslated keys per non-English locale,
    /// and content keys English does not define.
    pub fn coverage(&self, content_keys: &[String]) -> Coverage {
        let missing = Locale::ALL
            .into_iter()
            .filter(|l| *l != Locale::En)
            .map(|l| (l, self.missing_keys(l).into_iter().map(String::from).collect()))
            .collect();
        let mut undefined: Vec<String> = content_keys
            .iter()
            .filter(|k| !self.contains(k))
            .cloned()
            .collect();
        undefined.sort();
        undefined.dedup();
        Coverage { missing, undefined }
    }

    /// The full table as `{ "en": { key: text }, … }` for the browser.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .tables
            .iter()
            .map(|(locale, table)| {
                (
                    locale.as_str().to_string(),
                    serde_json::to_value(table).unwrap_or_default(),
                )
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> Catalog {
        Catalog::from_sources(&[
            (
                Locale::En,
                r#"
"nav.about" = "About"
"footer.rights" = "All rights reserved."
"empty.key" = ""
"#,
            ),
            (Locale::Pt, r#""nav.about" = "Sobre""#),
            (Locale::De, r#""nav.about" = """#),
        ])
        .unwrap()
    }

    #[test]
    fn parse_accepts_region_tags() {
        assert_eq!(Locale::parse("pt-BR"), Some(Locale::Pt));
        assert_eq!(Locale::parse("DE_ch"), Some(Locale::De));
        assert_eq!(Locale::parse(" en "), Some(Locale::En));
        assert_eq!(Locale::parse("fr"), None);
        assert_eq!(Locale::parse(""), None);
    }

    #[test]
    fn detect_prefers_stored_value() {
        assert_eq!(Locale::detect(Some("de"), "pt-PT"), Locale::De);
    }

    #[test]
    fn detect_ignores_invalid_stored_value() {
        assert_eq!(Locale::detect(Some("fr"), "pt-PT"), Locale::Pt);
        assert_eq!(Locale::detect(Some("PT"), "en-US"), Locale::En);
    }

    #[test]
    fn detect_uses_browser_prefix() {
        assert_eq!(Locale::detect(None, "de-AT"), Locale::De);
        assert_eq!(Locale::detect(None, "PT"), Locale::Pt);
        assert_eq!(Locale::detect(None, "fr-FR"), Locale::En);
        assert_eq!(Locale::detect(None, ""), Locale::En);
    }

    #[test]
    fn lookup_falls_back_to_english() {
        let c = small_catalog();
        assert_eq!(c.t(Locale::Pt, "nav.about"), "Sobre");
        assert_eq!(c.t(Locale::Pt, "footer.rights"), "All rights reserved.");
    }

    #[test]
    fn empty_translation_counts_as_missing() {
        let c = small_catalog();
        assert_eq!(c.t(Locale::De, "nav.about"), "About");
        assert_eq!(c.t(Locale::En, "empty.key"), "empty.key");
    }

    #[test]
    fn unknown_key_returns_key() {
        let c = small_catalog();
        assert_eq!(c.t(Locale::De, "nav.nowhere"), "nav.nowhere");
        assert_eq!(c.t_or(Locale::De, "nav.nowhere", "Nowhere"), "Nowhere");
    }

    #[test]
    fn missing_keys_lists_untranslated() {
        let c = small_catalog();
        assert_eq!(c.missing_keys(Locale::Pt), vec!["footer.rights"]);
        assert_eq!(c.missing_keys(Locale::De), vec!["footer.rights", "nav.about"]);
    }

    #[test]
    fn to_json_nests_by_locale() {
        let json = small_catalog().to_json();
        assert_eq!(json["pt"]["nav.about"], "Sobre");
        assert_eq!(json["en"]["footer.rights"], "All rights reserved.");
    }

    #[test]
    fn bundled_catalogs_parse_and_cover_core_keys() {
        let c = Catalog::builtin();
        for locale in Locale::ALL {
            for key in ["nav.about", "home.loading", "email.confirmation.subject"] {
                assert_ne!(c.t(locale, key), key, "{locale} lacks {key}");
            }
        }
        assert_eq!(c.t(Locale::De, "category.comercial"), "Gewerbe");
    }

    #[test]
    fn bundled_portuguese_falls_back_for_fourth_about_paragraph() {
        let c = Catalog::builtin();
        assert!(c.missing_keys(Locale::Pt).contains(&"about.description4"));
        assert_eq!(
            c.t(Locale::Pt, "about.description4"),
            c.t(Locale::En, "about.description4")
        );
    }

    #[test]
    fn coverage_reports_both_gap_kinds() {
        let c = small_catalog();
        let coverage = c.coverage(&["nav.about".to_string(), "housing.gardens".to_string()]);
        assert_eq!(
            coverage.missing,
            vec![
                (Locale::Pt, vec!["footer.rights".to_string()]),
                (Locale::De, vec!["footer.rights".to_string(), "nav.about".to_string()]),
            ]
        );
        assert_eq!(coverage.undefined, vec!["housing.gardens"]);
        assert!(!coverage.is_complete());
    }
}
