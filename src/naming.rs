//! Entry-name parsing for the content directory.
//!
//! Categories, galleries, gallery images and services all share one naming
//! pattern: an optional numeric prefix (`NNN-`) followed by a name. The
//! prefix orders entries; the name becomes the entry's **slug**, which is
//! both its URL and the stem of its translation keys:
//!
//! ```text
//! 010-housing/            → slug "housing",      keys "category.housing", "housing.title", …
//! 010-housing/020-gardens → slug "gardens",      keys "housing.gardens", "housing.gardens.desc"
//! services/030-Installation.jpg → slug "installation", keys "services.installation", …
//! 7.jpg                   → number 7, no slug (gallery images are anonymous)
//! ```
//!
//! Slugs are lower-cased so `020-Comercial` and `020-comercial` address the
//! same catalog entries.

/// Result of parsing a numbered entry name like `020-Comercial-Spaces`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `20` from `020-Comercial-Spaces`)
    pub number: Option<u32>,
    /// Lower-cased name after `NNN-`, dashes preserved. Empty if number-only.
    pub slug: String,
    /// Name with dashes converted to spaces, original casing kept.
    /// Only used when a translation is missing from every catalog.
    pub display_title: String,
}

impl ParsedName {
    /// Numbered entries sort by their number; unnumbered ones go last.
    pub fn sort_key(&self) -> u32 {
        self.number.unwrap_or(u32::MAX)
    }
}

/// Parse an entry name following the `NNN-name` convention.
///
/// - `"010-housing"` → number=Some(10), slug="housing"
/// - `"020-Comercial-Spaces"` → number=Some(20), slug="comercial-spaces", display_title="Comercial Spaces"
/// - `"12"` → number=Some(12), slug=""
/// - `"services"` → number=None, slug="services"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, rest)) = name.split_once('-')
        && let Ok(num) = prefix.parse::<u32>()
    {
        return named(Some(num), rest);
    }
    if let Ok(num) = name.parse::<u32>() {
        return named(Some(num), "");
    }
    named(None, name)
}

fn named(number: Option<u32>, raw: &str) -> ParsedName {
    ParsedName {
        number,
        slug: raw.to_lowercase(),
        display_title: raw.replace('-', " "),
    }
}

/// Translation key prefix for a gallery inside a category: `housing.gardens`.
pub fn gallery_key(category: &str, gallery: &str) -> String {
    format!("{category}.{gallery}")
}
