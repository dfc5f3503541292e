//! Site configuration module.
//!
//! Handles loading, validating, and merging the `config.toml` at the content
//! root. User files are sparse: stock defaults (which describe the Lumalima
//! site as published) are the base layer and the file overrides only what
//! it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Lumalima"
//! tagline = "Illumination Atelier"
//! url = "https://lumalima.com"
//! email = "info@lumalima.com"
//! default_locale = "en"
//!
//! [contact]
//! endpoint = "/api/contact"   # Where the contact form posts
//! recaptcha_site_key = ""     # Public key; RECAPTCHA_SITE_KEY overrides
//!
//! [reveal]
//! complete_delay_ms = 300     # Pause after the last image before revealing
//! content_delay_ms = 100      # Header and title fade in
//! images_delay_ms = 800       # Category cards start revealing
//! stagger_ms = 150            # Extra delay per card
//! label_offset_ms = 300       # Card label follows its image
//! services_stagger_ms = 100   # Services entries reveal on scroll
//!
//! [gallery]
//! visible_items = 3.5         # Tiles visible in a looped gallery strip
//! aspect_ratio = [4, 5]       # Tile width:height
//!
//! [colors]
//! background = "#f5f5f7"
//! text = "#1d1d1f"
//! text_muted = "#6e6e73"
//! border = "#d2d2d7"
//! surface = "#ffffff"
//!
//! [about]
//! image = "assets/about_us.jpg"
//!
//! [[offices]]                 # Repeatable; replaces the stock list entirely
//! name_key = "contact.switzerland"
//! phone = "+41 76 460 86 86"
//! email = "info@lumalima.com"
//! location = ["Kloten", "Switzerland"]
//! image = "assets/zurich_light.jpg"
//!
//! [[team]]                    # Repeatable; text comes from about.<key>.* catalog entries
//! name = "Raquel Contente"
//! key = "raquel"
//! photo = "assets/rc_profile.jpg"
//! paragraphs = ["intro", "experience", "approach"]
//! quotes = ["quote1", "quote2"]
//! linkedin = "https://www.linkedin.com/in/raquel-contente-02a0b3228/"
//! booking_url = "https://calendly.com/lumalima/30min"
//! ```
//!
//! Unknown keys are rejected to catch typos early. Arrays (including
//! `[[offices]]` and `[[team]]`) replace the stock value wholesale.

use crate::i18n::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Identity shown in headers, footer, and emails.
    pub site: SiteIdentity,
    /// Contact form wiring.
    pub contact: ContactConfig,
    /// Staged reveal timeline for the homepage and services page.
    pub reveal: RevealConfig,
    /// Looped gallery strip layout.
    pub gallery: GalleryConfig,
    /// Palette, emitted as CSS custom properties.
    pub colors: ColorConfig,
    /// About page hero image.
    pub about: AboutConfig,
    /// Offices listed on the contact page.
    pub offices: Vec<Office>,
    /// Team members presented on the about page.
    pub team: Vec<TeamMember>,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Locale::parse(&self.site.default_locale).is_none() {
            return Err(ConfigError::Validation(format!(
                "site.default_locale must be one of en, pt, de (got {:?})",
                self.site.default_locale
            )));
        }
        if !(self.gallery.visible_items > 0.0) {
            return Err(ConfigError::Validation(
                "gallery.visible_items must be greater than zero".into(),
            ));
        }
        if self.gallery.aspect_ratio[0] == 0 || self.gallery.aspect_ratio[1] == 0 {
            return Err(ConfigError::Validation(
                "gallery.aspect_ratio values must be non-zero".into(),
            ));
        }
        if !self.contact.endpoint.starts_with('/') && !self.contact.endpoint.starts_with("http") {
            return Err(ConfigError::Validation(
                "contact.endpoint must be an absolute path or URL".into(),
            ));
        }
        if let Some(member) = self.team.iter().find(|m| m.key.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "team member {:?} needs a catalog key",
                member.name
            )));
        }
        Ok(())
    }

    /// The configured default locale. Falls back to English; `validate`
    /// rejects anything unparseable before this is reached.
    pub fn default_locale(&self) -> Locale {
        Locale::parse(&self.site.default_locale).unwrap_or_default()
    }
}

/// Who the site belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteIdentity {
    pub name: String,
    pub tagline: String,
    /// `<meta name="description">` content.
    pub description: String,
    /// Public URL, linked from confirmation emails.
    pub url: String,
    /// Studio mailbox shown on the contact page.
    pub email: String,
    /// Locale pages are pre-rendered in (`en`, `pt` or `de`).
    pub default_locale: String,
}

impl Default for SiteIdentity {
    fn default() -> Self {
        Self {
            name: "Lumalima".to_string(),
            tagline: "Illumination Atelier".to_string(),
            description: "Professional illumination solutions for private, commercial, public and urban spaces".to_string(),
            url: "https://lumalima.com".to_string(),
            email: "info@lumalima.com".to_string(),
            default_locale: "en".to_string(),
        }
    }
}

/// Contact form wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    /// URL the form posts JSON to.
    pub endpoint: String,
    /// Public reCAPTCHA v3 site key. Empty disables the widget script; the
    /// build's `--recaptcha-site-key` flag overrides it.
    pub recaptcha_site_key: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: "/api/contact".to_string(),
            recaptcha_site_key: String::new(),
        }
    }
}

/// Reveal timeline in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    pub complete_delay_ms: u32,
    pub content_delay_ms: u32,
    pub images_delay_ms: u32,
    pub stagger_ms: u32,
    pub label_offset_ms: u32,
    pub services_stagger_ms: u32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            complete_delay_ms: 300,
            content_delay_ms: 100,
            images_delay_ms: 800,
            stagger_ms: 150,
            label_offset_ms: 300,
            services_stagger_ms: 100,
        }
    }
}

/// Looped gallery layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// How many tiles fit the strip width (fractional shows a peek of the next).
    pub visible_items: f64,
    /// Tile aspect ratio as `[width, height]`.
    pub aspect_ratio: [u32; 2],
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            visible_items: 3.5,
            aspect_ratio: [4, 5],
        }
    }
}

/// Site palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub background: String,
    pub text: String,
    /// Subtitles, captions, footer copy.
    pub text_muted: String,
    pub border: String,
    /// Cards and form panels.
    pub surface: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: "#f5f5f7".to_string(),
            text: "#1d1d1f".to_string(),
            text_muted: "#6e6e73".to_string(),
            border: "#d2d2d7".to_string(),
            surface: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AboutConfig {
    /// Hero image, relative to the site root.
    pub image: String,
}

impl Default for AboutConfig {
    fn default() -> Self {
        Self {
            image: "assets/about_us.jpg".to_string(),
        }
    }
}

/// An office card on the contact page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Office {
    /// Catalog key of the office (country) name.
    pub name_key: String,
    pub phone: String,
    pub email: String,
    /// Address lines.
    pub location: Vec<String>,
    /// Photo relative to the site root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A team member on the about page.
///
/// Text comes from the catalog: `about.<key>.role` plus one entry per
/// `paragraphs` and `quotes` suffix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeamMember {
    pub name: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
}

impl TeamMember {
    /// Catalog key for one of this member's text fields.
    pub fn text_key(&self, suffix: &str) -> String {
        format!("about.{}.{}", self.key, suffix)
    }
}

/// The two offices as published.
fn stock_offices() -> Vec<Office> {
    vec![
        Office {
            name_key: "contact.switzerland".to_string(),
            phone: "+41 76 460 86 86".to_string(),
            email: "info@lumalima.com".to_string(),
            location: vec!["Kloten".to_string(), "Switzerland".to_string()],
            image: Some("assets/zurich_light.jpg".to_string()),
        },
        Office {
            name_key: "contact.portugal".to_string(),
            phone: "+41 76 460 86 86".to_string(),
            email: "info@lumalima.com".to_string(),
            location: vec!["Caldas da Rainha".to_string(), "Portugal".to_string()],
            image: Some("assets/lisboa_light.jpg".to_string()),
        },
    ]
}

fn stock_team() -> Vec<TeamMember> {
    vec![
        TeamMember {
            name: "Raquel Contente".to_string(),
            key: "raquel".to_string(),
            photo: Some("assets/rc_profile.jpg".to_string()),
            paragraphs: vec!["intro".into(), "experience".into(), "approach".into()],
            quotes: vec!["quote1".into(), "quote2".into()],
            linkedin: Some("https://www.linkedin.com/in/raquel-contente-02a0b3228/".to_string()),
            booking_url: Some("https://calendly.com/lumalima/30min".to_string()),
        },
        TeamMember {
            name: "Christian Nascimento".to_string(),
            key: "christian".to_string(),
            photo: Some("assets/cn_profile.jpg".to_string()),
            paragraphs: vec!["intro".into(), "experience".into(), "achievements".into()],
            quotes: vec!["quote".into()],
            linkedin: Some("https://www.linkedin.com/in/cristhiannascimento/".to_string()),
            booking_url: None,
        },
    ]
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults including the published offices and team.
pub fn stock_config() -> SiteConfig {
    SiteConfig {
        offices: stock_offices(),
        team: stock_team(),
        ..SiteConfig::default()
    }
}

/// Returns the stock config as a `toml::Value::Table`, the base layer for
/// merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(stock_config()).expect("stock config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root, layered over the
/// stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Lumalima site configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Page copy does not live here: it comes from the translation catalogs,
# keyed by the content folder names (010-housing/ -> "housing.title", ...).

[site]
name = "Lumalima"
tagline = "Illumination Atelier"
description = "Professional illumination solutions for private, commercial, public and urban spaces"
url = "https://lumalima.com"
email = "info@lumalima.com"
# Locale pages are pre-rendered in before the visitor's preference applies.
default_locale = "en"

# ---------------------------------------------------------------------------
# Contact form
# ---------------------------------------------------------------------------
[contact]
# Where the form posts. Point at the deployed `lumalima serve` instance.
endpoint = "/api/contact"
# Public reCAPTCHA v3 site key (the secret stays with the service).
# `lumalima build --recaptcha-site-key` or RECAPTCHA_SITE_KEY override this.
recaptcha_site_key = ""

# ---------------------------------------------------------------------------
# Reveal timeline (milliseconds)
# ---------------------------------------------------------------------------
[reveal]
complete_delay_ms = 300
content_delay_ms = 100
images_delay_ms = 800
stagger_ms = 150
label_offset_ms = 300
services_stagger_ms = 100

# ---------------------------------------------------------------------------
# Looped galleries
# ---------------------------------------------------------------------------
[gallery]
visible_items = 3.5
aspect_ratio = [4, 5]

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
background = "#f5f5f7"
text = "#1d1d1f"
text_muted = "#6e6e73"
border = "#d2d2d7"
surface = "#ffffff"

[about]
image = "assets/about_us.jpg"

# ---------------------------------------------------------------------------
# Offices (contact page). Listing any replaces the whole stock list.
# ---------------------------------------------------------------------------
[[offices]]
name_key = "contact.switzerland"
phone = "+41 76 460 86 86"
email = "info@lumalima.com"
location = ["Kloten", "Switzerland"]
image = "assets/zurich_light.jpg"

[[offices]]
name_key = "contact.portugal"
phone = "+41 76 460 86 86"
email = "info@lumalima.com"
location = ["Caldas da Rainha", "Portugal"]
image = "assets/lisboa_light.jpg"

# ---------------------------------------------------------------------------
# Team (about page). Text comes from about.<key>.<suffix> catalog entries.
# ---------------------------------------------------------------------------
[[team]]
name = "Raquel Contente"
key = "raquel"
photo = "assets/rc_profile.jpg"
paragraphs = ["intro", "experience", "approach"]
quotes = ["quote1", "quote2"]
linkedin = "https://www.linkedin.com/in/raquel-contente-02a0b3228/"
booking_url = "https://calendly.com/lumalima/30min"

[[team]]
name = "Christian Nascimento"
key = "christian"
photo = "assets/cn_profile.jpg"
paragraphs = ["intro", "experience", "achievements"]
quotes = ["quote"]
linkedin = "https://www.linkedin.com/in/cristhiannascimento/"
"##
}

/// Generate CSS custom properties from the palette and gallery layout.
pub fn generate_theme_css(colors: &ColorConfig, gallery: &GalleryConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {background};
    --color-text: {text};
    --color-text-muted: {text_muted};
    --color-border: {border};
    --color-surface: {surface};
    --gallery-visible: {visible};
    --gallery-aspect: {aw} / {ah};
}}"#,
        background = colors.background,
        text = colors.text,
        text_muted = colors.text_muted,
        border = colors.border,
        surface = colors.surface,
        visible = gallery.visible_items,
        aw = gallery.aspect_ratio[0],
        ah = gallery.aspect_ratio[1],
    )
}
