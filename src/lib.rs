//! # Lumalima
//!
//! The web presence of the Lumalima illumination atelier: a multilingual
//! static site built from a content directory, and the small service behind
//! its contact form.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! The site is built in three independent stages, each producing a JSON
//! manifest that the next stage consumes:
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (filesystem → structured data)
//! 2. Preload   manifest  →  preloaded.json   (every image read, dimensions recorded)
//! 3. Generate  manifest  →  dist/            (final HTML site + bundles)
//! ```
//!
//! Each manifest is human-readable JSON you can inspect, and each stage can be
//! run on its own from the CLI.
//!
//! At runtime the generated pages carry `site.js`, the browser-side twin of
//! [`preload`], [`reveal`], [`gallery`] and [`i18n`]: it runs the homepage
//! preloader and reveal sequence, the looped galleries and the language
//! switcher. The [`contact`] service is a separate long-running process.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the content directory, produces the scan manifest |
//! | [`preload`] | Stage 2: deduplicated, prioritized concurrent image loading with progress observers |
//! | [`generate`] | Stage 3: renders the pages with Maud, fingerprints the bundles |
//! | [`i18n`] | Locales, preference resolution and the translation catalogs |
//! | [`reveal`] | Homepage and services reveal timeline |
//! | [`gallery`] | Looped gallery strip arithmetic |
//! | [`contact`] | axum service: reCAPTCHA verification and email via Resend |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Shared types serialized between stages |
//! | [`naming`] | `NNN-name` folder convention parser |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## Flat, Relative Output
//!
//! Every page sits at the site root and links relatively. The output can be
//! served from any path, any static host, or opened straight from disk.
//!
//! ## One Catalog, Two Consumers
//!
//! The en/pt/de catalogs are compiled into the binary. The generator
//! pre-renders pages in the default locale and embeds the full table for the
//! browser; the contact service localizes the confirmation email from the
//! same table, so the two can never drift apart.
//!
//! ## Dimensions at Build Time
//!
//! Stage 2 reads every image the site references. Pages are emitted with
//! `width`/`height` attributes so nothing shifts as images arrive, and an
//! image that cannot be read is rendered in its "unavailable" state instead
//! of failing the build.
//!
//! ## NNN-Prefix Ordering
//!
//! Folders and files use a numeric prefix (`010-`, `020-`, etc.) for explicit
//! ordering, parsed by [`naming::parse_entry_name`]. The filesystem is the
//! source of truth; no database, no front-matter, no separate ordering file.

pub mod config;
pub mod contact;
pub mod gallery;
pub mod generate;
pub mod i18n;
pub mod naming;
pub mod output;
pub mod preload;
pub mod reveal;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
