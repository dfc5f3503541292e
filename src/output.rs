//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (category, gallery, service, page) is its semantic
//! identity: positional index and title. Filesystem paths are secondary
//! context on indented `Source:` lines, so the output reads as a content
//! inventory while still tracing back to specific files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Categories
//! 001 housing (3 photos)
//!     Source: 010-housing/
//!     001 residential (2 photos)
//!     002 gardens (1 photo)
//!
//! Services
//! 001 design
//!     Source: services/010-design.jpg
//!
//! Pages
//! 001 Privacy Policy
//!     Source: privacy.md
//!
//! Config
//!     config.toml
//!     assets/
//! ```
//!
//! ## Preload
//!
//! ```text
//!     assets/housing.jpg 1200x800
//!     assets/gallery/housing/gardens/1.jpg FAILED: not found: …
//! Loaded 9 images, 1 failed
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! About → about.html
//!
//! Categories
//! 001 Housing → housing.html
//!
//! Pages
//! 001 Privacy Policy → privacy.html
//!
//! Bundles
//!     style.1f2e3d4c.css
//!
//! Generated 8 pages, 3 bundles, 15 assets
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::{Generated, PageKind};
use crate::i18n::Coverage;
use crate::preload::{PreloadEvent, PreloadedManifest};
use crate::scan::Manifest;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn photos(n: usize) -> String {
    if n == 1 {
        "1 photo".to_string()
    } else {
        format!("{} photos", n)
    }
}

/// Format an entity header: positional index + title, with optional count.
///
/// ```text
/// 001 Housing (3 photos)
/// 002 Consultation
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, photos(n)),
        None => format!("{} {}", format_index(index), title),
    }
}

fn section(lines: &mut Vec<String>, title: &str) {
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(title.to_string());
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the discovered content.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    section(&mut lines, "Categories");
    for (i, category) in manifest.categories.iter().enumerate() {
        let count = category.galleries.iter().map(|g| g.images.len()).sum();
        lines.push(entity_header(i + 1, &category.title, Some(count)));
        lines.push(format!("{}Source: {}/", indent(1), category.source_dir));
        for (j, gallery) in category.galleries.iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(j + 1, &gallery.title, Some(gallery.images.len()))
            ));
        }
    }

    if !manifest.services.is_empty() {
        section(&mut lines, "Services");
        for (i, service) in manifest.services.iter().enumerate() {
            lines.push(entity_header(i + 1, &service.title, None));
            lines.push(format!("{}Source: {}", indent(1), service.image.source_path));
        }
    }

    if !manifest.pages.is_empty() {
        section(&mut lines, "Pages");
        for (i, page) in manifest.pages.iter().enumerate() {
            lines.push(entity_header(i + 1, &page.title, None));
            lines.push(format!("{}Source: {}.md", indent(1), page.slug));
        }
    }

    section(&mut lines, "Config");
    if source_root.join("config.toml").exists() {
        lines.push(format!("{}config.toml", indent(1)));
    }
    if source_root.join("assets").is_dir() {
        lines.push(format!("{}assets/", indent(1)));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Preload output
// ============================================================================

/// Format a single preload completion as a display line.
pub fn format_preload_event(event: &PreloadEvent) -> String {
    match event {
        PreloadEvent::Loaded { url, dimensions } => {
            format!("{}{} {}x{}", indent(1), url, dimensions.width, dimensions.height)
        }
        PreloadEvent::Failed { url, error } => {
            format!("{}{} FAILED: {}", indent(1), url, error)
        }
    }
}

/// Format the preload totals, followed by one warning per failed image.
pub fn format_preload_summary(preloaded: &PreloadedManifest) -> Vec<String> {
    let failures: Vec<(&str, &str)> = preloaded.failures().collect();
    let loaded = preloaded.assets.len() - failures.len();
    let mut lines = vec![format!(
        "Loaded {} images, {} failed",
        loaded,
        failures.len()
    )];
    for (url, error) in failures {
        lines.push(format!(
            "{}Warning: {} will show as unavailable ({})",
            indent(1),
            url,
            error
        ));
    }
    lines
}

/// Print preload summary to stdout.
pub fn print_preload_summary(preloaded: &PreloadedManifest) {
    for line in format_preload_summary(preloaded) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 3: Generate output
// ============================================================================

/// Format generate stage output showing the written files.
///
/// Each entity leads with its title, followed by `→` and the output file.
pub fn format_generate_output(generated: &Generated) -> Vec<String> {
    let mut lines = Vec::new();

    let of_kind = |kind: PageKind| generated.pages.iter().filter(move |p| p.kind == kind);

    for page in of_kind(PageKind::Site) {
        lines.push(format!("{} \u{2192} {}", page.title, page.file));
    }

    let categories: Vec<_> = of_kind(PageKind::Category).collect();
    if !categories.is_empty() {
        section(&mut lines, "Categories");
        for (i, page) in categories.iter().enumerate() {
            lines.push(format!("{} \u{2192} {}", entity_header(i + 1, &page.title, None), page.file));
        }
    }

    let legal: Vec<_> = of_kind(PageKind::Legal).collect();
    if !legal.is_empty() {
        section(&mut lines, "Pages");
        for (i, page) in legal.iter().enumerate() {
            lines.push(format!("{} \u{2192} {}", entity_header(i + 1, &page.title, None), page.file));
        }
    }

    section(&mut lines, "Bundles");
    for bundle in &generated.bundles {
        lines.push(format!("{}{}", indent(1), bundle));
    }

    if !generated.unavailable.is_empty() {
        section(&mut lines, "Unavailable images");
        for url in &generated.unavailable {
            lines.push(format!("{}{}", indent(1), url));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} pages, {} bundles, {} assets",
        generated.pages.len(),
        generated.bundles.len(),
        generated.assets_copied
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(generated: &Generated) {
    for line in format_generate_output(generated) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format translation coverage: untranslated keys per locale, then content
/// keys with no English text.
pub fn format_check_output(coverage: &Coverage) -> Vec<String> {
    let mut lines = Vec::new();

    for (locale, keys) in &coverage.missing {
        if keys.is_empty() {
            lines.push(format!("{} ({}): complete", locale.display_name(), locale));
            continue;
        }
        lines.push(format!(
            "{} ({}): {} untranslated, falls back to English",
            locale.display_name(),
            locale,
            keys.len()
        ));
        for key in keys {
            lines.push(format!("{}{}", indent(1), key));
        }
    }

    if !coverage.undefined.is_empty() {
        section(&mut lines, "Content keys without English text");
        for key in &coverage.undefined {
            lines.push(format!("{}{}", indent(1), key));
        }
    }

    lines
}

/// Print check output to stdout.
pub fn print_check_output(coverage: &Coverage) {
    for line in format_check_output(coverage) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
