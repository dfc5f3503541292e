//! Filesystem scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Walks the content directory to discover
//! project categories, their galleries, the services and the legal pages,
//! producing a structured manifest that subsequent stages consume.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Content root
//! ├── config.toml                  # Site configuration (optional)
//! ├── assets/                      # Copied verbatim (portraits, office photos, favicon)
//! ├── privacy.md                   # Legal page, linked from the footer
//! ├── terms.md
//! ├── services/
//! │   ├── 010-design.jpg           # One image per service, slug "design"
//! │   └── 020-consultation.jpg
//! ├── 010-housing/                 # Category (number = order on the homepage)
//! │   ├── main.jpg                 # Card image
//! │   ├── 010-residential/         # Gallery
//! │   │   ├── 1.jpg                # Ordered by number
//! │   │   └── 2.jpg
//! │   └── 020-gardens/
//! │       └── 1.jpg
//! └── 020-comercial/
//!     └── …
//! ```
//!
//! ## Naming Conventions
//!
//! Every entry follows `NNN-name` (see [`crate::naming`]). The number orders
//! it; the lower-cased name is its slug, which names its page and its
//! translation keys. Unnumbered entries are kept but sort last.
//!
//! ## Validation
//!
//! The scanner enforces these rules:
//! - Every category has a `main.*` card image
//! - A category holds no images besides `main.*` (gallery images go in galleries)
//! - Every gallery has at least one image
//! - No duplicate image numbers within a gallery
//! - No two categories, galleries of one category, or services share a slug

use crate::config::{self, SiteConfig};
use crate::naming::parse_entry_name;
use crate::types::{Asset, Category, Gallery, GalleryImage, Page, Service};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("No card image (main.*) found in category: {0}")]
    MissingCover(PathBuf),
    #[error("Category holds images outside a gallery: {0}")]
    LooseImage(PathBuf),
    #[error("Gallery has no images: {0}")]
    EmptyGallery(PathBuf),
    #[error("Duplicate image number {0} in {1}")]
    DuplicateNumber(u32, PathBuf),
    #[error("Duplicate slug '{0}' in {1}")]
    DuplicateSlug(String, PathBuf),
    #[error("Entry has no name after its number: {0}")]
    Unnamed(PathBuf),
}

/// Manifest output from the scan stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<Page>,
    pub config: SiteConfig,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Root entries that are not categories.
const RESERVED_DIRS: &[&str] = &["assets", "services", "dist"];

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let mut categories = Vec::new();
    let mut services = Vec::new();

    for entry in collect_entries(root)? {
        if !entry.is_dir() {
            continue;
        }
        let name = file_name(&entry);
        if name == "services" {
            services = scan_services(&entry, root)?;
        } else if !RESERVED_DIRS.contains(&name.as_str()) {
            categories.push(scan_category(&entry, root)?);
        }
    }

    categories.sort_by(|a, b| (a.sort_key, &a.slug).cmp(&(b.sort_key, &b.slug)));
    ensure_unique(categories.iter().map(|c| c.slug.as_str()), root)?;

    let pages = parse_pages(root)?;

    // Load site config (uses defaults if config.toml doesn't exist)
    let config = config::load_config(root)?;

    Ok(Manifest {
        categories,
        services,
        pages,
        config,
    })
}

fn scan_category(path: &Path, root: &Path) -> Result<Category, ScanError> {
    let parsed = parse_entry_name(&file_name(path));
    if parsed.slug.is_empty() {
        return Err(ScanError::Unnamed(path.to_path_buf()));
    }

    let mut cover = None;
    let mut galleries = Vec::new();
    for entry in collect_entries(path)? {
        if entry.is_dir() {
            galleries.push(scan_gallery(&entry, root, &parsed.slug)?);
        } else if is_image(&entry) {
            if stem(&entry).eq_ignore_ascii_case("main") {
                cover = Some(entry);
            } else {
                return Err(ScanError::LooseImage(entry));
            }
        }
    }

    let cover = cover.ok_or_else(|| ScanError::MissingCover(path.to_path_buf()))?;
    galleries.sort_by(|a, b| (a.sort_key, &a.slug).cmp(&(b.sort_key, &b.slug)));
    ensure_unique(galleries.iter().map(|g| g.slug.as_str()), path)?;

    Ok(Category {
        cover: Asset {
            url: format!("assets/{}.{}", parsed.slug, extension(&cover)),
            source_path: relative(&cover, root),
        },
        slug: parsed.slug,
        title: parsed.display_title,
        sort_key: parsed.number.unwrap_or(u32::MAX),
        galleries,
        source_dir: relative(path, root),
    })
}

fn scan_gallery(path: &Path, root: &Path, category: &str) -> Result<Gallery, ScanError> {
    let parsed = parse_entry_name(&file_name(path));
    if parsed.slug.is_empty() {
        return Err(ScanError::Unnamed(path.to_path_buf()));
    }

    // Parse image numbers and check for duplicates
    let mut numbered: BTreeMap<u32, PathBuf> = BTreeMap::new();
    let mut unnumbered_counter = 0u32;
    for entry in collect_entries(path)?.into_iter().filter(|e| is_image(e)) {
        match parse_entry_name(&stem(&entry)).number {
            Some(num) => {
                if numbered.contains_key(&num) {
                    return Err(ScanError::DuplicateNumber(num, path.to_path_buf()));
                }
                numbered.insert(num, entry);
            }
            None => {
                // Images without numbers sort to the end, preserving filename order
                numbered.insert(1_000_000 + unnumbered_counter, entry);
                unnumbered_counter += 1;
            }
        }
    }

    if numbered.is_empty() {
        return Err(ScanError::EmptyGallery(path.to_path_buf()));
    }

    let images = numbered
        .into_iter()
        .map(|(number, img)| GalleryImage {
            number,
            asset: Asset {
                url: format!(
                    "assets/gallery/{category}/{}/{}",
                    parsed.slug,
                    file_name(&img)
                ),
                source_path: relative(&img, root),
            },
        })
        .collect();

    Ok(Gallery {
        sort_key: parsed.sort_key(),
        slug: parsed.slug,
        title: parsed.display_title,
        images,
    })
}

fn scan_services(path: &Path, root: &Path) -> Result<Vec<Service>, ScanError> {
    let mut services = Vec::new();
    for entry in collect_entries(path)?.into_iter().filter(|e| is_image(e)) {
        let parsed = parse_entry_name(&stem(&entry));
        if parsed.slug.is_empty() {
            return Err(ScanError::Unnamed(entry));
        }
        services.push(Service {
            image: Asset {
                url: format!("assets/services/{}.{}", parsed.slug, extension(&entry)),
                source_path: relative(&entry, root),
            },
            sort_key: parsed.sort_key(),
            slug: parsed.slug,
            title: parsed.display_title,
        });
    }
    services.sort_by(|a, b| (a.sort_key, &a.slug).cmp(&(b.sort_key, &b.slug)));
    ensure_unique(services.iter().map(|s| s.slug.as_str()), path)?;
    Ok(services)
}

/// Parse all markdown files in the root directory into legal pages.
fn parse_pages(root: &Path) -> Result<Vec<Page>, ScanError> {
    let md_files: Vec<PathBuf> = collect_entries(root)?
        .into_iter()
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("md"))
                    .unwrap_or(false)
        })
        .collect();

    let mut pages = Vec::new();
    for md_path in &md_files {
        let parsed = parse_entry_name(&stem(md_path));
        let content = fs::read_to_string(md_path)?;
        let title = content
            .lines()
            .find(|line| line.starts_with("# "))
            .map(|line| line.trim_start_matches("# ").trim().to_string())
            .unwrap_or_else(|| capitalize(&parsed.display_title));
        pages.push(Page {
            title,
            slug: parsed.slug,
            body: content,
        });
    }

    pages.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(pages)
}

fn ensure_unique<'a>(slugs: impl Iterator<Item = &'a str>, dir: &Path) -> Result<(), ScanError> {
    let mut seen = HashSet::new();
    for slug in slugs {
        if !seen.insert(slug) {
            return Err(ScanError::DuplicateSlug(slug.to_string(), dir.to_path_buf()));
        }
    }
    Ok(())
}

fn collect_entries(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let name = file_name(p);
            // Skip hidden files, config.toml, and build artifacts
            !name.starts_with('.') && name != "config.toml" && name != "manifest.json"
        })
        .collect();

    entries.sort();
    Ok(entries)
}

fn is_image(path: &Path) -> bool {
    path.is_file() && IMAGE_EXTENSIONS.contains(&extension(path).as_str())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Path relative to the content root, always with forward slashes.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
