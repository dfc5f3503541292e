//! Shared types used across all pipeline stages.
//!
//! These types are serialized to JSON between stages (scan → preload → generate)
//! and must be identical across all three modules.

use serde::{Deserialize, Serialize};

/// An image the generated site references.
///
/// `url` is where the file lands in the output, relative to the site root
/// (`assets/gallery/housing/residential/1.jpg`). `source_path` is where it
/// lives in the content directory, relative to the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub url: String,
    pub source_path: String,
}

/// A project category (`010-housing/`): a card on the homepage and a page
/// of galleries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Folder name without its number prefix, lower-cased (`housing`).
    /// Doubles as the page name and the translation key stem.
    pub slug: String,
    /// Folder-derived title, used when the catalogs have no `category.<slug>`.
    pub title: String,
    pub sort_key: u32,
    /// The category's `main.*` image.
    pub cover: Asset,
    pub galleries: Vec<Gallery>,
    /// Content directory name, for error messages and CLI output.
    pub source_dir: String,
}

/// A project sub-type inside a category (`010-residential/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gallery {
    pub slug: String,
    pub title: String,
    pub sort_key: u32,
    pub images: Vec<GalleryImage>,
}

/// One numbered image of a gallery (`7.jpg`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub number: u32,
    #[serde(flatten)]
    pub asset: Asset,
}

/// A service offering (`services/010-design.jpg`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub slug: String,
    pub title: String,
    pub sort_key: u32,
    pub image: Asset,
}

/// A legal page generated from a markdown file in the content root
/// (`privacy.md`, `terms.md`), linked from the footer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Title from first `# heading` in markdown, or the file name as fallback
    pub title: String,
    /// Output page name (`privacy` → `privacy.html`)
    pub slug: String,
    /// Raw markdown content
    pub body: String,
}
