//! Shared test utilities for the lumalima test suite.
//!
//! Builds throwaway content directories with real (tiny) images so every
//! stage, the preloader included, runs against files it can actually decode.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_content();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let housing = find_category(&manifest, "housing");
//! assert_eq!(gallery_slugs(housing), vec!["residential", "gardens"]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::scan::Manifest;
use crate::types::{Category, Gallery};

// =========================================================================
// Fixture setup
// =========================================================================

/// Write a solid-color image; the format follows the extension.
pub fn write_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(width, height, image::Rgb([40, 40, 46]))
        .save(path)
        .unwrap();
}

/// A small but complete content directory:
///
/// ```text
/// 010-housing/   main.jpg, 010-residential/{1,2}.jpg, 020-gardens/1.jpg
/// 020-comercial/ main.png, 010-retail/{1,2,3}.jpg
/// services/      010-design.jpg, 020-consultation.jpg
/// assets/        every image the stock config references
/// privacy.md, terms.md
/// ```
pub fn setup_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write_image(&root.join("010-housing/main.jpg"), 12, 8);
    write_image(&root.join("010-housing/010-residential/1.jpg"), 8, 10);
    write_image(&root.join("010-housing/010-residential/2.jpg"), 10, 8);
    write_image(&root.join("010-housing/020-gardens/1.jpg"), 8, 10);

    write_image(&root.join("020-comercial/main.png"), 12, 8);
    for n in 1..=3 {
        write_image(&root.join(format!("020-comercial/010-retail/{n}.jpg")), 8, 10);
    }

    write_image(&root.join("services/010-design.jpg"), 16, 9);
    write_image(&root.join("services/020-consultation.jpg"), 16, 9);

    for name in [
        "about_us.jpg",
        "zurich_light.jpg",
        "lisboa_light.jpg",
        "rc_profile.jpg",
        "cn_profile.jpg",
    ] {
        write_image(&root.join("assets").join(name), 6, 6);
    }

    fs::write(
        root.join("privacy.md"),
        "# Privacy Policy\n\nWe only use your details to answer you.\n",
    )
    .unwrap();
    fs::write(root.join("terms.md"), "Plain terms without a heading.\n").unwrap();

    tmp
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a category by slug. Panics if not found.
pub fn find_category<'a>(manifest: &'a Manifest, slug: &str) -> &'a Category {
    manifest
        .categories
        .iter()
        .find(|c| c.slug == slug)
        .unwrap_or_else(|| {
            panic!(
                "category '{slug}' not found. Available: {:?}",
                category_slugs(manifest)
            )
        })
}

/// Find a gallery by slug within a category. Panics if not found.
pub fn find_gallery<'a>(category: &'a Category, slug: &str) -> &'a Gallery {
    category
        .galleries
        .iter()
        .find(|g| g.slug == slug)
        .unwrap_or_else(|| {
            panic!(
                "gallery '{slug}' not found in '{}'. Available: {:?}",
                category.slug,
                gallery_slugs(category)
            )
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

pub fn category_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest.categories.iter().map(|c| c.slug.as_str()).collect()
}

pub fn gallery_slugs(category: &Category) -> Vec<&str> {
    category.galleries.iter().map(|g| g.slug.as_str()).collect()
}

pub fn image_numbers(gallery: &Gallery) -> Vec<u32> {
    gallery.images.iter().map(|i| i.number).collect()
}
