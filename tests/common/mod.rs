//! Content fixture shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

pub fn write_image(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 180, 120]))
        .save(path)
        .unwrap();
}

/// A studio content directory: two categories, two services, the about,
/// team and office images, one legal page.
pub fn write_content(root: &Path) {
    write_image(&root.join("010-housing/main.jpg"), 40, 50);
    write_image(&root.join("010-housing/010-residential/1.jpg"), 40, 50);
    write_image(&root.join("010-housing/010-residential/2.jpg"), 50, 40);
    write_image(&root.join("010-housing/010-residential/3.jpg"), 40, 50);
    write_image(&root.join("020-urban/main.jpg"), 40, 50);
    write_image(&root.join("020-urban/010-streets/1.jpg"), 40, 50);
    write_image(&root.join("services/010-design.jpg"), 64, 36);
    write_image(&root.join("services/020-consultation.jpg"), 64, 36);
    for name in [
        "about_us.jpg",
        "zurich_light.jpg",
        "lisboa_light.jpg",
        "rc_profile.jpg",
        "cn_profile.jpg",
    ] {
        write_image(&root.join("assets").join(name), 20, 20);
    }
    fs::write(
        root.join("privacy.md"),
        "# Privacy Policy\n\nWe only use your details to answer you.\n",
    )
    .unwrap();
}

/// Run the binary with `args`, panicking with its stderr on failure.
pub fn lumalima(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_lumalima"))
        .args(args)
        .output()
        .expect("failed to run lumalima");
    assert!(
        output.status.success(),
        "lumalima {:?} failed:\n{}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}
