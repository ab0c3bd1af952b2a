//! Generate a tiny synthetic dataset from generated base images.
//!
//! Run with: cargo run --example assemble_sample

use image::{Rgb, RgbImage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;

use pickvision::dataset::{self, AssembleConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let root = Path::new("assemble_sample");
    let base_dir = root.join("base");
    fs::create_dir_all(&base_dir)?;

    // Base images: one table background and two object patches.
    RgbImage::from_pixel(640, 480, Rgb([190, 180, 170]))
        .save(base_dir.join("table_background.png"))?;
    RgbImage::from_pixel(60, 40, Rgb([200, 40, 40])).save(base_dir.join("duplo_brick.png"))?;
    RgbImage::from_pixel(40, 40, Rgb([245, 245, 245])).save(base_dir.join("golf_ball.png"))?;

    let objects = vec!["duplo_brick".to_string(), "golf_ball".to_string()];
    dataset::write_objects(&objects, &root.join("object_names.txt"))?;

    // Patch placement window sized to the 640x480 background.
    let config = AssembleConfig { max_patches: 4, x_min: 50, x_max: 590, y_min: 50, y_max: 430 };
    let mut rng = StdRng::seed_from_u64(7);
    let manifest = root.join("manifest.csv");
    dataset::assemble_data(
        &objects,
        10,
        &base_dir,
        &root.join("images"),
        &manifest,
        true,
        &config,
        &mut rng,
    )?;

    dataset::create_split(&manifest, &root.join("splits"), 0, 0, &[0.7, 0.3], &mut rng)?;

    println!("wrote dataset under {}", root.display());
    Ok(())
}
