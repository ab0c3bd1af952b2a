//! Synthetic dataset assembly: composite object patches onto background
//! photos and record the placements in a manifest.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

pub const MANIFEST_HEADER: &str = "image_name,image_filename,patch_parameters,label";

/// Patch placement configuration for image assembly.
///
/// The placement window restricts patch positions to the table area of the
/// background photos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleConfig {
    /// Upper bound (exclusive) on the number of patches per image.
    pub max_patches: u32,
    /// Left edge of the placement window, in pixels.
    pub x_min: u32,
    /// Right edge of the placement window, in pixels.
    pub x_max: u32,
    /// Top edge of the placement window, in pixels.
    pub y_min: u32,
    /// Bottom edge of the placement window, in pixels.
    pub y_max: u32,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            max_patches: 5,
            x_min: 400,
            x_max: 1020,
            y_min: 310,
            y_max: 670,
        }
    }
}

/// One patch composited onto a generated image.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchPlacement {
    pub x: u32,
    pub y: u32,
    pub angle: f32,
    /// Index of the object name in the label list.
    pub label: usize,
}

/// Description of one generated image, serialized as a manifest row.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRow {
    pub image_name: String,
    pub image_filename: PathBuf,
    pub patches: Vec<PatchPlacement>,
}

impl ManifestRow {
    fn to_csv(&self) -> String {
        let patches: Vec<String> = self
            .patches
            .iter()
            .map(|p| format!("{}:{}:{:.1}:{}", p.x, p.y, p.angle, p.label))
            .collect();
        let labels: Vec<String> = self.patches.iter().map(|p| p.label.to_string()).collect();
        format!(
            "{},{},{},{}",
            self.image_name,
            self.image_filename.display(),
            patches.join(";"),
            labels.join(";"),
        )
    }
}

/// Write list of object names to file, one per line.
/// Their order in the file gives the label indices.
pub fn write_objects(objects: &[String], filename: &Path) -> Result<()> {
    let mut content = objects.join("\n");
    content.push('\n');
    fs::write(filename, content).with_context(|| format!("writing {}", filename.display()))
}

/// Read list of object names from file.
pub fn read_objects(filename: &Path) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(filename).with_context(|| format!("reading {}", filename.display()))?;
    Ok(content.lines().map(|l| l.to_string()).collect())
}

/// Generate `count` images from the base images in `base_dir` (backgrounds
/// plus foreground object patches) and append one manifest row per image.
///
/// Base images are matched by filename: files containing "background" are
/// backgrounds, files containing an object name are patches for that object.
#[allow(clippy::too_many_arguments)]
pub fn assemble_data(
    objects: &[String],
    count: usize,
    base_dir: &Path,
    image_dir: &Path,
    manifest: &Path,
    overwrite: bool,
    config: &AssembleConfig,
    rng: &mut impl Rng,
) -> Result<()> {
    let files = base_images(base_dir)?;
    let backgrounds: Vec<&PathBuf> = files
        .iter()
        .filter(|f| file_stem(f).contains("background"))
        .collect();
    let patches: Vec<(&PathBuf, usize)> = files
        .iter()
        .filter_map(|f| {
            let stem = file_stem(f);
            objects
                .iter()
                .position(|obj| stem.contains(obj.as_str()))
                .map(|label| (f, label))
        })
        .collect();
    if backgrounds.is_empty() {
        bail!("no background images found in {}", base_dir.display());
    }
    if patches.is_empty() {
        bail!("no object patches found in {}", base_dir.display());
    }

    fs::create_dir_all(image_dir)?;
    let mut out = if overwrite {
        let mut f = fs::File::create(manifest)?;
        writeln!(f, "{}", MANIFEST_HEADER)?;
        f
    } else {
        fs::OpenOptions::new().append(true).create(true).open(manifest)?
    };

    let start = std::time::Instant::now();
    for _ in 0..count {
        let row = assemble_image(&backgrounds, &patches, image_dir, config, rng)?;
        writeln!(out, "{}", row.to_csv())?;
    }
    info!(count, elapsed = ?start.elapsed(), "wrote generated images");
    Ok(())
}

fn assemble_image(
    backgrounds: &[&PathBuf],
    patches: &[(&PathBuf, usize)],
    image_dir: &Path,
    config: &AssembleConfig,
    rng: &mut impl Rng,
) -> Result<ManifestRow> {
    let image_name = rand_digit_name(12, rng);
    let image_filename = image_dir.join(format!("{}.png", image_name));

    let background = backgrounds[rng.random_range(0..backgrounds.len())];
    let mut img = image::open(background)
        .with_context(|| format!("loading background {}", background.display()))?
        .to_rgb8();

    // max_patches of zero means patchless images.
    let nr_patches = match config.max_patches {
        0 => 0,
        max => rng.random_range(0..max),
    };
    let mut placements = Vec::with_capacity(nr_patches as usize);
    for _ in 0..nr_patches {
        let (path, label) = patches[rng.random_range(0..patches.len())];
        let patch = image::open(path)
            .with_context(|| format!("loading patch {}", path.display()))?
            .to_rgb8();
        let (w, h) = patch.dimensions();
        if w > 400 || h > 400 {
            bail!("patch {} is larger than 400px", path.display());
        }

        let angle = 180.0 * (rng.random::<f32>() - 0.5);
        let rotated = rotate_expand(&patch, angle);
        let (nw, nh) = rotated.dimensions();

        let x_hi = config.x_max.saturating_sub(nw);
        let y_hi = config.y_max.saturating_sub(nh);
        if x_hi <= config.x_min || y_hi <= config.y_min {
            // Rotated patch does not fit the placement window; skip it.
            continue;
        }
        let tx = rng.random_range(config.x_min..x_hi);
        let ty = rng.random_range(config.y_min..y_hi);
        image::imageops::replace(&mut img, &rotated, tx as i64, ty as i64);
        placements.push(PatchPlacement { x: tx, y: ty, angle, label });
    }

    img.save(&image_filename)
        .with_context(|| format!("saving {}", image_filename.display()))?;
    Ok(ManifestRow { image_name, image_filename, patches: placements })
}

/// Rotate an image by an angle in degrees on an expanded canvas, so no
/// corners are cropped. Positive angles rotate clockwise.
pub fn rotate_expand(image: &RgbImage, angle: f32) -> RgbImage {
    let (w, h) = image.dimensions();
    let (nw, nh) = rotated_dimensions(w, h, angle);
    let mut canvas = RgbImage::new(nw, nh);
    let tx = ((nw - w) / 2) as i64;
    let ty = ((nh - h) / 2) as i64;
    image::imageops::replace(&mut canvas, image, tx, ty);
    rotate_about_center(&canvas, angle.to_radians(), Interpolation::Bilinear, Rgb([0, 0, 0]))
}

/// Bounding dimensions of a w x h rectangle after rotation by `angle`
/// degrees.
pub fn rotated_dimensions(w: u32, h: u32, angle: f32) -> (u32, u32) {
    let (sin, cos) = angle.to_radians().sin_cos();
    let (w, h) = (w as f32, h as f32);
    let nw = (w * cos.abs() + h * sin.abs()).ceil() as u32;
    let nh = (w * sin.abs() + h * cos.abs()).ceil() as u32;
    (nw.max(1), nh.max(1))
}

/// Create train/test/val file lists from the manifest.
///
/// Rows are shuffled, optionally restricted to the first `labels` label
/// indices (`labels == 0` keeps everything) and truncated to `images` rows
/// (`images == 0` keeps everything), then partitioned by `fractions` (one to
/// three of them). Each output line is `image_filename label`, using the
/// image's first patch label; images without patches carry label -1.
pub fn create_split(
    manifest: &Path,
    out_dir: &Path,
    labels: usize,
    images: usize,
    fractions: &[f64],
    rng: &mut impl Rng,
) -> Result<()> {
    if fractions.is_empty() || fractions.len() > 3 {
        bail!("split takes one to three fractions, got {}", fractions.len());
    }

    let content = fs::read_to_string(manifest)
        .with_context(|| format!("reading {}", manifest.display()))?;
    let mut rows: Vec<(String, i64)> = content
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(parse_manifest_line)
        .collect::<Result<_>>()?;

    rows.shuffle(rng);
    if labels > 0 {
        rows.retain(|(_, label)| *label >= 0 && (*label as usize) < labels);
    }
    let total = if images == 0 { rows.len() } else { images.min(rows.len()) };
    let rows = &rows[..total];

    fs::create_dir_all(out_dir)?;
    let names = ["train", "test", "val"];
    let mut offset = 0usize;
    let mut written = 0usize;
    for (idx, fraction) in fractions.iter().enumerate() {
        let take = ((total as f64) * fraction).floor() as usize;
        let chunk = &rows[offset..(offset + take).min(total)];
        offset += chunk.len();
        written += chunk.len();

        let path = out_dir.join(format!("{}.txt", names[idx]));
        let mut f = fs::File::create(&path)?;
        for (filename, label) in chunk {
            writeln!(f, "{} {}", filename, label)?;
        }
    }
    info!(written, "wrote data set splits");
    Ok(())
}

fn parse_manifest_line(line: &str) -> Result<(String, i64)> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 4 {
        bail!("malformed manifest line: {}", line);
    }
    let label = fields[3]
        .split(';')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>())
        .transpose()
        .with_context(|| format!("malformed label field: {}", fields[3]))?
        .unwrap_or(-1);
    Ok((fields[1].to_string(), label))
}

fn base_images(base_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(base_dir)
        .with_context(|| format!("reading base directory {}", base_dir.display()))?
    {
        let path = entry?.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("").to_string()
}

fn rand_digit_name(digits: usize, rng: &mut impl Rng) -> String {
    (0..digits).map(|_| char::from(b'0' + rng.random_range(0..10u8))).collect()
}
