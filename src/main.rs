use clap::{Parser, Subcommand, ValueEnum};
use image::ImageReader;
use imageproc::region_labelling::Connectivity;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pickvision::dataset::{self, AssembleConfig};
use pickvision::{Channel, SegmentParams, Segmenter};

#[derive(Parser)]
#[command(name = "pickvision")]
#[command(about = "Vision tooling for the pick-and-place demo")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment an object region in a camera frame
    Segment {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Restrict segmentation to a single color channel (no fallback cascade)
        #[arg(long, value_enum)]
        channel: Option<ChannelArg>,

        /// Binary threshold
        #[arg(long, default_value_t = 200)]
        threshold: u8,

        /// Lower edge-detector threshold
        #[arg(long, default_value_t = 50.0)]
        edge_low: f32,

        /// Upper edge-detector threshold
        #[arg(long, default_value_t = 270.0)]
        edge_high: f32,

        /// Flood-fill connectivity (4 or 8)
        #[arg(long, default_value_t = 4)]
        connectivity: u8,

        /// Lower bound for contour area (exclusive)
        #[arg(long, default_value_t = 100.0)]
        area_low: f64,

        /// Upper bound for contour area (exclusive)
        #[arg(long, default_value_t = 200.0)]
        area_high: f64,

        /// Save intermediate masks and the annotated frame to a directory
        /// (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },
    /// Assemble a synthetic labeled dataset from base images
    Assemble {
        /// Object names, in label order
        #[arg(long, value_delimiter = ',', required = true)]
        objects: Vec<String>,

        /// Number of images to generate
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Directory with base images (backgrounds and object patches)
        #[arg(long, value_name = "DIR")]
        base_dir: PathBuf,

        /// Directory to write generated images to
        #[arg(long, value_name = "DIR")]
        image_dir: PathBuf,

        /// Manifest CSV file to write image descriptions to
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,

        /// Append to an existing manifest instead of overwriting it
        #[arg(long)]
        append: bool,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Create train/test/val lists from a dataset manifest
    Split {
        /// Manifest CSV file
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,

        /// Directory to write split lists to
        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,

        /// Keep only the first N label indices (0 keeps everything)
        #[arg(long, default_value_t = 0)]
        labels: usize,

        /// Number of images to use (0 for all)
        #[arg(long, default_value_t = 0)]
        images: usize,

        /// Split fractions, one to three of them
        #[arg(long, value_delimiter = ',', default_values_t = [0.7, 0.3])]
        fractions: Vec<f64>,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChannelArg {
    Red,
    Green,
    Blue,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Red => Channel::Red,
            ChannelArg::Green => Channel::Green,
            ChannelArg::Blue => Channel::Blue,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .init();

    match args.command {
        Commands::Segment {
            image_path,
            channel,
            threshold,
            edge_low,
            edge_high,
            connectivity,
            area_low,
            area_high,
            debug_out,
        } => {
            let img = ImageReader::open(&image_path)?
                .decode()
                .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

            let connectivity = match connectivity {
                4 => Connectivity::Four,
                8 => Connectivity::Eight,
                other => anyhow::bail!("connectivity must be 4 or 8, got {}", other),
            };
            let params = SegmentParams {
                threshold,
                edge_low,
                edge_high,
                connectivity,
                area_low,
                area_high,
            };

            let mut segmenter = Segmenter::new(params);
            if let Some(dir) = debug_out {
                segmenter = segmenter.with_debug(dir)?;
            }

            let region = match channel {
                Some(channel) => segmenter.segment_channel(&img, channel.into())?,
                None => segmenter.segment(&img)?,
            };

            println!("stage: {}", region.stage.name());
            println!(
                "rotated: center ({:.1}, {:.1}), {:.1}x{:.1}, angle {:.1} deg",
                region.rotated.center.0,
                region.rotated.center.1,
                region.rotated.width,
                region.rotated.height,
                region.rotated.angle,
            );
            println!(
                "upright: x {}, y {}, {}x{}",
                region.bbox.x, region.bbox.y, region.bbox.width, region.bbox.height,
            );
        }
        Commands::Assemble { objects, count, base_dir, image_dir, manifest, append, seed } => {
            let mut rng = seeded_rng(seed);
            dataset::assemble_data(
                &objects,
                count,
                &base_dir,
                &image_dir,
                &manifest,
                !append,
                &AssembleConfig::default(),
                &mut rng,
            )?;
        }
        Commands::Split { manifest, out_dir, labels, images, fractions, seed } => {
            let mut rng = seeded_rng(seed);
            dataset::create_split(&manifest, &out_dir, labels, images, &fractions, &mut rng)?;
        }
    }

    Ok(())
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
