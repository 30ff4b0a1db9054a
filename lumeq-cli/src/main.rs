use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use image::{GenericImageView, RgbImage};
use lumeq_core::pipeline::{process_file, DEFAULT_MAX_DIMENSION};
use lumeq_core::ClaheParams;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lumeq-cli",
    about = "Enhance local contrast with CLAHE on the luminance channel"
)]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct Tuning {
    /// CLAHE clip limit (typical range 1.0 - 4.0)
    #[arg(long)]
    clip_limit: Option<f64>,

    /// Tiles per side; clamped to 2..=64
    #[arg(long, allow_negative_numbers = true)]
    grid_size: Option<i64>,

    /// Named preset: standard, gentle, strong, fine, coarse
    #[arg(long)]
    preset: Option<String>,

    /// Downscale so neither side exceeds this many pixels (0 keeps full size)
    #[arg(long, env = "LUMEQ_MAX_DIMENSION", default_value_t = DEFAULT_MAX_DIMENSION)]
    max_dimension: u32,
}

impl Tuning {
    /// Preset (or defaults) first, then explicit flags on top.
    fn resolve(&self) -> Result<ClaheParams> {
        let mut params = match self.preset.as_deref() {
            Some(name) => match ClaheParams::from_preset(name) {
                Some(p) => p,
                None => bail!(
                    "Unknown preset '{}'. Available: {}",
                    name,
                    preset_names().join(", ")
                ),
            },
            None => ClaheParams::default(),
        };
        if let Some(clip) = self.clip_limit {
            params = params.with_clip_limit(clip);
        }
        if let Some(grid) = self.grid_size {
            params = params.with_grid_size(grid);
        }
        params.validate()?;
        Ok(params)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance a single image
    Single {
        /// Input image path
        input: PathBuf,

        /// Output image path (default: <input>_clahe.png)
        output: Option<PathBuf>,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Enhance all images in a directory
    Batch {
        /// Input directory
        input_dir: PathBuf,

        /// Output directory (default: input_dir/enhanced)
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        tuning: Tuning,

        /// Number of parallel jobs (default: num_cpus)
        #[arg(long, short)]
        jobs: Option<usize>,

        /// Reprocess even if output is up-to-date
        #[arg(long)]
        force: bool,
    },

    /// Compare two images pixel-by-pixel (e.g. before and after)
    Compare {
        /// First image
        image_a: PathBuf,

        /// Second image
        image_b: PathBuf,

        /// Save visual diff to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List the built-in presets
    Presets,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff"];
const OUTPUT_SUFFIX: &str = "_clahe";

fn preset_names() -> Vec<&'static str> {
    ClaheParams::all_presets()
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_generated_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.ends_with(OUTPUT_SUFFIX))
        .unwrap_or(false)
}

fn output_name(input: &Path) -> Result<String> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("{} has no usable file name", input.display()))?;
    Ok(format!("{}{}.png", stem, OUTPUT_SUFFIX))
}

fn default_output_path(input: &Path) -> Result<PathBuf> {
    let parent = input.parent().unwrap_or(Path::new("."));
    Ok(parent.join(output_name(input)?))
}

/// True when `output` exists and is not older than `input`.
fn is_up_to_date(input: &Path, output: &Path) -> bool {
    let modified = |p: &Path| p.metadata().and_then(|m| m.modified()).ok();
    match (modified(input), modified(output)) {
        (Some(in_time), Some(out_time)) => out_time >= in_time,
        _ => false,
    }
}

fn enhance_one(input: &Path, output: &Path, params: &ClaheParams, max_dimension: u32) -> Result<()> {
    process_file(input, output, params, max_dimension)
        .with_context(|| format!("{} -> {}", input.display(), output.display()))
}

fn cmd_single(input: &Path, output: Option<&Path>, tuning: &Tuning) -> Result<()> {
    let params = tuning.resolve()?;
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => default_output_path(input)?,
    };

    info!(
        clip_limit = params.clip_limit,
        grid_size = params.grid_size,
        "Processing: {} -> {}",
        input.display(),
        output_path.display()
    );
    enhance_one(input, &output_path, &params, tuning.max_dimension)?;
    info!("Done: {}", output_path.display());
    Ok(())
}

/// Source images in `input_dir` that still need an output, paired with their output path.
fn pending_work(input_dir: &Path, output_dir: &Path, force: bool) -> Result<(Vec<(PathBuf, PathBuf)>, usize)> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .with_context(|| format!("cannot read {}", input_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p) && !is_generated_file(p))
        .collect();
    images.sort();

    let mut work = Vec::with_capacity(images.len());
    let mut skipped = 0usize;
    for image_path in images {
        let output_path = output_dir.join(output_name(&image_path)?);
        if !force && is_up_to_date(&image_path, &output_path) {
            debug!("Up to date: {}", output_path.display());
            skipped += 1;
            continue;
        }
        work.push((image_path, output_path));
    }
    Ok((work, skipped))
}

fn cmd_batch(
    input_dir: &Path,
    output_dir: &Path,
    tuning: &Tuning,
    jobs: Option<usize>,
    force: bool,
) -> Result<()> {
    let params = tuning.resolve()?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    let (work, skipped) = pending_work(input_dir, output_dir, force)?;
    if work.is_empty() && skipped == 0 {
        warn!("No source images found in {}", input_dir.display());
        return Ok(());
    }
    info!(
        "To process: {} images, skipping {} up-to-date",
        work.len(),
        skipped
    );

    if let Some(n) = jobs {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            warn!("Could not configure {} worker threads: {}", n, e);
        }
    }

    let errors: Vec<String> = work
        .par_iter()
        .filter_map(|(input, output)| {
            match enhance_one(input, output, &params, tuning.max_dimension) {
                Ok(()) => {
                    info!("Done: {}", output.display());
                    None
                }
                Err(e) => {
                    let msg = format!("{:#}", e);
                    error!("{}", msg);
                    Some(msg)
                }
            }
        })
        .collect();

    info!(
        "Processed: {}, Skipped: {}, Errors: {}",
        work.len() - errors.len(),
        skipped,
        errors.len()
    );
    if !errors.is_empty() {
        bail!("{} of {} images failed", errors.len(), work.len());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
struct CompareStats {
    total_pixels: u64,
    exact_matches: u64,
    mae: [f64; 3],
    max_error: [u32; 3],
}

/// Per-channel error statistics plus a diff image (differences amplified 4x).
fn compare_images(a: &RgbImage, b: &RgbImage) -> (CompareStats, RgbImage) {
    let (width, height) = a.dimensions();
    let total_pixels = width as u64 * height as u64;
    let mut exact_matches = 0u64;
    let mut sum_abs_error = [0u64; 3];
    let mut max_error = [0u32; 3];
    let mut diff_img = RgbImage::new(width, height);

    for ((pa, pb), pd) in a.pixels().zip(b.pixels()).zip(diff_img.pixels_mut()) {
        let mut pixel_match = true;
        for c in 0..3 {
            let diff = (pa[c] as i32 - pb[c] as i32).unsigned_abs();
            if diff > 0 {
                pixel_match = false;
            }
            sum_abs_error[c] += diff as u64;
            max_error[c] = max_error[c].max(diff);
            pd[c] = (diff * 4).min(255) as u8;
        }
        if pixel_match {
            exact_matches += 1;
        }
    }

    let mae = sum_abs_error.map(|s| s as f64 / total_pixels.max(1) as f64);
    let stats = CompareStats {
        total_pixels,
        exact_matches,
        mae,
        max_error,
    };
    (stats, diff_img)
}

fn cmd_compare(image_a: &Path, image_b: &Path, diff_output: Option<&Path>) -> Result<()> {
    let a = image::open(image_a).with_context(|| format!("failed to load {}", image_a.display()))?;
    let b = image::open(image_b).with_context(|| format!("failed to load {}", image_b.display()))?;

    let (wa, ha) = a.dimensions();
    let (wb, hb) = b.dimensions();
    if (wa, ha) != (wb, hb) {
        println!(
            "Images have different dimensions: {}x{} vs {}x{}",
            wa, ha, wb, hb
        );
        return Ok(());
    }

    let (stats, diff_img) = compare_images(&a.to_rgb8(), &b.to_rgb8());
    let match_pct = (stats.exact_matches as f64 / stats.total_pixels as f64) * 100.0;

    println!(
        "Image comparison: {} vs {}",
        image_a.display(),
        image_b.display()
    );
    println!("Dimensions: {}x{}", wa, ha);
    println!("Total pixels: {}", stats.total_pixels);
    println!("Exact matches: {} ({:.2}%)", stats.exact_matches, match_pct);
    println!(
        "MAE per channel (R,G,B): {:.4}, {:.4}, {:.4}",
        stats.mae[0], stats.mae[1], stats.mae[2]
    );
    println!(
        "Max error per channel (R,G,B): {}, {}, {}",
        stats.max_error[0], stats.max_error[1], stats.max_error[2]
    );

    if let Some(out_path) = diff_output {
        diff_img
            .save(out_path)
            .with_context(|| format!("failed to save {}", out_path.display()))?;
        println!("Visual diff saved to: {}", out_path.display());
    }

    Ok(())
}

fn cmd_presets() {
    for (name, params) in ClaheParams::all_presets() {
        println!(
            "{:<10} clip_limit={:<5} grid_size={}",
            name, params.clip_limit, params.grid_size
        );
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Single {
            input,
            output,
            tuning,
        } => cmd_single(&input, output.as_deref(), &tuning)?,

        Commands::Batch {
            input_dir,
            output_dir,
            tuning,
            jobs,
            force,
        } => {
            let output = output_dir.unwrap_or_else(|| input_dir.join("enhanced"));
            cmd_batch(&input_dir, &output, &tuning, jobs, force)?;
        }

        Commands::Compare {
            image_a,
            image_b,
            output,
        } => cmd_compare(&image_a, &image_b, output.as_deref())?,

        Commands::Presets => cmd_presets(),
    }

    Ok(())
}
