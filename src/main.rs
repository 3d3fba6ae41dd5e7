use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};

use genopic::{Compositor, Filter, FrequencyTable, ImageMode, ReferenceIndex, RenderOptions};

#[derive(Parser)]
#[command(name = "genopic")]
#[command(about = "Render genotype exports as a field of variant glyphs.", long_about = None)]
struct Args {
    // MANDATORY OPTIONS
    /// Load reference bases (chrom, pos, unused, base) from this FILE.
    #[arg(short = 'r', long = "reference", value_name = "FILE")]
    reference: PathBuf,

    /// Load population frequencies (key, frequency) from this FILE.
    #[arg(short = 'f', long = "frequencies", value_name = "FILE")]
    frequencies: PathBuf,

    /// Genotype exports to render, plain or gzipped.
    #[arg(short = 'i', long = "input", value_name = "FILE", num_args = 1.., required = true)]
    inputs: Vec<PathBuf>,

    // Output Options
    /// Write images into this directory, named after each input.
    #[arg(short = 'o', long = "out-dir", value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Image file extension; selects the output format.
    #[arg(short = 'e', long = "extension", value_name = "EXT", default_value = "png")]
    extension: String,

    // Canvas Options
    /// Set the width in pixels of a blank canvas.
    #[arg(short = 'x', long = "width", value_name = "N", default_value_t = 800)]
    width: u32,

    /// Set the height in pixels of a blank canvas.
    #[arg(short = 'y', long = "height", value_name = "N", default_value_t = 600)]
    height: u32,

    /// Draw over this image (at least 600x400) instead of a blank canvas.
    #[arg(short = 'b', long = "background", value_name = "FILE")]
    background: Option<PathBuf>,

    /// Horizontal border in pixels.
    #[arg(short = 'X', long = "border-x", value_name = "N", default_value_t = genopic::compositor::DEFAULT_BORDER_X)]
    border_x: u32,

    /// Vertical border in pixels.
    #[arg(short = 'Y', long = "border-y", value_name = "N", default_value_t = genopic::compositor::DEFAULT_BORDER_Y)]
    border_y: u32,

    /// Pixel format of a blank canvas.
    #[arg(short = 'm', long = "image-mode", value_enum, default_value_t = ImageMode::Rgba)]
    image_mode: ImageMode,

    // Filter Options
    /// Filter applied after the most common tiers are drawn.
    #[arg(long = "internal-filter", value_enum, value_name = "FILTER")]
    internal_filter: Option<Filter>,

    /// How many times to apply the internal filter.
    #[arg(long = "internal-filter-repeats", value_name = "N", default_value_t = 1)]
    internal_filter_repeats: usize,

    /// Filter applied to the finished image.
    #[arg(long = "final-filter", value_enum, value_name = "FILTER")]
    final_filter: Option<Filter>,

    /// Number of most common tiers drawn before the internal filter.
    #[arg(long = "common-tiers", value_name = "N", default_value_t = genopic::compositor::DEFAULT_COMMON_TIERS)]
    common_tiers: usize,

    // Logging
    /// Verbosity level (0 = error, 1 = info, 2 = debug).
    #[arg(short = 'v', long = "verbose", value_name = "N", default_value_t = 1)]
    verbose: u8,
}

impl Args {
    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            border_x: self.border_x,
            border_y: self.border_y,
            background_image: self.background.clone(),
            width: Some(self.width),
            height: Some(self.height),
            image_mode: self.image_mode,
            internal_filter: self.internal_filter,
            internal_filter_repeats: self.internal_filter_repeats,
            final_filter: self.final_filter,
            common_tiers: self.common_tiers,
            ..RenderOptions::default()
        }
    }
}

/// `<out_dir>/<input file name>.<extension>`
fn output_path(out_dir: &Path, input: &Path, extension: &str) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sample".to_string());
    out_dir.join(format!("{}.{}", name, extension.trim_start_matches('.')))
}

fn main() {
    let args = Args::parse();

    // Initialize logger based on verbosity
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let reference = match ReferenceIndex::open(&args.reference) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error loading reference bases: {}", e);
            std::process::exit(1);
        }
    };
    let frequencies = match FrequencyTable::open(&args.frequencies) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error loading frequencies: {}", e);
            std::process::exit(1);
        }
    };

    let compositor = Compositor::new(&reference, &frequencies);
    if render_inputs(&compositor, &args) > 0 {
        std::process::exit(1);
    }
    info!("Done.");
}

/// Render every input; returns how many failed.
fn render_inputs(compositor: &Compositor<'_>, args: &Args) -> usize {
    let options = args.render_options();
    let mut failed = 0;
    for input in &args.inputs {
        let out = output_path(&args.out_dir, input, &args.extension);
        if let Err(e) = compositor.make(input, &out, &options) {
            eprintln!("Error rendering {:?}: {}", input, e);
            failed += 1;
        }
    }
    failed
}
