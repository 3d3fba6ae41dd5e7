use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{DynamicImage, RgbaImage};
use log::{debug, info};

use crate::categories::{Categories, RarityCategory};
use crate::color::BLACK;
use crate::draw::{paste, put_pixel, Filter};
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::mark::{Glyph, MarkSet};
use crate::reference::ReferenceIndex;
use crate::sample::{SampleData, SampleParser};

pub const MINIMAL_WIDTH: u32 = 600;
pub const MINIMAL_HEIGHT: u32 = 400;
pub const DEFAULT_BORDER_X: u32 = 24;
pub const DEFAULT_BORDER_Y: u32 = 24;
pub const DEFAULT_COMMON_TIERS: usize = 3;
pub const DEFAULT_CATEGORY_SCALE: f64 = 1234.0;

/// Pixel format of a blank canvas and of the saved image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ImageMode {
    #[default]
    Rgba,
    Rgb,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub border_x: u32,
    pub border_y: u32,
    /// Draw over this image instead of a blank canvas; its size wins over
    /// `width`/`height`.
    pub background_image: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub image_mode: ImageMode,
    pub internal_filter: Option<Filter>,
    pub internal_filter_repeats: usize,
    pub final_filter: Option<Filter>,
    /// How many of the most common tiers go into the first, filtered pass.
    pub common_tiers: usize,
    /// Numerator of the ratio handed to the category partitioner.
    pub category_scale: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            border_x: DEFAULT_BORDER_X,
            border_y: DEFAULT_BORDER_Y,
            background_image: None,
            width: None,
            height: None,
            image_mode: ImageMode::default(),
            internal_filter: None,
            internal_filter_repeats: 1,
            final_filter: None,
            common_tiers: DEFAULT_COMMON_TIERS,
            category_scale: DEFAULT_CATEGORY_SCALE,
        }
    }
}

/// Maps linear genome coordinates onto the interior of the canvas, one
/// scan line after another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub border_x: u32,
    pub border_y: u32,
    pub width: u32,
    pub height: u32,
    /// Genome positions per pixel.
    pub ratio: f64,
}

impl Layout {
    pub fn new(canvas_width: u32, canvas_height: u32, border_x: u32, border_y: u32, genome_size: u64) -> Result<Self> {
        let width = canvas_width.saturating_sub(border_x.saturating_mul(2));
        let height = canvas_height.saturating_sub(border_y.saturating_mul(2));
        if width == 0 || height == 0 {
            return Err(Error::Configuration(format!(
                "borders {}x{} leave no room on a {}x{} canvas",
                border_x, border_y, canvas_width, canvas_height
            )));
        }
        if genome_size == 0 {
            return Err(Error::Configuration("reference index is empty".to_string()));
        }
        let ratio = genome_size as f64 / (width as u64 * height as u64) as f64;
        Ok(Layout {
            border_x,
            border_y,
            width,
            height,
            ratio,
        })
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Canvas pixel for an absolute genome coordinate, or `None` for the
    /// unmapped sentinel 0. The last interior pixel absorbs any overshoot.
    pub fn locate(&self, absolute: u64) -> Option<(i64, i64)> {
        if absolute == 0 {
            return None;
        }
        let index = ((absolute as f64 / self.ratio) as u64).min(self.area() - 1);
        let (row, col) = (index / self.width as u64, index % self.width as u64);
        Some((self.border_x as i64 + col as i64, self.border_y as i64 + row as i64))
    }
}

/// Split tiers (most common first) into the filtered first pass and the
/// pass drawn on top of it.
pub fn split_passes(categories: &[RarityCategory], common_tiers: usize) -> (&[RarityCategory], &[RarityCategory]) {
    categories.split_at(common_tiers.min(categories.len()))
}

/// Places variant glyphs for a sample on a canvas.
pub struct Compositor<'a> {
    reference: &'a ReferenceIndex,
    frequencies: &'a FrequencyTable,
    marks: MarkSet,
    categories: Categories,
}

impl<'a> Compositor<'a> {
    pub fn new(reference: &'a ReferenceIndex, frequencies: &'a FrequencyTable) -> Self {
        Compositor {
            reference,
            frequencies,
            marks: MarkSet::new(),
            categories: Categories::default(),
        }
    }

    pub fn with_categories(mut self, categories: Categories) -> Self {
        self.categories = categories;
        self
    }

    /// Parse `sample_path`, render it and save the image to `result_path`.
    pub fn make(&self, sample_path: &Path, result_path: &Path, options: &RenderOptions) -> Result<()> {
        let t0 = Instant::now();
        let sample = SampleParser::new(self.reference, self.frequencies).parse(sample_path)?;
        let image = self.render(&sample, options)?;
        info!("Saving to {:?}...", result_path);
        image.save(result_path)?;
        info!(
            "Image for {:?} has been created (dt = {:.2?})",
            sample_path,
            t0.elapsed()
        );
        Ok(())
    }

    pub fn render(&self, sample: &SampleData, options: &RenderOptions) -> Result<DynamicImage> {
        let (mut canvas, mode) = open_canvas(options)?;
        let layout = Layout::new(
            canvas.width(),
            canvas.height(),
            options.border_x,
            options.border_y,
            self.reference.total_size(),
        )?;
        info!(
            "Interior {}x{}, {:.3} bp per pixel",
            layout.width, layout.height, layout.ratio
        );

        let categories = self
            .categories
            .partition(sample.records(), options.category_scale / layout.ratio)?;
        for category in &categories {
            debug!("Tier {}: {} variants", category.tier, category.variants.len());
        }

        let (common, rare) = split_passes(&categories, options.common_tiers);
        let mut skipped = 0usize;

        for category in common {
            skipped += self.draw_category(&mut canvas, &layout, category);
        }
        if let Some(filter) = options.internal_filter {
            for _ in 0..options.internal_filter_repeats {
                canvas = filter.apply(&canvas);
            }
        }
        for category in rare {
            skipped += self.draw_category(&mut canvas, &layout, category);
        }

        if let Some(filter) = options.final_filter {
            canvas = filter.apply(&canvas);
        }
        if skipped > 0 {
            debug!("{} variants had no glyph or mapped position", skipped);
        }

        Ok(match mode {
            ImageMode::Rgba => DynamicImage::ImageRgba8(canvas),
            ImageMode::Rgb => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()),
        })
    }

    /// Stamp every variant of one tier; returns how many were skipped.
    fn draw_category(&self, canvas: &mut RgbaImage, layout: &Layout, category: &RarityCategory) -> usize {
        let mut skipped = 0;
        for variant in &category.variants {
            let Some(mark) = self
                .marks
                .group_for_alt(&variant.alt)
                .and_then(|group| group.mark(category.tier))
            else {
                skipped += 1;
                continue;
            };
            let absolute = self
                .reference
                .chrom_absolute_position(variant.chromosome, variant.position);
            let Some((x, y)) = layout.locate(absolute) else {
                skipped += 1;
                continue;
            };

            match mark.glyph() {
                Glyph::Pixel(color) => put_pixel(canvas, x, y, *color),
                Glyph::Stamp(stamp) => {
                    let left = x - (stamp.width() / 2) as i64;
                    let top = y - (stamp.height() / 2) as i64;
                    paste(canvas, stamp, left, top);
                }
            }
        }
        skipped
    }
}

fn open_canvas(options: &RenderOptions) -> Result<(RgbaImage, ImageMode)> {
    if let Some(path) = &options.background_image {
        if !path.exists() {
            return Err(Error::InputNotFound(path.clone()));
        }
        let background = image::open(path)?;
        if background.width() < MINIMAL_WIDTH {
            return Err(Error::Validation(format!(
                "image width must be at least {}, got {}",
                MINIMAL_WIDTH,
                background.width()
            )));
        }
        if background.height() < MINIMAL_HEIGHT {
            return Err(Error::Validation(format!(
                "image height must be at least {}, got {}",
                MINIMAL_HEIGHT,
                background.height()
            )));
        }
        let mode = if background.color().has_alpha() {
            ImageMode::Rgba
        } else {
            ImageMode::Rgb
        };
        return Ok((background.to_rgba8(), mode));
    }

    let width = options
        .width
        .ok_or_else(|| Error::Configuration("expected image width".to_string()))?;
    let height = options
        .height
        .ok_or_else(|| Error::Configuration("expected image height".to_string()))?;
    Ok((RgbaImage::from_pixel(width, height, BLACK.to_rgba()), options.image_mode))
}
