//! Render a personal genotype export as a raster of variant glyphs.
//!
//! Each variant found by diffing the sample against the reference becomes a
//! small mark: its color tells which base was substituted, its size how rare
//! the variant is in the population, and its place on the canvas comes from
//! laying the whole genome out as consecutive scan lines.

pub mod base;
pub mod categories;
pub mod chrom;
pub mod color;
pub mod compositor;
pub mod draw;
pub mod error;
pub mod frequency;
pub mod input;
pub mod key;
pub mod mark;
pub mod reference;
pub mod sample;

pub use base::Base;
pub use categories::{Categories, RarityCategory};
pub use chrom::Chromosome;
pub use compositor::{Compositor, ImageMode, Layout, RenderOptions};
pub use draw::Filter;
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use mark::{Glyph, Mark, MarkGroup, MarkKind, MarkSet};
pub use reference::ReferenceIndex;
pub use sample::{SampleData, SampleParser, VariantRecord};
