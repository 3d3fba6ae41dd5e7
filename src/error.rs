use std::{io, path::PathBuf};

use thiserror::Error;

use crate::chrom::Chromosome;

/// Errors raised while loading tables, parsing samples or rendering.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },
    #[error("unknown reference position {chromosome}:{position}")]
    UnknownPosition { chromosome: Chromosome, position: u64 },
    #[error("no frequency for key {0}")]
    MissingFrequency(u64),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn parse(line: u64, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
