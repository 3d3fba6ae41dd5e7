use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;

use crate::error::{Error, Result};

/// Open a text table, transparently decompressing gzip (and BGZF) input.
///
/// Compression is detected from the magic bytes rather than the file
/// extension, so `ref_bases.txt` and `ref_bases.txt.gz` are both accepted.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let is_gzip = {
        let buf = reader.fill_buf()?;
        buf.len() >= 2 && buf[0] == 0x1f && buf[1] == 0x8b
    };

    if is_gzip {
        debug!("Reading {:?} as gzip", path);
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}
