use std::io::BufRead;
use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::input::open_input;

/// Population frequency of each variant, keyed by [`crate::key::search_key`].
#[derive(Debug, Default, Clone)]
pub struct FrequencyTable {
    data: FxHashMap<u64, f64>,
}

impl FrequencyTable {
    /// Load a `key frequency` table.
    pub fn open(path: &Path) -> Result<Self> {
        info!("Loading population frequencies from {:?}...", path);
        let table = Self::from_reader(open_input(path)?)?;
        info!("Loaded {} frequency entries", table.len());
        Ok(table)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut data = FxHashMap::default();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = line_no as u64 + 1;
            let mut fields = line.split_whitespace();
            let (Some(key), Some(freq)) = (fields.next(), fields.next()) else {
                if line.trim().is_empty() {
                    continue;
                }
                return Err(Error::parse(line_no, "expected `key frequency`"));
            };
            let key: u64 = key
                .parse()
                .map_err(|_| Error::parse(line_no, format!("invalid key `{key}`")))?;
            let freq: f64 = freq
                .parse()
                .map_err(|_| Error::parse(line_no, format!("invalid frequency `{freq}`")))?;
            data.insert(key, freq);
        }
        Ok(FrequencyTable { data })
    }

    pub fn insert(&mut self, key: u64, freq: f64) {
        self.data.insert(key, freq);
    }

    pub fn lookup(&self, key: u64) -> Result<f64> {
        self.data.get(&key).copied().ok_or(Error::MissingFrequency(key))
    }

    pub fn lookup_or(&self, key: u64, default: f64) -> f64 {
        self.data.get(&key).copied().unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl FromIterator<(u64, f64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (u64, f64)>>(iter: I) -> Self {
        FrequencyTable {
            data: iter.into_iter().collect(),
        }
    }
}
