use std::io::BufRead;
use std::path::Path;

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::base::Base;
use crate::chrom::{Chromosome, CHROMOSOME_COUNT};
use crate::error::{Error, Result};
use crate::input::open_input;

/// Known reference bases of one chromosome.
#[derive(Debug, Default, Clone)]
struct ChromData {
    positions: FxHashMap<u64, Base>,
    max_position: u64,
}

impl ChromData {
    fn insert(&mut self, pos: u64, base: Base) {
        self.positions.insert(pos, base);
        self.max_position = self.max_position.max(pos);
    }

    /// Span this chromosome occupies in the linear layout.
    fn length(&self) -> u64 {
        self.max_position.saturating_sub(1)
    }
}

/// Reference base at every known position, plus the linear layout that
/// concatenates chromosomes in canonical order.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    chroms: Vec<ChromData>,
    offsets: [u64; CHROMOSOME_COUNT],
    total_size: u64,
}

impl ReferenceIndex {
    /// Load a reference table: `chrom pos <unused> base`, one row per position.
    pub fn open(path: &Path) -> Result<Self> {
        info!("Loading reference bases from {:?}...", path);
        let index = Self::from_reader(open_input(path)?)?;
        info!(
            "Loaded {} reference positions, genome span: {} bp",
            index.position_count(),
            index.total_size
        );
        Ok(index)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut records = Vec::new();
        let mut skipped_mito = 0usize;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = line_no as u64 + 1;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() || parts[0].starts_with('#') {
                continue;
            }
            if parts.len() < 4 {
                return Err(Error::parse(line_no, format!("expected 4 columns, found {}", parts.len())));
            }
            if parts[0].starts_with('M') || parts[0].starts_with("chrM") {
                skipped_mito += 1;
                continue;
            }

            let chrom: Chromosome = parts[0].parse()?;
            let pos: u64 = parts[1]
                .parse()
                .map_err(|_| Error::parse(line_no, format!("invalid position `{}`", parts[1])))?;
            let base = match parts[3].as_bytes() {
                [b] => Base::from_byte(b.to_ascii_uppercase()),
                _ => None,
            }
            .ok_or_else(|| Error::parse(line_no, format!("invalid reference base `{}`", parts[3])))?;

            records.push((chrom, pos, base));
        }

        if skipped_mito > 0 {
            debug!("Skipped {} mitochondrial reference rows", skipped_mito);
        }

        Ok(Self::from_records(records))
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (Chromosome, u64, Base)>,
    {
        let mut chroms = vec![ChromData::default(); CHROMOSOME_COUNT];
        for (chrom, pos, base) in records {
            chroms[chrom.index()].insert(pos, base);
        }

        let mut offsets = [0u64; CHROMOSOME_COUNT];
        let mut current = 0u64;
        for chrom in Chromosome::ALL {
            offsets[chrom.index()] = current;
            current += chroms[chrom.index()].length();
        }

        ReferenceIndex {
            chroms,
            offsets,
            total_size: current,
        }
    }

    pub fn get(&self, chrom: Chromosome, pos: u64) -> Option<Base> {
        self.chroms[chrom.index()].positions.get(&pos).copied()
    }

    pub fn base_at(&self, chrom: Chromosome, pos: u64) -> Result<Base> {
        self.get(chrom, pos).ok_or(Error::UnknownPosition {
            chromosome: chrom,
            position: pos,
        })
    }

    /// Linear coordinate of `pos`: lengths of all preceding chromosomes plus
    /// `pos`. Returns 0 when `chrom` is not a canonical chromosome name.
    pub fn absolute_position(&self, chrom: &str, pos: u64) -> u64 {
        match chrom.parse::<Chromosome>() {
            Ok(chrom) => self.chrom_absolute_position(chrom, pos),
            Err(_) => 0,
        }
    }

    pub fn chrom_absolute_position(&self, chrom: Chromosome, pos: u64) -> u64 {
        self.offsets[chrom.index()] + pos
    }

    /// Sum of all chromosome lengths.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chromosomes(&self) -> &'static [Chromosome] {
        &Chromosome::ALL
    }

    pub fn chromosome_length(&self, chrom: Chromosome) -> u64 {
        self.chroms[chrom.index()].length()
    }

    pub fn position_count(&self) -> usize {
        self.chroms.iter().map(|c| c.positions.len()).sum()
    }

    /// Every known position as `(running index, chromosome, position)`,
    /// chromosomes in canonical order and positions ascending. Each call
    /// starts a fresh traversal.
    pub fn all_positions(&self) -> impl Iterator<Item = (usize, Chromosome, u64)> + '_ {
        Chromosome::ALL
            .iter()
            .flat_map(move |&chrom| {
                let mut sorted: Vec<u64> = self.chroms[chrom.index()].positions.keys().copied().collect();
                sorted.sort_unstable();
                sorted.into_iter().map(move |pos| (chrom, pos))
            })
            .enumerate()
            .map(|(index, (chrom, pos))| (index, chrom, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrom(name: &str) -> Chromosome {
        name.parse().unwrap()
    }

    fn sample_index() -> ReferenceIndex {
        let table = "\
1\t100\t.\tA
1\t200\t.\tC
2\t50\t.\tG
2\t1000\t.\tt
X\t10\t.\tT
MT\t5\t.\tA
";
        ReferenceIndex::from_reader(table.as_bytes()).unwrap()
    }

    #[test]
    fn loads_bases_and_lengths() {
        let index = sample_index();
        assert_eq!(index.base_at(chrom("1"), 200).unwrap(), Base::C);
        assert_eq!(index.base_at(chrom("2"), 1000).unwrap(), Base::T);
        assert_eq!(index.chromosome_length(chrom("1")), 199);
        assert_eq!(index.chromosome_length(chrom("2")), 999);
        assert_eq!(index.chromosome_length(chrom("X")), 9);
        assert_eq!(index.total_size(), 199 + 999 + 9);
        assert_eq!(index.position_count(), 5);
    }

    #[test]
    fn unknown_position_is_an_error() {
        let index = sample_index();
        let err = index.base_at(chrom("1"), 150).unwrap_err();
        assert!(matches!(err, Error::UnknownPosition { position: 150, .. }));
        assert!(index.get(chrom("Y"), 1).is_none());
    }

    #[test]
    fn absolute_positions_follow_canonical_order() {
        let index = sample_index();
        assert_eq!(index.absolute_position("1", 100), 100);
        assert_eq!(index.absolute_position("chr2", 50), 199 + 50);
        // chromosomes 3..22 are empty and add nothing
        assert_eq!(index.absolute_position("X", 10), 199 + 999 + 10);
        assert_eq!(index.absolute_position("MT", 10), 0);
        assert_eq!(index.absolute_position("scaffold_7", 10), 0);
    }

    #[test]
    fn all_positions_is_sorted_and_restartable() {
        let index = sample_index();
        let first: Vec<_> = index.all_positions().collect();
        assert_eq!(
            first,
            vec![
                (0, chrom("1"), 100),
                (1, chrom("1"), 200),
                (2, chrom("2"), 50),
                (3, chrom("2"), 1000),
                (4, chrom("X"), 10),
            ]
        );
        let second: Vec<_> = index.all_positions().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn max_position_tracks_inserts_in_any_order() {
        let index = ReferenceIndex::from_records(vec![
            (chrom("3"), 500, Base::A),
            (chrom("3"), 20, Base::C),
            (chrom("3"), 900, Base::G),
            (chrom("3"), 40, Base::T),
        ]);
        assert_eq!(index.chromosome_length(chrom("3")), 899);
    }

    #[test]
    fn malformed_rows_fail() {
        let err = ReferenceIndex::from_reader("1 abc . A\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
        let err = ReferenceIndex::from_reader("1 10 .\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
        let err = ReferenceIndex::from_reader("1 10 . N\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
        let err = ReferenceIndex::from_reader("GL000192.1 10 . A\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
