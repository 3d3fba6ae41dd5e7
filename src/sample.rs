use std::collections::BTreeMap;
use std::fmt;
use std::io::BufRead;
use std::path::Path;

use log::{debug, info};

use crate::base::Base;
use crate::chrom::Chromosome;
use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::input::open_input;
use crate::key::search_key;
use crate::reference::ReferenceIndex;

/// Alternate allele string of a call that matches the reference.
pub const NO_ALT: &str = ".";

/// One detected variant with its population frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    pub chromosome: Chromosome,
    pub position: u64,
    pub alt: String,
    pub frequency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenotypeCode {
    HaploidRef,
    HaploidAlt,
    HomRef,
    Het,
    HetAlt,
    HomAlt,
}

impl GenotypeCode {
    pub fn as_str(self) -> &'static str {
        match self {
            GenotypeCode::HaploidRef => "0",
            GenotypeCode::HaploidAlt => "1",
            GenotypeCode::HomRef => "0/0",
            GenotypeCode::Het => "0/1",
            GenotypeCode::HetAlt => "1/2",
            GenotypeCode::HomAlt => "1/1",
        }
    }
}

impl fmt::Display for GenotypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed alleles compared against the reference base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub alt: String,
    pub genotype: GenotypeCode,
}

impl Call {
    pub fn is_variant(&self) -> bool {
        self.alt != NO_ALT
    }
}

/// Derive the alternate allele and genotype code from one or two observed
/// alleles. Alleles past the second are ignored.
pub fn call_genotype(reference: Base, alleles: &[Base]) -> Option<Call> {
    let call = |alt: String, genotype| Call { alt, genotype };
    let no_alt = || NO_ALT.to_string();

    match *alleles {
        [] => None,
        [a] if a == reference => Some(call(no_alt(), GenotypeCode::HaploidRef)),
        [a] => Some(call(a.to_string(), GenotypeCode::HaploidAlt)),
        [a, b, ..] if a == b => {
            if a == reference {
                Some(call(no_alt(), GenotypeCode::HomRef))
            } else {
                Some(call(a.to_string(), GenotypeCode::HomAlt))
            }
        }
        [a, b, ..] => {
            if reference == a {
                Some(call(b.to_string(), GenotypeCode::Het))
            } else if reference == b {
                Some(call(a.to_string(), GenotypeCode::Het))
            } else {
                Some(call(format!("{a},{b}"), GenotypeCode::HetAlt))
            }
        }
    }
}

/// Variants of one sample: chromosome -> position -> (alt, frequency).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SampleData {
    data: BTreeMap<Chromosome, BTreeMap<u64, (String, f64)>>,
}

impl SampleData {
    pub fn insert(&mut self, chrom: Chromosome, pos: u64, alt: String, frequency: f64) {
        self.data.entry(chrom).or_default().insert(pos, (alt, frequency));
    }

    pub fn get(&self, chrom: Chromosome, pos: u64) -> Option<&(String, f64)> {
        self.data.get(&chrom).and_then(|positions| positions.get(&pos))
    }

    pub fn len(&self) -> usize {
        self.data.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into records, chromosomes and positions ascending.
    pub fn records(&self) -> Vec<VariantRecord> {
        self.data
            .iter()
            .flat_map(|(&chromosome, positions)| {
                positions.iter().map(move |(&position, (alt, frequency))| VariantRecord {
                    chromosome,
                    position,
                    alt: alt.clone(),
                    frequency: *frequency,
                })
            })
            .collect()
    }
}

/// Why sample lines were kept or dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseStats {
    pub kept: usize,
    pub malformed: usize,
    pub insertion_ids: usize,
    pub mitochondrial: usize,
    pub non_acgt: usize,
    pub unknown_position: usize,
    pub reference_calls: usize,
    pub no_frequency: usize,
}

/// Diffs a raw genotype export against the reference and frequency tables.
pub struct SampleParser<'a> {
    reference: &'a ReferenceIndex,
    frequencies: &'a FrequencyTable,
}

impl<'a> SampleParser<'a> {
    pub fn new(reference: &'a ReferenceIndex, frequencies: &'a FrequencyTable) -> Self {
        SampleParser {
            reference,
            frequencies,
        }
    }

    /// Parse a (possibly gzipped) genotype file.
    pub fn parse(&self, path: &Path) -> Result<SampleData> {
        info!("Reading sample {:?}...", path);
        let (data, stats) = self.read(open_input(path)?)?;
        info!("Kept {} variants from {:?}", stats.kept, path);
        debug!("Sample parse summary: {:?}", stats);
        Ok(data)
    }

    pub fn read<R: BufRead>(&self, reader: R) -> Result<(SampleData, ParseStats)> {
        let mut data = SampleData::default();
        let mut stats = ParseStats::default();

        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                stats.malformed += 1;
                continue;
            }
            let (id, chrom_name, pos, genotype) = (parts[0], parts[1], parts[2], parts[3]);

            if id.starts_with('i') {
                stats.insertion_ids += 1;
                continue;
            }
            if chrom_name.starts_with('M') {
                stats.mitochondrial += 1;
                continue;
            }

            let genotype = genotype.to_ascii_uppercase();
            let Some(alleles) = genotype.bytes().map(Base::from_byte).collect::<Option<Vec<Base>>>() else {
                stats.non_acgt += 1;
                continue;
            };

            let Ok(pos) = pos.parse::<u64>() else {
                stats.malformed += 1;
                continue;
            };

            let Some((chrom, reference)) = chrom_name
                .parse::<Chromosome>()
                .ok()
                .and_then(|chrom| self.reference.get(chrom, pos).map(|base| (chrom, base)))
            else {
                stats.unknown_position += 1;
                continue;
            };

            let Some(call) = call_genotype(reference, &alleles) else {
                stats.non_acgt += 1;
                continue;
            };
            if !call.is_variant() {
                stats.reference_calls += 1;
                continue;
            }

            let Ok(key) = search_key(chrom.number(), pos, &reference.to_string(), &call.alt) else {
                stats.malformed += 1;
                continue;
            };
            let frequency = self.frequencies.lookup_or(key, 0.0);
            if frequency == 0.0 {
                stats.no_frequency += 1;
                continue;
            }

            data.insert(chrom, pos, call.alt, frequency);
            stats.kept += 1;
        }

        Ok((data, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Base::*;

    fn alt_code(reference: Base, alleles: &[Base]) -> (String, &'static str) {
        let call = call_genotype(reference, alleles).unwrap();
        (call.alt, call.genotype.as_str())
    }

    #[test]
    fn genotype_table() {
        assert_eq!(alt_code(A, &[A]), (".".to_string(), "0"));
        assert_eq!(alt_code(A, &[G]), ("G".to_string(), "1"));
        assert_eq!(alt_code(C, &[C, G]), ("G".to_string(), "0/1"));
        assert_eq!(alt_code(G, &[C, G]), ("C".to_string(), "0/1"));
        assert_eq!(alt_code(T, &[C, G]), ("C,G".to_string(), "1/2"));
        assert_eq!(alt_code(T, &[T, T]), (".".to_string(), "0/0"));
        assert_eq!(alt_code(T, &[A, A]), ("A".to_string(), "1/1"));
        assert!(call_genotype(A, &[]).is_none());
    }

    #[test]
    fn reference_matches_are_never_variants() {
        for base in Base::ALL {
            assert!(!call_genotype(base, &[base]).unwrap().is_variant());
            assert!(!call_genotype(base, &[base, base]).unwrap().is_variant());
        }
    }

    fn fixtures() -> (ReferenceIndex, FrequencyTable) {
        let reference = ReferenceIndex::from_reader(
            "1 100 . A\n1 200 . C\n1 300 . G\nX 50 . T\n".as_bytes(),
        )
        .unwrap();
        let frequencies: FrequencyTable = [
            (search_key(1, 200, "C", "G").unwrap(), 0.02),
            (search_key(1, 100, "A", "T").unwrap(), 0.4),
            (search_key(23, 50, "T", "C").unwrap(), 0.1),
            (search_key(1, 300, "G", "A,C").unwrap(), 0.001),
        ]
        .into_iter()
        .collect();
        (reference, frequencies)
    }

    #[test]
    fn keeps_only_qualifying_variants() {
        let (reference, frequencies) = fixtures();
        let parser = SampleParser::new(&reference, &frequencies);
        let input = "\
# rsid\tchromosome\tposition\tgenotype
rs1\t1\t200\tcg
rs2\t1\t100\tTT
i3\t1\t100\tTT
rs4\tMT\t100\tA
rs5\t1\t100\tD
rs6\t1\t100\t--
rs7\t1\t150\tAG
rs8\t1\t100\tAA
rs9\tX\t50\tC
rs10\t1\t300\tAC
rs11\t1\t300\tGT
rs12\t1\tabc\tAG
rs13\t1
rs14\tXY\t100\tAG
";
        let (data, stats) = parser.read(input.as_bytes()).unwrap();
        let chr1 = Chromosome::from_number(1).unwrap();
        let chr_x = Chromosome::from_number(23).unwrap();

        assert_eq!(data.get(chr1, 200), Some(&("G".to_string(), 0.02)));
        assert_eq!(data.get(chr1, 100), Some(&("T".to_string(), 0.4)));
        assert_eq!(data.get(chr_x, 50), Some(&("C".to_string(), 0.1)));
        assert_eq!(data.get(chr1, 300), Some(&("A,C".to_string(), 0.001)));
        assert_eq!(data.len(), 4);

        assert_eq!(
            stats,
            ParseStats {
                kept: 4,
                malformed: 2,
                insertion_ids: 1,
                mitochondrial: 1,
                non_acgt: 2,
                unknown_position: 2,
                reference_calls: 1,
                no_frequency: 1,
            }
        );
    }

    #[test]
    fn records_are_flattened_in_genome_order() {
        let mut data = SampleData::default();
        let chr2 = Chromosome::from_number(2).unwrap();
        let chr1 = Chromosome::from_number(1).unwrap();
        data.insert(chr2, 5, "A".into(), 0.1);
        data.insert(chr1, 9, "C".into(), 0.2);
        data.insert(chr1, 3, "G".into(), 0.3);
        let order: Vec<(u8, u64)> = data.records().iter().map(|r| (r.chromosome.number(), r.position)).collect();
        assert_eq!(order, vec![(1, 3), (1, 9), (2, 5)]);
    }
}
