use std::ops::Range;

use log::debug;

use crate::error::{Error, Result};
use crate::sample::VariantRecord;

pub const DEFAULT_CATEGORY_SIZES: [usize; 8] = [10, 20, 50, 100, 200, 500, 750, 750];

/// Fewest buckets a partition may have.
pub const MIN_CATEGORY_COUNT: usize = 6;

/// Variants sharing one rarity tier. Tier 1 holds the rarest.
#[derive(Debug, Clone, PartialEq)]
pub struct RarityCategory {
    pub tier: usize,
    pub variants: Vec<VariantRecord>,
}

/// Splits frequency-sorted variants into fixed-proportion rarity buckets.
#[derive(Debug, Clone)]
pub struct Categories {
    sizes: Vec<usize>,
}

impl Categories {
    pub fn new(sizes: Vec<usize>) -> Result<Self> {
        if sizes.len() < MIN_CATEGORY_COUNT {
            return Err(Error::Configuration(format!(
                "need at least {} categories, got {}",
                MIN_CATEGORY_COUNT,
                sizes.len()
            )));
        }
        Ok(Categories { sizes })
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Index ranges of every bucket for `ratio`. Each bucket spans
    /// `trunc(size * ratio)` items and starts where the previous one stopped.
    pub fn ranges(&self, ratio: f64) -> Result<Vec<Range<usize>>> {
        if !(ratio > 0.0) || !ratio.is_finite() {
            return Err(Error::Configuration(format!("category ratio must be positive, got {ratio}")));
        }
        let mut limit = 0usize;
        let ranges: Vec<Range<usize>> = self
            .sizes
            .iter()
            .map(|&size| {
                let span = (size as f64 * ratio) as usize;
                let range = limit..limit.saturating_add(span);
                limit = range.end;
                range
            })
            .collect();
        debug!("Category ranges for ratio {:.4}: {:?}", ratio, ranges);
        Ok(ranges)
    }

    /// Sort by ascending frequency, slice into buckets, and return them from
    /// the most common tier down to tier 1. Variants past the last bucket are
    /// dropped.
    pub fn partition(&self, mut variants: Vec<VariantRecord>, ratio: f64) -> Result<Vec<RarityCategory>> {
        let ranges = self.ranges(ratio)?;
        variants.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));

        let total = variants.len();
        let mut categories: Vec<RarityCategory> = ranges
            .into_iter()
            .enumerate()
            .map(|(i, range)| {
                let start = range.start.min(total);
                let stop = range.end.min(total);
                RarityCategory {
                    tier: i + 1,
                    variants: variants[start..stop].to_vec(),
                }
            })
            .collect();
        categories.reverse();
        Ok(categories)
    }
}

impl Default for Categories {
    fn default() -> Self {
        Categories {
            sizes: DEFAULT_CATEGORY_SIZES.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrom::Chromosome;

    fn variant(pos: u64, frequency: f64) -> VariantRecord {
        VariantRecord {
            chromosome: Chromosome::from_number(1).unwrap(),
            position: pos,
            alt: "A".to_string(),
            frequency,
        }
    }

    #[test]
    fn ranges_at_unit_ratio_follow_sizes() {
        let ranges = Categories::default().ranges(1.0).unwrap();
        assert_eq!(
            ranges,
            vec![0..10, 10..30, 30..80, 80..180, 180..380, 380..880, 880..1630, 1630..2380]
        );
    }

    #[test]
    fn ranges_truncate_each_span() {
        let categories = Categories::new(vec![1, 1, 1, 1, 1, 3]).unwrap();
        assert_eq!(
            categories.ranges(1.5).unwrap(),
            vec![0..1, 1..2, 2..3, 3..4, 4..5, 5..9]
        );
    }

    #[test]
    fn rejects_bad_ratio_and_short_tables() {
        let categories = Categories::default();
        assert!(matches!(categories.ranges(0.0), Err(Error::Configuration(_))));
        assert!(matches!(categories.ranges(-2.0), Err(Error::Configuration(_))));
        assert!(categories.ranges(f64::NAN).is_err());
        assert!(matches!(Categories::new(vec![1, 2, 3, 4, 5]), Err(Error::Configuration(_))));
        assert_eq!(Categories::new(vec![1; 6]).unwrap().len(), 6);
    }

    #[test]
    fn partition_puts_rarest_in_tier_one_and_returns_common_first() {
        let categories = Categories::new(vec![1, 1, 1, 1, 1, 1]).unwrap();
        let variants = vec![
            variant(1, 0.5),
            variant(2, 0.01),
            variant(3, 0.2),
            variant(4, 0.001),
            variant(5, 0.9),
        ];
        let tiers = categories.partition(variants, 1.0).unwrap();
        let numbers: Vec<usize> = tiers.iter().map(|c| c.tier).collect();
        assert_eq!(numbers, vec![6, 5, 4, 3, 2, 1]);

        let tier = |n: usize| &tiers.iter().find(|c| c.tier == n).unwrap().variants;
        assert_eq!(tier(1)[0].position, 4);
        assert_eq!(tier(2)[0].position, 2);
        assert_eq!(tier(5)[0].position, 5);
        assert!(tier(6).is_empty());
    }

    #[test]
    fn partition_drops_overflow() {
        let categories = Categories::new(vec![1, 1, 1, 1, 1, 1]).unwrap();
        let variants: Vec<_> = (0..10).map(|i| variant(i, i as f64 / 10.0)).collect();
        let tiers = categories.partition(variants, 1.0).unwrap();
        let kept: usize = tiers.iter().map(|c| c.variants.len()).sum();
        assert_eq!(kept, 6);
        assert!(tiers.iter().flat_map(|c| &c.variants).all(|v| v.position < 6));
    }
}
