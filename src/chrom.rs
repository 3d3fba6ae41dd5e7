use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const PREFIX_UCSC: &str = "chr";
const PREFIX_REFSEQ: &str = "NC_";
const X_NUMBER: u8 = 23;
const Y_NUMBER: u8 = 24;

/// Number of nuclear chromosomes in canonical order (1..22, X, Y).
pub const CHROMOSOME_COUNT: usize = 24;

/// A nuclear chromosome, stored as its canonical number 1..=24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chromosome(u8);

impl Chromosome {
    /// Every chromosome in canonical order.
    pub const ALL: [Chromosome; CHROMOSOME_COUNT] = {
        let mut all = [Chromosome(1); CHROMOSOME_COUNT];
        let mut i = 0;
        while i < CHROMOSOME_COUNT {
            all[i] = Chromosome(i as u8 + 1);
            i += 1;
        }
        all
    };

    pub fn from_number(number: u8) -> Option<Self> {
        (1..=Y_NUMBER).contains(&number).then_some(Chromosome(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based slot in canonical order.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl FromStr for Chromosome {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::Validation(format!("malformed chromosome name `{name}`"));

        let short = if let Some(rest) = name.strip_prefix(PREFIX_UCSC) {
            rest
        } else if let Some(rest) = name.strip_prefix(PREFIX_REFSEQ) {
            // NC_000001.11 -> 1, version suffix dropped
            let accession = rest.split('.').next().unwrap_or(rest);
            let number: u8 = accession.parse().map_err(|_| malformed())?;
            return Chromosome::from_number(number).ok_or_else(malformed);
        } else {
            name
        };

        let number = match short {
            "X" => X_NUMBER,
            "Y" => Y_NUMBER,
            other => other.parse().map_err(|_| malformed())?,
        };
        Chromosome::from_number(number).ok_or_else(malformed)
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            X_NUMBER => write!(f, "X"),
            Y_NUMBER => write!(f, "Y"),
            n => write!(f, "{}", n),
        }
    }
}
