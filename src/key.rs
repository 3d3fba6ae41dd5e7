//! Canonical integer key joining sample variants to population frequencies.
//!
//! Layout, most significant first: chromosome (5 bits), position (32 bits),
//! reference allele code (5 bits), alternate allele code (5 bits). An allele
//! code is 1..=4 for a single base and 5..=20 for an ordered pair of bases.

use crate::base::Base;
use crate::error::{Error, Result};

const ALLELE_BITS: u32 = 5;
const POSITION_BITS: u32 = 32;
const ALLELE_MASK: u64 = (1 << ALLELE_BITS) - 1;
const POSITION_MASK: u64 = (1 << POSITION_BITS) - 1;

/// Build the key for `(chromosome number, position, ref, alt)`.
///
/// Alleles are one base (`"G"`) or two bases, with or without a comma
/// (`"A,C"` or `"AC"`).
pub fn search_key(chrom: u8, pos: u64, reference: &str, alt: &str) -> Result<u64> {
    if !(1..=24).contains(&chrom) {
        return Err(Error::Validation(format!("chromosome number {chrom} out of range")));
    }
    if pos > POSITION_MASK {
        return Err(Error::Validation(format!("position {pos} does not fit the key")));
    }
    let ref_code = allele_code(reference)?;
    let alt_code = allele_code(alt)?;

    Ok((chrom as u64) << (POSITION_BITS + 2 * ALLELE_BITS)
        | pos << (2 * ALLELE_BITS)
        | ref_code << ALLELE_BITS
        | alt_code)
}

/// Split a key back into `(chromosome number, position, ref, alt)`.
/// Two-base alleles come back comma separated.
pub fn decode(key: u64) -> Result<(u8, u64, String, String)> {
    let invalid = || Error::Validation(format!("invalid search key {key}"));
    let alt = allele_string(key & ALLELE_MASK).ok_or_else(invalid)?;
    let reference = allele_string((key >> ALLELE_BITS) & ALLELE_MASK).ok_or_else(invalid)?;
    let pos = (key >> (2 * ALLELE_BITS)) & POSITION_MASK;
    let chrom = key >> (POSITION_BITS + 2 * ALLELE_BITS);
    if !(1..=24).contains(&chrom) {
        return Err(invalid());
    }
    Ok((chrom as u8, pos, reference, alt))
}

fn allele_code(allele: &str) -> Result<u64> {
    let bases: Vec<Base> = allele
        .bytes()
        .filter(|&b| b != b',')
        .map(|b| Base::from_byte(b.to_ascii_uppercase()))
        .collect::<Option<_>>()
        .ok_or_else(|| Error::Validation(format!("allele `{allele}` is not ACGT")))?;

    match bases.as_slice() {
        [a] => Ok(a.code()),
        [a, b] => Ok(4 + (a.code() - 1) * 4 + b.code()),
        _ => Err(Error::Validation(format!("allele `{allele}` must be one or two bases"))),
    }
}

fn allele_string(code: u64) -> Option<String> {
    match code {
        1..=4 => Base::from_code(code).map(|b| b.to_string()),
        5..=20 => {
            let pair = code - 5;
            let a = Base::from_code(pair / 4 + 1)?;
            let b = Base::from_code(pair % 4 + 1)?;
            Some(format!("{a},{b}"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_what_it_encodes() {
        let key = search_key(1, 200, "C", "G").unwrap();
        assert_eq!(decode(key).unwrap(), (1, 200, "C".to_string(), "G".to_string()));

        let key = search_key(24, 59_000_000, "T", "A,C").unwrap();
        assert_eq!(
            decode(key).unwrap(),
            (24, 59_000_000, "T".to_string(), "A,C".to_string())
        );
    }

    #[test]
    fn comma_is_optional_in_pairs() {
        assert_eq!(
            search_key(3, 10, "A", "CG").unwrap(),
            search_key(3, 10, "A", "C,G").unwrap()
        );
    }

    #[test]
    fn distinct_inputs_give_distinct_keys() {
        let a = search_key(1, 200, "C", "G").unwrap();
        let b = search_key(1, 200, "G", "C").unwrap();
        let c = search_key(2, 200, "C", "G").unwrap();
        let d = search_key(1, 201, "C", "G").unwrap();
        assert!(a != b && a != c && a != d && b != c);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(search_key(0, 1, "A", "C").is_err());
        assert!(search_key(25, 1, "A", "C").is_err());
        assert!(search_key(1, 1 << 33, "A", "C").is_err());
        assert!(search_key(1, 1, "N", "C").is_err());
        assert!(search_key(1, 1, "A", "ACG").is_err());
        assert!(search_key(1, 1, "A", "").is_err());
    }
}
