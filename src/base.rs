use std::fmt;

/// A nucleotide as it appears in reference and genotype tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    A,
    C,
    G,
    T,
}

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'A' => Some(Base::A),
            b'C' => Some(Base::C),
            b'G' => Some(Base::G),
            b'T' => Some(Base::T),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Base::A => b'A',
            Base::C => b'C',
            Base::G => b'G',
            Base::T => b'T',
        }
    }

    /// 1-based code used by the canonical variant key.
    pub(crate) fn code(self) -> u64 {
        match self {
            Base::A => 1,
            Base::C => 2,
            Base::G => 3,
            Base::T => 4,
        }
    }

    pub(crate) fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Base::A),
            2 => Some(Base::C),
            3 => Some(Base::G),
            4 => Some(Base::T),
            _ => None,
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}
