//! Operation hint flags

use std::ops::{BitOr, BitOrAssign};

/// Bit-mask of hints passed to build and multiplication calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hints(u32);

impl Hints {
    /// No hints
    pub const NONE: Hints = Hints(0x0);
    /// Input pairs are already in row-major, column-ascending order without duplicates
    pub const VALUES_SORTED: Hints = Hints(0x1);
    /// Accumulate the operation result into the result matrix
    pub const ACCUMULATE: Hints = Hints(0x2);

    const ALL: u32 = Self::VALUES_SORTED.0 | Self::ACCUMULATE.0;

    /// Build hints from raw bits, dropping unknown flags
    #[inline]
    pub fn from_bits_truncate(bits: u32) -> Self {
        Hints(bits & Self::ALL)
    }

    /// Raw bits
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every flag of `other` is set
    #[inline]
    pub fn contains(self, other: Hints) -> bool {
        self.0 & other.0 == other.0
    }

    /// Hints for a build call
    pub fn sorted(is_sorted: bool) -> Self {
        if is_sorted {
            Self::VALUES_SORTED
        } else {
            Self::NONE
        }
    }
}

impl BitOr for Hints {
    type Output = Hints;

    fn bitor(self, rhs: Hints) -> Hints {
        Hints(self.0 | rhs.0)
    }
}

impl BitOrAssign for Hints {
    fn bitor_assign(&mut self, rhs: Hints) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_flags() {
        let h = Hints::VALUES_SORTED | Hints::ACCUMULATE;
        assert!(h.contains(Hints::VALUES_SORTED));
        assert!(h.contains(Hints::ACCUMULATE));
        assert!(!Hints::NONE.contains(Hints::ACCUMULATE));
        assert_eq!(Hints::from_bits_truncate(0xF0 | 0x1), Hints::VALUES_SORTED);
        assert_eq!(Hints::sorted(false), Hints::NONE);
    }
}
