//! Code point ranges and Unicode case handling.
//!
//! Case-insensitive matching uses *simple* case mappings: a code point maps to
//! another single code point or to itself. Multi-character expansions (such as
//! `ß` to `SS`) are treated as "no mapping".

use std::sync::OnceLock;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::bitset::BitSet;

/// One past the highest Unicode code point.
pub const CODE_POINT_LIMIT: u32 = 0x11_0000;

/// Code points at or above this have no case mapping (Adlam ends at U+1E943).
const CASE_TABLE_LIMIT: u32 = 0x1_e944;

/// Inclusive range of code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CharRange {
    pub lo: u32,
    pub hi: u32,
}

impl CharRange {
    #[must_use]
    pub const fn new(lo: u32, hi: u32) -> Self {
        assert!(lo <= hi, "inverted character range");
        Self { lo, hi }
    }

    #[must_use]
    pub const fn single(c: u32) -> Self {
        Self { lo: c, hi: c }
    }

    #[must_use]
    pub const fn from_chars(lo: char, hi: char) -> Self {
        Self::new(lo as u32, hi as u32)
    }

    #[must_use]
    pub const fn contains(self, c: u32) -> bool {
        self.lo <= c && c <= self.hi
    }

    #[must_use]
    pub const fn is_ascii(self) -> bool {
        self.hi < 128
    }
}

fn single_char(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    let first = mapped.next()?;
    mapped.next().is_none().then_some(first)
}

/// Simple uppercase mapping of a code point.
#[must_use]
pub fn to_upper(c: u32) -> u32 {
    char::from_u32(c)
        .and_then(|ch| single_char(ch.to_uppercase()))
        .map_or(c, u32::from)
}

/// Simple lowercase mapping of a code point.
#[must_use]
pub fn to_lower(c: u32) -> u32 {
    char::from_u32(c)
        .and_then(|ch| single_char(ch.to_lowercase()))
        .map_or(c, u32::from)
}

struct CaseTables {
    /// Code points whose uppercase mapping differs from themselves.
    upper_diff: BitSet,
    /// Code points whose lowercase mapping differs from themselves.
    lower_diff: BitSet,
}

fn case_tables() -> &'static CaseTables {
    static TABLES: OnceLock<CaseTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut upper_diff = BitSet::with_capacity(CASE_TABLE_LIMIT);
        let mut lower_diff = BitSet::with_capacity(CASE_TABLE_LIMIT);
        for c in 0..CASE_TABLE_LIMIT {
            if to_upper(c) != c {
                upper_diff.insert(c);
            }
            if to_lower(c) != c {
                lower_diff.insert(c);
            }
        }
        log::trace!(
            "case tables: {} upper / {} lower differing code points",
            upper_diff.len(),
            lower_diff.len()
        );
        CaseTables {
            upper_diff,
            lower_diff,
        }
    })
}

/// Add the case counterparts of every member of `set`.
pub fn expand_case(set: &mut BitSet) {
    let tables = case_tables();
    let mut uppers = set.clone();
    uppers.intersect_with(&tables.upper_diff);
    let mut lowers = set.clone();
    lowers.intersect_with(&tables.lower_diff);
    set.extend(uppers.iter().map(to_upper));
    set.extend(lowers.iter().map(to_lower));
}

/// Normalize a character class into ascending, non-overlapping ranges.
///
/// Case expansion happens before negation: `[^a]` without case sensitivity
/// excludes both `a` and `A`.
#[must_use]
pub fn ordered_ranges(ranges: &[CharRange], negated: bool, ignore_case: bool) -> Vec<CharRange> {
    let mut set = BitSet::from_ranges(ranges);
    if ignore_case {
        expand_case(&mut set);
    }
    if negated {
        set.complement_within(CODE_POINT_LIMIT);
    }
    set.to_ranges()
}
