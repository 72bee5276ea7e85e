use crate::bitset::BitSet;

use super::TokenId;

/// Set of token types, keyed by ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TokenSet {
    bits: BitSet,
}

impl TokenSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: BitSet::new() }
    }

    pub fn insert(&mut self, token: TokenId) -> bool {
        self.bits.insert(token.ordinal())
    }

    pub fn remove(&mut self, token: TokenId) {
        self.bits.remove(token.ordinal());
    }

    #[must_use]
    pub fn contains(&self, token: TokenId) -> bool {
        self.bits.contains(token.ordinal())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn union_with(&mut self, other: &Self) -> bool {
        self.bits.union_with(&other.bits)
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.bits.iter().map(TokenId)
    }
}

impl FromIterator<TokenId> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenId>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().map(TokenId::ordinal).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_set_ops() {
        let mut set: TokenSet = [TokenId(3), TokenId(1)].into_iter().collect();
        assert!(set.insert(TokenId(70)));
        assert!(!set.insert(TokenId(1)));
        set.remove(TokenId(3));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![TokenId(1), TokenId(70)]);

        let other: TokenSet = [TokenId(2)].into_iter().collect();
        assert!(set.union_with(&other));
        assert_eq!(set.len(), 3);
        assert!(set.contains(TokenId(2)));
    }
}
