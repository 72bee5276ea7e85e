//! # Regular Expressions
//!
//! The token-pattern AST handed over by the grammar front end.
//!
//! ## Overview
//!
//! - [`Pattern`] is the structural regex: character classes, literals,
//!   sequences, choices, repetition operators and named references.
//! - [`RegularExpression`] wraps a pattern with the token-level metadata:
//!   label, ordinal (declaration priority), `private` flag and case
//!   sensitivity override.
//! - [`TokenRegistry`] assigns ordinals and resolves named references.
//! - [`TokenProduction`] groups [`RegexpSpec`]s under a token kind and a list
//!   of lexical states.
//!
//! Patterns are assumed to be syntactically valid; the automaton builder only
//! reports faults that depend on cross-references (undefined or recursive
//! names) and inverted repetition bounds.
//!
//! ## Usage
//!
//! ```rust
//! use lexnfa::regexp::{CharacterList, Pattern, RegularExpression, TokenRegistry};
//!
//! let mut registry = TokenRegistry::new();
//! let digits = Pattern::one_or_more(Pattern::class(CharacterList::chars('0', '9')));
//! let number = registry.register(RegularExpression::new(digits).with_label("NUMBER"));
//!
//! assert_eq!(registry.by_label("NUMBER"), Some(number));
//! ```

mod production;
mod registry;
mod token_set;

pub use production::{RegexpSpec, TokenKind, TokenProduction};
pub use registry::TokenRegistry;
pub use token_set::TokenSet;

use compact_str::CompactString;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::charset::CharRange;

/// Ordinal of a token type. Lower ordinals were declared earlier and win
/// ties between equally long matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TokenId(pub u32);

impl TokenId {
    /// The implicit end-of-file token.
    pub const EOF: Self = Self(0);

    #[must_use]
    pub const fn ordinal(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Character class: a list of ranges, optionally negated (`[^...]`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CharacterList {
    pub ranges: Vec<CharRange>,
    pub negated: bool,
}

impl CharacterList {
    #[must_use]
    pub const fn new(ranges: Vec<CharRange>) -> Self {
        Self {
            ranges,
            negated: false,
        }
    }

    #[must_use]
    pub const fn negated(ranges: Vec<CharRange>) -> Self {
        Self {
            ranges,
            negated: true,
        }
    }

    /// A class covering the single range `lo..=hi`.
    #[must_use]
    pub fn chars(lo: char, hi: char) -> Self {
        Self::new(vec![CharRange::from_chars(lo, hi)])
    }

    /// Add another range to the class.
    #[must_use]
    pub fn with(mut self, lo: char, hi: char) -> Self {
        self.ranges.push(CharRange::from_chars(lo, hi));
        self
    }
}

/// Regex AST node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Pattern {
    CharClass(CharacterList),
    Literal(CompactString),
    Sequence(Vec<Pattern>),
    Choice(Vec<Pattern>),
    ZeroOrMore(Box<Pattern>),
    OneOrMore(Box<Pattern>),
    ZeroOrOne(Box<Pattern>),
    /// `{min}`, `{min,max}` or `{min,}` (when `max` is `None`).
    Repetition {
        inner: Box<Pattern>,
        min: u32,
        max: Option<u32>,
    },
    /// Reference to another (usually private) regular expression by label.
    Ref(CompactString),
}

impl Pattern {
    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self::Literal(CompactString::new(text))
    }

    #[must_use]
    pub const fn class(list: CharacterList) -> Self {
        Self::CharClass(list)
    }

    #[must_use]
    pub fn zero_or_more(inner: Self) -> Self {
        Self::ZeroOrMore(Box::new(inner))
    }

    #[must_use]
    pub fn one_or_more(inner: Self) -> Self {
        Self::OneOrMore(Box::new(inner))
    }

    #[must_use]
    pub fn zero_or_one(inner: Self) -> Self {
        Self::ZeroOrOne(Box::new(inner))
    }

    #[must_use]
    pub fn repetition(inner: Self, min: u32, max: Option<u32>) -> Self {
        Self::Repetition {
            inner: Box::new(inner),
            min,
            max,
        }
    }

    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self::Ref(CompactString::new(name))
    }

    /// Rewrite a bounded repetition as a plain sequence: `min` mandatory
    /// copies followed by `max - min` optional copies, or by a single
    /// zero-or-more copy when unbounded.
    ///
    /// `a{2,4}` becomes `a a a? a?` and `a{2,}` becomes `a a a*`.
    #[must_use]
    pub fn expand_repetition(inner: &Self, min: u32, max: Option<u32>) -> Self {
        let mut units: Vec<Self> = (0..min).map(|_| inner.clone()).collect();
        match max {
            None => units.push(Self::zero_or_more(inner.clone())),
            Some(max) => {
                units.extend((min..max).map(|_| Self::zero_or_one(inner.clone())));
            }
        }
        Self::Sequence(units)
    }

    /// The literal text, if this is a string literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// A token definition: pattern plus token-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RegularExpression {
    label: Option<CompactString>,
    pattern: Pattern,
    ordinal: TokenId,
    private: bool,
    ignore_case: Option<bool>,
    overridden: bool,
    new_lexical_state: Option<CompactString>,
}

impl RegularExpression {
    /// Create an unregistered expression. The ordinal is assigned by
    /// [`TokenRegistry::register`].
    #[must_use]
    pub const fn new(pattern: Pattern) -> Self {
        Self {
            label: None,
            pattern,
            ordinal: TokenId::EOF,
            private: false,
            ignore_case: None,
            overridden: false,
            new_lexical_state: None,
        }
    }

    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self::new(Pattern::literal(text))
    }

    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(CompactString::new(label));
        self
    }

    /// Mark as private (`#NAME`): usable only through references, never
    /// built as a token of its own.
    #[must_use]
    pub const fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Override the case sensitivity inherited from the token production.
    #[must_use]
    pub const fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = Some(ignore_case);
        self
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn set_label(&mut self, label: CompactString) {
        self.label = Some(label);
    }

    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[must_use]
    pub const fn ordinal(&self) -> TokenId {
        self.ordinal
    }

    pub(crate) const fn set_ordinal(&mut self, ordinal: TokenId) {
        self.ordinal = ordinal;
    }

    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.private
    }

    #[must_use]
    pub const fn ignore_case(&self) -> Option<bool> {
        self.ignore_case
    }

    /// Effective case sensitivity given the inherited setting.
    #[must_use]
    pub fn ignore_case_or(&self, inherited: bool) -> bool {
        self.ignore_case.unwrap_or(inherited)
    }

    #[must_use]
    pub const fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub(crate) const fn set_overridden(&mut self, overridden: bool) {
        self.overridden = overridden;
    }

    /// Lexical state the scanner switches to after matching this token, when
    /// every lexical state building it agrees. Per-state targets are kept by
    /// [`LexicalStateData::new_lexical_state`].
    ///
    /// [`LexicalStateData::new_lexical_state`]: crate::nfa::LexicalStateData::new_lexical_state
    #[must_use]
    pub fn new_lexical_state(&self) -> Option<&str> {
        self.new_lexical_state.as_deref()
    }

    pub(crate) fn set_new_lexical_state(&mut self, state: Option<CompactString>) {
        self.new_lexical_state = state;
    }

    /// Literal image when the pattern is a plain string literal.
    #[must_use]
    pub fn literal_image(&self) -> Option<&str> {
        self.pattern.as_literal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Pattern {
        Pattern::literal("a")
    }

    #[test]
    fn test_expand_bounded_repetition() {
        let expanded = Pattern::expand_repetition(&a(), 2, Some(4));
        assert_eq!(
            expanded,
            Pattern::Sequence(vec![
                a(),
                a(),
                Pattern::zero_or_one(a()),
                Pattern::zero_or_one(a()),
            ])
        );
    }

    #[test]
    fn test_expand_unbounded_repetition() {
        let expanded = Pattern::expand_repetition(&a(), 2, None);
        assert_eq!(
            expanded,
            Pattern::Sequence(vec![a(), a(), Pattern::zero_or_more(a())])
        );
    }

    #[test]
    fn test_expand_exact_repetition() {
        let expanded = Pattern::expand_repetition(&a(), 3, Some(3));
        assert_eq!(expanded, Pattern::Sequence(vec![a(), a(), a()]));
    }

    #[test]
    fn test_regular_expression_builder() {
        let re = RegularExpression::literal("if")
            .with_label("IF")
            .with_ignore_case(true);
        assert_eq!(re.label(), Some("IF"));
        assert_eq!(re.literal_image(), Some("if"));
        assert!(re.ignore_case_or(false));
        assert!(!re.is_private());
    }

    #[test]
    fn test_ignore_case_inherits_when_unset() {
        let re = RegularExpression::literal("x");
        assert!(re.ignore_case_or(true));
        assert!(!re.ignore_case_or(false));
    }
}
