use compact_str::CompactString;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use super::TokenId;

/// What the generated scanner does with a matched token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TokenKind {
    /// Regular token handed to the parser.
    #[default]
    Token,
    /// Matched and discarded (whitespace, comments).
    Skip,
    /// Matched and prepended to the next token.
    More,
    /// Kept in the token stream but not seen by the parser.
    Unparsed,
}

/// One regular expression inside a token production, with the lexical state
/// to switch to on match.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RegexpSpec {
    pub regexp: TokenId,
    pub next_lexical_state: Option<CompactString>,
}

impl RegexpSpec {
    #[must_use]
    pub const fn new(regexp: TokenId) -> Self {
        Self {
            regexp,
            next_lexical_state: None,
        }
    }

    #[must_use]
    pub fn switching_to(mut self, lexical_state: &str) -> Self {
        self.next_lexical_state = Some(CompactString::new(lexical_state));
        self
    }
}

/// A `TOKEN`/`SKIP`/`MORE`/`UNPARSED` block of the grammar.
///
/// An empty `lexical_states` list means the default lexical state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TokenProduction {
    pub kind: TokenKind,
    pub lexical_states: Vec<CompactString>,
    pub ignore_case: bool,
    pub specs: Vec<RegexpSpec>,
}

impl TokenProduction {
    #[must_use]
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_state(mut self, name: &str) -> Self {
        self.lexical_states.push(CompactString::new(name));
        self
    }

    #[must_use]
    pub const fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    #[must_use]
    pub fn spec(mut self, spec: RegexpSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Shorthand for a spec without a lexical state switch.
    #[must_use]
    pub fn regexp(self, regexp: TokenId) -> Self {
        self.spec(RegexpSpec::new(regexp))
    }

    pub fn regexps(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.specs.iter().map(|spec| spec.regexp)
    }
}
