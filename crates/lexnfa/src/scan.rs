//! # Reference Scanner
//!
//! Runs a processed lexical state's composite table directly, the way the
//! generated dispatch routines would.
//!
//! Starting from composite 0, every active composite tries its ordered
//! members against the current character. A member whose successor accepts
//! records its token; later members override earlier ones within a
//! composite, and across composites the lowest ordinal wins. The longest
//! match is kept.
//!
//! This is a verification aid for the tables, not a production lexer.

use std::ops::Range;

use crate::bitset::BitSet;
use crate::charset::CharRange;
use crate::error::ScanError;
use crate::lexer_data::LexerData;
use crate::nfa::LexicalStateData;
use crate::regexp::{TokenId, TokenKind};

/// Longest match found at the start of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMatch {
    pub token: TokenId,
    /// Length in bytes
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanToken {
    pub token: TokenId,
    pub kind: TokenKind,
    pub span: Range<usize>,
}

#[derive(Debug, Clone)]
struct Member {
    ranges: Vec<CharRange>,
    next: Option<usize>,
    /// Token recorded when the successor accepts
    accepts: Option<TokenId>,
}

impl Member {
    fn matches(&self, c: u32) -> bool {
        self.ranges.iter().any(|range| range.contains(c))
    }
}

/// Dispatch table of one lexical state, flattened for scanning.
#[derive(Debug, Clone)]
pub struct NfaScanner {
    composites: Vec<Vec<Member>>,
}

impl NfaScanner {
    #[must_use]
    pub fn new(lexical_state: &LexicalStateData) -> Self {
        let composites = lexical_state
            .composites()
            .map(|composite| {
                composite
                    .ordered_members()
                    .into_iter()
                    .map(|member| Member {
                        ranges: member.move_ranges().to_vec(),
                        next: lexical_state.next_state_index(member.id()),
                        accepts: lexical_state
                            .is_next_final(member.id())
                            .then(|| member.token())
                            .flatten(),
                    })
                    .collect()
            })
            .collect();
        Self { composites }
    }

    /// Longest token match at the start of `input`.
    #[must_use]
    pub fn longest_match(&self, input: &str) -> Option<ScanMatch> {
        if self.composites.is_empty() {
            return None;
        }
        let mut active = BitSet::new();
        active.insert(0);
        let mut best = None;

        for (offset, ch) in input.char_indices() {
            let c = u32::from(ch);
            let mut next_active = BitSet::new();
            let mut matched: Option<TokenId> = None;

            for index in active.iter() {
                let mut composite_match = None;
                for member in &self.composites[index as usize] {
                    if !member.matches(c) {
                        continue;
                    }
                    if let Some(next) = member.next {
                        next_active.insert(u32::try_from(next).unwrap_or(u32::MAX));
                    }
                    if member.accepts.is_some() {
                        composite_match = member.accepts;
                    }
                }
                if let Some(token) = composite_match
                    && matched.is_none_or(|current| token < current)
                {
                    matched = Some(token);
                }
            }

            if let Some(token) = matched {
                best = Some(ScanMatch {
                    token,
                    len: offset + ch.len_utf8(),
                });
            }
            if next_active.is_empty() {
                break;
            }
            active = next_active;
        }
        best
    }
}

/// Split `input` into tokens, following lexical state switches.
///
/// Tokens of every kind are returned; callers drop `Skip` tokens themselves.
///
/// # Errors
///
/// Returns [`ScanError::NoMatch`] at the first position where no token
/// matches.
pub fn tokenize(lexer: &LexerData, input: &str) -> Result<Vec<ScanToken>, ScanError> {
    let scanners: Vec<NfaScanner> = lexer
        .lexical_states()
        .iter()
        .map(NfaScanner::new)
        .collect();
    let mut state = 0;
    let mut offset = 0;
    let mut tokens = Vec::new();

    while offset < input.len() {
        let found = scanners[state]
            .longest_match(&input[offset..])
            .filter(|found| found.len > 0)
            .ok_or_else(|| ScanError::NoMatch {
                offset,
                lexical_state: lexer
                    .lexical_state_name(state)
                    .unwrap_or_default()
                    .into(),
            })?;
        let span = offset..offset + found.len;
        log::trace!("{:?} at {:?}", found.token, span);
        tokens.push(ScanToken {
            token: found.token,
            kind: lexer.token_kind(found.token).unwrap_or_default(),
            span,
        });
        offset += found.len;

        if let Some(next) = lexer.lexical_states()[state]
            .new_lexical_state(found.token)
            .and_then(|name| lexer.lexical_state_index(name))
        {
            state = next;
        }
    }
    Ok(tokens)
}
