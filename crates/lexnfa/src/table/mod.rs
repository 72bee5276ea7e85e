//! # Output Tables
//!
//! Plain records of the built automata, as a code generator consumes them.
//!
//! [`LexerTable::snapshot`] copies every lexical state's ordered composites
//! and their ordered members into owned records. With the `serialize`
//! feature the records derive serde and can be saved as JSON.
//!
//! [`to_dot`] renders one lexical state's composite graph for Graphviz.

mod dot;

pub use dot::{DotGraph, to_dot};

use compact_str::CompactString;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::charset::CharRange;
use crate::lexer_data::LexerData;
use crate::nfa::{Composite, LexicalStateData, NfaState};
use crate::regexp::TokenId;

/// Snapshot of every lexical state's dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct LexerTable {
    pub lexical_states: Vec<LexicalStateTable>,
    /// Label per token ordinal
    pub token_names: Vec<Option<CompactString>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct LexicalStateTable {
    pub name: CompactString,
    /// In index order; entry 0 is the initial composite
    pub composites: Vec<CompositeRecord>,
    /// Moves-array names, in the order they were assigned
    pub moves_arrays: Vec<CompactString>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CompositeRecord {
    pub index: usize,
    pub method_name: String,
    pub token: Option<TokenId>,
    pub has_final_member: bool,
    /// In dispatch order
    pub members: Vec<MemberRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct MemberRecord {
    pub moves_array_name: Option<CompactString>,
    pub ascii_ranges: Vec<CharRange>,
    pub non_ascii_ranges: Vec<CharRange>,
    pub next_state_index: Option<usize>,
    pub next_final: bool,
    pub token: Option<TokenId>,
}

impl LexerTable {
    #[must_use]
    pub fn snapshot(lexer: &LexerData) -> Self {
        let registry = lexer.registry();
        let token_names = registry
            .iter()
            .map(|regexp| regexp.label().map(CompactString::new))
            .chain(lexer.config().extra_token_names.iter().cloned().map(Some))
            .collect();
        Self {
            lexical_states: lexer
                .lexical_states()
                .iter()
                .map(LexicalStateTable::from_lexical_state)
                .collect(),
            token_names,
        }
    }

    #[must_use]
    pub fn lexical_state(&self, name: &str) -> Option<&LexicalStateTable> {
        self.lexical_states.iter().find(|state| state.name == name)
    }
}

#[cfg(feature = "serialize")]
impl LexerTable {
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// # Errors
    ///
    /// Fails on malformed JSON.
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    /// Stream the table to a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or written.
    pub fn save_json(&self, path: &std::path::Path) -> std::io::Result<()> {
        use std::io::Write;

        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()
    }
}

impl LexicalStateTable {
    #[must_use]
    pub fn from_lexical_state(state: &LexicalStateData) -> Self {
        Self {
            name: CompactString::new(state.name()),
            composites: state
                .composites()
                .filter_map(|composite| CompositeRecord::from_composite(state, &composite))
                .collect(),
            moves_arrays: state
                .all_nfa_states()
                .filter_map(NfaState::moves_array_name)
                .map(CompactString::new)
                .collect(),
        }
    }
}

impl CompositeRecord {
    /// `None` for a composite without an index.
    fn from_composite(state: &LexicalStateData, composite: &Composite<'_>) -> Option<Self> {
        Some(Self {
            index: composite.index()?,
            method_name: composite.method_name()?,
            token: composite.token(),
            has_final_member: composite.has_final_member(),
            members: composite
                .ordered_members()
                .into_iter()
                .map(|member| MemberRecord {
                    moves_array_name: member.moves_array_name().map(CompactString::new),
                    ascii_ranges: member.ascii_move_ranges().to_vec(),
                    non_ascii_ranges: member.non_ascii_move_ranges().to_vec(),
                    next_state_index: state.next_state_index(member.id()),
                    next_final: state.is_next_final(member.id()),
                    token: member.token(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regexp::{RegularExpression, TokenKind, TokenProduction};

    fn build(literals: &[&str]) -> LexerData {
        let mut lexer = LexerData::default();
        let mut production = TokenProduction::new(TokenKind::Token);
        for literal in literals {
            let token = lexer.add_regular_expression(RegularExpression::literal(literal));
            production = production.regexp(token);
        }
        lexer.add_token_production(production).unwrap();
        lexer.ensure_regexp_labels();
        lexer.build_data().unwrap();
        lexer
    }

    #[test]
    fn test_snapshot_shape() {
        let lexer = build(&["ab"]);
        let table = lexer.table();
        let state = table.lexical_state("DEFAULT").unwrap();

        assert_eq!(state.composites.len(), 2);
        assert_eq!(state.composites[0].method_name, "NfaIndex0");
        assert_eq!(state.moves_arrays, vec!["NFA_MOVES_0", "NFA_MOVES_1"]);

        let first = &state.composites[0].members[0];
        assert_eq!(first.ascii_ranges, vec![CharRange::single('a' as u32)]);
        assert!(first.non_ascii_ranges.is_empty());
        assert_eq!(first.next_state_index, Some(1));
        assert!(!first.next_final);

        let second = &state.composites[1].members[0];
        assert_eq!(second.next_state_index, None);
        assert!(second.next_final);
        assert_eq!(table.token_names[1].as_deref(), Some("AB"));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_json_round_trip() {
        let table = build(&["if", "in"]).table();
        let json = table.to_json().unwrap();
        assert_eq!(LexerTable::from_json(&json).unwrap(), table);
    }
}
