//! Property-based tests for automaton construction
//!
//! Random literal and character-class grammars are built and the resulting
//! tables are checked against structural invariants and a brute-force
//! longest-match oracle.

#![cfg(test)]

use lexnfa::LexerData;
use lexnfa::regexp::{
    CharacterList, Pattern, RegularExpression, TokenId, TokenKind, TokenProduction,
};
use lexnfa::scan::NfaScanner;
use proptest::prelude::*;

fn literal_lexer(literals: &[String]) -> (LexerData, Vec<TokenId>) {
    let mut lexer = LexerData::default();
    let tokens: Vec<TokenId> = literals
        .iter()
        .map(|literal| lexer.add_regular_expression(RegularExpression::literal(literal)))
        .collect();
    let production = tokens
        .iter()
        .fold(TokenProduction::new(TokenKind::Token), |tp, id| tp.regexp(*id));
    lexer.add_token_production(production).unwrap();
    lexer.build_data().unwrap();
    (lexer, tokens)
}

/// Longest declared literal prefixing `input`; the first declaration wins
/// among equal images.
fn oracle(literals: &[String], tokens: &[TokenId], input: &str) -> Option<(TokenId, usize)> {
    let mut best: Option<(TokenId, usize)> = None;
    for (literal, token) in literals.iter().zip(tokens) {
        if input.starts_with(literal.as_str())
            && best.is_none_or(|(_, len)| literal.len() > len)
        {
            best = Some((*token, literal.len()));
        }
    }
    best
}

fn mixed_lexer(literals: &[String], class_hi: char) -> LexerData {
    let mut lexer = LexerData::default();
    let mut production = TokenProduction::new(TokenKind::Token);
    for literal in literals {
        let token = lexer.add_regular_expression(RegularExpression::literal(literal));
        production = production.regexp(token);
    }
    let word = lexer.add_regular_expression(RegularExpression::new(Pattern::one_or_more(
        Pattern::class(CharacterList::chars('a', class_hi)),
    )));
    lexer.add_token_production(production.regexp(word)).unwrap();
    lexer.build_data().unwrap();
    lexer
}

proptest! {
    #[test]
    fn prop_scanner_matches_oracle(
        literals in prop::collection::vec("[a-c]{1,4}", 1..6),
        input in "[a-c]{0,8}",
    ) {
        let (lexer, tokens) = literal_lexer(&literals);
        let found = NfaScanner::new(lexer.default_lexical_state())
            .longest_match(&input)
            .map(|found| (found.token, found.len));
        prop_assert_eq!(found, oracle(&literals, &tokens, &input));
    }

    #[test]
    fn prop_build_is_deterministic(
        literals in prop::collection::vec("[a-d]{1,5}", 1..8),
        class_hi in prop::char::range('a', 'e'),
    ) {
        let first = mixed_lexer(&literals, class_hi);
        let second = mixed_lexer(&literals, class_hi);
        prop_assert_eq!(first.table(), second.table());
    }

    #[test]
    fn prop_closure_keeps_only_moving_states(
        literals in prop::collection::vec("[a-d]{1,5}", 1..8),
        class_hi in prop::char::range('a', 'e'),
    ) {
        let lexer = mixed_lexer(&literals, class_hi);
        let state = lexer.default_lexical_state();
        for nfa_state in state.nfa().iter() {
            let moves = nfa_state.epsilon_moves();
            prop_assert!(moves.windows(2).all(|pair| pair[0] < pair[1]));
            for target in moves {
                prop_assert!(!state.state(*target).move_ranges().is_empty());
            }
        }
    }

    #[test]
    fn prop_composites_are_canonical_and_ordered(
        literals in prop::collection::vec("[a-d]{1,5}", 1..8),
        class_hi in prop::char::range('a', 'e'),
    ) {
        let lexer = mixed_lexer(&literals, class_hi);
        let state = lexer.default_lexical_state();
        let composites: Vec<_> = state.composites().collect();

        let initial = state.composite_of(state.initial_state()).unwrap();
        prop_assert_eq!(composites[0].id(), initial.id());

        for (index, composite) in composites.iter().enumerate() {
            prop_assert_eq!(composite.index(), Some(index));
            prop_assert!(!composite.is_empty());
            for other in &composites[index + 1..] {
                prop_assert_ne!(composite.set().states(), other.set().states());
            }
        }

        // Accepting composites come before the rest, after the initial one.
        let finals: Vec<bool> = composites[1..]
            .iter()
            .map(|composite| composite.has_final_member())
            .collect();
        prop_assert!(finals.windows(2).all(|pair| pair[0] || !pair[1]));
    }

    #[test]
    fn prop_successors_are_reachable(
        literals in prop::collection::vec("[a-d]{1,5}", 1..8),
        class_hi in prop::char::range('a', 'e'),
    ) {
        let lexer = mixed_lexer(&literals, class_hi);
        let state = lexer.default_lexical_state();
        let used = state.composites().len();
        for composite in state.composites() {
            for member in composite.states() {
                if let Some(index) = state.next_state_index(member.id()) {
                    prop_assert!(index < used);
                }
                prop_assert!(state.is_move_code_needed(member.id()));
                prop_assert!(member.moves_array_name().is_some());
            }
        }
    }
}
