//! Thompson construction of one regular expression.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::charset::ordered_ranges;
use crate::error::{NfaError, Result};
use crate::regexp::{CharacterList, Pattern, TokenId, TokenRegistry};

use super::state::{Nfa, NfaStateId};

/// Entry and exit state of a built sub-automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: NfaStateId,
    pub end: NfaStateId,
}

/// Builds the states of one token's pattern into a lexical state's NFA.
///
/// The builder leaves plenty of epsilon-only scaffolding states behind; they
/// are pruned once the epsilon closure has been computed.
pub struct NfaBuilder<'a> {
    nfa: &'a mut Nfa,
    registry: &'a TokenRegistry,
    token: TokenId,
    ignore_case: bool,
    /// Names currently being inlined, for cycle detection
    resolving: SmallVec<[CompactString; 4]>,
}

impl<'a> NfaBuilder<'a> {
    #[must_use]
    pub fn new(
        nfa: &'a mut Nfa,
        registry: &'a TokenRegistry,
        token: TokenId,
        ignore_case: bool,
    ) -> Self {
        Self {
            nfa,
            registry,
            token,
            ignore_case,
            resolving: SmallVec::new(),
        }
    }

    /// Build the token's pattern, mark its exit final and hook its entry
    /// into `initial` with an epsilon move.
    ///
    /// # Errors
    ///
    /// Fails on unknown tokens, undefined or recursive references and
    /// inverted repetition bounds.
    pub fn build_states(mut self, initial: NfaStateId) -> Result<Fragment> {
        let registry = self.registry;
        let regexp = registry.get(self.token).ok_or(NfaError::UnknownToken {
            ordinal: self.token.ordinal(),
        })?;
        if let Some(label) = regexp.label() {
            self.resolving.push(CompactString::new(label));
        }
        let fragment = self.visit(regexp.pattern())?;
        self.nfa.state_mut(fragment.end).set_final(true);
        self.nfa.add_epsilon_move(initial, fragment.start);
        Ok(fragment)
    }

    fn new_state(&mut self) -> NfaStateId {
        self.nfa.add_state(Some(self.token))
    }

    fn visit(&mut self, pattern: &Pattern) -> Result<Fragment> {
        match pattern {
            Pattern::CharClass(list) => Ok(self.visit_char_class(list)),
            Pattern::Literal(text) => Ok(self.visit_literal(text)),
            Pattern::Sequence(units) => self.visit_sequence(units),
            Pattern::Choice(choices) => self.visit_choice(choices),
            Pattern::ZeroOrMore(inner) => {
                let start = self.new_state();
                let end = self.new_state();
                let body = self.visit(inner)?;
                self.nfa.add_epsilon_move(start, body.start);
                self.nfa.add_epsilon_move(start, end);
                self.nfa.add_epsilon_move(body.end, end);
                self.nfa.add_epsilon_move(body.end, body.start);
                Ok(Fragment { start, end })
            }
            Pattern::OneOrMore(inner) => {
                let start = self.new_state();
                let end = self.new_state();
                let body = self.visit(inner)?;
                self.nfa.add_epsilon_move(start, body.start);
                self.nfa.add_epsilon_move(body.end, body.start);
                self.nfa.add_epsilon_move(body.end, end);
                Ok(Fragment { start, end })
            }
            Pattern::ZeroOrOne(inner) => {
                let start = self.new_state();
                let end = self.new_state();
                let body = self.visit(inner)?;
                self.nfa.add_epsilon_move(start, body.start);
                self.nfa.add_epsilon_move(start, end);
                self.nfa.add_epsilon_move(body.end, end);
                Ok(Fragment { start, end })
            }
            Pattern::Repetition { inner, min, max } => {
                if let Some(max) = *max
                    && max < *min
                {
                    return Err(NfaError::InvalidRepetition { min: *min, max });
                }
                self.visit(&Pattern::expand_repetition(inner, *min, *max))
            }
            Pattern::Ref(name) => self.visit_reference(name),
        }
    }

    fn visit_char_class(&mut self, list: &CharacterList) -> Fragment {
        let ranges = ordered_ranges(&list.ranges, list.negated, self.ignore_case);
        let start = self.new_state();
        let end = self.new_state();
        let state = self.nfa.state_mut(start);
        for range in ranges {
            state.add_range(range.lo, range.hi);
        }
        state.set_next_state(end);
        Fragment { start, end }
    }

    /// A chain of single-character states, one per code point.
    fn visit_literal(&mut self, text: &str) -> Fragment {
        let start = self.new_state();
        let mut current = start;
        for ch in text.chars() {
            let next = self.new_state();
            let state = self.nfa.state_mut(current);
            state.set_char_move(u32::from(ch), self.ignore_case);
            state.set_next_state(next);
            current = next;
        }
        Fragment {
            start,
            end: current,
        }
    }

    fn visit_sequence(&mut self, units: &[Pattern]) -> Result<Fragment> {
        if let [single] = units {
            return self.visit(single);
        }
        let start = self.new_state();
        let end = self.new_state();
        let mut previous_end = start;
        for unit in units {
            let part = self.visit(unit)?;
            self.nfa.add_epsilon_move(previous_end, part.start);
            previous_end = part.end;
        }
        self.nfa.add_epsilon_move(previous_end, end);
        Ok(Fragment { start, end })
    }

    fn visit_choice(&mut self, choices: &[Pattern]) -> Result<Fragment> {
        if let [single] = choices {
            return self.visit(single);
        }
        let start = self.new_state();
        let end = self.new_state();
        for choice in choices {
            let alternative = self.visit(choice)?;
            self.nfa.add_epsilon_move(start, alternative.start);
            self.nfa.add_epsilon_move(alternative.end, end);
        }
        Ok(Fragment { start, end })
    }

    /// Inline the referenced pattern. Every use gets fresh states.
    fn visit_reference(&mut self, name: &str) -> Result<Fragment> {
        if self.resolving.iter().any(|active| active == name) {
            return Err(NfaError::recursive_reference(name));
        }
        let registry = self.registry;
        let pattern = registry
            .resolve(name)
            .ok_or_else(|| NfaError::undefined_reference(name))?;
        self.resolving.push(CompactString::new(name));
        let fragment = self.visit(pattern);
        self.resolving.pop();
        fragment
    }
}
