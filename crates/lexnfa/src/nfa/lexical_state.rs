use compact_str::{CompactString, format_compact};
use hashbrown::HashMap;

use crate::config::LexerConfig;
use crate::error::{LexerWarning, NfaError, Result};
use crate::regexp::{TokenId, TokenProduction, TokenRegistry, TokenSet};

use super::builder::NfaBuilder;
use super::composite::{Composite, CompositeId, CompositeStateSet, find_what_is_used};
use super::state::{Nfa, NfaState, NfaStateId};

type LiteralTable = HashMap<CompactString, TokenId, ahash::RandomState>;

/// The automaton of one named scanner mode.
///
/// Token productions and literals are registered first; [`process`] then
/// builds every token's states, computes the epsilon closure, prunes
/// scaffolding states, canonicalizes composites, discards the unreachable
/// ones and indexes the rest.
///
/// [`process`]: LexicalStateData::process
#[derive(Debug, Clone)]
pub struct LexicalStateData {
    name: CompactString,
    is_default: bool,
    nfa: Nfa,
    initial_state: NfaStateId,
    token_productions: Vec<TokenProduction>,
    implicit_literals: Vec<TokenId>,
    composites: Vec<CompositeStateSet>,
    canonical_set_lookup: HashMap<Box<[NfaStateId]>, CompositeId, ahash::RandomState>,
    /// Used composites in index order
    ordered: Vec<CompositeId>,
    /// States that need move code, in moves-array order
    simple_states: Vec<NfaStateId>,
    case_sensitive_literals: LiteralTable,
    /// Keyed by the upper-cased image
    case_insensitive_literals: LiteralTable,
    regular_expressions: TokenSet,
    transitions: Vec<(TokenId, CompactString)>,
    warnings: Vec<LexerWarning>,
    processed: bool,
}

impl LexicalStateData {
    #[must_use]
    pub fn new(name: &str, is_default: bool) -> Self {
        let mut nfa = Nfa::new();
        let initial_state = nfa.add_state(None);
        Self {
            name: CompactString::new(name),
            is_default,
            nfa,
            initial_state,
            token_productions: Vec::new(),
            implicit_literals: Vec::new(),
            composites: Vec::new(),
            canonical_set_lookup: HashMap::with_hasher(ahash::RandomState::new()),
            ordered: Vec::new(),
            simple_states: Vec::new(),
            case_sensitive_literals: HashMap::with_hasher(ahash::RandomState::new()),
            case_insensitive_literals: HashMap::with_hasher(ahash::RandomState::new()),
            regular_expressions: TokenSet::new(),
            transitions: Vec::new(),
            warnings: Vec::new(),
            processed: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.is_default
    }

    #[must_use]
    pub const fn initial_state(&self) -> NfaStateId {
        self.initial_state
    }

    #[must_use]
    pub const fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    #[must_use]
    pub fn state(&self, id: NfaStateId) -> &NfaState {
        self.nfa.state(id)
    }

    pub fn add_token_production(&mut self, production: TokenProduction) {
        self.token_productions.push(production);
    }

    #[must_use]
    pub fn token_productions(&self) -> &[TokenProduction] {
        &self.token_productions
    }

    /// Register a literal that is used in the grammar but never declared in
    /// a token production. It is built as a top-level alternative of its own.
    pub fn add_implicit_literal(&mut self, token: TokenId) {
        if !self.implicit_literals.contains(&token) {
            self.implicit_literals.push(token);
        }
    }

    /// Record a string literal token. The first registration of an image
    /// wins; the returned id is the one that owns the image.
    pub fn add_string_literal(
        &mut self,
        image: &str,
        token: TokenId,
        ignore_case: bool,
    ) -> TokenId {
        let (table, key) = if ignore_case {
            (
                &mut self.case_insensitive_literals,
                CompactString::from(image.to_uppercase()),
            )
        } else {
            (&mut self.case_sensitive_literals, CompactString::new(image))
        };
        *table.entry(key).or_insert(token)
    }

    /// Find the literal token for `image`: exact match first, then a
    /// case-insensitive one.
    #[must_use]
    pub fn lookup_literal(&self, image: &str) -> Option<TokenId> {
        self.case_sensitive_literals.get(image).copied().or_else(|| {
            self.case_insensitive_literals
                .get(image.to_uppercase().as_str())
                .copied()
        })
    }

    fn literal_owner(&self, image: &str, ignore_case: bool) -> Option<TokenId> {
        if ignore_case {
            self.case_insensitive_literals
                .get(image.to_uppercase().as_str())
                .copied()
        } else {
            self.case_sensitive_literals.get(image).copied()
        }
    }

    /// Memoized composite for an exact (sorted) member set.
    pub fn canonical_composite(&mut self, states: &[NfaStateId]) -> CompositeId {
        if let Some(id) = self.canonical_set_lookup.get(states) {
            return *id;
        }
        let id = CompositeId(u32::try_from(self.composites.len()).unwrap_or(u32::MAX));
        let members: Box<[NfaStateId]> = Box::from(states);
        self.composites.push(CompositeStateSet::new(members.clone()));
        self.canonical_set_lookup.insert(members, id);
        id
    }

    /// Build every token of this lexical state and generate its composite
    /// table. Runs once; later calls do nothing.
    ///
    /// # Errors
    ///
    /// Propagates construction faults: unknown tokens, undefined or
    /// recursive references, inverted repetition bounds.
    pub fn process(&mut self, registry: &TokenRegistry, config: &LexerConfig) -> Result<()> {
        if self.processed {
            log::debug!("{}: already processed", self.name);
            return Ok(());
        }

        let declared: TokenSet = self
            .token_productions
            .iter()
            .flat_map(TokenProduction::regexps)
            .collect();
        for token in self.implicit_literals.clone() {
            if declared.contains(token) {
                continue;
            }
            let regexp = registry.get(token).ok_or(NfaError::UnknownToken {
                ordinal: token.ordinal(),
            })?;
            if regexp.is_overridden() {
                continue;
            }
            let ignore_case = regexp.ignore_case_or(config.ignore_case);
            self.build_token(registry, token, ignore_case)?;
        }

        let productions = std::mem::take(&mut self.token_productions);
        let result = self.process_token_productions(&productions, registry, config);
        self.token_productions = productions;
        result?;

        if self.regular_expressions.is_empty() {
            let warning = LexerWarning::EmptyLexicalState {
                name: self.name.clone(),
            };
            log::warn!("{warning}");
            self.warnings.push(warning);
        }
        self.generate_data();
        self.processed = true;
        Ok(())
    }

    fn process_token_productions(
        &mut self,
        productions: &[TokenProduction],
        registry: &TokenRegistry,
        config: &LexerConfig,
    ) -> Result<()> {
        for production in productions {
            let inherited = production.ignore_case || config.ignore_case;
            for spec in &production.specs {
                let token = spec.regexp;
                let regexp = registry.get(token).ok_or(NfaError::UnknownToken {
                    ordinal: token.ordinal(),
                })?;
                if regexp.is_private() || regexp.is_overridden() {
                    continue;
                }
                let ignore_case = regexp.ignore_case_or(inherited);
                // Duplicate literals collapse onto the first registration.
                if let Some(image) = regexp.literal_image()
                    && self
                        .literal_owner(image, ignore_case)
                        .is_some_and(|owner| owner != token)
                {
                    continue;
                }
                self.build_token(registry, token, ignore_case)?;
                if let Some(next) = &spec.next_lexical_state
                    && *next != self.name
                {
                    self.transitions.push((token, next.clone()));
                }
            }
        }
        Ok(())
    }

    fn build_token(
        &mut self,
        registry: &TokenRegistry,
        token: TokenId,
        ignore_case: bool,
    ) -> Result<()> {
        self.regular_expressions.insert(token);
        let initial = self.initial_state;
        NfaBuilder::new(&mut self.nfa, registry, token, ignore_case).build_states(initial)?;
        Ok(())
    }

    fn generate_data(&mut self) {
        self.nfa.close_epsilon_moves();

        for index in 0..self.nfa.len() {
            let id = NfaStateId(u32::try_from(index).unwrap_or(u32::MAX));
            let members: Box<[NfaStateId]> = Box::from(self.nfa.state(id).epsilon_moves());
            let composite = self.canonical_composite(&members);
            self.nfa.state_mut(id).set_composite(composite);
        }

        // Get rid of scaffolding states.
        self.simple_states = self
            .nfa
            .iter()
            .map(NfaState::id)
            .filter(|id| self.is_move_code_needed(*id))
            .collect();
        for (index, id) in self.simple_states.iter().enumerate() {
            let name = if self.is_default {
                format_compact!("NFA_MOVES_{index}")
            } else {
                format_compact!("NFA_MOVES_{}_{index}", self.name)
            };
            self.nfa.state_mut(*id).set_moves_array_name(name);
        }

        let initial = self.initial_composite_id();
        let mut ordered = find_what_is_used(self, initial);
        if ordered.first() != Some(&initial) {
            ordered = vec![initial];
        }
        // Stable: composites with an accepting member first, otherwise in
        // discovery order.
        ordered[1..].sort_by_key(|id| !self.composite(*id).has_final_member());
        for (index, id) in ordered.iter().enumerate() {
            self.composites[id.index()].set_index(index);
        }
        self.ordered = ordered;

        log::debug!(
            "{}: {} NFA states, {} with moves, {} canonical composites, {} used",
            self.name,
            self.nfa.len(),
            self.simple_states.len(),
            self.composites.len(),
            self.ordered.len()
        );
    }

    fn initial_composite_id(&self) -> CompositeId {
        self.state(self.initial_state)
            .composite()
            .unwrap_or(CompositeId(0))
    }

    #[must_use]
    pub const fn is_processed(&self) -> bool {
        self.processed
    }

    /// A state needs move code iff its successor accepts or can move on.
    #[must_use]
    pub fn is_move_code_needed(&self, id: NfaStateId) -> bool {
        self.state(id).next_state().is_some_and(|next| {
            let next = self.state(next);
            next.is_final() || !next.epsilon_moves().is_empty()
        })
    }

    #[must_use]
    pub fn is_next_final(&self, id: NfaStateId) -> bool {
        self.state(id)
            .next_state()
            .is_some_and(|next| self.state(next).is_final())
    }

    /// Index of the composite reached after this state consumes a character.
    #[must_use]
    pub fn next_state_index(&self, id: NfaStateId) -> Option<usize> {
        let next = self.state(id).next_state()?;
        let composite = self.state(next).composite()?;
        self.composites[composite.index()].index()
    }

    #[must_use]
    pub fn composite(&self, id: CompositeId) -> Composite<'_> {
        Composite::new(self, id, &self.composites[id.index()])
    }

    /// Used composites in index order. Empty until processed.
    pub fn composites(&self) -> impl ExactSizeIterator<Item = Composite<'_>> {
        self.ordered.iter().map(|id| self.composite(*id))
    }

    #[must_use]
    pub fn composite_at(&self, index: usize) -> Option<Composite<'_>> {
        self.ordered.get(index).map(|id| self.composite(*id))
    }

    /// Canonical composite of a state's epsilon set.
    #[must_use]
    pub fn composite_of(&self, id: NfaStateId) -> Option<Composite<'_>> {
        self.state(id).composite().map(|composite| self.composite(composite))
    }

    /// Every canonical composite created, used or not.
    #[must_use]
    pub fn num_canonical_composites(&self) -> usize {
        self.composites.len()
    }

    /// States that need move code, in moves-array order.
    pub fn all_nfa_states(&self) -> impl ExactSizeIterator<Item = &NfaState> {
        self.simple_states.iter().map(|id| self.state(*id))
    }

    #[must_use]
    pub fn contains_regular_expression(&self, token: TokenId) -> bool {
        self.regular_expressions.contains(token)
    }

    #[must_use]
    pub const fn regular_expressions(&self) -> &TokenSet {
        &self.regular_expressions
    }

    /// Lexical state switched to after matching `token` here.
    #[must_use]
    pub fn new_lexical_state(&self, token: TokenId) -> Option<&str> {
        self.transitions
            .iter()
            .find(|(owner, _)| *owner == token)
            .map(|(_, target)| target.as_str())
    }

    #[must_use]
    pub fn transitions(&self) -> &[(TokenId, CompactString)] {
        &self.transitions
    }

    #[must_use]
    pub fn warnings(&self) -> &[LexerWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::CharRange;
    use crate::regexp::{CharacterList, Pattern, RegularExpression, TokenKind};

    fn process(registry: &TokenRegistry, tokens: &[TokenId]) -> LexicalStateData {
        let mut lexical_state = LexicalStateData::new("DEFAULT", true);
        let production = tokens
            .iter()
            .fold(TokenProduction::new(TokenKind::Token), |tp, id| tp.regexp(*id));
        lexical_state.add_token_production(production);
        lexical_state
            .process(registry, &LexerConfig::default())
            .unwrap();
        lexical_state
    }

    #[test]
    fn test_literal_composite_indices() {
        let mut registry = TokenRegistry::new();
        let abc = registry.register(RegularExpression::literal("abc"));
        let lexical_state = process(&registry, &[abc]);

        let composites: Vec<_> = lexical_state.composites().collect();
        assert_eq!(composites.len(), 3);
        // Initial first, then the composite whose member completes the match.
        let accepts = |index: usize, c: char| {
            composites[index]
                .states()
                .any(|state| state.accepts(u32::from(c)))
        };
        assert!(accepts(0, 'a'));
        assert!(accepts(1, 'c'));
        assert!(accepts(2, 'b'));
        assert!(composites[1].has_final_member());
        assert!(!composites[2].has_final_member());
        assert_eq!(composites[0].method_name().as_deref(), Some("NfaIndex0"));
    }

    #[test]
    fn test_canonical_composite_is_memoized() {
        let mut lexical_state = LexicalStateData::new("DEFAULT", true);
        let a = lexical_state.canonical_composite(&[NfaStateId(1), NfaStateId(2)]);
        let b = lexical_state.canonical_composite(&[NfaStateId(1), NfaStateId(2)]);
        let c = lexical_state.canonical_composite(&[NfaStateId(2)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(lexical_state.num_canonical_composites(), 2);
    }

    #[test]
    fn test_string_literal_first_wins() {
        let mut lexical_state = LexicalStateData::new("DEFAULT", true);
        assert_eq!(lexical_state.add_string_literal("if", TokenId(1), false), TokenId(1));
        assert_eq!(lexical_state.add_string_literal("if", TokenId(2), false), TokenId(1));
        assert_eq!(lexical_state.add_string_literal("Then", TokenId(3), true), TokenId(3));

        assert_eq!(lexical_state.lookup_literal("if"), Some(TokenId(1)));
        assert_eq!(lexical_state.lookup_literal("THEN"), Some(TokenId(3)));
        assert_eq!(lexical_state.lookup_literal("then"), Some(TokenId(3)));
        assert_eq!(lexical_state.lookup_literal("IF"), None);
    }

    #[test]
    fn test_duplicate_literal_is_built_once() {
        let mut registry = TokenRegistry::new();
        let first = registry.register(RegularExpression::literal("+"));
        let second = registry.register(RegularExpression::literal("+"));
        let mut lexical_state = LexicalStateData::new("DEFAULT", true);
        lexical_state.add_string_literal("+", first, false);
        lexical_state.add_string_literal("+", second, false);
        lexical_state.add_token_production(
            TokenProduction::new(TokenKind::Token)
                .regexp(first)
                .regexp(second),
        );
        lexical_state
            .process(&registry, &LexerConfig::default())
            .unwrap();
        assert!(lexical_state.contains_regular_expression(first));
        assert!(!lexical_state.contains_regular_expression(second));
    }

    #[test]
    fn test_empty_state_warns() {
        let registry = TokenRegistry::new();
        let mut lexical_state = LexicalStateData::new("COMMENT", false);
        lexical_state
            .process(&registry, &LexerConfig::default())
            .unwrap();
        assert_eq!(
            lexical_state.warnings(),
            &[LexerWarning::EmptyLexicalState {
                name: CompactString::new("COMMENT")
            }]
        );
        // The initial composite is kept on its own.
        assert_eq!(lexical_state.composites().len(), 1);
        assert!(lexical_state.composite_at(0).unwrap().is_empty());
    }

    #[test]
    fn test_private_regexp_is_skipped() {
        let mut registry = TokenRegistry::new();
        let digit = registry.register(
            RegularExpression::new(Pattern::class(CharacterList::chars('0', '9')))
                .with_label("DIGIT")
                .private(),
        );
        let lexical_state = process(&registry, &[digit]);
        assert!(!lexical_state.contains_regular_expression(digit));
        assert_eq!(lexical_state.warnings().len(), 1);
    }

    #[test]
    fn test_moves_array_names() {
        let mut registry = TokenRegistry::new();
        let token = registry.register(RegularExpression::new(Pattern::class(
            CharacterList::new(vec![CharRange::new(0x41, 0x5A)]),
        )));
        let mut lexical_state = LexicalStateData::new("JAVADOC", false);
        lexical_state.add_token_production(TokenProduction::new(TokenKind::Token).regexp(token));
        lexical_state
            .process(&registry, &LexerConfig::default())
            .unwrap();

        let names: Vec<_> = lexical_state
            .all_nfa_states()
            .filter_map(NfaState::moves_array_name)
            .collect();
        assert_eq!(names, vec!["NFA_MOVES_JAVADOC_0"]);
        let initial = lexical_state.composite_at(0).unwrap();
        assert_eq!(
            initial.method_name().as_deref(),
            Some("NfaNameJAVADOCIndex0")
        );
    }

    #[test]
    fn test_transition_recorded() {
        let mut registry = TokenRegistry::new();
        let open = registry.register(RegularExpression::literal("/*"));
        let mut lexical_state = LexicalStateData::new("DEFAULT", true);
        lexical_state.add_token_production(
            TokenProduction::new(TokenKind::Skip)
                .spec(crate::regexp::RegexpSpec::new(open).switching_to("COMMENT")),
        );
        lexical_state
            .process(&registry, &LexerConfig::default())
            .unwrap();
        assert_eq!(lexical_state.new_lexical_state(open), Some("COMMENT"));
    }
}
