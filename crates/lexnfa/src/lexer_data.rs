//! # Lexer Data
//!
//! Registry of everything the lexer generator knows about a grammar's
//! tokens: regular expressions, token productions and lexical states.
//!
//! [`LexerData::build_data`] distributes the productions to their lexical
//! states and builds every state's automaton. Lexical states are
//! independent of each other; with the `parallel` feature they are built
//! on the rayon thread pool.
//!
//! ## Example
//!
//! ```rust
//! use lexnfa::regexp::{CharacterList, Pattern, RegularExpression, TokenKind, TokenProduction};
//! use lexnfa::{LexerConfig, LexerData};
//!
//! let mut lexer = LexerData::new(LexerConfig::default());
//! let ident = lexer.add_regular_expression(
//!     RegularExpression::new(Pattern::one_or_more(Pattern::class(
//!         CharacterList::chars('a', 'z'),
//!     )))
//!     .with_label("IDENT"),
//! );
//! lexer.add_token_production(TokenProduction::new(TokenKind::Token).regexp(ident))?;
//! lexer.build_data()?;
//!
//! assert_eq!(lexer.token_name(ident.ordinal()), Some("IDENT"));
//! assert!(lexer.default_lexical_state().is_processed());
//! # Ok::<(), lexnfa::NfaError>(())
//! ```

use compact_str::{CompactString, format_compact};
use hashbrown::{HashMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::LexerConfig;
use crate::error::{LexerWarning, NfaError, Result};
use crate::nfa::LexicalStateData;
use crate::regexp::{
    RegularExpression, TokenId, TokenKind, TokenProduction, TokenRegistry, TokenSet,
};
use crate::table::LexerTable;

/// All token definitions of a grammar, grouped by lexical state.
#[derive(Debug, Clone)]
pub struct LexerData {
    config: LexerConfig,
    registry: TokenRegistry,
    /// The first one is the default lexical state
    lexical_states: Vec<LexicalStateData>,
    state_index: HashMap<CompactString, usize, ahash::RandomState>,
    token_productions: Vec<TokenProduction>,
    warnings: Vec<LexerWarning>,
}

impl Default for LexerData {
    fn default() -> Self {
        Self::new(LexerConfig::default())
    }
}

impl LexerData {
    #[must_use]
    pub fn new(config: LexerConfig) -> Self {
        let default_name = config.default_lexical_state.clone();
        let mut state_index = HashMap::with_hasher(ahash::RandomState::new());
        state_index.insert(default_name.clone(), 0);
        Self {
            lexical_states: vec![LexicalStateData::new(&default_name, true)],
            state_index,
            config,
            registry: TokenRegistry::new(),
            token_productions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &LexerConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Declare a lexical state.
    ///
    /// # Errors
    ///
    /// Returns [`NfaError::DuplicateLexicalState`] if the name is taken.
    pub fn add_lexical_state(&mut self, name: &str) -> Result<usize> {
        if self.state_index.contains_key(name) {
            return Err(NfaError::DuplicateLexicalState {
                name: CompactString::new(name),
            });
        }
        let index = self.lexical_states.len();
        self.lexical_states.push(LexicalStateData::new(name, false));
        self.state_index.insert(CompactString::new(name), index);
        Ok(index)
    }

    #[must_use]
    pub fn lexical_state(&self, name: &str) -> Option<&LexicalStateData> {
        self.state_index
            .get(name)
            .map(|index| &self.lexical_states[*index])
    }

    #[must_use]
    pub fn lexical_state_index(&self, name: &str) -> Option<usize> {
        self.state_index.get(name).copied()
    }

    #[must_use]
    pub fn default_lexical_state(&self) -> &LexicalStateData {
        &self.lexical_states[0]
    }

    #[must_use]
    pub fn lexical_state_name(&self, index: usize) -> Option<&str> {
        self.lexical_states.get(index).map(LexicalStateData::name)
    }

    #[must_use]
    pub fn num_lexical_states(&self) -> usize {
        self.lexical_states.len()
    }

    #[must_use]
    pub fn lexical_states(&self) -> &[LexicalStateData] {
        &self.lexical_states
    }

    fn state_index_of(&self, name: &str) -> Result<usize> {
        self.state_index
            .get(name)
            .copied()
            .ok_or_else(|| NfaError::unknown_lexical_state(name))
    }

    pub fn add_regular_expression(&mut self, regexp: RegularExpression) -> TokenId {
        self.registry.register(regexp)
    }

    /// Attach a token production to its lexical states (the default one if
    /// it lists none) and register its string literals.
    ///
    /// # Errors
    ///
    /// Fails if the production names an undeclared lexical state or refers
    /// to an unregistered token.
    pub fn add_token_production(&mut self, production: TokenProduction) -> Result<()> {
        let targets: Vec<usize> = if production.lexical_states.is_empty() {
            vec![0]
        } else {
            production
                .lexical_states
                .iter()
                .map(|name| self.state_index_of(name))
                .collect::<Result<_>>()?
        };
        let inherited = production.ignore_case || self.config.ignore_case;
        for spec in &production.specs {
            let regexp = self
                .registry
                .get(spec.regexp)
                .ok_or(NfaError::UnknownToken {
                    ordinal: spec.regexp.ordinal(),
                })?;
            let Some(image) = regexp.literal_image() else {
                continue;
            };
            let ignore_case = regexp.ignore_case_or(inherited);
            for &target in &targets {
                self.lexical_states[target].add_string_literal(
                    image,
                    spec.regexp,
                    ignore_case,
                );
            }
        }
        for &target in &targets {
            self.lexical_states[target].add_token_production(production.clone());
        }
        self.token_productions.push(production);
        Ok(())
    }

    /// Find or create the token for a literal used directly in the grammar.
    ///
    /// # Errors
    ///
    /// Fails if `lexical_state` is not declared.
    pub fn add_implicit_literal(&mut self, lexical_state: &str, image: &str) -> Result<TokenId> {
        let index = self.state_index_of(lexical_state)?;
        if let Some(existing) = self.lexical_states[index].lookup_literal(image) {
            return Ok(existing);
        }
        let token = self.registry.register(RegularExpression::literal(image));
        let state = &mut self.lexical_states[index];
        state.add_string_literal(image, token, self.config.ignore_case);
        state.add_implicit_literal(token);
        Ok(token)
    }

    /// Mark a token as overridden; it is skipped when building automata.
    pub fn set_overridden(&mut self, token: TokenId) {
        if let Some(regexp) = self.registry.get_mut(token) {
            regexp.set_overridden(true);
        }
    }

    #[must_use]
    pub fn is_overridden(&self, token: TokenId) -> bool {
        self.registry
            .get(token)
            .is_some_and(RegularExpression::is_overridden)
    }

    /// Label of a token type. Ordinals past the registered expressions map
    /// to the configured extra token names.
    #[must_use]
    pub fn token_name(&self, ordinal: u32) -> Option<&str> {
        let index = ordinal as usize;
        if index < self.registry.len() {
            return self
                .registry
                .get(TokenId(ordinal))
                .and_then(RegularExpression::label);
        }
        self.config
            .extra_token_names
            .get(index - self.registry.len())
            .map(CompactString::as_str)
    }

    /// Give every regular expression an identifier label. Literals use their
    /// upper-cased image when that is a free identifier, everything else
    /// `_TOKEN_<ordinal>`.
    pub fn ensure_regexp_labels(&mut self) {
        let mut used: HashSet<CompactString, ahash::RandomState> =
            HashSet::with_hasher(ahash::RandomState::new());
        used.extend(
            self.registry
                .iter()
                .filter_map(RegularExpression::label)
                .filter(|label| is_identifier(label))
                .map(CompactString::new),
        );

        let mut relabels = Vec::new();
        for regexp in self.registry.iter() {
            if regexp.label().is_some_and(is_identifier) {
                continue;
            }
            let label = regexp
                .literal_image()
                .map(|image| CompactString::from(image.to_uppercase()))
                .filter(|upper| is_identifier(upper) && !used.contains(upper))
                .unwrap_or_else(|| format_compact!("_TOKEN_{}", regexp.ordinal().ordinal()));
            used.insert(label.clone());
            relabels.push((regexp.ordinal(), label));
        }
        for (token, label) in relabels {
            self.registry.relabel(token, label);
        }
    }

    /// Label of the literal token matching `image`, looked up exactly first
    /// and then case-insensitively.
    #[must_use]
    pub fn string_literal_label(&self, image: &str) -> Option<&str> {
        self.lexical_states
            .iter()
            .find_map(|state| state.lookup_literal(image))
            .and_then(|token| self.registry.get(token))
            .and_then(RegularExpression::label)
    }

    /// Kind of the first production that lists `token`.
    #[must_use]
    pub fn token_kind(&self, token: TokenId) -> Option<TokenKind> {
        self.token_productions
            .iter()
            .find(|production| production.regexps().any(|id| id == token))
            .map(|production| production.kind)
    }

    fn tokens_of_kind(&self, kind: TokenKind) -> TokenSet {
        self.token_productions
            .iter()
            .filter(|production| production.kind == kind)
            .flat_map(TokenProduction::regexps)
            .filter(|token| self.is_buildable(*token))
            .collect()
    }

    fn is_buildable(&self, token: TokenId) -> bool {
        self.registry
            .get(token)
            .is_some_and(|regexp| !regexp.is_private() && !regexp.is_overridden())
    }

    /// `TOKEN` tokens plus tokens that belong to no production.
    #[must_use]
    pub fn regular_tokens(&self) -> TokenSet {
        let mut result = self.tokens_of_kind(TokenKind::Token);
        let in_production: TokenSet = self
            .token_productions
            .iter()
            .flat_map(TokenProduction::regexps)
            .collect();
        for regexp in self.registry.iter() {
            let token = regexp.ordinal();
            if !in_production.contains(token) && self.is_buildable(token) {
                result.insert(token);
            }
        }
        result
    }

    #[must_use]
    pub fn skipped_tokens(&self) -> TokenSet {
        self.tokens_of_kind(TokenKind::Skip)
    }

    #[must_use]
    pub fn more_tokens(&self) -> TokenSet {
        self.tokens_of_kind(TokenKind::More)
    }

    #[must_use]
    pub fn unparsed_tokens(&self) -> TokenSet {
        self.tokens_of_kind(TokenKind::Unparsed)
    }

    /// Build the automaton of every lexical state.
    ///
    /// # Errors
    ///
    /// Fails on transitions to undeclared lexical states and on any fault
    /// reported while building a token's states.
    pub fn build_data(&mut self) -> Result<()> {
        for production in &self.token_productions {
            for spec in &production.specs {
                if let Some(target) = &spec.next_lexical_state {
                    self.state_index_of(target)?;
                }
            }
        }

        let registry = &self.registry;
        let config = &self.config;
        #[cfg(feature = "parallel")]
        self.lexical_states
            .par_iter_mut()
            .try_for_each(|state| state.process(registry, config))?;
        #[cfg(not(feature = "parallel"))]
        for state in &mut self.lexical_states {
            state.process(registry, config)?;
        }

        // A token keeps a grammar-wide target only if every state agrees.
        let mut targets: HashMap<TokenId, Option<CompactString>, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        for state in &self.lexical_states {
            for (token, target) in state.transitions() {
                targets
                    .entry(*token)
                    .and_modify(|current| {
                        if current.as_ref() != Some(target) {
                            log::debug!(
                                "{token}: lexical state switch depends on the source state"
                            );
                            *current = None;
                        }
                    })
                    .or_insert_with(|| Some(target.clone()));
            }
        }
        for (token, target) in targets {
            if let Some(regexp) = self.registry.get_mut(token) {
                regexp.set_new_lexical_state(target);
            }
        }
        self.warnings = self
            .lexical_states
            .iter()
            .flat_map(|state| state.warnings().iter().cloned())
            .collect();

        log::debug!(
            "built {} lexical state(s), {} token type(s), max {} NFA states",
            self.lexical_states.len(),
            self.registry.len(),
            self.max_nfa_states()
        );
        Ok(())
    }

    /// Largest number of move-code states in any lexical state.
    #[must_use]
    pub fn max_nfa_states(&self) -> usize {
        self.lexical_states
            .iter()
            .map(|state| state.all_nfa_states().len())
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn has_lexical_state_transitions(&self) -> bool {
        self.lexical_states.len() > 1
            && self
                .lexical_states
                .iter()
                .any(|state| !state.transitions().is_empty())
    }

    #[must_use]
    pub fn warnings(&self) -> &[LexerWarning] {
        &self.warnings
    }

    /// Plain snapshot of the built tables.
    #[must_use]
    pub fn table(&self) -> LexerTable {
        LexerTable::snapshot(self)
    }
}

/// Identifier check for generated labels: XID plus `_` and `$`.
fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let starts_identifier = chars
        .next()
        .is_some_and(|first| first == '_' || first == '$' || unicode_ident::is_xid_start(first));
    starts_identifier && chars.all(|ch| ch == '$' || unicode_ident::is_xid_continue(ch))
}
