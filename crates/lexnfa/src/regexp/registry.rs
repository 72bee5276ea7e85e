use compact_str::CompactString;
use hashbrown::HashMap;

use super::{Pattern, RegularExpression, TokenId};

/// Owns every regular expression of a grammar, indexed by ordinal.
///
/// Ordinal 0 is reserved for the implicit `EOF` token.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    regexps: Vec<RegularExpression>,
    by_label: HashMap<CompactString, TokenId, ahash::RandomState>,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            regexps: Vec::new(),
            by_label: HashMap::with_hasher(ahash::RandomState::new()),
        };
        registry.register(RegularExpression::new(Pattern::Sequence(Vec::new())).with_label("EOF"));
        registry
    }

    /// Register a regular expression, assigning the next ordinal.
    pub fn register(&mut self, mut regexp: RegularExpression) -> TokenId {
        let id = TokenId(u32::try_from(self.regexps.len()).unwrap_or(u32::MAX));
        regexp.set_ordinal(id);
        if let Some(label) = regexp.label() {
            self.by_label.entry(CompactString::new(label)).or_insert(id);
        }
        self.regexps.push(regexp);
        id
    }

    #[must_use]
    pub fn get(&self, id: TokenId) -> Option<&RegularExpression> {
        self.regexps.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: TokenId) -> Option<&mut RegularExpression> {
        self.regexps.get_mut(id.index())
    }

    #[must_use]
    pub fn by_label(&self, label: &str) -> Option<TokenId> {
        self.by_label.get(label).copied()
    }

    /// Pattern of the expression labelled `name`, for inlining references.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Pattern> {
        self.by_label(name)
            .and_then(|id| self.get(id))
            .map(RegularExpression::pattern)
    }

    /// Replace a label, keeping the lookup index in sync.
    pub(crate) fn relabel(&mut self, id: TokenId, label: CompactString) {
        let Some(regexp) = self.regexps.get_mut(id.index()) else {
            return;
        };
        if let Some(old) = regexp.label()
            && self.by_label.get(old) == Some(&id)
        {
            self.by_label.remove(old);
        }
        self.by_label.entry(label.clone()).or_insert(id);
        regexp.set_label(label);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regexps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regexps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegularExpression> {
        self.regexps.iter()
    }
}
