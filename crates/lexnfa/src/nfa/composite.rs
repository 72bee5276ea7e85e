use std::cmp::Ordering;

use crate::bitset::BitSet;
use crate::regexp::TokenId;

use super::lexical_state::LexicalStateData;
use super::state::{NfaState, NfaStateId};

/// Handle to a composite in its lexical state's composite arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeId(pub u32);

impl CompositeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A canonical set of NFA states that share one epsilon closure.
///
/// Two composites are equal iff their member sets are equal; the owning
/// lexical state hands out exactly one instance per member set.
#[derive(Debug, Clone)]
pub struct CompositeStateSet {
    /// Sorted by id
    states: Box<[NfaStateId]>,
    index: Option<usize>,
}

impl PartialEq for CompositeStateSet {
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states
    }
}

impl Eq for CompositeStateSet {}

impl CompositeStateSet {
    pub(crate) fn new(states: Box<[NfaStateId]>) -> Self {
        Self {
            states,
            index: None,
        }
    }

    #[must_use]
    pub fn states(&self) -> &[NfaStateId] {
        &self.states
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Position in the lexical state's ordered composite list. `None` for
    /// composites that are never reached.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    pub(crate) const fn set_index(&mut self, index: usize) {
        self.index = Some(index);
    }
}

/// Read-only view of a composite together with its lexical state.
#[derive(Clone, Copy)]
pub struct Composite<'a> {
    lexical_state: &'a LexicalStateData,
    id: CompositeId,
    set: &'a CompositeStateSet,
}

impl std::fmt::Debug for Composite<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composite")
            .field("id", &self.id)
            .field("index", &self.set.index)
            .field("states", &self.set.states)
            .finish()
    }
}

impl<'a> Composite<'a> {
    pub(crate) const fn new(
        lexical_state: &'a LexicalStateData,
        id: CompositeId,
        set: &'a CompositeStateSet,
    ) -> Self {
        Self {
            lexical_state,
            id,
            set,
        }
    }

    #[must_use]
    pub const fn id(&self) -> CompositeId {
        self.id
    }

    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.set.index
    }

    #[must_use]
    pub const fn set(&self) -> &'a CompositeStateSet {
        self.set
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Member states in id order.
    pub fn states(&self) -> impl Iterator<Item = &'a NfaState> + 'a {
        let lexical_state = self.lexical_state;
        self.set.states.iter().map(move |id| lexical_state.state(*id))
    }

    /// Identifier of the generated dispatch routine: `NfaIndex<i>` in the
    /// default lexical state, `NfaName<STATE>Index<i>` otherwise. `None`
    /// for a composite that was never reached and so has no index.
    #[must_use]
    pub fn method_name(&self) -> Option<String> {
        let index = self.set.index?;
        Some(if self.lexical_state.is_default() {
            format!("NfaIndex{index}")
        } else {
            format!("NfaName{}Index{index}", self.lexical_state.name())
        })
    }

    /// Token type of the members. Apart from the initial composite, all
    /// members of a composite come from the same token.
    #[must_use]
    pub fn token(&self) -> Option<TokenId> {
        self.states().find_map(NfaState::token)
    }

    /// True iff some member's successor accepts.
    #[must_use]
    pub fn has_final_member(&self) -> bool {
        self.states()
            .any(|state| self.lexical_state.is_next_final(state.id()))
    }

    /// Members in dispatch order.
    ///
    /// Sorted by the successor's token ordinal, highest first, so that the
    /// earliest-declared token is tried last and wins. Members whose
    /// successor does not accept use `u32::MAX` as their ordinal. Ties are
    /// broken by the first move range and the number of ranges.
    #[must_use]
    pub fn ordered_members(&self) -> Vec<&'a NfaState> {
        let mut members: Vec<&NfaState> = self.states().collect();
        members.sort_by(|a, b| self.compare_members(a, b));
        members
    }

    fn successor_ordinal(&self, state: &NfaState) -> u32 {
        state
            .next_state()
            .map(|next| self.lexical_state.state(next))
            .filter(|next| next.is_final())
            .and_then(NfaState::token)
            .map_or(u32::MAX, TokenId::ordinal)
    }

    fn compare_members(&self, a: &NfaState, b: &NfaState) -> Ordering {
        let first_range = |state: &NfaState| {
            state
                .move_ranges()
                .first()
                .map(|range| (range.lo, range.hi))
        };
        self.successor_ordinal(b)
            .cmp(&self.successor_ordinal(a))
            .then_with(|| first_range(a).cmp(&first_range(b)))
            .then_with(|| a.move_ranges().len().cmp(&b.move_ranges().len()))
            .then_with(|| a.id().cmp(&b.id()))
    }

    /// Composites reached by consuming one character from this one.
    pub fn successors(&self) -> impl Iterator<Item = CompositeId> + 'a {
        let lexical_state = self.lexical_state;
        self.states().filter_map(move |state| {
            state
                .next_state()
                .and_then(|next| lexical_state.state(next).composite())
        })
    }
}

/// Collect the non-empty composites reachable from `start`, in depth-first
/// preorder. Empty composites end the walk and are never collected.
pub(crate) fn find_what_is_used(
    lexical_state: &LexicalStateData,
    start: CompositeId,
) -> Vec<CompositeId> {
    let mut visited = BitSet::new();
    let mut used = Vec::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !visited.insert(id.0) {
            continue;
        }
        let composite = lexical_state.composite(id);
        if composite.is_empty() {
            continue;
        }
        used.push(id);
        log::trace!(
            "{}: composite {:?} reached with {} member(s)",
            lexical_state.name(),
            id,
            composite.len()
        );
        let successors: Vec<CompositeId> = composite.successors().collect();
        stack.extend(successors.into_iter().rev());
    }
    used
}
