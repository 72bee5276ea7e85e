use compact_str::CompactString;
use smallvec::SmallVec;

use crate::bitset::BitSet;
use crate::charset::{CharRange, to_lower, to_upper};
use crate::regexp::TokenId;

use super::CompositeId;

/// State ID in the NFA.
///
/// Uses u32 which is sufficient for all practical NFA sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NfaStateId(pub u32);

impl NfaStateId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single NFA state.
///
/// Either a character matcher (non-empty `move_ranges`, one successor) or a
/// pure epsilon-routing node.
#[derive(Debug, Clone)]
pub struct NfaState {
    id: NfaStateId,
    token: Option<TokenId>,
    next_state: Option<NfaStateId>,
    /// Sorted, no duplicates
    epsilon_moves: SmallVec<[NfaStateId; 4]>,
    /// Ascending, non-overlapping
    move_ranges: SmallVec<[CharRange; 2]>,
    is_final: bool,
    moves_array_name: Option<CompactString>,
    composite: Option<CompositeId>,
}

impl NfaState {
    fn new(id: NfaStateId, token: Option<TokenId>) -> Self {
        Self {
            id,
            token,
            next_state: None,
            epsilon_moves: SmallVec::new(),
            move_ranges: SmallVec::new(),
            is_final: false,
            moves_array_name: None,
            composite: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> NfaStateId {
        self.id
    }

    /// Token type this state was built for. `None` for the initial state.
    #[must_use]
    pub const fn token(&self) -> Option<TokenId> {
        self.token
    }

    #[must_use]
    pub const fn next_state(&self) -> Option<NfaStateId> {
        self.next_state
    }

    #[must_use]
    pub fn epsilon_moves(&self) -> &[NfaStateId] {
        &self.epsilon_moves
    }

    #[must_use]
    pub fn move_ranges(&self) -> &[CharRange] {
        &self.move_ranges
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.is_final
    }

    pub(crate) const fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }

    /// Name of the generated move-table array, assigned to states that need
    /// move code.
    #[must_use]
    pub fn moves_array_name(&self) -> Option<&str> {
        self.moves_array_name.as_deref()
    }

    pub(crate) fn set_moves_array_name(&mut self, name: CompactString) {
        self.moves_array_name = Some(name);
    }

    /// Canonical composite of this state's epsilon set, once assigned.
    #[must_use]
    pub const fn composite(&self) -> Option<CompositeId> {
        self.composite
    }

    pub(crate) const fn set_composite(&mut self, composite: CompositeId) {
        self.composite = Some(composite);
    }

    /// Append a move range. Callers add ranges in ascending, non-overlapping
    /// order.
    pub fn add_range(&mut self, lo: u32, hi: u32) {
        debug_assert!(
            self.move_ranges.last().is_none_or(|last| last.hi < lo),
            "move ranges must be added in ascending order"
        );
        self.move_ranges.push(CharRange::new(lo, hi));
    }

    /// Replace the moves with a single character, plus its upper and lower
    /// case forms when `ignore_case` is set.
    pub fn set_char_move(&mut self, c: u32, ignore_case: bool) {
        self.move_ranges.clear();
        if !ignore_case {
            self.move_ranges.push(CharRange::single(c));
            return;
        }
        let upper = to_upper(c);
        let lower = to_lower(c);
        let mut points: SmallVec<[u32; 3]> = SmallVec::new();
        points.push(upper);
        if lower != upper {
            points.push(lower);
        }
        if c != upper && c != lower {
            points.push(c);
        }
        points.sort_unstable();
        self.move_ranges.extend(points.into_iter().map(CharRange::single));
    }

    pub fn add_epsilon_move(&mut self, target: NfaStateId) {
        if let Err(pos) = self.epsilon_moves.binary_search(&target) {
            self.epsilon_moves.insert(pos, target);
        }
    }

    pub fn set_next_state(&mut self, next: NfaStateId) {
        assert_ne!(next, self.id, "an NFA state cannot be its own successor");
        self.next_state = Some(next);
    }

    /// Leading ranges that start below 128. A range straddling 128 is
    /// included and ends the list.
    #[must_use]
    pub fn ascii_move_ranges(&self) -> &[CharRange] {
        let mut end = 0;
        for range in &self.move_ranges {
            if range.lo >= 128 {
                break;
            }
            end += 1;
            if range.hi >= 128 {
                break;
            }
        }
        &self.move_ranges[..end]
    }

    /// Ranges after the ASCII prefix.
    #[must_use]
    pub fn non_ascii_move_ranges(&self) -> &[CharRange] {
        &self.move_ranges[self.ascii_move_ranges().len()..]
    }

    #[must_use]
    pub fn has_ascii_moves(&self) -> bool {
        self.move_ranges.first().is_some_and(|range| range.lo < 128)
    }

    #[must_use]
    pub fn has_non_ascii_moves(&self) -> bool {
        self.move_ranges.last().is_some_and(|range| range.hi >= 128)
    }

    /// Whether the state accepts code point `c`.
    #[must_use]
    pub fn accepts(&self, c: u32) -> bool {
        self.move_ranges
            .binary_search_by(|range| {
                if c < range.lo {
                    std::cmp::Ordering::Greater
                } else if c > range.hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// True if any of `others` is this state or shares a move character
    /// with it.
    pub fn overlaps<'a>(&self, others: impl IntoIterator<Item = &'a Self>) -> bool {
        let mine = BitSet::from_ranges(&self.move_ranges);
        others.into_iter().any(|other| {
            other.id == self.id || mine.intersects(&BitSet::from_ranges(&other.move_ranges))
        })
    }
}

/// Arena of NFA states for one lexical state.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    states: Vec<NfaState>,
}

impl Nfa {
    #[must_use]
    pub const fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn add_state(&mut self, token: Option<TokenId>) -> NfaStateId {
        let id = NfaStateId(u32::try_from(self.states.len()).unwrap_or(u32::MAX));
        self.states.push(NfaState::new(id, token));
        id
    }

    #[must_use]
    pub fn state(&self, id: NfaStateId) -> &NfaState {
        &self.states[id.index()]
    }

    pub fn state_mut(&mut self, id: NfaStateId) -> &mut NfaState {
        &mut self.states[id.index()]
    }

    pub fn add_epsilon_move(&mut self, from: NfaStateId, to: NfaStateId) {
        self.state_mut(from).add_epsilon_move(to);
    }

    pub fn set_next_state(&mut self, from: NfaStateId, to: NfaStateId) {
        self.state_mut(from).set_next_state(to);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NfaState> {
        self.states.iter()
    }

    /// Every state reachable from `id` through epsilon moves, including `id`.
    #[must_use]
    pub fn epsilon_closure(&self, id: NfaStateId) -> BitSet {
        let mut closure = BitSet::with_capacity(u32::try_from(self.states.len()).unwrap_or(0));
        closure.insert(id.0);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for &next in &self.state(current).epsilon_moves {
                if closure.insert(next.0) {
                    stack.push(next);
                }
            }
        }
        closure
    }

    /// Replace every state's epsilon moves with its closure, keeping only
    /// states that have character moves. A state becomes final when its
    /// closure reaches a final state.
    pub fn close_epsilon_moves(&mut self) {
        let final_states: BitSet = self
            .states
            .iter()
            .filter(|state| state.is_final)
            .map(|state| state.id.0)
            .collect();
        let has_moves: BitSet = self
            .states
            .iter()
            .filter(|state| !state.move_ranges.is_empty())
            .map(|state| state.id.0)
            .collect();

        let closures: Vec<BitSet> = self
            .states
            .iter()
            .map(|state| self.epsilon_closure(state.id))
            .collect();

        for (state, mut closure) in self.states.iter_mut().zip(closures) {
            if closure.intersects(&final_states) {
                state.is_final = true;
            }
            closure.intersect_with(&has_moves);
            state.epsilon_moves = closure.iter().map(NfaStateId).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(state: &NfaState) -> Vec<(u32, u32)> {
        state.move_ranges().iter().map(|r| (r.lo, r.hi)).collect()
    }

    #[test]
    fn test_char_move_case_sensitive() {
        let mut nfa = Nfa::new();
        let id = nfa.add_state(None);
        nfa.state_mut(id).set_char_move('a' as u32, false);
        assert_eq!(ranges(nfa.state(id)), vec![(97, 97)]);
    }

    #[test]
    fn test_char_move_ignore_case() {
        let mut nfa = Nfa::new();
        let id = nfa.add_state(None);
        nfa.state_mut(id).set_char_move('a' as u32, true);
        assert_eq!(ranges(nfa.state(id)), vec![(65, 65), (97, 97)]);

        nfa.state_mut(id).set_char_move('7' as u32, true);
        assert_eq!(ranges(nfa.state(id)), vec![(55, 55)]);
    }

    #[test]
    fn test_char_move_titlecase_has_three_ranges() {
        let mut nfa = Nfa::new();
        let id = nfa.add_state(None);
        // U+01C5 is titlecase: its upper and lower forms are both different.
        nfa.state_mut(id).set_char_move(0x01C5, true);
        assert_eq!(
            ranges(nfa.state(id)),
            vec![(0x01C4, 0x01C4), (0x01C5, 0x01C5), (0x01C6, 0x01C6)]
        );
    }

    #[test]
    fn test_ascii_split() {
        let mut nfa = Nfa::new();
        let id = nfa.add_state(None);
        let state = nfa.state_mut(id);
        state.add_range('0' as u32, '9' as u32);
        state.add_range('a' as u32, 200);
        state.add_range(0x400, 0x4FF);
        assert_eq!(state.ascii_move_ranges().len(), 2);
        assert_eq!(state.non_ascii_move_ranges(), &[CharRange::new(0x400, 0x4FF)]);
        assert!(state.has_ascii_moves());
        assert!(state.has_non_ascii_moves());
        assert!(state.accepts('5' as u32));
        assert!(state.accepts(150));
        assert!(!state.accepts(300));
    }

    #[test]
    #[should_panic(expected = "own successor")]
    fn test_next_state_cannot_be_self() {
        let mut nfa = Nfa::new();
        let id = nfa.add_state(None);
        nfa.set_next_state(id, id);
    }

    #[test]
    fn test_epsilon_moves_sorted_and_deduplicated() {
        let mut nfa = Nfa::new();
        let a = nfa.add_state(None);
        let b = nfa.add_state(None);
        let c = nfa.add_state(None);
        nfa.add_epsilon_move(a, c);
        nfa.add_epsilon_move(a, b);
        nfa.add_epsilon_move(a, c);
        assert_eq!(nfa.state(a).epsilon_moves(), &[b, c]);
    }

    #[test]
    fn test_close_epsilon_moves() {
        let mut nfa = Nfa::new();
        let start = nfa.add_state(None);
        let mid = nfa.add_state(None);
        let matcher = nfa.add_state(None);
        let end = nfa.add_state(None);
        nfa.add_epsilon_move(start, mid);
        nfa.add_epsilon_move(mid, matcher);
        nfa.add_epsilon_move(mid, end);
        nfa.state_mut(matcher).add_range('x' as u32, 'x' as u32);
        nfa.state_mut(end).set_final(true);

        nfa.close_epsilon_moves();

        // Only states with moves survive in the epsilon sets.
        assert_eq!(nfa.state(start).epsilon_moves(), &[matcher]);
        assert_eq!(nfa.state(matcher).epsilon_moves(), &[matcher]);
        assert!(nfa.state(end).epsilon_moves().is_empty());
        // Finality flows backwards along epsilon paths only.
        assert!(nfa.state(start).is_final());
        assert!(nfa.state(mid).is_final());
        assert!(!nfa.state(matcher).is_final());
    }

    #[test]
    fn test_overlaps() {
        let mut nfa = Nfa::new();
        let a = nfa.add_state(None);
        let b = nfa.add_state(None);
        let c = nfa.add_state(None);
        nfa.state_mut(a).add_range('a' as u32, 'm' as u32);
        nfa.state_mut(b).add_range('k' as u32, 'z' as u32);
        nfa.state_mut(c).add_range('0' as u32, '9' as u32);
        assert!(nfa.state(a).overlaps([nfa.state(b)]));
        assert!(!nfa.state(a).overlaps([nfa.state(c)]));
        assert!(nfa.state(c).overlaps([nfa.state(c)]));
    }
}
