use crate::board::{Board, MAX_STACKS, Stack};

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;

const EMPTY_SLOT: u8 = u8::MAX;

/// Full-content key of a board.
///
/// Every stack contributes its length followed by its cards bottom to top, and
/// the slot occupant closes the key. Stack order is kept, so two boards share a
/// fingerprint exactly when they are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(Box<[u8]>);

impl Fingerprint {
    pub fn of(board: &Board) -> Self {
        Self::encode(board.stacks.iter(), board)
    }

    /// Like [`Fingerprint::of`] but blind to stack order.
    ///
    /// Stacks are interchangeable under the rules, so boards that differ only
    /// by a permutation of their stacks are either all dead or all solvable.
    /// The search keys its memo on this.
    pub fn symmetric(board: &Board) -> Self {
        let mut stacks: SmallVec<[&Stack; MAX_STACKS]> = board.stacks.iter().collect();
        stacks.sort_unstable_by(|a, b| {
            a.len()
                .cmp(&b.len())
                .then_with(|| a.iter().map(|c| c.id()).cmp(b.iter().map(|c| c.id())))
        });
        Self::encode(stacks.into_iter(), board)
    }

    fn encode<'a>(stacks: impl Iterator<Item = &'a Stack>, board: &Board) -> Self {
        let mut bytes: SmallVec<[u8; 128]> = SmallVec::new();
        for stack in stacks {
            bytes.extend_from_slice(&(stack.len() as u16).to_le_bytes());
            bytes.extend(stack.iter().map(|card| card.id()));
        }
        bytes.push(board.slot.map_or(EMPTY_SLOT, |card| card.id()));
        Self(bytes.as_slice().into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Boards proven to have no path to the goal.
///
/// Unbounded by default. With a capacity the oldest entries are dropped first;
/// a dropped entry only costs a re-exploration.
#[derive(Debug, Default)]
pub struct DeadStates {
    set: FxHashSet<Fingerprint>,
    order: VecDeque<Fingerprint>,
    capacity: Option<usize>,
    evicted: u64,
}

impl DeadStates {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity: capacity.map(|c| c.max(1)),
            ..Default::default()
        }
    }

    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.set.contains(key)
    }

    pub fn insert(&mut self, key: Fingerprint) {
        let Some(capacity) = self.capacity else {
            self.set.insert(key);
            return;
        };
        if self.set.contains(&key) {
            return;
        }
        if self.set.len() >= capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.set.remove(&oldest);
            self.evicted += 1;
            if self.evicted == 1 {
                log::warn!("Dead-state memo reached its capacity of {capacity}; evicting oldest entries");
            }
        }
        self.order.push_back(key.clone());
        self.set.insert(key);
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
