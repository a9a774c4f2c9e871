//! Rule sets and validated initial layouts.

use crate::board::{Board, Exposed, STACK_LIMIT};
use crate::card::{Card, MAX_CARD, MAX_RANK, MAX_SUIT};
use crate::error::DealError;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

pub const DEFAULT_STACKS: usize = 9;

/// How many copies of each rank a deal must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composition {
    counts: [usize; MAX_RANK as usize],
}

impl Composition {
    /// 36 cards: ace to queen in three suits.
    pub fn short() -> Self {
        let mut counts = [3; MAX_RANK as usize];
        counts[MAX_RANK as usize - 1] = 0;
        Self { counts }
    }

    /// 48 cards: a full deck with the kings taken out.
    pub fn no_kings() -> Self {
        let mut counts = [MAX_SUIT as usize; MAX_RANK as usize];
        counts[MAX_RANK as usize - 1] = 0;
        Self { counts }
    }

    /// The full 52-card deck. Kings have no partner, so any deal holding one
    /// is unsolvable.
    pub fn standard() -> Self {
        Self {
            counts: [MAX_SUIT as usize; MAX_RANK as usize],
        }
    }

    /// Exactly the ranks given, for hand-built deals. Ranks outside 1..=13 are ignored.
    pub fn counting(ranks: impl IntoIterator<Item = u8>) -> Self {
        let mut counts = [0; MAX_RANK as usize];
        for rank in ranks {
            if (1..=MAX_RANK).contains(&rank) {
                counts[rank as usize - 1] += 1;
            }
        }
        Self { counts }
    }

    pub fn count(&self, rank: u8) -> usize {
        match rank {
            1..=MAX_RANK => self.counts[rank as usize - 1],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Copies of a single rank/suit identity allowed for `rank`.
    fn identity_limit(&self, rank: u8) -> usize {
        self.count(rank).div_ceil(MAX_SUIT as usize).max(1)
    }

    /// Every card of the composition in rank order; copy `k` of a rank gets suit `k % 4`.
    pub fn cards(&self) -> Vec<Card> {
        let mut cards = Vec::with_capacity(self.total());
        for rank in 1..=MAX_RANK {
            for copy in 0..self.count(rank) {
                cards.push(Card::new_with_rank_suit(rank, (copy % MAX_SUIT as usize) as u8));
            }
        }
        cards
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::short()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub stacks: usize,
    pub composition: Composition,
}

impl Rules {
    pub fn new(stacks: usize, composition: Composition) -> Self {
        Self {
            stacks,
            composition,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(DEFAULT_STACKS, Composition::default())
    }
}

/// A validated initial layout. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    rules: Rules,
    board: Board,
}

impl Deal {
    /// Builds a deal from per-stack card lists, bottom to top.
    pub fn new<I, S>(rules: Rules, stacks: I) -> Result<Self, DealError>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = Card>,
    {
        Self::from_board(rules, Board::new(stacks))
    }

    /// Builds a deal from raw `(rank, suit)` pairs as a recognizer would emit them.
    pub fn from_raw(rules: Rules, stacks: &[Vec<(u8, u8)>]) -> Result<Self, DealError> {
        let stacks = stacks
            .iter()
            .map(|stack| {
                stack
                    .iter()
                    .map(|&(rank, suit)| Card::try_new(rank, suit))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules, stacks)
    }

    pub fn from_board(rules: Rules, board: Board) -> Result<Self, DealError> {
        validate(&rules, &board)?;
        Ok(Self { rules, board })
    }

    /// Shuffles the rule set's composition with a seeded generator and deals it
    /// out in runs of equal length; the first stacks take one extra card when
    /// the deck does not divide evenly.
    pub fn random(rules: Rules, seed: u64) -> Result<Self, DealError> {
        check_stack_limit(rules.stacks)?;
        let mut deck = rules.composition.cards();
        let mut rng = StdRng::seed_from_u64(seed);
        deck.shuffle(&mut rng);

        let stack_count = rules.stacks.max(1);
        let per_stack = deck.len() / stack_count;
        let extra = deck.len() % stack_count;
        let mut stacks = Vec::with_capacity(stack_count);
        let mut rest = deck.as_slice();
        for i in 0..stack_count {
            let len = per_stack + usize::from(i < extra);
            let (stack, tail) = rest.split_at(len);
            stacks.push(stack.to_vec());
            rest = tail;
        }

        Self::new(rules, stacks)
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn exposed(&self) -> Exposed {
        self.board.exposed()
    }

    pub fn card_count(&self) -> usize {
        self.board.card_count()
    }
}

fn check_stack_limit(stacks: usize) -> Result<(), DealError> {
    if stacks > STACK_LIMIT {
        return Err(DealError::TooManyStacks {
            stacks,
            limit: STACK_LIMIT,
        });
    }
    Ok(())
}

fn validate(rules: &Rules, board: &Board) -> Result<(), DealError> {
    check_stack_limit(rules.stacks)?;
    if board.stack_count() != rules.stacks {
        return Err(DealError::StackCountMismatch {
            expected: rules.stacks,
            found: board.stack_count(),
        });
    }
    if board.slot.is_some() {
        return Err(DealError::SlotOccupied);
    }

    let mut seen = [0usize; MAX_CARD as usize];
    let mut ranks = [0usize; MAX_RANK as usize + 1];
    for card in board.cards() {
        if card.is_unknown() {
            return Err(DealError::RankOutOfRange { rank: 0 });
        }
        seen[card.id() as usize] += 1;
        ranks[card.rank() as usize] += 1;
    }

    let expected = rules.composition.total();
    let found = board.card_count();
    if found != expected {
        return Err(DealError::CardCountMismatch { expected, found });
    }
    for rank in 1..=MAX_RANK {
        let expected = rules.composition.count(rank);
        let found = ranks[rank as usize];
        if found != expected {
            return Err(DealError::RankCountMismatch {
                rank,
                expected,
                found,
            });
        }
    }
    for (id, &count) in seen.iter().enumerate() {
        let card = Card::new_with_id(id as u8);
        let allowed = rules.composition.identity_limit(card.rank());
        if count > allowed {
            return Err(DealError::DuplicateCard { card, allowed });
        }
    }
    Ok(())
}
