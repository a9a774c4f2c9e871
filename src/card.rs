use crate::error::DealError;

use anyhow::{Context, Result};
use std::fmt;

pub const MAX_RANK: u8 = 13;
pub const MAX_SUIT: u8 = 4;
pub const MAX_CARD: u8 = MAX_SUIT * MAX_RANK;

const SUITS: [char; 5] = ['♣', '♦', '♠', '♥', '?'];
const ASCII_SUITS: [char; 4] = ['C', 'D', 'S', 'H'];
const RANKS: [char; 14] = [
    '?', 'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];

/// A playing card packed into a single byte.
///
/// Ranks run from 1 (ace) to 13 (king). Only the rank takes part in move
/// legality; the suit is kept so a deal can be checked for duplicates and
/// printed back the way it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    pub const UNKNOWN: Self = Self(MAX_CARD);

    pub fn try_new(rank: u8, suit: u8) -> Result<Self, DealError> {
        if !(1..=MAX_RANK).contains(&rank) {
            return Err(DealError::RankOutOfRange { rank });
        }
        if suit >= MAX_SUIT {
            return Err(DealError::UnknownSuit { suit });
        }
        Ok(Self::new_with_rank_suit(rank, suit))
    }

    pub fn new_with_id(id: u8) -> Self {
        if id >= MAX_CARD {
            Self::UNKNOWN
        } else {
            Self(id)
        }
    }

    /// Caller guarantees `1 <= rank <= 13` and `suit < 4`.
    pub fn new_with_rank_suit(rank: u8, suit: u8) -> Self {
        Self(suit * MAX_RANK + rank - 1)
    }

    pub fn parse(rank: char, suit: char) -> Result<Self> {
        let rank_idx = RANKS
            .iter()
            .skip(1)
            .position(|&r| r == rank.to_ascii_uppercase())
            .with_context(|| format!("Invalid rank at card {rank}{suit}"))?;
        let suit_idx = SUITS
            .iter()
            .take(MAX_SUIT as usize)
            .position(|&s| s == suit)
            .or_else(|| {
                ASCII_SUITS
                    .iter()
                    .position(|&s| s == suit.to_ascii_uppercase())
            })
            .with_context(|| format!("Invalid suit at card {rank}{suit}"))?;
        Ok(Card::new_with_rank_suit(rank_idx as u8 + 1, suit_idx as u8))
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 >= Card::UNKNOWN.0
    }

    pub fn rank(&self) -> u8 {
        if self.is_unknown() {
            return 0;
        }
        self.0 % MAX_RANK + 1
    }

    pub fn suit(&self) -> u8 {
        self.0 / MAX_RANK
    }
}

impl Default for Card {
    fn default() -> Self {
        Card::UNKNOWN
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANKS[self.rank() as usize],
            SUITS[self.suit() as usize]
        )
    }
}
