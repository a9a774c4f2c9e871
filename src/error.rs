use crate::board::Location;
use crate::card::Card;

use std::fmt;

/// Reasons a deal is rejected before any search starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealError {
    RankOutOfRange { rank: u8 },
    UnknownSuit { suit: u8 },
    StackCountMismatch { expected: usize, found: usize },
    TooManyStacks { stacks: usize, limit: usize },
    CardCountMismatch { expected: usize, found: usize },
    RankCountMismatch { rank: u8, expected: usize, found: usize },
    DuplicateCard { card: Card, allowed: usize },
    SlotOccupied,
}

impl fmt::Display for DealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealError::RankOutOfRange { rank } => {
                write!(f, "malformed deal: rank {rank} is outside 1..=13")
            }
            DealError::UnknownSuit { suit } => {
                write!(f, "malformed deal: unknown suit {suit}")
            }
            DealError::StackCountMismatch { expected, found } => {
                write!(f, "malformed deal: expected {expected} stacks, found {found}")
            }
            DealError::TooManyStacks { stacks, limit } => {
                write!(f, "malformed deal: {stacks} stacks exceed the limit of {limit}")
            }
            DealError::CardCountMismatch { expected, found } => {
                write!(f, "malformed deal: expected {expected} cards, found {found}")
            }
            DealError::RankCountMismatch {
                rank,
                expected,
                found,
            } => write!(
                f,
                "malformed deal: rank {rank} should appear {expected} times, found {found}"
            ),
            DealError::DuplicateCard { card, allowed } => {
                write!(f, "malformed deal: {card} appears more than {allowed} time(s)")
            }
            DealError::SlotOccupied => {
                write!(f, "malformed deal: the overflow slot must start empty")
            }
        }
    }
}

impl std::error::Error for DealError {}

/// A move that cannot be applied to the state it was given.
///
/// Moves produced by the generator never fail; seeing one of these during a
/// search means the generator and the board disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    EmptySource(Location),
    SameSource(Location),
    RankSumMismatch { first: Card, second: Card, target: u8 },
    SlotOccupied,
    CardMismatch { location: Location, expected: Card, found: Card },
    StackOutOfRange { index: usize, stacks: usize },
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::EmptySource(location) => write!(f, "{location} has no exposed card"),
            MoveError::SameSource(location) => {
                write!(f, "cannot match {location} with itself")
            }
            MoveError::RankSumMismatch {
                first,
                second,
                target,
            } => write!(f, "{first} and {second} do not sum to {target}"),
            MoveError::SlotOccupied => write!(f, "the overflow slot is occupied"),
            MoveError::CardMismatch {
                location,
                expected,
                found,
            } => write!(f, "{location} shows {found}, expected {expected}"),
            MoveError::StackOutOfRange { index, stacks } => {
                write!(f, "stack {} does not exist ({stacks} stacks)", index + 1)
            }
        }
    }
}

impl std::error::Error for MoveError {}
