//! This crate solves the pairs-to-thirteen stack solitaire.
//!
//! Cards are dealt into stacks with only the top card of each exposed. Two
//! exposed cards whose ranks sum to 13 may be removed together, and a single
//! overflow slot can park one stack top at a time. The solver finds a move
//! sequence that clears the table or proves none exists.
pub mod action;
pub mod board;
pub mod card;
pub mod deal;
pub mod error;
pub mod report;
pub mod solver;

pub use crate::action::Move;
pub use crate::board::{Board, Location};
pub use crate::card::Card;
pub use crate::deal::{Composition, Deal, Rules};
pub use crate::error::{DealError, MoveError};
pub use crate::report::{Solution, Step, StepKind, replay, transcript};
pub use crate::solver::{Outcome, SearchLimits, SolveResult, solve, solve_parallel};
