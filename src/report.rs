//! Packaging of search results for whoever executes the moves.

use crate::action::{Move, describe_move, format_moves};
use crate::board::{Board, Location};
use crate::card::Card;
use crate::deal::Deal;
use crate::error::MoveError;
use crate::solver::{Outcome, SolveResult};

use smallvec::SmallVec;
use std::fmt::Write;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepKind {
    Match,
    Stash,
}

/// One resolved move: which locations to touch and which cards they hold.
///
/// Steps must be executed strictly in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    pub sources: SmallVec<[Location; 2]>,
    pub cards: SmallVec<[Card; 2]>,
    /// Cards left on the table after this step.
    pub remaining: usize,
}

impl Step {
    fn new(mov: &Move, remaining: usize) -> Self {
        match *mov {
            Move::Match { sources, cards } => Step {
                kind: StepKind::Match,
                sources: SmallVec::from_buf(sources),
                cards: SmallVec::from_buf(cards),
                remaining,
            },
            Move::Stash { from, card } => Step {
                kind: StepKind::Stash,
                sources: smallvec::smallvec![Location::Stack(from)],
                cards: smallvec::smallvec![card],
                remaining,
            },
        }
    }
}

/// A winning line from the initial board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub moves: Vec<Move>,
    pub steps: Vec<Step>,
}

impl Solution {
    /// Resolves a path found by the search. The path must be legal from `initial`.
    pub(crate) fn resolve(initial: &Board, moves: Vec<Move>) -> Self {
        let mut board = initial.clone();
        let mut steps = Vec::with_capacity(moves.len());
        for mov in &moves {
            if let Err(err) = board.play(mov) {
                panic!("search produced an illegal move {mov}: {err}");
            }
            steps.push(Step::new(mov, board.card_count()));
        }
        Self { moves, steps }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn stash_count(&self) -> usize {
        self.moves.iter().filter(|m| m.is_stash()).count()
    }
}

/// Plays `moves` from the deal's initial board, stopping at the first illegal one.
pub fn replay(deal: &Deal, moves: &[Move]) -> Result<Board, MoveError> {
    let mut board = deal.board().clone();
    for mov in moves {
        board.play(mov)?;
    }
    Ok(board)
}

/// Human-readable account of a solve: the deal, each step, and the verdict.
pub fn transcript(deal: &Deal, result: &SolveResult) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "===== DEAL =====\n{}\n", deal.board().pretty_print());

    match &result.outcome {
        Outcome::Solved(solution) => {
            let _ = writeln!(output, "===== STEPS =====");
            let total = solution.len();
            for (index, (mov, step)) in solution.moves.iter().zip(&solution.steps).enumerate() {
                let _ = writeln!(
                    output,
                    "{:03}/{total:03} {:<6} {} [{} left]",
                    index + 1,
                    mov.notation(),
                    describe_move(mov),
                    step.remaining
                );
            }
            let _ = writeln!(output, "\n{}", format_moves(&solution.moves).trim_end());
            let _ = write!(
                output,
                "✓ Solved in {} moves ({} stashes)",
                total,
                solution.stash_count()
            );
        }
        Outcome::Unsolvable => {
            let _ = write!(
                output,
                "✗ Unsolvable: every reachable position was explored without clearing the board"
            );
        }
        Outcome::UnsolvableWithinBudget(exceeded) => {
            let _ = write!(
                output,
                "? No solution found before the search {exceeded}; retry without limits for a definitive answer"
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{Composition, Rules};
    use crate::solver::{BudgetExceeded, SearchLimits, solve};

    fn small_deal() -> Deal {
        let card = Card::new_with_rank_suit;
        let rules = Rules::new(2, Composition::counting([6, 7, 9, 4]));
        Deal::new(rules, [vec![card(6, 0), card(7, 1)], vec![card(9, 2), card(4, 3)]]).unwrap()
    }

    #[test]
    fn test_steps_resolve_locations_and_cards() {
        let deal = small_deal();
        let result = solve(&deal, SearchLimits::default());
        let solution = result.outcome.solution().unwrap();
        assert_eq!(solution.len(), 4);
        assert_eq!(solution.stash_count(), 2);

        let first = &solution.steps[0];
        assert_eq!(first.kind, StepKind::Stash);
        assert_eq!(first.sources.as_slice(), &[Location::Stack(0)]);
        assert_eq!(first.cards.as_slice(), &[Card::new_with_rank_suit(7, 1)]);
        assert_eq!(first.remaining, 4);

        let second = &solution.steps[1];
        assert_eq!(second.kind, StepKind::Match);
        assert_eq!(second.sources.as_slice(), &[Location::Stack(0), Location::Slot]);
        assert_eq!(second.remaining, 2);
        assert_eq!(solution.steps.last().unwrap().remaining, 0);
    }

    #[test]
    fn test_replay_rejects_illegal_move() {
        let deal = small_deal();
        let bad = Move::Match {
            sources: [Location::Stack(0), Location::Stack(1)],
            cards: [Card::new_with_rank_suit(7, 1), Card::new_with_rank_suit(4, 3)],
        };
        assert!(matches!(
            replay(&deal, &[bad]),
            Err(MoveError::RankSumMismatch { .. })
        ));
        assert_eq!(replay(&deal, &[]).unwrap(), *deal.board());
    }

    #[test]
    fn test_transcript_solved() {
        let deal = small_deal();
        let result = solve(&deal, SearchLimits::default());
        let text = transcript(&deal, &result);
        assert!(text.starts_with("===== DEAL =====\nStack1: 6♣7♦\nStack2: 9♠4♥\n"));
        assert!(text.contains("001/004 S1>X   (Stack1) 7♦ -> (Slot) [4 left]"));
        assert!(text.contains("004/004 S2+X   (Stack2) 9♠ + (Slot) 4♥ [0 left]"));
        assert!(text.ends_with("✓ Solved in 4 moves (2 stashes)"));
    }

    #[test]
    fn test_transcript_verdicts() {
        let deal = small_deal();
        let unsolvable = SolveResult {
            outcome: Outcome::Unsolvable,
            states: 3,
            memo_hits: 0,
            memo_size: 3,
            elapsed: Default::default(),
        };
        assert!(transcript(&deal, &unsolvable).contains("✗ Unsolvable"));

        let budget = SolveResult {
            outcome: Outcome::UnsolvableWithinBudget(BudgetExceeded::States(10)),
            ..unsolvable
        };
        let text = transcript(&deal, &budget);
        assert!(text.contains("reached max states 10"));
        assert!(!text.contains("✗ Unsolvable"));
    }
}
