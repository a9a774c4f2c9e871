//! Depth-first search with a memo of dead boards.
//!
//! Dead boards are keyed without regard to stack order, so a position reached
//! again with its stacks permuted is pruned as well.
//!
//! The search walks an explicit frame stack instead of recursing, so deep
//! decks cannot exhaust the native stack. Every frame owns its board; moving
//! down applies a move to a copy and moving up just drops the frame.

mod memo;
mod moves;
mod parallel;

pub use self::memo::{DeadStates, Fingerprint};
pub use self::moves::{PossibleMoves, compute_possible_moves, possible_moves};
pub use self::parallel::solve_parallel;

use crate::action::Move;
use crate::board::Board;
use crate::deal::Deal;
use crate::report::Solution;

use std::{
    fmt,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
    time::{Duration, Instant},
};

const PROGRESS_INTERVAL: u64 = 1 << 16;
const CLOCK_INTERVAL: u64 = 1 << 8;

/// Optional bounds on a single solve. The default explores without limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Stop after expanding this many boards.
    pub max_states: Option<u64>,
    /// Stop once this much wall-clock time has passed.
    pub time_limit: Option<Duration>,
    /// Keep at most this many dead boards in the memo.
    pub memo_capacity: Option<usize>,
}

impl SearchLimits {
    pub fn is_bounded(&self) -> bool {
        self.max_states.is_some() || self.time_limit.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetExceeded {
    States(u64),
    Time(Duration),
}

impl fmt::Display for BudgetExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetExceeded::States(max) => write!(f, "reached max states {max}"),
            BudgetExceeded::Time(limit) => write!(f, "reached time limit {limit:?}"),
        }
    }
}

/// Terminal result of a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved(Solution),
    /// Every reachable board was explored and none is the goal.
    Unsolvable,
    /// The search stopped early; the deal may or may not be solvable.
    UnsolvableWithinBudget(BudgetExceeded),
}

impl Outcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub outcome: Outcome,
    /// Boards expanded, the root included.
    pub states: u64,
    /// Boards skipped because the memo already knew them dead.
    pub memo_hits: u64,
    pub memo_size: usize,
    pub elapsed: Duration,
}

pub fn solve(deal: &Deal, limits: SearchLimits) -> SolveResult {
    Solver::new(limits).solve(deal)
}

/// Raw result of walking one subtree.
#[derive(Debug)]
pub(crate) enum Search {
    Found(Vec<Move>),
    Exhausted,
    OutOfBudget(BudgetExceeded),
    /// A lower-numbered branch of a parallel solve already found the goal.
    Cancelled,
}

/// State shared by the branch searches of a parallel solve.
#[derive(Debug)]
pub(crate) struct Shared {
    pub states: AtomicU64,
    /// Lowest branch index known to be solved, `usize::MAX` until then.
    pub solved_at: AtomicUsize,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            states: AtomicU64::new(0),
            solved_at: AtomicUsize::new(usize::MAX),
        }
    }
}

struct Frame {
    board: Board,
    moves: PossibleMoves,
    next: usize,
    key: Fingerprint,
}

/// A single search invocation. The memo belongs to this value alone, so a
/// solver must not be reused for a different deal.
#[derive(Debug)]
pub struct Solver<'a> {
    limits: SearchLimits,
    dead: DeadStates,
    states: u64,
    memo_hits: u64,
    deadline: Option<Instant>,
    shared: Option<(&'a Shared, usize)>,
}

impl<'a> Solver<'a> {
    pub fn new(limits: SearchLimits) -> Self {
        Self {
            limits,
            dead: DeadStates::new(limits.memo_capacity),
            states: 0,
            memo_hits: 0,
            deadline: None,
            shared: None,
        }
    }

    /// Joins a parallel solve as the search of first-move branch `branch`.
    pub(crate) fn for_branch(
        limits: SearchLimits,
        started: Instant,
        shared: &'a Shared,
        branch: usize,
    ) -> Self {
        let mut solver = Self::new(limits);
        solver.deadline = limits.time_limit.map(|limit| started + limit);
        solver.shared = Some((shared, branch));
        solver
    }

    pub fn solve(mut self, deal: &Deal) -> SolveResult {
        let timer = Instant::now();
        self.deadline = self.limits.time_limit.map(|limit| timer + limit);
        log::debug!(
            "Solving a deal of {} cards in {} stacks",
            deal.card_count(),
            deal.board().stack_count()
        );

        let outcome = match self.search(deal.board().clone()) {
            Search::Found(moves) => Outcome::Solved(Solution::resolve(deal.board(), moves)),
            Search::Exhausted => Outcome::Unsolvable,
            Search::OutOfBudget(exceeded) => Outcome::UnsolvableWithinBudget(exceeded),
            Search::Cancelled => unreachable!("only branch searches are cancelled"),
        };
        let result = self.finish(outcome, timer.elapsed());
        log::debug!(
            "Search finished: solved={}, states={}, memo hits={}, memo size={}, elapsed={:?}",
            result.outcome.is_solved(),
            result.states,
            result.memo_hits,
            result.memo_size,
            result.elapsed
        );
        result
    }

    pub(crate) fn finish(&self, outcome: Outcome, elapsed: Duration) -> SolveResult {
        SolveResult {
            outcome,
            states: self.states,
            memo_hits: self.memo_hits,
            memo_size: self.dead.len(),
            elapsed,
        }
    }

    /// Walks every board reachable from `root` in generator order and returns
    /// the first path to the goal.
    pub(crate) fn search(&mut self, root: Board) -> Search {
        if root.is_goal() {
            return Search::Found(Vec::new());
        }

        let mut frames: Vec<Frame> = Vec::with_capacity(root.card_count() + 1);
        let mut path: Vec<Move> = Vec::with_capacity(root.card_count());
        if let Some(stop) = self.expand() {
            return stop;
        }
        frames.push(Frame {
            moves: possible_moves(&root),
            next: 0,
            key: Fingerprint::symmetric(&root),
            board: root,
        });

        while let Some(frame) = frames.last_mut() {
            if frame.next == frame.moves.len() {
                if let Some(done) = frames.pop() {
                    self.dead.insert(done.key);
                }
                path.pop();
                continue;
            }

            let mov = frame.moves[frame.next];
            frame.next += 1;
            let next = frame.board.apply(&mov).unwrap_or_else(|err| {
                panic!("generated move {mov} cannot be applied: {err}");
            });

            if next.is_goal() {
                path.push(mov);
                return Search::Found(path);
            }

            let key = Fingerprint::symmetric(&next);
            if self.dead.contains(&key) {
                self.memo_hits += 1;
                continue;
            }

            if let Some(stop) = self.expand() {
                return stop;
            }
            path.push(mov);
            frames.push(Frame {
                moves: possible_moves(&next),
                next: 0,
                key,
                board: next,
            });
        }

        Search::Exhausted
    }

    /// Counts one expanded board and reports why the search must stop, if it must.
    fn expand(&mut self) -> Option<Search> {
        self.states += 1;
        let total = match self.shared {
            Some((shared, _)) => shared.states.fetch_add(1, Ordering::Relaxed) + 1,
            None => self.states,
        };

        if total % PROGRESS_INTERVAL == 0 {
            log::trace!(
                "Expanded {total} states, {} dead boards memoized",
                self.dead.len()
            );
        }

        if let Some(max) = self.limits.max_states
            && total > max
        {
            return Some(Search::OutOfBudget(BudgetExceeded::States(max)));
        }
        if self.states % CLOCK_INTERVAL == 0 {
            if let Some((shared, branch)) = self.shared
                && shared.solved_at.load(Ordering::Relaxed) < branch
            {
                return Some(Search::Cancelled);
            }
            if let (Some(deadline), Some(limit)) = (self.deadline, self.limits.time_limit)
                && Instant::now() >= deadline
            {
                return Some(Search::OutOfBudget(BudgetExceeded::Time(limit)));
            }
        }
        None
    }
}
