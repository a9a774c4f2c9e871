use super::*;

use rayon::prelude::*;

/// Solves `deal` by searching each first move as its own rayon task.
///
/// Every branch keeps a private memo, since two branches can reach the same
/// dead board independently. The state budget is shared across branches and
/// the time limit counts from the start of the call. The lowest-numbered
/// solved branch wins, which makes the path identical to [`solve`] whenever
/// the search runs unbounded.
pub fn solve_parallel(deal: &Deal, limits: SearchLimits, threads: usize) -> SolveResult {
    let root = deal.board();
    let first_moves = possible_moves(root);
    if threads <= 1 || first_moves.len() <= 1 || root.is_goal() {
        return solve(deal, limits);
    }

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.min(first_moves.len()))
        .build()
    {
        Ok(pool) => pool,
        Err(err) => {
            log::warn!("Failed to start {threads} worker threads ({err}); solving sequentially");
            return solve(deal, limits);
        }
    };

    let timer = Instant::now();
    let shared = Shared::new();
    // The root counts as one expanded state, as it does in a sequential solve.
    shared.states.store(1, Ordering::Relaxed);
    log::debug!(
        "Solving {} first-move branches on {} threads",
        first_moves.len(),
        pool.current_num_threads()
    );

    let branches: Vec<(Search, SolveResult)> = pool.install(|| {
        first_moves[..]
            .par_iter()
            .enumerate()
            .map(|(branch, mov)| {
                let mut solver = Solver::for_branch(limits, timer, &shared, branch);
                if shared.solved_at.load(Ordering::Relaxed) < branch {
                    return (Search::Cancelled, solver.finish(Outcome::Unsolvable, timer.elapsed()));
                }
                let child = root.apply(mov).unwrap_or_else(|err| {
                    panic!("generated move {mov} cannot be applied: {err}");
                });
                let search = solver.search(child);
                if matches!(search, Search::Found(_)) {
                    shared.solved_at.fetch_min(branch, Ordering::Relaxed);
                }
                (search, solver.finish(Outcome::Unsolvable, timer.elapsed()))
            })
            .collect()
    });

    let states = 1 + branches.iter().map(|(_, s)| s.states).sum::<u64>();
    let memo_hits = branches.iter().map(|(_, s)| s.memo_hits).sum();
    let memo_size = branches.iter().map(|(_, s)| s.memo_size).sum();

    let mut exceeded = None;
    let mut outcome = Outcome::Unsolvable;
    for (branch, (search, _)) in branches.into_iter().enumerate() {
        match search {
            Search::Found(mut moves) => {
                moves.insert(0, first_moves[branch]);
                outcome = Outcome::Solved(Solution::resolve(root, moves));
                break;
            }
            Search::OutOfBudget(reason) => {
                exceeded.get_or_insert(reason);
            }
            Search::Exhausted | Search::Cancelled => {}
        }
    }
    if !outcome.is_solved()
        && let Some(reason) = exceeded
    {
        outcome = Outcome::UnsolvableWithinBudget(reason);
    }

    let result = SolveResult {
        outcome,
        states,
        memo_hits,
        memo_size,
        elapsed: timer.elapsed(),
    };
    log::debug!(
        "Parallel search finished: solved={}, states={}, elapsed={:?}",
        result.outcome.is_solved(),
        result.states,
        result.elapsed
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{Composition, Rules};

    #[test]
    fn test_matches_sequential_path() {
        let rules = Rules::new(6, Composition::counting([1, 12, 2, 11, 3, 10, 4, 9, 5, 8, 6, 7]));
        for seed in 0..40 {
            let deal = Deal::random(rules, seed).unwrap();
            let sequential = solve(&deal, SearchLimits::default());
            let parallel = solve_parallel(&deal, SearchLimits::default(), 4);
            assert_eq!(sequential.outcome, parallel.outcome, "seed {seed}");
        }
    }

    #[test]
    fn test_single_thread_falls_back() {
        let deal = Deal::random(Rules::default(), 11).unwrap();
        let sequential = solve(&deal, SearchLimits::default());
        let fallback = solve_parallel(&deal, SearchLimits::default(), 1);
        assert_eq!(sequential.outcome, fallback.outcome);
        assert_eq!(sequential.states, fallback.states);
    }

    #[test]
    fn test_shared_state_budget() {
        let deal = Deal::random(Rules::default(), 5).unwrap();
        let limits = SearchLimits {
            max_states: Some(2),
            ..Default::default()
        };
        let result = solve_parallel(&deal, limits, 4);
        assert_eq!(
            result.outcome,
            Outcome::UnsolvableWithinBudget(BudgetExceeded::States(2))
        );
    }
}
