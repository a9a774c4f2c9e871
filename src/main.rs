mod utils;

use crate::utils::*;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use thirteen_solver::{
    Board, Composition, Deal, Outcome, Rules, SearchLimits, replay, transcript,
};

use std::{
    io::{IsTerminal, Read, stdin},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Deck {
    /// 36 cards, ace to queen in three suits
    Short,
    /// 48 cards, every king removed
    NoKings,
    /// 52 cards
    Standard,
}

impl Deck {
    fn composition(self) -> Composition {
        match self {
            Deck::Short => Composition::short(),
            Deck::NoKings => Composition::no_kings(),
            Deck::Standard => Composition::standard(),
        }
    }
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Seed for a random deal (a fresh seed is drawn when no deal is given)
    #[arg(short, long, value_name = "SEED")]
    seed: Option<u64>,
    /// Number of stacks (defaults to 9, or to the count found in a deal file)
    #[arg(long, value_name = "NUM")]
    stacks: Option<usize>,
    /// Deck composition the deal must match (a deal file is checked for duplicates only when omitted)
    #[arg(short, long, value_enum, value_name = "DECK")]
    deck: Option<Deck>,
    /// Max states to explore before giving up
    #[arg(short = 'm', long, value_name = "NUM")]
    max_states: Option<u64>,
    /// Wall-clock limit for the search
    #[arg(short, long, value_name = "SECS")]
    time_limit: Option<f64>,
    /// Max dead positions remembered; the oldest are forgotten first
    #[arg(long, value_name = "NUM")]
    memo_capacity: Option<usize>,
    /// Worker threads, one per first move at most (0 uses every core)
    #[arg(short = 'j', long, default_value_t = 1, value_name = "NUM")]
    threads: usize,
    /// Print the deal without solving
    #[arg(short, long)]
    preview: bool,
    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Path to a deal file to solve
    file: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let Cli {
        seed,
        stacks,
        deck,
        max_states,
        time_limit,
        memo_capacity,
        threads,
        preview,
        verbose,
        file,
    } = Cli::parse();
    init_logger(verbose);

    let time_limit = time_limit
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("Invalid time limit")?;
    let limits = SearchLimits {
        max_states,
        time_limit,
        memo_capacity,
    };
    let threads = match threads {
        0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
        n => n,
    };

    let deal = if let Some(file) = file {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read '{}'", file.display()))?;
        load_deal(&content, stacks, deck)?
    } else if seed.is_none() && !stdin().is_terminal() {
        let mut content = String::new();
        stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        load_deal(&content, stacks, deck)?
    } else {
        let seed = seed.unwrap_or_else(rand::random);
        log::info!("Dealing with seed {seed}");
        println!("Seed: {seed}");
        let rules = Rules::new(
            stacks.unwrap_or(thirteen_solver::deal::DEFAULT_STACKS),
            deck.unwrap_or(Deck::Short).composition(),
        );
        Deal::random(rules, seed)?
    };

    if preview {
        println!("{}", deal.board().pretty_print());
        return Ok(ExitCode::SUCCESS);
    }

    if limits.is_bounded() {
        log::info!("Search is bounded; a negative answer will not be definitive");
    }
    let result = do_solve(&deal, limits, threads, verbose == 0);
    if let Outcome::Solved(solution) = &result.outcome {
        let end = replay(&deal, &solution.moves).context("Solution failed to replay")?;
        if !end.is_goal() {
            bail!("Solution left {} cards on the table", end.card_count());
        }
    }
    println!("{}\n", transcript(&deal, &result));
    println!("{}", summary(&result));

    Ok(match result.outcome {
        Outcome::Solved(_) => ExitCode::SUCCESS,
        Outcome::Unsolvable => ExitCode::from(2),
        Outcome::UnsolvableWithinBudget(_) => ExitCode::from(3),
    })
}

fn load_deal(content: &str, stacks: Option<usize>, deck: Option<Deck>) -> Result<Deal> {
    let board = Board::parse(content).context("Failed to parse deal")?;
    let composition = match deck {
        Some(deck) => deck.composition(),
        None => Composition::counting(board.cards().map(|card| card.rank())),
    };
    let rules = Rules::new(stacks.unwrap_or(board.stack_count()), composition);
    let deal = Deal::from_board(rules, board)?;
    Ok(deal)
}
