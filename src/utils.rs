use log::{LevelFilter, Log, Metadata, Record};
use thirteen_solver::{Deal, Outcome, SearchLimits, SolveResult, solve, solve_parallel};

use std::{
    io::{IsTerminal, Write, stderr},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

pub fn do_solve(deal: &Deal, limits: SearchLimits, threads: usize, spinner: bool) -> SolveResult {
    let result = with_spinner("Solving the deal...", spinner, || {
        if threads > 1 {
            solve_parallel(deal, limits, threads)
        } else {
            solve(deal, limits)
        }
    });
    log::info!(
        "States: {}, Memo hits: {}, Memo size: {}",
        result.states,
        result.memo_hits,
        result.memo_size
    );
    result
}

pub fn summary(result: &SolveResult) -> String {
    let verdict = match &result.outcome {
        Outcome::Solved(solution) => format!("Solved in {} Moves", solution.len()),
        Outcome::Unsolvable => "Unsolvable".to_string(),
        Outcome::UnsolvableWithinBudget(_) => "Unsolved within budget".to_string(),
    };
    format!(
        "{verdict}, Time: {}, States: {}",
        format_elapsed(result.elapsed),
        result.states
    )
}

const TICK: Duration = Duration::from_millis(100);
const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Runs `f` on a worker thread while the calling thread redraws a progress
/// line on stderr with the time spent so far.
fn with_spinner<T, F>(message: &str, enabled: bool, f: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    if !enabled || !stderr().is_terminal() {
        return f();
    }
    let started = Instant::now();
    thread::scope(|scope| {
        let (done_tx, done_rx) = mpsc::channel();
        let worker = scope.spawn(move || {
            let result = f();
            let _ = done_tx.send(());
            result
        });

        let mut frame = 0;
        // Disconnected means the worker panicked; join below reports it.
        while let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(TICK) {
            let spinner = FRAMES[frame % FRAMES.len()];
            let _ = write!(
                stderr(),
                "\r\x1b[?25l{spinner} {message} {}",
                format_elapsed(started.elapsed())
            );
            frame += 1;
        }
        if frame > 0 {
            let _ = write!(stderr(), "\r\x1b[2K\x1b[?25h");
        }

        match worker.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}

/// `850ms`, `12.345s` or `4m 05s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    match secs {
        0 => format!("{}ms", elapsed.subsec_millis()),
        1..90 => format!("{:.3}s", elapsed.as_secs_f64()),
        _ => format!("{}m {:02}s", secs / 60, secs % 60),
    }
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

/// Routes library logs to stderr: warnings by default, one level more per `-v`.
pub fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
