use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use wheel_cover::greedy::LogProgress;
use wheel_cover::model::config::*;

#[derive(Parser, Debug)]
#[command(name = "wheel-cover")]
#[command(about = "Pick lottery tickets that together cover a fraction of every possible draw", long_about = None)]
struct Cli {
    /// Numbers available in the lottery, 1..=N.
    #[arg(long, default_value_t = DEFAULT_UNIVERSE_SIZE)]
    universe_size: usize,

    /// Numbers in one draw.
    #[arg(long, default_value_t = DEFAULT_SUBSET_SIZE)]
    draw_size: usize,

    /// Numbers on one ticket; must exceed the draw size.
    #[arg(long, default_value_t = DEFAULT_TICKET_SIZE)]
    ticket_size: usize,

    /// Fraction of the sampled draws the tickets must cover, in (0, 1].
    #[arg(long, default_value_t = DEFAULT_TARGET_COVERAGE)]
    coverage: f64,

    /// Price of a single ticket.
    #[arg(long, default_value_t = DEFAULT_TICKET_COST)]
    ticket_cost: f64,

    /// Fraction of draws dropped at random before covering, in [0, 1).
    #[arg(long, default_value_t = DEFAULT_IGNORE_PERCENT)]
    ignore: f64,

    /// Seed for the discard sample and random candidates.
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after this many iterations.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: u64,

    /// Give up after this many consecutive candidates that cover nothing new.
    #[arg(long, default_value_t = DEFAULT_STALL_LIMIT)]
    stall_limit: u64,

    /// Log progress every this many iterations.
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: u64,

    /// Past draws, one per line, `;`-separated.
    #[arg(long, default_value = DEFAULT_HISTORY_PATH)]
    history: PathBuf,

    /// Where to write the tickets.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
}

impl From<Cli> for CoverConfig {
    fn from(cli: Cli) -> Self {
        CoverConfig {
            universe_size: cli.universe_size,
            subset_size: cli.draw_size,
            ticket_size: cli.ticket_size,
            target_coverage: cli.coverage,
            ticket_cost: cli.ticket_cost,
            ignore_percent: cli.ignore,
            seed: cli.seed,
            max_iterations: cli.max_iterations,
            stall_limit: cli.stall_limit,
            progress_interval: cli.progress_interval,
            history_path: cli.history,
            output_path: cli.output,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = CoverConfig::from(Cli::parse());
    match wheel_cover::run(&config, &mut LogProgress) {
        Ok(outcome) => {
            println!("{}", outcome.report);
            println!("saved to {}", config.output_path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            if let Some(cover) = err.partial_cover() {
                warn!(tickets = cover.tickets.len(), "no tickets were saved");
            }
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
