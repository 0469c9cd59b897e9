//! Greedy lottery wheeling: pick a small set of tickets that together contain a
//! target fraction of every possible draw.

pub mod action;
pub mod cache;
pub mod frequency;
pub mod greedy;
pub mod history;
pub mod model;
pub mod report;
pub mod universe;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::info;

use crate::action::{Cover, CoverError};
use crate::frequency::{FrequencyRanking, RankingSource};
use crate::greedy::{GreedyCoverEngine, ProgressObserver};
use crate::history::HistoryError;
use crate::model::config::{ConfigError, CoverConfig};
use crate::report::{Report, ReportError};
use crate::universe::{DrawSpace, UniverseBuilder};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Cover(#[from] CoverError),
    /// The tickets were computed; only saving them failed.
    #[error("{} tickets computed but not saved: {source}", .cover.tickets.len())]
    Persist {
        cover: Cover,
        report: Report,
        #[source]
        source: ReportError,
    },
}

impl RunError {
    /// 2 for problems with the inputs, 1 for failures while covering or saving.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) | RunError::History(_) | RunError::Cover(CoverError::Config(_)) => 2,
            RunError::Cover(_) | RunError::Persist { .. } => 1,
        }
    }

    /// Tickets computed before the failure, none of them saved.
    pub fn partial_cover(&self) -> Option<&Cover> {
        match self {
            RunError::Cover(err) => err.partial_cover(),
            RunError::Persist { cover, .. } => Some(cover),
            RunError::Config(_) | RunError::History(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub seed: u64,
    pub ranking: FrequencyRanking,
    pub cover: Cover,
    pub report: Report,
}

/// The given seed, or a fresh one from entropy.
pub fn seeded_rng(seed: Option<u64>) -> (SmallRng, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    (SmallRng::seed_from_u64(seed), seed)
}

/// Builds the target set and covers it, without touching the filesystem.
pub fn solve<O: ProgressObserver + ?Sized>(
    config: &CoverConfig,
    ranking: &FrequencyRanking,
    mut rng: SmallRng,
    observer: &mut O,
) -> Result<Cover, CoverError> {
    config.validate()?;
    let space = DrawSpace::new(config.universe_size, config.subset_size);
    let target = UniverseBuilder::new(space, config.ignore_percent).build(&mut rng);
    GreedyCoverEngine::new(config, ranking, target, rng)?.run(observer)
}

/// Loads the history, covers the draw space and saves the tickets.
pub fn run<O: ProgressObserver + ?Sized>(config: &CoverConfig, observer: &mut O) -> Result<Outcome, RunError> {
    config.validate()?;
    let history = history::load_history(&config.history_path)?;
    let ranking = FrequencyRanking::from_history(history, config.universe_size);
    let hottest: Vec<_> = ranking.elements().iter().take(10).collect();
    match ranking.source() {
        RankingSource::History => info!(?hottest, "ranked elements by frequency"),
        RankingSource::Identity => info!(?hottest, "no history, using ascending order"),
    }

    let (rng, seed) = seeded_rng(config.seed);
    info!(seed, "covering");
    let cover = solve(config, &ranking, rng, observer)?;
    let report = Report::new(cover.tickets.len(), config.ticket_cost);
    info!(tickets = report.tickets, total_cost = report.total_cost, "cover complete");

    if let Err(source) = report::write_tickets(&config.output_path, &cover.tickets) {
        return Err(RunError::Persist { cover, report, source });
    }
    Ok(Outcome { seed, ranking, cover, report })
}
