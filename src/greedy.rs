use rand::rngs::SmallRng;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::action::{Cover, CoverError, Iteration, Progress, Step};
use crate::cache::RemainingCache;
use crate::frequency::FrequencyRanking;
use crate::model::config::CoverConfig;
use crate::model::entity::{bit, Element, Mask, Ticket};

pub trait ProgressObserver {
    fn on_progress(&mut self, progress: &Progress);
}

impl<F: FnMut(&Progress)> ProgressObserver for F {
    fn on_progress(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Reports each checkpoint through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, progress: &Progress) {
        info!(
            iteration = progress.iteration,
            remaining = progress.remaining,
            tickets = progress.tickets,
            "still covering"
        );
    }
}

#[derive(Debug, Clone)]
struct Params {
    target_coverage: f64,
    max_iterations: Iteration,
    stall_limit: u64,
    progress_interval: Iteration,
}

impl From<&CoverConfig> for Params {
    fn from(config: &CoverConfig) -> Self {
        Params {
            target_coverage: config.target_coverage,
            max_iterations: config.max_iterations,
            stall_limit: config.stall_limit,
            progress_interval: config.progress_interval,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    tickets: Vec<Ticket>,
    n_iterations: Iteration,
    stall_streak: u64,
}

/// Builds candidate tickets from the hottest elements, topped up at random.
///
/// Each rejected candidate swaps one more ranked element for a random one. Once
/// every slot is random, candidates are grown from a random uncovered draw instead.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    ranked: Vec<Element>,
    universe_size: usize,
    ticket_size: usize,
    depth: usize,
    rng: SmallRng,
}

impl CandidateGenerator {
    pub fn new(ranking: &FrequencyRanking, universe_size: usize, ticket_size: usize, rng: SmallRng) -> Self {
        assert!(ticket_size <= universe_size);
        let mut seen: Mask = 0;
        let mut ranked = Vec::with_capacity(universe_size);
        let mut skipped = 0usize;
        for &value in ranking.elements() {
            match Element::try_from(value) {
                Ok(element) if (1..=universe_size).contains(&(element as usize)) => {
                    if seen & bit(element) == 0 {
                        seen |= bit(element);
                        ranked.push(element);
                    }
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, universe_size, "ignoring ranked values outside the universe");
        }
        CandidateGenerator { ranked, universe_size, ticket_size, depth: 0, rng }
    }

    /// Ranked elements usable in a ticket, in rank order.
    pub fn ranked(&self) -> &[Element] {
        &self.ranked
    }

    /// How many ranked slots are currently replaced by random elements.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether no ranked element is left in the candidate.
    pub fn is_saturated(&self) -> bool {
        self.depth >= self.ticket_size
    }

    pub fn next(&mut self) -> Ticket {
        let keep = self.ticket_size.saturating_sub(self.depth).min(self.ranked.len());
        let mask = self.ranked[..keep].iter().fold(0, |mask, &element| mask | bit(element));
        self.fill(mask, keep)
    }

    /// A random uncovered draw topped up at random, so it covers at least that draw.
    pub fn anchored(&mut self, remaining: &RemainingCache) -> Option<Ticket> {
        if remaining.len() == 0 {
            return None;
        }
        let rank = remaining.nth_rank(self.rng.gen_range(0..remaining.len()))?;
        let draw = remaining.space().unrank(rank);
        Some(self.fill(draw.mask, draw.len()))
    }

    fn fill(&mut self, mut mask: Mask, mut len: usize) -> Ticket {
        while len < self.ticket_size {
            let element = bit(self.rng.gen_range(1..=self.universe_size as Element));
            if mask & element == 0 {
                mask |= element;
                len += 1;
            }
        }
        Ticket { mask }
    }

    pub fn perturb(&mut self) {
        if self.depth < self.ticket_size {
            self.depth += 1;
            debug!(depth = self.depth, "candidate made no progress, randomizing one more slot");
        }
    }
}

/// Draws that must be covered to reach `coverage` of `target`.
fn required_covered(target: u64, coverage: f64) -> u64 {
    let exact = coverage * target as f64;
    // 0.9 * 20 evaluates a hair above 18.
    ((exact - exact * 1e-12).ceil() as u64).min(target)
}

pub struct GreedyCoverEngine {
    params: Params,
    required: u64,
    remaining: RemainingCache,
    generator: CandidateGenerator,
    state: State,
}

impl GreedyCoverEngine {
    pub fn new(
        config: &CoverConfig,
        ranking: &FrequencyRanking,
        remaining: RemainingCache,
        rng: SmallRng,
    ) -> Result<GreedyCoverEngine, CoverError> {
        config.validate()?;
        let space = remaining.space();
        if space.universe_size() != config.universe_size || space.subset_size() != config.subset_size {
            return Err(CoverError::SpaceMismatch {
                universe_size: config.universe_size,
                subset_size: config.subset_size,
                found_universe: space.universe_size(),
                found_subset: space.subset_size(),
            });
        }
        let generator = CandidateGenerator::new(ranking, config.universe_size, config.ticket_size, rng);
        let required = required_covered(remaining.target_len(), config.target_coverage);
        Ok(GreedyCoverEngine {
            params: Params::from(config),
            required,
            remaining,
            generator,
            state: State::default(),
        })
    }

    pub fn remaining(&self) -> &RemainingCache {
        &self.remaining
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.state.tickets
    }

    pub fn iterations(&self) -> Iteration {
        self.state.n_iterations
    }

    /// Whether at least `target_coverage` of the target set is covered.
    pub fn is_done(&self) -> bool {
        self.remaining.target_len() - self.remaining.len() >= self.required
    }

    pub fn progress(&self) -> Progress {
        Progress {
            iteration: self.state.n_iterations,
            remaining: self.remaining.len(),
            target: self.remaining.target_len(),
            tickets: self.state.tickets.len(),
        }
    }

    /// One iteration: build a candidate, keep it if it covers anything new.
    pub fn step(&mut self) -> Step {
        self.state.n_iterations += 1;
        let ticket = if self.generator.is_saturated() {
            self.generator
                .anchored(&self.remaining)
                .unwrap_or_else(|| self.generator.next())
        } else {
            self.generator.next()
        };
        let covered = self.remaining.cover(&ticket);
        if covered > 0 {
            self.state.tickets.push(ticket);
            self.state.stall_streak = 0;
            Step::Accepted { ticket, covered }
        } else {
            self.state.stall_streak += 1;
            self.generator.perturb();
            Step::Rejected { ticket }
        }
    }

    pub fn run<O: ProgressObserver + ?Sized>(mut self, observer: &mut O) -> Result<Cover, CoverError> {
        while !self.is_done() {
            if self.state.n_iterations >= self.params.max_iterations {
                return Err(CoverError::IterationBudgetExhausted { cover: self.into_cover() });
            }
            self.step();
            if self.state.stall_streak >= self.params.stall_limit {
                let stall_limit = self.params.stall_limit;
                return Err(CoverError::Stalled { stall_limit, cover: self.into_cover() });
            }
            if self.state.n_iterations % self.params.progress_interval == 0 {
                observer.on_progress(&self.progress());
            }
        }
        info!(
            tickets = self.state.tickets.len(),
            iterations = self.state.n_iterations,
            remaining = self.remaining.len(),
            "coverage target reached"
        );
        Ok(self.into_cover())
    }

    fn into_cover(self) -> Cover {
        Cover {
            tickets: self.state.tickets,
            iterations: self.state.n_iterations,
            target: self.remaining.target_len(),
            remaining: self.remaining.len(),
        }
    }
}
