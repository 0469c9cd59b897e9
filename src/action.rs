use thiserror::Error;

use crate::model::config::ConfigError;
use crate::model::entity::{Element, Ticket};

pub type Iteration = u64;

/// What a single greedy iteration did with its candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Accepted { ticket: Ticket, covered: u64 },
    Rejected { ticket: Ticket },
}

impl Step {
    pub fn ticket(&self) -> &Ticket {
        match self {
            Step::Accepted { ticket, .. } | Step::Rejected { ticket } => ticket,
        }
    }

    pub fn covered(&self) -> u64 {
        match self {
            Step::Accepted { covered, .. } => *covered,
            Step::Rejected { .. } => 0,
        }
    }
}

/// Checkpoint handed to a progress observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub iteration: Iteration,
    pub remaining: u64,
    pub target: u64,
    pub tickets: usize,
}

impl Progress {
    pub fn coverage(&self) -> f64 {
        coverage(self.remaining, self.target)
    }
}

fn coverage(remaining: u64, target: u64) -> f64 {
    if target == 0 {
        1.0
    } else {
        1.0 - remaining as f64 / target as f64
    }
}

/// Accepted tickets of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Cover {
    pub tickets: Vec<Ticket>,
    pub iterations: Iteration,
    pub target: u64,
    pub remaining: u64,
}

impl Cover {
    /// Fraction of the target set covered by the tickets.
    pub fn coverage(&self) -> f64 {
        coverage(self.remaining, self.target)
    }

    pub fn sorted_tickets(&self) -> Vec<Vec<Element>> {
        self.tickets.iter().map(Ticket::elements).collect()
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoverError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("target set was built for C({found_universe}, {found_subset}) but the configuration asks for C({universe_size}, {subset_size})")]
    SpaceMismatch {
        universe_size: usize,
        subset_size: usize,
        found_universe: usize,
        found_subset: usize,
    },
    #[error(
        "no candidate made progress for {stall_limit} consecutive iterations (iteration {}, {} draws uncovered, {} tickets kept)",
        .cover.iterations, .cover.remaining, .cover.tickets.len()
    )]
    Stalled { stall_limit: u64, cover: Cover },
    #[error(
        "coverage target not reached within {} iterations ({} draws uncovered, {} tickets kept)",
        .cover.iterations, .cover.remaining, .cover.tickets.len()
    )]
    IterationBudgetExhausted { cover: Cover },
}

impl CoverError {
    /// Tickets accepted before the run gave up, if it got that far.
    pub fn partial_cover(&self) -> Option<&Cover> {
        match self {
            CoverError::Stalled { cover, .. } | CoverError::IterationBudgetExhausted { cover } => Some(cover),
            CoverError::Config(_) | CoverError::SpaceMismatch { .. } => None,
        }
    }
}
