pub mod entity {
    use std::fmt;

    use itertools::Itertools;

    /// A numbered ball, `1..=universe_size`.
    pub type Element = u8;
    /// Bit `e - 1` is set for every element `e` of a draw or ticket.
    pub type Mask = u64;

    pub fn bit(element: Element) -> Mask {
        debug_assert!((1..=64).contains(&element));
        1 << (element - 1)
    }

    fn elements_of(mask: Mask) -> Vec<Element> {
        (0..64u8)
            .filter(|offset| mask >> offset & 1 == 1)
            .map(|offset| offset + 1)
            .collect()
    }

    fn mask_of(elements: impl IntoIterator<Item = Element>) -> Mask {
        elements.into_iter().fold(0, |mask, element| mask | bit(element))
    }

    /// One possible outcome, `subset_size` distinct elements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Draw {
        pub mask: Mask,
    }

    impl Draw {
        pub fn len(&self) -> usize {
            self.mask.count_ones() as usize
        }

        pub fn elements(&self) -> Vec<Element> {
            elements_of(self.mask)
        }
    }

    impl FromIterator<Element> for Draw {
        fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
            Draw { mask: mask_of(iter) }
        }
    }

    /// A purchased bet of `ticket_size` distinct elements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Ticket {
        pub mask: Mask,
    }

    impl Ticket {
        pub fn len(&self) -> usize {
            self.mask.count_ones() as usize
        }

        /// Ascending element list.
        pub fn elements(&self) -> Vec<Element> {
            elements_of(self.mask)
        }

        pub fn contains(&self, element: Element) -> bool {
            self.mask & bit(element) != 0
        }

        pub fn covers(&self, draw: &Draw) -> bool {
            draw.mask & !self.mask == 0
        }
    }

    impl FromIterator<Element> for Ticket {
        fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
            Ticket { mask: mask_of(iter) }
        }
    }

    impl fmt::Display for Ticket {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.elements().iter().join(";"))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn ticket_covers_its_subsets_only() {
            let ticket: Ticket = [4, 1, 3, 2].into_iter().collect();
            let inside: Draw = [1, 2, 4].into_iter().collect();
            let outside: Draw = [1, 2, 5].into_iter().collect();
            assert!(ticket.covers(&inside));
            assert!(!ticket.covers(&outside));
            assert_eq!(ticket.len(), 4);
            assert!(ticket.contains(3) && !ticket.contains(5));
        }

        #[test]
        fn elements_are_ascending_and_deduplicated() {
            let draw: Draw = [64, 9, 1, 9].into_iter().collect();
            assert_eq!(draw.elements(), vec![1, 9, 64]);
            assert_eq!(draw.len(), 3);
        }

        #[test]
        fn ticket_displays_as_a_row() {
            let ticket: Ticket = [16, 2, 25, 7].into_iter().collect();
            assert_eq!(ticket.to_string(), "2;7;16;25");
        }
    }
}


pub mod config {
    use std::path::PathBuf;
    use thiserror::Error;

    use crate::universe::binomial;

    pub const MAX_UNIVERSE_SIZE: usize = 64;
    /// Upper bound on `C(universe_size, subset_size)`; the remaining set keeps one bit per draw.
    pub const MAX_DRAW_SPACE: u64 = 1 << 30;

    pub const DEFAULT_UNIVERSE_SIZE: usize = 25;
    pub const DEFAULT_SUBSET_SIZE: usize = 15;
    pub const DEFAULT_TICKET_SIZE: usize = 16;
    pub const DEFAULT_TARGET_COVERAGE: f64 = 0.95;
    pub const DEFAULT_TICKET_COST: f64 = 56.0;
    pub const DEFAULT_IGNORE_PERCENT: f64 = 0.01;
    pub const DEFAULT_MAX_ITERATIONS: u64 = 10_000_000;
    pub const DEFAULT_STALL_LIMIT: u64 = 10_000;
    pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;
    pub const DEFAULT_HISTORY_PATH: &str = "historico.csv";
    pub const DEFAULT_OUTPUT_PATH: &str = "bilhetes16_otimizados.csv";

    #[derive(Debug, Clone, PartialEq)]
    pub struct CoverConfig {
        pub universe_size: usize,
        pub subset_size: usize,
        pub ticket_size: usize,
        pub target_coverage: f64,
        pub ticket_cost: f64,
        pub ignore_percent: f64,
        pub seed: Option<u64>,
        pub max_iterations: u64,
        pub stall_limit: u64,
        pub progress_interval: u64,
        pub history_path: PathBuf,
        pub output_path: PathBuf,
    }

    impl Default for CoverConfig {
        fn default() -> Self {
            CoverConfig {
                universe_size: DEFAULT_UNIVERSE_SIZE,
                subset_size: DEFAULT_SUBSET_SIZE,
                ticket_size: DEFAULT_TICKET_SIZE,
                target_coverage: DEFAULT_TARGET_COVERAGE,
                ticket_cost: DEFAULT_TICKET_COST,
                ignore_percent: DEFAULT_IGNORE_PERCENT,
                seed: None,
                max_iterations: DEFAULT_MAX_ITERATIONS,
                stall_limit: DEFAULT_STALL_LIMIT,
                progress_interval: DEFAULT_PROGRESS_INTERVAL,
                history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
                output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            }
        }
    }

    #[derive(Debug, Clone, Error, PartialEq)]
    pub enum ConfigError {
        #[error("universe size must be in 1..={max}, got {0}", max = MAX_UNIVERSE_SIZE)]
        UniverseSize(usize),
        #[error("draw size must be in 1..={universe_size}, got {subset_size}")]
        SubsetSize { subset_size: usize, universe_size: usize },
        #[error("ticket size must exceed draw size {subset_size} and not exceed universe size {universe_size}, got {ticket_size}")]
        TicketSize { ticket_size: usize, subset_size: usize, universe_size: usize },
        #[error("target coverage must be in (0, 1], got {0}")]
        TargetCoverage(f64),
        #[error("ignore percent must be in [0, 1), got {0}")]
        IgnorePercent(f64),
        #[error("ticket cost must be a non-negative number, got {0}")]
        TicketCost(f64),
        #[error("{name} must be at least 1")]
        ZeroLimit { name: &'static str },
        #[error("draw space C({universe_size}, {subset_size}) = {draws} exceeds {max}", max = MAX_DRAW_SPACE)]
        DrawSpaceTooLarge { universe_size: usize, subset_size: usize, draws: u64 },
    }

    impl CoverConfig {
        pub fn validate(&self) -> Result<(), ConfigError> {
            let (n, k, t) = (self.universe_size, self.subset_size, self.ticket_size);
            if n == 0 || n > MAX_UNIVERSE_SIZE {
                return Err(ConfigError::UniverseSize(n));
            }
            if k == 0 || k > n {
                return Err(ConfigError::SubsetSize { subset_size: k, universe_size: n });
            }
            if t <= k || t > n {
                return Err(ConfigError::TicketSize { ticket_size: t, subset_size: k, universe_size: n });
            }
            // NaN fails both range checks below.
            if !(self.target_coverage > 0.0 && self.target_coverage <= 1.0) {
                return Err(ConfigError::TargetCoverage(self.target_coverage));
            }
            if !(self.ignore_percent >= 0.0 && self.ignore_percent < 1.0) {
                return Err(ConfigError::IgnorePercent(self.ignore_percent));
            }
            if !(self.ticket_cost.is_finite() && self.ticket_cost >= 0.0) {
                return Err(ConfigError::TicketCost(self.ticket_cost));
            }
            for (name, value) in [
                ("max iterations", self.max_iterations),
                ("stall limit", self.stall_limit),
                ("progress interval", self.progress_interval),
            ] {
                if value == 0 {
                    return Err(ConfigError::ZeroLimit { name });
                }
            }
            let draws = binomial(n, k);
            if draws > MAX_DRAW_SPACE {
                return Err(ConfigError::DrawSpaceTooLarge { universe_size: n, subset_size: k, draws });
            }
            Ok(())
        }
    }

}
