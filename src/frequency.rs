use std::cmp::Reverse;

use itertools::Itertools;

/// A value as it appears in the historical file; it may fall outside the universe.
pub type Observed = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingSource {
    History,
    /// No usable history, elements in ascending order.
    Identity,
}

/// Universe elements, most frequently drawn first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyRanking {
    elements: Vec<Observed>,
    source: RankingSource,
}

/// Distinct values by descending count; equal counts keep first-seen order.
pub fn rank_by_frequency<D, I>(draws: D) -> Vec<Observed>
where
    D: IntoIterator<Item = I>,
    I: IntoIterator<Item = Observed>,
{
    let values: Vec<Observed> = draws.into_iter().flatten().collect();
    let counts = values.iter().copied().counts();
    let mut ranked: Vec<Observed> = values.into_iter().unique().collect();
    ranked.sort_by_key(|value| Reverse(counts[value]));
    ranked
}

impl FrequencyRanking {
    pub fn identity(universe_size: usize) -> FrequencyRanking {
        FrequencyRanking {
            elements: (1..=universe_size as Observed).collect(),
            source: RankingSource::Identity,
        }
    }

    /// Ranks `history`, or falls back to the identity ordering when it is absent or empty.
    pub fn from_history(history: Option<Vec<Vec<Observed>>>, universe_size: usize) -> FrequencyRanking {
        match history.map(rank_by_frequency) {
            Some(elements) if !elements.is_empty() => FrequencyRanking {
                elements,
                source: RankingSource::History,
            },
            _ => FrequencyRanking::identity(universe_size),
        }
    }

    pub fn elements(&self) -> &[Observed] {
        &self.elements
    }

    pub fn source(&self) -> RankingSource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_frequent_first() {
        let history = vec![vec![3, 1, 2], vec![3, 2, 5], vec![3, 4, 2]];
        assert_eq!(rank_by_frequency(history), vec![3, 2, 1, 5, 4]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let history = vec![vec![9, 4], vec![7, 4], vec![9, 7, 1]];
        // 9, 4 and 7 appear twice each, in that first-seen order.
        assert_eq!(rank_by_frequency(history), vec![9, 4, 7, 1]);
    }

    #[test]
    fn ranking_is_reproducible() {
        let history = vec![vec![5, 6, 7], vec![7, 8, 5], vec![1, 2, 3]];
        assert_eq!(rank_by_frequency(history.clone()), rank_by_frequency(history));
    }

    #[test]
    fn missing_history_falls_back_to_identity() {
        let ranking = FrequencyRanking::from_history(None, 6);
        assert_eq!(ranking.elements(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(ranking.source(), RankingSource::Identity);
    }

    #[test]
    fn empty_history_falls_back_to_identity() {
        let ranking = FrequencyRanking::from_history(Some(vec![]), 4);
        assert_eq!(ranking.elements(), &[1, 2, 3, 4]);
        let ranking = FrequencyRanking::from_history(Some(vec![vec![]]), 3);
        assert_eq!(ranking.source(), RankingSource::Identity);
        assert_eq!(ranking.elements().len(), 3);
    }

    #[test]
    fn partial_history_is_kept_as_is() {
        let ranking = FrequencyRanking::from_history(Some(vec![vec![2, 5], vec![5]]), 25);
        assert_eq!(ranking.elements(), &[5, 2]);
        assert_eq!(ranking.source(), RankingSource::History);
    }
}
