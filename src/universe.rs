//! The space of all draws and the sampled target set the engine has to cover.
//!
//! Draws are addressed by their colex rank in the combinatorial number system:
//! for `c_1 < c_2 < ... < c_k` the rank is `C(c_1 - 1, 1) + ... + C(c_k - 1, k)`,
//! which maps the `C(n, k)` draws one-to-one onto `0..C(n, k)`.

use itertools::Itertools;
use rand::seq::index;
use rand::Rng;
use tracing::info;

use crate::cache::RemainingCache;
use crate::model::config::MAX_UNIVERSE_SIZE;
use crate::model::entity::{Draw, Element};

pub type Rank = u64;

/// `C(n, k)`, exact for every `n <= 64`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u128, |acc, i| acc * (n - i) as u128 / (i + 1) as u128) as u64
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawSpace {
    universe_size: usize,
    subset_size: usize,
    pascal: Vec<Vec<u64>>,
}

impl DrawSpace {
    pub fn new(universe_size: usize, subset_size: usize) -> DrawSpace {
        assert!(universe_size <= MAX_UNIVERSE_SIZE);
        assert!(subset_size <= universe_size);
        let mut pascal = vec![vec![0u64; subset_size + 1]; universe_size + 1];
        for n in 0..=universe_size {
            pascal[n][0] = 1;
            for k in 1..=subset_size.min(n) {
                pascal[n][k] = pascal[n - 1][k - 1] + pascal[n - 1][k];
            }
        }
        DrawSpace { universe_size, subset_size, pascal }
    }

    pub fn universe_size(&self) -> usize {
        self.universe_size
    }

    pub fn subset_size(&self) -> usize {
        self.subset_size
    }

    /// Number of draws, `C(universe_size, subset_size)`.
    pub fn len(&self) -> u64 {
        self.pascal[self.universe_size][self.subset_size]
    }

    pub(crate) fn choose(&self, n: usize, k: usize) -> u64 {
        self.pascal
            .get(n)
            .and_then(|row| row.get(k))
            .copied()
            .unwrap_or_else(|| binomial(n, k))
    }

    /// Every draw, in lexicographic order of its sorted elements.
    pub fn iter(&self) -> impl Iterator<Item = Draw> {
        (1..=self.universe_size as Element)
            .combinations(self.subset_size)
            .map(|elements| elements.into_iter().collect())
    }

    pub fn rank(&self, draw: &Draw) -> Rank {
        debug_assert_eq!(draw.len(), self.subset_size);
        draw.elements()
            .into_iter()
            .enumerate()
            .map(|(i, element)| self.choose(element as usize - 1, i + 1))
            .sum()
    }

    pub fn unrank(&self, rank: Rank) -> Draw {
        debug_assert!(rank < self.len());
        let mut rest = rank;
        let mut bound = self.universe_size;
        let mut elements = Vec::with_capacity(self.subset_size);
        for i in (1..=self.subset_size).rev() {
            let mut value = bound - 1;
            while self.choose(value, i) > rest {
                value -= 1;
            }
            rest -= self.choose(value, i);
            elements.push((value + 1) as Element);
            bound = value;
        }
        elements.into_iter().collect()
    }
}

/// Builds the target set: the full draw space minus a uniformly sampled discard.
#[derive(Debug, Clone)]
pub struct UniverseBuilder {
    space: DrawSpace,
    ignore_percent: f64,
}

impl UniverseBuilder {
    pub fn new(space: DrawSpace, ignore_percent: f64) -> UniverseBuilder {
        UniverseBuilder { space, ignore_percent }
    }

    /// `floor(ignore_percent * total)`.
    pub fn discard_count(&self) -> u64 {
        (self.space.len() as f64 * self.ignore_percent).floor() as u64
    }

    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> RemainingCache {
        let total = self.space.len();
        let discard = self.discard_count().min(total);
        let excluded: Vec<Rank> = if discard > 0 {
            index::sample(rng, total as usize, discard as usize)
                .into_iter()
                .map(|i| i as Rank)
                .collect()
        } else {
            Vec::new()
        };
        let cache = RemainingCache::without(self.space.clone(), excluded);
        info!(total, discard, target = cache.target_len(), "built target set");
        cache
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(6, 3), 20);
        assert_eq!(binomial(25, 15), 3_268_760);
        assert_eq!(binomial(60, 6), 50_063_860);
        assert_eq!(binomial(64, 32), 1_832_624_140_942_590_534);
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(binomial(5, 0), 1);
    }

    #[test]
    fn pascal_table_matches_binomial() {
        let space = DrawSpace::new(25, 15);
        assert_eq!(space.len(), binomial(25, 15));
        for n in 0..=25 {
            for k in 0..=15 {
                assert_eq!(space.choose(n, k), binomial(n, k), "C({n}, {k})");
            }
        }
    }

    #[test]
    fn enumerates_every_draw_once() {
        let space = DrawSpace::new(6, 3);
        let draws: Vec<Draw> = space.iter().collect();
        assert_eq!(draws.len(), 20);
        assert_eq!(draws.iter().collect::<HashSet<_>>().len(), 20);
        assert!(draws.iter().all(|draw| draw.len() == 3));
        assert!(draws.iter().flat_map(Draw::elements).all(|e| (1..=6).contains(&e)));
    }

    #[test]
    fn rank_is_a_bijection() {
        let space = DrawSpace::new(9, 4);
        let mut ranks: Vec<Rank> = space.iter().map(|draw| space.rank(&draw)).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (0..space.len()).collect::<Vec<_>>());
        for draw in space.iter() {
            assert_eq!(space.unrank(space.rank(&draw)), draw);
        }
    }

    #[test]
    fn lowest_draw_has_rank_zero() {
        let space = DrawSpace::new(25, 15);
        let lowest: Draw = (1..=15).collect();
        let highest: Draw = (11..=25).collect();
        assert_eq!(space.rank(&lowest), 0);
        assert_eq!(space.rank(&highest), space.len() - 1);
        assert_eq!(space.unrank(space.len() - 1), highest);
    }

    #[test]
    fn discard_is_floor_of_fraction() {
        let builder = UniverseBuilder::new(DrawSpace::new(25, 15), 0.01);
        assert_eq!(builder.discard_count(), 32_687);
        let builder = UniverseBuilder::new(DrawSpace::new(6, 3), 0.0);
        assert_eq!(builder.discard_count(), 0);
    }

    #[test]
    fn target_set_excludes_exactly_the_discard() {
        let builder = UniverseBuilder::new(DrawSpace::new(10, 4), 0.25);
        let mut rng = SmallRng::seed_from_u64(3);
        let target = builder.build(&mut rng);
        assert_eq!(target.target_len(), 210 - 52);
        assert_eq!(target.len(), target.target_len());
        let members: HashSet<Draw> = target.iter().collect();
        assert_eq!(members.len() as u64, target.len());
    }

    #[test]
    fn seeded_discard_is_reproducible() {
        let builder = UniverseBuilder::new(DrawSpace::new(10, 4), 0.5);
        let a: Vec<Draw> = builder.build(&mut SmallRng::seed_from_u64(11)).iter().collect();
        let b: Vec<Draw> = builder.build(&mut SmallRng::seed_from_u64(11)).iter().collect();
        assert_eq!(a, b);
    }
}
