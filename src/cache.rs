use itertools::Itertools;

use crate::model::entity::{Draw, Ticket};
use crate::universe::{DrawSpace, Rank};

/// Set bit positions of one word, lowest first.
struct SetBits(u64);

impl Iterator for SetBits {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.0 == 0 {
            return None;
        }
        let offset = self.0.trailing_zeros() as u64;
        self.0 &= self.0 - 1;
        Some(offset)
    }
}

/// Draws of the target set not yet covered by an accepted ticket, one bit per draw rank.
///
/// The set only ever shrinks: `cover` clears bits and nothing sets them again.
#[derive(Debug, Clone)]
pub struct RemainingCache {
    space: DrawSpace,
    words: Vec<u64>,
    target: u64,
    remaining: u64,
}

impl RemainingCache {
    /// Every draw of `space` except the `excluded` ranks.
    pub fn without(space: DrawSpace, excluded: impl IntoIterator<Item = Rank>) -> RemainingCache {
        let total = space.len();
        let mut words = vec![u64::MAX; total.div_ceil(64) as usize];
        if total % 64 != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << (total % 64)) - 1;
            }
        }
        let mut cache = RemainingCache { space, words, target: total, remaining: total };
        for rank in excluded {
            cache.take(rank);
        }
        cache.target = cache.remaining;
        cache
    }

    pub fn full(space: DrawSpace) -> RemainingCache {
        RemainingCache::without(space, std::iter::empty())
    }

    pub fn space(&self) -> &DrawSpace {
        &self.space
    }

    /// Size of the target set, fixed once built.
    pub fn target_len(&self) -> u64 {
        self.target
    }

    /// Draws still uncovered.
    pub fn len(&self) -> u64 {
        self.remaining
    }

    pub fn contains(&self, draw: &Draw) -> bool {
        draw.len() == self.space.subset_size() && self.contains_rank(self.space.rank(draw))
    }

    fn contains_rank(&self, rank: Rank) -> bool {
        self.words
            .get((rank / 64) as usize)
            .map_or(false, |word| word >> (rank % 64) & 1 == 1)
    }

    fn take(&mut self, rank: Rank) -> bool {
        let Some(word) = self.words.get_mut((rank / 64) as usize) else {
            return false;
        };
        let mask = 1u64 << (rank % 64);
        if *word & mask == 0 {
            return false;
        }
        *word &= !mask;
        self.remaining -= 1;
        true
    }

    pub fn ranks(&self) -> impl Iterator<Item = Rank> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(index, &word)| SetBits(word).map(move |offset| index as u64 * 64 + offset))
    }

    /// Rank of the `n`-th uncovered draw in rank order.
    pub(crate) fn nth_rank(&self, n: u64) -> Option<Rank> {
        let mut rest = n;
        for (index, &word) in self.words.iter().enumerate() {
            let live = word.count_ones() as u64;
            if rest < live {
                return SetBits(word).nth(rest as usize).map(|offset| index as u64 * 64 + offset);
            }
            rest -= live;
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = Draw> + '_ {
        self.ranks().map(|rank| self.space.unrank(rank))
    }

    /// Ranks of the uncovered draws contained in `ticket`.
    ///
    /// Lists the ticket's sub-draws when there are fewer of them than uncovered
    /// draws, otherwise scans the uncovered draws.
    pub fn covered_ranks(&self, ticket: &Ticket) -> Vec<Rank> {
        let subset_size = self.space.subset_size();
        if ticket.len() < subset_size {
            return Vec::new();
        }
        if self.space.choose(ticket.len(), subset_size) <= self.remaining {
            ticket
                .elements()
                .into_iter()
                .combinations(subset_size)
                .map(|elements| self.space.rank(&elements.into_iter().collect()))
                .filter(|&rank| self.contains_rank(rank))
                .collect()
        } else {
            self.ranks()
                .filter(|&rank| ticket.covers(&self.space.unrank(rank)))
                .collect()
        }
    }

    #[cfg(test)]
    fn count_covered(&self, ticket: &Ticket) -> u64 {
        self.covered_ranks(ticket).len() as u64
    }

    /// Removes every uncovered draw contained in `ticket`, returning how many were removed.
    pub fn cover(&mut self, ticket: &Ticket) -> u64 {
        self.covered_ranks(ticket)
            .into_iter()
            .filter(|&rank| self.take(rank))
            .count() as u64
    }
}
