//! Weighted random move selection.
//!
//! The selector owns its RNG: OS-seeded in production, fixed-seed in tests
//! so searches and rollouts replay deterministically. Weights are
//! normalised at call time; the uniform rollout case is weights of one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::board::{Board, Move};
use crate::board::piece::Color;
use crate::move_generation::MoveGenerator;
use crate::search::cache::SearchCache;

pub struct MoveSelector {
    rng: StdRng,
}

impl MoveSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic selector for tests and reproducible searches.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sample an index with probability proportional to its weight.
    /// `None` when the weights are empty or sum to nothing.
    pub fn select_weighted(&mut self, weights: &[f32]) -> Option<usize> {
        let sum: f32 = weights.iter().sum();
        if !(sum > 0.0) {
            return None;
        }

        let threshold = self.rng.random::<f32>();
        let mut running = 0.0f32;
        for (index, weight) in weights.iter().enumerate() {
            running += weight / sum;
            if running > threshold {
                return Some(index);
            }
        }
        // Rounding can leave the running sum a hair under 1.0.
        None
    }

    /// Uniform pick over `len` candidates.
    pub fn select_uniform(&mut self, len: usize) -> Option<usize> {
        self.select_weighted(&vec![1.0; len])
    }

    /// Pick a uniformly random legal move for `color`, generating the move
    /// list through the cache.
    pub fn select_move(
        &mut self,
        board: &Board,
        color: Color,
        cache: &mut SearchCache,
    ) -> Option<Move> {
        let moves = MoveGenerator::new(board).legal_moves_cached(color, cache);
        let index = self.select_uniform(moves.len())?;
        Some(moves[index])
    }
}

impl Default for MoveSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_zero_weights_select_nothing() {
        let mut selector = MoveSelector::with_seed(7);
        assert_eq!(selector.select_weighted(&[]), None);
        assert_eq!(selector.select_weighted(&[0.0, 0.0]), None);
        assert_eq!(selector.select_uniform(0), None);
    }

    #[test]
    fn zero_weight_entries_are_never_chosen() {
        let mut selector = MoveSelector::with_seed(11);
        for _ in 0..500 {
            let picked = selector
                .select_weighted(&[0.0, 1.0, 0.0, 2.0])
                .expect("positive weights select");
            assert!(picked == 1 || picked == 3);
        }
    }

    #[test]
    fn selection_tracks_the_weight_ratio() {
        let mut selector = MoveSelector::with_seed(13);
        let mut counts = [0u32; 2];
        for _ in 0..4000 {
            let picked = selector.select_weighted(&[1.0, 3.0]).expect("selects");
            counts[picked] += 1;
        }
        // Index 1 carries 75% of the mass; allow a generous margin.
        let share = counts[1] as f32 / 4000.0;
        assert!(share > 0.68 && share < 0.82, "share {share}");
    }

    #[test]
    fn seeded_selectors_replay_identically() {
        let mut a = MoveSelector::with_seed(42);
        let mut b = MoveSelector::with_seed(42);
        let weights = [1.0f32; 20];
        for _ in 0..50 {
            assert_eq!(a.select_weighted(&weights), b.select_weighted(&weights));
        }
    }

    #[test]
    fn select_move_draws_from_the_legal_list() {
        let board = Board::starting_position();
        let mut cache = SearchCache::new();
        let mut selector = MoveSelector::with_seed(3);
        let legal = MoveGenerator::new(&board).legal_moves(Color::Light);
        for _ in 0..50 {
            let mv = selector
                .select_move(&board, Color::Light, &mut cache)
                .expect("starting position has moves");
            assert!(legal.contains(&mv));
        }
    }
}
