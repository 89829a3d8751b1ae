//! Position-keyed memo for legal move lists and in-check status.
//!
//! Keys are `(board, side to move)`; the key hash is the board hash XORed
//! with the colour bit so the two sides of the same position never share a
//! bucket. Entries are never invalidated: positions are immutable keys and
//! the cache lives for exactly one search.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::board::board::{Board, Move};
use crate::board::piece::Color;

#[derive(Clone, PartialEq, Eq)]
struct PositionKey {
    board: Board,
    color: Color,
}

impl Hash for PositionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.board.position_hash() ^ self.color.index() as u64);
    }
}

#[derive(Default, Clone)]
struct CacheEntry {
    legal_moves: Option<Vec<Move>>,
    in_check: Option<bool>,
}

#[derive(Default)]
pub struct SearchCache {
    map: HashMap<PositionKey, CacheEntry>,
    hits: u64,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoise the legal move list; a present value is never replaced.
    pub fn insert_moves(&mut self, board: &Board, color: Color, moves: Vec<Move>) {
        let entry = self
            .map
            .entry(PositionKey { board: *board, color })
            .or_default();
        if entry.legal_moves.is_none() {
            entry.legal_moves = Some(moves);
        }
    }

    /// Memoise the in-check bit; a present value is never replaced.
    pub fn insert_in_check(&mut self, board: &Board, color: Color, in_check: bool) {
        let entry = self
            .map
            .entry(PositionKey { board: *board, color })
            .or_default();
        if entry.in_check.is_none() {
            entry.in_check = Some(in_check);
        }
    }

    pub fn moves(&mut self, board: &Board, color: Color) -> Option<&[Move]> {
        let key = PositionKey { board: *board, color };
        match self.map.get(&key).and_then(|e| e.legal_moves.as_deref()) {
            Some(moves) => {
                self.hits += 1;
                Some(moves)
            }
            None => None,
        }
    }

    pub fn in_check(&mut self, board: &Board, color: Color) -> Option<bool> {
        let key = PositionKey { board: *board, color };
        match self.map.get(&key).and_then(|e| e.in_check) {
            Some(in_check) => {
                self.hits += 1;
                Some(in_check)
            }
            None => None,
        }
    }

    pub fn contains(&self, board: &Board, color: Color) -> bool {
        self.map.contains_key(&PositionKey { board: *board, color })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colours_at_the_same_position_do_not_collide() {
        let board = Board::starting_position();
        let mut cache = SearchCache::new();
        cache.insert_in_check(&board, Color::Light, true);
        assert_eq!(cache.in_check(&board, Color::Light), Some(true));
        assert_eq!(cache.in_check(&board, Color::Dark), None);
        assert!(cache.contains(&board, Color::Light));
        assert!(!cache.contains(&board, Color::Dark));
    }

    #[test]
    fn first_insert_wins_per_field() {
        let board = Board::starting_position();
        let mut cache = SearchCache::new();
        cache.insert_moves(&board, Color::Light, vec![Move::new(0, 1, 0, 2)]);
        cache.insert_moves(&board, Color::Light, Vec::new());
        assert_eq!(cache.moves(&board, Color::Light).map(<[Move]>::len), Some(1));

        // The two fields fill independently under one key.
        cache.insert_in_check(&board, Color::Light, false);
        cache.insert_in_check(&board, Color::Light, true);
        assert_eq!(cache.in_check(&board, Color::Light), Some(false));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn lookups_count_hits() {
        let board = Board::starting_position();
        let mut cache = SearchCache::new();
        assert_eq!(cache.moves(&board, Color::Light), None);
        assert_eq!(cache.hits(), 0);
        cache.insert_moves(&board, Color::Light, Vec::new());
        cache.moves(&board, Color::Light);
        cache.moves(&board, Color::Light);
        assert_eq!(cache.hits(), 2);
    }
}
