//! Material scoring and terminal-state classification.
//!
//! One scan over the 64 squares produces the signed material sum and the
//! per-colour piece inventory; the inventory then drives the dead-draw
//! rules. Checkmate and stalemate are detected through the move generator
//! and the check oracle, both memoised through the search cache.

use crate::board::attacks;
use crate::board::board::Board;
use crate::board::piece::{Color, PieceKind};
use crate::move_generation::MoveGenerator;
use crate::search::cache::SearchCache;

/// What the position is, from the outside: still a game, a draw, or won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Normal,
    Stalemate,
    LightWins,
    DarkWins,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub status: GameStatus,
    pub value: f32,
}

pub struct Evaluator<'a> {
    board: &'a Board,
}

impl<'a> Evaluator<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    /// Classify the position and score material from `perspective`'s side.
    /// `perspective` is also the side to move for the stalemate rule.
    pub fn evaluate(&self, perspective: Color, cache: &mut SearchCache) -> Evaluation {
        let mut value = 0.0f32;

        // Bit `kind.code()` set when the colour still owns such a piece.
        let mut light_has = 0u8;
        let mut dark_has = 0u8;
        let mut light_bishop_square = [false; 2]; // [light squares, dark squares]
        let mut dark_bishop_square = [false; 2];

        for file in 0..8u8 {
            for rank in 0..8u8 {
                let Some(piece) = self.board.get_piece_at(file, rank) else {
                    continue;
                };
                let dark_square = file % 2 == rank % 2;

                match piece.color {
                    Color::Light => {
                        light_has |= 1 << piece.kind.code();
                        if piece.kind == PieceKind::Bishop {
                            light_bishop_square[dark_square as usize] = true;
                        }
                    }
                    Color::Dark => {
                        dark_has |= 1 << piece.kind.code();
                        if piece.kind == PieceKind::Bishop {
                            dark_bishop_square[dark_square as usize] = true;
                        }
                    }
                }

                if piece.kind == PieceKind::King {
                    continue;
                }
                let sign = if piece.color == perspective { 1.0 } else { -1.0 };
                value += piece.kind.material_value() as f32 * sign;
            }
        }

        let king_only = 1u8 << PieceKind::King.code();

        let status = if self.is_checkmated(Color::Light, cache) {
            GameStatus::DarkWins
        } else if self.is_checkmated(Color::Dark, cache) {
            GameStatus::LightWins
        } else if !self.has_legal_moves(perspective, cache) {
            GameStatus::Stalemate
        } else if light_has == king_only && dark_has == king_only {
            GameStatus::Stalemate
        } else if light_has == king_only {
            if can_force_mate(dark_has, dark_bishop_square) {
                GameStatus::DarkWins
            } else {
                GameStatus::Stalemate
            }
        } else if dark_has == king_only {
            if can_force_mate(light_has, light_bishop_square) {
                GameStatus::LightWins
            } else {
                GameStatus::Stalemate
            }
        } else {
            GameStatus::Normal
        };

        Evaluation { status, value }
    }

    fn is_checkmated(&self, color: Color, cache: &mut SearchCache) -> bool {
        if self.has_legal_moves(color, cache) {
            return false;
        }
        self.in_check(color, cache)
    }

    fn has_legal_moves(&self, color: Color, cache: &mut SearchCache) -> bool {
        !MoveGenerator::new(self.board)
            .legal_moves_cached(color, cache)
            .is_empty()
    }

    fn in_check(&self, color: Color, cache: &mut SearchCache) -> bool {
        if let Some(in_check) = cache.in_check(self.board, color) {
            return in_check;
        }
        let in_check = attacks::is_king_in_check(self.board, color);
        cache.insert_in_check(self.board, color, in_check);
        in_check
    }
}

/// Bare king on the other side: mate is forceable with the two-bishop
/// pair, any rook or queen, or bishop plus knight.
fn can_force_mate(has: u8, bishop_square: [bool; 2]) -> bool {
    let has_kind = |kind: PieceKind| has & (1 << kind.code()) != 0;
    (bishop_square[0] && bishop_square[1])
        || has_kind(PieceKind::Rook)
        || has_kind(PieceKind::Queen)
        || (has_kind(PieceKind::Bishop) && has_kind(PieceKind::Knight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::piece::PieceRecord;

    fn put(board: &mut Board, file: u8, rank: u8, kind: PieceKind, color: Color) {
        board.set_piece_at(file, rank, Some(PieceRecord::new(kind, color)));
    }

    fn evaluate(board: &Board, perspective: Color) -> Evaluation {
        let mut cache = SearchCache::new();
        Evaluator::new(board).evaluate(perspective, &mut cache)
    }

    #[test]
    fn starting_position_is_normal_and_level() {
        let board = Board::starting_position();
        let eval = evaluate(&board, Color::Light);
        assert_eq!(eval.status, GameStatus::Normal);
        assert_eq!(eval.value, 0.0);
    }

    #[test]
    fn material_is_signed_from_the_perspective() {
        let mut board = Board::starting_position();
        board.set_piece_at(3, 7, None); // remove the dark queen
        let light = evaluate(&board, Color::Light);
        assert_eq!(light.value, 9.0);
        let dark = evaluate(&board, Color::Dark);
        assert_eq!(dark.value, -9.0);
    }

    #[test]
    fn back_rank_mate_is_a_dark_win() {
        // Light king h1 boxed in by its own pawns, dark rook a1.
        let mut board = Board::new();
        put(&mut board, 7, 0, PieceKind::King, Color::Light);
        put(&mut board, 5, 1, PieceKind::Pawn, Color::Light);
        put(&mut board, 6, 1, PieceKind::Pawn, Color::Light);
        put(&mut board, 7, 1, PieceKind::Pawn, Color::Light);
        put(&mut board, 0, 0, PieceKind::Rook, Color::Dark);
        put(&mut board, 0, 7, PieceKind::King, Color::Dark);

        let eval = evaluate(&board, Color::Light);
        assert_eq!(eval.status, GameStatus::DarkWins);
    }

    #[test]
    fn boxed_king_with_no_moves_is_stalemate() {
        // Dark king a8, light queen b6, light king c7; dark to move.
        let mut board = Board::new();
        put(&mut board, 0, 7, PieceKind::King, Color::Dark);
        put(&mut board, 1, 5, PieceKind::Queen, Color::Light);
        put(&mut board, 2, 6, PieceKind::King, Color::Light);

        let eval = evaluate(&board, Color::Dark);
        assert_eq!(eval.status, GameStatus::Stalemate);
    }

    #[test]
    fn two_bare_kings_are_a_dead_draw() {
        let mut board = Board::new();
        put(&mut board, 0, 0, PieceKind::King, Color::Light);
        put(&mut board, 7, 7, PieceKind::King, Color::Dark);
        assert_eq!(evaluate(&board, Color::Light).status, GameStatus::Stalemate);
    }

    #[test]
    fn lone_minor_piece_cannot_win() {
        let mut board = Board::new();
        put(&mut board, 0, 0, PieceKind::King, Color::Light);
        put(&mut board, 7, 7, PieceKind::King, Color::Dark);
        put(&mut board, 3, 3, PieceKind::Bishop, Color::Dark);
        assert_eq!(evaluate(&board, Color::Light).status, GameStatus::Stalemate);

        board.set_piece_at(3, 3, Some(PieceRecord::new(PieceKind::Knight, Color::Dark)));
        assert_eq!(evaluate(&board, Color::Light).status, GameStatus::Stalemate);
    }

    #[test]
    fn mating_material_against_a_bare_king_decides_the_game() {
        let mut board = Board::new();
        put(&mut board, 0, 0, PieceKind::King, Color::Light);
        put(&mut board, 7, 7, PieceKind::King, Color::Dark);
        put(&mut board, 3, 3, PieceKind::Rook, Color::Dark);
        assert_eq!(evaluate(&board, Color::Light).status, GameStatus::DarkWins);

        // Bishop + knight also forces mate.
        board.set_piece_at(3, 3, Some(PieceRecord::new(PieceKind::Bishop, Color::Dark)));
        put(&mut board, 5, 5, PieceKind::Knight, Color::Dark);
        assert_eq!(evaluate(&board, Color::Light).status, GameStatus::DarkWins);

        // Two bishops on one square colour do not.
        board.set_piece_at(5, 5, Some(PieceRecord::new(PieceKind::Bishop, Color::Dark)));
        assert_eq!(evaluate(&board, Color::Light).status, GameStatus::Stalemate);

        // On opposite colours they do.
        board.set_piece_at(5, 5, None);
        put(&mut board, 5, 4, PieceKind::Bishop, Color::Dark);
        assert_eq!(evaluate(&board, Color::Light).status, GameStatus::DarkWins);
    }

    #[test]
    fn mirrored_light_win_for_mating_material() {
        let mut board = Board::new();
        put(&mut board, 0, 0, PieceKind::King, Color::Dark);
        put(&mut board, 7, 7, PieceKind::King, Color::Light);
        put(&mut board, 4, 4, PieceKind::Queen, Color::Light);
        assert_eq!(evaluate(&board, Color::Light).status, GameStatus::LightWins);
    }
}
