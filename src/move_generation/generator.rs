//! Legal move generation.
//!
//! Piece-wise pseudo-legal generation over the direction tables, castle
//! candidates appended, then every candidate is applied to a scratch board
//! and dropped when the mover's own king ends up in check. The cache-aware
//! entry point memoises whole move lists per `(board, colour)`.

use crate::board::board::{Board, Move};
use crate::board::directions::{on_board, BISHOP_DIRS, KNIGHT_DIRS, QUEEN_DIRS, ROOK_DIRS};
use crate::board::flags;
use crate::board::piece::{Color, PieceKind};
use crate::move_generation::castling::castle_moves;
use crate::search::cache::SearchCache;

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
];

pub struct MoveGenerator<'a> {
    board: &'a Board,
}

impl<'a> MoveGenerator<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    /// Every legal move for `color`.
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        let pseudo = self.pseudo_moves(color);
        self.filter_legal(pseudo, color)
    }

    /// Cache-aware variant; computes and memoises on a miss.
    pub fn legal_moves_cached(&self, color: Color, cache: &mut SearchCache) -> Vec<Move> {
        if let Some(moves) = cache.moves(self.board, color) {
            return moves.to_vec();
        }
        let moves = self.legal_moves(color);
        cache.insert_moves(self.board, color, moves.clone());
        moves
    }

    /// Pseudo-legal moves for whatever piece stands on `(file, rank)`.
    pub fn moves_for_piece(&self, file: u8, rank: u8) -> Vec<Move> {
        let mut out = Vec::new();
        let Some(piece) = self.board.get_piece_at(file, rank) else {
            return out;
        };
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(file, rank, piece.color, &mut out),
            PieceKind::Rook => self.dir_moves(file, rank, &ROOK_DIRS, piece.color, false, &mut out),
            PieceKind::Bishop => {
                self.dir_moves(file, rank, &BISHOP_DIRS, piece.color, false, &mut out)
            }
            PieceKind::Knight => {
                self.dir_moves(file, rank, &KNIGHT_DIRS, piece.color, true, &mut out)
            }
            PieceKind::Queen => self.dir_moves(file, rank, &QUEEN_DIRS, piece.color, false, &mut out),
            PieceKind::King => self.dir_moves(file, rank, &QUEEN_DIRS, piece.color, true, &mut out),
        }
        out
    }

    fn pseudo_moves(&self, color: Color) -> Vec<Move> {
        let mut out = Vec::with_capacity(64);
        for file in 0..8u8 {
            for rank in 0..8u8 {
                if self.board.is_color(file, rank, color) {
                    out.extend(self.moves_for_piece(file, rank));
                }
            }
        }
        castle_moves(self.board, color, &mut out);
        out
    }

    fn filter_legal(&self, moves: Vec<Move>, color: Color) -> Vec<Move> {
        moves
            .into_iter()
            .filter(|mv| self.board.apply_move(mv, color).is_some())
            .collect()
    }

    fn pawn_moves(&self, file: u8, rank: u8, color: Color, out: &mut Vec<Move>) {
        let dir = color.pawn_direction();
        let (double_rank, promote_rank, capture_rank): (u8, i8, u8) = match color {
            Color::Light => (1, 7, 4),
            Color::Dark => (6, 0, 3),
        };

        let f = file as i8;
        let r = rank as i8;

        // Forward pushes. Promotion never runs off the board because a pawn
        // on the last rank cannot exist.
        if on_board(f, r + dir) && self.board.is_empty(file, (r + dir) as u8) {
            if rank == double_rank && self.board.is_empty(file, (r + 2 * dir) as u8) {
                let mut mv = Move::new(file, rank, file, (r + 2 * dir) as u8);
                mv.en_passant_flags = 0b1000 | file;
                out.push(mv);
            }
            if r + dir == promote_rank {
                for kind in PROMOTION_KINDS {
                    out.push(Move::promoting(file, rank, file, (r + dir) as u8, kind));
                }
            } else {
                out.push(Move::new(file, rank, file, (r + dir) as u8));
            }
        }

        // Diagonal captures.
        for df in [-1i8, 1] {
            if !on_board(f + df, r + dir) {
                continue;
            }
            if self
                .board
                .is_other_color((f + df) as u8, (r + dir) as u8, color)
            {
                if r + dir == promote_rank {
                    for kind in PROMOTION_KINDS {
                        out.push(Move::promoting(
                            file,
                            rank,
                            (f + df) as u8,
                            (r + dir) as u8,
                            kind,
                        ));
                    }
                } else {
                    out.push(Move::new(file, rank, (f + df) as u8, (r + dir) as u8));
                }
            }
        }

        // En passant: only from the capture rank while the window is open.
        if rank == capture_rank {
            if let Some(ep_file) = flags::en_passant_file(self.board.special_move_flags) {
                let target_rank = (capture_rank as i8 + dir) as u8;
                if self.board.is_empty(ep_file, target_rank)
                    && (ep_file as i8 - f).abs() == 1
                {
                    let mut mv = Move::new(file, rank, ep_file, target_rank);
                    mv.is_en_passant = true;
                    out.push(mv);
                }
            }
        }
    }

    fn dir_moves(
        &self,
        file: u8,
        rank: u8,
        dirs: &[(i8, i8)],
        color: Color,
        one_step: bool,
        out: &mut Vec<Move>,
    ) {
        for (df, dr) in dirs {
            let mut step = 1i8;
            loop {
                let f = file as i8 + df * step;
                let r = rank as i8 + dr * step;
                if !on_board(f, r) {
                    break;
                }
                // Own piece blocks exclusively.
                if self.board.is_color(f as u8, r as u8, color) {
                    break;
                }
                out.push(Move::new(file, rank, f as u8, r as u8));
                // Enemy piece is captured and ends the ray.
                if one_step || self.board.is_other_color(f as u8, r as u8, color) {
                    break;
                }
                step += 1;
            }
        }
    }
}
