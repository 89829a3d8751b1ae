//! Castle candidate generation.
//!
//! A castle is offered only when the right is still held, the squares
//! between king and rook are empty, none of the three squares the king
//! stands on, passes over, or lands on is attacked, and both pieces are
//! still at home. King-side and queen-side are judged independently.

use crate::board::attacks::is_square_attacked;
use crate::board::board::{Board, Move};
use crate::board::flags;
use crate::board::piece::{Color, PieceKind, PieceRecord};

pub fn castle_moves(board: &Board, color: Color, out: &mut Vec<Move>) {
    let back_rank = color.back_rank();
    let king_home = board.get_piece_at(4, back_rank)
        == Some(PieceRecord::new(PieceKind::King, color));

    let queen_right = board.special_move_flags & flags::queen_castle_mask(color) != 0;
    if queen_right
        && king_home
        && board.get_piece_at(0, back_rank) == Some(PieceRecord::new(PieceKind::Rook, color))
        && board.is_empty(1, back_rank)
        && board.is_empty(2, back_rank)
        && board.is_empty(3, back_rank)
        && !is_square_attacked(board, 2, back_rank, color)
        && !is_square_attacked(board, 3, back_rank, color)
        && !is_square_attacked(board, 4, back_rank, color)
    {
        out.push(Move::castle_queenside());
    }

    let king_right = board.special_move_flags & flags::king_castle_mask(color) != 0;
    if king_right
        && king_home
        && board.get_piece_at(7, back_rank) == Some(PieceRecord::new(PieceKind::Rook, color))
        && board.is_empty(5, back_rank)
        && board.is_empty(6, back_rank)
        && !is_square_attacked(board, 4, back_rank, color)
        && !is_square_attacked(board, 5, back_rank, color)
        && !is_square_attacked(board, 6, back_rank, color)
    {
        out.push(Move::castle_kingside());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn castle_board(color: Color) -> Board {
        let mut board = Board::new();
        let back = color.back_rank();
        board.set_piece_at(4, back, Some(PieceRecord::new(PieceKind::King, color)));
        board.set_piece_at(0, back, Some(PieceRecord::new(PieceKind::Rook, color)));
        board.set_piece_at(7, back, Some(PieceRecord::new(PieceKind::Rook, color)));
        let other = color.opposite().back_rank();
        board.set_piece_at(4, other, Some(PieceRecord::new(PieceKind::King, color.opposite())));
        board
    }

    fn castles(board: &Board, color: Color) -> Vec<Move> {
        let mut out = Vec::new();
        castle_moves(board, color, &mut out);
        out
    }

    #[test]
    fn both_castles_offered_when_everything_is_clear() {
        for color in [Color::Light, Color::Dark] {
            let board = castle_board(color);
            let moves = castles(&board, color);
            assert_eq!(moves.len(), 2, "{color:?}");
            assert!(moves.iter().any(|m| m.queen_castle));
            assert!(moves.iter().any(|m| m.king_castle));
        }
    }

    #[test]
    fn lost_rights_suppress_each_side_independently() {
        let mut board = castle_board(Color::Light);
        board.special_move_flags &= !flags::LIGHT_QUEEN_CASTLE;
        let moves = castles(&board, Color::Light);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].king_castle);
    }

    #[test]
    fn blocked_intermediate_squares_suppress_castling() {
        let mut board = castle_board(Color::Light);
        board.set_piece_at(1, 0, Some(PieceRecord::new(PieceKind::Knight, Color::Light)));
        board.set_piece_at(6, 0, Some(PieceRecord::new(PieceKind::Bishop, Color::Light)));
        assert!(castles(&board, Color::Light).is_empty());
    }

    #[test]
    fn no_castle_out_of_or_through_check() {
        // Dark rook on e8 checks the king: neither castle may appear.
        let mut board = castle_board(Color::Light);
        board.set_piece_at(4, 7, None);
        board.set_piece_at(0, 7, Some(PieceRecord::new(PieceKind::King, Color::Dark)));
        board.set_piece_at(4, 6, Some(PieceRecord::new(PieceKind::Rook, Color::Dark)));
        assert!(castles(&board, Color::Light).is_empty());

        // Rook on d8 instead: only the queen-side path crosses d1.
        board.set_piece_at(4, 6, None);
        board.set_piece_at(3, 6, Some(PieceRecord::new(PieceKind::Rook, Color::Dark)));
        let moves = castles(&board, Color::Light);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].king_castle);
    }

    #[test]
    fn dark_queen_side_attack_check_uses_rank_seven() {
        // A light rook raking c1/d1/e1 attacks nothing on dark's back
        // rank, so dark keeps both castles.
        let mut board = castle_board(Color::Dark);
        board.set_piece_at(1, 0, Some(PieceRecord::new(PieceKind::Rook, Color::Light)));
        let moves = castles(&board, Color::Dark);
        assert_eq!(moves.len(), 2);

        // The mirrored rook on dark's rank does suppress the queen side.
        let mut board = castle_board(Color::Dark);
        board.set_piece_at(3, 5, Some(PieceRecord::new(PieceKind::Rook, Color::Light)));
        let moves = castles(&board, Color::Dark);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].king_castle);
    }

    #[test]
    fn displaced_rook_suppresses_castling_even_with_the_right_bit() {
        let mut board = castle_board(Color::Light);
        board.set_piece_at(7, 0, None);
        board.set_piece_at(7, 3, Some(PieceRecord::new(PieceKind::Rook, Color::Light)));
        let moves = castles(&board, Color::Light);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].queen_castle);
    }
}
