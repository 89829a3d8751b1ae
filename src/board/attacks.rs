//! The attackers-of-a-square oracle.
//!
//! One walker answers three questions: which enemy pieces attack a square
//! (check detection, castle legality), and which friendly pieces of a given
//! kind can reach a square (SAN disambiguation and SAN parsing). The
//! friendly form treats pawns as movers, so quiet push sources count too.

use crate::board::board::Board;
use crate::board::directions::{on_board, BISHOP_DIRS, KNIGHT_DIRS, ROOK_DIRS};
use crate::board::flags;
use crate::board::piece::{Color, PieceKind, PieceRecord};

/// Whose pieces the oracle is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackerMode {
    /// Pieces of the opposite colour that attack the square.
    Enemy,
    /// Own pieces whose reach includes the square.
    FriendlySource,
}

/// True when any enemy piece of `color`'s opponent attacks `(file, rank)`.
/// Stops at the first attacker found.
pub fn is_square_attacked(board: &Board, file: u8, rank: u8, color: Color) -> bool {
    scan_attackers(board, file, rank, color, None, AttackerMode::Enemy, |_, _| true)
}

/// All attackers of `(file, rank)`, as `(file, rank)` source squares.
pub fn attackers_to_square(
    board: &Board,
    file: u8,
    rank: u8,
    color: Color,
    filter: Option<PieceKind>,
    mode: AttackerMode,
) -> Vec<(u8, u8)> {
    let mut found = Vec::new();
    scan_attackers(board, file, rank, color, filter, mode, |f, r| {
        found.push((f, r));
        false
    });
    found
}

/// Locate the king of `color`, if it is on the board at all.
pub fn king_square(board: &Board, color: Color) -> Option<(u8, u8)> {
    for file in 0..8u8 {
        for rank in 0..8u8 {
            if board.get_piece_at(file, rank) == Some(PieceRecord::new(PieceKind::King, color)) {
                return Some((file, rank));
            }
        }
    }
    None
}

/// True when `color`'s king is attacked. A board without that king is
/// never in check.
pub fn is_king_in_check(board: &Board, color: Color) -> bool {
    match king_square(board, color) {
        Some((file, rank)) => is_square_attacked(board, file, rank, color),
        None => false,
    }
}

/// Core walker. `emit` receives each attacker's square and returns true to
/// stop the scan; the function's return value is whether a stop happened.
fn scan_attackers<F>(
    board: &Board,
    file: u8,
    rank: u8,
    color: Color,
    filter: Option<PieceKind>,
    mode: AttackerMode,
    mut emit: F,
) -> bool
where
    F: FnMut(u8, u8) -> bool,
{
    let attacker_color = match mode {
        AttackerMode::Enemy => color.opposite(),
        AttackerMode::FriendlySource => color,
    };

    let wants = |kind: PieceKind| filter.is_none() || filter == Some(kind);
    let attacker_is = |f: i8, r: i8, kind: PieceKind| {
        on_board(f, r)
            && board.get_piece_at(f as u8, r as u8)
                == Some(PieceRecord::new(kind, attacker_color))
    };

    if wants(PieceKind::Pawn) {
        let pawn_dir = attacker_color.pawn_direction();
        let f = file as i8;
        let r = rank as i8;

        // Diagonal attackers sit one square backward on either side. As a
        // friendly source this is only a destination when the square holds
        // an enemy piece (pawns move diagonally only to capture).
        let diagonals_apply = match mode {
            AttackerMode::Enemy => true,
            AttackerMode::FriendlySource => board.is_other_color(file, rank, attacker_color),
        };
        if diagonals_apply {
            for df in [-1i8, 1] {
                if attacker_is(f + df, r - pawn_dir, PieceKind::Pawn) && emit((f + df) as u8, (r - pawn_dir) as u8) {
                    return true;
                }
            }
        }

        // En passant: the queried square is the skipped square and the
        // victim pawn still stands beside it.
        if let Some(ep_file) = flags::en_passant_file(board.special_move_flags) {
            let target_rank: i8 = if attacker_color == Color::Light { 5 } else { 2 };
            let victim_rank = target_rank - pawn_dir;
            let victim_is_pawn = on_board(ep_file as i8, victim_rank)
                && matches!(
                    board.get_piece_at(ep_file, victim_rank as u8),
                    Some(p) if p.color != attacker_color && p.kind == PieceKind::Pawn
                );
            if file == ep_file && r == target_rank && victim_is_pawn {
                for df in [-1i8, 1] {
                    if attacker_is(f + df, victim_rank, PieceKind::Pawn)
                        && emit((f + df) as u8, victim_rank as u8)
                    {
                        return true;
                    }
                }
            }
        }

        // Quiet pushes reach the square only as a friendly mover.
        if mode == AttackerMode::FriendlySource && board.is_empty(file, rank) {
            if attacker_is(f, r - pawn_dir, PieceKind::Pawn) {
                if emit(file, (r - pawn_dir) as u8) {
                    return true;
                }
            } else if attacker_is(f, r - 2 * pawn_dir, PieceKind::Pawn) {
                let double_rank: i8 = if attacker_color == Color::Light { 1 } else { 6 };
                let intermediate_empty =
                    on_board(f, r - pawn_dir) && board.is_empty(file, (r - pawn_dir) as u8);
                if r - 2 * pawn_dir == double_rank
                    && intermediate_empty
                    && emit(file, (r - 2 * pawn_dir) as u8)
                {
                    return true;
                }
            }
        }
    }

    if wants(PieceKind::Knight) {
        for (df, dr) in KNIGHT_DIRS {
            let f = file as i8 + df;
            let r = rank as i8 + dr;
            if attacker_is(f, r, PieceKind::Knight) && emit(f as u8, r as u8) {
                return true;
            }
        }
    }

    let rook_like = wants(PieceKind::Rook) || wants(PieceKind::Queen);
    if rook_like
        && walk_rays(board, file, rank, &ROOK_DIRS, |piece| {
            (piece.kind == PieceKind::Rook && wants(PieceKind::Rook)
                || piece.kind == PieceKind::Queen && wants(PieceKind::Queen))
                && piece.color == attacker_color
        }, &mut emit)
    {
        return true;
    }

    let bishop_like = wants(PieceKind::Bishop) || wants(PieceKind::Queen);
    if bishop_like
        && walk_rays(board, file, rank, &BISHOP_DIRS, |piece| {
            (piece.kind == PieceKind::Bishop && wants(PieceKind::Bishop)
                || piece.kind == PieceKind::Queen && wants(PieceKind::Queen))
                && piece.color == attacker_color
        }, &mut emit)
    {
        return true;
    }

    if wants(PieceKind::King) {
        for df in -1i8..=1 {
            for dr in -1i8..=1 {
                if df == 0 && dr == 0 {
                    continue;
                }
                let f = file as i8 + df;
                let r = rank as i8 + dr;
                if attacker_is(f, r, PieceKind::King) && emit(f as u8, r as u8) {
                    return true;
                }
            }
        }
    }

    false
}

/// Walk each ray until the first occupied square; that square is emitted
/// only when `matches` accepts its piece.
fn walk_rays<M, F>(
    board: &Board,
    file: u8,
    rank: u8,
    dirs: &[(i8, i8)],
    matches: M,
    emit: &mut F,
) -> bool
where
    M: Fn(PieceRecord) -> bool,
    F: FnMut(u8, u8) -> bool,
{
    for (df, dr) in dirs {
        let mut step = 1i8;
        loop {
            let f = file as i8 + df * step;
            let r = rank as i8 + dr * step;
            if !on_board(f, r) {
                break;
            }
            if let Some(piece) = board.get_piece_at(f as u8, r as u8) {
                if matches(piece) && emit(f as u8, r as u8) {
                    return true;
                }
                break;
            }
            step += 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(board: &mut Board, file: u8, rank: u8, kind: PieceKind, color: Color) {
        board.set_piece_at(file, rank, Some(PieceRecord::new(kind, color)));
    }

    #[test]
    fn rook_attacks_along_open_lines_only() {
        let mut board = Board::new();
        put(&mut board, 0, 0, PieceKind::Rook, Color::Dark);
        assert!(is_square_attacked(&board, 0, 5, Color::Light));
        assert!(is_square_attacked(&board, 5, 0, Color::Light));
        assert!(!is_square_attacked(&board, 1, 1, Color::Light));

        // A blocker cuts the ray.
        put(&mut board, 0, 3, PieceKind::Pawn, Color::Light);
        assert!(!is_square_attacked(&board, 0, 5, Color::Light));
        assert!(is_square_attacked(&board, 0, 2, Color::Light));
    }

    #[test]
    fn pawn_attacks_are_diagonal_and_directional() {
        let mut board = Board::new();
        put(&mut board, 4, 3, PieceKind::Pawn, Color::Light);
        // A light pawn on e4 attacks d5 and f5, not e5 or d3.
        assert!(is_square_attacked(&board, 3, 4, Color::Dark));
        assert!(is_square_attacked(&board, 5, 4, Color::Dark));
        assert!(!is_square_attacked(&board, 4, 4, Color::Dark));
        assert!(!is_square_attacked(&board, 3, 2, Color::Dark));
    }

    #[test]
    fn in_check_matches_attackers_of_the_king_square() {
        let mut board = Board::new();
        put(&mut board, 4, 0, PieceKind::King, Color::Light);
        put(&mut board, 4, 7, PieceKind::Rook, Color::Dark);
        assert!(is_king_in_check(&board, Color::Light));

        let (kf, kr) = king_square(&board, Color::Light).expect("king present");
        let attackers = attackers_to_square(
            &board,
            kf,
            kr,
            Color::Light,
            None,
            AttackerMode::Enemy,
        );
        assert_eq!(attackers, vec![(4, 7)]);

        // Interpose a piece; both views must agree again.
        put(&mut board, 4, 4, PieceKind::Knight, Color::Dark);
        assert!(!is_king_in_check(&board, Color::Light));
        assert!(attackers_to_square(&board, 4, 0, Color::Light, None, AttackerMode::Enemy)
            .is_empty());
    }

    #[test]
    fn king_scan_handles_a_missing_king() {
        let board = Board::new();
        assert_eq!(king_square(&board, Color::Light), None);
        assert!(!is_king_in_check(&board, Color::Light));
    }

    #[test]
    fn friendly_sources_include_pawn_pushes_to_empty_squares() {
        let board = Board::starting_position();
        // Both e3 and e4 are reachable by the e2 pawn alone.
        let single = attackers_to_square(
            &board,
            4,
            2,
            Color::Light,
            Some(PieceKind::Pawn),
            AttackerMode::FriendlySource,
        );
        assert_eq!(single, vec![(4, 1)]);
        let double = attackers_to_square(
            &board,
            4,
            3,
            Color::Light,
            Some(PieceKind::Pawn),
            AttackerMode::FriendlySource,
        );
        assert_eq!(double, vec![(4, 1)]);
    }

    #[test]
    fn friendly_double_push_requires_empty_intermediate() {
        let mut board = Board::starting_position();
        put(&mut board, 4, 2, PieceKind::Knight, Color::Light);
        let double = attackers_to_square(
            &board,
            4,
            3,
            Color::Light,
            Some(PieceKind::Pawn),
            AttackerMode::FriendlySource,
        );
        assert!(double.is_empty());
    }

    #[test]
    fn friendly_pawn_diagonals_require_an_enemy_on_the_square() {
        let mut board = Board::new();
        put(&mut board, 4, 3, PieceKind::Pawn, Color::Light);
        // Nothing on d5: the pawn is not a mover to d5.
        assert!(attackers_to_square(
            &board,
            3,
            4,
            Color::Light,
            Some(PieceKind::Pawn),
            AttackerMode::FriendlySource,
        )
        .is_empty());

        put(&mut board, 3, 4, PieceKind::Knight, Color::Dark);
        assert_eq!(
            attackers_to_square(
                &board,
                3,
                4,
                Color::Light,
                Some(PieceKind::Pawn),
                AttackerMode::FriendlySource,
            ),
            vec![(4, 3)]
        );
    }

    #[test]
    fn en_passant_window_contributes_attackers() {
        let mut board = Board::new();
        put(&mut board, 4, 0, PieceKind::King, Color::Light);
        put(&mut board, 4, 7, PieceKind::King, Color::Dark);
        put(&mut board, 4, 3, PieceKind::Pawn, Color::Light); // just double-pushed
        put(&mut board, 3, 3, PieceKind::Pawn, Color::Dark);
        board.special_move_flags |= flags::CAN_EN_PASSANT | (4 << 4);

        // Dark pawn on d4 reaches e3 through the en-passant window.
        let sources = attackers_to_square(
            &board,
            4,
            2,
            Color::Dark,
            Some(PieceKind::Pawn),
            AttackerMode::FriendlySource,
        );
        assert_eq!(sources, vec![(3, 3)]);

        // Window closed: e3 is unreachable again.
        board.special_move_flags &= !(flags::CAN_EN_PASSANT | flags::EN_PASSANT_FILE_MASK);
        assert!(attackers_to_square(
            &board,
            4,
            2,
            Color::Dark,
            Some(PieceKind::Pawn),
            AttackerMode::FriendlySource,
        )
        .is_empty());
    }

    #[test]
    fn type_filter_limits_the_scan() {
        let mut board = Board::new();
        put(&mut board, 0, 0, PieceKind::Rook, Color::Dark);
        put(&mut board, 2, 2, PieceKind::Bishop, Color::Dark);
        let rooks = attackers_to_square(
            &board,
            0,
            4,
            Color::Light,
            Some(PieceKind::Rook),
            AttackerMode::Enemy,
        );
        assert_eq!(rooks, vec![(0, 0)]);
        let bishops = attackers_to_square(
            &board,
            0,
            4,
            Color::Light,
            Some(PieceKind::Bishop),
            AttackerMode::Enemy,
        );
        assert_eq!(bishops, vec![(2, 2)]);
    }

    #[test]
    fn queen_found_through_either_ray_family() {
        let mut board = Board::new();
        put(&mut board, 3, 3, PieceKind::Queen, Color::Dark);
        assert!(is_square_attacked(&board, 3, 7, Color::Light));
        assert!(is_square_attacked(&board, 7, 7, Color::Light));
        let via_filter = attackers_to_square(
            &board,
            6,
            6,
            Color::Light,
            Some(PieceKind::Queen),
            AttackerMode::Enemy,
        );
        assert_eq!(via_filter, vec![(3, 3)]);
    }
}
