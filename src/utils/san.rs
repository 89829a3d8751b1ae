//! Standard Algebraic Notation, both directions.
//!
//! Formatting asks the attackers oracle which friendly pieces of the same
//! kind reach the destination and derives the minimal disambiguator from
//! that set. Parsing peels the string from the right, then resolves the
//! start square through the same oracle, filtered by whatever
//! disambiguators the string carried. Castles are written with zeros,
//! `0-0` and `0-0-0`.

use crate::board::attacks::{attackers_to_square, is_king_in_check, AttackerMode};
use crate::board::board::{Board, Move};
use crate::board::piece::{Color, PieceKind};
use crate::errors::ChessError;
use crate::move_generation::MoveGenerator;

#[inline]
fn file_char(file: u8) -> char {
    (b'a' + file) as char
}

#[inline]
fn rank_char(rank: u8) -> char {
    (b'1' + rank) as char
}

/// Format a legal move as SAN, including `x`, minimal disambiguation,
/// promotion suffix, and a trailing `+` or `#`.
pub fn move_to_san(board: &Board, mv: &Move) -> Result<String, ChessError> {
    if mv.king_castle {
        return Ok("0-0".to_owned());
    }
    if mv.queen_castle {
        return Ok("0-0-0".to_owned());
    }

    let piece = board
        .get_piece_at(mv.start_file, mv.start_rank)
        .ok_or_else(|| ChessError::NoMatchingMove(format!("no piece behind {mv}")))?;

    let attackers = attackers_to_square(
        board,
        mv.end_file,
        mv.end_rank,
        piece.color,
        Some(piece.kind),
        AttackerMode::FriendlySource,
    );
    if attackers.is_empty() {
        return Err(ChessError::NoMatchingMove(format!("{mv} looks impossible")));
    }

    let captures = !board.is_empty(mv.end_file, mv.end_rank) || mv.is_en_passant;
    let letter = piece.kind.san_letter();

    let start = if attackers.len() == 1 {
        // A capturing pawn is named by the file it leaves.
        if piece.kind == PieceKind::Pawn && captures {
            format!("{}", file_char(mv.start_file))
        } else {
            letter.to_owned()
        }
    } else if attackers.len() == 2 {
        // One rival: its file either differs or its rank must.
        if attackers[0].0 != attackers[1].0 {
            format!("{letter}{}", file_char(mv.start_file))
        } else {
            format!("{letter}{}", rank_char(mv.start_rank))
        }
    } else {
        let same_file = attackers.iter().filter(|a| a.0 == mv.start_file).count();
        let same_rank = attackers.iter().filter(|a| a.1 == mv.start_rank).count();
        if same_file == 1 {
            format!("{letter}{}", file_char(mv.start_file))
        } else if same_rank == 1 {
            format!("{letter}{}", rank_char(mv.start_rank))
        } else {
            format!(
                "{letter}{}{}",
                file_char(mv.start_file),
                rank_char(mv.start_rank)
            )
        }
    };

    let connector = if captures { "x" } else { "" };
    let promote = match mv.promotes_to {
        Some(kind) => format!("={}", kind.san_letter()),
        None => String::new(),
    };

    // Play the move out to see whether it gives check, and whether the
    // opponent has any reply at all.
    let next = board
        .apply_move(mv, piece.color)
        .ok_or_else(|| ChessError::IllegalMoveApplied(format!("{mv} in SAN formatting")))?;
    let opponent = piece.color.opposite();
    let suffix = if is_king_in_check(&next, opponent) {
        if MoveGenerator::new(&next).legal_moves(opponent).is_empty() {
            "#"
        } else {
            "+"
        }
    } else {
        ""
    };

    Ok(format!(
        "{start}{connector}{}{}{promote}{suffix}",
        file_char(mv.end_file),
        rank_char(mv.end_rank)
    ))
}

/// Parse SAN for the given side. The board supplies the context needed to
/// resolve the start square.
pub fn san_to_move(board: &Board, san: &str, color: Color) -> Result<Move, ChessError> {
    let trimmed = san.trim();
    if trimmed.len() < 2 {
        return Err(ChessError::InvalidSan(san.to_owned()));
    }
    if trimmed == "0-0" {
        return Ok(Move::castle_kingside());
    }
    if trimmed == "0-0-0" {
        return Ok(Move::castle_queenside());
    }

    let invalid = || ChessError::InvalidSan(san.to_owned());
    let mut rest = trimmed.as_bytes().to_vec();

    if matches!(rest.last(), Some(b'+') | Some(b'#')) {
        rest.pop();
    }

    let mut promotes_to = None;
    if rest.len() >= 2 && rest[rest.len() - 2] == b'=' {
        let kind = PieceKind::from_san_letter(*rest.last().ok_or_else(invalid)? as char)
            .ok_or_else(invalid)?;
        promotes_to = Some(kind);
        rest.truncate(rest.len() - 2);
    }

    if rest.len() < 2 {
        return Err(invalid());
    }
    let end_rank = match rest.pop().ok_or_else(invalid)? {
        c @ b'1'..=b'8' => c - b'1',
        _ => return Err(invalid()),
    };
    let end_file = match rest.pop().ok_or_else(invalid)? {
        c @ b'a'..=b'h' => c - b'a',
        _ => return Err(invalid()),
    };

    if rest.last() == Some(&b'x') {
        rest.pop();
    }

    // Whatever remains is some mix of piece letter and disambiguators;
    // classify right to left by character class.
    let mut start_file: Option<u8> = None;
    let mut start_rank: Option<u8> = None;
    let mut piece_kind: Option<PieceKind> = None;
    while let Some(c) = rest.pop() {
        match c {
            b'a'..=b'h' if start_file.is_none() => start_file = Some(c - b'a'),
            b'1'..=b'8' if start_rank.is_none() => start_rank = Some(c - b'1'),
            b'A'..=b'Z' if piece_kind.is_none() => {
                piece_kind = Some(PieceKind::from_san_letter(c as char).ok_or_else(invalid)?);
            }
            _ => return Err(invalid()),
        }
    }
    let kind = piece_kind.unwrap_or(PieceKind::Pawn);

    let (sf, sr) = match (start_file, start_rank) {
        (Some(f), Some(r)) => (f, r),
        _ => {
            let mut candidates = attackers_to_square(
                board,
                end_file,
                end_rank,
                color,
                Some(kind),
                AttackerMode::FriendlySource,
            );
            candidates.retain(|(f, r)| {
                start_file.map_or(true, |x| *f == x) && start_rank.map_or(true, |x| *r == x)
            });
            match candidates.as_slice() {
                [] => return Err(ChessError::NoMatchingMove(san.to_owned())),
                [only] => *only,
                _ => return Err(ChessError::AmbiguousMove(san.to_owned())),
            }
        }
    };

    let mut mv = Move::new(sf, sr, end_file, end_rank);
    mv.promotes_to = promotes_to;

    // A pawn landing on an empty square of another file can only be the
    // en-passant capture.
    if kind == PieceKind::Pawn && sf != end_file && board.is_empty(end_file, end_rank) {
        mv.is_en_passant = true;
    }

    // A double pawn push opens the en-passant window behind it.
    if kind == PieceKind::Pawn && (end_rank as i8 - sr as i8).abs() == 2 {
        mv.en_passant_flags = 0b1000 | end_file;
    }

    Ok(mv)
}
