//! The framed board text format.
//!
//! Cells are two-character tokens (`__` empty, `WP`..`BK` pieces) reading
//! top rank down, files a..h left to right. The first and last line and
//! the first and last token of each row are a decorative frame the parser
//! ignores. Rendering appends a castle-rights / en-passant status line
//! that the parser also ignores; flags always load as the default (all
//! rights, no window).

use std::fs;
use std::path::Path;

use crate::board::board::Board;
use crate::board::flags;
use crate::board::piece::PieceRecord;
use crate::errors::ChessError;

const BOARD_DIM: usize = 8;
const CELL_WIDTH: usize = 3;

/// Parse the framed text format into a board.
pub fn parse_board_text(text: &str) -> Result<Board, ChessError> {
    let mut board = Board::new();

    for (line_index, line) in text.lines().enumerate() {
        // Frame rows, and anything after the board (the status line).
        if line_index == 0 || line_index > BOARD_DIM {
            continue;
        }
        let rank = (BOARD_DIM - line_index) as u8;

        let mut token_count = 0usize;
        for token in line.split_whitespace() {
            token_count += 1;
            // Frame columns.
            if token_count == 1 || token_count == BOARD_DIM + 2 {
                continue;
            }
            if token_count > BOARD_DIM + 2 {
                return Err(ChessError::InvalidBoardText(format!(
                    "too many cells on line {}",
                    line_index + 1
                )));
            }
            let file = (token_count - 2) as u8;
            if token == "__" {
                continue;
            }
            let piece = PieceRecord::from_token(token).ok_or_else(|| {
                ChessError::InvalidBoardText(format!("unknown cell token \"{token}\""))
            })?;
            board.set_piece_at(file, rank, Some(piece));
        }
    }

    Ok(board)
}

/// Render a board in the same format, a1 bottom left, plus the status line.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    let frame = "=".repeat((CELL_WIDTH + 1) * BOARD_DIM + 2);

    out.push_str(&frame);
    out.push('\n');
    for rank in (0..BOARD_DIM as u8).rev() {
        out.push_str("| ");
        for file in 0..BOARD_DIM as u8 {
            let token = match board.get_piece_at(file, rank) {
                Some(piece) => piece.token(),
                None => "__",
            };
            out.push_str(token);
            out.push_str(&" ".repeat(CELL_WIDTH - token.len()));
            if file != BOARD_DIM as u8 - 1 {
                out.push(' ');
            }
        }
        out.push_str("|\n");
    }
    out.push_str(&frame);
    out.push('\n');

    out.push_str("Castle:");
    let rights = [
        (flags::LIGHT_KING_CASTLE, " WK"),
        (flags::LIGHT_QUEEN_CASTLE, " WQ"),
        (flags::DARK_KING_CASTLE, " BK"),
        (flags::DARK_QUEEN_CASTLE, " BQ"),
    ];
    for (mask, name) in rights {
        if board.special_move_flags & mask != 0 {
            out.push_str(name);
        }
    }
    if let Some(file) = flags::en_passant_file(board.special_move_flags) {
        out.push_str(&format!(" EP: {file}"));
    }
    out.push('\n');

    out
}

/// Load a board from a file in the framed text format.
pub fn load_board_from_file(path: &Path) -> Result<Board, ChessError> {
    let text = fs::read_to_string(path)?;
    parse_board_text(&text)
}

/// Write the rendered board to a file.
pub fn write_board_to_file(board: &Board, path: &Path) -> Result<(), ChessError> {
    fs::write(path, render_board(board))?;
    Ok(())
}
