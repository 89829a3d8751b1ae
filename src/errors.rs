//! Error types shared across the engine.
//!
//! Everything fallible in the library funnels into `ChessError`. A move that
//! would leave the mover's own king in check is not an error: `apply_move`
//! reports it as `None` and the move generator relies on that.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChessError {
    /// The SAN string is too short or does not follow SAN grammar.
    #[error("invalid SAN \"{0}\"")]
    InvalidSan(String),

    /// SAN disambiguation resolved to zero candidate start squares.
    #[error("no matching move for \"{0}\"")]
    NoMatchingMove(String),

    /// SAN disambiguation left two or more candidate start squares.
    #[error("ambiguous move \"{0}\"")]
    AmbiguousMove(String),

    /// A move the search believed legal was rejected by the board. This is
    /// an internal invariant violation and unwinds the whole search.
    #[error("illegal move applied during search: {0}")]
    IllegalMoveApplied(String),

    /// Malformed board text (unknown cell token or wrong shape).
    #[error("invalid board text: {0}")]
    InvalidBoardText(String),

    #[error("i/o error")]
    Io(#[from] std::io::Error),
}
