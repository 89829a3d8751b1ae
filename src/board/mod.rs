pub mod attacks;
pub mod board;
pub mod directions;
pub mod flags;
pub mod piece;

pub use board::{Board, Move};
pub use piece::{Color, PieceKind, PieceRecord};
