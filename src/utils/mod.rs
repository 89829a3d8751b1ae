pub mod board_text;
pub mod san;
