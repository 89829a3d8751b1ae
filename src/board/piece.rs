//! Piece, colour, and the 4-bit nibble codec used by the packed board.
//!
//! A stored piece is one nibble: the high bit is the colour (0 light,
//! 1 dark) and the low three bits are the piece kind (0 means the square
//! is empty). The board hash is defined over this exact encoding.

/// Side of the board a piece belongs to, and the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::Light => 0,
            Color::Dark => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Rank the colour's pieces start on (0 for light, 7 for dark).
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::Light => 0,
            Color::Dark => 7,
        }
    }

    /// Direction the colour's pawns advance in.
    #[inline]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::Light => 1,
            Color::Dark => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Pawn,
    Rook,
    Bishop,
    Knight,
    Queen,
    King,
}

impl PieceKind {
    /// Three-bit storage code. Zero is reserved for the empty square.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Rook => 2,
            PieceKind::Bishop => 3,
            PieceKind::Knight => 4,
            PieceKind::Queen => 5,
            PieceKind::King => 6,
        }
    }

    #[inline]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PieceKind::Pawn),
            2 => Some(PieceKind::Rook),
            3 => Some(PieceKind::Bishop),
            4 => Some(PieceKind::Knight),
            5 => Some(PieceKind::Queen),
            6 => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Material value used by the evaluator. Kings carry no material.
    #[inline]
    pub const fn material_value(self) -> u32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Rook => 5,
            PieceKind::Bishop => 3,
            PieceKind::Knight => 3,
            PieceKind::Queen => 9,
            PieceKind::King => 0,
        }
    }

    /// SAN letter for the piece; pawns have none.
    #[inline]
    pub const fn san_letter(self) -> &'static str {
        match self {
            PieceKind::Pawn => "",
            PieceKind::Rook => "R",
            PieceKind::Bishop => "B",
            PieceKind::Knight => "N",
            PieceKind::Queen => "Q",
            PieceKind::King => "K",
        }
    }

    #[inline]
    pub const fn from_san_letter(letter: char) -> Option<Self> {
        match letter {
            'R' => Some(PieceKind::Rook),
            'B' => Some(PieceKind::Bishop),
            'N' => Some(PieceKind::Knight),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// An occupied square: a piece kind plus its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceRecord {
    pub kind: PieceKind,
    pub color: Color,
}

impl PieceRecord {
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// Pack into the 4-bit storage nibble.
    #[inline]
    pub const fn nibble(self) -> u8 {
        ((self.color.index() as u8) << 3) | self.kind.code()
    }

    /// Decode a storage nibble; `None` means the square is empty (or the
    /// nibble is not a valid encoding).
    #[inline]
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        let color = if nibble & 0b1000 != 0 {
            Color::Dark
        } else {
            Color::Light
        };
        match PieceKind::from_code(nibble & 0b0111) {
            Some(kind) => Some(PieceRecord { kind, color }),
            None => None,
        }
    }

    /// Two-character token used by the board text format, e.g. `WP`, `BK`.
    pub fn token(self) -> &'static str {
        match (self.color, self.kind) {
            (Color::Light, PieceKind::Pawn) => "WP",
            (Color::Light, PieceKind::Rook) => "WR",
            (Color::Light, PieceKind::Bishop) => "WB",
            (Color::Light, PieceKind::Knight) => "WN",
            (Color::Light, PieceKind::Queen) => "WQ",
            (Color::Light, PieceKind::King) => "WK",
            (Color::Dark, PieceKind::Pawn) => "BP",
            (Color::Dark, PieceKind::Rook) => "BR",
            (Color::Dark, PieceKind::Bishop) => "BB",
            (Color::Dark, PieceKind::Knight) => "BN",
            (Color::Dark, PieceKind::Queen) => "BQ",
            (Color::Dark, PieceKind::King) => "BK",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let color = match token.as_bytes().first()? {
            b'W' => Color::Light,
            b'B' => Color::Dark,
            _ => return None,
        };
        let kind = match token.as_bytes().get(1)? {
            b'P' => PieceKind::Pawn,
            b'R' => PieceKind::Rook,
            b'B' => PieceKind::Bishop,
            b'N' => PieceKind::Knight,
            b'Q' => PieceKind::Queen,
            b'K' => PieceKind::King,
            _ => return None,
        };
        if token.len() != 2 {
            return None;
        }
        Some(Self { kind, color })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibble_codec_round_trips_every_piece() {
        for color in [Color::Light, Color::Dark] {
            for kind in [
                PieceKind::Pawn,
                PieceKind::Rook,
                PieceKind::Bishop,
                PieceKind::Knight,
                PieceKind::Queen,
                PieceKind::King,
            ] {
                let piece = PieceRecord::new(kind, color);
                assert_eq!(PieceRecord::from_nibble(piece.nibble()), Some(piece));
            }
        }
        assert_eq!(PieceRecord::from_nibble(0), None);
        assert_eq!(PieceRecord::from_nibble(0b1000), None);
    }

    #[test]
    fn token_codec_round_trips() {
        let piece = PieceRecord::new(PieceKind::Knight, Color::Dark);
        assert_eq!(piece.token(), "BN");
        assert_eq!(PieceRecord::from_token("BN"), Some(piece));
        assert_eq!(PieceRecord::from_token("__"), None);
        assert_eq!(PieceRecord::from_token("W"), None);
    }
}
