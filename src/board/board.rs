//! Packed board state and move application.
//!
//! The board stores 64 squares as 4-bit nibbles in a 32-byte array, laid
//! out file-major: the piece at `(file, rank)` occupies bits
//! `[(file*8 + rank)*4, +4)`, high nibble first within each byte. One more
//! byte carries castle rights and the en-passant window (see `flags`).
//! Equality is byte-wise over those 33 bytes and both hash functions are
//! pure functions of them, so the layout is observable behaviour.

use std::fmt;

use crate::board::attacks;
use crate::board::flags;
use crate::board::piece::{Color, PieceKind, PieceRecord};

const BOARD_DIM: u8 = 8;
const NUM_DATA_BYTES: usize = 32;

const HIGH_NIBBLE: u8 = 0xF0;

/// A move in board coordinates plus the special-move markers needed to
/// apply it without any other context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub start_file: u8,
    pub start_rank: u8,
    pub end_file: u8,
    pub end_rank: u8,

    /// High-nibble pattern installed into the flag byte when this move is
    /// applied: `0b1000 | file` after a double pawn push, zero otherwise.
    pub en_passant_flags: u8,

    pub king_castle: bool,
    pub queen_castle: bool,

    pub is_en_passant: bool,
    pub is_null: bool,

    pub promotes_to: Option<PieceKind>,
}

impl Move {
    pub fn new(start_file: u8, start_rank: u8, end_file: u8, end_rank: u8) -> Self {
        Self {
            start_file,
            start_rank,
            end_file,
            end_rank,
            en_passant_flags: 0,
            king_castle: false,
            queen_castle: false,
            is_en_passant: false,
            is_null: false,
            promotes_to: None,
        }
    }

    pub fn promoting(
        start_file: u8,
        start_rank: u8,
        end_file: u8,
        end_rank: u8,
        kind: PieceKind,
    ) -> Self {
        let mut mv = Self::new(start_file, start_rank, end_file, end_rank);
        mv.promotes_to = Some(kind);
        mv
    }

    pub fn castle_kingside() -> Self {
        let mut mv = Self::new(0, 0, 0, 0);
        mv.king_castle = true;
        mv
    }

    pub fn castle_queenside() -> Self {
        let mut mv = Self::new(0, 0, 0, 0);
        mv.queen_castle = true;
        mv
    }

    pub fn null() -> Self {
        let mut mv = Self::new(0, 0, 0, 0);
        mv.is_null = true;
        mv
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.king_castle {
            return write!(f, "K Castle");
        }
        if self.queen_castle {
            return write!(f, "Q Castle");
        }
        write!(
            f,
            "({},{})->({},{})",
            self.start_file, self.start_rank, self.end_file, self.end_rank
        )?;
        if let Some(kind) = self.promotes_to {
            write!(f, "+{}", kind.san_letter())?;
        }
        Ok(())
    }
}

/// The full position: packed piece storage plus the special-move byte.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    data: [u8; NUM_DATA_BYTES],
    pub special_move_flags: u8,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board with full castle rights and no en-passant window.
    pub fn new() -> Self {
        Self {
            data: [0; NUM_DATA_BYTES],
            special_move_flags: flags::ALL_CASTLE_RIGHTS,
        }
    }

    /// The standard starting position.
    pub fn starting_position() -> Self {
        let mut board = Self::new();
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in back.iter().enumerate() {
            let file = file as u8;
            board.set_piece_at(file, 0, Some(PieceRecord::new(*kind, Color::Light)));
            board.set_piece_at(file, 1, Some(PieceRecord::new(PieceKind::Pawn, Color::Light)));
            board.set_piece_at(file, 6, Some(PieceRecord::new(PieceKind::Pawn, Color::Dark)));
            board.set_piece_at(file, 7, Some(PieceRecord::new(*kind, Color::Dark)));
        }
        board
    }

    #[inline]
    pub fn get_piece_at(&self, file: u8, rank: u8) -> Option<PieceRecord> {
        let bit_index = (file as usize * BOARD_DIM as usize + rank as usize) * 4;
        let byte = self.data[bit_index / 8];
        let nibble = ((byte << (bit_index % 8)) & HIGH_NIBBLE) >> 4;
        PieceRecord::from_nibble(nibble)
    }

    #[inline]
    pub fn set_piece_at(&mut self, file: u8, rank: u8, piece: Option<PieceRecord>) {
        let bit_index = (file as usize * BOARD_DIM as usize + rank as usize) * 4;
        let shift = (bit_index % 8) as u8;
        let nibble = piece.map_or(0, PieceRecord::nibble);

        let byte = &mut self.data[bit_index / 8];
        *byte &= !(HIGH_NIBBLE >> shift);
        *byte |= (HIGH_NIBBLE & (nibble << 4)) >> shift;
    }

    #[inline]
    pub fn is_empty(&self, file: u8, rank: u8) -> bool {
        self.get_piece_at(file, rank).is_none()
    }

    #[inline]
    pub fn is_color(&self, file: u8, rank: u8, color: Color) -> bool {
        matches!(self.get_piece_at(file, rank), Some(p) if p.color == color)
    }

    #[inline]
    pub fn is_other_color(&self, file: u8, rank: u8, color: Color) -> bool {
        matches!(self.get_piece_at(file, rank), Some(p) if p.color != color)
    }

    /// Overwrite the destination with the start piece and clear the start.
    /// No legality checking of any kind.
    pub fn move_piece_raw(&mut self, start_file: u8, start_rank: u8, end_file: u8, end_rank: u8) {
        let piece = self.get_piece_at(start_file, start_rank);
        self.set_piece_at(end_file, end_rank, piece);
        self.set_piece_at(start_file, start_rank, None);
    }

    /// Place a non-castle move on the board: promotion replacement, the
    /// en-passant victim removal, destination overwrite, source clear.
    fn place_move(&mut self, mv: &Move, mover: Color) {
        let end_piece = match mv.promotes_to {
            Some(kind) => Some(PieceRecord::new(kind, mover)),
            None => self.get_piece_at(mv.start_file, mv.start_rank),
        };

        self.set_piece_at(mv.end_file, mv.end_rank, end_piece);
        self.set_piece_at(mv.start_file, mv.start_rank, None);

        if mv.is_en_passant {
            let victim_rank = (mv.end_rank as i8 - mover.pawn_direction()) as u8;
            self.set_piece_at(mv.end_file, victim_rank, None);
        }
    }

    /// Material value of whatever this move would capture, before it is
    /// applied. En passant counts the removed pawn.
    pub fn capture_value(&self, mv: &Move) -> u32 {
        if mv.king_castle || mv.queen_castle {
            return 0;
        }
        if mv.is_en_passant {
            return PieceKind::Pawn.material_value();
        }
        self.get_piece_at(mv.end_file, mv.end_rank)
            .map_or(0, |p| p.kind.material_value())
    }

    /// Apply a pseudo-legal move for `mover` and return the resulting
    /// board, or `None` when the move would leave the mover's own king in
    /// check. The original board is never modified.
    pub fn apply_move(&self, mv: &Move, mover: Color) -> Option<Board> {
        let mut next = *self;
        let back_rank = mover.back_rank();

        if mv.queen_castle {
            next.move_piece_raw(4, back_rank, 2, back_rank);
            next.move_piece_raw(0, back_rank, 3, back_rank);
            next.special_move_flags &= !flags::both_castle_mask(mover);
            next.special_move_flags &= !(flags::CAN_EN_PASSANT | flags::EN_PASSANT_FILE_MASK);
        } else if mv.king_castle {
            next.move_piece_raw(4, back_rank, 6, back_rank);
            next.move_piece_raw(7, back_rank, 5, back_rank);
            next.special_move_flags &= !flags::both_castle_mask(mover);
            next.special_move_flags &= !(flags::CAN_EN_PASSANT | flags::EN_PASSANT_FILE_MASK);
        } else {
            // A king move forfeits both castle rights.
            if matches!(
                next.get_piece_at(mv.start_file, mv.start_rank),
                Some(p) if p.kind == PieceKind::King
            ) {
                next.special_move_flags &= !flags::both_castle_mask(mover);
            }

            // Vacating a rook's original square forfeits that side's right,
            // rook present or not; the clear is idempotent.
            if mv.start_file == 7 && mv.start_rank == back_rank {
                next.special_move_flags &= !flags::king_castle_mask(mover);
            } else if mv.start_file == 0 && mv.start_rank == back_rank {
                next.special_move_flags &= !flags::queen_castle_mask(mover);
            }

            next.place_move(mv, mover);

            next.special_move_flags =
                (next.special_move_flags & 0x0F) | (mv.en_passant_flags << 4);
        }

        if attacks::is_king_in_check(&next, mover) {
            None
        } else {
            Some(next)
        }
    }

    /// DJB2 over the 32 data bytes then the flag byte.
    pub fn djb2_hash(&self) -> u64 {
        let mut hash: u64 = 5381;
        for byte in &self.data {
            hash = hash.wrapping_mul(33).wrapping_add(*byte as u64);
        }
        hash.wrapping_mul(33).wrapping_add(self.special_move_flags as u64)
    }

    /// SDBM over the same 33 bytes.
    pub fn sdbm_hash(&self) -> u64 {
        let mut hash: u64 = 0;
        for byte in &self.data {
            hash = (*byte as u64)
                .wrapping_add(hash << 6)
                .wrapping_add(hash << 16)
                .wrapping_sub(hash);
        }
        (self.special_move_flags as u64)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash)
    }

    /// The hash used for position identity. Fixed to one function so every
    /// key produced during a run agrees.
    #[inline]
    pub fn position_hash(&self) -> u64 {
        self.djb2_hash()
    }

    /// True when a pawn sits on rank 0 or rank 7, which a legal move
    /// sequence can never produce (promotion is mandatory).
    pub fn has_invalid_pawns(&self) -> bool {
        (0..BOARD_DIM).any(|file| {
            matches!(self.get_piece_at(file, 0), Some(p) if p.kind == PieceKind::Pawn)
                || matches!(self.get_piece_at(file, 7), Some(p) if p.kind == PieceKind::Pawn)
        })
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::utils::board_text::render_board(self))
    }
}
