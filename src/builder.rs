// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Construction of arbitrary positions.
//!
//! A `PositionBuilder` collects a board, a side to move, castling rights and
//! an en-passant target, and checks that they describe a position that the
//! rules engine can reason about before handing out a `Position`. Boards can
//! be placed piece by piece or read from eight row strings, eighth rank first:
//!
//! ```
//! use castellan::{Color, PositionBuilder};
//!
//! let mut pos = PositionBuilder::from_rows([
//!     ".......k", "........", "......Q.", "........",
//!     "........", "........", "........", "K.......",
//! ])
//! .unwrap()
//! .side_to_move(Color::Black)
//! .build()
//! .unwrap();
//! assert!(pos.legal_moves().is_empty());
//! assert!(pos.stalemate());
//! ```
use std::convert::TryFrom;
use std::error::Error;
use std::fmt;

use crate::position::{self, Board, Position};
use crate::types::{CastleRights, Color, Piece, PieceKind, Square, COLORS, SQUARES};

/// Possible errors that can arise when building a position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SetupError {
    MissingKing(Color),
    TooManyKings(Color),
    PawnOnBackRank(Square),
    InvalidCastleRights,
    InvalidEnPassant(Square),
    InvalidRowLength(usize),
    UnknownPiece(char),
    OpponentInCheck,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SetupError::MissingKing(color) => write!(f, "{:?} has no king", color),
            SetupError::TooManyKings(color) => write!(f, "{:?} has more than one king", color),
            SetupError::PawnOnBackRank(sq) => write!(f, "pawn on back rank square {}", sq),
            SetupError::InvalidCastleRights => {
                write!(f, "castle rights without king and rook on their starting squares")
            }
            SetupError::InvalidEnPassant(sq) => write!(f, "invalid en passant square {}", sq),
            SetupError::InvalidRowLength(row) => write!(f, "row {} is not eight squares long", row),
            SetupError::UnknownPiece(c) => write!(f, "unknown piece character '{}'", c),
            SetupError::OpponentInCheck => write!(f, "side not to move is in check"),
        }
    }
}

impl Error for SetupError {}

#[derive(Clone, Debug)]
pub struct PositionBuilder {
    board: Board,
    side_to_move: Color,
    castle_rights: CastleRights,
    en_passant_square: Option<Square>,
}

impl PositionBuilder {
    /// An empty board with White to move and no castling rights.
    pub fn new() -> PositionBuilder {
        PositionBuilder {
            board: [[None; 8]; 8],
            side_to_move: Color::White,
            castle_rights: CastleRights::NONE,
            en_passant_square: None,
        }
    }

    /// Reads a board from eight strings of eight characters, the eighth rank
    /// first. `.` and `-` are empty squares, `PNBRQK` are White pieces and
    /// `pnbrqk` Black ones.
    pub fn from_rows(rows: [&str; 8]) -> Result<PositionBuilder, SetupError> {
        let mut builder = PositionBuilder::new();
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != 8 {
                return Err(SetupError::InvalidRowLength(row));
            }

            for (col, c) in line.chars().enumerate() {
                builder.board[row][col] = match c {
                    '.' | '-' => None,
                    _ => Some(Piece::try_from(c).map_err(|_| SetupError::UnknownPiece(c))?),
                };
            }
        }

        Ok(builder)
    }

    pub fn piece(mut self, square: Square, piece: Piece) -> PositionBuilder {
        self.board[square.row()][square.col()] = Some(piece);
        self
    }

    pub fn clear(mut self, square: Square) -> PositionBuilder {
        self.board[square.row()][square.col()] = None;
        self
    }

    pub fn side_to_move(mut self, color: Color) -> PositionBuilder {
        self.side_to_move = color;
        self
    }

    pub fn castle_rights(mut self, rights: CastleRights) -> PositionBuilder {
        self.castle_rights = rights;
        self
    }

    pub fn en_passant(mut self, square: Option<Square>) -> PositionBuilder {
        self.en_passant_square = square;
        self
    }

    /// Validates the collected state and produces a `Position`.
    pub fn build(self) -> Result<Position, SetupError> {
        self.check_kings()?;
        self.check_pawns()?;
        self.check_castle_rights()?;
        self.check_en_passant()?;

        let pos = Position::from_parts(
            self.board,
            self.side_to_move,
            self.castle_rights,
            self.en_passant_square,
        );
        if pos.is_king_attacked(self.side_to_move.toggle()) {
            return Err(SetupError::OpponentInCheck);
        }

        debug!("built position with {:?} to move", self.side_to_move);
        Ok(pos)
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.row()][square.col()]
    }

    fn check_kings(&self) -> Result<(), SetupError> {
        for &color in COLORS.iter() {
            let king = Some(Piece::new(PieceKind::King, color));
            let count = SQUARES
                .iter()
                .filter(|&&sq| self.piece_at(sq) == king)
                .count();
            match count {
                0 => return Err(SetupError::MissingKing(color)),
                1 => {}
                _ => return Err(SetupError::TooManyKings(color)),
            }
        }

        Ok(())
    }

    fn check_pawns(&self) -> Result<(), SetupError> {
        for &sq in SQUARES.iter() {
            if let Some(Piece {
                kind: PieceKind::Pawn,
                ..
            }) = self.piece_at(sq)
            {
                if sq.row() == 0 || sq.row() == 7 {
                    return Err(SetupError::PawnOnBackRank(sq));
                }
            }
        }

        Ok(())
    }

    fn check_castle_rights(&self) -> Result<(), SetupError> {
        for &color in COLORS.iter() {
            let king = Some(Piece::new(PieceKind::King, color));
            let rook = Some(Piece::new(PieceKind::Rook, color));
            let sides = [
                (CastleRights::kingside(color), position::kingside_rook(color)),
                (CastleRights::queenside(color), position::queenside_rook(color)),
            ];
            for &(right, corner) in sides.iter() {
                if !self.castle_rights.contains(right) {
                    continue;
                }

                if self.piece_at(position::king_start(color)) != king
                    || self.piece_at(corner) != rook
                {
                    return Err(SetupError::InvalidCastleRights);
                }
            }
        }

        Ok(())
    }

    // The target must be the empty square a pawn of the side not to move just
    // skipped over, with that pawn standing right behind it.
    fn check_en_passant(&self) -> Result<(), SetupError> {
        let target = match self.en_passant_square {
            Some(target) => target,
            None => return Ok(()),
        };

        let side = self.side_to_move;
        let expected_row = match side {
            Color::White => 2,
            Color::Black => 5,
        };
        let pawn = target
            .offset(-side.pawn_direction(), 0)
            .and_then(|sq| self.piece_at(sq));
        if target.row() != expected_row
            || self.piece_at(target).is_some()
            || pawn != Some(Piece::new(PieceKind::Pawn, side.toggle()))
        {
            return Err(SetupError::InvalidEnPassant(target));
        }

        Ok(())
    }
}

impl Default for PositionBuilder {
    fn default() -> Self {
        PositionBuilder::new()
    }
}
