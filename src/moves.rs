// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `moves` module contains the definition of a Move.
//!
//! A move records everything needed to apply it to a position and to take it
//! back again: the two squares, the piece that moved, the piece (if any) that
//! was captured, and three flags for the special moves:
//!
//! | Flag         | Meaning                                                   |
//! |--------------|-----------------------------------------------------------|
//! | promotion    | a pawn reaches the far rank; it always becomes a queen    |
//! | en passant   | a pawn captures the pawn that just passed it              |
//! | castle       | the king moves two files and the rook jumps over it       |
//!
//! Two moves compare equal when their source and destination squares agree.
//! Within the moves generated for a single position no two moves share both
//! squares, so this is enough to identify a move.
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::position::Position;
use crate::types::{Color, Piece, PieceKind, Square};

#[derive(Copy, Clone, Debug)]
pub struct Move {
    source: Square,
    destination: Square,
    piece_moved: Piece,
    piece_captured: Option<Piece>,
    is_promotion: bool,
    is_en_passant: bool,
    is_castle: bool,
}

impl Move {
    /// Constructs an ordinary move (a quiet move or a capture) from the
    /// pieces currently standing on `source` and `dest`. Pawn moves onto the
    /// far rank are flagged as promotions.
    pub fn normal(pos: &Position, source: Square, dest: Square) -> Move {
        let piece_moved = pos
            .piece_at(source)
            .expect("invalid move: no piece at source square");
        let is_promotion =
            piece_moved.kind == PieceKind::Pawn && dest.row() == piece_moved.color.promotion_row();
        Move {
            source,
            destination: dest,
            piece_moved,
            piece_captured: pos.piece_at(dest),
            is_promotion,
            is_en_passant: false,
            is_castle: false,
        }
    }

    /// Constructs an en-passant capture. The captured pawn does not stand on
    /// the destination square, but it is recorded so the move can be undone.
    pub fn en_passant(pos: &Position, source: Square, dest: Square) -> Move {
        let mut mov = Move::normal(pos, source, dest);
        let victim = mov.piece_moved.color.toggle();
        mov.piece_captured = Some(Piece::new(PieceKind::Pawn, victim));
        mov.is_en_passant = true;
        mov
    }

    /// Constructs a castle, encoded as the king's two-file move.
    pub fn castle(pos: &Position, source: Square, dest: Square) -> Move {
        let mut mov = Move::normal(pos, source, dest);
        mov.is_castle = true;
        mov
    }

    pub fn source(self) -> Square {
        self.source
    }

    pub fn destination(self) -> Square {
        self.destination
    }

    pub fn piece_moved(self) -> Piece {
        self.piece_moved
    }

    pub fn piece_captured(self) -> Option<Piece> {
        self.piece_captured
    }

    pub fn color(self) -> Color {
        self.piece_moved.color
    }

    pub fn is_capture(self) -> bool {
        self.piece_captured.is_some()
    }

    pub fn is_promotion(self) -> bool {
        self.is_promotion
    }

    pub fn is_en_passant(self) -> bool {
        self.is_en_passant
    }

    pub fn is_castle(self) -> bool {
        self.is_castle
    }

    pub fn is_kingside_castle(self) -> bool {
        self.is_castle && self.destination.col() > self.source.col()
    }

    pub fn is_queenside_castle(self) -> bool {
        self.is_castle && self.destination.col() < self.source.col()
    }

    pub fn is_double_pawn_push(self) -> bool {
        self.piece_moved.kind == PieceKind::Pawn
            && (self.source.row() as i32 - self.destination.row() as i32).abs() == 2
    }

    /// The identity key of this move: start row, start column, end row and
    /// end column packed as decimal digits.
    pub fn id(self) -> u32 {
        (self.source.row() * 1000
            + self.source.col() * 100
            + self.destination.row() * 10
            + self.destination.col()) as u32
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Move) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.source, self.destination)
    }
}

// Moves serialize as their coordinate form.
impl Serialize for Move {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
