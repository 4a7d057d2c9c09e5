// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::move_generator::generator_for;
use crate::position::Position;
use crate::types::{Color, Square, TableIndex, SQUARES};

pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// A JumpTable holds, for every square, the on-board landing squares of a
// fixed set of offsets. Offsets that fall off the board are stored as None.
struct JumpTable {
    table: [[Option<Square>; 8]; 64],
}

impl JumpTable {
    pub fn new(offsets: &[(i32, i32); 8]) -> JumpTable {
        let mut jt = JumpTable {
            table: [[None; 8]; 64],
        };

        for &sq in SQUARES.iter() {
            for (slot, &(d_row, d_col)) in offsets.iter().enumerate() {
                jt.table[sq.as_index()][slot] = sq.offset(d_row, d_col);
            }
        }

        jt
    }

    pub fn targets(&self, sq: Square) -> impl Iterator<Item = Square> + '_ {
        self.table[sq.as_index()].iter().filter_map(|&target| target)
    }
}

struct PawnTable {
    table: [[[Option<Square>; 2]; 2]; 64],
}

impl PawnTable {
    pub fn new() -> PawnTable {
        let mut pt = PawnTable {
            table: [[[None; 2]; 2]; 64],
        };

        for &sq in SQUARES.iter() {
            for &color in &[Color::White, Color::Black] {
                let forward = color.pawn_direction();
                pt.table[sq.as_index()][color.as_index()] =
                    [sq.offset(forward, -1), sq.offset(forward, 1)];
            }
        }

        pt
    }

    pub fn attacks(&self, sq: Square, color: Color) -> impl Iterator<Item = Square> + '_ {
        self.table[sq.as_index()][color.as_index()]
            .iter()
            .filter_map(|&target| target)
    }
}

lazy_static! {
    static ref KNIGHT_TABLE: JumpTable = JumpTable::new(&KNIGHT_OFFSETS);
    static ref KING_TABLE: JumpTable = JumpTable::new(&KING_OFFSETS);
    static ref PAWN_TABLE: PawnTable = PawnTable::new();
}

/// Squares a knight on `sq` could jump to on an empty board.
pub fn knight_targets(sq: Square) -> impl Iterator<Item = Square> {
    KNIGHT_TABLE.targets(sq)
}

/// Squares a king on `sq` could step to on an empty board.
pub fn king_targets(sq: Square) -> impl Iterator<Item = Square> {
    KING_TABLE.targets(sq)
}

/// The (at most two) diagonal squares a pawn of the given color on `sq`
/// attacks, whether or not anything stands there.
pub fn pawn_attacks(sq: Square, color: Color) -> impl Iterator<Item = Square> {
    PAWN_TABLE.attacks(sq, color)
}

/// Returns whether any piece of color `attacker` attacks `target`.
///
/// Every piece of the attacking side is asked, through its entry in the move
/// generator table, whether it could move to `target`. Pawns are the one
/// exception to "could move there": they attack both forward diagonals even
/// when the square is empty, and never attack the square in front of them.
pub fn square_under_attack(pos: &Position, target: Square, attacker: Color) -> bool {
    SQUARES.iter().any(|&sq| match pos.piece_at(sq) {
        Some(piece) if piece.color == attacker => {
            generator_for(piece.kind).attacks(pos, sq, attacker, target)
        }
        _ => false,
    })
}
