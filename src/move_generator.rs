// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pseudo-legal move generation.
//!
//! Each piece kind has one generator, and `GENERATORS` maps a `PieceKind`
//! to it. Generators do not care whether the moving side's king is left in
//! check; that is the job of `Position::legal_moves`. Castling is not
//! produced here either, since it depends on attack information.
use arrayvec::ArrayVec;

use crate::attacks;
use crate::moves::Move;
use crate::position::Position;
use crate::types::{Color, PieceKind, Square, TableIndex};

pub const MAX_MOVES: usize = 512;

pub type MoveVec = ArrayVec<Move, MAX_MOVES>;

const ROOK_DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];
const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// The capability of generating pseudo-legal moves for one kind of piece.
pub trait PieceMoves: Sync {
    /// Pushes every pseudo-legal move of the `color` piece standing on
    /// `source` onto `moves`.
    fn generate(&self, pos: &Position, source: Square, color: Color, moves: &mut MoveVec);

    /// Returns whether the `color` piece on `source` attacks `target`. By
    /// default a piece attacks exactly the squares it can move to.
    fn attacks(&self, pos: &Position, source: Square, color: Color, target: Square) -> bool {
        let mut moves = MoveVec::new();
        self.generate(pos, source, color, &mut moves);
        moves.iter().any(|mov| mov.destination() == target)
    }
}

struct PawnMoves;
struct KnightMoves;
struct BishopMoves;
struct RookMoves;
struct QueenMoves;
struct KingMoves;

static GENERATORS: [&dyn PieceMoves; 6] = [
    &PawnMoves,
    &KnightMoves,
    &BishopMoves,
    &RookMoves,
    &QueenMoves,
    &KingMoves,
];

pub fn generator_for(kind: PieceKind) -> &'static dyn PieceMoves {
    GENERATORS[kind.as_index()]
}

// Casts a ray from `source` in each direction until it leaves the board,
// hits a friendly piece, or captures an enemy one.
fn slide(
    pos: &Position,
    source: Square,
    color: Color,
    directions: &[(i32, i32)],
    moves: &mut MoveVec,
) {
    for &(d_row, d_col) in directions {
        let mut cursor = source;
        while let Some(next) = cursor.offset(d_row, d_col) {
            match pos.piece_at(next) {
                None => moves.push(Move::normal(pos, source, next)),
                Some(piece) if piece.color != color => {
                    moves.push(Move::normal(pos, source, next));
                    break;
                }
                Some(_) => break,
            }

            cursor = next;
        }
    }
}

// Jumps to each target that is empty or holds an enemy piece.
fn jump<I>(pos: &Position, source: Square, color: Color, targets: I, moves: &mut MoveVec)
where
    I: Iterator<Item = Square>,
{
    for target in targets {
        match pos.piece_at(target) {
            Some(piece) if piece.color == color => {}
            _ => moves.push(Move::normal(pos, source, target)),
        }
    }
}

impl PieceMoves for PawnMoves {
    fn generate(&self, pos: &Position, source: Square, color: Color, moves: &mut MoveVec) {
        let forward = color.pawn_direction();
        if let Some(single) = source.offset(forward, 0) {
            if pos.piece_at(single).is_none() {
                moves.push(Move::normal(pos, source, single));
                if source.row() == color.pawn_start_row() {
                    if let Some(double) = single.offset(forward, 0) {
                        if pos.piece_at(double).is_none() {
                            moves.push(Move::normal(pos, source, double));
                        }
                    }
                }
            }
        }

        for &d_col in &[-1, 1] {
            let target = match source.offset(forward, d_col) {
                Some(target) => target,
                None => continue,
            };

            match pos.piece_at(target) {
                Some(piece) if piece.color != color => {
                    moves.push(Move::normal(pos, source, target));
                }
                None if pos.en_passant_square() == Some(target) => {
                    // The passed pawn sits beside us, on the square behind the target.
                    let victim = target
                        .offset(-forward, 0)
                        .and_then(|sq| pos.piece_at(sq));
                    match victim {
                        Some(piece) if piece.color != color && piece.kind == PieceKind::Pawn => {
                            moves.push(Move::en_passant(pos, source, target));
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    fn attacks(&self, _pos: &Position, source: Square, color: Color, target: Square) -> bool {
        attacks::pawn_attacks(source, color).any(|sq| sq == target)
    }
}

impl PieceMoves for KnightMoves {
    fn generate(&self, pos: &Position, source: Square, color: Color, moves: &mut MoveVec) {
        jump(pos, source, color, attacks::knight_targets(source), moves);
    }
}

impl PieceMoves for BishopMoves {
    fn generate(&self, pos: &Position, source: Square, color: Color, moves: &mut MoveVec) {
        slide(pos, source, color, &BISHOP_DIRECTIONS, moves);
    }
}

impl PieceMoves for RookMoves {
    fn generate(&self, pos: &Position, source: Square, color: Color, moves: &mut MoveVec) {
        slide(pos, source, color, &ROOK_DIRECTIONS, moves);
    }
}

impl PieceMoves for QueenMoves {
    fn generate(&self, pos: &Position, source: Square, color: Color, moves: &mut MoveVec) {
        slide(pos, source, color, &ROOK_DIRECTIONS, moves);
        slide(pos, source, color, &BISHOP_DIRECTIONS, moves);
    }
}

impl PieceMoves for KingMoves {
    fn generate(&self, pos: &Position, source: Square, color: Color, moves: &mut MoveVec) {
        jump(pos, source, color, attacks::king_targets(source), moves);
    }
}

/// Generates pseudo-legal moves for every piece of one side, scanning the
/// board row by row from the eighth rank.
#[derive(Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> MoveGenerator {
        MoveGenerator
    }

    /// Generates the pseudo-legal moves of the side to move.
    pub fn generate_moves(&self, pos: &Position, moves: &mut MoveVec) {
        self.generate_moves_for(pos, pos.side_to_move(), moves);
    }

    pub fn generate_moves_for(&self, pos: &Position, color: Color, moves: &mut MoveVec) {
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square::from_row_col(row, col);
                if let Some(piece) = pos.piece_at(sq) {
                    if piece.color == color {
                        generator_for(piece.kind).generate(pos, sq, color, moves);
                    }
                }
            }
        }
    }
}
