// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::convert::TryFrom;
use std::fmt;

use crate::attacks;
use crate::move_generator::{MoveGenerator, MoveVec};
use crate::moves::Move;
use crate::types::TableIndex;
use crate::types::{CastleRights, Color, Piece, PieceKind, Square};

pub type Board = [[Option<Piece>; 8]; 8];

const START_ROWS: [&str; 8] = [
    "rnbqkbnr", "pppppppp", "........", "........", "........", "........", "PPPPPPPP",
    "RNBQKBNR",
];

// The parts of a position that a move destroys and cannot recompute when it
// is taken back. One entry is pushed for every applied move, on top of the
// entry describing the position before any move was made.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct IrreversibleState {
    castle_rights: CastleRights,
    en_passant_square: Option<Square>,
}

/// The authoritative state of a game: the board, whose turn it is, castling
/// and en-passant state, and the history needed to take moves back.
///
/// A `Position` is only ever changed through `apply_move` and `undo_move`.
/// `legal_moves` uses the same pair internally to try out every candidate, so
/// a `Position` must not be shared while it is generating moves. Clone it to
/// hand an independent copy to another thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    king_squares: [Square; 2],
    en_passant_square: Option<Square>,
    castle_rights: CastleRights,
    state_history: Vec<IrreversibleState>,
    move_history: Vec<Move>,
    checkmate: bool,
    stalemate: bool,
}

//
// Board state getters
//

impl Position {
    /// The standard starting position, White to move, all castling rights held.
    pub fn new() -> Position {
        let mut board: Board = [[None; 8]; 8];
        for (row, line) in START_ROWS.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                board[row][col] = Piece::try_from(c).ok();
            }
        }

        Position::from_parts(board, Color::White, CastleRights::ALL, None)
    }

    // Builds a position around an already validated board. Exactly one king of
    // each color must be on it.
    pub(crate) fn from_parts(
        board: Board,
        side_to_move: Color,
        castle_rights: CastleRights,
        en_passant_square: Option<Square>,
    ) -> Position {
        let mut king_squares = [Square::E1, Square::E8];
        for (row, cells) in board.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some(Piece {
                    kind: PieceKind::King,
                    color,
                }) = *cell
                {
                    king_squares[color.as_index()] = Square::from_row_col(row, col);
                }
            }
        }

        Position {
            board,
            side_to_move,
            king_squares,
            en_passant_square,
            castle_rights,
            state_history: vec![IrreversibleState {
                castle_rights,
                en_passant_square,
            }],
            move_history: vec![],
            checkmate: false,
            stalemate: false,
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.row()][square.col()]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.as_index()]
    }

    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    pub fn castle_rights(&self) -> CastleRights {
        self.castle_rights
    }

    pub fn can_castle_kingside(&self, color: Color) -> bool {
        self.castle_rights.contains(CastleRights::kingside(color))
    }

    pub fn can_castle_queenside(&self, color: Color) -> bool {
        self.castle_rights.contains(CastleRights::queenside(color))
    }

    /// Moves applied so far, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.move_history
    }

    pub fn last_move(&self) -> Option<Move> {
        self.move_history.last().copied()
    }

    /// True if the last call to `legal_moves` found no moves with the side to
    /// move in check.
    pub fn checkmate(&self) -> bool {
        self.checkmate
    }

    /// True if the last call to `legal_moves` found no moves with the side to
    /// move not in check.
    pub fn stalemate(&self) -> bool {
        self.stalemate
    }

    fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.board[square.row()][square.col()] = piece;
    }

    fn irreversible_state(&self) -> IrreversibleState {
        IrreversibleState {
            castle_rights: self.castle_rights,
            en_passant_square: self.en_passant_square,
        }
    }

    fn restore(&mut self, state: IrreversibleState) {
        self.castle_rights = state.castle_rights;
        self.en_passant_square = state.en_passant_square;
    }
}

//
// Move application and undo
//

impl Position {
    /// Applies a move produced by `legal_moves`. Moves from anywhere else are
    /// not validated and leave the position in an unspecified state.
    pub fn apply_move(&mut self, mov: Move) {
        trace!("apply {}", mov);
        let source = mov.source();
        let dest = mov.destination();
        let moving_piece = mov.piece_moved();
        let color = moving_piece.color;

        self.set(source, None);
        self.set(dest, Some(moving_piece));
        self.move_history.push(mov);
        self.side_to_move = self.side_to_move.toggle();
        if moving_piece.kind == PieceKind::King {
            self.king_squares[color.as_index()] = dest;
        }

        // Pawns always promote to a queen.
        if mov.is_promotion() {
            self.set(dest, Some(Piece::new(PieceKind::Queen, color)));
        }

        if mov.is_en_passant() {
            self.set(en_passant_victim(mov), None);
        }

        self.en_passant_square = if mov.is_double_pawn_push() {
            Some(Square::from_row_col(
                (source.row() + dest.row()) / 2,
                source.col(),
            ))
        } else {
            None
        };

        if mov.is_castle() {
            let (rook_start, rook_end) = castle_rook_squares(mov);
            let rook = self.piece_at(rook_start);
            self.set(rook_start, None);
            self.set(rook_end, rook);
        }

        self.update_castle_rights(mov);
        let state = self.irreversible_state();
        self.state_history.push(state);
    }

    /// Takes back the most recently applied move and returns it. Does nothing
    /// and returns None if no move has been applied.
    pub fn undo_move(&mut self) -> Option<Move> {
        let mov = match self.move_history.pop() {
            Some(mov) => mov,
            None => {
                warn!("undo requested with an empty move history");
                return None;
            }
        };

        trace!("undo {}", mov);
        let source = mov.source();
        let dest = mov.destination();
        let moving_piece = mov.piece_moved();

        self.set(source, Some(moving_piece));
        self.set(dest, mov.piece_captured());
        self.side_to_move = self.side_to_move.toggle();
        if moving_piece.kind == PieceKind::King {
            self.king_squares[moving_piece.color.as_index()] = source;
        }

        if mov.is_en_passant() {
            self.set(dest, None);
            self.set(en_passant_victim(mov), mov.piece_captured());
        }

        self.state_history.pop();
        debug_assert!(
            !self.state_history.is_empty(),
            "state history lost its initial entry"
        );
        if let Some(&previous) = self.state_history.last() {
            self.restore(previous);
        }

        if mov.is_castle() {
            let (rook_start, rook_end) = castle_rook_squares(mov);
            let rook = self.piece_at(rook_end);
            self.set(rook_end, None);
            self.set(rook_start, rook);
        }

        Some(mov)
    }

    // Rights are only ever revoked here. A king move gives up both sides, a
    // rook leaving its corner gives up that side, and a rook captured on its
    // corner takes its owner's right on that side with it.
    fn update_castle_rights(&mut self, mov: Move) {
        let moving_piece = mov.piece_moved();
        let color = moving_piece.color;
        match moving_piece.kind {
            PieceKind::King => self.castle_rights.remove(CastleRights::both(color)),
            PieceKind::Rook => {
                if mov.source() == queenside_rook(color) {
                    self.castle_rights.remove(CastleRights::queenside(color));
                } else if mov.source() == kingside_rook(color) {
                    self.castle_rights.remove(CastleRights::kingside(color));
                }
            }
            _ => {}
        }

        if let Some(captured) = mov.piece_captured() {
            if captured.kind == PieceKind::Rook {
                if mov.destination() == queenside_rook(captured.color) {
                    self.castle_rights
                        .remove(CastleRights::queenside(captured.color));
                } else if mov.destination() == kingside_rook(captured.color) {
                    self.castle_rights
                        .remove(CastleRights::kingside(captured.color));
                }
            }
        }
    }
}

//
// Board analysis (check detection, legal move generation)
//

impl Position {
    /// Returns whether `square` is attacked by any piece of color `attacker`.
    pub fn square_under_attack(&self, square: Square, attacker: Color) -> bool {
        attacks::square_under_attack(self, square, attacker)
    }

    /// Returns whether the king of the given color is attacked.
    pub fn is_king_attacked(&self, color: Color) -> bool {
        self.square_under_attack(self.king_square(color), color.toggle())
    }

    /// Returns whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.is_king_attacked(self.side_to_move)
    }

    /// All moves the side to move could make, ignoring the safety of its own
    /// king. Castling is not included.
    pub fn pseudolegal_moves(&self) -> MoveVec {
        let mut moves = MoveVec::new();
        MoveGenerator::new().generate_moves(self, &mut moves);
        moves
    }

    /// Generates the legal moves of the side to move.
    ///
    /// Every pseudo-legal candidate is applied, kept only if the mover's king
    /// is not attacked afterwards, and undone again. Castling moves are then
    /// appended. When no move is left the position is terminal, and the
    /// `checkmate` or `stalemate` flag is set accordingly. Apart from those
    /// flags the position is unchanged when this returns.
    pub fn legal_moves(&mut self) -> MoveVec {
        let saved = self.irreversible_state();
        let mover = self.side_to_move;
        let mut moves = self.pseudolegal_moves();
        let candidates = moves.len();
        moves.retain(|mov| {
            self.apply_move(*mov);
            let legal = !self.is_king_attacked(mover);
            self.undo_move();
            legal
        });

        self.castle_moves(&mut moves);
        self.restore(saved);

        let terminal = moves.is_empty();
        let in_check = self.is_check();
        self.checkmate = terminal && in_check;
        self.stalemate = terminal && !in_check;
        debug!(
            "{} legal of {} pseudo-legal moves for {:?}",
            moves.len(),
            candidates,
            mover
        );
        if self.checkmate {
            debug!("{:?} is checkmated", mover);
        } else if self.stalemate {
            debug!("{:?} is stalemated", mover);
        }

        moves
    }

    // Appends the castles available to the side to move. The king must not be
    // in check, every square between king and rook must be empty, and neither
    // square the king crosses or lands on may be attacked.
    fn castle_moves(&self, moves: &mut MoveVec) {
        let color = self.side_to_move;
        let enemy = color.toggle();
        let king = self.king_square(color);
        if self.square_under_attack(king, enemy) {
            return;
        }

        if self.can_castle_kingside(color) && self.castle_path_clear(king, &[1, 2], &[1, 2]) {
            if let Some(dest) = king.offset(0, 2) {
                moves.push(Move::castle(self, king, dest));
            }
        }

        if self.can_castle_queenside(color)
            && self.castle_path_clear(king, &[-1, -2, -3], &[-1, -2])
        {
            if let Some(dest) = king.offset(0, -2) {
                moves.push(Move::castle(self, king, dest));
            }
        }
    }

    fn castle_path_clear(&self, king: Square, empty: &[i32], safe: &[i32]) -> bool {
        let enemy = self.side_to_move.toggle();
        let all_empty = empty.iter().all(|&d_col| match king.offset(0, d_col) {
            Some(sq) => self.piece_at(sq).is_none(),
            None => false,
        });
        all_empty
            && safe.iter().all(|&d_col| match king.offset(0, d_col) {
                Some(sq) => !self.square_under_attack(sq, enemy),
                None => false,
            })
    }
}

//
// Trait implementations
//

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square::from_row_col(row, col);
                if let Some(piece) = self.piece_at(sq) {
                    write!(f, " {} ", piece)?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f, "| {}", Square::from_row_col(row, 0).rank())?;
        }

        for _ in 0..8 {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for col in 0..8 {
            write!(f, " {} ", Square::from_row_col(7, col).file())?;
        }

        writeln!(f)?;
        Ok(())
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}

//
// Helper functions
//

pub(crate) fn kingside_rook(color: Color) -> Square {
    Square::from_row_col(color.back_row(), 7)
}

pub(crate) fn queenside_rook(color: Color) -> Square {
    Square::from_row_col(color.back_row(), 0)
}

pub(crate) fn king_start(color: Color) -> Square {
    Square::from_row_col(color.back_row(), 4)
}

// The pawn taken en passant stands beside the capturing pawn's start square,
// on the destination's file.
fn en_passant_victim(mov: Move) -> Square {
    Square::from_row_col(mov.source().row(), mov.destination().col())
}

// Where the rook starts and ends for a castle. Kingside, the rook comes from
// the corner right of the king's destination and lands just left of it.
// Queenside, it comes from two files left of the destination and lands just
// right of it.
fn castle_rook_squares(mov: Move) -> (Square, Square) {
    let row = mov.destination().row();
    let col = mov.destination().col();
    if mov.is_kingside_castle() {
        (
            Square::from_row_col(row, col + 1),
            Square::from_row_col(row, col - 1),
        )
    } else {
        (
            Square::from_row_col(row, col - 2),
            Square::from_row_col(row, col + 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::moves::Move;
    use crate::position::Position;
    use crate::types::{CastleRights, Color, Piece, PieceKind, Square};

    // Applies the legal move whose coordinate form is `text`.
    fn play(pos: &mut Position, text: &str) -> Move {
        let mov = pos
            .legal_moves()
            .iter()
            .copied()
            .find(|m| m.to_string() == text)
            .unwrap_or_else(|| panic!("{} is not a legal move", text));
        pos.apply_move(mov);
        mov
    }

    fn has_move(pos: &mut Position, text: &str) -> bool {
        pos.legal_moves().iter().any(|m| m.to_string() == text)
    }

    #[test]
    fn new_game() {
        let pos = Position::new();
        assert_eq!(Color::White, pos.side_to_move());
        assert_eq!(CastleRights::ALL, pos.castle_rights());
        assert_eq!(None, pos.en_passant_square());
        assert!(pos.history().is_empty());
        assert_eq!(Square::E1, pos.king_square(Color::White));
        assert_eq!(Square::E8, pos.king_square(Color::Black));
        assert_eq!(
            Some(Piece::new(PieceKind::Queen, Color::White)),
            pos.piece_at(Square::D1)
        );
        assert_eq!(
            Some(Piece::new(PieceKind::Knight, Color::Black)),
            pos.piece_at(Square::G8)
        );
        assert!(!pos.checkmate());
        assert!(!pos.stalemate());
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let mut pos = Position::new();
        let before = pos.clone();
        assert_eq!(20, pos.legal_moves().len());
        assert_eq!(before, pos);
    }

    #[test]
    fn display_smoke() {
        let rendered = Position::new().to_string();
        let first = rendered.lines().next().unwrap();
        assert_eq!(" r  n  b  q  k  b  n  r | 8", first);
        assert!(rendered.lines().last().unwrap().starts_with(" a  b "));
    }

    mod apply {
        use super::play;
        use crate::builder::PositionBuilder;
        use crate::position::Position;
        use crate::types::{CastleRights, Color, Piece, PieceKind, Square};

        #[test]
        fn opening_pawn() {
            let mut pos = Position::new();
            play(&mut pos, "e2e3");

            assert_eq!(Color::Black, pos.side_to_move());
            let pawn = pos.piece_at(Square::E3).unwrap();
            assert_eq!(PieceKind::Pawn, pawn.kind);
            assert_eq!(Color::White, pawn.color);
            assert!(pos.piece_at(Square::E2).is_none());
            assert_eq!(1, pos.history().len());
        }

        #[test]
        fn double_pawn_push_sets_ep() {
            let mut pos = Position::new();
            play(&mut pos, "e2e4");
            assert_eq!(Some(Square::E3), pos.en_passant_square());

            play(&mut pos, "g8f6");
            assert_eq!(None, pos.en_passant_square());

            play(&mut pos, "b1c3");
            play(&mut pos, "d7d5");
            assert_eq!(Some(Square::D6), pos.en_passant_square());
        }

        #[test]
        fn en_passant_capture() {
            let mut pos = Position::new();
            for mov in &["e2e4", "a7a6", "e4e5", "d7d5"] {
                play(&mut pos, mov);
            }

            let ep = play(&mut pos, "e5d6");
            assert!(ep.is_en_passant());
            assert!(pos.piece_at(Square::D5).is_none());
            assert_eq!(
                Some(Piece::new(PieceKind::Pawn, Color::White)),
                pos.piece_at(Square::D6)
            );
            assert_eq!(None, pos.en_passant_square());
        }

        #[test]
        fn en_passant_expires() {
            let mut pos = Position::new();
            for mov in &["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"] {
                play(&mut pos, mov);
            }

            assert!(!pos.legal_moves().iter().any(|m| m.is_en_passant()));
        }

        #[test]
        fn promotion_makes_queen() {
            let mut pos = PositionBuilder::from_rows([
                "........", "P...k...", "........", "........", "........", "........",
                ".......p", "K.......",
            ])
            .unwrap()
            .build()
            .unwrap();

            play(&mut pos, "a7a8");
            assert_eq!(
                Some(Piece::new(PieceKind::Queen, Color::White)),
                pos.piece_at(Square::A8)
            );

            play(&mut pos, "h2h1");
            assert_eq!(
                Some(Piece::new(PieceKind::Queen, Color::Black)),
                pos.piece_at(Square::H1)
            );
        }

        #[test]
        fn kingside_castle() {
            let mut pos = PositionBuilder::from_rows([
                "....k...", "........", "........", "........", "........", "........",
                "........", "....K..R",
            ])
            .unwrap()
            .castle_rights(CastleRights::WHITE_KINGSIDE)
            .build()
            .unwrap();

            let castle = play(&mut pos, "e1g1");
            assert!(castle.is_kingside_castle());
            assert_eq!(
                Some(Piece::new(PieceKind::Rook, Color::White)),
                pos.piece_at(Square::F1)
            );
            assert_eq!(
                Some(Piece::new(PieceKind::King, Color::White)),
                pos.piece_at(Square::G1)
            );
            assert!(pos.piece_at(Square::H1).is_none());
            assert_eq!(Square::G1, pos.king_square(Color::White));
            assert!(!pos.can_castle_kingside(Color::White));
        }

        #[test]
        fn queenside_castle() {
            let mut pos = PositionBuilder::from_rows([
                "r...k...", "........", "........", "........", "........", "........",
                "........", "....K...",
            ])
            .unwrap()
            .side_to_move(Color::Black)
            .castle_rights(CastleRights::BLACK_QUEENSIDE)
            .build()
            .unwrap();

            let castle = play(&mut pos, "e8c8");
            assert!(castle.is_queenside_castle());
            assert_eq!(
                Some(Piece::new(PieceKind::Rook, Color::Black)),
                pos.piece_at(Square::D8)
            );
            assert_eq!(
                Some(Piece::new(PieceKind::King, Color::Black)),
                pos.piece_at(Square::C8)
            );
            assert!(pos.piece_at(Square::A8).is_none());
            assert_eq!(Square::C8, pos.king_square(Color::Black));
        }

        #[test]
        fn moving_king_castle_status() {
            let mut pos = PositionBuilder::from_rows([
                "....k...", "........", "........", "........", "........", "........",
                "........", "R...K..R",
            ])
            .unwrap()
            .castle_rights(CastleRights::WHITE)
            .build()
            .unwrap();

            play(&mut pos, "e1e2");
            assert!(!pos.can_castle_kingside(Color::White));
            assert!(!pos.can_castle_queenside(Color::White));
        }

        #[test]
        fn moving_rooks_castle_status() {
            let mut pos = PositionBuilder::from_rows([
                "....k...", "........", "........", "........", "........", "........",
                "........", "R...K..R",
            ])
            .unwrap()
            .castle_rights(CastleRights::WHITE)
            .build()
            .unwrap();

            play(&mut pos, "h1g1");
            assert!(!pos.can_castle_kingside(Color::White));
            assert!(pos.can_castle_queenside(Color::White));

            play(&mut pos, "e8e7");
            play(&mut pos, "a1b1");
            assert!(!pos.can_castle_queenside(Color::White));
        }

        #[test]
        fn rights_never_come_back() {
            let mut pos = PositionBuilder::from_rows([
                "....k...", "........", "........", "........", "........", "........",
                "........", "....K..R",
            ])
            .unwrap()
            .castle_rights(CastleRights::WHITE_KINGSIDE)
            .build()
            .unwrap();

            play(&mut pos, "h1h2");
            play(&mut pos, "e8e7");
            play(&mut pos, "h2h1");
            assert!(!pos.can_castle_kingside(Color::White));
        }

        #[test]
        fn rook_capture_castle_status() {
            let mut pos = PositionBuilder::from_rows([
                "....k...", "........", "........", "........", "........", ".......r",
                "........", "R...K..R",
            ])
            .unwrap()
            .side_to_move(Color::Black)
            .castle_rights(CastleRights::WHITE)
            .build()
            .unwrap();

            play(&mut pos, "h3h1");
            assert!(!pos.can_castle_kingside(Color::White));
            assert!(pos.can_castle_queenside(Color::White));
        }
    }

    mod undo {
        use super::play;
        use crate::position::Position;
        use crate::types::{CastleRights, Color, Square};

        #[test]
        fn empty_history_is_noop() {
            let mut pos = Position::new();
            let before = pos.clone();
            assert_eq!(None, pos.undo_move());
            assert_eq!(before, pos);
        }

        #[test]
        fn undo_restores_everything() {
            let mut pos = Position::new();
            let mut snapshots = vec![pos.clone()];
            for mov in &[
                "e2e4", "d7d5", "e4d5", "g8f6", "g1f3", "f6d5", "f1c4", "c8g4", "e1g1",
            ] {
                play(&mut pos, mov);
                snapshots.push(pos.clone());
            }

            assert_eq!(Square::G1, pos.king_square(Color::White));
            snapshots.pop();
            while let Some(expected) = snapshots.pop() {
                assert!(pos.undo_move().is_some());
                assert_eq!(expected, pos);
            }

            assert_eq!(Position::new(), pos);
            assert_eq!(CastleRights::ALL, pos.castle_rights());
        }

        #[test]
        fn undo_en_passant_restores_target() {
            let mut pos = Position::new();
            for mov in &["e2e4", "a7a6", "e4e5", "d7d5"] {
                play(&mut pos, mov);
            }

            let before = pos.clone();
            play(&mut pos, "e5d6");
            pos.undo_move();
            assert_eq!(before, pos);
            assert_eq!(Some(Square::D6), pos.en_passant_square());
        }

        #[test]
        fn undo_reply_to_double_push_restores_target() {
            let mut pos = Position::new();
            play(&mut pos, "e2e4");
            play(&mut pos, "e7e5");
            pos.undo_move();
            assert_eq!(Some(Square::E3), pos.en_passant_square());
        }

        #[test]
        fn undo_double_push_clears_target() {
            let mut pos = Position::new();
            play(&mut pos, "e2e4");
            pos.undo_move();
            assert_eq!(None, pos.en_passant_square());
        }
    }

    mod legality {
        use super::has_move;
        use crate::builder::PositionBuilder;
        use crate::types::Color;

        #[test]
        fn pinned_piece_cannot_leave_line() {
            let mut pos = PositionBuilder::from_rows([
                "....r..k", "........", "........", "........", "........", "........",
                "....B...", "....K...",
            ])
            .unwrap()
            .build()
            .unwrap();
            let moves = pos.legal_moves();
            assert!(moves.iter().all(|m| m.source() != crate::types::Square::E2));
        }

        #[test]
        fn king_cannot_step_into_attack() {
            let mut pos = PositionBuilder::from_rows([
                ".......k", "........", "........", "........", "........", "........",
                "...r....", "....K...",
            ])
            .unwrap()
            .build()
            .unwrap();
            assert!(has_move(&mut pos, "e1d2"));
            assert!(!has_move(&mut pos, "e1e2"));
            assert!(!has_move(&mut pos, "e1d1"));
            assert!(has_move(&mut pos, "e1f1"));
        }

        #[test]
        fn must_answer_check() {
            let mut pos = PositionBuilder::from_rows([
                "....r..k", "........", "........", "........", "........", "........",
                "PPP.....", ".N..K...",
            ])
            .unwrap()
            .build()
            .unwrap();
            assert!(pos.is_check());
            let moves = pos.legal_moves();
            assert!(!moves.is_empty());
            for &mov in moves.iter() {
                pos.apply_move(mov);
                assert!(!pos.is_king_attacked(Color::White), "{} leaves check", mov);
                pos.undo_move();
            }
        }

        #[test]
        fn en_passant_discovered_check_is_illegal() {
            // Taking en passant would clear the fifth rank between the rook and
            // the king.
            let mut pos = PositionBuilder::from_rows([
                "....k...", "........", "........", "K..pP..r", "........", "........",
                "........", "........",
            ])
            .unwrap()
            .en_passant(Some(crate::types::Square::D6))
            .build()
            .unwrap();
            assert!(!has_move(&mut pos, "e5d6"));
            assert!(has_move(&mut pos, "e5e6"));
        }
    }

    mod castling {
        use super::has_move;
        use crate::builder::PositionBuilder;
        use crate::types::{CastleRights, Color};

        fn castle_position(rows: [&str; 8]) -> crate::position::Position {
            PositionBuilder::from_rows(rows)
                .unwrap()
                .castle_rights(CastleRights::WHITE)
                .build()
                .unwrap()
        }

        #[test]
        fn both_sides_available() {
            let mut pos = castle_position([
                "....k...", "........", "........", "........", "........", "........",
                "........", "R...K..R",
            ]);
            assert!(has_move(&mut pos, "e1g1"));
            assert!(has_move(&mut pos, "e1c1"));
            let castles = pos.legal_moves().iter().filter(|m| m.is_castle()).count();
            assert_eq!(2, castles);
        }

        #[test]
        fn not_without_rights() {
            let mut pos = PositionBuilder::from_rows([
                "....k...", "........", "........", "........", "........", "........",
                "........", "R...K..R",
            ])
            .unwrap()
            .castle_rights(CastleRights::WHITE_QUEENSIDE)
            .build()
            .unwrap();
            assert!(!has_move(&mut pos, "e1g1"));
            assert!(has_move(&mut pos, "e1c1"));
        }

        #[test]
        fn not_while_in_check() {
            let mut pos = castle_position([
                "....k...", "........", "........", "........", "....r...", "........",
                "........", "R...K..R",
            ]);
            assert!(!has_move(&mut pos, "e1g1"));
            assert!(!has_move(&mut pos, "e1c1"));
        }

        #[test]
        fn not_through_attacked_square() {
            let mut pos = castle_position([
                "....k...", "........", "........", "........", ".....r..", "........",
                "........", "R...K..R",
            ]);
            assert!(!has_move(&mut pos, "e1g1"));
            assert!(has_move(&mut pos, "e1c1"));
        }

        #[test]
        fn not_onto_attacked_square() {
            let mut pos = castle_position([
                "....k...", "........", "........", "........", "..r.....", "........",
                "........", "R...K..R",
            ]);
            assert!(has_move(&mut pos, "e1g1"));
            assert!(!has_move(&mut pos, "e1c1"));
        }

        #[test]
        fn not_through_pawn_attack() {
            let mut pos = castle_position([
                "....k...", "........", "........", "........", "........", "........",
                "......p.", "R...K..R",
            ]);
            assert!(!has_move(&mut pos, "e1g1"));
            assert!(has_move(&mut pos, "e1c1"));
        }

        #[test]
        fn queenside_rook_may_pass_attacked_square() {
            // b1 is attacked, but only the king's path has to be safe.
            let mut pos = castle_position([
                "....k...", "........", "........", "........", ".r......", "........",
                "........", "R...K..R",
            ]);
            assert!(has_move(&mut pos, "e1c1"));
        }

        #[test]
        fn not_through_pieces() {
            let mut pos = castle_position([
                "....k...", "........", "........", "........", "........", "........",
                "........", "R..QK.NR",
            ]);
            assert!(!has_move(&mut pos, "e1g1"));
            assert!(!has_move(&mut pos, "e1c1"));
        }

        #[test]
        fn queenside_needs_b_file_empty() {
            let mut pos = castle_position([
                "....k...", "........", "........", "........", "........", "........",
                "........", "RN..K..R",
            ]);
            assert!(!has_move(&mut pos, "e1c1"));
            assert!(has_move(&mut pos, "e1g1"));
        }

        #[test]
        fn black_castles_on_eighth_rank() {
            let mut pos = PositionBuilder::from_rows([
                "r...k..r", "........", "........", "........", "........", "........",
                "........", "....K...",
            ])
            .unwrap()
            .side_to_move(Color::Black)
            .castle_rights(CastleRights::BLACK)
            .build()
            .unwrap();
            assert!(has_move(&mut pos, "e8g8"));
            assert!(has_move(&mut pos, "e8c8"));
        }
    }

    mod terminal {
        use super::play;
        use crate::builder::PositionBuilder;
        use crate::position::Position;
        use crate::types::Color;

        #[test]
        fn fools_mate() {
            let mut pos = Position::new();
            for mov in &["f2f3", "e7e5", "g2g4", "d8h4"] {
                play(&mut pos, mov);
            }

            assert!(pos.is_check());
            assert!(pos.legal_moves().is_empty());
            assert!(pos.checkmate());
            assert!(!pos.stalemate());

            // the flags describe the latest generation only.
            pos.undo_move();
            assert!(!pos.legal_moves().is_empty());
            assert!(!pos.checkmate());
        }

        #[test]
        fn stalemate() {
            let mut pos = PositionBuilder::from_rows([
                ".......k", "........", "......Q.", "........", "........", "........",
                "........", "K.......",
            ])
            .unwrap()
            .side_to_move(Color::Black)
            .build()
            .unwrap();

            assert!(!pos.is_check());
            assert!(pos.legal_moves().is_empty());
            assert!(pos.stalemate());
            assert!(!pos.checkmate());
        }

        #[test]
        fn back_rank_mate() {
            let mut pos = PositionBuilder::from_rows([
                "......k.", ".....ppp", "........", "........", "........", "........",
                "........", "R...K...",
            ])
            .unwrap()
            .build()
            .unwrap();

            play(&mut pos, "a1a8");
            assert!(pos.legal_moves().is_empty());
            assert!(pos.checkmate());
        }
    }

    mod playout {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        use crate::position::Position;
        use crate::types::{CastleRights, Color, Piece, PieceKind, COLORS, SQUARES};

        fn assert_consistent(pos: &Position) {
            assert_eq!(pos.move_history.len() + 1, pos.state_history.len());
            for &color in COLORS.iter() {
                let king = Some(Piece::new(PieceKind::King, color));
                let kings: Vec<_> = SQUARES
                    .iter()
                    .copied()
                    .filter(|&sq| pos.piece_at(sq) == king)
                    .collect();
                assert_eq!(vec![pos.king_square(color)], kings);
            }
        }

        #[test]
        fn random_games_stay_consistent() {
            let mut rng = StdRng::seed_from_u64(0x5eed);
            for _ in 0..12 {
                let mut pos = Position::new();
                for _ in 0..120 {
                    let moves = pos.legal_moves();
                    if moves.is_empty() {
                        assert!(pos.checkmate() || pos.stalemate());
                        break;
                    }

                    let mover = pos.side_to_move();
                    for &mov in moves.iter() {
                        let before = pos.clone();
                        pos.apply_move(mov);
                        assert!(!pos.is_king_attacked(mover), "{} leaves king attacked", mov);
                        assert_consistent(&pos);
                        assert_eq!(Some(mov), pos.undo_move());
                        assert_eq!(before, pos);
                    }

                    let mov = moves[rng.gen_range(0..moves.len())];
                    pos.apply_move(mov);
                    assert_consistent(&pos);
                    if mov.is_double_pawn_push() {
                        assert!(pos.en_passant_square().is_some());
                    } else {
                        assert_eq!(None, pos.en_passant_square());
                    }
                }

                while pos.undo_move().is_some() {}
                assert_eq!(Position::new().board, pos.board);
                assert_eq!(Color::White, pos.side_to_move());
                assert_eq!(CastleRights::ALL, pos.castle_rights());
                assert_eq!(None, pos.en_passant_square());
                assert_eq!(1, pos.state_history.len());
            }
        }
    }
}
