// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A chess rules engine. `Position` holds the state of a game and produces
//! the legal moves of the side to move; moves are applied and taken back in
//! place.
//!
//! ```
//! use castellan::Position;
//!
//! let mut pos = Position::new();
//! let moves = pos.legal_moves();
//! assert_eq!(20, moves.len());
//!
//! pos.apply_move(moves[0]);
//! assert_eq!(Some(moves[0]), pos.undo_move());
//! ```

#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod attacks;
mod builder;
mod move_generator;
mod moves;
mod perft;
mod position;
mod types;

pub use builder::{PositionBuilder, SetupError};
pub use move_generator::{MoveGenerator, MoveVec, PieceMoves};
pub use moves::Move;
pub use perft::{divide, perft};
pub use position::{Board, Position};
pub use types::{CastleRights, Color, File, Piece, PieceKind, Rank, Square, TableIndex};
