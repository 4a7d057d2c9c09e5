// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use rayon::prelude::*;

use crate::moves::Move;
use crate::position::Position;

/// Counts the leaf nodes of the legal move tree of `pos` to the given depth.
/// The root moves are searched in parallel, each on its own copy of the
/// position.
pub fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    divide(pos, depth).iter().map(|&(_, count)| count).sum()
}

/// Like `perft`, but reports the node count below each root move.
pub fn divide(pos: &Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return vec![];
    }

    let mut root = pos.clone();
    let moves = root.legal_moves();
    moves
        .par_iter()
        .map(|&mov| {
            let mut child = root.clone();
            child.apply_move(mov);
            (mov, count_nodes(&mut child, depth - 1))
        })
        .collect()
}

fn count_nodes(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = pos.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &mov in moves.iter() {
        pos.apply_move(mov);
        nodes += count_nodes(pos, depth - 1);
        pos.undo_move();
    }

    nodes
}
