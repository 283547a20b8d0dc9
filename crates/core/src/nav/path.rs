//! Best-first path search toward the player.
//!
//! Every in-bounds cardinal neighbor is expandable. Walls carry a flat penalty instead of being
//! forbidden, so a path always exists on a finite grid; chasers simply prefer open floor.

use std::collections::BTreeSet;

use crate::grid::TileGrid;
use crate::types::{TileKind, TilePos};

use super::scratch::SearchScratch;

/// Cost assigned to a wall neighbor regardless of its distance to the goal.
pub const WALL_PENALTY: u32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    cost: u32,
    y: i32,
    x: i32,
}

/// Waypoints from `from` to `target`, both inclusive.
///
/// Empty when either endpoint is outside the grid or the search expands more than `budget`
/// nodes before reaching the target.
pub fn compute_path(
    grid: &TileGrid,
    from: TilePos,
    target: TilePos,
    budget: Option<usize>,
    scratch: &mut SearchScratch,
) -> Vec<TilePos> {
    let (Some(start), Some(goal)) = (grid.index_of(from), grid.index_of(target)) else {
        return Vec::new();
    };

    scratch.prepare(grid.len());
    scratch.visit(start, 0, None);
    let mut open_set = BTreeSet::from([OpenNode { cost: 0, y: from.y, x: from.x }]);
    let mut expanded = 0_usize;
    let mut path = Vec::new();

    while let Some(current) = open_set.pop_first() {
        let pos = TilePos { y: current.y, x: current.x };
        let Some(index) = grid.index_of(pos) else {
            continue;
        };
        if index == goal {
            path = reconstruct_path(grid, scratch, goal);
            break;
        }
        if budget.is_some_and(|budget| expanded >= budget) {
            break;
        }
        expanded += 1;

        let base = scratch.cost(index);
        for neighbor in grid.cardinal_neighbors(index) {
            if scratch.is_visited(neighbor) {
                continue;
            }
            let tile = grid.tile_at_index(neighbor);
            let cost = if tile.kind == TileKind::Wall {
                WALL_PENALTY
            } else {
                straight_line_floor(tile.pos, target).saturating_add(base).saturating_add(1)
            };
            scratch.visit(neighbor, cost, Some(index));
            open_set.insert(OpenNode { cost, y: tile.pos.y, x: tile.pos.x });
        }
    }

    scratch.reset();
    path
}

fn straight_line_floor(from: TilePos, to: TilePos) -> u32 {
    let dx = f64::from(to.x - from.x);
    let dy = f64::from(to.y - from.y);
    (dx * dx + dy * dy).sqrt().floor() as u32
}

fn reconstruct_path(grid: &TileGrid, scratch: &SearchScratch, goal: usize) -> Vec<TilePos> {
    let mut path = vec![grid.tile_at_index(goal).pos];
    let mut current = goal;
    while let Some(previous) = scratch.ancestor(current) {
        path.push(grid.tile_at_index(previous).pos);
        current = previous;
    }
    path.reverse();
    path
}
