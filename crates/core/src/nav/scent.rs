//! Bounded-radius reachability: can an agent smell the player from where it stands?

use std::collections::VecDeque;

use crate::grid::TileGrid;
use crate::types::TilePos;

use super::scratch::SearchScratch;

/// True iff `target` is reachable from `from` in at most `range` walkable steps.
///
/// Walls block the search. Out-of-bounds endpoints are never sensed.
pub fn can_sense(
    grid: &TileGrid,
    from: TilePos,
    target: TilePos,
    range: u32,
    scratch: &mut SearchScratch,
) -> bool {
    let (Some(start), Some(goal)) = (grid.index_of(from), grid.index_of(target)) else {
        return false;
    };
    if start == goal {
        return true;
    }

    scratch.prepare(grid.len());
    scratch.visit(start, 0, None);
    let mut queue = VecDeque::from([(start, 0_u32)]);
    let mut found = false;
    while let Some((index, depth)) = queue.pop_front() {
        if depth == range {
            continue;
        }
        for &neighbor in grid.walkable_neighbors(index) {
            if !scratch.visit(neighbor, depth + 1, Some(index)) {
                continue;
            }
            if neighbor == goal {
                found = true;
                break;
            }
            queue.push_back((neighbor, depth + 1));
        }
        if found {
            break;
        }
    }
    scratch.reset();
    found
}
