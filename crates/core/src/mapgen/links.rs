//! Doorway phases: room-to-room paths, hallway minimums, zone connectivity repair, and the
//! cross-zone links that chain the four quadrants together.

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use crate::error::GenerationError;
use crate::rng::LevelRng;
use crate::types::{Direction, ZoneId};

use super::layout::MazeLayout;

/// Zone pairs linked once cross-zone linking is done: a chain through all four quadrants.
pub(super) const REQUIRED_ZONE_LINKS: usize = 3;

/// Opens one doorway from `room` to whatever lies beyond a random edge cell.
///
/// Returns false when every attempt pointed outside the zone.
pub(super) fn open_path_from_room(
    layout: &mut MazeLayout,
    room: usize,
    attempts: u32,
    rng: &mut LevelRng,
) -> bool {
    let (zone, x, y, width, height) = {
        let room = &layout.rooms[room];
        (room.zone, room.x, room.y, room.width, room.height)
    };

    for _ in 0..attempts {
        let direction = Direction::ALL[rng.below(Direction::ALL.len())];
        let (edge_x, edge_y) = match direction {
            Direction::North => (x + rng.below(width), y),
            Direction::South => (x + rng.below(width), y + height - 1),
            Direction::East => (x + width - 1, y + rng.below(height)),
            Direction::West => (x, y + rng.below(height)),
        };
        let (dx, dy) = direction.delta();
        let (out_x, out_y) = (edge_x as i32 + dx, edge_y as i32 + dy);
        if !layout.zone(zone).contains_local(out_x, out_y) {
            continue;
        }

        let from = layout.to_global(zone, edge_x, edge_y);
        layout.open_doorway(from, direction);
        if let Some(other) = layout.local_cell(zone, out_x as usize, out_y as usize).room {
            layout.link_rooms(room, other);
        }
        return true;
    }
    false
}

/// One doorway per room. Returns the rooms whose attempts ran out.
pub(super) fn open_room_paths(
    layout: &mut MazeLayout,
    zone: ZoneId,
    attempts: u32,
    rng: &mut LevelRng,
) -> Vec<usize> {
    let rooms = layout.zone(zone).rooms.clone();
    rooms.into_iter().filter(|&room| !open_path_from_room(layout, room, attempts, rng)).collect()
}

/// Gives every hallway with fewer than two neighbors one more doorway.
pub(super) fn enforce_hallway_minimum(
    layout: &mut MazeLayout,
    zone: ZoneId,
    attempts: u32,
    rng: &mut LevelRng,
) -> Vec<usize> {
    let rooms = layout.zone(zone).rooms.clone();
    let mut exhausted = Vec::new();
    for room in rooms {
        let candidate = &layout.rooms[room];
        if candidate.is_hallway()
            && candidate.neighbors.len() < 2
            && !open_path_from_room(layout, room, attempts, rng)
        {
            exhausted.push(room);
        }
    }
    exhausted
}

/// Rooms reachable from the zone's first room over room adjacency.
pub(super) fn reachable_rooms(layout: &MazeLayout, zone: ZoneId) -> BTreeSet<usize> {
    let mut reached = BTreeSet::new();
    let Some(&first) = layout.zone(zone).rooms.first() else {
        return reached;
    };
    reached.insert(first);
    let mut queue = VecDeque::from([first]);
    while let Some(room) = queue.pop_front() {
        for &neighbor in &layout.rooms[room].neighbors {
            if reached.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    reached
}

/// Forces doorways until the zone's room graph is one component.
///
/// Each retry picks a random room from the larger of the reached and unreached sets (reached
/// on ties). Returns how many doorways were forced.
pub(super) fn connect_zone(
    layout: &mut MazeLayout,
    zone: ZoneId,
    retry_limit: u32,
    path_attempts: u32,
    rng: &mut LevelRng,
) -> Result<u32, GenerationError> {
    for forced in 0..=retry_limit {
        let reached = reachable_rooms(layout, zone);
        let (connected, isolated): (Vec<usize>, Vec<usize>) =
            layout.zone(zone).rooms.iter().copied().partition(|room| reached.contains(room));
        if isolated.is_empty() {
            if forced > 0 {
                debug!(zone = zone.0, forced, "zone room graph connected");
            }
            return Ok(forced);
        }
        if forced == retry_limit {
            break;
        }
        let pool = if connected.len() >= isolated.len() { &connected } else { &isolated };
        let room = pool[rng.below(pool.len())];
        open_path_from_room(layout, room, path_attempts, rng);
    }
    Err(GenerationError::ConnectivityUnresolved { zone, attempts: retry_limit })
}

/// Opens doorways across the mid-lines until three distinct zone pairs are linked.
///
/// Returns how many distinct pairs were linked within `attempts`.
pub(super) fn link_zones(layout: &mut MazeLayout, attempts: u32, rng: &mut LevelRng) -> usize {
    let side = layout.side;
    let half = side / 2;
    let mut linked = 0;
    for _ in 0..attempts {
        if linked == REQUIRED_ZONE_LINKS {
            break;
        }
        let (from, direction) = if rng.coin() {
            ((half - 1, rng.below(side)), Direction::East)
        } else {
            ((rng.below(side), half - 1), Direction::South)
        };
        let (dx, dy) = direction.delta();
        let to = ((from.0 as i32 + dx) as usize, (from.1 as i32 + dy) as usize);
        let (a, b) = (layout.cell(from.0, from.1).zone, layout.cell(to.0, to.1).zone);

        layout.open_doorway(from, direction);
        if layout.link_zones(a, b) {
            debug!(from = a.0, to = b.0, "zones linked");
            linked += 1;
        }
    }
    linked
}
