//! Maze-cell layout and the room carving phases that tile every zone with rooms.

use crate::rng::LevelRng;
use crate::types::{Direction, ZoneId};

use super::progression::{carve_size_max, fill_size_max};

/// Generation-time cell that later expands into a square block of tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct MazeTile {
    pub(super) zone: ZoneId,
    pub(super) room: Option<usize>,
    pub(super) hallway: bool,
    walls: [bool; 4],
    exits: [bool; 4],
}

impl MazeTile {
    fn new(zone: ZoneId) -> Self {
        Self { zone, room: None, hallway: false, walls: [true; 4], exits: [false; 4] }
    }

    pub(super) fn has_wall(&self, direction: Direction) -> bool {
        self.walls[direction.slot()]
    }

    pub(super) fn has_exit(&self, direction: Direction) -> bool {
        self.exits[direction.slot()]
    }

    /// No room claimed it and all four walls still stand.
    pub(super) fn is_untouched(&self) -> bool {
        self.room.is_none() && self.walls.iter().all(|&wall| wall)
    }

    fn clear_wall(&mut self, direction: Direction) {
        self.walls[direction.slot()] = false;
    }

    fn open_exit(&mut self, direction: Direction) {
        self.exits[direction.slot()] = true;
    }
}

/// Rectangle of maze cells inside one zone. Coordinates are zone-local.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub id: usize,
    pub zone: ZoneId,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub neighbors: Vec<usize>,
}

impl Room {
    pub fn is_hallway(&self) -> bool {
        self.width == 1 || self.height == 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Zone {
    pub id: ZoneId,
    /// Maze-cell column of the zone's west edge.
    pub origin_x: usize,
    /// Maze-cell row of the zone's north edge.
    pub origin_y: usize,
    pub side: usize,
    pub rooms: Vec<usize>,
    pub neighbors: Vec<ZoneId>,
}

impl Zone {
    pub(super) fn contains_local(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.side && (y as usize) < self.side
    }
}

#[derive(Clone, Debug)]
pub(super) struct MazeLayout {
    /// Maze cells along one side of the whole level.
    pub(super) side: usize,
    pub(super) cells: Vec<MazeTile>,
    pub(super) zones: Vec<Zone>,
    pub(super) rooms: Vec<Room>,
}

impl MazeLayout {
    pub(super) fn new(zone_side: usize) -> Self {
        let side = zone_side * 2;
        let zones: Vec<Zone> = ZoneId::ALL
            .into_iter()
            .map(|id| Zone {
                id,
                origin_x: if id.is_east() { zone_side } else { 0 },
                origin_y: if id.is_south() { zone_side } else { 0 },
                side: zone_side,
                rooms: Vec::new(),
                neighbors: Vec::new(),
            })
            .collect();

        let mut cells = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                cells.push(MazeTile::new(ZoneId::from_quadrant(x >= zone_side, y >= zone_side)));
            }
        }
        Self { side, cells, zones, rooms: Vec::new() }
    }

    pub(super) fn zone(&self, id: ZoneId) -> &Zone {
        &self.zones[id.index()]
    }

    pub(super) fn cell(&self, x: usize, y: usize) -> &MazeTile {
        &self.cells[y * self.side + x]
    }

    /// Converts zone-local maze coordinates to level-wide ones.
    pub(super) fn to_global(&self, zone: ZoneId, x: usize, y: usize) -> (usize, usize) {
        let zone = self.zone(zone);
        (zone.origin_x + x, zone.origin_y + y)
    }

    fn local_cell_mut(&mut self, zone: ZoneId, x: usize, y: usize) -> &mut MazeTile {
        let (gx, gy) = self.to_global(zone, x, y);
        &mut self.cells[gy * self.side + gx]
    }

    pub(super) fn local_cell(&self, zone: ZoneId, x: usize, y: usize) -> &MazeTile {
        let (gx, gy) = self.to_global(zone, x, y);
        self.cell(gx, gy)
    }

    /// Claims a `width` x `height` rectangle for a new room if every covered cell is untouched.
    pub(super) fn try_place_room(
        &mut self,
        zone: ZoneId,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Option<usize> {
        let side = self.zone(zone).side;
        if width == 0 || height == 0 || x + width > side || y + height > side {
            return None;
        }
        for dy in 0..height {
            for dx in 0..width {
                if !self.local_cell(zone, x + dx, y + dy).is_untouched() {
                    return None;
                }
            }
        }

        let id = self.rooms.len();
        let hallway = width == 1 || height == 1;
        for dy in 0..height {
            for dx in 0..width {
                let cell = self.local_cell_mut(zone, x + dx, y + dy);
                cell.room = Some(id);
                cell.hallway = hallway;
                if dx > 0 {
                    cell.clear_wall(Direction::West);
                }
                if dx + 1 < width {
                    cell.clear_wall(Direction::East);
                }
                if dy > 0 {
                    cell.clear_wall(Direction::North);
                }
                if dy + 1 < height {
                    cell.clear_wall(Direction::South);
                }
            }
        }
        self.rooms.push(Room { id, zone, x, y, width, height, neighbors: Vec::new() });
        self.zones[zone.index()].rooms.push(id);
        Some(id)
    }

    /// Sets the exit flags on both sides of the wall between `from` and its `direction`
    /// neighbor. Coordinates are level-wide.
    pub(super) fn open_doorway(&mut self, from: (usize, usize), direction: Direction) {
        let (dx, dy) = direction.delta();
        let to = ((from.0 as i32 + dx) as usize, (from.1 as i32 + dy) as usize);
        let side = self.side;
        self.cells[from.1 * side + from.0].open_exit(direction);
        self.cells[to.1 * side + to.0].open_exit(direction.opposite());
    }

    /// Registers a mutual room adjacency. Returns false if it already existed.
    pub(super) fn link_rooms(&mut self, a: usize, b: usize) -> bool {
        if a == b || self.rooms[a].neighbors.contains(&b) {
            return false;
        }
        self.rooms[a].neighbors.push(b);
        self.rooms[b].neighbors.push(a);
        true
    }

    /// Registers a mutual zone adjacency. Returns false if it already existed.
    pub(super) fn link_zones(&mut self, a: ZoneId, b: ZoneId) -> bool {
        if a == b || self.zones[a.index()].neighbors.contains(&b) {
            return false;
        }
        self.zones[a.index()].neighbors.push(b);
        self.zones[b.index()].neighbors.push(a);
        true
    }
}

/// Drops randomly sized rooms at random offsets. Returns how many landed.
pub(super) fn carve_random_rooms(
    layout: &mut MazeLayout,
    zone: ZoneId,
    difficulty: u32,
    attempts: u32,
    rng: &mut LevelRng,
) -> usize {
    let side = layout.zone(zone).side;
    let size_span = carve_size_max(difficulty) - 1;
    let mut placed = 0;
    for _ in 0..attempts {
        let width = rng.below(size_span) + 2;
        let height = rng.below(size_span) + 2;
        if width > side || height > side {
            continue;
        }
        let x = rng.below(side - width + 1);
        let y = rng.below(side - height + 1);
        if layout.try_place_room(zone, x, y, width, height).is_some() {
            placed += 1;
        }
    }
    placed
}

/// Tries every offset with every size from largest to smallest.
pub(super) fn fill_rooms(layout: &mut MazeLayout, zone: ZoneId, difficulty: u32) -> usize {
    let side = layout.zone(zone).side;
    let max = fill_size_max(difficulty);
    let mut placed = 0;
    for x in 0..side {
        for y in 0..side {
            for width in (2..=max).rev() {
                for height in (2..=max).rev() {
                    if layout.try_place_room(zone, x, y, width, height).is_some() {
                        placed += 1;
                    }
                }
            }
        }
    }
    placed
}

/// Claims every leftover cell with the longest horizontal, then vertical, strip that fits.
pub(super) fn fill_corridors(layout: &mut MazeLayout, zone: ZoneId) -> usize {
    let side = layout.zone(zone).side;
    let mut placed = 0;
    for x in 0..side {
        for y in 0..side {
            for length in (1..=side).rev() {
                if !layout.local_cell(zone, x, y).is_untouched() {
                    break;
                }
                if layout.try_place_room(zone, x, y, length, 1).is_some()
                    || layout.try_place_room(zone, x, y, 1, length).is_some()
                {
                    placed += 1;
                    break;
                }
            }
        }
    }
    placed
}
