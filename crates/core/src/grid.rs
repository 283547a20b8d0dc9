//! Tile grid shared by generation output, navigation, and the session.
//! This module exists to answer per-cell questions (kind, zone, occupancy, visibility) and to
//! cache each tile's walkable neighbors. It does not own search state; searches keep their
//! marks in a caller-owned `nav::SearchScratch`.

use std::cell::OnceCell;

use crate::error::GridError;
use crate::types::{Direction, Point, TileKind, TilePos, ZoneId};

#[derive(Clone, Debug)]
pub struct Tile {
    pub pos: TilePos,
    pub zone: ZoneId,
    pub kind: TileKind,
    /// Something already stands here. Only meaningful on Floor tiles.
    pub occupied: bool,
    pub seen: bool,
    walkable_neighbors: OnceCell<Vec<usize>>,
}

impl Tile {
    fn new(pos: TilePos, zone: ZoneId, kind: TileKind) -> Self {
        Self { pos, zone, kind, occupied: false, seen: false, walkable_neighbors: OnceCell::new() }
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
            && self.zone == other.zone
            && self.kind == other.kind
            && self.occupied == other.occupied
            && self.seen == other.seen
    }
}

impl Eq for Tile {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Builds a grid from row-major kind and zone layers.
    pub fn from_layers(width: usize, height: usize, kinds: &[TileKind], zones: &[ZoneId]) -> Self {
        debug_assert_eq!(kinds.len(), width * height);
        debug_assert_eq!(zones.len(), width * height);
        let tiles = (0..width * height)
            .map(|index| {
                let pos = TilePos { y: (index / width) as i32, x: (index % width) as i32 };
                Tile::new(pos, zones[index], kinds[index])
            })
            .collect();
        Self { width, height, tiles }
    }

    /// Open floor surrounded by a one-tile wall ring, zoned by quadrant.
    pub fn walled(width: usize, height: usize) -> Self {
        let mut kinds = vec![TileKind::Floor; width * height];
        let mut zones = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                    kinds[y * width + x] = TileKind::Wall;
                }
                zones.push(ZoneId::from_quadrant(x >= width / 2, y >= height / 2));
            }
        }
        Self::from_layers(width, height, &kinds, &zones)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn index_of(&self, pos: TilePos) -> Option<usize> {
        self.in_bounds(pos).then(|| pos.y as usize * self.width + pos.x as usize)
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index_of(pos).map(|index| &self.tiles[index])
    }

    pub fn try_tile(&self, pos: TilePos) -> Result<&Tile, GridError> {
        self.tile(pos).ok_or_else(|| self.out_of_bounds(pos))
    }

    fn out_of_bounds(&self, pos: TilePos) -> GridError {
        GridError::OutOfBounds { x: pos.x, y: pos.y, width: self.width, height: self.height }
    }

    /// Panics when `index >= len()`; indices come from `index_of` or neighbor lists.
    pub fn tile_at_index(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Kind of the tile at `pos`, treating anything outside the grid as Wall.
    pub fn kind_at(&self, pos: TilePos) -> TileKind {
        self.tile(pos).map_or(TileKind::Wall, |tile| tile.kind)
    }

    pub fn zone_at(&self, pos: TilePos) -> Option<ZoneId> {
        self.tile(pos).map(|tile| tile.zone)
    }

    pub fn is_empty_floor(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(|tile| tile.kind == TileKind::Floor && !tile.occupied)
    }

    /// The in-bounds cell containing a continuous position.
    pub fn cell_of(&self, point: Point) -> Option<TilePos> {
        if !point.is_finite() {
            return None;
        }
        let cell = point.cell();
        self.in_bounds(cell).then_some(cell)
    }

    pub fn set_kind(&mut self, pos: TilePos, kind: TileKind) -> Result<(), GridError> {
        let index = self.index_of(pos).ok_or_else(|| self.out_of_bounds(pos))?;
        self.tiles[index].kind = kind;
        self.tiles[index].walkable_neighbors.take();
        for direction in Direction::ALL {
            if let Some(neighbor) = self.index_of(pos.offset(direction)) {
                self.tiles[neighbor].walkable_neighbors.take();
            }
        }
        Ok(())
    }

    pub fn mark_occupied(&mut self, pos: TilePos) -> Result<(), GridError> {
        let index = self.index_of(pos).ok_or_else(|| self.out_of_bounds(pos))?;
        self.tiles[index].occupied = true;
        Ok(())
    }

    /// Marks every tile within `range` Manhattan distance of `center` as seen.
    pub fn reveal_around(&mut self, center: TilePos, range: u32) -> usize {
        let reach = range as i32;
        let mut revealed = 0;
        for dy in -reach..=reach {
            let span = reach - dy.abs();
            for dx in -span..=span {
                let pos = TilePos { y: center.y + dy, x: center.x + dx };
                if let Some(index) = self.index_of(pos) {
                    let tile = &mut self.tiles[index];
                    if !tile.seen {
                        tile.seen = true;
                        revealed += 1;
                    }
                }
            }
        }
        revealed
    }

    /// In-bounds cardinal neighbors of `index`, in N/E/S/W order, regardless of kind.
    pub fn cardinal_neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let pos = self.tiles[index].pos;
        Direction::ALL.into_iter().filter_map(move |direction| self.index_of(pos.offset(direction)))
    }

    /// Walkable (Floor/Exit) cardinal neighbors, built on first use and cached.
    pub fn walkable_neighbors(&self, index: usize) -> &[usize] {
        self.tiles[index].walkable_neighbors.get_or_init(|| {
            self.cardinal_neighbors(index)
                .filter(|&neighbor| self.tiles[neighbor].kind.is_walkable())
                .collect()
        })
    }

    pub fn positions_of(&self, kind: TileKind) -> Vec<TilePos> {
        self.tiles.iter().filter(|tile| tile.kind == kind).map(|tile| tile.pos).collect()
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| tile.kind == kind).count()
    }

    /// One line per row: `x` wall, `.` floor, `!` exit.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.tiles.chunks(self.width.max(1)) {
            out.extend(row.iter().map(|tile| tile.kind.glyph()));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> TilePos {
        TilePos { y, x }
    }

    #[test]
    fn walled_grid_has_wall_perimeter_and_floor_interior() {
        let grid = TileGrid::walled(6, 5);
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.kind_at(pos(0, 2)), TileKind::Wall);
        assert_eq!(grid.kind_at(pos(5, 2)), TileKind::Wall);
        assert_eq!(grid.kind_at(pos(3, 0)), TileKind::Wall);
        assert_eq!(grid.kind_at(pos(3, 4)), TileKind::Wall);
        assert_eq!(grid.kind_at(pos(2, 2)), TileKind::Floor);
        assert_eq!(grid.zone_at(pos(1, 1)), Some(ZoneId(0)));
        assert_eq!(grid.zone_at(pos(1, 4)), Some(ZoneId(1)));
        assert_eq!(grid.zone_at(pos(4, 1)), Some(ZoneId(2)));
        assert_eq!(grid.zone_at(pos(4, 4)), Some(ZoneId(3)));
    }

    #[test]
    fn out_of_bounds_access_fails_closed() {
        let grid = TileGrid::walled(4, 4);
        assert_eq!(grid.kind_at(pos(-1, 0)), TileKind::Wall);
        assert_eq!(grid.kind_at(pos(4, 1)), TileKind::Wall);
        assert!(grid.tile(pos(0, 9)).is_none());
        assert!(!grid.is_empty_floor(pos(-3, -3)));
        assert_eq!(grid.cell_of(Point::new(-0.1, 1.0)), None);
        assert_eq!(grid.cell_of(Point::new(f64::NAN, 1.0)), None);
        assert_eq!(
            grid.try_tile(pos(7, 2)).unwrap_err(),
            GridError::OutOfBounds { x: 7, y: 2, width: 4, height: 4 }
        );
    }

    #[test]
    fn walkable_neighbors_skip_walls_and_refresh_after_edits() {
        let mut grid = TileGrid::walled(5, 5);
        let center = grid.index_of(pos(2, 2)).expect("center");
        assert_eq!(grid.walkable_neighbors(center).len(), 4);

        grid.set_kind(pos(2, 1), TileKind::Wall).expect("in bounds");
        assert_eq!(grid.walkable_neighbors(center).len(), 3);

        grid.set_kind(pos(3, 2), TileKind::Exit).expect("in bounds");
        assert_eq!(grid.walkable_neighbors(center).len(), 3);

        let corner = grid.index_of(pos(1, 1)).expect("corner");
        assert_eq!(grid.walkable_neighbors(corner).len(), 1);
    }

    #[test]
    fn reveal_uses_manhattan_radius() {
        let mut grid = TileGrid::walled(9, 9);
        let revealed = grid.reveal_around(pos(4, 4), 2);
        assert_eq!(revealed, 13);
        assert!(grid.tile(pos(4, 2)).expect("tile").seen);
        assert!(grid.tile(pos(5, 5)).expect("tile").seen);
        assert!(!grid.tile(pos(6, 5)).expect("tile").seen);
        assert_eq!(grid.reveal_around(pos(4, 4), 2), 0);
    }

    #[test]
    fn ascii_rendering_matches_kinds() {
        let mut grid = TileGrid::walled(4, 3);
        grid.set_kind(pos(0, 1), TileKind::Exit).expect("in bounds");
        assert_eq!(grid.to_ascii(), "xxxx\n!..x\nxxxx\n");
    }

    #[test]
    fn occupancy_marks_only_the_target_tile() {
        let mut grid = TileGrid::walled(5, 5);
        grid.mark_occupied(pos(2, 2)).expect("in bounds");
        assert!(!grid.is_empty_floor(pos(2, 2)));
        assert!(grid.is_empty_floor(pos(2, 3)));
        assert!(grid.mark_occupied(pos(9, 9)).is_err());
    }
}
