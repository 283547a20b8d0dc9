//! Collision tests against walls, exits, and other agents.
//!
//! Wall distances are measured in world units, two per tile. An obstacle's footprint is its
//! tile inset by `CORNER_OFFSET` on every side.

use std::cmp::Ordering;

use crate::grid::TileGrid;
use crate::types::{Point, TilePos};

pub const WORLD_UNITS_PER_TILE: f64 = 2.0;
pub const CORNER_OFFSET: f64 = 0.2;
/// World-unit distance to an obstacle footprint at or below which an agent is blocked.
pub const WALL_COLLISION_DISTANCE: f64 = 1.0;
/// Squared tile distance at or below which two agents block each other.
pub const AGENT_COLLISION_DISTANCE_SQ: f64 = 4.0;

/// Distance in world units from `pos` to the footprint of the obstacle at `obstacle`.
///
/// The gap on each axis depends on which side of the obstacle the agent's cell lies; an agent
/// inside the obstacle's own cell is at distance zero.
pub fn obstacle_distance(pos: Point, obstacle: TilePos) -> f64 {
    let cell = pos.cell();
    let gap_x = axis_gap(pos.x, cell.x, obstacle.x);
    let gap_y = axis_gap(pos.y, cell.y, obstacle.y);
    gap_x.hypot(gap_y)
}

fn axis_gap(coordinate: f64, agent_cell: i32, obstacle_cell: i32) -> f64 {
    let world = coordinate * WORLD_UNITS_PER_TILE;
    let near = f64::from(obstacle_cell) * WORLD_UNITS_PER_TILE + CORNER_OFFSET;
    let far = f64::from(obstacle_cell + 1) * WORLD_UNITS_PER_TILE - CORNER_OFFSET;
    let gap = match agent_cell.cmp(&obstacle_cell) {
        Ordering::Less => near - world,
        Ordering::Equal => 0.0,
        Ordering::Greater => world - far,
    };
    gap.max(0.0)
}

/// True when a Wall or Exit tile in the 3x3 neighborhood of `pos` is too close.
pub fn hits_obstacle(grid: &TileGrid, pos: Point) -> bool {
    let cell = pos.cell();
    (-1..=1).any(|dy| {
        (-1..=1).any(|dx| {
            let neighbor = TilePos { y: cell.y + dy, x: cell.x + dx };
            grid.tile(neighbor).is_some_and(|tile| {
                tile.kind.is_obstacle()
                    && obstacle_distance(pos, neighbor) <= WALL_COLLISION_DISTANCE
            })
        })
    })
}

pub fn hits_agent(pos: Point, others: &[Point]) -> bool {
    others.iter().any(|&other| pos.distance_sq(other) <= AGENT_COLLISION_DISTANCE_SQ)
}

pub fn collides(grid: &TileGrid, pos: Point, others: &[Point]) -> bool {
    hits_agent(pos, others) || hits_obstacle(grid, pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileKind;

    #[test]
    fn nearby_agents_collide() {
        assert!(hits_agent(Point::new(5.0, 5.0), &[Point::new(5.5, 5.0)]));
        assert!(hits_agent(Point::new(5.0, 5.0), &[Point::new(7.0, 5.0)]));
        assert!(!hits_agent(Point::new(5.0, 5.0), &[Point::new(7.1, 5.0)]));
        assert!(!hits_agent(Point::new(5.0, 5.0), &[]));
    }

    #[test]
    fn tile_center_next_to_a_wall_is_clear() {
        let grid = TileGrid::walled(5, 5);
        assert!(!hits_obstacle(&grid, Point::new(1.5, 1.5)));
        assert!(!hits_obstacle(&grid, Point::new(2.5, 2.5)));
    }

    #[test]
    fn approaching_a_wall_face_collides() {
        let grid = TileGrid::walled(5, 5);
        // East wall face of column 4 starts at world x 8.2; 1.0 away means tile x 3.6.
        assert!(!hits_obstacle(&grid, Point::new(3.55, 2.5)));
        assert!(hits_obstacle(&grid, Point::new(3.65, 2.5)));
        assert!(hits_obstacle(&grid, Point::new(1.5, 1.35)));
    }

    #[test]
    fn standing_inside_an_obstacle_always_collides() {
        let mut grid = TileGrid::walled(5, 5);
        grid.set_kind(TilePos { y: 2, x: 2 }, TileKind::Exit).expect("in bounds");
        assert_eq!(obstacle_distance(Point::new(2.5, 2.5), TilePos { y: 2, x: 2 }), 0.0);
        assert!(hits_obstacle(&grid, Point::new(2.5, 2.5)));
    }

    #[test]
    fn diagonal_corner_uses_euclidean_gap() {
        let distance = obstacle_distance(Point::new(1.5, 1.5), TilePos { y: 0, x: 0 });
        assert!((distance - 1.2_f64.hypot(1.2)).abs() < 1e-9);
    }
}
