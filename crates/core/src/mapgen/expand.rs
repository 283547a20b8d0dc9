//! Expansion of maze cells into the full tile grid, with pillar and agent spawn rolls.

use std::ops::RangeInclusive;

use crate::grid::TileGrid;
use crate::rng::LevelRng;
use crate::types::{Behavior, Direction, TileKind, TilePos, ZoneId};

use super::layout::{MazeLayout, MazeTile};
use super::model::AgentSpawn;

/// Block rows (or columns) left open where a wall carries a doorway.
const DOORWAY_SPAN: RangeInclusive<usize> = 1..=2;

/// Random rolls applied during the final expansion. Intermediate projections pass `None`.
pub(super) struct ExpansionRolls<'a> {
    pub(super) rng: &'a mut LevelRng,
    pub(super) pillar_chance: f64,
    pub(super) spawn_chance: Option<f64>,
}

pub(super) struct Expansion {
    pub(super) grid: TileGrid,
    pub(super) spawns: Vec<AgentSpawn>,
}

pub(super) fn expand_layout(
    layout: &MazeLayout,
    scaler: usize,
    mut rolls: Option<ExpansionRolls<'_>>,
) -> Expansion {
    let side = layout.side * scaler + 1;
    let mut kinds = vec![TileKind::Wall; side * side];
    let mut zones = vec![ZoneId(0); side * side];
    let mut spawns = Vec::new();

    for maze_x in 0..layout.side {
        for maze_y in 0..layout.side {
            let cell = layout.cell(maze_x, maze_y);
            for block_x in 0..scaler {
                for block_y in 0..scaler {
                    let x = maze_x * scaler + block_x;
                    let y = maze_y * scaler + block_y;
                    let index = y * side + x;
                    zones[index] = cell.zone;

                    let pillar = block_x == 0
                        && block_y == 0
                        && rolls.as_mut().is_some_and(|r| r.rng.chance(r.pillar_chance));
                    if pillar {
                        continue;
                    }
                    let Some(kind) = block_tile(cell, block_x, block_y) else {
                        kinds[index] = TileKind::Floor;
                        continue;
                    };
                    kinds[index] = kind;
                    if kind != TileKind::Floor || cell.room.is_none() || cell.hallway {
                        continue;
                    }

                    if let Some(rolls) = rolls.as_mut()
                        && let Some(chance) = rolls.spawn_chance
                        && rolls.rng.chance(chance)
                    {
                        let behavior = if rolls.rng.coin() {
                            Behavior::LineWalker
                        } else {
                            Behavior::Wanderer
                        };
                        let heading = rolls.rng.heading();
                        let pos = TilePos { y: y as i32, x: x as i32 };
                        spawns.push(AgentSpawn { behavior, pos: pos.center(), heading });
                    }
                }
            }
        }
    }

    // Closing east column and south row.
    let last_cell = layout.side - 1;
    for i in 0..side {
        let maze_i = (i / scaler).min(last_cell);
        zones[(side - 1) * side + i] = layout.cell(maze_i, last_cell).zone;
        zones[i * side + side - 1] = layout.cell(last_cell, maze_i).zone;
    }

    let mut grid = TileGrid::from_layers(side, side, &kinds, &zones);
    for spawn in &spawns {
        let marked = grid.mark_occupied(spawn.pos.cell()).is_ok();
        debug_assert!(marked, "spawn positions come from in-bounds tiles");
    }
    Expansion { grid, spawns }
}

/// Wall or room-interior floor for one block cell. `None` marks a doorway opening, which is
/// floor that never hosts a spawn.
fn block_tile(cell: &MazeTile, block_x: usize, block_y: usize) -> Option<TileKind> {
    if block_x == 0 && cell.has_wall(Direction::West) {
        return if cell.has_exit(Direction::West) && DOORWAY_SPAN.contains(&block_y) {
            None
        } else {
            Some(TileKind::Wall)
        };
    }
    if block_y == 0 && cell.has_wall(Direction::North) {
        return if cell.has_exit(Direction::North) && DOORWAY_SPAN.contains(&block_x) {
            None
        } else {
            Some(TileKind::Wall)
        };
    }
    Some(TileKind::Floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_layout_expands_to_walled_pockets() {
        let layout = MazeLayout::new(5);
        let expansion = expand_layout(&layout, 4, None);
        let grid = &expansion.grid;
        assert_eq!(grid.width(), 41);
        assert_eq!(grid.height(), 41);
        assert!(expansion.spawns.is_empty());
        assert_eq!(grid.kind_at(TilePos { y: 0, x: 0 }), TileKind::Wall);
        assert_eq!(grid.kind_at(TilePos { y: 4, x: 2 }), TileKind::Wall);
        assert_eq!(grid.kind_at(TilePos { y: 2, x: 2 }), TileKind::Floor);
        assert_eq!(grid.kind_at(TilePos { y: 40, x: 17 }), TileKind::Wall);
        assert_eq!(grid.count(TileKind::Floor), 100 * 9);
    }

    #[test]
    fn closing_row_and_column_take_the_adjacent_zone() {
        let layout = MazeLayout::new(5);
        let grid = expand_layout(&layout, 4, None).grid;
        assert_eq!(grid.zone_at(TilePos { y: 40, x: 3 }), Some(ZoneId(1)));
        assert_eq!(grid.zone_at(TilePos { y: 3, x: 40 }), Some(ZoneId(2)));
        assert_eq!(grid.zone_at(TilePos { y: 40, x: 40 }), Some(ZoneId(3)));
    }

    #[test]
    fn doorway_opens_two_wall_cells() {
        let mut layout = MazeLayout::new(5);
        layout.open_doorway((0, 0), Direction::East);
        let grid = expand_layout(&layout, 4, None).grid;
        assert_eq!(grid.kind_at(TilePos { y: 0, x: 4 }), TileKind::Wall);
        assert_eq!(grid.kind_at(TilePos { y: 1, x: 4 }), TileKind::Floor);
        assert_eq!(grid.kind_at(TilePos { y: 2, x: 4 }), TileKind::Floor);
        assert_eq!(grid.kind_at(TilePos { y: 3, x: 4 }), TileKind::Wall);
    }

    #[test]
    fn full_pillar_chance_walls_every_block_corner() {
        let layout = MazeLayout::new(5);
        let mut rng = LevelRng::seed_from_u64(1);
        let rolls = ExpansionRolls { rng: &mut rng, pillar_chance: 1.0, spawn_chance: None };
        let grid = expand_layout(&layout, 4, Some(rolls)).grid;
        for y in (0..40).step_by(4) {
            for x in (0..40).step_by(4) {
                assert_eq!(grid.kind_at(TilePos { y, x }), TileKind::Wall);
            }
        }
    }

    #[test]
    fn spawns_only_appear_in_normal_rooms_and_occupy_their_tile() {
        let mut layout = MazeLayout::new(5);
        layout.try_place_room(ZoneId(0), 0, 0, 3, 3).expect("room");
        layout.try_place_room(ZoneId(0), 3, 0, 1, 2).expect("hallway");
        let mut rng = LevelRng::seed_from_u64(9);
        let rolls = ExpansionRolls { rng: &mut rng, pillar_chance: 0.0, spawn_chance: Some(1.0) };
        let expansion = expand_layout(&layout, 4, Some(rolls));

        assert!(!expansion.spawns.is_empty());
        for spawn in &expansion.spawns {
            let cell = spawn.pos.cell();
            assert!(cell.x < 12 && cell.y < 12);
            assert_ne!(spawn.behavior, Behavior::Elite);
            assert!((0.0..360.0).contains(&spawn.heading));
            let tile = expansion.grid.tile(cell).expect("in bounds");
            assert_eq!(tile.kind, TileKind::Floor);
            assert!(tile.occupied);
        }
    }
}
