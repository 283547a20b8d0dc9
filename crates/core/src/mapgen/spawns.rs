//! Player, elite, and exit placement inside the two dead-end zones.

use tracing::warn;

use crate::error::GenerationError;
use crate::grid::TileGrid;
use crate::rng::LevelRng;
use crate::types::{Behavior, TileKind, TilePos, ZoneId};

use super::model::{AgentSpawn, GenerationDiagnostic};

#[derive(Clone, Debug, PartialEq)]
pub(super) struct Placement {
    pub(super) spawn: TilePos,
    pub(super) spawn_zone: ZoneId,
    pub(super) exit: [TilePos; 2],
    pub(super) exit_zone: ZoneId,
    pub(super) elite: Option<AgentSpawn>,
}

pub(super) struct PlacementContext<'a> {
    pub(super) grid: &'a mut TileGrid,
    pub(super) rng: &'a mut LevelRng,
    pub(super) attempts: u32,
    pub(super) spawn_elite: bool,
    pub(super) diagnostics: &'a mut Vec<GenerationDiagnostic>,
}

/// Two perimeter wall tiles and the interior floor directly behind each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ExitCandidate {
    tiles: [TilePos; 2],
    backing: [TilePos; 2],
}

/// Puts the player in one dead-end zone and the elite plus the exit in the other.
pub(super) fn place_player_and_exit(
    ctx: &mut PlacementContext<'_>,
    dead_ends: &[ZoneId],
) -> Result<Placement, GenerationError> {
    let &[first, second, ..] = dead_ends else {
        return Err(GenerationError::PlacementImpossible {
            what: "dead-end zone pair",
            zone: dead_ends.first().copied().unwrap_or(ZoneId(0)),
        });
    };
    let (spawn_zone, exit_zone) = if ctx.rng.coin() { (first, second) } else { (second, first) };

    let mut spawn = None;
    let mut exit = None;
    let mut elite = None;
    for zone in [first, second] {
        if zone == spawn_zone {
            spawn = Some(sample_empty_floor(ctx, zone, "player spawn")?);
            continue;
        }
        if ctx.spawn_elite {
            let pos = sample_empty_floor(ctx, zone, "elite spawn")?;
            ctx.grid.mark_occupied(pos).map_err(|_| GenerationError::PlacementImpossible {
                what: "elite spawn",
                zone,
            })?;
            elite = Some(AgentSpawn { behavior: Behavior::Elite, pos: pos.center(), heading: 0.0 });
        }
        exit = Some(place_exit(ctx, zone)?);
    }

    match (spawn, exit) {
        (Some(spawn), Some(exit)) => Ok(Placement { spawn, spawn_zone, exit, exit_zone, elite }),
        _ => Err(GenerationError::PlacementImpossible { what: "player spawn", zone: spawn_zone }),
    }
}

/// Random unoccupied floor tile in `zone`, falling back to a row-major scan.
fn sample_empty_floor(
    ctx: &mut PlacementContext<'_>,
    zone: ZoneId,
    what: &'static str,
) -> Result<TilePos, GenerationError> {
    let span_x = ctx.grid.width() - 1;
    let span_y = ctx.grid.height() - 1;
    for _ in 0..ctx.attempts {
        let pos = TilePos { y: ctx.rng.below(span_y) as i32, x: ctx.rng.below(span_x) as i32 };
        if ctx.grid.is_empty_floor(pos) && ctx.grid.zone_at(pos) == Some(zone) {
            return Ok(pos);
        }
    }

    record_exhausted(ctx, what, zone);
    ctx.grid
        .tiles()
        .find(|tile| tile.zone == zone && tile.kind == TileKind::Floor && !tile.occupied)
        .map(|tile| tile.pos)
        .ok_or(GenerationError::PlacementImpossible { what, zone })
}

fn place_exit(
    ctx: &mut PlacementContext<'_>,
    zone: ZoneId,
) -> Result<[TilePos; 2], GenerationError> {
    let full = ctx.grid.width() as i32 - 1;
    let half = full / 2;
    let offsets = (half - 1).max(1) as usize;

    let mut chosen = None;
    for _ in 0..ctx.attempts {
        let offset = ctx.rng.below(offsets) as i32;
        let candidate = if ctx.rng.coin() {
            side_wall_exit(zone, full, half, offset)
        } else {
            end_wall_exit(zone, full, half, offset)
        };
        if exit_fits(ctx.grid, &candidate) {
            chosen = Some(candidate);
            break;
        }
    }

    if chosen.is_none() {
        record_exhausted(ctx, "exit", zone);
        chosen = (0..offsets as i32)
            .flat_map(|offset| {
                [side_wall_exit(zone, full, half, offset), end_wall_exit(zone, full, half, offset)]
            })
            .find(|candidate| exit_fits(ctx.grid, candidate));
    }

    let candidate = chosen.ok_or(GenerationError::PlacementImpossible { what: "exit", zone })?;
    for tile in candidate.tiles {
        ctx.grid
            .set_kind(tile, TileKind::Exit)
            .map_err(|_| GenerationError::PlacementImpossible { what: "exit", zone })?;
    }
    Ok(candidate.tiles)
}

/// Exit in the zone's west or east perimeter wall.
fn side_wall_exit(zone: ZoneId, full: i32, half: i32, offset: i32) -> ExitCandidate {
    let (x, inward) = if zone.is_east() { (full, -1) } else { (0, 1) };
    let top = offset + if zone.is_south() { half } else { 0 };
    ExitCandidate {
        tiles: [TilePos { y: top, x }, TilePos { y: top + 1, x }],
        backing: [TilePos { y: top, x: x + inward }, TilePos { y: top + 1, x: x + inward }],
    }
}

/// Exit in the zone's north or south perimeter wall.
fn end_wall_exit(zone: ZoneId, full: i32, half: i32, offset: i32) -> ExitCandidate {
    let (y, inward) = if zone.is_south() { (full, -1) } else { (0, 1) };
    let left = offset + if zone.is_east() { half } else { 0 };
    ExitCandidate {
        tiles: [TilePos { y, x: left }, TilePos { y, x: left + 1 }],
        backing: [TilePos { y: y + inward, x: left }, TilePos { y: y + inward, x: left + 1 }],
    }
}

fn exit_fits(grid: &TileGrid, candidate: &ExitCandidate) -> bool {
    let is_wall = |pos: TilePos| grid.tile(pos).is_some_and(|tile| tile.kind == TileKind::Wall);
    candidate.tiles.iter().all(|&pos| is_wall(pos))
        && candidate.backing.iter().all(|&pos| grid.is_empty_floor(pos))
}

fn record_exhausted(ctx: &mut PlacementContext<'_>, phase: &'static str, zone: ZoneId) {
    warn!(phase, zone = zone.0, attempts = ctx.attempts, "placement sampling exhausted");
    ctx.diagnostics.push(GenerationDiagnostic::PlacementExhausted {
        phase,
        zone: Some(zone),
        attempts: ctx.attempts,
    });
}
