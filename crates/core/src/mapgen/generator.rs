//! Phase-by-phase level generation that composes layout, links, expansion, and placement.

use tracing::{debug, warn};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::grid::TileGrid;
use crate::rng::LevelRng;
use crate::types::ZoneId;

use super::expand::{ExpansionRolls, expand_layout};
use super::layout::{MazeLayout, Room, Zone, carve_random_rooms, fill_corridors, fill_rooms};
use super::links::{
    REQUIRED_ZONE_LINKS, connect_zone, enforce_hallway_minimum, link_zones, open_room_paths,
};
use super::model::{AgentSpawn, GeneratedLevel, GenerationDiagnostic};
use super::progression::{self, pillar_chance, spawn_chance};
use super::spawns::{Placement, PlacementContext, place_player_and_exit};

const ZONE_PHASES: usize = 5;
const TOTAL_PHASES: usize = ZONE_PHASES * ZoneId::ALL.len() + 3;

/// One `step()` of generation. Zone-scoped phases sweep all four zones before the next
/// phase starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenerationPhase {
    RoomCarve(ZoneId),
    RoomFill(ZoneId),
    CorridorFill(ZoneId),
    PathCreation(ZoneId),
    /// Hallway minimum followed by the connectivity repair of the same zone.
    ZoneRepair(ZoneId),
    CrossZoneLinks,
    Expansion,
    Placement,
}

impl GenerationPhase {
    fn at(index: usize) -> Option<Self> {
        let zones = ZoneId::ALL.len();
        if index < ZONE_PHASES * zones {
            let zone = ZoneId::ALL[index % zones];
            return Some(match index / zones {
                0 => Self::RoomCarve(zone),
                1 => Self::RoomFill(zone),
                2 => Self::CorridorFill(zone),
                3 => Self::PathCreation(zone),
                _ => Self::ZoneRepair(zone),
            });
        }
        match index - ZONE_PHASES * zones {
            0 => Some(Self::CrossZoneLinks),
            1 => Some(Self::Expansion),
            2 => Some(Self::Placement),
            _ => None,
        }
    }
}

/// Stepwise generator for one level.
///
/// `step()` runs a single phase and refreshes `projection()`. Intermediate projections draw
/// no randomness, so stepping to the end produces the same level as `finish()`.
pub struct MapGenerator {
    seed: u64,
    difficulty: u32,
    config: GenerationConfig,
    rng: LevelRng,
    layout: MazeLayout,
    next_phase: usize,
    projection: TileGrid,
    agent_spawns: Vec<AgentSpawn>,
    zone_links: Vec<(ZoneId, ZoneId)>,
    placement: Option<Placement>,
    diagnostics: Vec<GenerationDiagnostic>,
}

impl MapGenerator {
    pub fn new(seed: u64, difficulty: u32, config: &GenerationConfig) -> Self {
        let layout = MazeLayout::new(progression::zone_side(config, difficulty));
        let projection = expand_layout(&layout, config.scaler, None).grid;
        Self {
            seed,
            difficulty,
            config: config.clone(),
            rng: LevelRng::seed_from_u64(seed),
            layout,
            next_phase: 0,
            projection,
            agent_spawns: Vec::new(),
            zone_links: Vec::new(),
            placement: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn next_phase(&self) -> Option<GenerationPhase> {
        GenerationPhase::at(self.next_phase)
    }

    pub fn is_finished(&self) -> bool {
        self.next_phase >= TOTAL_PHASES
    }

    /// Tile view of the current state.
    pub fn projection(&self) -> &TileGrid {
        &self.projection
    }

    pub fn rooms(&self) -> &[Room] {
        &self.layout.rooms
    }

    pub fn zones(&self) -> &[Zone] {
        &self.layout.zones
    }

    pub fn diagnostics(&self) -> &[GenerationDiagnostic] {
        &self.diagnostics
    }

    /// Runs the next phase. Returns the phase that ran, or `None` once generation is done.
    pub fn step(&mut self) -> Result<Option<GenerationPhase>, GenerationError> {
        let Some(phase) = self.next_phase() else {
            return Ok(None);
        };
        self.run_phase(phase)?;
        self.next_phase += 1;

        if !matches!(phase, GenerationPhase::Expansion | GenerationPhase::Placement) {
            self.projection = expand_layout(&self.layout, self.config.scaler, None).grid;
        }
        debug!(seed = self.seed, ?phase, "generation phase complete");
        Ok(Some(phase))
    }

    /// Runs the remaining phases and returns the finished level.
    pub fn finish(mut self) -> Result<GeneratedLevel, GenerationError> {
        while self.step()?.is_some() {}
        let Some(placement) = self.placement else {
            return Err(GenerationError::PlacementImpossible {
                what: "player spawn",
                zone: ZoneId(0),
            });
        };
        Ok(GeneratedLevel {
            seed: self.seed,
            layout_seed: self.seed,
            difficulty: self.difficulty,
            grid: self.projection,
            spawn: placement.spawn,
            spawn_zone: placement.spawn_zone,
            exit: placement.exit,
            exit_zone: placement.exit_zone,
            elite: placement.elite,
            agent_spawns: self.agent_spawns,
            zone_links: self.zone_links,
            diagnostics: self.diagnostics,
        })
    }

    fn run_phase(&mut self, phase: GenerationPhase) -> Result<(), GenerationError> {
        let config = &self.config;
        match phase {
            GenerationPhase::RoomCarve(zone) => {
                let placed = carve_random_rooms(
                    &mut self.layout,
                    zone,
                    self.difficulty,
                    config.room_carve_attempts,
                    &mut self.rng,
                );
                debug!(zone = zone.0, placed, "random rooms carved");
            }
            GenerationPhase::RoomFill(zone) => {
                fill_rooms(&mut self.layout, zone, self.difficulty);
            }
            GenerationPhase::CorridorFill(zone) => {
                fill_corridors(&mut self.layout, zone);
            }
            GenerationPhase::PathCreation(zone) => {
                let exhausted =
                    open_room_paths(&mut self.layout, zone, config.path_attempts, &mut self.rng);
                for _ in exhausted {
                    self.diagnostics.push(GenerationDiagnostic::PlacementExhausted {
                        phase: "path creation",
                        zone: Some(zone),
                        attempts: config.path_attempts,
                    });
                }
            }
            GenerationPhase::ZoneRepair(zone) => {
                let exhausted = enforce_hallway_minimum(
                    &mut self.layout,
                    zone,
                    config.path_attempts,
                    &mut self.rng,
                );
                for _ in exhausted {
                    self.diagnostics.push(GenerationDiagnostic::PlacementExhausted {
                        phase: "hallway minimum",
                        zone: Some(zone),
                        attempts: config.path_attempts,
                    });
                }
                connect_zone(
                    &mut self.layout,
                    zone,
                    config.connectivity_retry_limit,
                    config.path_attempts,
                    &mut self.rng,
                )?;
            }
            GenerationPhase::CrossZoneLinks => {
                let linked =
                    link_zones(&mut self.layout, config.cross_zone_attempts, &mut self.rng);
                if linked < REQUIRED_ZONE_LINKS {
                    warn!(
                        linked,
                        attempts = config.cross_zone_attempts,
                        "cross-zone linking exhausted"
                    );
                    self.diagnostics.push(GenerationDiagnostic::PlacementExhausted {
                        phase: "cross-zone links",
                        zone: None,
                        attempts: config.cross_zone_attempts,
                    });
                }
                self.zone_links = self
                    .layout
                    .zones
                    .iter()
                    .flat_map(|zone| {
                        zone.neighbors
                            .iter()
                            .filter(move |&&other| zone.id < other)
                            .map(move |&other| (zone.id, other))
                    })
                    .collect();
            }
            GenerationPhase::Expansion => {
                let rolls = ExpansionRolls {
                    rng: &mut self.rng,
                    pillar_chance: pillar_chance(config, self.difficulty),
                    spawn_chance: config
                        .spawn_agents
                        .then(|| spawn_chance(config, self.difficulty)),
                };
                let expansion = expand_layout(&self.layout, config.scaler, Some(rolls));
                self.projection = expansion.grid;
                self.agent_spawns = expansion.spawns;
            }
            GenerationPhase::Placement => {
                let dead_ends: Vec<ZoneId> = self
                    .layout
                    .zones
                    .iter()
                    .filter(|zone| zone.neighbors.len() == 1)
                    .map(|zone| zone.id)
                    .collect();
                let mut ctx = PlacementContext {
                    grid: &mut self.projection,
                    rng: &mut self.rng,
                    attempts: config.placement_attempts,
                    spawn_elite: config.spawn_elite,
                    diagnostics: &mut self.diagnostics,
                };
                self.placement = Some(place_player_and_exit(&mut ctx, &dead_ends)?);
            }
        }
        Ok(())
    }
}
