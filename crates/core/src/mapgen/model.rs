//! Public data models for generated levels, agent spawns, and generation diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::GenerationError;
use crate::grid::TileGrid;
use crate::types::{Behavior, Point, TileKind, TilePos, ZoneId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSpawn {
    pub behavior: Behavior,
    pub pos: Point,
    pub heading: f64,
}

/// Non-fatal events recorded while building a level.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationDiagnostic {
    /// A bounded loop ran out of attempts and the phase moved on.
    PlacementExhausted { phase: &'static str, zone: Option<ZoneId>, attempts: u32 },
    /// A failed attempt was thrown away and generation restarted from `to_seed`.
    Reseeded { from_seed: u64, to_seed: u64, reason: GenerationError },
}

impl fmt::Display for GenerationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlacementExhausted { phase, zone: Some(zone), attempts } => {
                write!(f, "{phase} gave up in zone {} after {attempts} attempts", zone.0)
            }
            Self::PlacementExhausted { phase, zone: None, attempts } => {
                write!(f, "{phase} gave up after {attempts} attempts")
            }
            Self::Reseeded { from_seed, to_seed, reason } => {
                write!(f, "seed {from_seed} rejected ({reason}); retried with {to_seed}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedLevel {
    /// Seed the level was requested with.
    pub seed: u64,
    /// Seed that actually produced the layout. Differs from `seed` after a regeneration.
    pub layout_seed: u64,
    pub difficulty: u32,
    pub grid: TileGrid,
    pub spawn: TilePos,
    pub spawn_zone: ZoneId,
    pub exit: [TilePos; 2],
    pub exit_zone: ZoneId,
    pub elite: Option<AgentSpawn>,
    pub agent_spawns: Vec<AgentSpawn>,
    pub zone_links: Vec<(ZoneId, ZoneId)>,
    pub diagnostics: Vec<GenerationDiagnostic>,
}

impl GeneratedLevel {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.grid.width() as u32).to_le_bytes());
        bytes.extend((self.grid.height() as u32).to_le_bytes());
        for tile in self.grid.tiles() {
            bytes.push(match tile.kind {
                TileKind::Wall => 0,
                TileKind::Floor => 1,
                TileKind::Exit => 2,
            });
            bytes.push(tile.zone.0);
            bytes.push(u8::from(tile.occupied));
        }
        bytes.extend(self.spawn.y.to_le_bytes());
        bytes.extend(self.spawn.x.to_le_bytes());
        for exit in self.exit {
            bytes.extend(exit.y.to_le_bytes());
            bytes.extend(exit.x.to_le_bytes());
        }

        let records = self.elite.iter().chain(&self.agent_spawns);
        bytes.extend((records.clone().count() as u32).to_le_bytes());
        for spawn in records {
            bytes.push(match spawn.behavior {
                Behavior::Wanderer => 0,
                Behavior::LineWalker => 1,
                Behavior::Elite => 2,
            });
            bytes.extend(spawn.pos.x.to_bits().to_le_bytes());
            bytes.extend(spawn.pos.y.to_bits().to_le_bytes());
            bytes.extend(spawn.heading.to_bits().to_le_bytes());
        }

        bytes.push(self.zone_links.len() as u8);
        for (a, b) in &self.zone_links {
            bytes.push(a.0);
            bytes.push(b.0);
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    pub fn tile_kind(&self, pos: TilePos) -> TileKind {
        self.grid.kind_at(pos)
    }
}
