use slotmap::SlotMap;

use crate::config::AgentConfig;
use crate::grid::TileGrid;
use crate::mapgen::progression::{agent_speed, elite_speed};
use crate::mapgen::{AgentSpawn, GeneratedLevel};
use crate::types::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub behavior: Behavior,
    pub mode: AgentMode,
    pub pos: Point,
    /// Degrees; 0 points along +x and 90 along +y.
    pub heading: f64,
    pub tile: TilePos,
    /// Waypoints toward the player, nearest first.
    pub path: Vec<TilePos>,
    pub scent_range: u32,
    pub speed: f64,
    pub can_smell: bool,
    /// Set by a blocked move; cleared by the next decision.
    pub collided: bool,
}

impl Agent {
    pub fn from_spawn(id: AgentId, spawn: &AgentSpawn, speed: f64, scent_range: u32) -> Self {
        Self {
            id,
            behavior: spawn.behavior,
            mode: AgentMode::Wander,
            pos: spawn.pos,
            heading: spawn.heading,
            tile: spawn.pos.cell(),
            path: Vec::new(),
            scent_range,
            speed,
            can_smell: false,
            collided: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelInfo {
    pub seed: u64,
    pub layout_seed: u64,
    pub difficulty: u32,
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub level: LevelInfo,
    pub grid: TileGrid,
    pub agents: SlotMap<AgentId, Agent>,
    pub spawn: TilePos,
    pub exit: [TilePos; 2],
}

impl GameState {
    /// Builds the runtime state for a freshly generated level. The elite is inserted first.
    pub fn from_level(level: GeneratedLevel, agents: &AgentConfig) -> Self {
        let difficulty = level.difficulty;
        let mut collection = SlotMap::with_key();
        for spawn in level.elite.iter().chain(&level.agent_spawns) {
            let speed = match spawn.behavior {
                Behavior::Elite => elite_speed(agents, difficulty),
                Behavior::Wanderer | Behavior::LineWalker => agent_speed(agents, difficulty),
            };
            collection
                .insert_with_key(|id| Agent::from_spawn(id, spawn, speed, agents.scent_range));
        }
        Self {
            level: LevelInfo { seed: level.seed, layout_seed: level.layout_seed, difficulty },
            grid: level.grid,
            agents: collection,
            spawn: level.spawn,
            exit: level.exit,
        }
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().collect()
    }

    pub fn elite(&self) -> Option<&Agent> {
        self.agents.values().find(|agent| agent.behavior == Behavior::Elite)
    }
}
