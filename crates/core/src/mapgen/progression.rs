//! Difficulty curves used by map generation and agent construction.

use crate::config::{AgentConfig, GenerationConfig};

/// Maze cells along one side of a zone.
pub fn zone_side(config: &GenerationConfig, difficulty: u32) -> usize {
    config.min_zone_side + difficulty as usize
}

/// Tiles along one side of the full grid, including the closing wall row.
pub fn grid_side(config: &GenerationConfig, difficulty: u32) -> usize {
    config.scaler * zone_side(config, difficulty) * 2 + 1
}

/// Largest side of a randomly carved room.
pub(super) fn carve_size_max(difficulty: u32) -> usize {
    difficulty as usize / 2 + 3
}

/// Largest side tried by the exhaustive fill.
pub(super) fn fill_size_max(difficulty: u32) -> usize {
    difficulty as usize / 2 + 4
}

pub fn pillar_chance(config: &GenerationConfig, difficulty: u32) -> f64 {
    (config.base_pillar_chance + config.pillar_chance_step * f64::from(difficulty)).min(1.0)
}

pub fn spawn_chance(config: &GenerationConfig, difficulty: u32) -> f64 {
    (config.base_spawn_chance + config.spawn_chance_step * f64::from(difficulty)).min(1.0)
}

pub fn agent_speed(config: &AgentConfig, difficulty: u32) -> f64 {
    config.base_speed * config.speed_growth.powi(difficulty as i32)
}

pub fn elite_speed(config: &AgentConfig, difficulty: u32) -> f64 {
    agent_speed(config, difficulty) + config.elite_speed_bonus * f64::from(difficulty)
}
