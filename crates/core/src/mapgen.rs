//! Procedural level generation split into coherent submodules.

pub mod model;
pub mod progression;
pub mod seed;

mod expand;
mod generator;
mod layout;
mod links;
mod spawns;

use tracing::{info, warn};

use crate::config::GenerationConfig;
use crate::error::GenerationError;

pub use generator::{GenerationPhase, MapGenerator};
pub use layout::{Room, Zone};
pub use model::{AgentSpawn, GeneratedLevel, GenerationDiagnostic};
pub use seed::derive_level_seed;

use seed::regeneration_seed;

/// Generates a complete level, regenerating from a reseeded stream when a layout cannot be
/// repaired.
pub fn generate(
    seed: u64,
    difficulty: u32,
    config: &GenerationConfig,
) -> Result<GeneratedLevel, GenerationError> {
    let mut reseeds = Vec::new();
    let mut layout_seed = seed;
    for attempt in 0..=config.regeneration_limit {
        match MapGenerator::new(layout_seed, difficulty, config).finish() {
            Ok(mut level) => {
                level.seed = seed;
                reseeds.append(&mut level.diagnostics);
                level.diagnostics = reseeds;
                info!(
                    seed,
                    layout_seed,
                    difficulty,
                    width = level.grid.width(),
                    agents = level.agent_spawns.len(),
                    "level generated"
                );
                return Ok(level);
            }
            Err(err) if err.is_recoverable() && attempt < config.regeneration_limit => {
                let next_seed = regeneration_seed(seed, attempt + 1);
                warn!(seed, layout_seed, next_seed, error = %err, "regenerating level");
                reseeds.push(GenerationDiagnostic::Reseeded {
                    from_seed: layout_seed,
                    to_seed: next_seed,
                    reason: err,
                });
                layout_seed = next_seed;
            }
            Err(err) if err.is_recoverable() => break,
            Err(err) => return Err(err),
        }
    }
    Err(GenerationError::RegenerationExhausted { seed, attempts: config.regeneration_limit + 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TileKind, TilePos, ZoneId};

    #[test]
    fn generate_matches_map_generator_output() {
        let config = GenerationConfig::default();
        let from_helper = generate(123, 1, &config).expect("level");
        let from_generator = MapGenerator::new(123, 1, &config).finish().expect("level");
        if from_helper.layout_seed == 123 {
            assert_eq!(from_helper, from_generator);
        }
    }

    #[test]
    fn stepping_matches_one_shot_generation() {
        let config = GenerationConfig::default();
        let mut stepped = MapGenerator::new(42, 0, &config);
        let mut phases = Vec::new();
        while let Some(phase) = stepped.step().expect("phase") {
            phases.push(phase);
            assert_eq!(stepped.projection().width(), 41);
        }
        assert_eq!(phases.len(), 23);
        assert_eq!(phases[0], GenerationPhase::RoomCarve(ZoneId(0)));
        assert_eq!(phases[3], GenerationPhase::RoomCarve(ZoneId(3)));
        assert_eq!(phases[4], GenerationPhase::RoomFill(ZoneId(0)));
        assert_eq!(phases[11], GenerationPhase::CorridorFill(ZoneId(3)));
        assert_eq!(phases[12], GenerationPhase::PathCreation(ZoneId(0)));
        assert_eq!(phases[16], GenerationPhase::ZoneRepair(ZoneId(0)));
        assert_eq!(phases[19], GenerationPhase::ZoneRepair(ZoneId(3)));
        assert_eq!(phases[20], GenerationPhase::CrossZoneLinks);
        assert_eq!(phases.last(), Some(&GenerationPhase::Placement));
        assert!(stepped.is_finished());
        assert_eq!(stepped.step().expect("done"), None);

        let one_shot = MapGenerator::new(42, 0, &config).finish().expect("level");
        assert_eq!(stepped.projection(), &one_shot.grid);
    }

    #[test]
    fn zero_connectivity_budget_exhausts_regeneration() {
        let config = GenerationConfig {
            connectivity_retry_limit: 0,
            path_attempts: 1,
            regeneration_limit: 2,
            ..GenerationConfig::default()
        };
        match generate(5, 0, &config) {
            Err(GenerationError::RegenerationExhausted { seed, attempts }) => {
                assert_eq!(seed, 5);
                assert_eq!(attempts, 3);
            }
            Ok(level) => {
                // A lucky stream can still connect every zone without forced doorways.
                assert_eq!(level.tile_kind(level.exit[0]), TileKind::Exit);
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn level_zero_is_forty_one_tiles_square() {
        let level = generate(42, 0, &GenerationConfig::default()).expect("level");
        assert_eq!(level.grid.width(), 41);
        assert_eq!(level.grid.height(), 41);
        assert_eq!(level.tile_kind(TilePos { y: 0, x: 0 }), TileKind::Wall);
    }
}
