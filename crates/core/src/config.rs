//! Tunable generation and session parameters.
//! This module exists to load and validate the knobs shared by the generator, the navigation
//! engine, and the session loop. It does not own any runtime state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest tile block a maze cell may expand into.
pub const MAX_SCALER: usize = 16;
/// Largest zone side, in maze cells, at difficulty 0.
pub const MAX_MIN_ZONE_SIDE: usize = 64;
/// Largest Manhattan radius the player may reveal per frame.
pub const MAX_SIGHT_RANGE: u32 = 64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Side length of the tile block each maze cell expands into.
    pub scaler: usize,
    /// Maze cells per zone side at difficulty 0.
    pub min_zone_side: usize,
    pub room_carve_attempts: u32,
    pub path_attempts: u32,
    pub connectivity_retry_limit: u32,
    pub cross_zone_attempts: u32,
    pub placement_attempts: u32,
    pub regeneration_limit: u32,
    pub base_pillar_chance: f64,
    pub pillar_chance_step: f64,
    pub base_spawn_chance: f64,
    pub spawn_chance_step: f64,
    pub spawn_agents: bool,
    pub spawn_elite: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            scaler: 4,
            min_zone_side: 5,
            room_carve_attempts: 50,
            path_attempts: 50,
            connectivity_retry_limit: 5_000,
            cross_zone_attempts: 64,
            placement_attempts: 10_000,
            regeneration_limit: 8,
            base_pillar_chance: 0.2,
            pillar_chance_step: 0.2,
            base_spawn_chance: 0.01,
            spawn_chance_step: 0.0025,
            spawn_agents: true,
            spawn_elite: true,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=MAX_SCALER).contains(&self.scaler) {
            return Err(invalid(format!(
                "scaler must be between 4 and {MAX_SCALER}, got {}",
                self.scaler
            )));
        }
        if !(3..=MAX_MIN_ZONE_SIDE).contains(&self.min_zone_side) {
            return Err(invalid(format!(
                "min_zone_side must be between 3 and {MAX_MIN_ZONE_SIDE}, got {}",
                self.min_zone_side
            )));
        }
        if self.path_attempts == 0 || self.cross_zone_attempts == 0 || self.placement_attempts == 0
        {
            return Err(invalid("attempt budgets must be non-zero".to_string()));
        }
        for (name, value) in [
            ("base_pillar_chance", self.base_pillar_chance),
            ("pillar_chance_step", self.pillar_chance_step),
            ("base_spawn_chance", self.base_spawn_chance),
            ("spawn_chance_step", self.spawn_chance_step),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{name} must be a non-negative number")));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Graph distance within which an agent senses the player.
    pub scent_range: u32,
    /// Tiles per second at difficulty 0.
    pub base_speed: f64,
    /// Per-difficulty speed multiplier.
    pub speed_growth: f64,
    /// Extra speed per difficulty level for the elite agent.
    pub elite_speed_bonus: f64,
    /// Maximum nodes a single path search may expand. `None` searches the whole grid.
    pub path_budget: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            scent_range: 15,
            base_speed: 0.5,
            speed_growth: 1.25,
            elite_speed_bonus: 0.125,
            path_budget: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub decision_period_secs: f64,
    /// Manhattan radius of tiles the player reveals around itself.
    pub sight_range: u32,
    /// Manhattan distance at which an agent catches the player.
    pub catch_distance: f64,
    pub agents: AgentConfig,
    pub generation: GenerationConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            decision_period_secs: 2.0,
            sight_range: 7,
            catch_distance: 0.3,
            agents: AgentConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.decision_period_secs.is_finite() || self.decision_period_secs <= 0.0 {
            return Err(invalid("decision_period_secs must be positive".to_string()));
        }
        if self.sight_range > MAX_SIGHT_RANGE {
            return Err(invalid(format!(
                "sight_range must be at most {MAX_SIGHT_RANGE}, got {}",
                self.sight_range
            )));
        }
        if !self.catch_distance.is_finite() || self.catch_distance < 0.0 {
            return Err(invalid("catch_distance must be non-negative".to_string()));
        }
        let agents = &self.agents;
        if !agents.base_speed.is_finite() || agents.base_speed < 0.0 {
            return Err(invalid("agents.base_speed must be non-negative".to_string()));
        }
        if !agents.speed_growth.is_finite() || agents.speed_growth <= 0.0 {
            return Err(invalid("agents.speed_growth must be positive".to_string()));
        }
        if !agents.elite_speed_bonus.is_finite() {
            return Err(invalid("agents.elite_speed_bonus must be finite".to_string()));
        }
        self.generation.validate()
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = SessionConfig::from_toml_str("").expect("parse");
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = SessionConfig::from_toml_str(
            r#"
            decision_period_secs = 1.5

            [agents]
            scent_range = 9

            [generation]
            spawn_agents = false
            "#,
        )
        .expect("parse");

        assert_eq!(config.decision_period_secs, 1.5);
        assert_eq!(config.agents.scent_range, 9);
        assert_eq!(config.agents.base_speed, 0.5);
        assert!(!config.generation.spawn_agents);
        assert!(config.generation.spawn_elite);
        assert_eq!(config.generation.scaler, 4);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SessionConfig::from_toml_str("decision_period_secs = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SessionConfig::from_toml_str("[generation]\nscaler = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SessionConfig::from_toml_str("sight_range = \"far\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn oversized_values_are_rejected() {
        for toml in [
            "sight_range = 65",
            "sight_range = 4294967295",
            "[generation]\nscaler = 17",
            "[generation]\nmin_zone_side = 65",
            "[generation]\nmin_zone_side = 100000",
        ] {
            let err = SessionConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{toml} should be rejected");
        }

        let config = SessionConfig::from_toml_str(
            "sight_range = 64\n[generation]\nscaler = 16\nmin_zone_side = 64",
        )
        .expect("upper bounds are inclusive");
        assert_eq!(config.generation.scaler, MAX_SCALER);
    }

    #[test]
    fn config_loads_from_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("house.toml");
        fs::write(&path, "sight_range = 4\n[generation]\nmin_zone_side = 6\n").expect("write");

        let config = SessionConfig::load(&path).expect("load");
        assert_eq!(config.sight_range, 4);
        assert_eq!(config.generation.min_zone_side, 6);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().expect("tempdir");
        let err = SessionConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = SessionConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let decoded: SessionConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(config, decoded);
    }
}
