//! Session loop for one run of levels.
//! This module exists to own the game state, apply rebuild requests at tick boundaries, and
//! report player events. It does not read input or render; callers feed it the player's
//! position and act on the returned events.

use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::{GenerationError, SessionError};
use crate::mapgen::seed::{SIMULATION_STREAM, mix_seed_stream};
use crate::mapgen::{GenerationDiagnostic, derive_level_seed, generate};
use crate::nav::{DecisionContext, SearchScratch, advance_agent, decide};
use crate::rng::LevelRng;
use crate::scheduler::DecisionScheduler;
use crate::state::GameState;
use crate::types::{AgentId, Point, TileKind, TilePos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildRequest {
    /// Same seed, same difficulty.
    Restart,
    /// Next difficulty with a freshly derived seed.
    Advance,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    LevelBuilt { difficulty: u32, seed: u64 },
    PlayerCaught { agent: AgentId },
    ExitReached,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub decision_ticks: u32,
    pub events: Vec<SessionEvent>,
}

pub struct Session {
    run_seed: u64,
    config: SessionConfig,
    state: GameState,
    rng: LevelRng,
    scheduler: DecisionScheduler,
    scratch: SearchScratch,
    pending: Option<RebuildRequest>,
    diagnostics: Vec<GenerationDiagnostic>,
}

impl Session {
    /// Validates `config` and builds the difficulty 0 level of the run.
    pub fn new(run_seed: u64, config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let built = build_level(run_seed, 0, &config)?;
        Ok(Self {
            run_seed,
            scheduler: DecisionScheduler::new(config.decision_period_secs),
            scratch: SearchScratch::new(built.state.grid.len()),
            config,
            state: built.state,
            rng: built.rng,
            pending: None,
            diagnostics: built.diagnostics,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    pub fn difficulty(&self) -> u32 {
        self.state.level.difficulty
    }

    /// Diagnostics recorded while generating the current level.
    pub fn diagnostics(&self) -> &[GenerationDiagnostic] {
        &self.diagnostics
    }

    /// True when no search left marks behind in the session's scratch.
    pub fn scratch_is_clean(&self) -> bool {
        self.scratch.is_clean()
    }

    pub fn pending_request(&self) -> Option<RebuildRequest> {
        self.pending
    }

    /// Rebuilds the current level at the start of the next `update`.
    pub fn request_restart(&mut self) {
        self.pending = Some(RebuildRequest::Restart);
    }

    /// Moves to the next difficulty at the start of the next `update`.
    pub fn request_advance(&mut self) {
        self.pending = Some(RebuildRequest::Advance);
    }

    pub fn restart(&mut self) -> Result<(), GenerationError> {
        self.rebuild(self.difficulty())
    }

    pub fn advance(&mut self) -> Result<(), GenerationError> {
        self.rebuild(self.difficulty() + 1)
    }

    /// One frame: pending rebuild, player sight, movement, due decisions, then events.
    pub fn update(&mut self, dt: f64, player: Point) -> Result<UpdateReport, GenerationError> {
        let mut report = UpdateReport::default();
        if let Some(request) = self.pending.take() {
            match request {
                RebuildRequest::Restart => self.restart()?,
                RebuildRequest::Advance => self.advance()?,
            }
            report.events.push(SessionEvent::LevelBuilt {
                difficulty: self.state.level.difficulty,
                seed: self.state.level.seed,
            });
        }

        let player_cell = player.cell();
        if self.state.grid.in_bounds(player_cell) {
            self.state.grid.reveal_around(player_cell, self.config.sight_range);
        }

        self.move_agents(dt);
        report.decision_ticks = self.scheduler.advance(dt);
        for _ in 0..report.decision_ticks {
            self.run_decision_tick(player_cell);
        }

        if self.state.grid.kind_at(player_cell) == TileKind::Exit {
            report.events.push(SessionEvent::ExitReached);
            self.request_advance();
        } else if let Some(agent) = self.catcher(player) {
            report.events.push(SessionEvent::PlayerCaught { agent });
            self.request_restart();
        }
        Ok(report)
    }

    /// Visits every agent once, in key order, with the player at `player`.
    pub fn run_decision_tick(&mut self, player: TilePos) {
        for id in self.state.agent_ids() {
            let Some(agent) = self.state.agents.get_mut(id) else {
                continue;
            };
            let mut ctx = DecisionContext {
                grid: &self.state.grid,
                player,
                path_budget: self.config.agents.path_budget,
                rng: &mut self.rng,
                scratch: &mut self.scratch,
            };
            let Some(alert) = decide(agent, &mut ctx) else {
                continue;
            };
            for (other_id, other) in self.state.agents.iter_mut() {
                if other_id != id {
                    other.can_smell = alert;
                }
            }
        }
    }

    fn move_agents(&mut self, dt: f64) {
        for id in self.state.agent_ids() {
            let others: Vec<Point> = self
                .state
                .agents
                .iter()
                .filter(|&(other_id, _)| other_id != id)
                .map(|(_, other)| other.pos)
                .collect();
            if let Some(agent) = self.state.agents.get_mut(id) {
                advance_agent(agent, &self.state.grid, &others, dt);
            }
        }
    }

    fn catcher(&self, player: Point) -> Option<AgentId> {
        self.state
            .agents
            .iter()
            .find(|(_, agent)| agent.pos.manhattan(player) < self.config.catch_distance)
            .map(|(id, _)| id)
    }

    fn rebuild(&mut self, difficulty: u32) -> Result<(), GenerationError> {
        let built = build_level(self.run_seed, difficulty, &self.config)?;
        self.scratch = SearchScratch::new(built.state.grid.len());
        self.state = built.state;
        self.rng = built.rng;
        self.diagnostics = built.diagnostics;
        self.scheduler.reset();
        self.pending = None;
        debug!(difficulty, agents = self.state.agents.len(), "session rebuilt");
        Ok(())
    }
}

struct BuiltLevel {
    state: GameState,
    rng: LevelRng,
    diagnostics: Vec<GenerationDiagnostic>,
}

fn build_level(
    run_seed: u64,
    difficulty: u32,
    config: &SessionConfig,
) -> Result<BuiltLevel, GenerationError> {
    let seed = derive_level_seed(run_seed, difficulty);
    let mut level = generate(seed, difficulty, &config.generation)?;
    let diagnostics = std::mem::take(&mut level.diagnostics);
    let state = GameState::from_level(level, &config.agents);
    info!(run_seed, seed, difficulty, agents = state.agents.len(), "level ready");
    Ok(BuiltLevel {
        state,
        rng: LevelRng::seed_from_u64(mix_seed_stream(seed, SIMULATION_STREAM)),
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::AgentSpawn;
    use crate::nav::can_sense;
    use crate::state::Agent;
    use crate::types::{AgentMode, Behavior};

    fn quiet_config() -> SessionConfig {
        let mut config = SessionConfig::default();
        config.generation.spawn_agents = false;
        config.generation.spawn_elite = false;
        config
    }

    #[test]
    fn rebuild_requests_wait_for_the_next_update() {
        let mut session = Session::new(11, quiet_config()).expect("session");
        let spawn = session.state().spawn.center();

        session.request_advance();
        assert_eq!(session.difficulty(), 0);
        assert_eq!(session.pending_request(), Some(RebuildRequest::Advance));

        let report = session.update(0.016, spawn).expect("update");
        assert_eq!(session.difficulty(), 1);
        assert_eq!(session.pending_request(), None);
        assert!(matches!(report.events[0], SessionEvent::LevelBuilt { difficulty: 1, .. }));
    }

    #[test]
    fn player_on_exit_queues_an_advance() {
        let mut session = Session::new(5, quiet_config()).expect("session");
        let exit = session.state().exit[0].center();
        let report = session.update(0.016, exit).expect("update");
        assert_eq!(report.events, vec![SessionEvent::ExitReached]);
        assert_eq!(session.pending_request(), Some(RebuildRequest::Advance));
    }

    #[test]
    fn elite_on_top_of_the_player_catches_it() {
        let mut config = quiet_config();
        config.generation.spawn_elite = true;
        let mut session = Session::new(9, config).expect("session");
        let elite = session.state().elite().expect("elite").clone();

        let report = session.update(0.0, elite.pos).expect("update");
        assert_eq!(report.events, vec![SessionEvent::PlayerCaught { agent: elite.id }]);
        assert_eq!(session.pending_request(), Some(RebuildRequest::Restart));
    }

    #[test]
    fn elite_alert_reaches_other_agents_on_the_same_tick() {
        let mut config = quiet_config();
        config.generation.spawn_elite = true;
        let mut session = Session::new(42, config).expect("session");
        let elite_tile = session.state().elite().expect("elite").tile;
        let walker_tile = session.state().spawn;

        // A walker that only smells its own tile, parked in the player's zone.
        let spawn = AgentSpawn {
            behavior: Behavior::LineWalker,
            pos: walker_tile.center(),
            heading: 90.0,
        };
        let walker = session
            .state
            .agents
            .insert_with_key(|id| Agent::from_spawn(id, &spawn, 0.5, 0));
        let mut scratch = SearchScratch::new(session.state().grid.len());
        assert!(!can_sense(&session.state().grid, walker_tile, elite_tile, 0, &mut scratch));

        session.run_decision_tick(elite_tile);
        let elite = session.state().elite().expect("elite");
        assert_eq!(elite.mode, AgentMode::Chase);
        let agent = &session.state().agents[walker];
        assert_eq!(agent.mode, AgentMode::Chase, "alert applies before the walker decides");
        assert!(agent.can_smell);
        assert_eq!(agent.path.last(), Some(&elite_tile));

        let outside = TilePos { y: -50, x: -50 };
        session.run_decision_tick(outside);
        let elite = session.state().elite().expect("elite");
        assert_ne!(elite.mode, AgentMode::Chase);
        let agent = &session.state().agents[walker];
        assert_eq!(agent.mode, AgentMode::Wander);
        assert!(!agent.can_smell);
        assert!(agent.path.is_empty());
        assert!(session.scratch_is_clean());
    }

    #[test]
    fn session_scratch_stays_clean_across_updates() {
        let mut session = Session::new(3, SessionConfig::default()).expect("session");
        let player = session.state().spawn.center();
        for _ in 0..150 {
            session.update(1.0 / 30.0, player).expect("update");
            assert!(session.scratch_is_clean());
        }
    }
}
