//! The coarse decision step: chase, bounce, or wander.

use tracing::debug;

use crate::grid::TileGrid;
use crate::rng::LevelRng;
use crate::state::Agent;
use crate::types::{AgentMode, Behavior, TilePos};

use super::path::compute_path;
use super::scent::can_sense;
use super::scratch::SearchScratch;
use super::steering::{reverse, steer};

pub struct DecisionContext<'a> {
    pub grid: &'a TileGrid,
    pub player: TilePos,
    pub path_budget: Option<usize>,
    pub rng: &'a mut LevelRng,
    pub scratch: &'a mut SearchScratch,
}

/// Re-evaluates one agent.
///
/// Returns the alert an elite broadcasts to every other agent; other behaviors return `None`.
pub fn decide(agent: &mut Agent, ctx: &mut DecisionContext<'_>) -> Option<bool> {
    let scent = can_sense(ctx.grid, agent.tile, ctx.player, agent.scent_range, ctx.scratch);
    let chase = match agent.behavior {
        Behavior::Elite => scent,
        Behavior::Wanderer | Behavior::LineWalker => scent || agent.can_smell,
    };
    let previous = agent.mode;

    if chase {
        agent.can_smell = true;
        agent.collided = false;
        agent.mode = AgentMode::Chase;
        agent.path = compute_path(ctx.grid, agent.tile, ctx.player, ctx.path_budget, ctx.scratch);
        steer(agent);
    } else {
        agent.can_smell = false;
        agent.path.clear();
        if agent.collided {
            agent.collided = false;
            agent.heading = reverse(agent.heading);
            agent.mode = AgentMode::Bounce;
        } else {
            if agent.behavior == Behavior::Wanderer {
                agent.heading = ctx.rng.heading();
            }
            agent.mode = AgentMode::Wander;
        }
    }

    if previous != agent.mode {
        debug!(
            agent = ?agent.id,
            behavior = ?agent.behavior,
            from = ?previous,
            to = ?agent.mode,
            "agent mode changed"
        );
    }
    (agent.behavior == Behavior::Elite).then_some(agent.can_smell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::AgentSpawn;
    use crate::types::{AgentId, Point, TileKind};

    fn agent(behavior: Behavior, x: f64, y: f64) -> Agent {
        let spawn = AgentSpawn { behavior, pos: Point::new(x, y), heading: 30.0 };
        Agent::from_spawn(AgentId::default(), &spawn, 0.5, 5)
    }

    fn decide_on(grid: &TileGrid, agent: &mut Agent, player: TilePos, seed: u64) -> Option<bool> {
        let mut rng = LevelRng::seed_from_u64(seed);
        let mut scratch = SearchScratch::default();
        let mut ctx = DecisionContext {
            grid,
            player,
            path_budget: None,
            rng: &mut rng,
            scratch: &mut scratch,
        };
        let alert = decide(agent, &mut ctx);
        assert!(scratch.is_clean());
        alert
    }

    #[test]
    fn scent_in_range_starts_a_chase_with_a_path() {
        let grid = TileGrid::walled(12, 12);
        let mut walker = agent(Behavior::LineWalker, 2.5, 2.5);
        walker.collided = true;
        let player = TilePos { y: 2, x: 5 };

        assert_eq!(decide_on(&grid, &mut walker, player, 1), None);
        assert_eq!(walker.mode, AgentMode::Chase);
        assert!(walker.can_smell);
        assert!(!walker.collided);
        assert_eq!(walker.path.last(), Some(&player));
        assert_eq!(walker.heading, 0.0);
    }

    #[test]
    fn alerted_agents_chase_without_fresh_scent() {
        let grid = TileGrid::walled(30, 30);
        let mut wanderer = agent(Behavior::Wanderer, 2.5, 2.5);
        wanderer.can_smell = true;
        decide_on(&grid, &mut wanderer, TilePos { y: 25, x: 25 }, 1);
        assert_eq!(wanderer.mode, AgentMode::Chase);
        assert_eq!(wanderer.path.last(), Some(&TilePos { y: 25, x: 25 }));
    }

    #[test]
    fn collided_agent_without_scent_bounces() {
        let grid = TileGrid::walled(30, 30);
        let mut walker = agent(Behavior::LineWalker, 2.5, 2.5);
        walker.collided = true;
        decide_on(&grid, &mut walker, TilePos { y: 25, x: 25 }, 1);
        assert_eq!(walker.mode, AgentMode::Bounce);
        assert_eq!(walker.heading, 210.0);
        assert!(!walker.collided);
        assert!(walker.path.is_empty());
    }

    #[test]
    fn quiet_wanderer_picks_a_new_heading_but_line_walker_keeps_its_own() {
        let grid = TileGrid::walled(30, 30);
        let far = TilePos { y: 25, x: 25 };

        let mut wanderer = agent(Behavior::Wanderer, 2.5, 2.5);
        decide_on(&grid, &mut wanderer, far, 8);
        let mut expected = LevelRng::seed_from_u64(8);
        assert_eq!(wanderer.heading, expected.heading());
        assert_eq!(wanderer.mode, AgentMode::Wander);

        let mut walker = agent(Behavior::LineWalker, 2.5, 2.5);
        decide_on(&grid, &mut walker, far, 8);
        assert_eq!(walker.heading, 30.0);
        assert_eq!(walker.mode, AgentMode::Wander);
    }

    #[test]
    fn elite_broadcasts_its_scent() {
        let mut grid = TileGrid::walled(12, 12);
        let mut elite = agent(Behavior::Elite, 2.5, 2.5);
        assert_eq!(decide_on(&grid, &mut elite, TilePos { y: 2, x: 4 }, 1), Some(true));
        assert_eq!(elite.mode, AgentMode::Chase);

        // An elite ignores a stale alert of its own once the scent is gone.
        for y in 1..11 {
            grid.set_kind(TilePos { y, x: 6 }, TileKind::Wall).expect("in bounds");
        }
        assert_eq!(decide_on(&grid, &mut elite, TilePos { y: 2, x: 9 }, 1), Some(false));
        assert_ne!(elite.mode, AgentMode::Chase);
    }
}
