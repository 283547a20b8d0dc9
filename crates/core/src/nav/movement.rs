//! Per-tick movement integration for a single agent.

use tracing::trace;

use crate::grid::TileGrid;
use crate::state::Agent;
use crate::types::{AgentMode, Point};

use super::collision::{AGENT_COLLISION_DISTANCE_SQ, hits_obstacle};
use super::steering::steer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The agent is waiting for a decision after a collision, or `dt` was unusable.
    Held,
    Moved,
    Blocked,
}

/// Longest distance, in tiles, covered between two collision checks.
const MAX_SUBSTEP: f64 = 0.5;

/// Advances `agent` along its heading for `dt` seconds.
///
/// `others` holds the positions of every other agent. The move is split into sub-steps of at
/// most `MAX_SUBSTEP` tiles and each one is collision-checked, so a long frame cannot carry
/// an agent through a wall or off the grid. A blocked move is undone and leaves `collided`
/// set until the next decision.
pub fn advance_agent(agent: &mut Agent, grid: &TileGrid, others: &[Point], dt: f64) -> MoveOutcome {
    if agent.collided || !dt.is_finite() || dt <= 0.0 {
        return MoveOutcome::Held;
    }
    if agent.mode == AgentMode::Chase {
        steer(agent);
    }

    let start = agent.pos;
    let distance = agent.speed * dt;
    let substeps = (distance / MAX_SUBSTEP).ceil().max(1.0);
    let radians = agent.heading.to_radians();
    let stride = distance / substeps;
    let (step_x, step_y) = (radians.cos() * stride, radians.sin() * stride);

    // Leaving the grid ends the loop long before a saturated count matters.
    let mut pos = start;
    for _ in 0..substeps as u64 {
        let next = Point::new(pos.x + step_x, pos.y + step_y);
        if grid.cell_of(next).is_none()
            || hits_obstacle(grid, next)
            || closes_on_agent(pos, next, others)
        {
            return block(agent, grid, start);
        }
        pos = next;
    }

    agent.pos = pos;
    if let Some(cell) = grid.cell_of(pos) {
        agent.tile = cell;
    }
    MoveOutcome::Moved
}

fn block(agent: &mut Agent, grid: &TileGrid, start: Point) -> MoveOutcome {
    agent.collided = true;
    agent.pos = pull_inside(grid, start);
    if let Some(cell) = grid.cell_of(agent.pos) {
        agent.tile = cell;
    }
    trace!(agent = ?agent.id, x = agent.pos.x, y = agent.pos.y, "agent blocked");
    MoveOutcome::Blocked
}

/// Another agent ends up within collision range and closer than before. Moves that separate
/// overlapping agents are allowed.
fn closes_on_agent(previous: Point, next: Point, others: &[Point]) -> bool {
    others.iter().any(|&other| {
        let after = next.distance_sq(other);
        after <= AGENT_COLLISION_DISTANCE_SQ && after < previous.distance_sq(other)
    })
}

/// Steps `pos` one tile at a time away from whichever grid edge it lies beyond.
fn pull_inside(grid: &TileGrid, pos: Point) -> Point {
    let width = grid.width() as f64;
    let height = grid.height() as f64;
    let mut pos = pos;
    for _ in 0..grid.width() + grid.height() {
        if grid.cell_of(pos).is_some() {
            break;
        }
        if pos.x < 0.0 {
            pos.x += 1.0;
        } else if pos.x >= width {
            pos.x -= 1.0;
        }
        if pos.y < 0.0 {
            pos.y += 1.0;
        } else if pos.y >= height {
            pos.y -= 1.0;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::AgentSpawn;
    use crate::types::{AgentId, Behavior, TileKind, TilePos, ZoneId};

    fn agent_at(x: f64, y: f64, heading: f64) -> Agent {
        let spawn = AgentSpawn { behavior: Behavior::LineWalker, pos: Point::new(x, y), heading };
        Agent::from_spawn(AgentId::default(), &spawn, 1.0, 15)
    }

    #[test]
    fn open_floor_moves_along_heading() {
        let grid = TileGrid::walled(10, 10);
        let mut agent = agent_at(3.5, 3.5, 0.0);
        assert_eq!(advance_agent(&mut agent, &grid, &[], 0.5), MoveOutcome::Moved);
        assert!((agent.pos.x - 4.0).abs() < 1e-9);
        assert!((agent.pos.y - 3.5).abs() < 1e-9);
        assert_eq!(agent.tile, TilePos { y: 3, x: 4 });

        agent.heading = 90.0;
        advance_agent(&mut agent, &grid, &[], 1.0);
        assert!((agent.pos.y - 4.5).abs() < 1e-9);
    }

    #[test]
    fn wall_contact_reverts_and_holds_until_a_decision() {
        let grid = TileGrid::walled(6, 6);
        let mut agent = agent_at(3.5, 3.5, 0.0);
        assert_eq!(advance_agent(&mut agent, &grid, &[], 1.2), MoveOutcome::Blocked);
        assert_eq!(agent.pos, Point::new(3.5, 3.5));
        assert!(agent.collided);
        assert_eq!(advance_agent(&mut agent, &grid, &[], 0.5), MoveOutcome::Held);
    }

    #[test]
    fn long_frame_cannot_skip_over_the_perimeter_wall() {
        let grid = TileGrid::walled(10, 10);
        let spawn =
            AgentSpawn { behavior: Behavior::Elite, pos: Point::new(1.5, 2.5), heading: 180.0 };
        let mut agent = Agent::from_spawn(AgentId::default(), &spawn, 2.2, 15);

        assert_eq!(advance_agent(&mut agent, &grid, &[], 1.0), MoveOutcome::Blocked);
        assert_eq!(agent.pos, Point::new(1.5, 2.5));
        assert_eq!(agent.tile, TilePos { y: 2, x: 1 });
        assert!(grid.cell_of(agent.pos).is_some());
        assert!(agent.collided);
    }

    #[test]
    fn running_off_an_open_edge_is_blocked() {
        let grid = TileGrid::from_layers(5, 5, &[TileKind::Floor; 25], &[ZoneId(0); 25]);
        let mut agent = agent_at(2.5, 2.5, 0.0);

        assert_eq!(advance_agent(&mut agent, &grid, &[], 10.0), MoveOutcome::Blocked);
        assert_eq!(agent.pos, Point::new(2.5, 2.5));
        assert_eq!(agent.tile, TilePos { y: 2, x: 2 });
    }

    #[test]
    fn approaching_another_agent_is_blocked_but_leaving_is_not() {
        let grid = TileGrid::walled(12, 12);
        let other = [Point::new(6.5, 5.5)];

        let mut closing = agent_at(4.4, 5.5, 0.0);
        assert_eq!(advance_agent(&mut closing, &grid, &other, 0.2), MoveOutcome::Blocked);

        let mut leaving = agent_at(5.5, 5.5, 180.0);
        assert_eq!(advance_agent(&mut leaving, &grid, &other, 0.2), MoveOutcome::Moved);
    }

    #[test]
    fn unusable_time_steps_hold_position() {
        let grid = TileGrid::walled(10, 10);
        let mut agent = agent_at(3.5, 3.5, 0.0);
        assert_eq!(advance_agent(&mut agent, &grid, &[], 0.0), MoveOutcome::Held);
        assert_eq!(advance_agent(&mut agent, &grid, &[], f64::NAN), MoveOutcome::Held);
        assert_eq!(agent.pos, Point::new(3.5, 3.5));
    }

    #[test]
    fn positions_beyond_the_edge_are_pulled_back_in() {
        let grid = TileGrid::walled(5, 5);
        let inside = pull_inside(&grid, Point::new(-1.5, 6.2));
        assert!(grid.cell_of(inside).is_some());
        assert!((inside.x - 0.5).abs() < 1e-9);
        assert!((inside.y - 4.2).abs() < 1e-9);
    }

    #[test]
    fn chasing_agent_steers_toward_its_next_waypoint() {
        let grid = TileGrid::walled(10, 10);
        let mut agent = agent_at(3.5, 3.5, 0.0);
        agent.mode = AgentMode::Chase;
        agent.path = vec![TilePos { y: 3, x: 3 }, TilePos { y: 4, x: 3 }];
        advance_agent(&mut agent, &grid, &[], 0.25);
        assert_eq!(agent.heading, 90.0);
        assert_eq!(agent.path, vec![TilePos { y: 4, x: 3 }]);
        assert!((agent.pos.y - 3.75).abs() < 1e-9);
    }
}
