//! Heading toward the next waypoint of a chase path.

use crate::state::Agent;
use crate::types::{Point, TilePos};

/// Heading in degrees from `from` to the center of `target`. 0 is +x, 90 is +y.
pub fn heading_towards(from: Point, target: TilePos) -> f64 {
    let cell = from.cell();
    let aim = target.center();
    let dx = aim.x - from.x;
    let dy = aim.y - from.y;
    if target.x == cell.x {
        return if dy >= 0.0 { 90.0 } else { 270.0 };
    }
    if target.y == cell.y {
        return if dx >= 0.0 { 0.0 } else { 180.0 };
    }
    let distance = dx.hypot(dy);
    let angle = (dx / distance).acos().to_degrees();
    if dy < 0.0 { 360.0 - angle } else { angle }
}

/// Drops waypoints the agent already stands on and turns toward the next one.
///
/// Leaves the heading alone once the path is used up.
pub fn steer(agent: &mut Agent) {
    let cell = agent.pos.cell();
    let reached = agent.path.iter().take_while(|&&waypoint| waypoint == cell).count();
    agent.path.drain(..reached);
    if let Some(&next) = agent.path.first() {
        agent.heading = heading_towards(agent.pos, next);
    }
}

pub fn reverse(heading: f64) -> f64 {
    (heading + 180.0).rem_euclid(360.0)
}
