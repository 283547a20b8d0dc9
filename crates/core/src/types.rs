use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct AgentId;
}

/// Integer cell coordinate on the full tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub y: i32,
    pub x: i32,
}

impl TilePos {
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn center(self) -> Point {
        Point { x: f64::from(self.x) + 0.5, y: f64::from(self.y) + 0.5 }
    }
}

/// Continuous position measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The cell containing this point. Negative coordinates floor to negative cells.
    pub fn cell(self) -> TilePos {
        TilePos { y: self.y.floor() as i32, x: self.x.floor() as i32 }
    }

    pub fn distance_sq(self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn manhattan(self, other: Self) -> f64 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Floor,
    Wall,
    Exit,
}

impl TileKind {
    /// Floor and Exit tiles are walkable; Wall tiles are not.
    pub fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Exit)
    }

    pub fn is_obstacle(self) -> bool {
        matches!(self, Self::Wall | Self::Exit)
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => 'x',
            Self::Exit => '!',
        }
    }
}

/// One of the four fixed quadrants of a level.
///
/// Ids follow the quadrant layout: 0 north-west, 1 south-west, 2 north-east, 3 south-east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u8);

impl ZoneId {
    pub const ALL: [ZoneId; 4] = [ZoneId(0), ZoneId(1), ZoneId(2), ZoneId(3)];

    pub fn from_quadrant(east: bool, south: bool) -> Self {
        Self(u8::from(east) * 2 + u8::from(south))
    }

    pub fn is_east(self) -> bool {
        self.0 >= 2
    }

    pub fn is_south(self) -> bool {
        self.0 % 2 == 1
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }
}

/// Behavior variant carried by every agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Behavior {
    /// Picks a fresh random heading on every quiet decision tick.
    Wanderer,
    /// Keeps walking its current heading until it hits something.
    LineWalker,
    /// Alerts the whole collection when it picks up the player's scent.
    Elite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentMode {
    Wander,
    Chase,
    Bounce,
}
