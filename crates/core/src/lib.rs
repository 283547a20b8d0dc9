pub mod config;
pub mod error;
pub mod grid;
pub mod mapgen;
pub mod nav;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod types;

pub use config::{AgentConfig, GenerationConfig, SessionConfig};
pub use error::{ConfigError, GenerationError, GridError, SessionError};
pub use grid::{Tile, TileGrid};
pub use mapgen::{GeneratedLevel, MapGenerator, generate};
pub use scheduler::DecisionScheduler;
pub use session::{Session, SessionEvent, UpdateReport};
pub use state::{Agent, GameState};
pub use types::*;
