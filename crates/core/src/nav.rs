//! Agent navigation engine: scent search, path search, steering, movement, and decisions.
//! This module exists so every rule that moves or re-targets an agent lives in one place.
//! It does not own the agent collection or the decision clock; see `session` for those.

pub mod collision;
pub mod decision;
pub mod movement;
pub mod path;
pub mod scent;
pub mod steering;

mod scratch;

pub use collision::collides;
pub use decision::{DecisionContext, decide};
pub use movement::{MoveOutcome, advance_agent};
pub use path::compute_path;
pub use scent::can_sense;
pub use scratch::SearchScratch;
pub use steering::heading_towards;
