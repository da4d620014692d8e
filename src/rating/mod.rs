//! Rating engines and their shared batch contract
//!
//! Three engines implement the same [`RatingEngine`] contract over one
//! eligibility pipeline: classic ELO, Glicko-2 (rating-period form), and
//! TrueSkill. The numeric update rules are delegated to the skillratings
//! crate behind narrow call sites, so an equivalent primitive could be
//! swapped in without touching the batch protocol.

pub mod elo;
pub mod engine;
pub mod glicko2;
mod pipeline;
pub mod trueskill;

// Re-export commonly used types
pub use elo::{EloEngine, EloPlayerRating, EloSettings};
pub use engine::{EngineOptions, RaterResults, RatingEngine};
pub use glicko2::{Glicko2Engine, Glicko2PlayerRating, Glicko2Settings};
pub use trueskill::{TrueSkillEngine, TrueSkillPlayerRating, TrueSkillSettings};
