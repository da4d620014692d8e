//! Recranks - rating engines for archived game records
//!
//! This crate computes player skill ratings from batches of finished
//! two-player game records. Three interchangeable engines (classic ELO,
//! Glicko-2, TrueSkill) share one eligibility pipeline and batch contract,
//! so a hosting platform can run any of them per game title and compare
//! the resulting rating tables.

pub mod error;
pub mod rating;
pub mod record;
pub mod types;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use record::GameRecord;
pub use types::GameOutcome;

// Re-export the engines and the shared contract
pub use rating::{
    EloEngine, EngineOptions, Glicko2Engine, RaterResults, RatingEngine, TrueSkillEngine,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
