//! Error types for the rating engines
//!
//! This module defines all error types using anyhow for consistent error
//! handling throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Conditions a record can be rejected for while rating a batch.
///
/// `SchemaViolation` is always fatal and can only come out of
/// [`RatingEngine::run`](crate::rating::RatingEngine::run). The remaining
/// variants are accumulated as per-record diagnostics and the record is
/// skipped, unless the engine was configured with `fail_hard`, in which case
/// they abort the batch. `InsufficientRounds` is an expected, common case
/// and is never promoted to fatal.
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("record {index} is not a valid game record: {reason}")]
    SchemaViolation { index: usize, reason: String },

    #[error("record {index} does not have a site game id")]
    MissingGameId { index: usize },

    #[error("duplicate record id: {recid}")]
    DuplicateRecordId { recid: String },

    #[error("this engine can only rate two-player games; record {recid} has {count} players")]
    WrongPlayerCount { recid: String, count: usize },

    #[error("record {recid} lasted fewer than {min_rounds} rounds; skipping")]
    InsufficientRounds { recid: String, min_rounds: usize },

    #[error("at least one player in record {recid} does not have a usable userid; skipping")]
    MissingUserId { recid: String },
}
