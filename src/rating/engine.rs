//! Shared batch contract for all rating engines
//!
//! Every engine consumes a batch of game records and returns a
//! [`RaterResults`]: the updated rating map plus counts and any per-record
//! diagnostics. Engines hold only configuration; each call builds and
//! returns its own rating map, so a batch run is a complete, self-contained
//! transaction with no shared mutable state between calls.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{RatingError, Result};
use crate::record::GameRecord;
use crate::types::PlayerKey;

/// Options recognized by every engine.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOptions {
    /// When true, any eligibility violation aborts the batch instead of
    /// being recorded and skipped. Too-short games are still only warned
    /// about; they are expected, not a data-integrity problem.
    pub fail_hard: bool,
    /// Records with fewer rounds than this are skipped with a warning.
    pub min_rounds: usize,
    /// When true, records flagged `unrated` are silently skipped.
    pub respect_unrated: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fail_hard: false,
            min_rounds: 3,
            respect_unrated: true,
        }
    }
}

/// Outcome of rating one batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaterResults<R> {
    /// Composite player key to rating state, for every player seen in an
    /// eligible record (plus any warm-start seeds the engine carried in).
    pub ratings: HashMap<PlayerKey, R>,
    /// Size of the input batch.
    pub recs_received: usize,
    /// Records that survived every eligibility check.
    pub recs_rated: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<R> RaterResults<R> {
    pub(crate) fn new(recs_received: usize) -> Self {
        Self {
            ratings: HashMap::new(),
            recs_received,
            recs_rated: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// The contract shared by the ELO, Glicko-2, and TrueSkill engines.
///
/// Callers are expected to run one engine instance per game title so that
/// rating populations stay comparable; ratings are never shared across
/// titles.
pub trait RatingEngine {
    /// Per-algorithm rating state stored in the results map.
    type Rating: Clone;

    /// Rate a batch of already schema-valid records.
    fn run_processed(&self, batch: &[GameRecord]) -> Result<RaterResults<Self::Rating>>;

    /// Parse and schema-validate serialized records, then rate them.
    /// Any entry that fails validation aborts the whole call.
    fn run(&self, batch: &[String]) -> Result<RaterResults<Self::Rating>> {
        debug!(records = batch.len(), "parsing raw record batch");
        let mut records = Vec::with_capacity(batch.len());
        for (index, raw) in batch.iter().enumerate() {
            let record =
                GameRecord::from_json(raw).map_err(|source| RatingError::SchemaViolation {
                    index,
                    reason: format!("{source:#}"),
                })?;
            records.push(record);
        }
        self.run_processed(&records)
    }
}
