//! Shared eligibility pipeline
//!
//! Every engine runs the same integrity checks over each record before any
//! numeric update: game-id presence, batch-level dedup, player count, the
//! `unrated` flag, the minimum-rounds gate, and userid presence. The checks
//! live in one filter that engines drive record by record, rather than in an
//! inherited base class, so each engine keeps control of its own iteration
//! order.

use std::collections::HashSet;
use tracing::warn;

use crate::error::{RatingError, Result};
use crate::record::GameRecord;
use crate::types::{GameOutcome, PlayerKey, RecordId};

use super::engine::EngineOptions;

/// An eligible two-player record, reduced to what the update rules need.
#[derive(Debug, Clone)]
pub(crate) struct TwoPlayerMatch {
    pub recid: RecordId,
    pub first_key: PlayerKey,
    pub second_key: PlayerKey,
    /// Relative-result comparison, from the first (seating order) player's
    /// perspective.
    pub outcome: GameOutcome,
}

/// Applies the shared checks in order, accumulating diagnostics. Indices in
/// diagnostics refer to the order records are fed in, which for the
/// chronological engines is the sorted processing order.
pub(crate) struct EligibilityFilter {
    options: EngineOptions,
    seen_ids: HashSet<RecordId>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl EligibilityFilter {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            seen_ids: HashSet::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Run one record through the checks. `Ok(Some(..))` means eligible;
    /// `Ok(None)` means skipped (diagnostic recorded unless the skip was an
    /// `unrated` flag); `Err` means a fatal violation under `fail_hard`.
    pub fn admit(&mut self, index: usize, record: &GameRecord) -> Result<Option<TwoPlayerMatch>> {
        let Some(recid) = record.record_id() else {
            return self.reject_fatal_or_error(RatingError::MissingGameId { index });
        };

        if !self.seen_ids.insert(recid.clone()) {
            return self.reject_fatal_or_error(RatingError::DuplicateRecordId { recid });
        }

        let player_count = record.header.players.len();
        if player_count != 2 {
            return self.reject_fatal_or_error(RatingError::WrongPlayerCount {
                recid,
                count: player_count,
            });
        }

        // Silent skip: not a warning, not an error.
        if self.options.respect_unrated && record.header.unrated {
            return Ok(None);
        }

        if record.rounds() < self.options.min_rounds {
            // Expected and common; never escalated under fail_hard.
            let err = RatingError::InsufficientRounds {
                recid,
                min_rounds: self.options.min_rounds,
            };
            warn!("{err}");
            self.warnings.push(err.to_string());
            return Ok(None);
        }

        let first = &record.header.players[0];
        let second = &record.header.players[1];
        match (record.player_key(first), record.player_key(second)) {
            (Some(first_key), Some(second_key)) => Ok(Some(TwoPlayerMatch {
                recid,
                first_key,
                second_key,
                outcome: GameOutcome::from_results(first.result, second.result),
            })),
            _ => self.reject_fatal_or_warning(RatingError::MissingUserId { recid }),
        }
    }

    /// Accumulated diagnostics, in processing order.
    pub fn into_diagnostics(self) -> (Vec<String>, Vec<String>) {
        (self.warnings, self.errors)
    }

    fn reject_fatal_or_error(&mut self, err: RatingError) -> Result<Option<TwoPlayerMatch>> {
        if self.options.fail_hard {
            return Err(err.into());
        }
        warn!("{err}");
        self.errors.push(err.to_string());
        Ok(None)
    }

    fn reject_fatal_or_warning(&mut self, err: RatingError) -> Result<Option<TwoPlayerMatch>> {
        if self.options.fail_hard {
            return Err(err.into());
        }
        warn!("{err}");
        self.warnings.push(err.to_string());
        Ok(None)
    }
}
