//! Classic ELO rating engine
//!
//! Two-player, symmetric-K updates applied one record at a time in
//! chronological (`date-end`) order. The update rule itself is the
//! skillratings elo primitive: `Ea = 1/(1+10^((Rb-Ra)/400))`,
//! `Ra' = Ra + K*(score - Ea)`, exactly zero-sum when both players share
//! the same K.

use serde::{Deserialize, Serialize};
use skillratings::elo::{elo, expected_score, EloConfig, EloRating};
use skillratings::Outcomes;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

use crate::error::Result;
use crate::record::GameRecord;
use crate::types::{GameOutcome, PlayerKey};

use super::engine::{EngineOptions, RaterResults, RatingEngine};
use super::pipeline::EligibilityFilter;

/// Default seed rating for first-seen players.
pub const DEFAULT_RATING_START: f64 = 1200.0;

/// Default constant K.
pub const DEFAULT_K: f64 = 30.0;

/// K-factor function of `(rating1, games1, rating2, games2)`. Both players
/// in a record always get the same K, which keeps the update zero-sum.
pub type KFactorFn = dyn Fn(f64, u32, f64, u32) -> f64 + Send + Sync;

/// Configuration for the ELO engine.
pub struct EloSettings {
    pub base: EngineOptions,
    /// Rating new players start at.
    pub rating_start: f64,
    /// Caller-supplied K policy, evaluated per record.
    pub k_factor: Box<KFactorFn>,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self {
            base: EngineOptions::default(),
            rating_start: DEFAULT_RATING_START,
            k_factor: Box::new(|_, _, _, _| DEFAULT_K),
        }
    }
}

impl fmt::Debug for EloSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EloSettings")
            .field("base", &self.base)
            .field("rating_start", &self.rating_start)
            .finish_non_exhaustive()
    }
}

/// Per-player ELO rating state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EloPlayerRating {
    /// Composite player key, `site name + "|" + userid`.
    pub userid: PlayerKey,
    pub rating: f64,
    pub rec_count: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl EloPlayerRating {
    fn seeded(userid: &str, rating_start: f64) -> Self {
        Self {
            userid: userid.to_string(),
            rating: rating_start,
            rec_count: 0,
            wins: 0,
            losses: 0,
            draws: 0,
        }
    }

    /// Update counters with an outcome seen from this player's side
    /// (`FirstWin` = this player won).
    fn tally(&mut self, outcome: GameOutcome) {
        self.rec_count += 1;
        match outcome {
            GameOutcome::FirstWin => self.wins += 1,
            GameOutcome::SecondWin => self.losses += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }
}

/// The ELO engine.
#[derive(Debug)]
pub struct EloEngine {
    settings: EloSettings,
}

impl EloEngine {
    pub fn new(settings: EloSettings) -> Self {
        Self { settings }
    }

    /// Expected scores for two current ratings, `(first, second)`.
    pub fn expected(&self, rating_first: f64, rating_second: f64) -> (f64, f64) {
        expected_score(
            &EloRating {
                rating: rating_first,
            },
            &EloRating {
                rating: rating_second,
            },
        )
    }
}

impl Default for EloEngine {
    fn default() -> Self {
        Self::new(EloSettings::default())
    }
}

fn seeded_state(
    ratings: &mut HashMap<PlayerKey, EloPlayerRating>,
    key: &str,
    rating_start: f64,
) -> (f64, u32) {
    let entry = ratings
        .entry(key.to_string())
        .or_insert_with(|| EloPlayerRating::seeded(key, rating_start));
    (entry.rating, entry.rec_count)
}

impl RatingEngine for EloEngine {
    type Rating = EloPlayerRating;

    fn run_processed(&self, batch: &[GameRecord]) -> Result<RaterResults<Self::Rating>> {
        debug!(records = batch.len(), "elo: rating batch");

        // Chronological processing order; lexical comparison of the
        // ISO-8601 date-end, ties keeping their batch order (stable sort).
        let mut order: Vec<&GameRecord> = batch.iter().collect();
        order.sort_by(|a, b| a.header.date_end.cmp(&b.header.date_end));

        let mut filter = EligibilityFilter::new(self.settings.base);
        let mut results = RaterResults::new(batch.len());

        for (index, record) in order.iter().enumerate() {
            let Some(game) = filter.admit(index, record)? else {
                continue;
            };

            let (rating_a, games_a) =
                seeded_state(&mut results.ratings, &game.first_key, self.settings.rating_start);
            let (rating_b, games_b) =
                seeded_state(&mut results.ratings, &game.second_key, self.settings.rating_start);

            let k = (self.settings.k_factor)(rating_a, games_a, rating_b, games_b);
            debug!(recid = %game.recid, k, "elo: applying update");
            let outcome: Outcomes = game.outcome.into();
            let (new_a, new_b) = elo(
                &EloRating { rating: rating_a },
                &EloRating { rating: rating_b },
                &outcome,
                &EloConfig { k },
            );

            if let Some(first) = results.ratings.get_mut(&game.first_key) {
                first.rating = new_a.rating;
                first.tally(game.outcome);
            }
            if let Some(second) = results.ratings.get_mut(&game.second_key) {
                second.rating = new_b.rating;
                second.tally(game.outcome.reversed());
            }

            results.recs_rated += 1;
        }

        let (warnings, errors) = filter.into_diagnostics();
        results.warnings = warnings;
        results.errors = errors;
        info!(
            received = results.recs_received,
            rated = results.recs_rated,
            "elo: batch complete"
        );
        Ok(results)
    }
}
