//! TrueSkill rating engine
//!
//! Two-player skill updates through the factor-graph primitive in
//! skillratings, applied one record at a time in chronological (`date-end`)
//! order. Unlike Glicko-2 this is truly sequential: each record's update is
//! immediately visible to the next one in the batch. Ranks follow the usual
//! TrueSkill convention (winner 0, loser 1, a draw shares rank 0), which
//! maps directly onto the primitive's win/draw/loss outcome for singleton
//! teams.

use serde::{Deserialize, Serialize};
use skillratings::trueskill::{trueskill, TrueSkillConfig, TrueSkillRating};
use skillratings::Outcomes;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::Result;
use crate::record::GameRecord;
use crate::types::{GameOutcome, PlayerKey};

use super::engine::{EngineOptions, RaterResults, RatingEngine};
use super::pipeline::EligibilityFilter;

/// Configuration for the TrueSkill engine. Defaults mirror the canonical
/// TrueSkill environment prior: mu 25, sigma 25/3, beta 25/6, tau 25/300,
/// draw probability 0.1.
#[derive(Debug, Clone, Copy)]
pub struct TrueSkillSettings {
    pub base: EngineOptions,
    pub mu_start: f64,
    pub sigma_start: f64,
    /// Skill distance giving an 80% win chance to the better player.
    pub beta: f64,
    /// Additive dynamics factor applied before each update.
    pub tau: f64,
    pub draw_probability: f64,
}

impl Default for TrueSkillSettings {
    fn default() -> Self {
        let prior = TrueSkillRating::new();
        let env = TrueSkillConfig::new();
        Self {
            base: EngineOptions::default(),
            mu_start: prior.rating,
            sigma_start: prior.uncertainty,
            beta: env.beta,
            tau: env.default_dynamics,
            draw_probability: env.draw_probability,
        }
    }
}

/// Per-player TrueSkill rating state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueSkillPlayerRating {
    /// Composite player key, `site name + "|" + userid`.
    pub userid: PlayerKey,
    /// Mean of the skill belief (mu).
    pub rating: f64,
    /// Uncertainty of the skill belief.
    pub sigma: f64,
    pub rec_count: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl TrueSkillPlayerRating {
    fn seeded(userid: &str, settings: &TrueSkillSettings) -> Self {
        Self {
            userid: userid.to_string(),
            rating: settings.mu_start,
            sigma: settings.sigma_start,
            rec_count: 0,
            wins: 0,
            losses: 0,
            draws: 0,
        }
    }

    fn tally(&mut self, outcome: GameOutcome) {
        self.rec_count += 1;
        match outcome {
            GameOutcome::FirstWin => self.wins += 1,
            GameOutcome::SecondWin => self.losses += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }
}

/// The TrueSkill engine.
#[derive(Debug, Clone)]
pub struct TrueSkillEngine {
    settings: TrueSkillSettings,
}

impl TrueSkillEngine {
    pub fn new(settings: TrueSkillSettings) -> Self {
        Self { settings }
    }

    fn config(&self) -> TrueSkillConfig {
        TrueSkillConfig {
            draw_probability: self.settings.draw_probability,
            beta: self.settings.beta,
            default_dynamics: self.settings.tau,
        }
    }
}

impl Default for TrueSkillEngine {
    fn default() -> Self {
        Self::new(TrueSkillSettings::default())
    }
}

fn seeded_state(
    ratings: &mut HashMap<PlayerKey, TrueSkillPlayerRating>,
    key: &str,
    settings: &TrueSkillSettings,
) -> TrueSkillRating {
    let entry = ratings
        .entry(key.to_string())
        .or_insert_with(|| TrueSkillPlayerRating::seeded(key, settings));
    TrueSkillRating {
        rating: entry.rating,
        uncertainty: entry.sigma,
    }
}

impl RatingEngine for TrueSkillEngine {
    type Rating = TrueSkillPlayerRating;

    fn run_processed(&self, batch: &[GameRecord]) -> Result<RaterResults<Self::Rating>> {
        debug!(records = batch.len(), "trueskill: rating batch");

        let mut order: Vec<&GameRecord> = batch.iter().collect();
        order.sort_by(|a, b| a.header.date_end.cmp(&b.header.date_end));

        let config = self.config();
        let mut filter = EligibilityFilter::new(self.settings.base);
        let mut results = RaterResults::new(batch.len());

        for (index, record) in order.iter().enumerate() {
            let Some(game) = filter.admit(index, record)? else {
                continue;
            };

            let current_first = seeded_state(&mut results.ratings, &game.first_key, &self.settings);
            let current_second =
                seeded_state(&mut results.ratings, &game.second_key, &self.settings);

            debug!(recid = %game.recid, "trueskill: applying update");
            let outcome: Outcomes = game.outcome.into();
            let (new_first, new_second) =
                trueskill(&current_first, &current_second, &outcome, &config);

            if let Some(first) = results.ratings.get_mut(&game.first_key) {
                first.rating = new_first.rating;
                first.sigma = new_first.uncertainty;
                first.tally(game.outcome);
            }
            if let Some(second) = results.ratings.get_mut(&game.second_key) {
                second.rating = new_second.rating;
                second.sigma = new_second.uncertainty;
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
            "trueskill: batch complete"
        );
        Ok(results)
    }
}
