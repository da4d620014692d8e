//! Glicko-2 rating engine (rating-period form)
//!
//! Glicko-2 is defined over rating periods: all of a player's results in a
//! batch are folded into one simultaneous recomputation, never applied game
//! by game. The engine therefore makes two strictly separated passes:
//!
//! 1. **Accumulation** - walk eligible records once, seed first-seen
//!    players, update bookkeeping counters, and append
//!    `(opponent rating, opponent rd, outcome)` tuples to each player's
//!    match list. Nothing numeric is touched, so every tuple carries the
//!    opponent's pre-batch values.
//! 2. **Recomputation** - run the single-period update once per player who
//!    accumulated at least one match. Players without matches are left
//!    untouched; rd inflation for absent players is a decay policy that
//!    lives outside this engine.
//!
//! Chaining batches is supported by seeding the engine with the previous
//! batch's output via `known_ratings`.

use serde::{Deserialize, Serialize};
use skillratings::glicko2::{glicko2_rating_period, Glicko2Config, Glicko2Rating};
use skillratings::Outcomes;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::Result;
use crate::record::GameRecord;
use crate::types::{GameOutcome, PlayerKey};

use super::engine::{EngineOptions, RaterResults, RatingEngine};
use super::pipeline::EligibilityFilter;

pub const DEFAULT_RATING_START: f64 = 1500.0;
pub const DEFAULT_RD_START: f64 = 350.0;
pub const DEFAULT_VOLATILITY_START: f64 = 0.06;
pub const DEFAULT_TAU: f64 = 0.5;

/// Configuration for the Glicko-2 engine.
#[derive(Debug, Clone)]
pub struct Glicko2Settings {
    pub base: EngineOptions,
    pub rating_start: f64,
    pub rd_start: f64,
    pub volatility_start: f64,
    /// System constant constraining volatility change per period.
    pub tau: f64,
    /// Warm-start table carried over from earlier, independently rated
    /// batches. Copied into the results map before accumulation begins.
    pub known_ratings: HashMap<PlayerKey, Glicko2PlayerRating>,
}

impl Default for Glicko2Settings {
    fn default() -> Self {
        Self {
            base: EngineOptions::default(),
            rating_start: DEFAULT_RATING_START,
            rd_start: DEFAULT_RD_START,
            volatility_start: DEFAULT_VOLATILITY_START,
            tau: DEFAULT_TAU,
            known_ratings: HashMap::new(),
        }
    }
}

/// Per-player Glicko-2 rating state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Glicko2PlayerRating {
    /// Composite player key, `site name + "|" + userid`.
    pub userid: PlayerKey,
    pub rating: f64,
    /// Rating deviation.
    pub rd: f64,
    pub volatility: f64,
    pub rec_count: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Glicko2PlayerRating {
    fn seeded(userid: &str, settings: &Glicko2Settings) -> Self {
        Self {
            userid: userid.to_string(),
            rating: settings.rating_start,
            rd: settings.rd_start,
            volatility: settings.volatility_start,
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

    fn as_glicko(&self) -> Glicko2Rating {
        Glicko2Rating {
            rating: self.rating,
            deviation: self.rd,
            volatility: self.volatility,
        }
    }
}

/// The Glicko-2 engine.
#[derive(Debug, Clone)]
pub struct Glicko2Engine {
    settings: Glicko2Settings,
}

impl Glicko2Engine {
    pub fn new(settings: Glicko2Settings) -> Self {
        Self { settings }
    }
}

impl Default for Glicko2Engine {
    fn default() -> Self {
        Self::new(Glicko2Settings::default())
    }
}

impl RatingEngine for Glicko2Engine {
    type Rating = Glicko2PlayerRating;

    fn run_processed(&self, batch: &[GameRecord]) -> Result<RaterResults<Self::Rating>> {
        debug!(records = batch.len(), "glicko2: rating batch");

        let mut filter = EligibilityFilter::new(self.settings.base);
        let mut results = RaterResults::new(batch.len());
        results.ratings = self.settings.known_ratings.clone();

        // Phase 1: accumulation. Order-independent; counters and match
        // lists only. Rating, rd and volatility stay pre-batch throughout.
        let mut matches: HashMap<PlayerKey, Vec<(Glicko2Rating, Outcomes)>> = HashMap::new();
        for (index, record) in batch.iter().enumerate() {
            let Some(game) = filter.admit(index, record)? else {
                continue;
            };

            let first_glicko = results
                .ratings
                .entry(game.first_key.clone())
                .or_insert_with(|| Glicko2PlayerRating::seeded(&game.first_key, &self.settings))
                .as_glicko();
            let second_glicko = results
                .ratings
                .entry(game.second_key.clone())
                .or_insert_with(|| Glicko2PlayerRating::seeded(&game.second_key, &self.settings))
                .as_glicko();

            debug!(recid = %game.recid, "glicko2: accumulating result");
            matches
                .entry(game.first_key.clone())
                .or_default()
                .push((second_glicko, game.outcome.into()));
            matches
                .entry(game.second_key.clone())
                .or_default()
                .push((first_glicko, game.outcome.reversed().into()));

            if let Some(first) = results.ratings.get_mut(&game.first_key) {
                first.tally(game.outcome);
            }
            if let Some(second) = results.ratings.get_mut(&game.second_key) {
                second.tally(game.outcome.reversed());
            }

            results.recs_rated += 1;
        }

        // Phase 2: recomputation, one single-period update per player over
        // their full match list for this batch.
        let mut config = Glicko2Config::new();
        config.tau = self.settings.tau;
        for (key, match_list) in &matches {
            if let Some(state) = results.ratings.get_mut(key) {
                let updated = glicko2_rating_period(&state.as_glicko(), match_list, &config);
                state.rating = updated.rating;
                state.rd = updated.deviation;
                state.volatility = updated.volatility;
            }
        }

        let (warnings, errors) = filter.into_diagnostics();
        results.warnings = warnings;
        results.errors = errors;
        info!(
            received = results.recs_received,
            rated = results.recs_rated,
            "glicko2: batch complete"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{GameMeta, RecordHeader, RecordPlayer, RoundMove, Site, SiteGameId};

    fn record(gameid: &str, first: &str, second: &str, results: (f64, f64)) -> GameRecord {
        GameRecord {
            header: RecordHeader {
                game: GameMeta {
                    name: "Test Game".to_string(),
                    variants: None,
                },
                event: None,
                round: None,
                site: Site {
                    name: "Test Site".to_string(),
                    gameid: Some(SiteGameId::Text(gameid.to_string())),
                },
                date_start: "2023-01-01T00:00:00.000Z".to_string(),
                date_end: "2023-01-02T00:00:00.000Z".to_string(),
                date_generated: "2023-02-01T00:00:00.000Z".to_string(),
                unrated: false,
                players: vec![
                    RecordPlayer {
                        name: first.to_string(),
                        userid: Some(first.to_string()),
                        score: None,
                        is_ai: None,
                        result: results.0,
                    },
                    RecordPlayer {
                        name: second.to_string(),
                        userid: Some(second.to_string()),
                        score: None,
                        is_ai: None,
                        result: results.1,
                    },
                ],
                starting_position: None,
            },
            moves: vec![vec![RoundMove::Notation("x".to_string())]; 5],
        }
    }

    fn known(userid: &str, rating: f64, rd: f64) -> Glicko2PlayerRating {
        Glicko2PlayerRating {
            userid: userid.to_string(),
            rating,
            rd,
            volatility: DEFAULT_VOLATILITY_START,
            rec_count: 0,
            wins: 0,
            losses: 0,
            draws: 0,
        }
    }

    #[test]
    fn test_single_game_moves_both_players() {
        let engine = Glicko2Engine::default();
        let results = engine
            .run_processed(&[record("g1", "a", "b", (1.0, 0.0))])
            .unwrap();

        let winner = &results.ratings["Test Site|a"];
        let loser = &results.ratings["Test Site|b"];
        assert!(winner.rating > DEFAULT_RATING_START);
        assert!(loser.rating < DEFAULT_RATING_START);
        // Playing reduces uncertainty from the 350 seed.
        assert!(winner.rd < DEFAULT_RD_START);
        assert!(loser.rd < DEFAULT_RD_START);
        assert_eq!((winner.rec_count, winner.wins), (1, 1));
        assert_eq!((loser.rec_count, loser.losses), (1, 1));
    }

    #[test]
    fn test_glickman_example_through_warm_start() {
        // The worked example from Glickman's Glicko-2 paper: a 1500/200
        // player beats a 1400/30 opponent and loses to 1550/100 and
        // 1700/300 opponents in one period, tau 0.5.
        let mut known_ratings = HashMap::new();
        known_ratings.insert("Test Site|a".to_string(), known("Test Site|a", 1500.0, 200.0));
        known_ratings.insert("Test Site|b".to_string(), known("Test Site|b", 1400.0, 30.0));
        known_ratings.insert("Test Site|c".to_string(), known("Test Site|c", 1550.0, 100.0));
        known_ratings.insert("Test Site|d".to_string(), known("Test Site|d", 1700.0, 300.0));

        let engine = Glicko2Engine::new(Glicko2Settings {
            known_ratings,
            ..Glicko2Settings::default()
        });
        let results = engine
            .run_processed(&[
                record("g1", "a", "b", (1.0, 0.0)),
                record("g2", "a", "c", (0.0, 1.0)),
                record("g3", "a", "d", (0.0, 1.0)),
            ])
            .unwrap();

        let a = &results.ratings["Test Site|a"];
        assert!((a.rating - 1464.06).abs() < 0.5);
        assert!((a.rd - 151.52).abs() < 0.5);
        assert!((a.volatility - 0.05999).abs() < 0.001);
        assert_eq!((a.rec_count, a.wins, a.losses, a.draws), (3, 1, 2, 0));
    }

    #[test]
    fn test_recomputation_invariant_under_reordering() {
        // A plays B, then C, then B again in one batch. Every permutation
        // must produce identical ratings because accumulation always uses
        // pre-batch opponent values.
        let r1 = record("g1", "a", "b", (1.0, 0.0));
        let r2 = record("g2", "a", "c", (0.0, 1.0));
        let r3 = record("g3", "a", "b", (0.5, 0.5));

        let orderings = [
            vec![r1.clone(), r2.clone(), r3.clone()],
            vec![r3.clone(), r1.clone(), r2.clone()],
            vec![r2.clone(), r3.clone(), r1.clone()],
        ];

        let mut outputs = orderings.iter().map(|batch| {
            Glicko2Engine::default()
                .run_processed(batch)
                .unwrap()
                .ratings
        });
        let reference = outputs.next().unwrap();
        for ratings in outputs {
            assert_eq!(ratings.len(), reference.len());
            for (key, state) in &reference {
                let other = &ratings[key];
                // Tiny tolerance: summation order inside the period update
                // differs, the set of matches does not.
                assert!((state.rating - other.rating).abs() < 1e-9, "rating for {key}");
                assert!((state.rd - other.rd).abs() < 1e-9, "rd for {key}");
                assert!(
                    (state.volatility - other.volatility).abs() < 1e-9,
                    "volatility for {key}"
                );
                assert_eq!(state.rec_count, other.rec_count);
            }
        }
    }

    #[test]
    fn test_known_rating_without_matches_untouched() {
        let mut known_ratings = HashMap::new();
        known_ratings.insert(
            "Test Site|idle".to_string(),
            known("Test Site|idle", 1812.0, 42.0),
        );

        let engine = Glicko2Engine::new(Glicko2Settings {
            known_ratings,
            ..Glicko2Settings::default()
        });
        let results = engine
            .run_processed(&[record("g1", "a", "b", (1.0, 0.0))])
            .unwrap();

        // No rd inflation for absence; decay is out of scope here.
        let idle = &results.ratings["Test Site|idle"];
        assert_eq!(idle.rating, 1812.0);
        assert_eq!(idle.rd, 42.0);
        assert_eq!(idle.rec_count, 0);
    }

    #[test]
    fn test_warm_start_feeds_recomputation() {
        let mut known_ratings = HashMap::new();
        known_ratings.insert(
            "Test Site|vet".to_string(),
            known("Test Site|vet", 1800.0, 50.0),
        );

        let engine = Glicko2Engine::new(Glicko2Settings {
            known_ratings,
            ..Glicko2Settings::default()
        });
        let results = engine
            .run_processed(&[record("g1", "vet", "newcomer", (0.0, 1.0))])
            .unwrap();

        let vet = &results.ratings["Test Site|vet"];
        let newcomer = &results.ratings["Test Site|newcomer"];
        assert!(vet.rating < 1800.0);
        // An upset against a tight-rd veteran is a big newcomer gain.
        assert!(newcomer.rating > DEFAULT_RATING_START);
    }

    #[test]
    fn test_draws_are_complements() {
        let engine = Glicko2Engine::default();
        let results = engine
            .run_processed(&[record("g1", "a", "b", (0.5, 0.5))])
            .unwrap();
        let a = &results.ratings["Test Site|a"];
        let b = &results.ratings["Test Site|b"];
        assert_eq!(a.draws, 1);
        assert_eq!(b.draws, 1);
        // Identical seeds and a draw: both end up at the same rating.
        assert!((a.rating - b.rating).abs() < 1e-9);
    }

    #[test]
    fn test_default_seed_overrides() {
        let engine = Glicko2Engine::new(Glicko2Settings {
            rating_start: 1000.0,
            rd_start: 100.0,
            ..Glicko2Settings::default()
        });
        let results = engine
            .run_processed(&[record("g1", "a", "b", (0.5, 0.5))])
            .unwrap();
        let a = &results.ratings["Test Site|a"];
        // Draw between identical seeds keeps the rating at its seed.
        assert!((a.rating - 1000.0).abs() < 1.0);
        assert!(a.rd < 100.0);
    }
}
