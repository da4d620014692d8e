//! Common types used throughout the rating engines

use skillratings::Outcomes;
use std::cmp::Ordering;

/// Composite player key: `site name + "|" + userid`. Userids are only
/// unique within a hosting site, so the site name is always prefixed.
pub type PlayerKey = String;

/// Record id: `site name + "|" + site gameid`, unique within a batch.
pub type RecordId = String;

/// Outcome of a two-player game from the first player's perspective.
///
/// Derived from the players' `result` ordinals; only their relative
/// ordering is meaningful, never the magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    FirstWin,
    SecondWin,
    Draw,
}

impl GameOutcome {
    /// Compare two result ordinals. The higher value is "more winning";
    /// equal values are a draw.
    pub fn from_results(first: f64, second: f64) -> Self {
        match first.partial_cmp(&second).unwrap_or(Ordering::Equal) {
            Ordering::Greater => GameOutcome::FirstWin,
            Ordering::Less => GameOutcome::SecondWin,
            Ordering::Equal => GameOutcome::Draw,
        }
    }

    /// The same game seen from the second player's side.
    pub fn reversed(self) -> Self {
        match self {
            GameOutcome::FirstWin => GameOutcome::SecondWin,
            GameOutcome::SecondWin => GameOutcome::FirstWin,
            GameOutcome::Draw => GameOutcome::Draw,
        }
    }

    /// Score value for the first player: win 1, loss 0, draw 0.5.
    pub fn score(self) -> f64 {
        match self {
            GameOutcome::FirstWin => 1.0,
            GameOutcome::SecondWin => 0.0,
            GameOutcome::Draw => 0.5,
        }
    }

}

impl From<GameOutcome> for Outcomes {
    fn from(outcome: GameOutcome) -> Self {
        match outcome {
            GameOutcome::FirstWin => Outcomes::WIN,
            GameOutcome::SecondWin => Outcomes::LOSS,
            GameOutcome::Draw => Outcomes::DRAW,
        }
    }
}
