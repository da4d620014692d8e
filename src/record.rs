//! Canonical game-record data model
//!
//! Game records are the reports of record for finished games, modelled after
//! chess PGN headers but carried as JSON so that games with richer notation
//! still fit. This module owns the serde model plus the schema boundary used
//! by [`RatingEngine::run`](crate::rating::RatingEngine::run): parsing a
//! serialized record and rejecting anything structurally unusable before it
//! reaches an engine.

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{PlayerKey, RecordId};

/// A validated, immutable game record: header metadata plus the move list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub header: RecordHeader,
    /// Rounds of per-player moves. Only the round count matters to the
    /// rating engines; the notation is opaque here.
    pub moves: Vec<Vec<RoundMove>>,
}

/// Game metadata: name-value pairs describing what was played, where,
/// when, and by whom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordHeader {
    pub game: GameMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    pub site: Site,
    #[serde(rename = "date-start")]
    pub date_start: String,
    #[serde(rename = "date-end")]
    pub date_end: String,
    #[serde(rename = "date-generated")]
    pub date_generated: String,
    /// Explicitly flags a record as not to be rated.
    #[serde(default)]
    pub unrated: bool,
    /// Players in seating order; two-player engines require exactly two.
    pub players: Vec<RecordPlayer>,
    #[serde(
        rename = "startingPosition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub starting_position: Option<String>,
}

/// Which game this record is for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
}

/// Where the game took place. Online sites provide a per-site unique
/// game id; records without one cannot be deduplicated and are rejected
/// by the engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gameid: Option<SiteGameId>,
}

/// Site game ids arrive as either strings or numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SiteGameId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for SiteGameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteGameId::Text(s) => write!(f, "{}", s),
            SiteGameId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One player's entry in a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPlayer {
    /// Display name at the time the game was archived.
    pub name: String,
    /// Site-unique identifier. Without one the player cannot be rated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ai: Option<bool>,
    /// Result ordinal: higher means "more winning", ties share a value.
    pub result: f64,
}

impl RecordPlayer {
    /// The userid, if present and non-empty.
    pub fn usable_userid(&self) -> Option<&str> {
        self.userid.as_deref().filter(|id| !id.is_empty())
    }
}

/// One player's move within a round: absent, bare notation, or notation
/// with commentary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundMove {
    Absent,
    Notation(String),
    Annotated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sequence: Option<u64>,
        #[serde(rename = "move")]
        notation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<serde_json::Value>,
    },
}

impl GameRecord {
    /// Parse a serialized record and validate it at the schema boundary.
    pub fn from_json(raw: &str) -> crate::error::Result<Self> {
        let record: GameRecord =
            serde_json::from_str(raw).context("record does not match the game record schema")?;
        record.validate()?;
        Ok(record)
    }

    /// Structural checks the serde model cannot express. Schema-valid does
    /// not mean eligible: per-engine rules (player count, userids, round
    /// count, duplicates) are applied later by the eligibility pipeline.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.header.game.name.is_empty() {
            bail!("game name must not be empty");
        }
        if self.header.site.name.is_empty() {
            bail!("site name must not be empty");
        }
        if self.header.players.len() < 2 {
            bail!(
                "a record needs at least two players, found {}",
                self.header.players.len()
            );
        }
        for (i, player) in self.header.players.iter().enumerate() {
            if player.name.is_empty() {
                bail!("player {} has an empty name", i);
            }
        }
        for (field, value) in [
            ("date-start", &self.header.date_start),
            ("date-end", &self.header.date_end),
            ("date-generated", &self.header.date_generated),
        ] {
            if !is_valid_datetime(value) {
                bail!("{} is not a valid ISO-8601 datetime: {:?}", field, value);
            }
        }
        Ok(())
    }

    /// Globally unique record id, `site name + "|" + site gameid`.
    /// `None` when the site did not provide a game id.
    pub fn record_id(&self) -> Option<RecordId> {
        self.header
            .site
            .gameid
            .as_ref()
            .map(|gameid| format!("{}|{}", self.header.site.name, gameid))
    }

    /// Composite player key, `site name + "|" + userid`. `None` when the
    /// player has no usable userid.
    pub fn player_key(&self, player: &RecordPlayer) -> Option<PlayerKey> {
        player
            .usable_userid()
            .map(|userid| format!("{}|{}", self.header.site.name, userid))
    }

    /// Number of rounds played.
    pub fn rounds(&self) -> usize {
        self.moves.len()
    }
}

/// Accepts RFC 3339, a naive datetime, or a bare date. Sites are not
/// consistent about timezone suffixes.
fn is_valid_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
