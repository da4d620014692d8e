//! Test fixtures for building game records

use recranks::record::{
    GameMeta, GameRecord, RecordHeader, RecordPlayer, RoundMove, Site, SiteGameId,
};

pub const SITE: &str = "Abstract Play";

/// Install a test subscriber so skipped-record warnings show up under
/// `--nocapture`. Safe to call from every test.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builder for two-player game records with sensible defaults.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    gameid: Option<String>,
    game_name: String,
    date_end: String,
    players: Vec<RecordPlayer>,
    rounds: usize,
    unrated: bool,
}

impl RecordBuilder {
    pub fn new(gameid: &str) -> Self {
        Self {
            gameid: Some(gameid.to_string()),
            game_name: "Homeworlds".to_string(),
            date_end: "2023-06-15T12:00:00.000Z".to_string(),
            players: vec![
                player("alice", Some("u1"), 1.0),
                player("bob", Some("u2"), 0.0),
            ],
            rounds: 5,
            unrated: false,
        }
    }

    pub fn game(mut self, name: &str) -> Self {
        self.game_name = name.to_string();
        self
    }

    pub fn date_end(mut self, date_end: &str) -> Self {
        self.date_end = date_end.to_string();
        self
    }

    pub fn players(mut self, players: Vec<RecordPlayer>) -> Self {
        self.players = players;
        self
    }

    /// Two players by userid with the given result ordinals.
    pub fn matchup(self, first: &str, second: &str, results: (f64, f64)) -> Self {
        self.players(vec![
            player(first, Some(first), results.0),
            player(second, Some(second), results.1),
        ])
    }

    pub fn rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn unrated(mut self) -> Self {
        self.unrated = true;
        self
    }

    pub fn no_gameid(mut self) -> Self {
        self.gameid = None;
        self
    }

    pub fn build(self) -> GameRecord {
        GameRecord {
            header: RecordHeader {
                game: GameMeta {
                    name: self.game_name,
                    variants: None,
                },
                event: None,
                round: None,
                site: Site {
                    name: SITE.to_string(),
                    gameid: self.gameid.map(SiteGameId::Text),
                },
                date_start: "2023-06-01T12:00:00.000Z".to_string(),
                date_end: self.date_end,
                date_generated: "2023-07-01T00:00:00.000Z".to_string(),
                unrated: self.unrated,
                players: self.players,
                starting_position: None,
            },
            moves: vec![vec![RoundMove::Notation("pass".to_string())]; self.rounds],
        }
    }

    pub fn build_json(self) -> String {
        serde_json::to_string(&self.build()).expect("record serializes")
    }
}

pub fn player(name: &str, userid: Option<&str>, result: f64) -> RecordPlayer {
    RecordPlayer {
        name: name.to_string(),
        userid: userid.map(str::to_string),
        score: None,
        is_ai: None,
        result,
    }
}

/// Composite key as the engines build it.
pub fn key(userid: &str) -> String {
    format!("{}|{}", SITE, userid)
}
