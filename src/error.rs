use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchupError {
    #[error("No candidates left on our side")]
    NoCandidates,

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Player not available: {0}")]
    PlayerUnavailable(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Game {game}: expected {expected}")]
    OutOfTurn { game: usize, expected: &'static str },

    #[error("All games already have both players")]
    SessionComplete,

    #[error("Invalid game number: {0} (expected 1-4)")]
    InvalidGame(usize),

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type MatchupResult<T> = Result<T, MatchupError>;
