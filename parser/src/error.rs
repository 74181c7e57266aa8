use thiserror::Error;

use crate::types::{PlayerId, Tick};

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown side token {0:?}")]
    UnknownSide(String),
    #[error("unknown team number {0}")]
    UnknownTeamNumber(i64),
    #[error("invalid duel at {tick} (killer {killer:?}, victim {victim}): {reason}")]
    InvalidDuel {
        tick: Tick,
        killer: Option<PlayerId>,
        victim: PlayerId,
        reason: String,
    },
    #[error("player {player} not found at {tick}")]
    PlayerNotFound { player: PlayerId, tick: Tick },
    #[error("malformed sample at {tick}: player {player} has {found} rows, expected {expected}")]
    MalformedSample {
        tick: Tick,
        player: PlayerId,
        expected: usize,
        found: usize,
    },
    #[error("round numbers start at 1, got {0}")]
    InvalidRoundNumber(usize),
    #[error("round {round} has more than one frame at {tick}")]
    DuplicateFrameTick { round: usize, tick: Tick },
    #[error("failed to decode match record")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
