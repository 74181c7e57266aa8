use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Replay(#[from] duel_replays::Error),
    #[error("feature {key:?} is produced by more than one group")]
    KeyCollision { key: String },
}

pub type Result<T> = std::result::Result<T, Error>;
