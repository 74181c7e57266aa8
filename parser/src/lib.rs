pub mod analyzer;
mod error;
pub mod game;
pub mod raw;
pub mod side;
pub mod types;
pub mod window;

pub use error::*;
pub use game::{
    Duel, FrameRecord, GameRecord, KillRecord, PlayerSnapshot, PlayerSnapshotBuilder, RoundRecord,
    TeamFrame,
};
pub use side::Side;
pub use strum;
pub use types::{PlayerId, Tick, Vector3};
