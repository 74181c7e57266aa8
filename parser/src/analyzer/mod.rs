pub mod aligner;
pub mod ledger;
pub mod tick_stream;

pub use aligner::{AlignedKill, KillFilter, KillWindows, align_game, align_round};
pub use ledger::PerformanceLedger;
pub use tick_stream::{DeathEvent, DuelSample, DuelSampler, TickRow, TickSamples, TickTable};
