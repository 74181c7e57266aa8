use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

use crate::game::{FrameRecord, GameRecord, KillRecord, RoundRecord};
use crate::window::{SlidingWindows, sliding_windows};

/// Which kills of a round take part in alignment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillFilter {
    All,
    /// Only one-on-one kills, see [`KillRecord::is_clean`].
    #[default]
    Clean,
}

impl KillFilter {
    pub fn from_clean_only(clean_only: bool) -> Self {
        if clean_only {
            KillFilter::Clean
        } else {
            KillFilter::All
        }
    }

    pub fn accepts(self, kill: &KillRecord) -> bool {
        match self {
            KillFilter::All => true,
            KillFilter::Clean => kill.is_clean(),
        }
    }
}

/// A kill paired with the frames recorded immediately before it.
#[derive(Debug, Clone, Copy)]
pub struct AlignedKill<'a> {
    pub kill: &'a KillRecord,
    /// Oldest frame first. Every frame precedes the kill.
    pub window: &'a [FrameRecord],
}

/// Walks a round's frame windows and kills in tick order, pairing each kill
/// with the one window whose last frame precedes it by less than the
/// sampling rate.
///
/// Kills that no window precedes closely enough (too early in the round, or
/// inside a gap in the frame stream) are skipped.
pub struct KillWindows<'a> {
    windows: SlidingWindows<'a, FrameRecord>,
    current: Option<&'a [FrameRecord]>,
    pending: VecDeque<&'a KillRecord>,
    sampling_rate: i64,
}

pub fn align_round(
    round: &RoundRecord,
    sampling_rate: i64,
    window_size: usize,
    filter: KillFilter,
) -> KillWindows<'_> {
    let pending: VecDeque<_> = round
        .kills()
        .iter()
        .filter(|kill| filter.accepts(kill))
        .collect();

    if !pending.is_empty() && round.frames().len() < window_size {
        warn!(
            round = round.index(),
            frames = round.frames().len(),
            window_size,
            "round has kills but too few frames for a single window"
        );
    }

    KillWindows {
        windows: sliding_windows(round.frames(), window_size),
        current: None,
        pending,
        sampling_rate,
    }
}

/// Aligned kills over every round of a game, round by round.
pub fn align_game(
    game: &GameRecord,
    window_size: usize,
    filter: KillFilter,
) -> impl Iterator<Item = AlignedKill<'_>> {
    let sampling_rate = game.sampling_rate();
    game.rounds()
        .iter()
        .flat_map(move |round| align_round(round, sampling_rate, window_size, filter))
}

impl<'a> Iterator for KillWindows<'a> {
    type Item = AlignedKill<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let kill = *self.pending.front()?;

            let window = match self.current {
                Some(window) => window,
                None => match self.windows.next() {
                    Some(window) => {
                        self.current = Some(window);
                        window
                    }
                    None => {
                        debug!(
                            skipped = self.pending.len(),
                            "frames exhausted before remaining kills"
                        );
                        self.pending.clear();
                        return None;
                    }
                },
            };

            // windows are never empty: sliding_windows yields nothing for size 0
            let last_tick = window[window.len() - 1].tick();
            let delta = kill.tick - last_tick;

            if delta <= 0 {
                // This and every later window ends at or after the kill.
                debug!(tick = %kill.tick, "no window precedes kill, skipping");
                self.pending.pop_front();
                continue;
            }

            if delta < self.sampling_rate {
                self.pending.pop_front();
                trace!(tick = %kill.tick, %last_tick, "aligned kill");
                // the same window is re-tested against the next kill
                return Some(AlignedKill { kill, window });
            }

            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::kill;
    use crate::side::Side;
    use crate::types::{PlayerId, Tick};

    fn frames(ticks: &[i64]) -> Vec<FrameRecord> {
        ticks
            .iter()
            .map(|&t| FrameRecord::new(Tick(t), vec![], vec![]))
            .collect()
    }

    fn duel(tick: i64) -> KillRecord {
        kill(tick, (1, Side::Attacker), (2, Side::Defender))
    }

    fn round(ticks: &[i64], kills: Vec<KillRecord>) -> RoundRecord {
        RoundRecord::new(
            0,
            frames(ticks),
            kills,
            vec![PlayerId(1)],
            vec![PlayerId(2)],
        )
        .unwrap()
    }

    fn window_ticks(aligned: &AlignedKill<'_>) -> Vec<i64> {
        aligned.window.iter().map(|f| f.tick().raw()).collect()
    }

    #[test]
    fn kill_pairs_with_window_just_before_it() {
        let r = round(&[0, 16, 32, 48, 64, 80], vec![duel(70)]);
        let aligned: Vec<_> = align_round(&r, 16, 4, KillFilter::Clean).collect();
        assert_eq!(aligned.len(), 1);
        assert_eq!(aligned[0].kill.tick, Tick(70));
        assert_eq!(window_ticks(&aligned[0]), vec![16, 32, 48, 64]);
    }

    #[test]
    fn kill_exactly_one_interval_after_a_frame_is_dropped() {
        // 64 - 48 == sampling rate, and the window ending at 64 does not precede the kill
        let r = round(&[0, 16, 32, 48, 64, 80], vec![duel(64)]);
        assert_eq!(align_round(&r, 16, 3, KillFilter::Clean).count(), 0);
    }

    #[test]
    fn round_without_kills_yields_nothing() {
        let r = round(&[0, 16, 32, 48], vec![]);
        assert_eq!(align_round(&r, 16, 2, KillFilter::All).count(), 0);
    }

    #[test]
    fn kill_before_window_fills_is_skipped() {
        let r = round(&[0, 16, 32, 48, 64, 80], vec![duel(20), duel(70)]);
        let aligned: Vec<_> = align_round(&r, 16, 4, KillFilter::Clean).collect();
        assert_eq!(aligned.len(), 1);
        assert_eq!(aligned[0].kill.tick, Tick(70));
    }

    #[test]
    fn close_kills_share_a_window() {
        let r = round(&[0, 16, 32, 48, 64], vec![duel(50), duel(55), duel(70)]);
        let aligned: Vec<_> = align_round(&r, 16, 2, KillFilter::Clean).collect();
        let pairs: Vec<_> = aligned
            .iter()
            .map(|a| (a.kill.tick.raw(), window_ticks(a)))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (50, vec![32, 48]),
                (55, vec![32, 48]),
                (70, vec![48, 64]),
            ]
        );
    }

    #[test]
    fn kill_after_last_frame_interval_is_dropped() {
        let r = round(&[0, 16, 32], vec![duel(100)]);
        assert_eq!(align_round(&r, 16, 2, KillFilter::Clean).count(), 0);
    }

    #[test]
    fn frame_gap_drops_kill_but_not_later_ones() {
        // frames missing between 32 and 96; kill at 60 has no window within 16 ticks
        let r = round(&[0, 16, 32, 96, 112], vec![duel(60), duel(120)]);
        let aligned: Vec<_> = align_round(&r, 16, 2, KillFilter::Clean).collect();
        assert_eq!(aligned.len(), 1);
        assert_eq!(aligned[0].kill.tick, Tick(120));
        assert_eq!(window_ticks(&aligned[0]), vec![96, 112]);
    }

    #[test]
    fn filter_selects_clean_kills() {
        let traded = KillRecord {
            is_trade: true,
            ..duel(40)
        };
        let r = round(&[0, 16, 32, 48, 64], vec![traded, duel(70)]);

        let clean: Vec<_> = align_round(&r, 16, 2, KillFilter::Clean)
            .map(|a| a.kill.tick.raw())
            .collect();
        assert_eq!(clean, vec![70]);

        let all: Vec<_> = align_round(&r, 16, 2, KillFilter::All)
            .map(|a| a.kill.tick.raw())
            .collect();
        assert_eq!(all, vec![40, 70]);
    }

    #[test]
    fn game_alignment_walks_rounds_in_order() {
        let first = round(&[0, 16, 32], vec![duel(40)]);
        let second = RoundRecord::new(
            1,
            frames(&[1000, 1016, 1032]),
            vec![duel(1020)],
            vec![PlayerId(1)],
            vec![PlayerId(2)],
        )
        .unwrap();
        let game = GameRecord::new("de_nuke", 16, vec![second, first]);
        let ticks: Vec<_> = align_game(&game, 2, KillFilter::Clean)
            .map(|a| a.kill.tick.raw())
            .collect();
        assert_eq!(ticks, vec![40, 1020]);
    }
}
