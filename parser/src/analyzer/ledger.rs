use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::game::GameRecord;
use crate::types::{PlayerId, Tick};

/// Per-player, per-round kill and death counts for one game.
///
/// Built once from an immutable [`GameRecord`] and handed to whoever needs
/// rolling performance figures.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceLedger {
    rounds: usize,
    kills: BTreeMap<PlayerId, Vec<u32>>,
    deaths: BTreeMap<PlayerId, Vec<u32>>,
}

impl PerformanceLedger {
    pub fn from_game(game: &GameRecord) -> Self {
        let rounds = game
            .rounds()
            .iter()
            .map(|round| round.index() + 1)
            .max()
            .unwrap_or(0);
        let empty = || {
            game.participants()
                .into_iter()
                .map(|id| (id, vec![0u32; rounds]))
                .collect::<BTreeMap<_, _>>()
        };
        let mut kills = empty();
        let mut deaths = empty();

        for round in game.rounds() {
            let index = round.index();
            for kill in round.kills() {
                // players outside the rosters (e.g. disconnect replacements) are still counted
                if !kill.is_suicide
                    && !kill.is_teamkill
                    && let Some(killer) = kill.killer_id
                {
                    kills.entry(killer).or_insert_with(|| vec![0; rounds])[index] += 1;
                }
                let victim = kill.victim_id;
                deaths.entry(victim).or_insert_with(|| vec![0; rounds])[index] += 1;
            }
        }

        // keep both tables keyed by the same players
        for id in kills.keys().copied().collect::<Vec<_>>() {
            deaths.entry(id).or_insert_with(|| vec![0; rounds]);
        }
        for id in deaths.keys().copied().collect::<Vec<_>>() {
            kills.entry(id).or_insert_with(|| vec![0; rounds]);
        }

        Self {
            rounds,
            kills,
            deaths,
        }
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Number of players the averages are taken over.
    pub fn participant_count(&self) -> usize {
        self.kills.len()
    }

    /// Kills by `player` in rounds strictly before `round`.
    pub fn kills_before(&self, player: PlayerId, round: usize, tick: Tick) -> Result<u32> {
        Self::sum_before(&self.kills, player, round, tick)
    }

    /// Deaths of `player` in rounds strictly before `round`.
    pub fn deaths_before(&self, player: PlayerId, round: usize, tick: Tick) -> Result<u32> {
        Self::sum_before(&self.deaths, player, round, tick)
    }

    /// Mean kills per participant over rounds strictly before `round`.
    pub fn average_kills_before(&self, round: usize) -> f64 {
        self.average_before(&self.kills, round)
    }

    /// Mean deaths per participant over rounds strictly before `round`.
    pub fn average_deaths_before(&self, round: usize) -> f64 {
        self.average_before(&self.deaths, round)
    }

    fn sum_before(
        counts: &BTreeMap<PlayerId, Vec<u32>>,
        player: PlayerId,
        round: usize,
        tick: Tick,
    ) -> Result<u32> {
        let per_round = counts
            .get(&player)
            .ok_or(Error::PlayerNotFound { player, tick })?;
        Ok(per_round.iter().take(round).sum())
    }

    fn average_before(&self, counts: &BTreeMap<PlayerId, Vec<u32>>, round: usize) -> f64 {
        let participants = self.participant_count();
        if participants == 0 {
            return 0.0;
        }
        let total: u32 = counts
            .values()
            .map(|per_round| per_round.iter().take(round).sum::<u32>())
            .sum();
        total as f64 / participants as f64
    }
}
