//! Duel sampling straight from a per-tick player table and its death events,
//! without building a [`crate::game::GameRecord`] first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::side::Side;
use crate::types::{PlayerId, Tick, Vector3};

/// One player's state at one tick, as exported by the demo parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickRow {
    pub tick: Tick,
    #[serde(rename = "steamid")]
    pub player_id: PlayerId,
    /// 2 = T (attacker), 3 = CT (defender)
    pub team_num: i64,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
    /// Degrees, positive looking down
    pub pitch: f64,
    /// Degrees
    pub yaw: f64,
    #[serde(default)]
    pub velocity: f64,
    pub health: i64,
    #[serde(rename = "armor_value", default)]
    pub armor: i64,
    #[serde(default)]
    pub has_helmet: bool,
    #[serde(rename = "current_equip_value", default)]
    pub equipment_value: i64,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub flash_duration: f64,
    #[serde(default)]
    pub duck_amount: f64,
    #[serde(default)]
    pub is_airborne: bool,
    #[serde(default)]
    pub is_scoped: bool,
    #[serde(default)]
    pub is_walking: bool,
    #[serde(default)]
    pub is_defusing: bool,
    #[serde(default)]
    pub is_bomb_planted: bool,
    #[serde(default)]
    pub t_losing_streak: i64,
    #[serde(default)]
    pub ct_losing_streak: i64,
}

impl TickRow {
    pub fn position(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// A `player_death` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeathEvent {
    pub tick: Tick,
    /// Absent for world damage
    #[serde(rename = "attacker_steamid")]
    pub attacker_id: Option<PlayerId>,
    #[serde(rename = "attacker_team_num")]
    pub attacker_team: Option<i64>,
    #[serde(rename = "user_steamid")]
    pub victim_id: PlayerId,
    #[serde(rename = "user_team_num")]
    pub victim_team: i64,
    #[serde(rename = "assister_steamid")]
    pub assister_id: Option<PlayerId>,
    #[serde(rename = "is_warmup_period", default)]
    pub is_warmup: bool,
    #[serde(default)]
    pub hitgroup: String,
}

impl DeathEvent {
    /// Why this death can't be a one-on-one duel sample, if it can't.
    fn rejection(&self) -> Option<&'static str> {
        if self.is_warmup {
            Some("warmup")
        } else if self.attacker_id.is_none() {
            Some("no attacker")
        } else if self.attacker_team == Some(self.victim_team) {
            Some("same team")
        } else if self.assister_id.is_some() {
            Some("assisted")
        } else if self.hitgroup == "generic" {
            Some("generic hitgroup")
        } else {
            None
        }
    }
}

/// Tick rows grouped per player, each group in ascending tick order.
#[derive(Debug, Clone, Default)]
pub struct TickTable {
    rows: HashMap<PlayerId, Vec<TickRow>>,
}

impl TickTable {
    pub fn new(rows: impl IntoIterator<Item = TickRow>) -> Self {
        let mut grouped: HashMap<PlayerId, Vec<TickRow>> = HashMap::new();
        for row in rows {
            grouped.entry(row.player_id).or_default().push(row);
        }
        for player_rows in grouped.values_mut() {
            player_rows.sort_by_key(|row| row.tick);
        }
        Self { rows: grouped }
    }

    pub fn player_rows(&self, player: PlayerId) -> &[TickRow] {
        self.rows.get(&player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows of `player` with tick in `[start, end)`.
    pub fn rows_in_range(&self, player: PlayerId, start: Tick, end: Tick) -> &[TickRow] {
        let rows = self.player_rows(player);
        let start_idx = rows.partition_point(|row| row.tick < start);
        let end_idx = rows.partition_point(|row| row.tick < end);
        &rows[start_idx..end_idx.max(start_idx)]
    }

    pub fn player_count(&self) -> usize {
        self.rows.len()
    }
}

/// Rows leading up to one duel, split by role.
#[derive(Debug, Clone, Serialize)]
pub struct DuelSample {
    pub tick: Tick,
    pub map_name: String,
    pub attacker_id: PlayerId,
    pub defender_id: PlayerId,
    pub attacker_rows: Vec<TickRow>,
    pub defender_rows: Vec<TickRow>,
    /// Side of the player who survived
    pub label: Side,
}

impl DuelSample {
    pub fn rows(&self, side: Side) -> &[TickRow] {
        match side {
            Side::Attacker => &self.attacker_rows,
            Side::Defender => &self.defender_rows,
        }
    }
}

#[derive(Debug, Default)]
pub struct TickSamples {
    pub samples: Vec<DuelSample>,
    /// Samples thrown away for incomplete tick coverage, always [`Error::MalformedSample`].
    pub dropped: Vec<Error>,
}

impl TickSamples {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn extend(&mut self, other: TickSamples) {
        self.samples.extend(other.samples);
        self.dropped.extend(other.dropped);
    }
}

/// Cuts a fixed tick window out of the table before every qualifying death.
///
/// The window for a death at tick `d` covers `[d - lag - length, d - lag)`;
/// every `step`-th row of it is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelSampler {
    window_length: usize,
    window_lag: i64,
    window_step: usize,
}

impl Default for DuelSampler {
    fn default() -> Self {
        Self::new(128, 0, 1)
    }
}

impl DuelSampler {
    /// Length and step are clamped to at least one tick.
    pub fn new(window_length: usize, window_lag: i64, window_step: usize) -> Self {
        Self {
            window_length: window_length.max(1),
            window_lag,
            window_step: window_step.max(1),
        }
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn window_lag(&self) -> i64 {
        self.window_lag
    }

    pub fn window_step(&self) -> usize {
        self.window_step
    }

    /// Samples every qualifying death of one match.
    ///
    /// Deaths between players of unexpected team numbers abort the match with
    /// [`Error::InvalidDuel`]; windows with missing ticks are dropped and
    /// reported in [`TickSamples::dropped`].
    pub fn sample(
        &self,
        map_name: &str,
        table: &TickTable,
        deaths: &[DeathEvent],
    ) -> Result<TickSamples> {
        let mut out = TickSamples::default();

        for death in deaths {
            if let Some(reason) = death.rejection() {
                debug!(tick = %death.tick, reason, "skipping death event");
                continue;
            }
            match self.sample_death(map_name, table, death)? {
                Ok(sample) => out.samples.push(sample),
                Err(dropped) => {
                    debug!(tick = %death.tick, "dropping sample: {dropped}");
                    out.dropped.push(dropped);
                }
            }
        }

        Ok(out)
    }

    /// Outer error aborts the match, inner error drops the sample.
    fn sample_death(
        &self,
        map_name: &str,
        table: &TickTable,
        death: &DeathEvent,
    ) -> Result<std::result::Result<DuelSample, Error>> {
        let killer = death.attacker_id.unwrap_or_default();
        let invalid = |reason: String| Error::InvalidDuel {
            tick: death.tick,
            killer: death.attacker_id,
            victim: death.victim_id,
            reason,
        };

        let killer_team = death
            .attacker_team
            .ok_or_else(|| invalid("killer has no team".to_string()))?;
        let killer_side = Side::from_team_num(killer_team)
            .map_err(|_| invalid(format!("killer team number {killer_team}")))?;
        let victim_side = Side::from_team_num(death.victim_team)
            .map_err(|_| invalid(format!("victim team number {}", death.victim_team)))?;
        if killer_side == victim_side {
            return Err(invalid(format!("both parties are {killer_side}s")));
        }

        let (attacker_id, defender_id) = match killer_side {
            Side::Attacker => (killer, death.victim_id),
            Side::Defender => (death.victim_id, killer),
        };

        let end = death.tick - self.window_lag;
        let start = end - self.window_length as i64;

        let mut rows = [Vec::new(), Vec::new()];
        for (slot, player) in rows.iter_mut().zip([attacker_id, defender_id]) {
            let found = table.rows_in_range(player, start, end);
            if found.len() != self.window_length {
                return Ok(Err(Error::MalformedSample {
                    tick: death.tick,
                    player,
                    expected: self.window_length,
                    found: found.len(),
                }));
            }
            *slot = found.iter().step_by(self.window_step).cloned().collect();
        }
        let [attacker_rows, defender_rows] = rows;

        Ok(Ok(DuelSample {
            tick: death.tick,
            map_name: map_name.to_string(),
            attacker_id,
            defender_id,
            attacker_rows,
            defender_rows,
            label: killer_side,
        }))
    }
}
