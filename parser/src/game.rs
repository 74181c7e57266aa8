//! Immutable structured view over one match record: game → rounds → frames →
//! teams → players, plus the kill events of every round.

use derive_builder::Builder;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Read;

use crate::error::{Error, Result};
use crate::raw::{RawFrame, RawGame, RawKill, RawPlayerFrame, RawRound, RawTeamFrame};
use crate::side::Side;
use crate::types::{PlayerId, Tick, Vector3};

#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    map_name: String,
    sampling_rate: i64,
    rounds: Vec<RoundRecord>,
}

impl GameRecord {
    /// Rounds are reordered by index.
    pub fn new(
        map_name: impl Into<String>,
        sampling_rate: i64,
        mut rounds: Vec<RoundRecord>,
    ) -> Self {
        rounds.sort_by_key(|round| round.index);
        Self {
            map_name: map_name.into(),
            sampling_rate,
            rounds,
        }
    }

    pub fn from_raw(raw: RawGame) -> Result<Self> {
        let rounds = raw
            .game_rounds
            .into_iter()
            .map(RoundRecord::from_raw)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(raw.map_name, raw.parser_parameters.parse_rate, rounds))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_raw(serde_json::from_str(s)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_raw(serde_json::from_slice(bytes)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_raw(serde_json::from_reader(reader)?)
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    /// Ticks between two consecutive recorded frames.
    pub fn sampling_rate(&self) -> i64 {
        self.sampling_rate
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    /// Every player that appears on either roster in any round.
    pub fn participants(&self) -> BTreeSet<PlayerId> {
        self.rounds
            .iter()
            .flat_map(|round| round.attacker_ids.iter().chain(round.defender_ids.iter()))
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundRecord {
    index: usize,
    frames: Vec<FrameRecord>,
    kills: Vec<KillRecord>,
    attacker_ids: Vec<PlayerId>,
    defender_ids: Vec<PlayerId>,
}

impl RoundRecord {
    /// Builds a round with frames and kills in ascending tick order.
    ///
    /// `index` is 0-based. Fails if two frames share a tick.
    pub fn new(
        index: usize,
        mut frames: Vec<FrameRecord>,
        mut kills: Vec<KillRecord>,
        attacker_ids: Vec<PlayerId>,
        defender_ids: Vec<PlayerId>,
    ) -> Result<Self> {
        frames.sort_by_key(|frame| frame.tick);
        if let Some(pair) = frames.windows(2).find(|pair| pair[0].tick == pair[1].tick) {
            return Err(Error::DuplicateFrameTick {
                round: index,
                tick: pair[0].tick,
            });
        }
        kills.sort_by_key(|kill| kill.tick);

        Ok(Self {
            index,
            frames,
            kills,
            attacker_ids,
            defender_ids,
        })
    }

    fn from_raw(raw: RawRound) -> Result<Self> {
        let index = raw
            .round_num
            .checked_sub(1)
            .ok_or(Error::InvalidRoundNumber(raw.round_num))?;
        let kills = raw
            .kills
            .into_iter()
            .map(|kill| KillRecord::from_raw(kill, index))
            .collect::<Result<Vec<_>>>()?;
        let frames = raw.frames.into_iter().map(FrameRecord::from).collect();
        let attacker_ids = raw
            .t_side
            .players
            .iter()
            .map(|p| PlayerId(p.steam_id))
            .collect();
        let defender_ids = raw
            .ct_side
            .players
            .iter()
            .map(|p| PlayerId(p.steam_id))
            .collect();

        Self::new(index, frames, kills, attacker_ids, defender_ids)
    }

    /// 0-based round index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn kills(&self) -> &[KillRecord] {
        &self.kills
    }

    pub fn attacker_ids(&self) -> &[PlayerId] {
        &self.attacker_ids
    }

    pub fn defender_ids(&self) -> &[PlayerId] {
        &self.defender_ids
    }

    pub fn side_ids(&self, side: Side) -> &[PlayerId] {
        match side {
            Side::Attacker => &self.attacker_ids,
            Side::Defender => &self.defender_ids,
        }
    }
}

/// Snapshot of both teams at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    tick: Tick,
    attackers: TeamFrame,
    defenders: TeamFrame,
}

impl FrameRecord {
    pub fn new(tick: Tick, attackers: Vec<PlayerSnapshot>, defenders: Vec<PlayerSnapshot>) -> Self {
        Self {
            tick,
            attackers: TeamFrame { players: attackers },
            defenders: TeamFrame { players: defenders },
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn team(&self, side: Side) -> &TeamFrame {
        match side {
            Side::Attacker => &self.attackers,
            Side::Defender => &self.defenders,
        }
    }

    pub fn attackers(&self) -> &TeamFrame {
        &self.attackers
    }

    pub fn defenders(&self) -> &TeamFrame {
        &self.defenders
    }

    pub fn player(&self, id: PlayerId) -> Result<&PlayerSnapshot> {
        self.attackers
            .players
            .iter()
            .chain(self.defenders.players.iter())
            .find(|player| player.id == id)
            .ok_or(Error::PlayerNotFound {
                player: id,
                tick: self.tick,
            })
    }
}

impl From<RawFrame> for FrameRecord {
    fn from(raw: RawFrame) -> Self {
        fn players(team: RawTeamFrame) -> Vec<PlayerSnapshot> {
            team.players.into_iter().map(PlayerSnapshot::from).collect()
        }

        FrameRecord::new(Tick(raw.tick), players(raw.t), players(raw.ct))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamFrame {
    players: Vec<PlayerSnapshot>,
}

impl TeamFrame {
    pub fn players(&self) -> &[PlayerSnapshot] {
        &self.players
    }
}

/// State of a single player at one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Builder)]
#[builder(default, setter(into))]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub position: Vector3,
    pub velocity: Vector3,
    /// Horizontal view angle in degrees, [0, 360)
    pub view_yaw: f64,
    /// Vertical view angle in degrees, [0, 360)
    pub view_pitch: f64,
    pub hp: i64,
    pub armor: i64,
    /// Lower-cased item name, e.g. `ak-47`
    pub active_item: String,
    pub is_blinded: bool,
    pub is_airborne: bool,
    pub is_ducking: bool,
    pub is_standing: bool,
    pub is_scoped: bool,
    pub is_walking: bool,
    pub equipment_value: i64,
    pub cash: i64,
    pub has_helmet: bool,
}

impl PlayerSnapshot {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// Wraps an angle into [0, 360). `rem_euclid` alone rounds tiny negative
/// angles up to exactly 360.
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

impl From<RawPlayerFrame> for PlayerSnapshot {
    fn from(raw: RawPlayerFrame) -> Self {
        PlayerSnapshot {
            id: PlayerId(raw.steam_id),
            position: Vector3::new(raw.x, raw.y, raw.z),
            velocity: Vector3::new(raw.velocity_x, raw.velocity_y, raw.velocity_z),
            view_yaw: wrap_degrees(raw.view_x),
            view_pitch: wrap_degrees(raw.view_y),
            hp: raw.hp,
            armor: raw.armor,
            active_item: raw.active_weapon.to_lowercase(),
            is_blinded: raw.is_blinded,
            is_airborne: raw.is_airborne,
            is_ducking: raw.is_ducking,
            is_standing: raw.is_standing,
            is_scoped: raw.is_scoped,
            is_walking: raw.is_walking,
            equipment_value: raw.equipment_value,
            cash: raw.cash,
            has_helmet: raw.has_helmet,
        }
    }
}

/// A kill event. The killer is absent for world damage (falls, the bomb).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillRecord {
    /// 0-based index of the round the kill happened in
    pub round_index: usize,
    pub tick: Tick,
    pub killer_id: Option<PlayerId>,
    pub killer_side: Option<Side>,
    pub victim_id: PlayerId,
    pub victim_side: Side,
    pub assister_id: Option<PlayerId>,
    pub is_suicide: bool,
    pub is_teamkill: bool,
    pub is_trade: bool,
}

/// The two participants of a kill, resolved to their roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Duel {
    pub attacker_id: PlayerId,
    pub defender_id: PlayerId,
    /// Side of the player who survived
    pub winner: Side,
}

impl KillRecord {
    fn from_raw(raw: RawKill, round_index: usize) -> Result<Self> {
        Ok(Self {
            round_index,
            tick: Tick(raw.tick),
            killer_id: raw.attacker_steam_id.map(PlayerId),
            killer_side: raw
                .attacker_side
                .as_deref()
                .map(Side::from_token)
                .transpose()?,
            victim_id: PlayerId(raw.victim_steam_id),
            victim_side: Side::from_token(&raw.victim_side)?,
            assister_id: raw.assister_steam_id.map(PlayerId),
            is_suicide: raw.is_suicide,
            is_teamkill: raw.is_teamkill,
            is_trade: raw.is_trade,
        })
    }

    /// A one-on-one kill: not a suicide, team-kill or trade, with nobody assisting.
    pub fn is_clean(&self) -> bool {
        self.killer_id.is_some()
            && !self.is_suicide
            && !self.is_teamkill
            && !self.is_trade
            && self.assister_id.is_none()
    }

    pub fn attacker_id(&self) -> Result<PlayerId> {
        self.id_on(Side::Attacker)
    }

    pub fn defender_id(&self) -> Result<PlayerId> {
        self.id_on(Side::Defender)
    }

    /// The participant playing `side`. Exactly one of killer and victim must be on it.
    pub fn id_on(&self, side: Side) -> Result<PlayerId> {
        let killer_on_side = self.killer_side == Some(side);
        let victim_on_side = self.victim_side == side;
        match (killer_on_side, victim_on_side, self.killer_id) {
            (true, true, _) => Err(self.invalid(format!("both parties are {side}s"))),
            (false, true, _) => Ok(self.victim_id),
            (true, false, Some(killer)) => Ok(killer),
            (true, false, None) => Err(self.invalid(format!("{side} killer has no id"))),
            (false, false, _) => Err(self.invalid(format!("neither party is a {side}"))),
        }
    }

    /// Resolves both roles and the winning side.
    pub fn duel(&self) -> Result<Duel> {
        let attacker_id = self.attacker_id()?;
        let defender_id = self.defender_id()?;
        let winner = self.victim_side.opponent();
        Ok(Duel {
            attacker_id,
            defender_id,
            winner,
        })
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidDuel {
            tick: self.tick,
            killer: self.killer_id,
            victim: self.victim_id,
            reason,
        }
    }
}
