//! Feature groups computed for one aligned kill. Each group produces its own
//! names, so any selection of groups merges without collisions.

use duel_replays::analyzer::AlignedKill;
use duel_replays::{Duel, FrameRecord, PlayerId, PlayerSnapshot, Side};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::aim::aim_alignment_score;
use crate::error::Result;
use crate::extractor::MatchContext;
use crate::record::{FeatureRecord, FeatureValue};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeatureGroup {
    /// Raw per-frame values of both duel participants
    Snapshot,
    /// Per-frame crosshair placement of both participants
    AimAlignment,
    /// Per-frame team health, players alive and equipment value
    TeamAggregates,
    /// Kills and deaths before this round relative to the match average
    RollingPerformance,
}

impl FeatureGroup {
    pub const ALL: [FeatureGroup; 4] = [
        FeatureGroup::Snapshot,
        FeatureGroup::AimAlignment,
        FeatureGroup::TeamAggregates,
        FeatureGroup::RollingPerformance,
    ];

    pub fn extract(
        self,
        ctx: &MatchContext<'_>,
        aligned: &AlignedKill<'_>,
        duel: &Duel,
    ) -> Result<FeatureRecord> {
        match self {
            FeatureGroup::Snapshot => snapshot_features(aligned.window, duel),
            FeatureGroup::AimAlignment => aim_alignment_features(aligned.window, duel),
            FeatureGroup::TeamAggregates => team_aggregate_features(aligned.window),
            FeatureGroup::RollingPerformance => rolling_performance_features(ctx, aligned, duel),
        }
    }
}

type NumericField = fn(&PlayerSnapshot) -> f64;

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

const NUMERIC_FIELDS: &[(&str, NumericField)] = &[
    ("hp", |p| p.hp as f64),
    ("armor", |p| p.armor as f64),
    ("x", |p| p.position.x),
    ("y", |p| p.position.y),
    ("z", |p| p.position.z),
    ("vx", |p| p.velocity.x),
    ("vy", |p| p.velocity.y),
    ("vz", |p| p.velocity.z),
    ("yaw", |p| p.view_yaw),
    ("pitch", |p| p.view_pitch),
    ("is_blinded", |p| flag(p.is_blinded)),
    ("is_airborne", |p| flag(p.is_airborne)),
    ("is_ducking", |p| flag(p.is_ducking)),
    ("is_standing", |p| flag(p.is_standing)),
    ("is_scoped", |p| flag(p.is_scoped)),
    ("is_walking", |p| flag(p.is_walking)),
    ("equipment_value", |p| p.equipment_value as f64),
    ("cash", |p| p.cash as f64),
    ("has_helmet", |p| flag(p.has_helmet)),
];

/// The snapshots of one player across the window, oldest first.
pub fn player_frames(window: &[FrameRecord], player: PlayerId) -> Result<Vec<&PlayerSnapshot>> {
    let frames = window
        .iter()
        .map(|frame| frame.player(player))
        .collect::<duel_replays::Result<Vec<_>>>()?;
    Ok(frames)
}

pub fn snapshot_features(window: &[FrameRecord], duel: &Duel) -> Result<FeatureRecord> {
    let mut record = FeatureRecord::new();
    for (side, id) in [
        (Side::Attacker, duel.attacker_id),
        (Side::Defender, duel.defender_id),
    ] {
        let frames = player_frames(window, id)?;
        let prefix = side.prefix();
        for (name, field) in NUMERIC_FIELDS {
            let values: Vec<f64> = frames.iter().map(|p| field(p)).collect();
            record.insert(format!("{prefix}_{name}"), values)?;
        }
        let items: Vec<String> = frames.iter().map(|p| p.active_item.clone()).collect();
        record.insert(format!("{prefix}_active_item"), items)?;
    }
    Ok(record)
}

pub fn aim_alignment_features(window: &[FrameRecord], duel: &Duel) -> Result<FeatureRecord> {
    let attacker = player_frames(window, duel.attacker_id)?;
    let defender = player_frames(window, duel.defender_id)?;

    let attacker_scores = attacker
        .iter()
        .zip(&defender)
        .map(|(a, d)| aim_alignment_score(a, d))
        .collect::<Vec<_>>();
    let defender_scores = defender
        .iter()
        .zip(&attacker)
        .map(|(d, a)| aim_alignment_score(d, a))
        .collect::<Vec<_>>();

    let mut record = FeatureRecord::new();
    record.insert("attacker_aim_alignment", attacker_scores)?;
    record.insert("defender_aim_alignment", defender_scores)?;
    Ok(record)
}

pub fn team_aggregate_features(window: &[FrameRecord]) -> Result<FeatureRecord> {
    let mut record = FeatureRecord::new();
    for side in Side::BOTH {
        let prefix = side.team_prefix();
        let per_frame = |f: fn(&[PlayerSnapshot]) -> f64| -> FeatureValue {
            window
                .iter()
                .map(|frame| f(frame.team(side).players()))
                .collect::<Vec<_>>()
                .into()
        };
        record.insert(
            format!("{prefix}_hp"),
            per_frame(|players| players.iter().map(|p| p.hp as f64).sum()),
        )?;
        record.insert(
            format!("{prefix}_alive"),
            per_frame(|players| players.iter().filter(|p| p.is_alive()).count() as f64),
        )?;
        record.insert(
            format!("{prefix}_equipment_value"),
            per_frame(|players| players.iter().map(|p| p.equipment_value as f64).sum()),
        )?;
    }
    Ok(record)
}

pub fn rolling_performance_features(
    ctx: &MatchContext<'_>,
    aligned: &AlignedKill<'_>,
    duel: &Duel,
) -> Result<FeatureRecord> {
    let ledger = &ctx.ledger;
    let round = aligned.kill.round_index;
    let tick = aligned.kill.tick;
    let kills_avg = ledger.average_kills_before(round);
    let deaths_avg = ledger.average_deaths_before(round);

    let mut record = FeatureRecord::new();
    for (side, id) in [
        (Side::Attacker, duel.attacker_id),
        (Side::Defender, duel.defender_id),
    ] {
        let prefix = side.prefix();
        let kills = ledger.kills_before(id, round, tick)? as f64;
        let deaths = ledger.deaths_before(id, round, tick)? as f64;
        record.insert(format!("{prefix}_kills_from_avg"), kills - kills_avg)?;
        record.insert(format!("{prefix}_deaths_from_avg"), deaths - deaths_avg)?;
    }
    Ok(record)
}
