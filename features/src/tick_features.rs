//! Flattens tick-stream duel samples into feature records.

use duel_replays::Side;
use duel_replays::analyzer::{DuelSample, TickRow};

use crate::aim::aim_alignment;
use crate::error::Result;
use crate::record::{Extraction, FeatureRecord};

type RowField = fn(&TickRow) -> f64;

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

const ROW_FIELDS: &[(&str, RowField)] = &[
    ("x", |r| r.x),
    ("y", |r| r.y),
    ("z", |r| r.z),
    ("pitch", |r| r.pitch),
    ("yaw", |r| r.yaw),
    ("velocity", |r| r.velocity),
    ("health", |r| r.health as f64),
    ("armor", |r| r.armor as f64),
    ("has_helmet", |r| flag(r.has_helmet)),
    ("equipment_value", |r| r.equipment_value as f64),
    ("balance", |r| r.balance as f64),
    ("flash_duration", |r| r.flash_duration),
    ("duck_amount", |r| r.duck_amount),
    ("is_airborne", |r| flag(r.is_airborne)),
    ("is_scoped", |r| flag(r.is_scoped)),
    ("is_walking", |r| flag(r.is_walking)),
    ("is_defusing", |r| flag(r.is_defusing)),
];

/// Aim alignment of `looker` toward `target` for one tick. Demo pitch grows
/// when looking down.
pub fn tick_aim_alignment(looker: &TickRow, target: &TickRow) -> f64 {
    aim_alignment(
        looker.position(),
        looker.yaw,
        -looker.pitch,
        target.position(),
    )
}

fn column(rows: &[TickRow], field: RowField) -> Vec<f64> {
    rows.iter().map(field).collect()
}

/// Per-row features of one duel sample, oldest row first.
pub fn extract_duel_sample(sample: &DuelSample, last_row_only: bool) -> Result<FeatureRecord> {
    let mut record = FeatureRecord::new();

    for side in Side::BOTH {
        let prefix = side.prefix();
        let rows = sample.rows(side);
        for (name, field) in ROW_FIELDS {
            record.insert(format!("{prefix}_{name}"), column(rows, *field))?;
        }
    }

    let attacker = sample.rows(Side::Attacker);
    let defender = sample.rows(Side::Defender);

    // identical for every player of the tick
    record.insert(
        "is_bomb_planted",
        column(attacker, |r| flag(r.is_bomb_planted)),
    )?;
    record.insert(
        "attacker_losing_streak",
        column(attacker, |r| r.t_losing_streak as f64),
    )?;
    record.insert(
        "defender_losing_streak",
        column(defender, |r| r.ct_losing_streak as f64),
    )?;

    let attacker_aim: Vec<f64> = attacker
        .iter()
        .zip(defender)
        .map(|(a, d)| tick_aim_alignment(a, d))
        .collect();
    let defender_aim: Vec<f64> = defender
        .iter()
        .zip(attacker)
        .map(|(d, a)| tick_aim_alignment(d, a))
        .collect();
    record.insert("attacker_aim_alignment", attacker_aim)?;
    record.insert("defender_aim_alignment", defender_aim)?;

    Ok(if last_row_only {
        record.collapse_to_last()
    } else {
        record
    })
}

/// Features and labels for a list of duel samples, in sample order.
pub fn extract_tick_samples<'a>(
    samples: impl IntoIterator<Item = &'a DuelSample>,
    last_row_only: bool,
) -> Result<Extraction> {
    let mut out = Extraction::default();
    for sample in samples {
        out.push(extract_duel_sample(sample, last_row_only)?, sample.label);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FeatureValue;
    use duel_replays::{PlayerId, Tick};

    fn row(tick: i64, player: u64, x: f64, yaw: f64) -> TickRow {
        TickRow {
            tick: Tick(tick),
            player_id: PlayerId(player),
            team_num: if player == 1 { 2 } else { 3 },
            x,
            yaw,
            health: 100 - tick,
            is_bomb_planted: tick >= 2,
            t_losing_streak: 3,
            ct_losing_streak: 1,
            ..Default::default()
        }
    }

    fn sample() -> DuelSample {
        DuelSample {
            tick: Tick(10),
            map_name: "de_dust2".to_string(),
            attacker_id: PlayerId(1),
            defender_id: PlayerId(2),
            attacker_rows: (0..3).map(|t| row(t, 1, 0.0, 0.0)).collect(),
            defender_rows: (0..3).map(|t| row(t, 2, 500.0, 90.0)).collect(),
            label: Side::Defender,
        }
    }

    fn seq(record: &FeatureRecord, name: &str) -> Vec<f64> {
        record
            .get(name)
            .and_then(|v| v.sequence_ref())
            .cloned()
            .unwrap_or_else(|| panic!("{name} is not a sequence"))
    }

    #[test]
    fn rows_become_sequences() {
        let record = extract_duel_sample(&sample(), false).unwrap();
        assert_eq!(seq(&record, "attacker_health"), vec![100.0, 99.0, 98.0]);
        assert_eq!(seq(&record, "defender_x"), vec![500.0; 3]);
        assert_eq!(seq(&record, "is_bomb_planted"), vec![0.0, 0.0, 1.0]);
        assert_eq!(seq(&record, "attacker_losing_streak"), vec![3.0; 3]);
        assert_eq!(seq(&record, "defender_losing_streak"), vec![1.0; 3]);
        assert!(record.iter().all(|(_, value)| value.frames() == 3));
    }

    #[test]
    fn aim_uses_both_players() {
        let record = extract_duel_sample(&sample(), false).unwrap();
        // attacker at the origin looks along +x straight at the defender
        let attacker_aim = seq(&record, "attacker_aim_alignment");
        assert!(attacker_aim.iter().all(|s| (s - 1.0).abs() < 1e-9));
        // defender looks along +y, perpendicular to the attacker
        let defender_aim = seq(&record, "defender_aim_alignment");
        assert!(defender_aim.iter().all(|s| s.abs() < 1e-9));
    }

    #[test]
    fn looking_down_is_negative_pitch() {
        let looker = TickRow {
            pitch: 45.0,
            ..row(0, 1, 0.0, 0.0)
        };
        let below = TickRow {
            z: -100.0,
            ..row(0, 2, 100.0, 0.0)
        };
        assert!((tick_aim_alignment(&looker, &below) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn last_row_only_keeps_final_tick() {
        let record = extract_duel_sample(&sample(), true).unwrap();
        let health = record.get("attacker_health");
        assert_eq!(health, Some(&FeatureValue::Scalar(98.0)));
        let planted = record.get("is_bomb_planted");
        assert_eq!(planted, Some(&FeatureValue::Scalar(1.0)));
    }

    #[test]
    fn labels_follow_samples() {
        let mut second = sample();
        second.label = Side::Attacker;
        let samples = vec![sample(), second];
        let out = extract_tick_samples(&samples, true).unwrap();
        assert_eq!(out.labels, vec![Side::Defender, Side::Attacker]);
        assert_eq!(out.features.len(), 2);
    }
}
