//! Crosshair placement: how closely a player's view points at an opponent.

use duel_replays::{PlayerSnapshot, Vector3};

/// Unit look direction for view angles in degrees. Pitch is measured up from
/// the horizontal plane, yaw counter-clockwise from +x.
pub fn look_direction(yaw_degrees: f64, pitch_degrees: f64) -> Vector3 {
    let yaw = yaw_degrees.to_radians();
    let pitch = pitch_degrees.to_radians();
    let cos_pitch = pitch.cos();
    Vector3::new(yaw.cos() * cos_pitch, yaw.sin() * cos_pitch, pitch.sin())
}

/// Cosine similarity between the look direction and the direction from
/// `looker` to `target`: 1 when aimed straight at the target's origin, -1
/// when aimed directly away.
///
/// Returns NaN when both positions coincide.
pub fn aim_alignment(
    looker: Vector3,
    yaw_degrees: f64,
    pitch_degrees: f64,
    target: Vector3,
) -> f64 {
    look_direction(yaw_degrees, pitch_degrees).cosine_similarity(target - looker)
}

/// [`aim_alignment`] of `looker` toward `target` at the same frame.
pub fn aim_alignment_score(looker: &PlayerSnapshot, target: &PlayerSnapshot) -> f64 {
    aim_alignment(
        looker.position,
        looker.view_yaw,
        looker.view_pitch,
        target.position,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_replays::{PlayerId, PlayerSnapshotBuilder};
    use proptest::prelude::*;

    fn player(position: (f64, f64, f64), yaw: f64, pitch: f64) -> PlayerSnapshot {
        PlayerSnapshotBuilder::default()
            .id(PlayerId(1))
            .position(Vector3::new(position.0, position.1, position.2))
            .view_yaw(yaw)
            .view_pitch(pitch)
            .build()
            .unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    fn score_toward(looker: &PlayerSnapshot, at: (f64, f64, f64)) -> f64 {
        aim_alignment_score(looker, &player(at, 0.0, 0.0))
    }

    #[test]
    fn looking_up() {
        let looker = player((0.0, 0.0, 0.0), 0.0, 90.0);
        assert!(close(score_toward(&looker, (0.0, 0.0, 100.0)), 1.0));
        assert!(close(score_toward(&looker, (0.0, 0.0, -100.0)), -1.0));
        assert!(close(score_toward(&looker, (0.0, 100.0, 0.0)), 0.0));
        assert!(close(score_toward(&looker, (100.0, 0.0, 0.0)), 0.0));
    }

    #[test]
    fn looking_along_the_floor() {
        let looker = player((0.0, 0.0, 0.0), 90.0, 0.0);
        assert!(close(score_toward(&looker, (0.0, 250.0, 0.0)), 1.0));
        assert!(close(score_toward(&looker, (0.0, -250.0, 0.0)), -1.0));
    }

    #[test]
    fn recorded_kills_score_high() {
        let looker = player(
            (1350.0888671875, 1765.399658203125, -226.13888549804688),
            200.599365234375,
            0.384521484375,
        );
        let target = player(
            (552.7427368164062, 1457.29638671875, -226.29098510742188),
            20.0775146484375,
            0.0604248046875,
        );
        assert!(aim_alignment_score(&looker, &target) >= 0.99);

        let looker = player(
            (-472.1568298339844, -1050.7161865234375, -351.96875),
            310.792236328125,
            0.4669189453125,
        );
        let target = player(
            (-56.47972106933594, -1550.7244873046875, -355.7255859375),
            130.80322265625,
            359.912109375,
        );
        assert!(aim_alignment_score(&looker, &target) >= 0.99);
    }

    #[test]
    fn coincident_positions_are_undefined() {
        let a = player((5.0, 5.0, 5.0), 0.0, 0.0);
        assert!(aim_alignment_score(&a, &a).is_nan());
    }

    #[test]
    fn look_direction_is_unit_length() {
        for (yaw, pitch) in [(0.0, 0.0), (45.0, 30.0), (359.0, 271.0), (123.0, 89.9)] {
            assert!(close(look_direction(yaw, pitch).magnitude(), 1.0));
        }
    }

    proptest! {
        #[test]
        fn score_is_bounded(
            looker in prop::array::uniform3(-4000.0f64..4000.0),
            target in prop::array::uniform3(-4000.0f64..4000.0),
            yaw in 0.0f64..360.0,
            pitch in 0.0f64..360.0,
        ) {
            let looker = Vector3::new(looker[0], looker[1], looker[2]);
            let target = Vector3::new(target[0], target[1], target[2]);
            prop_assume!(looker.distance(target) > 1e-6);
            let score = aim_alignment(looker, yaw, pitch, target);
            prop_assert!((-1.0..=1.0).contains(&score));
        }
    }
}
