use serde::{Deserialize, Serialize};
use std::fmt;

/// A persistent player identifier (the platform account id carried in match records).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl PlayerId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PlayerId {
    fn from(v: u64) -> Self {
        PlayerId(v)
    }
}

/// A server tick number. Ticks increase monotonically over a match.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tick(pub i64);

impl Tick {
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {}", self.0)
    }
}

impl From<i64> for Tick {
    fn from(v: i64) -> Self {
        Tick(v)
    }
}

impl std::ops::Sub for Tick {
    type Output = i64;
    fn sub(self, rhs: Tick) -> i64 {
        self.0 - rhs.0
    }
}

impl std::ops::Sub<i64> for Tick {
    type Output = Tick;
    fn sub(self, rhs: i64) -> Tick {
        Tick(self.0 - rhs)
    }
}

impl std::ops::Add<i64> for Tick {
    type Output = Tick;
    fn add(self, rhs: i64) -> Tick {
        Tick(self.0 + rhs)
    }
}

/// World-space vector used for positions, velocities and look directions.
/// Every operation returns a new value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. The zero vector normalizes to NaN components.
    pub fn normalize(self) -> Vector3 {
        self / self.magnitude()
    }

    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cosine of the angle between the two vectors, in [-1, 1].
    ///
    /// Undefined (NaN) when either vector has zero length.
    pub fn cosine_similarity(self, other: Vector3) -> f64 {
        let denom = self.magnitude() * other.magnitude();
        if denom == 0.0 {
            return f64::NAN;
        }
        // rounding can push |cos| a hair past 1 for parallel vectors
        (self.dot(other) / denom).clamp(-1.0, 1.0)
    }

    pub fn distance(self, other: Vector3) -> f64 {
        (other - self).magnitude()
    }
}

impl std::ops::Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::ops::Div<f64> for Vector3 {
    type Output = Vector3;
    fn div(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl std::ops::Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn magnitude() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(1.0, -5.0, 3.0);
        assert!(close(a.magnitude(), 14f64.sqrt()));
        assert!(close(b.magnitude(), 35f64.sqrt()));
    }

    #[test]
    fn normalize_keeps_direction() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let n = v.normalize();
        assert!(close(n.magnitude(), 1.0));
        assert!(close(n.cosine_similarity(v), 1.0));
    }

    #[test]
    fn dot() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(5.0, -5.0, 4.0);
        assert!(close(a.dot(b), 7.0));
    }

    #[test]
    fn cosine_similarity() {
        let ones = Vector3::new(1.0, 1.0, 1.0);
        assert!(close(ones.cosine_similarity(-ones), -1.0));
        assert!(close(ones.cosine_similarity(ones * 4.0), 1.0));

        let v = Vector3::new(1.0, 2.0, 3.0);
        assert!(close(v.cosine_similarity(v * 2.0), 1.0));

        let up = Vector3::new(0.0, 0.0, 1.0);
        let north = Vector3::new(0.0, 1.0, 0.0);
        assert!(close(up.cosine_similarity(north), 0.0));
    }

    #[test]
    fn cosine_similarity_of_zero_vector_is_nan() {
        let east = Vector3::new(1.0, 0.0, 0.0);
        assert!(Vector3::ZERO.cosine_similarity(east).is_nan());
    }

    #[test]
    fn distance() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert!(close(Vector3::ZERO.distance(v), 14f64.sqrt()));
    }

    #[test]
    fn tick_arithmetic() {
        assert_eq!(Tick(70) - Tick(64), 6);
        assert_eq!(Tick(70) - 6, Tick(64));
        assert_eq!(Tick(64) + 6, Tick(70));
    }
}
