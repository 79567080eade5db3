//! Planar geometry primitives for field-coordinate math.
//!
//! All quantities are `f64`, meters and radians, in a right-handed field
//! frame: +X points away from the alliance wall, +Y to the robot's left,
//! and headings are counter-clockwise positive.
//!
//! [`Pose2d::exp`] implements the pose exponential used for odometry
//! integration: a body-frame [`Twist2d`] is applied along a constant-curvature
//! arc rather than a straight line, which keeps dead-reckoning exact for
//! simultaneous translation and rotation.

use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Rotation2d
// ────────────────────────────────────────────────────────────────────────────

/// A heading angle, kept normalized to `(-π, π]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation2d {
    radians: f64,
}

impl Rotation2d {
    /// Create a rotation from radians. The value is normalized.
    pub fn new(radians: f64) -> Self {
        Self {
            radians: normalize_angle(radians),
        }
    }

    /// Create a rotation from degrees.
    pub fn from_degrees(degrees: f64) -> Self {
        Self::new(degrees.to_radians())
    }

    /// The zero rotation.
    pub fn zero() -> Self {
        Self { radians: 0.0 }
    }

    /// Angle in radians, within `(-π, π]`.
    pub fn radians(&self) -> f64 {
        self.radians
    }

    /// Angle in degrees, within `(-180, 180]`.
    pub fn degrees(&self) -> f64 {
        self.radians.to_degrees()
    }

    pub fn sin(&self) -> f64 {
        self.radians.sin()
    }

    pub fn cos(&self) -> f64 {
        self.radians.cos()
    }

    /// Compose this rotation with `other` (angles add, result normalized).
    pub fn rotate_by(&self, other: Rotation2d) -> Rotation2d {
        Rotation2d::new(self.radians + other.radians)
    }

    /// Shortest-path interpolation from `self` toward `other`.
    ///
    /// `t` is clamped to `[0, 1]`; `t = 0` returns `self`, `t = 1` returns
    /// `other`, and intermediate values never take the long way around.
    pub fn interpolate(&self, other: Rotation2d, t: f64) -> Rotation2d {
        let t = t.clamp(0.0, 1.0);
        let delta = (other - *self).radians;
        Rotation2d::new(self.radians + delta * t)
    }
}

impl Add for Rotation2d {
    type Output = Rotation2d;

    fn add(self, rhs: Rotation2d) -> Rotation2d {
        self.rotate_by(rhs)
    }
}

impl Sub for Rotation2d {
    type Output = Rotation2d;

    /// Angular difference, normalized so the result is the shortest signed
    /// error between the two headings.
    fn sub(self, rhs: Rotation2d) -> Rotation2d {
        Rotation2d::new(self.radians - rhs.radians)
    }
}

impl Neg for Rotation2d {
    type Output = Rotation2d;

    fn neg(self) -> Rotation2d {
        Rotation2d::new(-self.radians)
    }
}

/// Normalize an angle in radians to `(-π, π]`.
fn normalize_angle(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(std::f64::consts::TAU);
    if wrapped > std::f64::consts::PI {
        wrapped - std::f64::consts::TAU
    } else {
        wrapped
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Translation2d
// ────────────────────────────────────────────────────────────────────────────

/// A 2-D displacement or position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation2d {
    pub x: f64,
    pub y: f64,
}

impl Translation2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Euclidean length of this translation.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Rotate this vector counter-clockwise by `rotation`.
    pub fn rotate_by(&self, rotation: Rotation2d) -> Translation2d {
        let (sin, cos) = (rotation.sin(), rotation.cos());
        Translation2d::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// The direction of this vector. Zero-length vectors report zero angle.
    pub fn angle(&self) -> Rotation2d {
        if self.norm() < 1e-12 {
            Rotation2d::zero()
        } else {
            Rotation2d::new(self.y.atan2(self.x))
        }
    }

    pub fn distance_to(&self, other: Translation2d) -> f64 {
        (other - *self).norm()
    }

    pub fn scale(&self, scalar: f64) -> Translation2d {
        Translation2d::new(self.x * scalar, self.y * scalar)
    }

    /// Linear interpolation from `self` toward `other`, `t` clamped to `[0, 1]`.
    pub fn interpolate(&self, other: Translation2d, t: f64) -> Translation2d {
        let t = t.clamp(0.0, 1.0);
        Translation2d::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl Add for Translation2d {
    type Output = Translation2d;

    fn add(self, rhs: Translation2d) -> Translation2d {
        Translation2d::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Translation2d {
    type Output = Translation2d;

    fn sub(self, rhs: Translation2d) -> Translation2d {
        Translation2d::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Twist2d
// ────────────────────────────────────────────────────────────────────────────

/// A body-frame displacement over one control period: forward, leftward, and
/// rotational components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist2d {
    pub dx: f64,
    pub dy: f64,
    pub dtheta: f64,
}

impl Twist2d {
    pub fn new(dx: f64, dy: f64, dtheta: f64) -> Self {
        Self { dx, dy, dtheta }
    }

    /// The twist that undoes this one when applied from the far endpoint.
    pub fn inverse(&self) -> Twist2d {
        Twist2d::new(-self.dx, -self.dy, -self.dtheta)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose2d
// ────────────────────────────────────────────────────────────────────────────

/// A field-frame position and heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2d {
    pub translation: Translation2d,
    pub rotation: Rotation2d,
}

impl Pose2d {
    pub fn new(translation: Translation2d, rotation: Rotation2d) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_xy_heading(x: f64, y: f64, heading: Rotation2d) -> Self {
        Self::new(Translation2d::new(x, y), heading)
    }

    pub fn zero() -> Self {
        Self::new(Translation2d::zero(), Rotation2d::zero())
    }

    pub fn x(&self) -> f64 {
        self.translation.x
    }

    pub fn y(&self) -> f64 {
        self.translation.y
    }

    pub fn heading(&self) -> Rotation2d {
        self.rotation
    }

    /// Apply a body-frame [`Twist2d`] to this pose along a constant-curvature
    /// arc (the SE(2) exponential map).
    ///
    /// Small rotations use the second-order Taylor expansion of
    /// `sin θ / θ` and `(1 − cos θ) / θ` to avoid division by near-zero.
    pub fn exp(&self, twist: Twist2d) -> Pose2d {
        let dtheta = twist.dtheta;
        let (s, c) = if dtheta.abs() < 1e-9 {
            (1.0 - dtheta * dtheta / 6.0, dtheta / 2.0)
        } else {
            (dtheta.sin() / dtheta, (1.0 - dtheta.cos()) / dtheta)
        };

        let body_delta = Translation2d::new(twist.dx * s - twist.dy * c, twist.dx * c + twist.dy * s);
        let field_delta = body_delta.rotate_by(self.rotation);

        Pose2d::new(
            self.translation + field_delta,
            self.rotation.rotate_by(Rotation2d::new(dtheta)),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ChassisSpeeds
// ────────────────────────────────────────────────────────────────────────────

/// A robot-frame velocity command: forward, leftward, and rotational.
/// Produced fresh every control cycle and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    /// Forward velocity, m/s.
    pub vx: f64,
    /// Leftward velocity, m/s.
    pub vy: f64,
    /// Counter-clockwise rotational velocity, rad/s.
    pub omega: f64,
}

impl ChassisSpeeds {
    pub fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Convert a field-frame velocity intent into the robot frame using the
    /// robot's current estimated `heading`.
    pub fn from_field_relative(vx: f64, vy: f64, omega: f64, heading: Rotation2d) -> Self {
        let body = Translation2d::new(vx, vy).rotate_by(-heading);
        Self::new(body.x, body.y, omega)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Module state / position
// ────────────────────────────────────────────────────────────────────────────

/// A desired or measured per-wheel state: drive speed plus steer angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleState {
    pub speed_mps: f64,
    pub angle: Rotation2d,
}

impl ModuleState {
    pub fn new(speed_mps: f64, angle: Rotation2d) -> Self {
        Self { speed_mps, angle }
    }

    pub fn zero() -> Self {
        Self::new(0.0, Rotation2d::zero())
    }

    /// Minimize steer travel: if reaching `self.angle` from `current` would
    /// require turning more than 90°, flip the target by 180° and negate the
    /// drive speed. Net wheel motion is identical; steer travel is not.
    pub fn optimize(&self, current: Rotation2d) -> ModuleState {
        let error = (self.angle - current).radians();
        if error.abs() > std::f64::consts::FRAC_PI_2 {
            ModuleState::new(
                -self.speed_mps,
                self.angle.rotate_by(Rotation2d::new(std::f64::consts::PI)),
            )
        } else {
            *self
        }
    }
}

/// Accumulated per-wheel odometry: total drive distance plus steer angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModulePosition {
    pub distance_m: f64,
    pub angle: Rotation2d,
}

impl ModulePosition {
    pub fn new(distance_m: f64, angle: Rotation2d) -> Self {
        Self { distance_m, angle }
    }

    pub fn zero() -> Self {
        Self::new(0.0, Rotation2d::zero())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn rotation_is_normalized() {
        let r = Rotation2d::new(3.0 * PI);
        assert!((r.radians() - PI).abs() < 1e-12);

        let r = Rotation2d::from_degrees(-270.0);
        assert!((r.degrees() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_difference_takes_shortest_path() {
        let a = Rotation2d::from_degrees(170.0);
        let b = Rotation2d::from_degrees(-170.0);
        // Crossing the ±180° seam: the signed error is 20°, not 340°.
        assert!(((b - a).degrees() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn translation_rotate_by_quarter_turn() {
        let t = Translation2d::new(1.0, 0.0).rotate_by(Rotation2d::new(FRAC_PI_2));
        assert!(t.x.abs() < 1e-12);
        assert!((t.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pose_exp_straight_line() {
        let pose = Pose2d::zero().exp(Twist2d::new(2.0, 0.0, 0.0));
        assert!((pose.x() - 2.0).abs() < 1e-12);
        assert!(pose.y().abs() < 1e-12);
        assert!(pose.heading().radians().abs() < 1e-12);
    }

    #[test]
    fn pose_exp_quarter_arc() {
        // Drive forward while rotating 90°: the chassis traces a quarter
        // circle of radius 2/ (π/2) ending at (r, r).
        let pose = Pose2d::zero().exp(Twist2d::new(2.0, 0.0, FRAC_PI_2));
        let radius = 2.0 / FRAC_PI_2;
        assert!((pose.x() - radius).abs() < 1e-9);
        assert!((pose.y() - radius).abs() < 1e-9);
        assert!((pose.heading().radians() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn field_relative_conversion_uses_heading() {
        // Robot facing +Y: a field-frame +X command becomes robot-frame -Y.
        let speeds =
            ChassisSpeeds::from_field_relative(1.0, 0.0, 0.0, Rotation2d::new(FRAC_PI_2));
        assert!(speeds.vx.abs() < 1e-12);
        assert!((speeds.vy + 1.0).abs() < 1e-12);
    }

    #[test]
    fn optimize_flips_target_beyond_quarter_turn() {
        let desired = ModuleState::new(1.0, Rotation2d::from_degrees(170.0));
        let optimized = desired.optimize(Rotation2d::from_degrees(0.0));
        assert!((optimized.speed_mps + 1.0).abs() < 1e-12);
        assert!((optimized.angle.degrees() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn optimize_keeps_target_within_quarter_turn() {
        let desired = ModuleState::new(1.0, Rotation2d::from_degrees(45.0));
        let optimized = desired.optimize(Rotation2d::from_degrees(0.0));
        assert_eq!(optimized, desired);
    }

    #[test]
    fn optimize_preserves_net_wheel_motion() {
        // speed * unit(angle) must match before and after optimization.
        let desired = ModuleState::new(2.0, Rotation2d::from_degrees(135.0));
        let optimized = desired.optimize(Rotation2d::from_degrees(-90.0));

        let before = Translation2d::new(desired.angle.cos(), desired.angle.sin())
            .scale(desired.speed_mps);
        let after = Translation2d::new(optimized.angle.cos(), optimized.angle.sin())
            .scale(optimized.speed_mps);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn interpolate_rotation_shortest_path() {
        let a = Rotation2d::from_degrees(170.0);
        let b = Rotation2d::from_degrees(-170.0);
        let mid = a.interpolate(b, 0.5);
        assert!((mid.degrees().abs() - 180.0).abs() < 1e-9);
    }
}
