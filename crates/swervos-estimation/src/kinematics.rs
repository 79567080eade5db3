//! Swerve drive kinematics.
//!
//! Forward: decompose a chassis velocity into four per-wheel (speed, angle)
//! states using each module's fixed offset from robot center. Inverse: fit a
//! body-frame twist to four measured wheel displacement vectors. The module
//! offsets are construction-time constants; the chassis geometry never
//! changes at runtime.

use swervos_types::{ChassisSpeeds, ModulePosition, ModuleState, Rotation2d, Translation2d, Twist2d};

/// Wheel speeds below this are treated as "at rest": the steer angle holds
/// its previous value instead of snapping to zero, avoiding wheel chatter.
const SPEED_DEADBAND_MPS: f64 = 1e-6;

/// Kinematic model of a four-module swerve chassis.
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    /// Module offsets from robot center, meters, in canonical wheel order.
    offsets: [Translation2d; 4],
    /// Last non-rest steer angles, reused for near-zero speed commands.
    prev_angles: [Rotation2d; 4],
}

impl SwerveKinematics {
    /// Build the model from the four module offsets (canonical wheel order:
    /// front-left, front-right, back-left, back-right).
    pub fn new(offsets: [Translation2d; 4]) -> Self {
        Self {
            offsets,
            prev_angles: [Rotation2d::zero(); 4],
        }
    }

    /// Forward kinematics: chassis velocity → four module states.
    ///
    /// Each wheel's velocity is the chassis translation plus the rotational
    /// contribution `ω × r`. Wheels commanded below the rest deadband keep
    /// their previous steer angle.
    pub fn to_module_states(&mut self, speeds: ChassisSpeeds) -> [ModuleState; 4] {
        let mut states = [ModuleState::zero(); 4];
        for (i, offset) in self.offsets.iter().enumerate() {
            let vx = speeds.vx - speeds.omega * offset.y;
            let vy = speeds.vy + speeds.omega * offset.x;
            let speed = vx.hypot(vy);

            let angle = if speed < SPEED_DEADBAND_MPS {
                self.prev_angles[i]
            } else {
                let a = Rotation2d::new(vy.atan2(vx));
                self.prev_angles[i] = a;
                a
            };
            states[i] = ModuleState::new(speed, angle);
        }
        states
    }

    /// Inverse kinematics: per-wheel odometry deltas → body-frame twist.
    ///
    /// Least-squares fit of the forward model. With module offsets symmetric
    /// about robot center (Σr = 0, true for this chassis) the normal
    /// equations decouple into the closed form below.
    pub fn to_twist(&self, deltas: &[ModulePosition; 4]) -> Twist2d {
        let mut sum_dx = 0.0;
        let mut sum_dy = 0.0;
        let mut cross = 0.0;
        let mut r_sq = 0.0;

        for (delta, offset) in deltas.iter().zip(self.offsets.iter()) {
            let dix = delta.distance_m * delta.angle.cos();
            let diy = delta.distance_m * delta.angle.sin();
            sum_dx += dix;
            sum_dy += diy;
            cross += offset.x * diy - offset.y * dix;
            r_sq += offset.x * offset.x + offset.y * offset.y;
        }

        let n = deltas.len() as f64;
        let dtheta = if r_sq > 0.0 { cross / r_sq } else { 0.0 };
        Twist2d::new(sum_dx / n, sum_dy / n, dtheta)
    }

    /// Uniformly scale all module speeds so none exceeds `max_speed_mps`.
    ///
    /// Scaling is shape-preserving: the ratio between module speeds, and
    /// therefore the chassis path, is unchanged.
    pub fn desaturate(states: &mut [ModuleState; 4], max_speed_mps: f64) {
        let highest = states
            .iter()
            .map(|s| s.speed_mps.abs())
            .fold(0.0_f64, f64::max);
        if highest > max_speed_mps && highest > 0.0 {
            let scale = max_speed_mps / highest;
            for state in states.iter_mut() {
                state.speed_mps *= scale;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn square_chassis(half: f64) -> SwerveKinematics {
        SwerveKinematics::new([
            Translation2d::new(half, half),   // front-left
            Translation2d::new(half, -half),  // front-right
            Translation2d::new(-half, half),  // back-left
            Translation2d::new(-half, -half), // back-right
        ])
    }

    #[test]
    fn pure_translation_drives_all_wheels_identically() {
        let mut kin = square_chassis(0.3);
        let states = kin.to_module_states(ChassisSpeeds::new(2.0, 0.0, 0.0));
        for state in &states {
            assert!((state.speed_mps - 2.0).abs() < 1e-12);
            assert!(state.angle.radians().abs() < 1e-12);
        }
    }

    #[test]
    fn pure_rotation_points_wheels_tangentially() {
        let mut kin = square_chassis(0.3);
        let states = kin.to_module_states(ChassisSpeeds::new(0.0, 0.0, 1.0));
        let radius = (0.3_f64.powi(2) + 0.3_f64.powi(2)).sqrt();
        for state in &states {
            assert!((state.speed_mps - radius).abs() < 1e-12);
        }
        // Front-left wheel at (+x, +y): tangent of CCW rotation points
        // toward (-y, +x) → angle = atan2(0.3, -0.3) = 135°.
        assert!((states[0].angle.degrees() - 135.0).abs() < 1e-9);
    }

    #[test]
    fn near_zero_speed_holds_previous_angle() {
        let mut kin = square_chassis(0.3);
        let moving = kin.to_module_states(ChassisSpeeds::new(0.0, 1.0, 0.0));
        assert!((moving[0].angle.degrees() - 90.0).abs() < 1e-9);

        let at_rest = kin.to_module_states(ChassisSpeeds::zero());
        for state in &at_rest {
            assert!(state.speed_mps.abs() < 1e-12);
            assert!((state.angle.degrees() - 90.0).abs() < 1e-9);
        }
    }

    #[test]
    fn desaturation_caps_speeds_and_preserves_ratios() {
        let mut kin = square_chassis(0.3);
        // Fast translation + spin: outer wheels exceed the 4.5 m/s envelope.
        let mut states = kin.to_module_states(ChassisSpeeds::new(4.0, 0.0, 6.0));
        let unsaturated = states;

        SwerveKinematics::desaturate(&mut states, 4.5);

        let highest = states.iter().map(|s| s.speed_mps.abs()).fold(0.0, f64::max);
        assert!(highest <= 4.5 + 1e-12);

        // Shape preservation: pairwise ratios match the kinematic solution.
        let reference = unsaturated[0].speed_mps / states[0].speed_mps;
        for (before, after) in unsaturated.iter().zip(states.iter()) {
            assert!((before.speed_mps / after.speed_mps - reference).abs() < 1e-9);
            assert_eq!(before.angle, after.angle);
        }
    }

    #[test]
    fn desaturation_leaves_in_envelope_commands_untouched() {
        let mut states = [
            ModuleState::new(1.0, Rotation2d::zero()),
            ModuleState::new(2.0, Rotation2d::zero()),
            ModuleState::new(1.5, Rotation2d::zero()),
            ModuleState::new(0.5, Rotation2d::zero()),
        ];
        let before = states;
        SwerveKinematics::desaturate(&mut states, 4.5);
        assert_eq!(before, states);
    }

    #[test]
    fn inverse_recovers_pure_rotation() {
        let kin = square_chassis(0.3);
        let radius = (2.0_f64 * 0.3 * 0.3).sqrt();
        // Each wheel travels along its rotation tangent for 0.1 rad of spin.
        let deltas = [
            ModulePosition::new(0.1 * radius, Rotation2d::from_degrees(135.0)),
            ModulePosition::new(0.1 * radius, Rotation2d::from_degrees(45.0)),
            ModulePosition::new(0.1 * radius, Rotation2d::from_degrees(-135.0)),
            ModulePosition::new(0.1 * radius, Rotation2d::from_degrees(-45.0)),
        ];
        let twist = kin.to_twist(&deltas);
        assert!(twist.dx.abs() < 1e-9);
        assert!(twist.dy.abs() < 1e-9);
        assert!((twist.dtheta - 0.1).abs() < 1e-9);
    }

    #[test]
    fn inverse_recovers_pure_translation() {
        let kin = square_chassis(0.3);
        let deltas = [ModulePosition::new(0.5, Rotation2d::new(FRAC_PI_2)); 4];
        let twist = kin.to_twist(&deltas);
        assert!(twist.dx.abs() < 1e-9);
        assert!((twist.dy - 0.5).abs() < 1e-9);
        assert!(twist.dtheta.abs() < 1e-9);
    }

    #[test]
    fn forward_then_inverse_round_trips() {
        let mut kin = square_chassis(0.3);
        let speeds = ChassisSpeeds::new(1.2, -0.4, 0.8);
        let states = kin.to_module_states(speeds);

        // Convert one 20 ms step of module motion back into a twist.
        let dt = 0.02;
        let deltas = [
            ModulePosition::new(states[0].speed_mps * dt, states[0].angle),
            ModulePosition::new(states[1].speed_mps * dt, states[1].angle),
            ModulePosition::new(states[2].speed_mps * dt, states[2].angle),
            ModulePosition::new(states[3].speed_mps * dt, states[3].angle),
        ];
        let twist = kin.to_twist(&deltas);
        assert!((twist.dx - speeds.vx * dt).abs() < 1e-9);
        assert!((twist.dy - speeds.vy * dt).abs() < 1e-9);
        assert!((twist.dtheta - speeds.omega * dt).abs() < 1e-9);
    }
}
