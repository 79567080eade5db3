//! Gyroscope contract.

use swervos_types::Rotation2d;

/// Input snapshot refreshed once per control period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroInputs {
    /// Accumulated yaw, CCW positive.
    pub yaw: Rotation2d,
    /// Yaw rate, rad/s.
    pub yaw_velocity_rad_per_s: f64,
    /// `false` while the IMU is unreachable; callers hold last known yaw.
    pub connected: bool,
}

impl Default for GyroInputs {
    fn default() -> Self {
        Self {
            yaw: Rotation2d::zero(),
            yaw_velocity_rad_per_s: 0.0,
            connected: false,
        }
    }
}

/// A yaw gyroscope.
///
/// The real backend reads a physical IMU over a bus; the simulation backend
/// integrates commanded angular velocity; the replay backend is inert and
/// only reflects values written by the log loader.
pub trait GyroIo: Send {
    /// Refresh `inputs` from the device. Must never block.
    fn update_inputs(&mut self, inputs: &mut GyroInputs);

    /// Re-zero the accumulated yaw to the given heading.
    fn set_yaw(&mut self, yaw: Rotation2d);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockGyro {
        yaw: Rotation2d,
    }

    impl GyroIo for MockGyro {
        fn update_inputs(&mut self, inputs: &mut GyroInputs) {
            inputs.yaw = self.yaw;
            inputs.yaw_velocity_rad_per_s = 0.0;
            inputs.connected = true;
        }

        fn set_yaw(&mut self, yaw: Rotation2d) {
            self.yaw = yaw;
        }
    }

    #[test]
    fn mock_gyro_reports_and_rezeros() {
        let mut gyro = MockGyro {
            yaw: Rotation2d::from_degrees(90.0),
        };
        let mut inputs = GyroInputs::default();
        assert!(!inputs.connected);

        gyro.update_inputs(&mut inputs);
        assert!(inputs.connected);
        assert!((inputs.yaw.degrees() - 90.0).abs() < 1e-9);

        gyro.set_yaw(Rotation2d::zero());
        gyro.update_inputs(&mut inputs);
        assert!(inputs.yaw.radians().abs() < 1e-12);
    }
}
