//! Swerve module contract: one drive motor + one steer motor per wheel.

use swervos_types::Rotation2d;

/// Input snapshot refreshed once per control period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwerveModuleInputs {
    /// Accumulated drive distance, meters.
    pub drive_position_m: f64,
    /// Drive wheel surface speed, m/s.
    pub drive_velocity_mps: f64,
    /// Absolute steer angle.
    pub turn_angle: Rotation2d,
    pub drive_current_a: f64,
    pub turn_current_a: f64,
    /// Hottest of the module's two motors, °C.
    pub temperature_c: f64,
    /// `false` while either motor controller is unreachable.
    pub connected: bool,
}

impl Default for SwerveModuleInputs {
    fn default() -> Self {
        Self {
            drive_position_m: 0.0,
            drive_velocity_mps: 0.0,
            turn_angle: Rotation2d::zero(),
            drive_current_a: 0.0,
            turn_current_a: 0.0,
            temperature_c: 0.0,
            connected: false,
        }
    }
}

/// One independently steered wheel.
pub trait SwerveModuleIo: Send {
    /// Apply an open-loop drive voltage. Closed-loop velocity control is the
    /// module controller's job, not the backend's.
    fn set_drive_voltage(&mut self, volts: f64);

    /// Apply an open-loop steer voltage.
    fn set_turn_voltage(&mut self, volts: f64);

    /// Refresh `inputs` from the device. Must never block.
    fn update_inputs(&mut self, inputs: &mut SwerveModuleInputs);

    /// The motor temperature at which this module must stop, °C.
    /// Replay backends report `f64::INFINITY` so interlocks never trip on
    /// recorded data.
    fn max_safe_temperature_c(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockModule {
        drive_volts: f64,
        turn_volts: f64,
    }

    impl SwerveModuleIo for MockModule {
        fn set_drive_voltage(&mut self, volts: f64) {
            self.drive_volts = volts;
        }

        fn set_turn_voltage(&mut self, volts: f64) {
            self.turn_volts = volts;
        }

        fn update_inputs(&mut self, inputs: &mut SwerveModuleInputs) {
            inputs.connected = true;
            inputs.temperature_c = 25.0;
        }

        fn max_safe_temperature_c(&self) -> f64 {
            90.0
        }
    }

    #[test]
    fn mock_module_records_commands() {
        let mut module = MockModule {
            drive_volts: 0.0,
            turn_volts: 0.0,
        };
        module.set_drive_voltage(6.0);
        module.set_turn_voltage(-2.0);
        assert!((module.drive_volts - 6.0).abs() < f64::EPSILON);
        assert!((module.turn_volts + 2.0).abs() < f64::EPSILON);

        let mut inputs = SwerveModuleInputs::default();
        module.update_inputs(&mut inputs);
        assert!(inputs.connected);
        assert!(inputs.temperature_c < module.max_safe_temperature_c());
    }
}
