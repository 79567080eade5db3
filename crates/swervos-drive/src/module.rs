//! Per-wheel module controller.
//!
//! Owns one [`SwerveModuleIo`] backend and closes the steering loop around
//! it: a desired (speed, angle) state comes in once per control period, the
//! controller optimizes it against the measured steer angle, servos the
//! steer motor with a continuous-input PID, and feeds the drive motor a
//! velocity feedforward plus proportional correction. All voltages leave
//! through the backend; the controller itself never touches hardware.

use swervos_hal::pid::PidController;
use swervos_hal::{SwerveModuleInputs, SwerveModuleIo};
use swervos_types::{ModulePosition, ModuleState, Rotation2d, TemperatureReading, WheelModuleIndex};

/// Below this commanded speed the wheel is treated as at rest: zero drive
/// output and the steer angle holds, so joystick release never snaps the
/// wheels back to zero.
const REST_SPEED_MPS: f64 = 1e-3;

/// Closed-loop gains and limits for one module.
#[derive(Debug, Clone, Copy)]
pub struct ModuleGains {
    pub turn_kp: f64,
    pub turn_kd: f64,
    /// Drive feedforward, volts per m/s of wheel speed.
    pub drive_kv_v_per_mps: f64,
    /// Drive proportional gain on velocity error, volts per m/s.
    pub drive_kp_v_per_mps: f64,
    /// Voltage envelope for both motors.
    pub max_output_v: f64,
}

impl Default for ModuleGains {
    fn default() -> Self {
        Self {
            turn_kp: 8.0,
            turn_kd: 0.0,
            drive_kv_v_per_mps: 12.0 / 4.5,
            drive_kp_v_per_mps: 0.5,
            max_output_v: 12.0,
        }
    }
}

/// One independently steered wheel and its control loops.
pub struct SwerveModule {
    index: WheelModuleIndex,
    io: Box<dyn SwerveModuleIo>,
    inputs: SwerveModuleInputs,
    turn_pid: PidController,
    gains: ModuleGains,
    last_angle_setpoint: Rotation2d,
}

impl SwerveModule {
    pub fn new(index: WheelModuleIndex, io: Box<dyn SwerveModuleIo>, gains: ModuleGains) -> Self {
        let mut turn_pid = PidController::new(gains.turn_kp, 0.0, gains.turn_kd);
        turn_pid.enable_continuous_input(-std::f64::consts::PI, std::f64::consts::PI);
        turn_pid.set_output_limits(-gains.max_output_v, gains.max_output_v);
        Self {
            index,
            io,
            inputs: SwerveModuleInputs::default(),
            turn_pid,
            gains,
            last_angle_setpoint: Rotation2d::zero(),
        }
    }

    pub fn index(&self) -> WheelModuleIndex {
        self.index
    }

    /// Refresh the input snapshot. On disconnect the last known good values
    /// hold; only the connected flag goes false.
    pub fn periodic(&mut self) {
        let mut fresh = SwerveModuleInputs::default();
        self.io.update_inputs(&mut fresh);
        if fresh.connected {
            self.inputs = fresh;
        } else {
            self.inputs.connected = false;
        }
    }

    /// Drive toward `desired` for this control period and return the
    /// optimized state actually commanded.
    ///
    /// The steer setpoint is flipped 180° (with speed negated) whenever that
    /// halves the turn, and the drive output is scaled by the cosine of the
    /// remaining angle error so the wheel does not drag sideways while still
    /// rotating into position.
    pub fn run_setpoint(&mut self, desired: ModuleState, dt: f64) -> ModuleState {
        let desired = if desired.speed_mps.abs() < REST_SPEED_MPS {
            ModuleState::new(0.0, self.last_angle_setpoint)
        } else {
            desired
        };

        let optimized = desired.optimize(self.inputs.turn_angle);
        self.last_angle_setpoint = optimized.angle;

        self.turn_pid.set_set_point(optimized.angle.radians());
        let turn_volts = self.turn_pid.update(self.inputs.turn_angle.radians(), dt);

        let angle_error = (optimized.angle - self.inputs.turn_angle).radians();
        let target_velocity = optimized.speed_mps * angle_error.cos();
        let drive_volts = (target_velocity * self.gains.drive_kv_v_per_mps
            + (target_velocity - self.inputs.drive_velocity_mps) * self.gains.drive_kp_v_per_mps)
            .clamp(-self.gains.max_output_v, self.gains.max_output_v);

        self.io.set_turn_voltage(turn_volts);
        self.io.set_drive_voltage(drive_volts);
        optimized
    }

    /// Zero both motor outputs immediately. Steer control resumes on the
    /// next `run_setpoint`.
    pub fn stop(&mut self) {
        self.io.set_drive_voltage(0.0);
        self.io.set_turn_voltage(0.0);
        self.turn_pid.reset();
    }

    /// Measured (speed, angle) this period.
    pub fn measured_state(&self) -> ModuleState {
        ModuleState::new(self.inputs.drive_velocity_mps, self.inputs.turn_angle)
    }

    /// Accumulated (distance, angle) this period, for odometry.
    pub fn position(&self) -> ModulePosition {
        ModulePosition::new(self.inputs.drive_position_m, self.inputs.turn_angle)
    }

    /// This period's reading for the thermal monitor.
    pub fn temperature_reading(&self) -> TemperatureReading {
        TemperatureReading::new(self.inputs.temperature_c, self.io.max_safe_temperature_c())
    }

    pub fn is_connected(&self) -> bool {
        self.inputs.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swervos_hal::sim::{DEFAULT_SIM_DT_S, SimSwerveModule};
    use swervos_types::Rotation2d;

    fn module() -> SwerveModule {
        SwerveModule::new(
            WheelModuleIndex::FrontLeft,
            Box::new(SimSwerveModule::new()),
            ModuleGains::default(),
        )
    }

    #[test]
    fn steer_servo_converges_on_commanded_angle() {
        let mut module = module();
        let desired = ModuleState::new(1.0, Rotation2d::from_degrees(45.0));

        for _ in 0..150 {
            module.periodic();
            module.run_setpoint(desired, DEFAULT_SIM_DT_S);
        }
        let error = (module.measured_state().angle - Rotation2d::from_degrees(45.0)).radians();
        assert!(error.abs() < 0.02, "steer error {error} rad");
    }

    #[test]
    fn drive_velocity_tracks_setpoint() {
        let mut module = module();
        let desired = ModuleState::new(2.0, Rotation2d::zero());

        for _ in 0..150 {
            module.periodic();
            module.run_setpoint(desired, DEFAULT_SIM_DT_S);
        }
        assert!((module.measured_state().speed_mps - 2.0).abs() < 0.1);
        assert!(module.position().distance_m > 1.0);
    }

    #[test]
    fn reversed_setpoint_flips_instead_of_spinning() {
        let mut module = module();
        // Wheel already pointing forward; a 170° setpoint should flip to
        // -10° with negated speed rather than steering 170°.
        module.periodic();
        let applied = module.run_setpoint(
            ModuleState::new(2.0, Rotation2d::from_degrees(170.0)),
            DEFAULT_SIM_DT_S,
        );
        assert!(applied.speed_mps < 0.0);
        assert!(applied.angle.degrees().abs() < 90.0);
    }

    #[test]
    fn rest_speed_holds_previous_steer_angle() {
        let mut module = module();
        for _ in 0..150 {
            module.periodic();
            module.run_setpoint(
                ModuleState::new(1.0, Rotation2d::from_degrees(90.0)),
                DEFAULT_SIM_DT_S,
            );
        }

        // Release the stick: zero speed keeps the 90° setpoint.
        module.periodic();
        let applied = module.run_setpoint(ModuleState::zero(), DEFAULT_SIM_DT_S);
        assert!((applied.angle.degrees().abs() - 90.0).abs() < 1.0);
        assert_eq!(applied.speed_mps, 0.0);
    }

    #[test]
    fn angle_error_attenuates_drive_output() {
        let mut module = module();
        module.periodic();
        // Wheel at 0°, setpoint at 89.9°: cos(error) ≈ 0, so the commanded
        // wheel velocity this period is near zero despite full speed.
        module.run_setpoint(
            ModuleState::new(4.0, Rotation2d::from_degrees(89.9)),
            DEFAULT_SIM_DT_S,
        );
        module.periodic();
        assert!(module.measured_state().speed_mps.abs() < 0.05);
    }

    #[test]
    fn hot_module_reports_over_limit() {
        let mut sim = SimSwerveModule::new();
        sim.set_temperature_c(95.0);
        let mut module = SwerveModule::new(
            WheelModuleIndex::BackRight,
            Box::new(sim),
            ModuleGains::default(),
        );
        module.periodic();
        assert!(module.temperature_reading().is_over_limit());
    }
}
