//! Physics-simulation backends for headless testing and CI.
//!
//! Each device integrates its commanded output with a fixed nominal period
//! (the control loop's 20 ms by default) on every `update_inputs` call, so a
//! full robot can be driven entirely in-process: commanded voltages become
//! plausible velocities, positions, and headings one tick later.
//!
//! The simulated gyro is fed through a [`SimGyroHandle`]: the drivetrain
//! coordinator (or a test) writes the chassis yaw rate it just commanded, and
//! the gyro integrates it, mirroring how a real IMU observes actual rotation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use swervos_types::Rotation2d;

use crate::gyro::{GyroInputs, GyroIo};
use crate::presence::{PresenceSensorInputs, PresenceSensorIo};
use crate::single_motor::{SingleMotorInputs, SingleMotorIo};
use crate::swerve_module::{SwerveModuleInputs, SwerveModuleIo};

/// Default integration period, matching the 20 ms control loop.
pub const DEFAULT_SIM_DT_S: f64 = 0.02;

// ────────────────────────────────────────────────────────────────────────────
// Simulated gyro
// ────────────────────────────────────────────────────────────────────────────

/// Shared handle used to feed the commanded chassis yaw rate into a
/// [`SimGyro`]. Clone it cheaply; all clones share one value.
#[derive(Debug, Clone, Default)]
pub struct SimGyroHandle {
    yaw_rate_rad_per_s: Arc<Mutex<f64>>,
}

impl SimGyroHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the yaw rate the drivetrain just commanded.
    pub fn set_yaw_rate(&self, rad_per_s: f64) {
        *self.yaw_rate_rad_per_s.lock().unwrap() = rad_per_s;
    }

    fn yaw_rate(&self) -> f64 {
        *self.yaw_rate_rad_per_s.lock().unwrap()
    }
}

/// Gyro backend that integrates the commanded yaw rate.
pub struct SimGyro {
    handle: SimGyroHandle,
    yaw_rad: f64,
    dt_s: f64,
}

impl SimGyro {
    pub fn new(handle: SimGyroHandle) -> Self {
        Self::with_period(handle, DEFAULT_SIM_DT_S)
    }

    pub fn with_period(handle: SimGyroHandle, dt_s: f64) -> Self {
        Self {
            handle,
            yaw_rad: 0.0,
            dt_s,
        }
    }
}

impl GyroIo for SimGyro {
    fn update_inputs(&mut self, inputs: &mut GyroInputs) {
        let rate = self.handle.yaw_rate();
        self.yaw_rad += rate * self.dt_s;
        inputs.yaw = Rotation2d::new(self.yaw_rad);
        inputs.yaw_velocity_rad_per_s = rate;
        inputs.connected = true;
    }

    fn set_yaw(&mut self, yaw: Rotation2d) {
        self.yaw_rad = yaw.radians();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated swerve module
// ────────────────────────────────────────────────────────────────────────────

/// Swerve module backend with first-order drive and steer dynamics.
pub struct SimSwerveModule {
    dt_s: f64,
    /// Steady-state wheel speed per applied volt, (m/s)/V.
    drive_mps_per_volt: f64,
    /// Steer rate per applied volt, (rad/s)/V.
    turn_rad_per_s_per_volt: f64,
    drive_volts: f64,
    turn_volts: f64,
    drive_velocity_mps: f64,
    drive_position_m: f64,
    turn_angle_rad: f64,
    temperature_c: f64,
}

impl SimSwerveModule {
    pub fn new() -> Self {
        Self::with_period(DEFAULT_SIM_DT_S)
    }

    pub fn with_period(dt_s: f64) -> Self {
        Self {
            dt_s,
            drive_mps_per_volt: 4.5 / 12.0,
            turn_rad_per_s_per_volt: 8.0 / 12.0,
            drive_volts: 0.0,
            turn_volts: 0.0,
            drive_velocity_mps: 0.0,
            drive_position_m: 0.0,
            turn_angle_rad: 0.0,
            temperature_c: 30.0,
        }
    }

    /// Override the reported motor temperature (for interlock tests).
    pub fn set_temperature_c(&mut self, celsius: f64) {
        self.temperature_c = celsius;
    }
}

impl Default for SimSwerveModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SwerveModuleIo for SimSwerveModule {
    fn set_drive_voltage(&mut self, volts: f64) {
        self.drive_volts = volts;
    }

    fn set_turn_voltage(&mut self, volts: f64) {
        self.turn_volts = volts;
    }

    fn update_inputs(&mut self, inputs: &mut SwerveModuleInputs) {
        // First-order lag toward the voltage-implied speed, then integrate.
        let target = self.drive_volts * self.drive_mps_per_volt;
        self.drive_velocity_mps += (target - self.drive_velocity_mps) * 0.5;
        self.drive_position_m += self.drive_velocity_mps * self.dt_s;
        self.turn_angle_rad += self.turn_volts * self.turn_rad_per_s_per_volt * self.dt_s;

        inputs.drive_position_m = self.drive_position_m;
        inputs.drive_velocity_mps = self.drive_velocity_mps;
        inputs.turn_angle = Rotation2d::new(self.turn_angle_rad);
        inputs.drive_current_a = self.drive_volts.abs() * 2.0;
        inputs.turn_current_a = self.turn_volts.abs() * 1.0;
        inputs.temperature_c = self.temperature_c;
        inputs.connected = true;
    }

    fn max_safe_temperature_c(&self) -> f64 {
        90.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated single motor
// ────────────────────────────────────────────────────────────────────────────

/// One-axis motor backend: voltage to rpm through a first-order lag.
pub struct SimMotor {
    rpm_per_volt: f64,
    applied_volts: f64,
    velocity_rpm: f64,
    temperature_c: f64,
    max_safe_temperature_c: f64,
}

impl SimMotor {
    pub fn new() -> Self {
        Self {
            rpm_per_volt: 5000.0 / 12.0,
            applied_volts: 0.0,
            velocity_rpm: 0.0,
            temperature_c: 30.0,
            max_safe_temperature_c: 70.0,
        }
    }

    /// Override the reported motor temperature (for interlock tests).
    pub fn set_temperature_c(&mut self, celsius: f64) {
        self.temperature_c = celsius;
    }
}

impl Default for SimMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl SingleMotorIo for SimMotor {
    fn set_voltage(&mut self, volts: f64) {
        self.applied_volts = volts;
    }

    fn update_inputs(&mut self, inputs: &mut SingleMotorInputs) {
        let target = self.applied_volts * self.rpm_per_volt;
        self.velocity_rpm += (target - self.velocity_rpm) * 0.5;

        inputs.applied_output_v = self.applied_volts;
        inputs.current_a = self.applied_volts.abs() * 3.0;
        inputs.temperature_c = self.temperature_c;
        inputs.velocity_rpm = self.velocity_rpm;
        inputs.fault_flags = 0;
        inputs.connected = true;
    }

    fn max_safe_temperature_c(&self) -> f64 {
        self.max_safe_temperature_c
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated presence sensor
// ────────────────────────────────────────────────────────────────────────────

/// Shared handle used to flip a [`SimPresenceSensor`] from test or harness
/// code while the sequencer owns the sensor itself.
#[derive(Debug, Clone, Default)]
pub struct SimPresenceHandle {
    detected: Arc<AtomicBool>,
}

impl SimPresenceHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_detected(&self, detected: bool) {
        self.detected.store(detected, Ordering::SeqCst);
    }
}

/// Presence sensor backend controlled through a [`SimPresenceHandle`].
pub struct SimPresenceSensor {
    handle: SimPresenceHandle,
}

impl SimPresenceSensor {
    pub fn new(handle: SimPresenceHandle) -> Self {
        Self { handle }
    }
}

impl PresenceSensorIo for SimPresenceSensor {
    fn update_inputs(&mut self, inputs: &mut PresenceSensorInputs) {
        inputs.detected = self.handle.detected.load(Ordering::SeqCst);
        inputs.connected = true;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
