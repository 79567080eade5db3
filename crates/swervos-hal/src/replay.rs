//! Inert backends for log replay.
//!
//! In replay mode the control logic runs unchanged, but no hardware exists:
//! actuation calls are dropped and every input snapshot is whatever the
//! external log loader last wrote into the device's [`ReplaySlot`]. This is
//! what makes a recorded match bit-reproducible through the same code path
//! as the live robot.
//!
//! Replay devices report `f64::INFINITY` as their max-safe temperature so
//! thermal interlocks never trip on recorded data.

use std::sync::{Arc, Mutex};

use swervos_types::Rotation2d;

use crate::gyro::{GyroInputs, GyroIo};
use crate::presence::{PresenceSensorInputs, PresenceSensorIo};
use crate::single_motor::{SingleMotorInputs, SingleMotorIo};
use crate::swerve_module::{SwerveModuleInputs, SwerveModuleIo};

/// Shared slot a log loader writes recorded input snapshots into.
///
/// Clone it cheaply; the replay backend keeps one clone and the loader keeps
/// the other.
#[derive(Debug, Default)]
pub struct ReplaySlot<T> {
    value: Arc<Mutex<T>>,
}

impl<T> Clone for ReplaySlot<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<T: Clone + Default> ReplaySlot<T> {
    pub fn new() -> Self {
        Self {
            value: Arc::new(Mutex::new(T::default())),
        }
    }

    /// Store the next recorded snapshot.
    pub fn write(&self, value: T) {
        *self.value.lock().unwrap() = value;
    }

    fn read(&self) -> T {
        self.value.lock().unwrap().clone()
    }
}

/// Inert gyro: yaw comes from the slot, commands are dropped.
pub struct ReplayGyro {
    slot: ReplaySlot<GyroInputs>,
}

impl ReplayGyro {
    pub fn new(slot: ReplaySlot<GyroInputs>) -> Self {
        Self { slot }
    }
}

impl GyroIo for ReplayGyro {
    fn update_inputs(&mut self, inputs: &mut GyroInputs) {
        *inputs = self.slot.read();
    }

    fn set_yaw(&mut self, _yaw: Rotation2d) {
        // No functionality in replay.
    }
}

/// Inert swerve module: measurements come from the slot, voltages are dropped.
pub struct ReplaySwerveModule {
    slot: ReplaySlot<SwerveModuleInputs>,
}

impl ReplaySwerveModule {
    pub fn new(slot: ReplaySlot<SwerveModuleInputs>) -> Self {
        Self { slot }
    }
}

impl SwerveModuleIo for ReplaySwerveModule {
    fn set_drive_voltage(&mut self, _volts: f64) {
        // No functionality in replay.
    }

    fn set_turn_voltage(&mut self, _volts: f64) {
        // No functionality in replay.
    }

    fn update_inputs(&mut self, inputs: &mut SwerveModuleInputs) {
        *inputs = self.slot.read();
    }

    fn max_safe_temperature_c(&self) -> f64 {
        f64::INFINITY
    }
}

/// Inert single motor.
pub struct ReplayMotor {
    slot: ReplaySlot<SingleMotorInputs>,
}

impl ReplayMotor {
    pub fn new(slot: ReplaySlot<SingleMotorInputs>) -> Self {
        Self { slot }
    }
}

impl SingleMotorIo for ReplayMotor {
    fn set_voltage(&mut self, _volts: f64) {
        // No functionality in replay.
    }

    fn update_inputs(&mut self, inputs: &mut SingleMotorInputs) {
        *inputs = self.slot.read();
    }

    fn max_safe_temperature_c(&self) -> f64 {
        f64::INFINITY
    }
}

/// Inert presence sensor.
pub struct ReplayPresenceSensor {
    slot: ReplaySlot<PresenceSensorInputs>,
}

impl ReplayPresenceSensor {
    pub fn new(slot: ReplaySlot<PresenceSensorInputs>) -> Self {
        Self { slot }
    }
}

impl PresenceSensorIo for ReplayPresenceSensor {
    fn update_inputs(&mut self, inputs: &mut PresenceSensorInputs) {
        *inputs = self.slot.read();
    }
}
