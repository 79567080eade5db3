//! `swervos-hal` – hardware abstraction layer.
//!
//! One trait per device class, each with interchangeable backends selected
//! once at startup by [`OperatingMode`][swervos_types::OperatingMode]:
//!
//! - [`gyro`] – [`GyroIo`][gyro::GyroIo]: heading + angular velocity.
//! - [`swerve_module`] – [`SwerveModuleIo`][swerve_module::SwerveModuleIo]:
//!   per-wheel drive/steer actuation and measurement.
//! - [`single_motor`] – [`SingleMotorIo`][single_motor::SingleMotorIo]:
//!   one-axis motors (intake, feeder, flywheel).
//! - [`presence`] – [`PresenceSensorIo`][presence::PresenceSensorIo]:
//!   binary game-piece detection.
//!
//! The `sim` module provides physics-integrating backends for headless tests
//! and CI; the `replay` module provides inert backends whose inputs are
//! repopulated from a recorded log. Real-world drivers are board-specific
//! and injected by the deployment binary.
//!
//! Callers never learn which backend is bound. A disconnected device reports
//! `connected = false` in its input snapshot instead of erroring; callers
//! hold the last known good values.

pub mod gyro;
pub mod pid;
pub mod presence;
pub mod replay;
pub mod sim;
pub mod single_motor;
pub mod swerve_module;

pub use gyro::{GyroInputs, GyroIo};
pub use pid::PidController;
pub use presence::{PresenceSensorInputs, PresenceSensorIo};
pub use single_motor::{SingleMotorInputs, SingleMotorIo};
pub use swerve_module::{SwerveModuleInputs, SwerveModuleIo};
