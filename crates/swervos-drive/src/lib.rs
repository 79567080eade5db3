//! `swervos-drive` – the four-module swerve drivetrain.
//!
//! - [`module`] – [`SwerveModule`][module::SwerveModule]: one wheel's
//!   steering servo and drive feedforward around a
//!   [`SwerveModuleIo`][swervos_hal::SwerveModuleIo] backend.
//! - [`base`] – [`DriveBase`][base::DriveBase]: the coordinator that fuses
//!   gyro and wheel odometry into the pose estimate and resolves one
//!   [`DriveCommand`][base::DriveCommand] per control period into
//!   desaturated module setpoints.

pub mod base;
pub mod module;

pub use base::{DriveBase, DriveCommand, DriveConfig};
pub use module::{ModuleGains, SwerveModule};
