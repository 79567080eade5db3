//! `swervos-runtime` – process assembly and the control loop's brain.
//!
//! # Modules
//!
//! - [`config`] – the TOML configuration document, validated once at startup.
//! - [`bindings`] – [`OperatingMode`][swervos_types::OperatingMode]-driven
//!   backend selection for every hardware interface.
//! - [`input`] – operator intent shaping (deadband, squared response).
//! - [`robot`] – [`Robot`][robot::Robot], the per-period orchestrator.
//! - [`telemetry`] – `tracing` subscriber + optional OTLP export.

pub mod bindings;
pub mod config;
pub mod input;
pub mod robot;
pub mod telemetry;

pub use bindings::{BackendHandles, HardwareSet, ReplayHandles, SimHandles, bind_hardware};
pub use config::RobotConfig;
pub use input::OperatorInput;
pub use robot::{BusAlertSink, Robot};
