//! `swervos-safety` – thermal interlock condition and operator alerts.
//!
//! - [`thermal`] – [`ThermalMonitor`][thermal::ThermalMonitor]: tracks the
//!   latest temperature reading per actuator-bearing subsystem and exposes
//!   the level-triggered over-limit condition the runtime interlock consumes.
//! - [`alerts`] – [`AlertSink`][alerts::AlertSink]: fire-and-forget channel
//!   for indicator directives (LED patterns). The core emits directives;
//!   rendering happens in the external indicator collaborator.

pub mod alerts;
pub mod thermal;

pub use alerts::{AlertSink, NullAlertSink, idle_pattern, overheat_pattern, piece_held_pattern};
pub use thermal::ThermalMonitor;
