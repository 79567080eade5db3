//! `swervos-shooter` – game-piece handling.
//!
//! - [`motor`] – [`SingleMotorSubsystem`][motor::SingleMotorSubsystem]: one
//!   named actuator (intake, feeder, flywheel) with fixed forward/reverse
//!   voltages and its own thermal interlock.
//! - [`sensor`] – [`PieceSensor`][sensor::PieceSensor]: the binary presence
//!   sensor, disconnection-tolerant.
//! - [`sequencer`] – [`Sequencer`][sequencer::Sequencer]: the
//!   intake → feed → shoot state machine, driven once per control period by
//!   polled predicates (sensor state and elapsed time), never by blocking
//!   waits.

pub mod motor;
pub mod sensor;
pub mod sequencer;

pub use motor::SingleMotorSubsystem;
pub use sensor::PieceSensor;
pub use sequencer::{Sequencer, SequencerConfig, SequencerState, ShootPhase};
