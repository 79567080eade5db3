//! Game-piece sequencing state machine.
//!
//! Coordinates intake, feeder, and flywheel against the binary presence
//! sensor. All waiting is expressed as per-period polled predicates (sensor
//! state, elapsed time in phase); [`Sequencer::tick`] runs exactly once per
//! control period and never blocks.
//!
//! The shoot sequence is timing-critical:
//!
//! 1. `SpinUp` – flywheel runs alone for at least the configured warm-up so
//!    it is at speed before a piece touches it.
//! 2. `Feed` – feeder pushes the piece into the flywheel until the sensor
//!    reports clear. A timeout guards against an externally interlocked
//!    feeder: the sequence exits instead of deadlocking.
//! 3. `Settle` – both keep running for a fixed delay after the sensor
//!    clears. The sensor reports "clear" slightly before the piece has fully
//!    exited; stopping early jams the piece mid-ejection.
//!
//! `Reversing` preempts everything and is the jam-clearing path: all three
//! actuators reverse together regardless of sensor state.

use tracing::{info, warn};

use crate::motor::SingleMotorSubsystem;

// ────────────────────────────────────────────────────────────────────────────
// States
// ────────────────────────────────────────────────────────────────────────────

/// Phase within the shoot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShootPhase {
    /// Flywheel warming up, feeder held.
    SpinUp,
    /// Feeder pushing the piece until the sensor clears.
    Feed,
    /// Post-clear hold so the piece fully exits.
    Settle,
}

/// Sequencer state, driven by sensor edges and elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Intaking,
    Shooting(ShootPhase),
    Reversing,
}

impl SequencerState {
    /// Stable label for telemetry and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            SequencerState::Idle => "idle",
            SequencerState::Intaking => "intaking",
            SequencerState::Shooting(ShootPhase::SpinUp) => "shooting:spin_up",
            SequencerState::Shooting(ShootPhase::Feed) => "shooting:feed",
            SequencerState::Shooting(ShootPhase::Settle) => "shooting:settle",
            SequencerState::Reversing => "reversing",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Sequencer timing parameters.
#[derive(Debug, Clone, Copy)]
pub struct SequencerConfig {
    /// Minimum flywheel warm-up before the feeder may engage.
    pub flywheel_spin_up_s: f64,
    /// Hold time after the sensor reports clear before stopping.
    pub post_clear_settle_s: f64,
    /// Maximum time in `Feed` before giving up (jam or interlocked feeder).
    pub shoot_timeout_s: f64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            flywheel_spin_up_s: 0.5,
            post_clear_settle_s: 0.25,
            shoot_timeout_s: 5.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sequencer
// ────────────────────────────────────────────────────────────────────────────

/// The intake → feed → shoot coordinator.
#[derive(Debug)]
pub struct Sequencer {
    state: SequencerState,
    elapsed_in_phase_s: f64,
    config: SequencerConfig,
}

impl Sequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            state: SequencerState::Idle,
            elapsed_in_phase_s: 0.0,
            config,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Start intaking: run the intake until the sensor detects a piece.
    pub fn request_intake(&mut self) {
        self.transition(SequencerState::Intaking);
    }

    /// Start the shoot sequence from the flywheel warm-up.
    pub fn request_shoot(&mut self) {
        self.transition(SequencerState::Shooting(ShootPhase::SpinUp));
    }

    /// Reverse all actuators to clear a jam. Preempts any state.
    pub fn request_reverse(&mut self) {
        self.transition(SequencerState::Reversing);
    }

    /// Abort whatever is in progress; all actuators stop on the next tick.
    pub fn abort(&mut self) {
        self.transition(SequencerState::Idle);
    }

    fn transition(&mut self, next: SequencerState) {
        if next != self.state {
            info!(from = self.state.label(), to = next.label(), "sequencer transition");
            self.state = next;
            self.elapsed_in_phase_s = 0.0;
        }
    }

    /// Advance the state machine by one control period and write this
    /// period's actuator commands.
    ///
    /// `piece_detected` is the presence sensor's (last known good) state.
    pub fn tick(
        &mut self,
        dt_s: f64,
        piece_detected: bool,
        intake: &mut SingleMotorSubsystem,
        feeder: &mut SingleMotorSubsystem,
        flywheel: &mut SingleMotorSubsystem,
    ) {
        self.advance(dt_s, piece_detected);

        match self.state {
            SequencerState::Idle => {
                intake.stop();
                feeder.stop();
                flywheel.stop();
            }
            SequencerState::Intaking => {
                intake.run_forward();
                feeder.stop();
                flywheel.stop();
            }
            SequencerState::Shooting(ShootPhase::SpinUp) => {
                intake.stop();
                feeder.stop();
                flywheel.run_forward();
            }
            SequencerState::Shooting(ShootPhase::Feed)
            | SequencerState::Shooting(ShootPhase::Settle) => {
                intake.stop();
                feeder.run_forward();
                flywheel.run_forward();
            }
            SequencerState::Reversing => {
                intake.run_reverse();
                feeder.run_reverse();
                flywheel.run_reverse();
            }
        }
    }

    /// State transitions only; actuation happens afterward from the new
    /// state, so a transition takes effect within the same period.
    fn advance(&mut self, dt_s: f64, piece_detected: bool) {
        match self.state {
            SequencerState::Intaking => {
                if piece_detected {
                    // Edge-triggered stop: the piece is seated.
                    self.transition(SequencerState::Idle);
                }
            }
            SequencerState::Shooting(ShootPhase::SpinUp) => {
                // Warm-up counts periods the flywheel has actually been
                // driven. The entry tick energizes the flywheel after this
                // check runs, so its period is accumulated on the next tick;
                // sampling before the increment keeps the feeder held for a
                // full warm-up of commanded spin.
                if self.elapsed_in_phase_s >= self.config.flywheel_spin_up_s {
                    self.transition(SequencerState::Shooting(ShootPhase::Feed));
                } else {
                    self.elapsed_in_phase_s += dt_s;
                }
            }
            SequencerState::Shooting(ShootPhase::Feed) => {
                self.elapsed_in_phase_s += dt_s;
                if !piece_detected {
                    self.transition(SequencerState::Shooting(ShootPhase::Settle));
                } else if self.elapsed_in_phase_s >= self.config.shoot_timeout_s {
                    warn!("shoot sequence timed out waiting for the sensor to clear");
                    self.transition(SequencerState::Idle);
                }
            }
            SequencerState::Shooting(ShootPhase::Settle) => {
                self.elapsed_in_phase_s += dt_s;
                if self.elapsed_in_phase_s >= self.config.post_clear_settle_s {
                    self.transition(SequencerState::Idle);
                }
            }
            SequencerState::Idle | SequencerState::Reversing => {}
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use swervos_hal::sim::SimMotor;

    const DT: f64 = 0.02;

    fn motors() -> (
        SingleMotorSubsystem,
        SingleMotorSubsystem,
        SingleMotorSubsystem,
    ) {
        (
            SingleMotorSubsystem::new("intake", Box::new(SimMotor::new()), 6.0, -6.0),
            SingleMotorSubsystem::new("feeder", Box::new(SimMotor::new()), 6.0, -6.0),
            SingleMotorSubsystem::new("flywheel", Box::new(SimMotor::new()), 9.0, -6.0),
        )
    }

    #[test]
    fn intake_runs_until_detection_edge() {
        let (mut intake, mut feeder, mut flywheel) = motors();
        let mut seq = Sequencer::new(SequencerConfig::default());

        seq.request_intake();
        seq.tick(DT, false, &mut intake, &mut feeder, &mut flywheel);
        assert_eq!(seq.state(), SequencerState::Intaking);
        assert!(intake.commanded_volts() > 0.0);

        // Piece arrives: intake stops in the same period.
        seq.tick(DT, true, &mut intake, &mut feeder, &mut flywheel);
        assert_eq!(seq.state(), SequencerState::Idle);
        assert_eq!(intake.commanded_volts(), 0.0);
    }

    #[test]
    fn shoot_sequence_timing_matches_contract() {
        let (mut intake, mut feeder, mut flywheel) = motors();
        let mut seq = Sequencer::new(SequencerConfig::default());

        seq.request_shoot();

        // Warm-up: feeder must stay off for at least 0.5 s of flywheel.
        let mut t = 0.0;
        let mut spin_ticks = 0usize;
        let mut feed_start = None;
        let mut detected = true;
        let mut clear_time = None;
        let mut feeder_stop_time = None;

        for _ in 0..200 {
            // Sensor clears 0.2 s into the feed phase.
            if let Some(fs) = feed_start {
                if detected && t - fs >= 0.2 {
                    detected = false;
                    clear_time = Some(t);
                }
            }

            seq.tick(DT, detected, &mut intake, &mut feeder, &mut flywheel);
            t += DT;

            if feed_start.is_none()
                && flywheel.commanded_volts() > 0.0
                && feeder.commanded_volts() == 0.0
            {
                spin_ticks += 1;
            }
            if feed_start.is_none() && feeder.commanded_volts() > 0.0 {
                feed_start = Some(t);
            }
            if let (Some(_), None) = (clear_time, feeder_stop_time) {
                if feeder.commanded_volts() == 0.0 && clear_time.is_some() {
                    feeder_stop_time = Some(t);
                }
            }
            if seq.state() == SequencerState::Idle {
                break;
            }
        }

        let feed_start = feed_start.expect("feeder never enabled");
        assert!(
            feed_start >= 0.5,
            "feeder enabled after {feed_start} s, before the 0.5 s warm-up"
        );
        // The warm-up counts commanded spin, not wall time since the request:
        // the flywheel must have been driven for the full minimum.
        let spin_s = spin_ticks as f64 * DT;
        assert!(
            spin_s >= 0.5,
            "flywheel was commanded for only {spin_s} s before the feeder enabled"
        );

        let clear_time = clear_time.expect("sensor never cleared");
        let feeder_stop_time = feeder_stop_time.expect("feeder never stopped");
        let settle = feeder_stop_time - clear_time;
        assert!(
            settle >= 0.25,
            "feeder stopped {settle} s after clear, before the 0.25 s settle"
        );
        assert!(settle < 0.25 + 2.0 * DT, "feeder stopped late: {settle} s");

        // Flywheel stops together with the feeder.
        assert_eq!(flywheel.commanded_volts(), 0.0);
        assert_eq!(seq.state(), SequencerState::Idle);
    }

    #[test]
    fn abort_preempts_feeding_within_one_period() {
        let (mut intake, mut feeder, mut flywheel) = motors();
        let mut seq = Sequencer::new(SequencerConfig::default());

        seq.request_shoot();
        // Run past warm-up into Feed with a piece present.
        for _ in 0..30 {
            seq.tick(DT, true, &mut intake, &mut feeder, &mut flywheel);
        }
        assert_eq!(seq.state(), SequencerState::Shooting(ShootPhase::Feed));
        assert!(feeder.commanded_volts() > 0.0);

        seq.abort();
        seq.tick(DT, true, &mut intake, &mut feeder, &mut flywheel);
        assert_eq!(seq.state(), SequencerState::Idle);
        assert_eq!(intake.commanded_volts(), 0.0);
        assert_eq!(feeder.commanded_volts(), 0.0);
        assert_eq!(flywheel.commanded_volts(), 0.0);
    }

    #[test]
    fn reverse_preempts_any_state_regardless_of_sensor() {
        let (mut intake, mut feeder, mut flywheel) = motors();
        let mut seq = Sequencer::new(SequencerConfig::default());

        seq.request_shoot();
        for _ in 0..30 {
            seq.tick(DT, true, &mut intake, &mut feeder, &mut flywheel);
        }

        seq.request_reverse();
        seq.tick(DT, true, &mut intake, &mut feeder, &mut flywheel);
        assert_eq!(seq.state(), SequencerState::Reversing);
        assert!(intake.commanded_volts() < 0.0);
        assert!(feeder.commanded_volts() < 0.0);
        assert!(flywheel.commanded_volts() < 0.0);

        seq.abort();
        seq.tick(DT, true, &mut intake, &mut feeder, &mut flywheel);
        assert_eq!(intake.commanded_volts(), 0.0);
    }

    #[test]
    fn interlocked_feeder_times_out_instead_of_deadlocking() {
        let mut hot = SimMotor::new();
        hot.set_temperature_c(95.0); // feeder thermally interlocked
        let mut feeder = SingleMotorSubsystem::new("feeder", Box::new(hot), 6.0, -6.0);
        feeder.periodic();
        assert!(feeder.is_interlocked());

        let (mut intake, _, mut flywheel) = motors();
        let mut seq = Sequencer::new(SequencerConfig {
            shoot_timeout_s: 1.0,
            ..Default::default()
        });

        seq.request_shoot();
        // The sensor never clears because the feeder cannot push the piece.
        for _ in 0..100 {
            seq.tick(DT, true, &mut intake, &mut feeder, &mut flywheel);
            if seq.state() == SequencerState::Idle {
                break;
            }
        }
        assert_eq!(seq.state(), SequencerState::Idle);
        assert_eq!(flywheel.commanded_volts(), 0.0);
    }

    #[test]
    fn state_labels_are_stable() {
        assert_eq!(SequencerState::Idle.label(), "idle");
        assert_eq!(
            SequencerState::Shooting(ShootPhase::Settle).label(),
            "shooting:settle"
        );
    }
}
