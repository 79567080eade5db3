//! [`Robot`] – the per-period orchestrator.
//!
//! Owns every subsystem and runs the single synchronous control cycle:
//!
//! 1. **Ingest** – drain pending vision observations from the bus without
//!    blocking and feed them to the pose estimator.
//! 2. **Sense** – refresh the presence sensor and translate operator intent
//!    into sequencer requests.
//! 3. **Sequence** – advance the game-piece state machine and write the
//!    intake/feeder/flywheel outputs.
//! 4. **Protect** – collect every subsystem's temperature reading into the
//!    thermal monitor; an over-limit drivetrain is forced to [`DriveCommand::Stop`].
//!    The indicator directive tracks the robot state (red blink while the
//!    interlock holds, orange while a piece is seated, alliance color at
//!    rest) and is re-emitted through the alert sink whenever it changes.
//! 5. **Drive** – resolve the operator's drive intent and run the drivetrain
//!    period.
//! 6. **Report** – publish one telemetry snapshot.
//!
//! Nothing in the cycle blocks; all waiting is polled predicates.

use swervos_drive::{DriveBase, DriveCommand, SwerveModule};
use swervos_safety::{AlertSink, ThermalMonitor, idle_pattern, overheat_pattern, piece_held_pattern};
use swervos_shooter::{PieceSensor, Sequencer, SequencerState, SingleMotorSubsystem};
use swervos_telemetry::{EventBus, Topic, TopicReceiver};
use swervos_types::{Event, EventPayload, LedPattern, Pose2d, TelemetrySnapshot, WheelModuleIndex};
use tracing::{info, warn};

use crate::bindings::{HardwareSet, SimHandles};
use crate::config::RobotConfig;
use crate::input::OperatorInput;

const EVENT_SOURCE: &str = "swervos-runtime::robot";

/// [`AlertSink`] that routes indicator directives over the event bus. The
/// indicator renderer subscribes to [`Topic::SystemAlerts`]; delivery is
/// best-effort and a bus with no subscriber is not an error.
pub struct BusAlertSink {
    bus: EventBus,
}

impl BusAlertSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl AlertSink for BusAlertSink {
    fn send(&mut self, pattern: LedPattern) {
        let _ = self.bus.publish_to(
            Topic::SystemAlerts,
            Event::now(EVENT_SOURCE, EventPayload::Alert(pattern)),
        );
    }
}

/// The complete robot, one instance per process.
pub struct Robot {
    config: RobotConfig,
    drive: DriveBase,
    intake: SingleMotorSubsystem,
    feeder: SingleMotorSubsystem,
    flywheel: SingleMotorSubsystem,
    piece_sensor: PieceSensor,
    sequencer: Sequencer,
    thermal: ThermalMonitor,
    bus: EventBus,
    vision_rx: TopicReceiver,
    alert_sink: BusAlertSink,
    /// Last directive emitted; directives go out only on change.
    last_led: Option<LedPattern>,
    /// Present in simulation mode: closes the gyro loop with the commanded
    /// yaw rate after each period.
    sim: Option<SimHandles>,
    prev_intake_held: bool,
    prev_shoot_held: bool,
    prev_reverse_held: bool,
    over_temperature: bool,
}

impl Robot {
    pub fn new(
        config: RobotConfig,
        hardware: HardwareSet,
        bus: EventBus,
        sim: Option<SimHandles>,
    ) -> Self {
        let gains = config.module_gains();
        let mut indices = WheelModuleIndex::ALL.into_iter();
        let modules = hardware
            .modules
            .map(|io| SwerveModule::new(indices.next().unwrap(), io, gains));
        let drive = DriveBase::new(hardware.gyro, modules, config.drive_config());

        let shooter = &config.shooter;
        let intake = SingleMotorSubsystem::new(
            "intake",
            hardware.intake,
            shooter.intake_voltage,
            shooter.intake_reverse_voltage,
        );
        let feeder = SingleMotorSubsystem::new(
            "feeder",
            hardware.feeder,
            shooter.feeder_voltage,
            shooter.feeder_reverse_voltage,
        );
        let flywheel = SingleMotorSubsystem::new(
            "flywheel",
            hardware.flywheel,
            shooter.flywheel_voltage,
            shooter.flywheel_reverse_voltage,
        );
        let piece_sensor = PieceSensor::new(hardware.piece_sensor);
        let sequencer = Sequencer::new(config.sequencer_config());
        let vision_rx = bus.subscribe_to(Topic::Vision);
        let alert_sink = BusAlertSink::new(bus.clone());

        Self {
            config,
            drive,
            intake,
            feeder,
            flywheel,
            piece_sensor,
            sequencer,
            thermal: ThermalMonitor::new(),
            bus,
            vision_rx,
            alert_sink,
            last_led: None,
            sim,
            prev_intake_held: false,
            prev_shoot_held: false,
            prev_reverse_held: false,
            over_temperature: false,
        }
    }

    /// One full control period.
    pub fn tick(&mut self, now_s: f64, dt: f64, input: &OperatorInput) {
        self.ingest_vision();

        // ── Sense ──────────────────────────────────────────────────────────
        self.piece_sensor.periodic();
        self.apply_sequencer_intent(input);

        // ── Sequence ───────────────────────────────────────────────────────
        self.sequencer.tick(
            dt,
            self.piece_sensor.is_object_detected(),
            &mut self.intake,
            &mut self.feeder,
            &mut self.flywheel,
        );
        self.intake.periodic();
        self.feeder.periodic();
        self.flywheel.periodic();

        // ── Protect ────────────────────────────────────────────────────────
        for (label, reading) in self.drive.temperature_readings() {
            self.thermal.report(label, reading);
        }
        self.thermal
            .report(self.intake.name(), self.intake.temperature_reading());
        self.thermal
            .report(self.feeder.name(), self.feeder.temperature_reading());
        self.thermal
            .report(self.flywheel.name(), self.flywheel.temperature_reading());

        let over = self.thermal.any_over_limit();
        if over && !self.over_temperature {
            warn!(
                subsystems = ?self.thermal.over_limit_subsystems(),
                "thermal interlock engaged"
            );
        } else if !over && self.over_temperature {
            info!("thermal interlock released");
        }
        self.over_temperature = over;

        // Indicator: red blink holds exactly as long as the interlock does;
        // otherwise orange while a piece is seated, alliance color at rest.
        // The level-held directive is re-emitted only when it changes.
        let led = if over {
            overheat_pattern()
        } else if self.piece_sensor.is_object_detected() {
            piece_held_pattern()
        } else {
            idle_pattern(self.config.alliance)
        };
        if self.last_led.as_ref() != Some(&led) {
            self.alert_sink.send(led.clone());
            self.last_led = Some(led);
        }

        // ── Drive ──────────────────────────────────────────────────────────
        if input.reset_heading {
            self.drive.reset_heading();
        }
        if self.drive.is_temperature_too_high() {
            self.drive.stop();
        } else {
            self.drive.set_command(input.drive_command(&self.config));
        }
        self.drive.periodic(now_s, dt);
        if let Some(sim) = &self.sim {
            sim.gyro.set_yaw_rate(self.drive.commanded_speeds().omega);
        }

        // ── Report ─────────────────────────────────────────────────────────
        let snapshot = TelemetrySnapshot {
            timestamp_s: now_s,
            pose: self.drive.pose(),
            commanded_speeds: self.drive.commanded_speeds(),
            module_states: self.drive.commanded_states(),
            sequencer_state: self.sequencer.state().label().to_string(),
            over_temperature: self.over_temperature,
        };
        // Best-effort publish: a bus with no logger attached is not an error.
        let _ = self.bus.publish_to(
            Topic::Telemetry,
            Event::now(EVENT_SOURCE, EventPayload::Telemetry(snapshot)),
        );
    }

    /// Drain every vision observation already waiting on the bus.
    fn ingest_vision(&mut self) {
        while let Some(event) = self.vision_rx.try_recv() {
            if let EventPayload::Vision(observation) = event.payload {
                self.drive.add_vision_observation(&observation);
            }
        }
    }

    /// Translate button state into sequencer requests. Intake and reverse
    /// are hold-to-run; shoot is a momentary trigger.
    fn apply_sequencer_intent(&mut self, input: &OperatorInput) {
        if input.reverse {
            self.sequencer.request_reverse();
        } else if self.prev_reverse_held && self.sequencer.state() == SequencerState::Reversing {
            self.sequencer.abort();
        }

        if input.shoot && !self.prev_shoot_held {
            self.sequencer.request_shoot();
        } else if input.intake && self.sequencer.state() == SequencerState::Idle {
            self.sequencer.request_intake();
        } else if !input.intake
            && self.prev_intake_held
            && self.sequencer.state() == SequencerState::Intaking
        {
            self.sequencer.abort();
        }

        self.prev_intake_held = input.intake;
        self.prev_shoot_held = input.shoot;
        self.prev_reverse_held = input.reverse;
    }

    /// Immediately command every actuator to its stopped state. Used by the
    /// shutdown path; the next `tick` would re-resolve operator intent.
    pub fn emergency_stop(&mut self) {
        warn!("emergency stop: zeroing all actuators");
        self.sequencer.abort();
        self.intake.stop();
        self.feeder.stop();
        self.flywheel.stop();
        self.drive.stop();
    }

    pub fn pose(&self) -> Pose2d {
        self.drive.pose()
    }

    pub fn sequencer_state(&self) -> SequencerState {
        self.sequencer.state()
    }

    pub fn is_over_temperature(&self) -> bool {
        self.over_temperature
    }

    pub fn drive_command(&self) -> DriveCommand {
        self.drive.command()
    }

    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
