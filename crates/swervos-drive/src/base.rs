//! Drivetrain coordinator.
//!
//! [`DriveBase`] owns the gyro, the four wheel modules, the kinematic model,
//! and the pose estimator, and runs them as one unit once per control
//! period: read sensors, integrate odometry, resolve the active command into
//! a chassis velocity, and dispatch desaturated module setpoints. Exactly
//! one [`DriveCommand`] is in force at a time; setting a new one replaces
//! the previous one atomically at the next period.

use swervos_estimation::{FusionConfig, PoseEstimator, SwerveKinematics};
use swervos_hal::pid::PidController;
use swervos_hal::{GyroInputs, GyroIo};
use swervos_types::{
    ChassisSpeeds, ModulePosition, ModuleState, Pose2d, Rotation2d, TemperatureReading,
    Translation2d, VisionObservation, WheelModuleIndex,
};
use tracing::info;

use crate::module::SwerveModule;

// ────────────────────────────────────────────────────────────────────────────
// Commands and configuration
// ────────────────────────────────────────────────────────────────────────────

/// What the drivetrain should be doing this period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveCommand {
    /// Operator velocity command, optionally rotated from field frame into
    /// body frame using the estimated heading.
    Manual {
        speeds: ChassisSpeeds,
        field_relative: bool,
    },
    /// Translate under operator control while a heading servo keeps the
    /// robot pointed at a field-frame target.
    AutoAim {
        vx_mps: f64,
        vy_mps: f64,
        target: Translation2d,
    },
    /// Rotate in place until the heading error to the target is within
    /// tolerance, then hold.
    TurnToTarget {
        target: Translation2d,
        tolerance_rad: f64,
    },
    /// Zero all module outputs immediately.
    Stop,
}

/// Chassis geometry, envelopes, and heading-servo gains.
#[derive(Debug, Clone, Copy)]
pub struct DriveConfig {
    /// Module offsets from robot center, meters, canonical wheel order.
    pub module_offsets: [Translation2d; 4],
    /// Per-wheel speed envelope; desaturation scales to this.
    pub max_speed_mps: f64,
    /// Chassis rotation envelope, rad/s.
    pub max_angular_rad_per_s: f64,
    pub heading_kp: f64,
    pub heading_kd: f64,
    /// Default heading tolerance when a command does not supply one.
    pub heading_tolerance_rad: f64,
    pub fusion: FusionConfig,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            module_offsets: [
                Translation2d::new(0.3, 0.3),
                Translation2d::new(0.3, -0.3),
                Translation2d::new(-0.3, 0.3),
                Translation2d::new(-0.3, -0.3),
            ],
            max_speed_mps: 4.5,
            max_angular_rad_per_s: 3.0,
            heading_kp: 4.0,
            heading_kd: 0.0,
            heading_tolerance_rad: 0.05,
            fusion: FusionConfig::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DriveBase
// ────────────────────────────────────────────────────────────────────────────

/// The four-module swerve drivetrain as a single subsystem.
pub struct DriveBase {
    gyro: Box<dyn GyroIo>,
    gyro_inputs: GyroInputs,
    modules: [SwerveModule; 4],
    kinematics: SwerveKinematics,
    estimator: PoseEstimator,
    heading_pid: PidController,
    command: DriveCommand,
    config: DriveConfig,
    last_positions: [ModulePosition; 4],
    commanded_speeds: ChassisSpeeds,
    commanded_states: [ModuleState; 4],
    at_heading_target: bool,
}

impl DriveBase {
    pub fn new(gyro: Box<dyn GyroIo>, modules: [SwerveModule; 4], config: DriveConfig) -> Self {
        let mut heading_pid = PidController::new(config.heading_kp, 0.0, config.heading_kd);
        heading_pid.enable_continuous_input(-std::f64::consts::PI, std::f64::consts::PI);
        heading_pid.set_output_limits(-config.max_angular_rad_per_s, config.max_angular_rad_per_s);
        heading_pid.set_tolerance(config.heading_tolerance_rad);
        Self {
            gyro,
            gyro_inputs: GyroInputs::default(),
            modules,
            kinematics: SwerveKinematics::new(config.module_offsets),
            estimator: PoseEstimator::new(Pose2d::zero(), config.fusion),
            heading_pid,
            command: DriveCommand::Stop,
            config,
            last_positions: [ModulePosition::zero(); 4],
            commanded_speeds: ChassisSpeeds::zero(),
            commanded_states: [ModuleState::zero(); 4],
            at_heading_target: false,
        }
    }

    /// Replace the active command. Takes effect at the next `periodic`.
    pub fn set_command(&mut self, command: DriveCommand) {
        if command != self.command {
            self.heading_pid.reset();
            self.heading_pid
                .set_tolerance(match command {
                    DriveCommand::TurnToTarget { tolerance_rad, .. } => tolerance_rad,
                    _ => self.config.heading_tolerance_rad,
                });
            self.at_heading_target = false;
        }
        self.command = command;
    }

    /// Shorthand for commanding [`DriveCommand::Stop`].
    pub fn stop(&mut self) {
        self.set_command(DriveCommand::Stop);
    }

    pub fn command(&self) -> DriveCommand {
        self.command
    }

    /// One control period: sensors → odometry → command resolution → module
    /// dispatch.
    pub fn periodic(&mut self, now_s: f64, dt: f64) {
        // Sensor refresh, holding last known good on dropout.
        let mut fresh = GyroInputs::default();
        self.gyro.update_inputs(&mut fresh);
        if fresh.connected {
            self.gyro_inputs = fresh;
        } else {
            self.gyro_inputs.connected = false;
        }
        for module in &mut self.modules {
            module.periodic();
        }

        // Odometry from wheel deltas, heading from the gyro when present.
        let positions = [
            self.modules[0].position(),
            self.modules[1].position(),
            self.modules[2].position(),
            self.modules[3].position(),
        ];
        let mut deltas = [ModulePosition::zero(); 4];
        for i in 0..4 {
            deltas[i] = ModulePosition::new(
                positions[i].distance_m - self.last_positions[i].distance_m,
                positions[i].angle,
            );
        }
        self.last_positions = positions;
        let twist = self.kinematics.to_twist(&deltas);
        let gyro_yaw = self.gyro_inputs.connected.then_some(self.gyro_inputs.yaw);
        self.estimator.update_odometry(now_s, twist, gyro_yaw);

        // Resolve the active command into a body-frame chassis velocity.
        let speeds = match self.command {
            DriveCommand::Stop => {
                for module in &mut self.modules {
                    module.stop();
                }
                self.commanded_speeds = ChassisSpeeds::zero();
                self.commanded_states = [ModuleState::zero(); 4];
                return;
            }
            DriveCommand::Manual {
                speeds,
                field_relative,
            } => {
                if field_relative {
                    ChassisSpeeds::from_field_relative(
                        speeds.vx,
                        speeds.vy,
                        speeds.omega,
                        self.heading(),
                    )
                } else {
                    speeds
                }
            }
            DriveCommand::AutoAim { vx_mps, vy_mps, target } => {
                let omega = self.heading_servo_output(target, dt);
                ChassisSpeeds::from_field_relative(vx_mps, vy_mps, omega, self.heading())
            }
            DriveCommand::TurnToTarget { target, .. } => {
                let omega = self.heading_servo_output(target, dt);
                let omega = if self.at_heading_target { 0.0 } else { omega };
                ChassisSpeeds::new(0.0, 0.0, omega)
            }
        };

        let speeds = ChassisSpeeds::new(
            speeds.vx,
            speeds.vy,
            speeds
                .omega
                .clamp(-self.config.max_angular_rad_per_s, self.config.max_angular_rad_per_s),
        );

        let mut states = self.kinematics.to_module_states(speeds);
        SwerveKinematics::desaturate(&mut states, self.config.max_speed_mps);
        for (module, state) in self.modules.iter_mut().zip(states.iter()) {
            module.run_setpoint(*state, dt);
        }
        self.commanded_speeds = speeds;
        self.commanded_states = states;
    }

    fn heading_servo_output(&mut self, target: Translation2d, dt: f64) -> f64 {
        let pose = self.estimator.pose();
        let desired = (target - pose.translation).angle();
        self.heading_pid.set_set_point(desired.radians());
        let omega = self.heading_pid.update(pose.heading().radians(), dt);
        self.at_heading_target = self.heading_pid.at_set_point();
        omega
    }

    /// `true` once an aiming command's heading error is within tolerance.
    pub fn at_target(&self) -> bool {
        self.at_heading_target
    }

    /// Re-zero the gyro and the estimated heading, keeping translation.
    /// Operator-facing: "the way I'm facing now is forward".
    pub fn reset_heading(&mut self) {
        info!("resetting drivetrain heading to zero");
        self.gyro.set_yaw(Rotation2d::zero());
        self.gyro_inputs.yaw = Rotation2d::zero();
        let translation = self.estimator.pose().translation;
        self.estimator
            .reset(Pose2d::new(translation, Rotation2d::zero()));
    }

    /// Forward an asynchronous vision sample to the estimator.
    pub fn add_vision_observation(&mut self, observation: &VisionObservation) -> bool {
        self.estimator.add_vision(observation)
    }

    pub fn pose(&self) -> Pose2d {
        self.estimator.pose()
    }

    pub fn heading(&self) -> Rotation2d {
        self.estimator.pose().heading()
    }

    /// Chassis velocity dispatched this period (post-clamp, pre-desaturation).
    pub fn commanded_speeds(&self) -> ChassisSpeeds {
        self.commanded_speeds
    }

    /// Module states dispatched this period, for telemetry.
    pub fn commanded_states(&self) -> [ModuleState; 4] {
        self.commanded_states
    }

    /// Per-module temperature readings, labeled by wheel position.
    pub fn temperature_readings(&self) -> [(&'static str, TemperatureReading); 4] {
        let mut out = [("", TemperatureReading::new(0.0, f64::INFINITY)); 4];
        for (slot, module) in out.iter_mut().zip(self.modules.iter()) {
            *slot = (module.index().label(), module.temperature_reading());
        }
        out
    }

    /// `true` while any module motor is at or over its thermal limit.
    pub fn is_temperature_too_high(&self) -> bool {
        self.modules
            .iter()
            .any(|m| m.temperature_reading().is_over_limit())
    }

    pub fn is_gyro_connected(&self) -> bool {
        self.gyro_inputs.connected
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
