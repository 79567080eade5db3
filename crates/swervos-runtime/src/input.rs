//! Operator intent for one control period.
//!
//! The orchestrator consumes an [`OperatorInput`] snapshot every tick and
//! shapes the stick axes into a chassis velocity: deadband first, then
//! square the remaining magnitude for fine low-speed control, then scale to
//! the configured envelopes.

use swervos_drive::DriveCommand;
use swervos_types::{ChassisSpeeds, Translation2d};

use crate::config::RobotConfig;

/// Everything the operator is asking for this period. Axes are in
/// `[-1, 1]`; buttons are level-sampled (`true` while held) except where
/// noted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OperatorInput {
    /// Field-forward translation axis.
    pub drive_x: f64,
    /// Field-left translation axis.
    pub drive_y: f64,
    /// CCW rotation axis.
    pub rotate: f64,
    /// Interpret translation axes in the field frame.
    pub field_relative: bool,
    /// While held, servo the heading onto `aim_target`.
    pub aim: bool,
    /// Field-frame point for `aim`.
    pub aim_target: Translation2d,
    /// Edge-sampled: re-zero the heading this period.
    pub reset_heading: bool,
    /// While held, run the intake until a piece seats.
    pub intake: bool,
    /// Start the shoot sequence on the press edge; holding it does not
    /// restart the sequence.
    pub shoot: bool,
    /// While held, reverse all game-piece actuators.
    pub reverse: bool,
}

impl OperatorInput {
    /// Resolve the drive-related intent into a [`DriveCommand`].
    pub fn drive_command(&self, config: &RobotConfig) -> DriveCommand {
        let vx = shape_axis(self.drive_x, config.input.deadband) * config.chassis.max_speed_mps;
        let vy = shape_axis(self.drive_y, config.input.deadband) * config.chassis.max_speed_mps;
        let omega =
            shape_axis(self.rotate, config.input.deadband) * config.chassis.max_angular_rad_per_s;

        if self.aim {
            DriveCommand::AutoAim {
                vx_mps: vx,
                vy_mps: vy,
                target: self.aim_target,
            }
        } else {
            DriveCommand::Manual {
                speeds: ChassisSpeeds::new(vx, vy, omega),
                field_relative: self.field_relative,
            }
        }
    }
}

/// Deadband then square, preserving sign. The deadband is rescaled out so
/// output is continuous at the deadband edge.
fn shape_axis(value: f64, deadband: f64) -> f64 {
    let value = value.clamp(-1.0, 1.0);
    if value.abs() < deadband {
        return 0.0;
    }
    let scaled = (value.abs() - deadband) / (1.0 - deadband);
    scaled * scaled * value.signum()
}
