//! Backend binding: one [`OperatingMode`] decision selects every device's
//! backend at startup, and nothing downstream ever learns which one it got.
//!
//! Simulation and replay backends are built in-tree. Real-world drivers are
//! board-specific and live outside this workspace; the deployment binary
//! constructs a [`HardwareSet`] from its vendor drivers and hands it in.
//! Asking for [`OperatingMode::RealWorld`] without injected drivers is a
//! fatal misconfiguration, caught before the control loop starts.

use swervos_hal::replay::{
    ReplayGyro, ReplayMotor, ReplayPresenceSensor, ReplaySlot, ReplaySwerveModule,
};
use swervos_hal::sim::{
    SimGyro, SimGyroHandle, SimMotor, SimPresenceHandle, SimPresenceSensor, SimSwerveModule,
};
use swervos_hal::{
    GyroInputs, GyroIo, PresenceSensorInputs, PresenceSensorIo, SingleMotorInputs, SingleMotorIo,
    SwerveModuleInputs, SwerveModuleIo,
};
use swervos_types::{OperatingMode, RobotError};
use tracing::info;

/// The complete device complement of the robot, one backend per device.
pub struct HardwareSet {
    pub gyro: Box<dyn GyroIo>,
    /// Canonical wheel order: front-left, front-right, back-left, back-right.
    pub modules: [Box<dyn SwerveModuleIo>; 4],
    pub intake: Box<dyn SingleMotorIo>,
    pub feeder: Box<dyn SingleMotorIo>,
    pub flywheel: Box<dyn SingleMotorIo>,
    pub piece_sensor: Box<dyn PresenceSensorIo>,
}

impl std::fmt::Debug for HardwareSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HardwareSet").finish_non_exhaustive()
    }
}

/// Write-side handles for the simulation backends: the harness feeds the
/// commanded yaw rate back into the gyro and toggles piece presence.
#[derive(Clone, Default)]
pub struct SimHandles {
    pub gyro: SimGyroHandle,
    pub presence: SimPresenceHandle,
}

/// Write-side slots for the replay backends: the log loader streams recorded
/// snapshots into these each period.
#[derive(Clone, Default)]
pub struct ReplayHandles {
    pub gyro: ReplaySlot<GyroInputs>,
    pub modules: [ReplaySlot<SwerveModuleInputs>; 4],
    pub intake: ReplaySlot<SingleMotorInputs>,
    pub feeder: ReplaySlot<SingleMotorInputs>,
    pub flywheel: ReplaySlot<SingleMotorInputs>,
    pub piece_sensor: ReplaySlot<PresenceSensorInputs>,
}

/// Per-mode write-side handles accompanying a [`HardwareSet`].
pub enum BackendHandles {
    Sim(SimHandles),
    Replay(ReplayHandles),
}

impl std::fmt::Debug for BackendHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendHandles::Sim(_) => f.write_str("BackendHandles::Sim(..)"),
            BackendHandles::Replay(_) => f.write_str("BackendHandles::Replay(..)"),
        }
    }
}

/// Build the full device complement for `mode`.
///
/// # Errors
///
/// [`OperatingMode::RealWorld`] returns [`RobotError::Misconfiguration`]:
/// real drivers cannot be constructed here and must be injected by the
/// deployment binary.
pub fn bind_hardware(mode: OperatingMode) -> Result<(HardwareSet, BackendHandles), RobotError> {
    info!(%mode, "binding hardware backends");
    match mode {
        OperatingMode::Simulation => {
            let handles = SimHandles::default();
            let set = HardwareSet {
                gyro: Box::new(SimGyro::new(handles.gyro.clone())),
                modules: [
                    Box::new(SimSwerveModule::new()),
                    Box::new(SimSwerveModule::new()),
                    Box::new(SimSwerveModule::new()),
                    Box::new(SimSwerveModule::new()),
                ],
                intake: Box::new(SimMotor::new()),
                feeder: Box::new(SimMotor::new()),
                flywheel: Box::new(SimMotor::new()),
                piece_sensor: Box::new(SimPresenceSensor::new(handles.presence.clone())),
            };
            Ok((set, BackendHandles::Sim(handles)))
        }
        OperatingMode::LogReplay => {
            let handles = ReplayHandles::default();
            let set = HardwareSet {
                gyro: Box::new(ReplayGyro::new(handles.gyro.clone())),
                modules: [
                    Box::new(ReplaySwerveModule::new(handles.modules[0].clone())),
                    Box::new(ReplaySwerveModule::new(handles.modules[1].clone())),
                    Box::new(ReplaySwerveModule::new(handles.modules[2].clone())),
                    Box::new(ReplaySwerveModule::new(handles.modules[3].clone())),
                ],
                intake: Box::new(ReplayMotor::new(handles.intake.clone())),
                feeder: Box::new(ReplayMotor::new(handles.feeder.clone())),
                flywheel: Box::new(ReplayMotor::new(handles.flywheel.clone())),
                piece_sensor: Box::new(ReplayPresenceSensor::new(handles.piece_sensor.clone())),
            };
            Ok((set, BackendHandles::Replay(handles)))
        }
        OperatingMode::RealWorld => Err(RobotError::Misconfiguration(
            "real-world drivers are board-specific and must be injected by the deployment binary"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swervos_types::Rotation2d;

    #[test]
    fn simulation_mode_binds_live_backends() {
        let (mut set, handles) = bind_hardware(OperatingMode::Simulation).unwrap();
        let BackendHandles::Sim(sim) = handles else {
            panic!("expected sim handles");
        };

        sim.gyro.set_yaw_rate(1.0);
        let mut inputs = GyroInputs::default();
        set.gyro.update_inputs(&mut inputs);
        assert!(inputs.connected);
        assert!(inputs.yaw.radians() > 0.0);

        sim.presence.set_detected(true);
        let mut presence = PresenceSensorInputs::default();
        set.piece_sensor.update_inputs(&mut presence);
        assert!(presence.detected);
    }

    #[test]
    fn replay_mode_binds_inert_backends() {
        let (mut set, handles) = bind_hardware(OperatingMode::LogReplay).unwrap();
        let BackendHandles::Replay(replay) = handles else {
            panic!("expected replay handles");
        };

        replay.gyro.write(GyroInputs {
            yaw: Rotation2d::from_degrees(30.0),
            yaw_velocity_rad_per_s: 0.0,
            connected: true,
        });
        let mut inputs = GyroInputs::default();
        set.gyro.update_inputs(&mut inputs);
        assert!((inputs.yaw.degrees() - 30.0).abs() < 1e-9);

        // Replay devices never trip thermal interlocks.
        assert!(set.modules[0].max_safe_temperature_c().is_infinite());
        assert!(set.flywheel.max_safe_temperature_c().is_infinite());
    }

    #[test]
    fn real_world_without_injected_drivers_is_fatal() {
        let err = bind_hardware(OperatingMode::RealWorld).unwrap_err();
        assert!(matches!(err, RobotError::Misconfiguration(_)));
    }
}
