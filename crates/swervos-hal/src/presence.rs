//! Binary game-piece presence sensor contract.

/// Input snapshot refreshed once per control period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PresenceSensorInputs {
    /// `true` while a game piece is in front of the sensor.
    pub detected: bool,
    /// `false` while the sensor is unreachable; callers hold the last
    /// detection state rather than treating a dropout as "cleared".
    pub connected: bool,
}

/// A binary object-presence sensor (beam break, limit switch, proximity).
pub trait PresenceSensorIo: Send {
    /// Refresh `inputs` from the device. Must never block.
    fn update_inputs(&mut self, inputs: &mut PresenceSensorInputs);
}
