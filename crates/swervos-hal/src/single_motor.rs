//! Single-axis motor contract (intake, feeder, flywheel).

/// Input snapshot refreshed once per control period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SingleMotorInputs {
    /// Voltage actually applied by the controller.
    pub applied_output_v: f64,
    pub current_a: f64,
    pub temperature_c: f64,
    pub velocity_rpm: f64,
    /// Raw controller fault bitfield, logged for diagnostics.
    pub fault_flags: u32,
    /// `false` while the controller is unreachable.
    pub connected: bool,
}

/// A one-axis motor commanded by open-loop voltage.
pub trait SingleMotorIo: Send {
    /// Apply an output voltage. Zero stops the motor.
    fn set_voltage(&mut self, volts: f64);

    /// Refresh `inputs` from the device. Must never block.
    fn update_inputs(&mut self, inputs: &mut SingleMotorInputs);

    /// The motor temperature at which this subsystem must stop, °C.
    fn max_safe_temperature_c(&self) -> f64;
}
