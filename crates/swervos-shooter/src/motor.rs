//! One-axis actuator subsystem with a built-in thermal interlock.

use swervos_hal::{SingleMotorInputs, SingleMotorIo};
use swervos_types::TemperatureReading;
use tracing::{debug, warn};

/// A single named actuator (intake, feeder, flywheel).
///
/// Commands set a *desired* output; [`SingleMotorSubsystem::periodic`]
/// refreshes inputs, re-evaluates the thermal interlock, and writes the
/// output once per control period. While the motor is over its safe
/// temperature the subsystem forces zero output and rejects run commands;
/// the interlock is level-triggered and releases the cycle the motor cools.
pub struct SingleMotorSubsystem {
    name: &'static str,
    io: Box<dyn SingleMotorIo>,
    inputs: SingleMotorInputs,
    forward_voltage: f64,
    reverse_voltage: f64,
    commanded_volts: f64,
    interlocked: bool,
}

impl SingleMotorSubsystem {
    pub fn new(
        name: &'static str,
        io: Box<dyn SingleMotorIo>,
        forward_voltage: f64,
        reverse_voltage: f64,
    ) -> Self {
        Self {
            name,
            io,
            inputs: SingleMotorInputs::default(),
            forward_voltage,
            reverse_voltage,
            commanded_volts: 0.0,
            interlocked: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run at the configured forward voltage. Rejected (logged, no effect)
    /// while the thermal interlock holds.
    pub fn run_forward(&mut self) {
        if self.interlocked {
            debug!(subsystem = self.name, "run_forward rejected: thermal interlock");
            return;
        }
        self.commanded_volts = self.forward_voltage;
    }

    /// Run at the configured reverse voltage. Rejected while interlocked.
    pub fn run_reverse(&mut self) {
        if self.interlocked {
            debug!(subsystem = self.name, "run_reverse rejected: thermal interlock");
            return;
        }
        self.commanded_volts = self.reverse_voltage;
    }

    /// Stop. Always accepted, interlocked or not.
    pub fn stop(&mut self) {
        self.commanded_volts = 0.0;
    }

    /// Read inputs, re-evaluate the interlock, and write this period's
    /// output voltage.
    pub fn periodic(&mut self) {
        let mut fresh = SingleMotorInputs::default();
        self.io.update_inputs(&mut fresh);
        if fresh.connected {
            self.inputs = fresh;
        } else {
            // Hold last known good values; only the connected flag updates.
            self.inputs.connected = false;
        }

        let was_interlocked = self.interlocked;
        self.interlocked = self.inputs.temperature_c >= self.io.max_safe_temperature_c();
        if self.interlocked {
            if !was_interlocked {
                warn!(
                    subsystem = self.name,
                    celsius = self.inputs.temperature_c,
                    "thermal interlock engaged, forcing stop"
                );
            }
            self.commanded_volts = 0.0;
        }

        self.io.set_voltage(self.commanded_volts);
    }

    /// `true` while the thermal interlock is holding this subsystem stopped.
    pub fn is_interlocked(&self) -> bool {
        self.interlocked
    }

    /// This period's reading for the thermal monitor.
    pub fn temperature_reading(&self) -> TemperatureReading {
        TemperatureReading::new(self.inputs.temperature_c, self.io.max_safe_temperature_c())
    }

    /// Voltage that will be written this period.
    pub fn commanded_volts(&self) -> f64 {
        self.commanded_volts
    }

    pub fn velocity_rpm(&self) -> f64 {
        self.inputs.velocity_rpm
    }

    pub fn is_connected(&self) -> bool {
        self.inputs.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swervos_hal::sim::SimMotor;

    fn intake() -> SingleMotorSubsystem {
        SingleMotorSubsystem::new("intake", Box::new(SimMotor::new()), 6.0, -6.0)
    }

    #[test]
    fn forward_reverse_stop_set_commanded_voltage() {
        let mut motor = intake();
        motor.run_forward();
        assert!((motor.commanded_volts() - 6.0).abs() < f64::EPSILON);

        motor.run_reverse();
        assert!((motor.commanded_volts() + 6.0).abs() < f64::EPSILON);

        motor.stop();
        assert_eq!(motor.commanded_volts(), 0.0);
    }

    #[test]
    fn interlock_forces_stop_within_one_period() {
        let mut sim = SimMotor::new();
        sim.set_temperature_c(95.0); // over the 70 °C limit
        let mut motor = SingleMotorSubsystem::new("flywheel", Box::new(sim), 9.0, -6.0);

        motor.run_forward();
        motor.periodic();

        assert!(motor.is_interlocked());
        assert_eq!(motor.commanded_volts(), 0.0);
        assert!(motor.temperature_reading().is_over_limit());
    }

    #[test]
    fn interlock_rejects_run_commands_until_cool() {
        let mut sim = SimMotor::new();
        sim.set_temperature_c(95.0);
        let mut motor = SingleMotorSubsystem::new("feeder", Box::new(sim), 6.0, -6.0);
        motor.periodic();
        assert!(motor.is_interlocked());

        motor.run_forward();
        assert_eq!(motor.commanded_volts(), 0.0);

        // stop() is always accepted.
        motor.stop();
        assert_eq!(motor.commanded_volts(), 0.0);
    }

    #[test]
    fn interlock_self_clears_when_temperature_drops() {
        // SimMotor's temperature is fixed at construction, so model the
        // cool-down with two separate periodic evaluations.
        let mut hot = SimMotor::new();
        hot.set_temperature_c(95.0);
        let mut motor = SingleMotorSubsystem::new("intake", Box::new(hot), 6.0, -6.0);
        motor.periodic();
        assert!(motor.is_interlocked());

        let mut cool = SimMotor::new();
        cool.set_temperature_c(40.0);
        let mut motor = SingleMotorSubsystem::new("intake", Box::new(cool), 6.0, -6.0);
        motor.periodic();
        assert!(!motor.is_interlocked());
        motor.run_forward();
        motor.periodic();
        assert!((motor.commanded_volts() - 6.0).abs() < f64::EPSILON);
    }
}
