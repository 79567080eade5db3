//! [`ThermalMonitor`] – per-subsystem overheat condition.
//!
//! Every actuator-bearing subsystem reports its hottest measured temperature
//! once per control period via [`ThermalMonitor::report`]. The over-limit
//! condition is *level-triggered*: it is recomputed from the latest reading,
//! never latched, so it self-clears the cycle the temperature drops below
//! the threshold. While the condition holds, the runtime interlock forces
//! the owning subsystem to its stopped state; one over-limit cycle is enough
//! to trip it, deliberately without debounce.

use std::collections::HashMap;

use swervos_types::TemperatureReading;
use tracing::warn;

/// Tracks the most recent [`TemperatureReading`] per named subsystem.
#[derive(Debug, Default)]
pub struct ThermalMonitor {
    readings: HashMap<String, TemperatureReading>,
}

impl ThermalMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this cycle's reading for `subsystem`, replacing the previous
    /// one. Logs a warning for as long as the reading is over limit.
    pub fn report(&mut self, subsystem: &str, reading: TemperatureReading) {
        if reading.is_over_limit() {
            warn!(
                subsystem,
                celsius = reading.celsius,
                max_safe = reading.max_safe_celsius,
                "subsystem over thermal limit"
            );
        }
        self.readings.insert(subsystem.to_string(), reading);
    }

    /// `true` while `subsystem`'s latest reading is at or above its limit.
    /// Unknown subsystems are not over limit.
    pub fn is_over_limit(&self, subsystem: &str) -> bool {
        self.readings
            .get(subsystem)
            .is_some_and(|r| r.is_over_limit())
    }

    /// `true` while any reported subsystem is over limit.
    pub fn any_over_limit(&self) -> bool {
        self.readings.values().any(|r| r.is_over_limit())
    }

    /// Names of all currently over-limit subsystems, unordered.
    pub fn over_limit_subsystems(&self) -> Vec<String> {
        self.readings
            .iter()
            .filter(|(_, r)| r.is_over_limit())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_subsystem_is_not_over_limit() {
        let monitor = ThermalMonitor::new();
        assert!(!monitor.is_over_limit("flywheel"));
        assert!(!monitor.any_over_limit());
    }

    #[test]
    fn over_limit_is_level_triggered_not_latched() {
        let mut monitor = ThermalMonitor::new();

        monitor.report("flywheel", TemperatureReading::new(75.0, 70.0));
        assert!(monitor.is_over_limit("flywheel"));
        assert!(monitor.any_over_limit());

        // Condition self-clears on the first cool reading.
        monitor.report("flywheel", TemperatureReading::new(65.0, 70.0));
        assert!(!monitor.is_over_limit("flywheel"));
        assert!(!monitor.any_over_limit());

        // And re-trips just as readily.
        monitor.report("flywheel", TemperatureReading::new(70.0, 70.0));
        assert!(monitor.is_over_limit("flywheel"));
    }

    #[test]
    fn subsystems_are_tracked_independently() {
        let mut monitor = ThermalMonitor::new();
        monitor.report("intake", TemperatureReading::new(90.0, 70.0));
        monitor.report("feeder", TemperatureReading::new(40.0, 70.0));

        assert!(monitor.is_over_limit("intake"));
        assert!(!monitor.is_over_limit("feeder"));

        let over = monitor.over_limit_subsystems();
        assert_eq!(over, vec!["intake".to_string()]);
    }
}
