//! Generic PID (Proportional–Integral–Derivative) controller.
//!
//! The controller computes a corrective output that drives a measured value
//! toward a desired set-point. It is deliberately hardware-agnostic: the
//! caller supplies the measurement and elapsed time, and receives the
//! computed output which it can apply to any actuator.
//!
//! Steering loops enable *continuous input* so the error across the ±π seam
//! is the short way around; without it a wheel at 179° commanded to -179°
//! would spin nearly a full turn.
//!
//! # Example
//!
//! ```rust
//! use swervos_hal::pid::PidController;
//!
//! let mut pid = PidController::new(1.0, 0.1, 0.05);
//! pid.set_set_point(1.5); // target angle in radians or any unit
//!
//! let output = pid.update(0.0, 0.02); // measurement=0, dt=20 ms
//! assert!(output > 0.0); // controller drives measurement toward set-point
//! ```

/// A tunable PID controller for closed-loop feedback control.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    set_point: f64,
    integral: f64,
    last_error: Option<f64>,
    output_min: f64,
    output_max: f64,
    /// When set, errors wrap so they never exceed half this range.
    continuous_range: Option<f64>,
    tolerance: f64,
    last_applied_error: f64,
}

impl PidController {
    /// Create a new controller with the given gains.
    ///
    /// Output is unclamped by default and input is non-continuous.
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            set_point: 0.0,
            integral: 0.0,
            last_error: None,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
            continuous_range: None,
            tolerance: 0.0,
            last_applied_error: f64::INFINITY,
        }
    }

    /// Update the proportional, integral, and derivative gains.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Change the desired set-point value.
    pub fn set_set_point(&mut self, set_point: f64) {
        self.set_point = set_point;
    }

    /// Return the current set-point.
    pub fn set_point(&self) -> f64 {
        self.set_point
    }

    /// Clamp the controller output to `[min, max]`.
    ///
    /// Integral wind-up is also clamped to this range.
    pub fn set_output_limits(&mut self, min: f64, max: f64) {
        self.output_min = min;
        self.output_max = max;
    }

    /// Treat the input as circular over `[min, max)`, e.g. `(-π, π)` for a
    /// steering angle, so errors wrap across the seam.
    pub fn enable_continuous_input(&mut self, min: f64, max: f64) {
        self.continuous_range = Some(max - min);
    }

    /// Set the absolute error below which [`PidController::at_set_point`]
    /// reports true.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    /// `true` when the most recent update saw an error within tolerance.
    pub fn at_set_point(&self) -> bool {
        self.last_applied_error.abs() <= self.tolerance
    }

    /// Compute the next controller output.
    ///
    /// - `measurement` – the current measured value of the process variable.
    /// - `dt` – elapsed time since the last call, in seconds (must be > 0).
    ///
    /// Returns the clamped control output. Returns `0.0` without updating
    /// internal state if `dt` is not positive.
    pub fn update(&mut self, measurement: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }

        let mut error = self.set_point - measurement;
        if let Some(range) = self.continuous_range {
            error = error.rem_euclid(range);
            if error > range / 2.0 {
                error -= range;
            }
        }
        self.last_applied_error = error;

        // Proportional term.
        let p = self.kp * error;

        // Integral term with anti-windup clamping.
        self.integral += error * dt;
        let i_raw = self.ki * self.integral;
        let i = i_raw.clamp(self.output_min, self.output_max);
        // Back-calculate integral to prevent wind-up beyond limits.
        if self.ki.abs() > f64::EPSILON {
            self.integral = i / self.ki;
        }

        // Derivative term (backward difference).
        let d = match self.last_error {
            Some(prev) => self.kd * (error - prev) / dt,
            None => 0.0,
        };
        self.last_error = Some(error);

        (p + i + d).clamp(self.output_min, self.output_max)
    }

    /// Reset internal state (integral accumulator and derivative memory).
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
        self.last_applied_error = f64::INFINITY;
    }
}
