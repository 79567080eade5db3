//! Shared data model for the SwervOS control stack.
//!
//! Everything here is plain data: geometry primitives, the process-wide
//! operating mode, thermal readings, vision samples, LED directives, and the
//! event envelope routed over the telemetry bus. Behavior lives in the
//! downstream crates (`swervos-hal`, `swervos-drive`, …).

pub mod geometry;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use geometry::{
    ChassisSpeeds, ModulePosition, ModuleState, Pose2d, Rotation2d, Translation2d, Twist2d,
};

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Global error type for genuinely fatal conditions.
///
/// Expected runtime conditions (sensor disconnection, staleness, thermal
/// overlimit) are *state* carried in input snapshots and re-evaluated every
/// cycle; they never surface as errors.
#[derive(Error, Debug)]
pub enum RobotError {
    #[error("Hardware fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("Channel error: {0}")]
    Channel(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Operating mode
// ────────────────────────────────────────────────────────────────────────────

/// Process-wide backend selection, chosen exactly once at startup.
///
/// Every hardware interface binds to the backend implied by this mode;
/// mixing backends across modes is not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Physical robot: drivers talk to real devices.
    RealWorld,
    /// Physics simulation: drivers integrate commanded outputs.
    Simulation,
    /// Log replay: drivers are inert, inputs repopulated from a recording.
    LogReplay,
}

impl FromStr for OperatingMode {
    type Err = RobotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "real_world" | "real" => Ok(OperatingMode::RealWorld),
            "simulation" | "sim" => Ok(OperatingMode::Simulation),
            "log_replay" | "replay" => Ok(OperatingMode::LogReplay),
            other => Err(RobotError::Misconfiguration(format!(
                "unknown operating mode '{other}' (expected real_world, simulation, or log_replay)"
            ))),
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::RealWorld => write!(f, "real_world"),
            OperatingMode::Simulation => write!(f, "simulation"),
            OperatingMode::LogReplay => write!(f, "log_replay"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wheel module index
// ────────────────────────────────────────────────────────────────────────────

/// Fixed geometric identity of each swerve module. Offsets from robot center
/// live in the chassis configuration and never change at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelModuleIndex {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl WheelModuleIndex {
    /// Canonical ordering used for every `[T; 4]` module array in the stack.
    pub const ALL: [WheelModuleIndex; 4] = [
        WheelModuleIndex::FrontLeft,
        WheelModuleIndex::FrontRight,
        WheelModuleIndex::BackLeft,
        WheelModuleIndex::BackRight,
    ];

    /// Position of this module in the canonical array ordering.
    pub fn as_index(&self) -> usize {
        match self {
            WheelModuleIndex::FrontLeft => 0,
            WheelModuleIndex::FrontRight => 1,
            WheelModuleIndex::BackLeft => 2,
            WheelModuleIndex::BackRight => 3,
        }
    }

    /// Stable label used in log fields and telemetry.
    pub fn label(&self) -> &'static str {
        match self {
            WheelModuleIndex::FrontLeft => "front_left",
            WheelModuleIndex::FrontRight => "front_right",
            WheelModuleIndex::BackLeft => "back_left",
            WheelModuleIndex::BackRight => "back_right",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Thermal readings
// ────────────────────────────────────────────────────────────────────────────

/// A per-actuator temperature sample paired with its safe limit.
///
/// Crossing the limit is level-triggered: the over-limit condition holds for
/// exactly as long as the measured value stays at or above the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub celsius: f64,
    pub max_safe_celsius: f64,
}

impl TemperatureReading {
    pub fn new(celsius: f64, max_safe_celsius: f64) -> Self {
        Self {
            celsius,
            max_safe_celsius,
        }
    }

    /// `true` while the measured temperature is at or above the safe limit.
    pub fn is_over_limit(&self) -> bool {
        self.celsius >= self.max_safe_celsius
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Vision observations
// ────────────────────────────────────────────────────────────────────────────

/// An absolute pose sample from a camera backend.
///
/// Produced asynchronously, timestamp-tagged so the estimator can order it
/// against odometry, and consumed exactly once. Smaller standard deviations
/// mean higher trust and a stronger correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionObservation {
    pub pose: Pose2d,
    /// Capture time on the shared monotonic clock, seconds.
    pub timestamp_s: f64,
    /// Translation uncertainty, meters (1σ).
    pub std_dev_translation_m: f64,
    /// Heading uncertainty, radians (1σ).
    pub std_dev_rotation_rad: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// LED directives
// ────────────────────────────────────────────────────────────────────────────

/// An RGB color for the indicator strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LedColor {
    pub const BLACK: LedColor = LedColor { r: 0, g: 0, b: 0 };
    pub const RED: LedColor = LedColor { r: 255, g: 0, b: 0 };
    pub const GREEN: LedColor = LedColor { r: 0, g: 255, b: 0 };
    pub const ORANGE: LedColor = LedColor {
        r: 255,
        g: 110,
        b: 0,
    };
    pub const ALLIANCE_BLUE: LedColor = LedColor { r: 0, g: 64, b: 255 };
    pub const ALLIANCE_RED: LedColor = LedColor { r: 255, g: 16, b: 16 };
}

/// Which alliance the robot is playing for this match. Selects the idle
/// indicator color and the field-forward convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alliance {
    Red,
    Blue,
}

impl Alliance {
    pub fn color(&self) -> LedColor {
        match self {
            Alliance::Red => LedColor::ALLIANCE_RED,
            Alliance::Blue => LedColor::ALLIANCE_BLUE,
        }
    }
}

/// A fire-and-forget directive for the indicator collaborator.
///
/// The core emits directives; pattern rendering happens outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedPattern {
    /// Whole strip one color.
    Solid(LedColor),
    /// Repeating multi-pixel pattern, stationary.
    Static(Vec<LedColor>),
    /// Repeating multi-pixel pattern, animated/blinking.
    Blink(Vec<LedColor>),
}

// ────────────────────────────────────────────────────────────────────────────
// Event bus envelope
// ────────────────────────────────────────────────────────────────────────────

/// Unified event wrapper routed over the telemetry bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"swervos-runtime::robot"`.
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Convenience constructor stamping a fresh id and the current wall time.
    pub fn now(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data routed over the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// One per-period input/output snapshot, published for logging/replay.
    Telemetry(TelemetrySnapshot),
    /// An asynchronous absolute pose sample from a camera backend.
    Vision(VisionObservation),
    /// An indicator directive from the safety monitor or sequencer.
    Alert(LedPattern),
    HardwareFault {
        component: String,
        code: u32,
        message: String,
    },
}

/// The per-period state snapshot published by the robot orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub timestamp_s: f64,
    pub pose: Pose2d,
    pub commanded_speeds: ChassisSpeeds,
    pub module_states: [ModuleState; 4],
    /// Sequencer state label, e.g. `"shooting:feed"`.
    pub sequencer_state: String,
    pub over_temperature: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operating_mode_parses_known_values() {
        assert_eq!(
            "simulation".parse::<OperatingMode>().unwrap(),
            OperatingMode::Simulation
        );
        assert_eq!(
            "replay".parse::<OperatingMode>().unwrap(),
            OperatingMode::LogReplay
        );
        assert_eq!(
            "real_world".parse::<OperatingMode>().unwrap(),
            OperatingMode::RealWorld
        );
    }

    #[test]
    fn operating_mode_rejects_unknown_value() {
        let err = "moon_mode".parse::<OperatingMode>().unwrap_err();
        assert!(err.to_string().contains("moon_mode"));
    }

    #[test]
    fn wheel_index_ordering_is_stable() {
        for (i, idx) in WheelModuleIndex::ALL.iter().enumerate() {
            assert_eq!(idx.as_index(), i);
        }
    }

    #[test]
    fn temperature_over_limit_is_level_triggered() {
        let hot = TemperatureReading::new(90.0, 80.0);
        assert!(hot.is_over_limit());

        let boundary = TemperatureReading::new(80.0, 80.0);
        assert!(boundary.is_over_limit());

        let cool = TemperatureReading::new(79.9, 80.0);
        assert!(!cool.is_over_limit());
    }

    #[test]
    fn vision_observation_roundtrip() {
        let obs = VisionObservation {
            pose: Pose2d::from_xy_heading(1.0, 2.0, Rotation2d::from_degrees(45.0)),
            timestamp_s: 12.5,
            std_dev_translation_m: 0.1,
            std_dev_rotation_rad: 0.05,
        };
        let json = serde_json::to_string(&obs).unwrap();
        let back: VisionObservation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, back);
    }

    #[test]
    fn event_roundtrip() {
        let event = Event::now(
            "swervos-safety::thermal",
            EventPayload::Alert(LedPattern::Blink(vec![LedColor::RED, LedColor::BLACK])),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, back.id);
        assert_eq!(event.source, back.source);
    }

    #[test]
    fn robot_error_display() {
        let err = RobotError::HardwareFault {
            component: "front_left".to_string(),
            details: "steer encoder offline".to_string(),
        };
        assert!(err.to_string().contains("front_left"));

        let err2 = RobotError::Misconfiguration("missing chassis geometry".to_string());
        assert!(err2.to_string().contains("Misconfiguration"));
    }
}
