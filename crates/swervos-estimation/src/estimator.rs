//! Fused pose estimation.
//!
//! [`PoseEstimator`] is the sole owner and writer of the robot's
//! best-estimate pose. It combines two inputs:
//!
//! - **Wheel odometry**, every control period: a body-frame twist integrated
//!   via the pose exponential. When a connected gyro yaw is available its
//!   delta replaces the wheel-derived rotation, because wheel slip corrupts
//!   heading far faster than translation.
//! - **Vision corrections**, asynchronous and low-frequency: absolute pose
//!   samples blended toward with a trust weight derived from the sample's
//!   standard deviation. Out-of-order and stale samples are discarded and
//!   logged, never applied.
//!
//! The estimate is continuous; the only discontinuous jump is an explicit
//! [`PoseEstimator::reset`].

use swervos_types::{Pose2d, Rotation2d, Twist2d, VisionObservation};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tunable vision-fusion parameters.
///
/// The correction weight for a sample with standard deviation `σ` is
/// `gain / (gain + σ)`: a sample with `σ = gain` moves the estimate halfway,
/// `σ → 0` snaps to the observation, large `σ` barely nudges it. The
/// defaults below are starting points and should be re-tuned against
/// recorded field data.
#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
    /// Gain for translation blending, meters.
    pub translation_gain_m: f64,
    /// Gain for heading blending, radians.
    pub rotation_gain_rad: f64,
    /// Samples older than the current estimate by more than this are dropped.
    pub max_sample_age_s: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            translation_gain_m: 0.1,
            rotation_gain_rad: 0.1,
            max_sample_age_s: 0.5,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PoseEstimator
// ────────────────────────────────────────────────────────────────────────────

/// Sample-then-correct pose filter: odometry for high-frequency
/// dead-reckoning, vision for low-frequency drift correction.
#[derive(Debug)]
pub struct PoseEstimator {
    pose: Pose2d,
    timestamp_s: f64,
    last_gyro_yaw: Option<Rotation2d>,
    last_vision_timestamp_s: Option<f64>,
    config: FusionConfig,
}

impl PoseEstimator {
    pub fn new(initial_pose: Pose2d, config: FusionConfig) -> Self {
        Self {
            pose: initial_pose,
            timestamp_s: 0.0,
            last_gyro_yaw: None,
            last_vision_timestamp_s: None,
            config,
        }
    }

    /// Current best-estimate pose.
    pub fn pose(&self) -> Pose2d {
        self.pose
    }

    /// Timestamp of the most recent odometry integration, seconds.
    pub fn timestamp_s(&self) -> f64 {
        self.timestamp_s
    }

    /// Integrate one control period of wheel odometry.
    ///
    /// `twist` is the body-frame displacement derived from inverse
    /// kinematics. When `gyro_yaw` is present (gyro connected), its delta
    /// since the previous cycle replaces `twist.dtheta`; wheel odometry then
    /// only supplies translation. A gyro dropout falls back to wheel-derived
    /// rotation and re-seeds the gyro delta on reconnect.
    pub fn update_odometry(&mut self, timestamp_s: f64, twist: Twist2d, gyro_yaw: Option<Rotation2d>) {
        let mut applied = twist;
        match gyro_yaw {
            Some(yaw) => {
                if let Some(prev) = self.last_gyro_yaw {
                    applied.dtheta = (yaw - prev).radians();
                }
                self.last_gyro_yaw = Some(yaw);
            }
            None => {
                self.last_gyro_yaw = None;
            }
        }
        self.pose = self.pose.exp(applied);
        self.timestamp_s = timestamp_s;
    }

    /// Apply one vision correction.
    ///
    /// Returns `true` when the sample was accepted. Samples that are
    /// out-of-order with respect to the last applied correction, or older
    /// than the estimate by more than the staleness threshold, are discarded.
    pub fn add_vision(&mut self, observation: &VisionObservation) -> bool {
        if let Some(last) = self.last_vision_timestamp_s {
            if observation.timestamp_s <= last {
                debug!(
                    sample_ts = observation.timestamp_s,
                    last_applied_ts = last,
                    "discarding out-of-order vision sample"
                );
                return false;
            }
        }
        if self.timestamp_s - observation.timestamp_s > self.config.max_sample_age_s {
            debug!(
                sample_ts = observation.timestamp_s,
                estimate_ts = self.timestamp_s,
                "discarding stale vision sample"
            );
            return false;
        }

        let w_t = self.config.translation_gain_m
            / (self.config.translation_gain_m + observation.std_dev_translation_m.max(0.0));
        let w_r = self.config.rotation_gain_rad
            / (self.config.rotation_gain_rad + observation.std_dev_rotation_rad.max(0.0));

        self.pose = Pose2d::new(
            self.pose
                .translation
                .interpolate(observation.pose.translation, w_t),
            self.pose.rotation.interpolate(observation.pose.rotation, w_r),
        );
        self.last_vision_timestamp_s = Some(observation.timestamp_s);
        true
    }

    /// Discontinuously re-seed the estimate (operator zero-heading or
    /// autonomous init). Vision ordering restarts from here.
    pub fn reset(&mut self, pose: Pose2d) {
        self.pose = pose;
        self.last_vision_timestamp_s = None;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
