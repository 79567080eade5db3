//! `swervos-estimation` – swerve kinematics and pose estimation.
//!
//! - [`kinematics`] – [`SwerveKinematics`][kinematics::SwerveKinematics]:
//!   forward kinematics (chassis velocity → four module states), inverse
//!   kinematics (module odometry deltas → body twist), and shape-preserving
//!   wheel-speed desaturation.
//! - [`estimator`] – [`PoseEstimator`][estimator::PoseEstimator]:
//!   dead-reckoning odometry integration with gyro-authoritative heading,
//!   corrected by asynchronous, trust-weighted vision observations.

pub mod estimator;
pub mod kinematics;

pub use estimator::{FusionConfig, PoseEstimator};
pub use kinematics::SwerveKinematics;
