//! Robot configuration: one TOML document, parsed and validated once at
//! startup. A bad value is fatal before the control loop starts; nothing in
//! here is re-read at runtime.

use serde::{Deserialize, Serialize};
use swervos_drive::{DriveConfig, ModuleGains};
use swervos_estimation::FusionConfig;
use swervos_shooter::SequencerConfig;
use swervos_types::{Alliance, OperatingMode, RobotError, Translation2d};

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Backend selection: `real_world`, `simulation`, or `log_replay`.
    pub mode: OperatingMode,
    /// Match alliance: `red` or `blue`. Picks the idle indicator color.
    pub alliance: Alliance,
    pub chassis: ChassisConfig,
    pub module: ModuleConfig,
    pub heading: HeadingConfig,
    pub fusion: FusionSection,
    pub shooter: ShooterConfig,
    pub input: InputConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::Simulation,
            alliance: Alliance::Blue,
            chassis: ChassisConfig::default(),
            module: ModuleConfig::default(),
            heading: HeadingConfig::default(),
            fusion: FusionSection::default(),
            shooter: ShooterConfig::default(),
            input: InputConfig::default(),
        }
    }
}

/// Chassis geometry and velocity envelopes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisConfig {
    /// Lateral distance between left and right module centers, meters.
    pub track_width_m: f64,
    /// Longitudinal distance between front and back module centers, meters.
    pub wheel_base_m: f64,
    pub max_speed_mps: f64,
    pub max_angular_rad_per_s: f64,
}

impl Default for ChassisConfig {
    fn default() -> Self {
        Self {
            track_width_m: 0.6,
            wheel_base_m: 0.6,
            max_speed_mps: 4.5,
            max_angular_rad_per_s: 3.0,
        }
    }
}

/// Per-module closed-loop gains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    pub turn_kp: f64,
    pub turn_kd: f64,
    pub drive_kv_v_per_mps: f64,
    pub drive_kp_v_per_mps: f64,
    pub max_output_v: f64,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        let gains = ModuleGains::default();
        Self {
            turn_kp: gains.turn_kp,
            turn_kd: gains.turn_kd,
            drive_kv_v_per_mps: gains.drive_kv_v_per_mps,
            drive_kp_v_per_mps: gains.drive_kp_v_per_mps,
            max_output_v: gains.max_output_v,
        }
    }
}

/// Chassis heading servo (auto-aim / turn-to-target).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    pub kp: f64,
    pub kd: f64,
    pub tolerance_rad: f64,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            kp: 4.0,
            kd: 0.0,
            tolerance_rad: 0.05,
        }
    }
}

/// Vision-fusion tunables, mirrored into
/// [`FusionConfig`][swervos_estimation::FusionConfig].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSection {
    pub translation_gain_m: f64,
    pub rotation_gain_rad: f64,
    pub max_sample_age_s: f64,
}

impl Default for FusionSection {
    fn default() -> Self {
        let fusion = FusionConfig::default();
        Self {
            translation_gain_m: fusion.translation_gain_m,
            rotation_gain_rad: fusion.rotation_gain_rad,
            max_sample_age_s: fusion.max_sample_age_s,
        }
    }
}

/// Game-piece handling voltages and timings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    pub intake_voltage: f64,
    pub intake_reverse_voltage: f64,
    pub feeder_voltage: f64,
    pub feeder_reverse_voltage: f64,
    pub flywheel_voltage: f64,
    pub flywheel_reverse_voltage: f64,
    pub spin_up_s: f64,
    pub settle_s: f64,
    pub shoot_timeout_s: f64,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            intake_voltage: 6.0,
            intake_reverse_voltage: -6.0,
            feeder_voltage: 6.0,
            feeder_reverse_voltage: -6.0,
            flywheel_voltage: 9.0,
            flywheel_reverse_voltage: -6.0,
            spin_up_s: 0.5,
            settle_s: 0.25,
            shoot_timeout_s: 5.0,
        }
    }
}

/// Operator stick shaping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Stick magnitudes below this are treated as zero.
    pub deadband: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { deadband: 0.1 }
    }
}

impl RobotConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, RobotError> {
        let config: RobotConfig = toml::from_str(text)
            .map_err(|e| RobotError::Misconfiguration(format!("config parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control loop cannot run with.
    pub fn validate(&self) -> Result<(), RobotError> {
        fn positive(name: &str, value: f64) -> Result<(), RobotError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(RobotError::Misconfiguration(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        }

        positive("chassis.track_width_m", self.chassis.track_width_m)?;
        positive("chassis.wheel_base_m", self.chassis.wheel_base_m)?;
        positive("chassis.max_speed_mps", self.chassis.max_speed_mps)?;
        positive(
            "chassis.max_angular_rad_per_s",
            self.chassis.max_angular_rad_per_s,
        )?;
        positive("module.max_output_v", self.module.max_output_v)?;
        positive("heading.tolerance_rad", self.heading.tolerance_rad)?;
        positive("fusion.max_sample_age_s", self.fusion.max_sample_age_s)?;
        positive("shooter.spin_up_s", self.shooter.spin_up_s)?;
        positive("shooter.settle_s", self.shooter.settle_s)?;
        positive("shooter.shoot_timeout_s", self.shooter.shoot_timeout_s)?;

        if !(0.0..1.0).contains(&self.input.deadband) {
            return Err(RobotError::Misconfiguration(format!(
                "input.deadband must be in [0, 1), got {}",
                self.input.deadband
            )));
        }
        if self.shooter.intake_voltage <= 0.0
            || self.shooter.feeder_voltage <= 0.0
            || self.shooter.flywheel_voltage <= 0.0
        {
            return Err(RobotError::Misconfiguration(
                "shooter forward voltages must be positive".to_string(),
            ));
        }
        if self.shooter.intake_reverse_voltage >= 0.0
            || self.shooter.feeder_reverse_voltage >= 0.0
            || self.shooter.flywheel_reverse_voltage >= 0.0
        {
            return Err(RobotError::Misconfiguration(
                "shooter reverse voltages must be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Module offsets in canonical wheel order (front-left, front-right,
    /// back-left, back-right), derived from the chassis geometry.
    pub fn module_offsets(&self) -> [Translation2d; 4] {
        let half_base = self.chassis.wheel_base_m / 2.0;
        let half_track = self.chassis.track_width_m / 2.0;
        [
            Translation2d::new(half_base, half_track),
            Translation2d::new(half_base, -half_track),
            Translation2d::new(-half_base, half_track),
            Translation2d::new(-half_base, -half_track),
        ]
    }

    pub fn drive_config(&self) -> DriveConfig {
        DriveConfig {
            module_offsets: self.module_offsets(),
            max_speed_mps: self.chassis.max_speed_mps,
            max_angular_rad_per_s: self.chassis.max_angular_rad_per_s,
            heading_kp: self.heading.kp,
            heading_kd: self.heading.kd,
            heading_tolerance_rad: self.heading.tolerance_rad,
            fusion: self.fusion_config(),
        }
    }

    pub fn module_gains(&self) -> ModuleGains {
        ModuleGains {
            turn_kp: self.module.turn_kp,
            turn_kd: self.module.turn_kd,
            drive_kv_v_per_mps: self.module.drive_kv_v_per_mps,
            drive_kp_v_per_mps: self.module.drive_kp_v_per_mps,
            max_output_v: self.module.max_output_v,
        }
    }

    pub fn fusion_config(&self) -> FusionConfig {
        FusionConfig {
            translation_gain_m: self.fusion.translation_gain_m,
            rotation_gain_rad: self.fusion.rotation_gain_rad,
            max_sample_age_s: self.fusion.max_sample_age_s,
        }
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            flywheel_spin_up_s: self.shooter.spin_up_s,
            post_clear_settle_s: self.shooter.settle_s,
            shoot_timeout_s: self.shooter.shoot_timeout_s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        RobotConfig::default().validate().unwrap();
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config = RobotConfig::from_toml(
            r#"
            mode = "log_replay"
            alliance = "red"

            [chassis]
            max_speed_mps = 5.0
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, OperatingMode::LogReplay);
        assert_eq!(config.alliance, Alliance::Red);
        assert_eq!(config.chassis.max_speed_mps, 5.0);
        // Untouched sections keep their defaults.
        assert_eq!(config.shooter.flywheel_voltage, 9.0);
        assert_eq!(config.input.deadband, 0.1);
    }

    #[test]
    fn rejects_non_positive_geometry() {
        let mut config = RobotConfig::default();
        config.chassis.track_width_m = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("track_width_m"));
    }

    #[test]
    fn rejects_out_of_range_deadband() {
        let mut config = RobotConfig::default();
        config.input.deadband = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_wrong_sign_shooter_voltages() {
        let mut config = RobotConfig::default();
        config.shooter.flywheel_reverse_voltage = 6.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(RobotConfig::from_toml("mode = 42").is_err());
    }

    #[test]
    fn module_offsets_are_symmetric_about_center() {
        let config = RobotConfig::default();
        let offsets = config.module_offsets();
        let sum = offsets
            .iter()
            .fold(Translation2d::zero(), |acc, o| acc + *o);
        assert!(sum.norm() < 1e-12);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = RobotConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back = RobotConfig::from_toml(&text).unwrap();
        assert_eq!(back.chassis.max_speed_mps, config.chassis.max_speed_mps);
        assert_eq!(back.mode, config.mode);
    }
}
