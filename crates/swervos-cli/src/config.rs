//! Configuration vault – reads/writes `~/.swervos/config.toml`.
//!
//! The vault holds launcher-level settings only: which operating mode to
//! start in, where the robot tuning document lives, and the control period.
//! The robot tuning itself is [`swervos_runtime::RobotConfig`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted launcher configuration stored in `~/.swervos/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Operating mode: `real_world`, `simulation`, or `log_replay`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Optional path to a robot tuning TOML. When absent, built-in defaults
    /// are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robot_config_path: Option<String>,

    /// Control period in milliseconds.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

fn default_mode() -> String {
    "simulation".to_string()
}
fn default_period_ms() -> u64 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            robot_config_path: None,
            period_ms: default_period_ms(),
        }
    }
}

/// Return the path to `~/.swervos/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".swervos").join("config.toml")
}

/// Load the config from disk. Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `SWERVOS_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `SWERVOS_MODE` | `mode` |
/// | `SWERVOS_ROBOT_CONFIG` | `robot_config_path` |
/// | `SWERVOS_PERIOD_MS` | `period_ms` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("SWERVOS_MODE") {
        cfg.mode = v;
    }
    if let Ok(v) = std::env::var("SWERVOS_ROBOT_CONFIG") {
        cfg.robot_config_path = Some(v);
    }
    if let Ok(v) = std::env::var("SWERVOS_PERIOD_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.period_ms = ms;
    }
}

/// Save the config to disk, creating `~/.swervos/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.mode, "simulation");
        assert_eq!(loaded.period_ms, 20);
        assert!(loaded.robot_config_path.is_none());
    }

    #[test]
    fn config_path_points_to_swervos_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".swervos"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn apply_env_overrides_changes_mode() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("SWERVOS_MODE", "log_replay") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.mode, "log_replay");
        unsafe { std::env::remove_var("SWERVOS_MODE") };
    }

    #[test]
    fn apply_env_overrides_changes_period() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("SWERVOS_PERIOD_MS", "10") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.period_ms, 10);
        unsafe { std::env::remove_var("SWERVOS_PERIOD_MS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_period() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("SWERVOS_PERIOD_MS", "not-a-number") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.period_ms, 20);
        unsafe { std::env::remove_var("SWERVOS_PERIOD_MS") };
    }
}
