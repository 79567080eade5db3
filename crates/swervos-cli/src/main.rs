//! `swervos` – launcher binary for the swerve drive control stack.
//!
//! This binary is the entry point for the whole stack. It:
//!
//! 1. Checks for `~/.swervos/config.toml`; writes the defaults when the file
//!    is absent (first run).
//! 2. Binds every hardware interface to the backend implied by the configured
//!    operating mode (`simulation` / `log_replay`; `real_world` requires a
//!    board-specific deployment binary and is rejected here).
//! 3. Runs the fixed-period control loop until **Ctrl-C**, then publishes an
//!    emergency-stop fault and zeroes all actuators before exiting.

mod config;

use colored::Colorize;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use swervos_runtime::telemetry::init_tracing;
use swervos_runtime::{BackendHandles, OperatorInput, Robot, RobotConfig, bind_hardware};
use swervos_telemetry::{EventBus, Topic};
use swervos_types::{Event, EventPayload, OperatingMode};

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Hold the guard for the whole process so pending OTel spans flush on exit.
    // The CLI's user-facing output still uses println! for UX consistency.
    let _tracing_guard = init_tracing("swervos");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));

    let bus = EventBus::default();

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    // Publish an emergency-stop fault on the alerts topic, then flag the
    // control loop to wind down.
    {
        let shutdown = shutdown.clone();
        let bus = bus.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            println!();
            println!(
                "{}",
                "⚠  Ctrl-C received – stopping the robot …".yellow().bold()
            );

            let stop_event = Event::now(
                "swervos-cli",
                EventPayload::HardwareFault {
                    component: "cli".to_string(),
                    code: 911,
                    message: "EMERGENCY_STOP: operator Ctrl-C".to_string(),
                },
            );
            let _ = bus.publish_to(Topic::SystemAlerts, stop_event);

            shutdown.store(true, Ordering::SeqCst);
        }) {
            warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
        }
    }

    // ── Launcher config ───────────────────────────────────────────────────
    let launcher = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            // First run: persist the defaults so the operator has a file to
            // edit, then continue with them.
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  First run – wrote defaults to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Could not persist defaults".yellow(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    let robot_config = match load_robot_config(&launcher) {
        Ok(cfg) => cfg,
        Err(e) => fatal(&e),
    };

    // ── Hardware binding ──────────────────────────────────────────────────
    let (hardware, handles) = match bind_hardware(robot_config.mode) {
        Ok(pair) => pair,
        Err(e) => fatal(&e.to_string()),
    };
    let sim = match handles {
        BackendHandles::Sim(h) => Some(h),
        // Replay slots would be fed by a log reader; none is wired up here,
        // so the drivers simply report disconnected.
        BackendHandles::Replay(_) => None,
    };

    // ── Control loop ──────────────────────────────────────────────────────
    let period = Duration::from_millis(launcher.period_ms.max(1));
    let dt = period.as_secs_f64();
    let mode = robot_config.mode;
    let mut robot = Robot::new(robot_config, hardware, bus, sim);

    // Headless operation: no joystick source is wired into the launcher, so
    // operator intent stays at rest. A deployment binary replaces this with
    // its driver-station ingest.
    let input = OperatorInput::default();

    info!(%mode, period_ms = launcher.period_ms, "control loop starting");
    println!(
        "  Running in {} mode, {} ms period. Press Ctrl-C to stop.",
        mode.to_string().bold(),
        launcher.period_ms
    );
    println!();

    let start = Instant::now();
    let mut next_deadline = start + period;
    while !shutdown.load(Ordering::SeqCst) {
        robot.tick(start.elapsed().as_secs_f64(), dt, &input);

        let now = Instant::now();
        if now < next_deadline {
            std::thread::sleep(next_deadline - now);
        } else {
            warn!(
                overrun_ms = (now - next_deadline).as_millis() as u64,
                "control period overrun"
            );
        }
        next_deadline += period;
    }

    // ── Shutdown ──────────────────────────────────────────────────────────
    robot.emergency_stop();
    println!("{}", "  ✓ All actuators stopped. Goodbye.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve the robot tuning document: either the TOML file named by the
/// launcher config, or the built-in defaults. The launcher's `mode` field
/// (including any `SWERVOS_MODE` override) always wins over the file's.
fn load_robot_config(launcher: &config::Config) -> Result<RobotConfig, String> {
    let mut cfg = match &launcher.robot_config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read robot config at {path}: {e}"))?;
            RobotConfig::from_toml(&raw).map_err(|e| e.to_string())?
        }
        None => RobotConfig::default(),
    };
    cfg.mode = OperatingMode::from_str(&launcher.mode).map_err(|e| e.to_string())?;
    Ok(cfg)
}

/// Print the fatal error and exit the process.
fn fatal(msg: &str) -> ! {
    println!("{}: {}", "Error".red().bold(), msg);
    std::process::exit(1);
}

fn print_banner() {
    println!();
    println!("{}", r#"   ____                     ____  _____"#.bold().cyan());
    println!("{}", r#"  / __/    _____ _____  __ / __ \/ ___/"#.bold().cyan());
    println!("{}", r#" _\ \ | |/|/ / -_) __/ |/ // /_/ /\__ \ "#.bold().cyan());
    println!("{}", r#"/___/ |__,__/\__/_/  |___/ \____/____/  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "SwervOS".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Swerve Drive Control Stack");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_robot_config_defaults_to_simulation() {
        let launcher = config::Config::default();
        let cfg = load_robot_config(&launcher).expect("defaults load");
        assert_eq!(cfg.mode, OperatingMode::Simulation);
    }

    #[test]
    fn load_robot_config_rejects_unknown_mode() {
        let launcher = config::Config {
            mode: "teleport".to_string(),
            ..config::Config::default()
        };
        assert!(load_robot_config(&launcher).is_err());
    }

    #[test]
    fn load_robot_config_reads_tuning_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("robot.toml");
        std::fs::write(&path, "[chassis]\nmax_speed_mps = 3.0\n").expect("write");

        let launcher = config::Config {
            mode: "sim".to_string(),
            robot_config_path: Some(path.to_string_lossy().into_owned()),
            ..config::Config::default()
        };
        let cfg = load_robot_config(&launcher).expect("file load");
        assert_eq!(cfg.mode, OperatingMode::Simulation);
        assert!((cfg.chassis.max_speed_mps - 3.0).abs() < 1e-9);
    }

    #[test]
    fn load_robot_config_surfaces_missing_file() {
        let launcher = config::Config {
            robot_config_path: Some("/nonexistent/robot.toml".to_string()),
            ..config::Config::default()
        };
        let err = load_robot_config(&launcher).expect_err("missing file");
        assert!(err.contains("Failed to read robot config"));
    }
}
