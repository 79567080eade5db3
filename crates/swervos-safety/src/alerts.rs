//! Fire-and-forget indicator directives.
//!
//! The safety monitor and sequencer signal operators through an external
//! indicator collaborator (an addressable LED strip on the real robot). The
//! core only emits [`LedPattern`] directives through an [`AlertSink`]; no
//! acknowledgment is expected and rendering is out of scope.

use swervos_types::{Alliance, LedColor, LedPattern};
use tracing::debug;

/// Receiver of indicator directives.
pub trait AlertSink: Send {
    /// Emit a directive. Must never block; delivery is best-effort.
    fn send(&mut self, pattern: LedPattern);
}

/// Sink that drops every directive (headless tests, replay mode).
#[derive(Debug, Default)]
pub struct NullAlertSink;

impl AlertSink for NullAlertSink {
    fn send(&mut self, pattern: LedPattern) {
        debug!(?pattern, "alert directive dropped (no indicator bound)");
    }
}

/// The directive shown while a thermal interlock is holding a subsystem
/// stopped: blinking red over black.
pub fn overheat_pattern() -> LedPattern {
    LedPattern::Blink(vec![
        LedColor::RED,
        LedColor::RED,
        LedColor::BLACK,
        LedColor::BLACK,
    ])
}

/// The directive shown while a game piece is seated in the robot.
pub fn piece_held_pattern() -> LedPattern {
    LedPattern::Solid(LedColor::ORANGE)
}

/// The at-rest directive: solid alliance color.
pub fn idle_pattern(alliance: Alliance) -> LedPattern {
    LedPattern::Solid(alliance.color())
}
