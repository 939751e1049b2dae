//! Actor movement tuning

use serde::{Deserialize, Serialize};

/// Per-frame integrator parameters shared by human and AI actors.
///
/// Rates are expressed per reference frame and scaled by `dt * reference_fps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // === Speed Tiers ===
    /// Walking speed for human input (default: 4.0)
    pub walk_speed: f32,
    /// Running speed for human input (default: 8.0)
    pub run_speed: f32,
    /// Sprinting speed for human input (default: 12.0)
    pub sprint_speed: f32,
    /// Base speed for AI actors (default: 8.0)
    pub ai_base_speed: f32,

    // === Convergence ===
    /// Fraction of the speed gap closed per reference frame when speeding up (default: 0.15)
    pub acceleration_rate: f32,
    /// Fraction of the speed gap closed per reference frame when slowing down (default: 0.25)
    pub deceleration_rate: f32,
    /// Residual velocity loss per reference frame once target speed is zero (default: 0.1)
    pub damping: f32,
    /// Horizontal speed below which velocity snaps to zero (default: 0.01)
    pub stop_epsilon: f32,
    /// Heading lerp factor per reference frame (default: 0.15)
    pub turn_speed: f32,

    // === Timing ===
    /// Frame rate the per-frame rates were tuned at (default: 60.0)
    pub reference_fps: f32,
    /// Frame delta cap in seconds (default: 0.1)
    pub max_dt: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            run_speed: 8.0,
            sprint_speed: 12.0,
            ai_base_speed: 8.0,

            acceleration_rate: 0.15,
            deceleration_rate: 0.25,
            damping: 0.1,
            stop_epsilon: 0.01,
            turn_speed: 0.15,

            reference_fps: 60.0,
            max_dt: 0.1,
        }
    }
}

impl MovementConfig {
    /// Scale factor converting a per-reference-frame rate into this frame.
    #[inline]
    pub fn frame_scale(&self, dt: f32) -> f32 {
        dt.clamp(0.0, self.max_dt) * self.reference_fps
    }
}
