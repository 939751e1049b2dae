//! AI decision tuning

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    // === Route Running ===
    /// Delay after the snap before route runners move, seconds (default: 0.2)
    pub route_start_delay: f32,
    /// Normalized route progress per second (default: 0.3)
    pub route_progress_rate: f32,
    /// Distance to the route point under which speed is reduced (default: 1.0)
    pub route_slowdown_radius: f32,
    /// Speed multiplier inside the slowdown radius (default: 0.5)
    pub route_slowdown_factor: f32,
    /// Route progress at which receivers turn to receive (default: 0.95)
    pub receive_threshold: f32,

    // === Blocking ===
    /// Defender distance to the carrier that pulls finished runners into blocking (default: 10.0)
    pub block_trigger_radius: f32,
    /// Weight of target distance to the ball carrier (default: 0.7)
    pub block_carrier_weight: f32,
    /// Weight of target distance to the blocker (default: 0.3)
    pub block_self_weight: f32,
    /// Distance at which a blocker engages and slows (default: 3.0)
    pub block_engage_radius: f32,
    /// Distance at which a blocker holds ground (default: 1.5)
    pub block_hold_radius: f32,
    /// Speed multiplier while engaged (default: 0.2)
    pub block_engaged_speed: f32,
    /// Speed multiplier while closing on a target (default: 0.8)
    pub block_approach_speed: f32,
    /// Speed multiplier with no target available (default: 0.3)
    pub block_idle_speed: f32,

    // === Pursuit ===
    /// Post-snap delay before defenders react, seconds (default: 0.5)
    pub defense_reaction_delay: f32,
    /// Seconds between aim updates (default: 0.15)
    pub pursuit_cooldown: f32,
    /// Max random offset added to the normalized aim vector (default: 0.12)
    pub pursuit_jitter: f32,
    /// Pursuit speed multiplier over the base AI speed (default: 1.05)
    pub pursuit_speed_factor: f32,
    /// Horizontal distance that counts as a tackle (default: 1.2)
    pub tackle_radius: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            route_start_delay: 0.2,
            route_progress_rate: 0.3,
            route_slowdown_radius: 1.0,
            route_slowdown_factor: 0.5,
            receive_threshold: 0.95,

            block_trigger_radius: 10.0,
            block_carrier_weight: 0.7,
            block_self_weight: 0.3,
            block_engage_radius: 3.0,
            block_hold_radius: 1.5,
            block_engaged_speed: 0.2,
            block_approach_speed: 0.8,
            block_idle_speed: 0.3,

            defense_reaction_delay: 0.5,
            pursuit_cooldown: 0.15,
            pursuit_jitter: 0.12,
            pursuit_speed_factor: 1.05,
            tackle_radius: 1.2,
        }
    }
}
