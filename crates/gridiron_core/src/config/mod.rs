//! # Simulation Configuration
//!
//! Every tuning constant of the frame loop lives here so balance changes
//! never touch engine code.
//!
//! ## Usage
//! ```rust
//! use gridiron_core::config::SimConfig;
//!
//! let config = SimConfig::default();
//! let arcade = SimConfig::arcade();
//! assert!(arcade.movement.sprint_speed > config.movement.sprint_speed);
//! ```

mod ai_config;
mod ball_config;
mod movement_config;
mod play_config;

pub use ai_config::AiConfig;
pub use ball_config::BallConfig;
pub use movement_config::MovementConfig;
pub use play_config::PlayConfig;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// RNG seed for pursuit jitter, defensive placement and play outcomes
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub ball: BallConfig,
    #[serde(default)]
    pub play: PlayConfig,
}

fn default_seed() -> u64 {
    0x5EED_F00D
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            movement: MovementConfig::default(),
            ai: AiConfig::default(),
            ball: BallConfig::default(),
            play: PlayConfig::default(),
        }
    }
}

impl SimConfig {
    /// Default tuning
    pub fn realistic() -> Self {
        Self::default()
    }

    /// Faster actors, snappier turns, slower defensive reactions
    pub fn arcade() -> Self {
        let mut cfg = Self::default();
        cfg.movement.sprint_speed = 15.0;
        cfg.movement.acceleration_rate = 0.25;
        cfg.movement.turn_speed = 0.3;
        cfg.ai.defense_reaction_delay = 0.8;
        cfg.ai.pursuit_speed_factor = 0.95;
        cfg.play.meter_points_per_yard = 4.0;
        cfg
    }

    /// No aim jitter or placement jitter, for reproducible tests
    pub fn deterministic() -> Self {
        let mut cfg = Self::default();
        cfg.seed = 42;
        cfg.ai.pursuit_jitter = 0.0;
        cfg.play.defense_jitter = 0.0;
        cfg
    }

    /// Parse from JSON; missing sections fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: SimConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let m = &self.movement;
        if !(m.walk_speed > 0.0 && m.walk_speed <= m.run_speed && m.run_speed <= m.sprint_speed) {
            return Err(SimError::Config("speed tiers must be positive and ascending".into()));
        }
        for (name, rate) in [
            ("acceleration_rate", m.acceleration_rate),
            ("deceleration_rate", m.deceleration_rate),
            ("damping", m.damping),
            ("turn_speed", m.turn_speed),
        ] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(SimError::Config(format!("{name} must be in (0, 1], got {rate}")));
            }
        }
        if self.ai.block_hold_radius > self.ai.block_engage_radius {
            return Err(SimError::Config("block_hold_radius exceeds block_engage_radius".into()));
        }
        if !(self.ball.restitution >= 0.0 && self.ball.restitution < 1.0) {
            return Err(SimError::Config("restitution must be in [0, 1)".into()));
        }
        if self.play.play_clock_seconds <= 0.0 || self.play.quarter_seconds <= 0.0 {
            return Err(SimError::Config("clock lengths must be positive".into()));
        }
        if self.play.quarters == 0 {
            return Err(SimError::Config("a game needs at least one quarter".into()));
        }
        Ok(())
    }
}

// ========== Tests ==========
