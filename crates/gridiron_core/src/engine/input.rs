//! Directional input from the host's input-mapping layer.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::body_orientation::normalize_or_zero;
use super::movement::MovementIntent;
use crate::config::MovementConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedTier {
    Walk,
    #[default]
    Run,
    Sprint,
}

impl SpeedTier {
    pub fn speed(self, cfg: &MovementConfig) -> f32 {
        match self {
            SpeedTier::Walk => cfg.walk_speed,
            SpeedTier::Run => cfg.run_speed,
            SpeedTier::Sprint => cfg.sprint_speed,
        }
    }
}

/// Raw key state for one frame. `forward` is downfield (`-z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub tier: SpeedTier,
}

impl InputState {
    /// Horizontal direction `(x, z)`; opposite keys cancel.
    pub fn direction(&self) -> Vector2<f32> {
        let x = axis(self.right, self.left);
        let z = axis(self.backward, self.forward);
        normalize_or_zero(Vector2::new(x, z))
    }

    pub fn to_intent(&self, cfg: &MovementConfig) -> MovementIntent {
        MovementIntent::toward(self.direction(), self.tier.speed(cfg))
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}
