//! Meter-gated special mode. The core only tracks the meter and timer; the
//! effect itself belongs to the presentation layer.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SimError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialMeter {
    pub points: f32,
    pub threshold: f32,
    pub active: bool,
    /// Seconds of special mode left
    pub remaining: f32,
    duration: f32,
}

impl SpecialMeter {
    pub fn new(threshold: f32, duration: f32) -> Self {
        Self { points: 0.0, threshold, active: false, remaining: 0.0, duration }
    }

    pub fn is_ready(&self) -> bool {
        !self.active && self.points >= self.threshold
    }

    /// Saturates at the threshold.
    pub fn add_points(&mut self, points: f32) {
        if points.is_finite() && points > 0.0 {
            self.points = (self.points + points).min(self.threshold);
        }
    }

    pub fn activate(&mut self) -> Result<()> {
        if !self.is_ready() {
            return Err(SimError::MeterNotReady { points: self.points, threshold: self.threshold });
        }
        self.active = true;
        self.points = 0.0;
        self.remaining = self.duration;
        info!(duration = self.duration, "special mode on");
        Ok(())
    }

    /// Returns true when the mode just switched off.
    pub fn tick(&mut self, seconds: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining -= seconds.max(0.0);
        if self.remaining > 0.0 {
            return false;
        }
        self.active = false;
        self.remaining = 0.0;
        info!("special mode off");
        true
    }
}
