//! Play, clock and meter tuning

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    // === Play Clock ===
    /// Seconds on the play clock at the snap (default: 40.0)
    pub play_clock_seconds: f32,
    /// Frames to wait before applying a play result (default: 1)
    pub settle_frames: u32,

    // === Placement ===
    /// Z distance of the lead actors from the line of scrimmage (default: 3.0)
    pub line_offset: f32,
    /// Lateral jitter applied to the defensive lead actor (default: 2.5)
    pub defense_jitter: f32,

    // === Game Clock ===
    /// Quarter length in seconds (default: 900.0)
    pub quarter_seconds: f32,
    /// Quarters per game (default: 4)
    pub quarters: u8,

    // === Scoring ===
    /// Points for a touchdown (default: 7)
    pub touchdown_points: u32,

    // === Special Mode ===
    /// Meter points needed to activate (default: 100.0)
    pub meter_threshold: f32,
    /// Active duration in seconds (default: 15.0)
    pub special_mode_seconds: f32,
    /// Meter points per positive yard gained (default: 2.0)
    pub meter_points_per_yard: f32,
    /// Meter bonus for a touchdown (default: 25.0)
    pub meter_touchdown_bonus: f32,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            play_clock_seconds: 40.0,
            settle_frames: 1,

            line_offset: 3.0,
            defense_jitter: 2.5,

            quarter_seconds: 900.0,
            quarters: 4,

            touchdown_points: 7,

            meter_threshold: 100.0,
            special_mode_seconds: 15.0,
            meter_points_per_yard: 2.0,
            meter_touchdown_bonus: 25.0,
        }
    }
}
