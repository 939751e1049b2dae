//! Ball physics tuning

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    // === Flight ===
    /// Downward acceleration (default: 9.8)
    pub gravity: f32,
    /// Height treated as ground contact (default: 0.5)
    pub rest_height: f32,
    /// Frame delta cap in seconds (default: 0.1)
    pub max_dt: f32,

    // === Bounce ===
    /// Vertical speed above which ground contact bounces (default: 1.0)
    pub bounce_threshold: f32,
    /// Vertical restitution per bounce (default: 0.6)
    pub restitution: f32,
    /// Horizontal retention per bounce (default: 0.8)
    pub bounce_friction: f32,
    /// Horizontal retention per frame while rolling (default: 0.95)
    pub rolling_friction: f32,
    /// Horizontal speed under which a rolling ball settles (default: 0.1)
    pub settle_speed: f32,

    // === Carry ===
    /// Offset along the owner's facing (default: 0.5)
    pub carry_forward: f32,
    /// Offset to the owner's right (default: 0.3)
    pub carry_side: f32,
    /// Height above the owner's origin (default: 1.2)
    pub carry_height: f32,
    /// Radius within which a receiving actor secures a thrown ball (default: 1.5)
    pub catch_radius: f32,
    /// Max ball height for a catch (default: 2.5)
    pub catch_height: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            rest_height: 0.5,
            max_dt: 0.1,

            bounce_threshold: 1.0,
            restitution: 0.6,
            bounce_friction: 0.8,
            rolling_friction: 0.95,
            settle_speed: 0.1,

            carry_forward: 0.5,
            carry_side: 0.3,
            carry_height: 1.2,
            catch_radius: 1.5,
            catch_height: 2.5,
        }
    }
}
