//! Steering helpers (minimal set)
//!
//! These produce [`MovementIntent`]s for the Actor Controller rather than
//! velocities, so acceleration and damping still apply.

use nalgebra::{Vector2, Vector3};

use super::movement::MovementIntent;

/// Project onto the horizontal plane as `(x, z)`.
#[inline]
pub fn to_plane(v: &Vector3<f32>) -> Vector2<f32> {
    Vector2::new(v.x, v.z)
}

/// Move toward `target` at `speed`.
pub fn seek(current: &Vector3<f32>, target: &Vector3<f32>, speed: f32) -> MovementIntent {
    MovementIntent::toward(to_plane(target) - to_plane(current), speed)
}

/// Move toward `target`, scaling speed by `slow_factor` inside `slow_radius`.
pub fn arrive(
    current: &Vector3<f32>,
    target: &Vector3<f32>,
    max_speed: f32,
    slow_radius: f32,
    slow_factor: f32,
) -> MovementIntent {
    let offset = to_plane(target) - to_plane(current);
    let speed = if offset.norm() < slow_radius { max_speed * slow_factor } else { max_speed };
    MovementIntent::toward(offset, speed)
}

/// Point `lead` yards downfield (`-z`) of `target`.
#[inline]
pub fn lead_point(target: &Vector3<f32>, lead: f32) -> Vector3<f32> {
    Vector3::new(target.x, target.y, target.z - lead)
}
