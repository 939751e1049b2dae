//! body_orientation.rs
//! Actor facing: heading math, 8-way discretization and smoothing.
//!
//! Headings are yaw angles measured as `atan2(dx, dz)`, so yaw 0 faces `+z`
//! and yaw π faces downfield (`-z`).

use std::f32::consts::{FRAC_PI_4, PI, TAU};

use nalgebra::Vector2;

const EPS: f32 = 1e-6;

/// Offense faces downfield at the snap
pub const OFFENSE_FACING: f32 = PI;
/// Defense faces the offense
pub const DEFENSE_FACING: f32 = 0.0;

/// Normalize a horizontal vector; zero-length input yields zero.
pub fn normalize_or_zero(v: Vector2<f32>) -> Vector2<f32> {
    let mag = v.norm();
    if mag < EPS || !mag.is_finite() {
        Vector2::zeros()
    } else {
        v / mag
    }
}

/// Heading of a horizontal direction `(x, z)`.
pub fn heading_of(direction: Vector2<f32>) -> Option<f32> {
    if direction.norm_squared() < EPS {
        None
    } else {
        Some(direction.x.atan2(direction.y))
    }
}

pub fn direction_of(heading: f32) -> Vector2<f32> {
    Vector2::new(heading.sin(), heading.cos())
}

/// Wrap into `(-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}

/// Snap to the nearest of the eight compass headings. The four diagonals are
/// the blends between two adjacent axes.
pub fn discretize_heading(angle: f32) -> f32 {
    wrap_angle((angle / FRAC_PI_4).round() * FRAC_PI_4)
}

/// Lerp along the shortest arc. `t` is clamped to `[0, 1]`.
pub fn lerp_angle(current: f32, target: f32, t: f32) -> f32 {
    let delta = wrap_angle(target - current);
    wrap_angle(current + delta * t.clamp(0.0, 1.0))
}

/// 1.0 facing straight at `target`, 0.0 facing directly away.
pub fn facing_to_target(heading: f32, from: Vector2<f32>, target: Vector2<f32>) -> f32 {
    let to_target = normalize_or_zero(target - from);
    if to_target == Vector2::zeros() {
        return 1.0;
    }
    (direction_of(heading).dot(&to_target) + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_axes() {
        assert!((heading_of(Vector2::new(0.0, 1.0)).unwrap()).abs() < 0.001);
        assert!((heading_of(Vector2::new(1.0, 0.0)).unwrap() - PI / 2.0).abs() < 0.001);
        assert!((heading_of(Vector2::new(0.0, -1.0)).unwrap().abs() - PI).abs() < 0.001);
        assert!(heading_of(Vector2::zeros()).is_none());
    }

    #[test]
    fn test_discretize_snaps_to_diagonal() {
        let h = discretize_heading(0.7);
        assert!((h - FRAC_PI_4).abs() < 0.001);
        let h = discretize_heading(-2.5);
        assert!((h + 3.0 * FRAC_PI_4).abs() < 0.001);
    }

    #[test]
    fn test_lerp_takes_shortest_arc() {
        // From just below +π to just above -π: must cross the seam, not sweep through 0
        let a = lerp_angle(3.0, -3.0, 0.5);
        assert!(a.abs() > 3.0);
    }

    #[test]
    fn test_lerp_converges() {
        let mut yaw = 0.0;
        for _ in 0..100 {
            yaw = lerp_angle(yaw, 1.5, 0.15);
        }
        assert!((yaw - 1.5).abs() < 0.01);
    }

    #[test]
    fn test_facing_to_target() {
        let from = Vector2::zeros();
        assert!((facing_to_target(0.0, from, Vector2::new(0.0, 5.0)) - 1.0).abs() < 0.001);
        assert!(facing_to_target(0.0, from, Vector2::new(0.0, -5.0)).abs() < 0.001);
    }
}
