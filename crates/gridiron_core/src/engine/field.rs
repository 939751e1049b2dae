//! Field geometry and yard-line/world conversion.
//!
//! World axes: `x` is lateral, `y` is up, `z` runs along the field. The
//! possessing side attacks toward `-z`, so yard line 0 sits at `z = +100`
//! and the goal line (yard 100) at `z = -100`.

use nalgebra::Vector3;

// ============================================================================
// Constants
// ============================================================================

pub mod dims {
    /// Field envelope half width (x)
    pub const HALF_WIDTH: f32 = 50.0;
    /// Field envelope half length (z)
    pub const HALF_LENGTH: f32 = 100.0;

    /// Placement clamp used for resets and teleports
    pub const SAFE_HALF_WIDTH: f32 = 45.0;
    pub const SAFE_HALF_LENGTH: f32 = 95.0;

    /// Boundary guard trigger
    pub const GUARD_HALF_WIDTH: f32 = 49.0;
    pub const GUARD_HALF_LENGTH: f32 = 99.0;

    /// Actor origin height when standing on the turf
    pub const GROUND_Y: f32 = 1.0;
}

pub mod yards {
    pub const OWN_GOAL: f32 = 0.0;
    pub const GOAL_LINE: f32 = 100.0;
    /// Drive start after a touchdown
    pub const TOUCHBACK: f32 = 20.0;
    pub const FIRST_DOWN_DISTANCE: f32 = 10.0;
}

const _: () = assert!(dims::SAFE_HALF_WIDTH < dims::GUARD_HALF_WIDTH);
const _: () = assert!(dims::GUARD_HALF_WIDTH < dims::HALF_WIDTH);
const _: () = assert!(dims::SAFE_HALF_LENGTH < dims::GUARD_HALF_LENGTH);

// ============================================================================
// Conversions
// ============================================================================

/// Rules coordinate (0-100) to world z, clamped to the safe envelope.
#[inline]
pub fn yard_line_to_z(yard_line: f32) -> f32 {
    (-(yard_line / 100.0) * 200.0 + 100.0).clamp(-dims::SAFE_HALF_LENGTH, dims::SAFE_HALF_LENGTH)
}

/// World z to rules coordinate, clamped to 0-100.
#[inline]
pub fn z_to_yard_line(z: f32) -> f32 {
    (100.0 - ((z + 100.0) / 200.0) * 100.0).clamp(yards::OWN_GOAL, yards::GOAL_LINE)
}

#[inline]
pub fn clamp_yard_line(yard_line: f32) -> f32 {
    yard_line.clamp(yards::OWN_GOAL, yards::GOAL_LINE)
}

// ============================================================================
// Envelope checks
// ============================================================================

/// Inside the field envelope (inclusive).
#[inline]
pub fn is_within_field(pos: &Vector3<f32>) -> bool {
    pos.x.is_finite()
        && pos.z.is_finite()
        && pos.x.abs() <= dims::HALF_WIDTH
        && pos.z.abs() <= dims::HALF_LENGTH
}

/// Inside the boundary-guard envelope.
#[inline]
pub fn is_within_guard(pos: &Vector3<f32>) -> bool {
    pos.x.is_finite()
        && pos.z.is_finite()
        && pos.x.abs() <= dims::GUARD_HALF_WIDTH
        && pos.z.abs() <= dims::GUARD_HALF_LENGTH
}

/// Clamp the horizontal components into the safe envelope. Non-finite
/// components collapse to the field center.
pub fn clamp_to_safe(pos: Vector3<f32>) -> Vector3<f32> {
    let x = if pos.x.is_finite() { pos.x } else { 0.0 };
    let z = if pos.z.is_finite() { pos.z } else { 0.0 };
    let y = if pos.y.is_finite() { pos.y } else { dims::GROUND_Y };
    Vector3::new(
        x.clamp(-dims::SAFE_HALF_WIDTH, dims::SAFE_HALF_WIDTH),
        y,
        z.clamp(-dims::SAFE_HALF_LENGTH, dims::SAFE_HALF_LENGTH),
    )
}

/// Ground-level world position for a lateral offset and a yard line.
#[inline]
pub fn spot(x: f32, yard_line: f32) -> Vector3<f32> {
    clamp_to_safe(Vector3::new(x, dims::GROUND_Y, yard_line_to_z(yard_line)))
}

/// Horizontal-plane distance; the vertical axis never matters for proximity.
#[inline]
pub fn horizontal_distance(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    horizontal_distance_sq(a, b).sqrt()
}

#[inline]
pub fn horizontal_distance_sq(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}

// ========== Tests ==========
