//! Route patterns and the smooth paths AI runners follow.
//!
//! Waypoints are relative to the runner's spot at the snap, with `-z`
//! downfield and `+x` toward the runner's outside when unflipped.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Samples per Catmull-Rom segment in the arc-length table
const SEGMENT_SAMPLES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutePattern {
    Go,
    Slant,
    Out,
    In,
    Comeback,
    Curl,
    Corner,
    Post,
    Flat,
    Wheel,
    Dig,
    Swing,
    BlockPass,
    BlockRelease,
}

impl RoutePattern {
    pub const ALL: [RoutePattern; 14] = [
        RoutePattern::Go,
        RoutePattern::Slant,
        RoutePattern::Out,
        RoutePattern::In,
        RoutePattern::Comeback,
        RoutePattern::Curl,
        RoutePattern::Corner,
        RoutePattern::Post,
        RoutePattern::Flat,
        RoutePattern::Wheel,
        RoutePattern::Dig,
        RoutePattern::Swing,
        RoutePattern::BlockPass,
        RoutePattern::BlockRelease,
    ];

    /// Relative `(x, z)` waypoints, always starting at the origin.
    pub fn waypoints(self) -> &'static [(f32, f32)] {
        match self {
            RoutePattern::Go => &[(0.0, 0.0), (0.0, -20.0)],
            RoutePattern::Slant => &[(0.0, 0.0), (0.0, -3.0), (-5.0, -10.0)],
            RoutePattern::Out => &[(0.0, 0.0), (0.0, -7.0), (5.0, -7.0)],
            RoutePattern::In => &[(0.0, 0.0), (0.0, -7.0), (-5.0, -7.0)],
            RoutePattern::Comeback => &[(0.0, 0.0), (0.0, -12.0), (0.0, -10.0)],
            RoutePattern::Curl => &[(0.0, 0.0), (0.0, -8.0), (-2.0, -8.0), (-2.0, -6.0)],
            RoutePattern::Corner => &[(0.0, 0.0), (0.0, -8.0), (6.0, -15.0)],
            RoutePattern::Post => &[(0.0, 0.0), (0.0, -10.0), (-6.0, -18.0)],
            RoutePattern::Flat => &[(0.0, 0.0), (5.0, -1.0)],
            RoutePattern::Wheel => &[(0.0, 0.0), (5.0, -1.0), (5.0, -8.0), (0.0, -15.0)],
            RoutePattern::Dig => &[(0.0, 0.0), (0.0, -10.0), (-5.0, -10.0)],
            RoutePattern::Swing => &[(0.0, 0.0), (6.0, 2.0), (8.0, -3.0)],
            RoutePattern::BlockPass => &[(0.0, 0.0), (0.0, -2.0)],
            RoutePattern::BlockRelease => &[(0.0, 0.0), (0.0, -2.0), (3.0, -5.0)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Mirror across the runner's spot
    pub side_flip: bool,
    /// Extra depth added to every downfield waypoint
    pub depth_adjust: f32,
    /// Extra width added to every lateral waypoint, away from center
    pub width_adjust: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteAssignment {
    pub pattern: RoutePattern,
    #[serde(default)]
    pub options: RouteOptions,
}

impl RouteAssignment {
    pub fn new(pattern: RoutePattern) -> Self {
        Self { pattern, options: RouteOptions::default() }
    }

    pub fn flipped(mut self, flip: bool) -> Self {
        self.options.side_flip = flip;
        self
    }

    /// Relative waypoints with the options applied.
    pub fn adjusted_waypoints(&self) -> Vec<(f32, f32)> {
        let o = &self.options;
        self.pattern
            .waypoints()
            .iter()
            .map(|&(x, z)| {
                let x = if x != 0.0 { x + x.signum() * o.width_adjust } else { x };
                let z = if z < 0.0 { z - o.depth_adjust } else { z };
                let x = if o.side_flip { -x } else { x };
                (x, z)
            })
            .collect()
    }
}

/// Uniform Catmull-Rom spline through the waypoints, resampled by arc length
/// so a normalized parameter moves at constant ground speed.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    samples: Vec<Vector3<f32>>,
    cumulative: Vec<f32>,
}

impl RoutePath {
    pub fn build(assignment: &RouteAssignment, start: Vector3<f32>) -> Self {
        let points: Vec<Vector3<f32>> = assignment
            .adjusted_waypoints()
            .into_iter()
            .map(|(x, z)| Vector3::new(start.x + x, start.y, start.z + z))
            .collect();
        Self::through(&points)
    }

    pub fn through(points: &[Vector3<f32>]) -> Self {
        let mut samples = Vec::new();
        match points {
            [] => {}
            [only] => samples.push(*only),
            _ => {
                let last = points.len() - 1;
                for i in 0..last {
                    let p0 = points[i.saturating_sub(1)];
                    let p1 = points[i];
                    let p2 = points[i + 1];
                    let p3 = points[(i + 2).min(last)];
                    for s in 0..SEGMENT_SAMPLES {
                        let t = s as f32 / SEGMENT_SAMPLES as f32;
                        samples.push(catmull_rom(p0, p1, p2, p3, t));
                    }
                }
                samples.push(points[last]);
            }
        }

        let mut cumulative = Vec::with_capacity(samples.len());
        let mut total = 0.0;
        for (i, p) in samples.iter().enumerate() {
            if i > 0 {
                total += (p - samples[i - 1]).norm();
            }
            cumulative.push(total);
        }
        Self { samples, cumulative }
    }

    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn end(&self) -> Option<Vector3<f32>> {
        self.samples.last().copied()
    }

    /// Point at normalized arc length `t` (clamped to `[0, 1]`).
    pub fn point_at(&self, t: f32) -> Option<Vector3<f32>> {
        let first = *self.samples.first()?;
        let total = self.length();
        if total <= f32::EPSILON {
            return Some(first);
        }
        let target = t.clamp(0.0, 1.0) * total;
        let idx = self.cumulative.partition_point(|&d| d < target);
        if idx == 0 {
            return Some(first);
        }
        if idx >= self.samples.len() {
            return self.end();
        }
        let (d0, d1) = (self.cumulative[idx - 1], self.cumulative[idx]);
        let span = d1 - d0;
        let local = if span > f32::EPSILON { (target - d0) / span } else { 0.0 };
        Some(self.samples[idx - 1].lerp(&self.samples[idx], local))
    }
}

fn catmull_rom(
    p0: Vector3<f32>,
    p1: Vector3<f32>,
    p2: Vector3<f32>,
    p3: Vector3<f32>,
    t: f32,
) -> Vector3<f32> {
    let t2 = t * t;
    let t3 = t2 * t;
    (p1 * 2.0 + (p2 - p0) * t + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2 + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
        * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Vector3<f32> {
        Vector3::new(10.0, 1.0, 40.0)
    }

    #[test]
    fn test_every_pattern_starts_at_origin() {
        for pattern in RoutePattern::ALL {
            assert_eq!(pattern.waypoints()[0], (0.0, 0.0), "{pattern:?}");
            assert!(pattern.waypoints().len() >= 2);
        }
    }

    #[test]
    fn test_path_hits_endpoints() {
        for pattern in RoutePattern::ALL {
            let path = RoutePath::build(&RouteAssignment::new(pattern), origin());
            let start = path.point_at(0.0).unwrap();
            let end = path.point_at(1.0).unwrap();
            let (ex, ez) = *pattern.waypoints().last().unwrap();
            assert!((start - origin()).norm() < 0.001, "{pattern:?}");
            assert!((end.x - (10.0 + ex)).abs() < 0.001, "{pattern:?}");
            assert!((end.z - (40.0 + ez)).abs() < 0.001, "{pattern:?}");
        }
    }

    #[test]
    fn test_go_route_is_straight_and_uniform() {
        let path = RoutePath::build(&RouteAssignment::new(RoutePattern::Go), origin());
        assert!((path.length() - 20.0).abs() < 0.01);
        let mid = path.point_at(0.5).unwrap();
        assert!((mid.z - 30.0).abs() < 0.05);
        assert!((mid.x - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_side_flip_mirrors() {
        let out = RouteAssignment::new(RoutePattern::Out).flipped(true);
        let path = RoutePath::build(&out, origin());
        assert!((path.end().unwrap().x - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_depth_and_width_adjust() {
        let mut slant = RouteAssignment::new(RoutePattern::Slant);
        slant.options.depth_adjust = 2.0;
        slant.options.width_adjust = 1.0;
        let pts = slant.adjusted_waypoints();
        assert_eq!(pts[0], (0.0, 0.0));
        assert_eq!(pts[1], (0.0, -5.0));
        assert_eq!(pts[2], (-6.0, -12.0));
    }

    #[test]
    fn test_point_at_clamps() {
        let path = RoutePath::build(&RouteAssignment::new(RoutePattern::Dig), origin());
        assert_eq!(path.point_at(-1.0), path.point_at(0.0));
        assert_eq!(path.point_at(7.0), path.point_at(1.0));
    }

    #[test]
    fn test_empty_path() {
        let path = RoutePath::through(&[]);
        assert!(path.point_at(0.5).is_none());
        assert_eq!(path.length(), 0.0);
    }
}
