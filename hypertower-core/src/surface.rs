/// Ruled-surface evaluation for a single twisted section.
///
/// A section is the patch of a hyperboloid of one sheet between two
/// horizontal circles: radius `a` at the bottom and `b` at the top. Each
/// ruling line starts at azimuth `θ` on the bottom circle and ends at
/// `θ ± φ` on the top circle. Points are y-up: `(r cos θ, y, r sin θ)`.

use nalgebra::Point3;
use std::f64::consts::TAU;

use crate::section::Section;

/// Below this magnitude the waist denominator is treated as zero.
pub const WAIST_DENOMINATOR_TOLERANCE: f64 = 1e-4;

/// Minimum-radius point of a section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaistGeometry {
    /// Normalized height in `[0, 1]`.
    pub position: f64,
    pub radius: f64,
}

/// Which of the two ruling families a strut belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Helicity {
    /// Ends at `θ + φ`.
    Positive,
    /// Ends at `θ - φ`.
    Negative,
}

/// One straight strut between the bottom and top circle of a section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrutSegment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub section: usize,
    pub family: Helicity,
}

impl StrutSegment {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// A horizontal bracing ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSpec {
    pub radius: f64,
    pub height: f64,
    pub section: usize,
}

/// Radius of the ruled surface at normalized height `t`.
///
/// `r²(t) = (1−t)²a² + t²b² + 2(1−t)t·ab·cos φ`. The result does not depend
/// on the azimuth a ruling starts from, which is why a ring at height `t`
/// has a single radius.
pub fn radius_at(t: f64, a: f64, b: f64, twist: f64) -> f64 {
    let s = 1.0 - t;
    let squared = s * s * a * a + t * t * b * b + 2.0 * s * t * a * b * twist.cos();
    // Cancellation near the ends can push r² slightly below zero.
    squared.max(0.0).sqrt()
}

/// Waist of a section with bottom radius `a`, top radius `b` and twist `φ`.
///
/// The position is `(a² + ab·cos φ) / (a² + b² + 2ab·cos φ)` clamped to
/// `[0, 1]`, with `{0.5, (a+b)/2}` returned when that denominator is within
/// [`WAIST_DENOMINATOR_TOLERANCE`] of zero. The radius is the smallest value
/// `r(t)` reaches on the section, so it never exceeds the radius at any
/// height.
///
/// The two fields are computed independently and are generally not one
/// point on the profile: for `a = 60, b = 5, φ = 50°` the position is about
/// 0.946 while the radius is `r(1) = 5`. Use [`radius_at`] for the radius at
/// `position`.
pub fn waist(a: f64, b: f64, twist: f64) -> WaistGeometry {
    let cos = twist.cos();
    let denominator = a * a + b * b + 2.0 * a * b * cos;
    if denominator.abs() < WAIST_DENOMINATOR_TOLERANCE {
        return WaistGeometry {
            position: 0.5,
            radius: (a + b) / 2.0,
        };
    }

    let position = ((a * a + a * b * cos) / denominator).clamp(0.0, 1.0);
    let position = if position.is_finite() { position } else { 0.5 };

    WaistGeometry {
        position,
        radius: radius_at(minimizer(a, b, cos), a, b, twist),
    }
}

/// Stationary point of `r²(t)` clamped to the section.
///
/// `r²` is an upward-opening quadratic in `t`, so clamping the stationary
/// point gives the minimum over the closed interval. When the top and bottom
/// of a ruling coincide in plan the profile is flat and any `t` is a minimum.
fn minimizer(a: f64, b: f64, cos: f64) -> f64 {
    let curvature = a * a + b * b - 2.0 * a * b * cos;
    if curvature.abs() < f64::EPSILON {
        return 0.5;
    }
    let t = (a * a - a * b * cos) / curvature;
    if t.is_finite() {
        t.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

fn on_circle(radius: f64, angle: f64, height: f64) -> Point3<f64> {
    Point3::new(radius * angle.cos(), height, radius * angle.sin())
}

/// The two ruling lines through angular index `k` of `strut_count`.
///
/// Both share a start point on the bottom circle and end symmetrically at
/// `θ + φ` and `θ − φ` on the top circle.
pub fn strut_pair(section: &Section, k: u32, strut_count: u32) -> [StrutSegment; 2] {
    let theta = TAU * k as f64 / strut_count.max(1) as f64;
    let twist = section.twist_radians;
    let start = on_circle(section.bottom_radius, theta, section.bottom_height);

    [
        StrutSegment {
            start,
            end: on_circle(section.top_radius, theta + twist, section.top_height),
            section: section.index,
            family: Helicity::Positive,
        },
        StrutSegment {
            start,
            end: on_circle(section.top_radius, theta - twist, section.top_height),
            section: section.index,
            family: Helicity::Negative,
        },
    ]
}

/// Rings at `ring_count + 1` evenly spaced heights of a section.
///
/// With `include_bottom` false the ring at `t = 0` is skipped, so stacked
/// sections do not repeat the ring on their shared boundary.
pub fn ring_samples(section: &Section, ring_count: u32, include_bottom: bool) -> Vec<RingSpec> {
    let count = ring_count.max(1);
    let first = if include_bottom { 0 } else { 1 };

    (first..=count)
        .map(|i| {
            let t = i as f64 / count as f64;
            RingSpec {
                radius: section.radius_at(t),
                height: section.bottom_height + t * section.height(),
                section: section.index,
            }
        })
        .collect()
}
