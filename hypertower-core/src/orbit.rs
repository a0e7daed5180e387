/// Orbit controls around the tower axis
use nalgebra::{Point3, Vector3};

use crate::projection::Camera;

/// Elevation stays just short of the poles so `look_at` keeps a valid up vector.
const MAX_ELEVATION: f32 = 1.45;
const MIN_DISTANCE: f32 = 1.0;

/// Spherical camera placement around a target point (angles in radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
    pub target: Point3<f32>,
}

impl Orbit {
    pub fn new(azimuth: f32, elevation: f32, distance: f32) -> Self {
        Self {
            azimuth,
            elevation: elevation.clamp(-MAX_ELEVATION, MAX_ELEVATION),
            distance: distance.max(MIN_DISTANCE),
            target: Point3::origin(),
        }
    }

    /// Place the target at mid-height and back off far enough to see a
    /// cylinder of the given height and radius.
    pub fn framing(height: f32, radius: f32, fov: f32) -> Self {
        let half_extent = (height / 2.0).max(radius).max(MIN_DISTANCE);
        let distance = half_extent / (fov / 2.0).tan() * 1.15 + radius;
        Self {
            target: Point3::new(0.0, height / 2.0, 0.0),
            ..Self::new(0.6, 0.25, distance)
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.azimuth = (self.azimuth + d_azimuth).rem_euclid(std::f32::consts::TAU);
        self.elevation = (self.elevation + d_elevation).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Scale the distance; factors below 1 move closer.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).max(MIN_DISTANCE);
        }
    }

    pub fn eye(&self) -> Point3<f32> {
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target + Vector3::new(cos_el * cos_az, sin_el, cos_el * sin_az) * self.distance
    }

    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.eye();
        camera.target = self.target;
        camera.up = Vector3::y();
    }
}

impl Default for Orbit {
    fn default() -> Self {
        Self::new(0.0, 0.0, 5.0)
    }
}
