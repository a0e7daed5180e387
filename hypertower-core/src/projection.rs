/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 5000.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm() * (self.fov / 2.0).tan() * 2.0;
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Project a world-space point to normalized device coordinates.
    ///
    /// Returns `None` for points behind the near plane. Points outside the
    /// view volume are still returned so callers can clip lines themselves.
    pub fn project_ndc(&self, point: &Point3<f32>) -> Option<Point3<f32>> {
        let view = self.view_matrix();
        let eye = view.transform_point(point);
        // Right-handed view space looks down -z.
        if -eye.z < self.near {
            return None;
        }
        let ndc = self.projection_matrix().transform_point(&eye);
        if ndc.coords.iter().all(|c| c.is_finite()) {
            Some(ndc)
        } else {
            None
        }
    }

    /// Project a 3D point to screen space, discarding anything off screen.
    pub fn project_to_screen(&self, point: &Point3<f32>, width: u32, height: u32) -> Option<(f32, f32, f32)> {
        let ndc = self.project_ndc(point)?;
        if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 {
            return None;
        }
        Some(ndc_to_screen(&ndc, width, height))
    }
}

/// Map NDC to pixel coordinates with y pointing down; depth passes through.
pub fn ndc_to_screen(ndc: &Point3<f32>, width: u32, height: u32) -> (f32, f32, f32) {
    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
    (screen_x, screen_y, ndc.z)
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
