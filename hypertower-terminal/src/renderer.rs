/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use hypertower_core::mesh::{Mesh, Triangle, RING_SEGMENTS};
use hypertower_core::projection::ndc_to_screen;
use hypertower_core::{Camera, Helicity, RingSpec, StrutSegment, TowerGeometry};
use nalgebra::Point3;
use std::f64::consts::TAU;
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const RING_COLOR: Color = Color::Yellow;

/// ASCII renderer that converts tower geometry to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Character at a cell, for inspection.
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn covered_cells(&self) -> usize {
        self.char_buffer.iter().filter(|c| **c != ' ').count()
    }

    /// Draw struts and rings as depth-tested lines.
    pub fn render_wireframe(&mut self, geometry: &TowerGeometry, camera: &Camera) {
        for strut in &geometry.struts {
            self.render_strut(strut, camera);
        }
        for ring in &geometry.rings {
            self.render_ring(ring, camera);
        }
    }

    fn render_strut(&mut self, strut: &StrutSegment, camera: &Camera) {
        let color = match strut.family {
            Helicity::Positive => Color::Cyan,
            Helicity::Negative => Color::Magenta,
        };
        self.render_line(strut.start.cast(), strut.end.cast(), camera, color);
    }

    fn render_ring(&mut self, ring: &RingSpec, camera: &Camera) {
        let point = |i: usize| {
            let angle = TAU * i as f64 / RING_SEGMENTS as f64;
            Point3::new(
                (ring.radius * angle.cos()) as f32,
                ring.height as f32,
                (ring.radius * angle.sin()) as f32,
            )
        };
        for i in 0..RING_SEGMENTS {
            self.render_line(point(i), point(i + 1), camera, RING_COLOR);
        }
    }

    fn render_line(&mut self, from: Point3<f32>, to: Point3<f32>, camera: &Camera, color: Color) {
        let (Some(a), Some(b)) = (camera.project_ndc(&from), camera.project_ndc(&to)) else {
            return; // Behind the camera
        };
        let (x0, y0, z0) = ndc_to_screen(&a, self.width as u32, self.height as u32);
        let (x1, y1, z1) = ndc_to_screen(&b, self.width as u32, self.height as u32);

        let (dx, dy) = (x1 - x0, y1 - y0);
        let character = line_char(dx, dy);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        // Lines far off screen would otherwise cost a step per virtual pixel.
        if steps > 4.0 * (self.width + self.height) as f32 {
            return;
        }

        let steps = steps as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 + dx * t;
            let y = y0 + dy * t;
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x >= self.width || y >= self.height {
                continue;
            }
            let depth = z0 + (z1 - z0) * t;
            let idx = y * self.width + x;
            if depth < self.depth_buffer[idx] {
                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = character;
                self.color_buffer[idx] = color;
            }
        }
    }

    /// Rasterize a shaded triangle mesh.
    pub fn render_mesh(&mut self, mesh: &Mesh, camera: &Camera) {
        for triangle in &mesh.triangles {
            self.render_triangle(triangle, camera);
        }
    }

    fn render_triangle(&mut self, triangle: &Triangle, camera: &Camera) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(&vertex.position, self.width as u32, self.height as u32) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        // Headlight shading: faces toward the camera are brightest
        let normal = triangle.calculate_normal();
        let centroid = triangle.vertices[0].position;
        let to_camera = (camera.position - centroid).normalize();
        let brightness = normal.dot(&to_camera).abs();

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, character);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box, clipped to screen bounds
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) else {
                    continue;
                };
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                    let idx = y as usize * self.width + x as usize;
                    if depth < self.depth_buffer[idx] {
                        self.depth_buffer[idx] = depth;
                        self.char_buffer[idx] = character;
                        self.color_buffer[idx] = shade_color(character);
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Pick a line glyph from the screen-space direction (y grows downward).
fn line_char(dx: f32, dy: f32) -> char {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax > 2.0 * ay {
        '-'
    } else if ay > 2.0 * ax {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

fn shade_color(c: char) -> Color {
    match c {
        ' ' | '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        '#' | '%' | '@' => Color::Cyan,
        _ => Color::White,
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypertower_core::{build_tower, mesh::tower_mesh, Orbit, TowerSpec};

    fn framed_camera(geometry: &TowerGeometry, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(width, height * 2);
        Orbit::framing(geometry.height() as f32, geometry.max_radius() as f32, camera.fov).apply(&mut camera);
        camera
    }

    #[test]
    fn test_line_chars() {
        assert_eq!(line_char(10.0, 0.0), '-');
        assert_eq!(line_char(0.0, 10.0), '|');
        assert_eq!(line_char(5.0, 5.0), '\\');
        assert_eq!(line_char(5.0, -5.0), '/');
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }

    #[test]
    fn test_wireframe_covers_cells() {
        let geometry = build_tower(&TowerSpec::default());
        let camera = framed_camera(&geometry, 80, 40);
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render_wireframe(&geometry, &camera);
        assert!(renderer.covered_cells() > 100);

        renderer.clear();
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_solid_covers_cells() {
        let spec = TowerSpec {
            strut_count: 8,
            show_rings: false,
            strut_radius: 8.0,
            ..TowerSpec::default()
        };
        let geometry = build_tower(&spec);
        let camera = framed_camera(&geometry, 80, 40);
        let mut renderer = AsciiRenderer::new(80, 40);
        renderer.render_mesh(&tower_mesh(&geometry, spec.strut_radius), &camera);
        assert!(renderer.covered_cells() > 0);
    }

    #[test]
    fn test_draw_emits_every_row() {
        let renderer = AsciiRenderer::new(4, 3);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 2);
    }

    #[test]
    fn test_cell_bounds() {
        let renderer = AsciiRenderer::new(4, 3);
        assert_eq!(renderer.cell(3, 2), Some(' '));
        assert_eq!(renderer.cell(4, 0), None);
    }
}
