/// Triangle meshes for struts and rings
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;

use crate::surface::{RingSpec, StrutSegment};
use crate::tower::TowerGeometry;

/// Sides of the prism drawn around each strut.
pub const STRUT_SIDES: usize = 6;
/// Segments around a ring's circumference.
pub const RING_SEGMENTS: usize = 48;
/// Sides of a ring's tube cross-section.
pub const RING_SIDES: usize = 4;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    fn from_f64(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position: position.cast::<f32>(),
            normal: normal.cast::<f32>(),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order, zero for degenerate faces.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        (v1 - v0)
            .cross(&(v2 - v0))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn append(&mut self, other: Mesh) {
        self.triangles.extend(other.triangles);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    fn quad(&mut self, corners: [(Point3<f64>, Vector3<f64>); 4]) {
        let [a, b, c, d] = corners.map(|(p, n)| Vertex::from_f64(p, n));
        self.add_triangle(Triangle::new(a, b, c));
        self.add_triangle(Triangle::new(a, c, d));
    }
}

/// Two unit vectors completing an orthonormal basis with `axis`.
fn perpendiculars(axis: Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let first = axis.cross(&helper).normalize();
    let second = axis.cross(&first);
    (first, second)
}

/// Capped prism of `sides` faces around a strut.
///
/// Zero-length struts yield an empty mesh.
pub fn strut_mesh(strut: &StrutSegment, radius: f64, sides: usize) -> Mesh {
    let sides = sides.max(3);
    let length = strut.length();
    if length < f64::EPSILON {
        return Mesh::new();
    }

    let axis = (strut.end - strut.start) / length;
    let (u, v) = perpendiculars(axis);
    let offsets: Vec<Vector3<f64>> = (0..sides)
        .map(|i| {
            let angle = TAU * i as f64 / sides as f64;
            u * angle.cos() + v * angle.sin()
        })
        .collect();

    let mut mesh = Mesh::with_capacity(sides * 4);
    for i in 0..sides {
        let next = (i + 1) % sides;
        let (n0, n1) = (offsets[i], offsets[next]);
        mesh.quad([
            (strut.start + n0 * radius, n0),
            (strut.start + n1 * radius, n1),
            (strut.end + n1 * radius, n1),
            (strut.end + n0 * radius, n0),
        ]);

        let cap = |center: Point3<f64>, normal: Vector3<f64>, a: Vector3<f64>, b: Vector3<f64>| {
            Triangle::new(
                Vertex::from_f64(center, normal),
                Vertex::from_f64(center + a * radius, normal),
                Vertex::from_f64(center + b * radius, normal),
            )
        };
        mesh.add_triangle(cap(strut.start, -axis, n1, n0));
        mesh.add_triangle(cap(strut.end, axis, n0, n1));
    }
    mesh
}

/// Torus tube following a horizontal ring.
///
/// A ring of zero radius collapses to nothing.
pub fn ring_mesh(ring: &RingSpec, tube_radius: f64, segments: usize, sides: usize) -> Mesh {
    let segments = segments.max(3);
    let sides = sides.max(3);
    if ring.radius < f64::EPSILON {
        return Mesh::new();
    }

    let point = |i: usize, j: usize| {
        let around = TAU * (i % segments) as f64 / segments as f64;
        let tube = TAU * (j % sides) as f64 / sides as f64;
        let outward = Vector3::new(around.cos(), 0.0, around.sin());
        let normal = outward * tube.cos() + Vector3::y() * tube.sin();
        let center = Point3::new(0.0, ring.height, 0.0) + outward * ring.radius;
        (center + normal * tube_radius, normal)
    };

    let mut mesh = Mesh::with_capacity(segments * sides * 2);
    for i in 0..segments {
        for j in 0..sides {
            mesh.quad([point(i, j), point(i + 1, j), point(i + 1, j + 1), point(i, j + 1)]);
        }
    }
    mesh
}

/// Mesh every strut and ring of a tower.
///
/// Rings use the strut thickness for their tube.
pub fn tower_mesh(geometry: &TowerGeometry, strut_radius: f64) -> Mesh {
    let mut mesh = Mesh::with_capacity(
        geometry.struts.len() * STRUT_SIDES * 4 + geometry.rings.len() * RING_SEGMENTS * RING_SIDES * 2,
    );
    for strut in &geometry.struts {
        mesh.append(strut_mesh(strut, strut_radius, STRUT_SIDES));
    }
    for ring in &geometry.rings {
        mesh.append(ring_mesh(ring, strut_radius, RING_SEGMENTS, RING_SIDES));
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Helicity;
    use approx::assert_relative_eq;

    fn strut(start: Point3<f64>, end: Point3<f64>) -> StrutSegment {
        StrutSegment {
            start,
            end,
            section: 0,
            family: Helicity::Positive,
        }
    }

    #[test]
    fn test_strut_mesh_counts() {
        let mesh = strut_mesh(&strut(Point3::origin(), Point3::new(0.0, 10.0, 0.0)), 0.5, 6);
        // 6 side quads plus 6 triangles per cap.
        assert_eq!(mesh.triangles.len(), 24);
    }

    #[test]
    fn test_strut_mesh_radius() {
        let mesh = strut_mesh(&strut(Point3::origin(), Point3::new(0.0, 10.0, 0.0)), 0.5, 8);
        for triangle in &mesh.triangles {
            for vertex in &triangle.vertices {
                let p = vertex.position;
                let planar = (p.x * p.x + p.z * p.z).sqrt();
                assert!(planar < 0.5 + 1e-5);
                assert!(p.y >= -1e-5 && p.y <= 10.0 + 1e-5);
            }
        }
    }

    #[test]
    fn test_zero_length_strut() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(strut_mesh(&strut(p, p), 0.5, 6).is_empty());
    }

    #[test]
    fn test_ring_mesh() {
        let ring = RingSpec {
            radius: 20.0,
            height: 5.0,
            section: 0,
        };
        let mesh = ring_mesh(&ring, 0.5, 16, 4);
        assert_eq!(mesh.triangles.len(), 16 * 4 * 2);
        for triangle in &mesh.triangles {
            for vertex in &triangle.vertices {
                let p = vertex.position;
                let planar = (p.x * p.x + p.z * p.z).sqrt();
                assert!((planar - 20.0).abs() <= 0.5 + 1e-4);
                assert!((p.y - 5.0).abs() <= 0.5 + 1e-4);
            }
        }
    }

    #[test]
    fn test_collapsed_ring() {
        let ring = RingSpec {
            radius: 0.0,
            height: 5.0,
            section: 0,
        };
        assert!(ring_mesh(&ring, 0.5, 16, 4).is_empty());
    }

    #[test]
    fn test_face_normal() {
        let triangle = Triangle::new(
            Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
        );
        assert_relative_eq!(triangle.calculate_normal(), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_degenerate_face_normal() {
        let v = Vertex::new(1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let triangle = Triangle::new(v, v, v);
        assert_eq!(triangle.calculate_normal(), Vector3::zeros());
    }

    #[test]
    fn test_tower_mesh() {
        let spec = crate::params::TowerSpec {
            section_count: 1,
            strut_count: 4,
            show_rings: false,
            ..Default::default()
        };
        let tower = crate::tower::build_tower(&spec);
        let mesh = tower_mesh(&tower, spec.strut_radius);
        assert_eq!(mesh.triangles.len(), 8 * STRUT_SIDES * 4);
    }
}
