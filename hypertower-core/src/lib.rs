/// Hypertower Core Library - Geometry of stacked hyperboloid lattice towers
///
/// The geometry is a pure function of a [`TowerSpec`]: the section
/// partitioner splits the tower into hyperboloid sections, and the
/// ruled-surface evaluator derives struts, rings and waists for each one.
/// Meshing, STL export, parameter queries and camera helpers sit on top for
/// the renderers.

pub mod error;
pub mod mesh;
pub mod orbit;
pub mod params;
pub mod projection;
pub mod query;
pub mod section;
pub mod stl;
pub mod surface;
pub mod tower;

// Re-export commonly used types
pub use error::{Error, Result};
pub use mesh::{Mesh, Triangle, Vertex};
pub use orbit::Orbit;
pub use params::{Partition, TowerSpec, WaistMode};
pub use projection::{Camera, ProjectionMode};
pub use query::{apply_query, apply_query_lenient, Parameter};
pub use section::{partition, Section};
pub use surface::{radius_at, waist, Helicity, RingSpec, StrutSegment, WaistGeometry};
pub use tower::{build_tower, calculate_waist_geometry, TowerGeometry};
