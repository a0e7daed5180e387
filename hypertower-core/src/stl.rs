/// STL export for binary and ASCII formats
use std::io::Write;

use crate::error::Result;
use crate::mesh::{Mesh, Triangle};

const HEADER_LEN: usize = 80;

fn facet_normal(triangle: &Triangle) -> [f32; 3] {
    let n = triangle.calculate_normal();
    [n.x, n.y, n.z]
}

/// Write a binary STL: 80-byte header, little-endian facet count, 50 bytes per facet.
pub fn write_binary_stl<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    let mut header = [0u8; HEADER_LEN];
    let label = b"hypertower binary STL";
    header[..label.len()].copy_from_slice(label);
    writer.write_all(&header)?;

    let count = u32::try_from(mesh.triangles.len()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "too many triangles for a binary STL",
        )
    })?;
    writer.write_all(&count.to_le_bytes())?;

    let mut facet = [0u8; 50];
    for triangle in &mesh.triangles {
        let normal = facet_normal(triangle);
        let coords = normal.into_iter().chain(
            triangle
                .vertices
                .iter()
                .flat_map(|v| [v.position.x, v.position.y, v.position.z]),
        );
        for (i, value) in coords.enumerate() {
            facet[i * 4..i * 4 + 4].copy_from_slice(&value.to_le_bytes());
        }
        // Attribute byte count stays zero.
        writer.write_all(&facet)?;
    }

    tracing::debug!(triangles = count, "wrote binary STL");
    Ok(())
}

/// Write an ASCII STL solid named `name`.
pub fn write_ascii_stl<W: Write>(mesh: &Mesh, name: &str, writer: &mut W) -> Result<()> {
    writeln!(writer, "solid {name}")?;
    for triangle in &mesh.triangles {
        let [nx, ny, nz] = facet_normal(triangle);
        writeln!(writer, "  facet normal {nx:e} {ny:e} {nz:e}")?;
        writeln!(writer, "    outer loop")?;
        for vertex in &triangle.vertices {
            let p = vertex.position;
            writeln!(writer, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;

    tracing::debug!(triangles = mesh.triangles.len(), "wrote ASCII STL");
    Ok(())
}
