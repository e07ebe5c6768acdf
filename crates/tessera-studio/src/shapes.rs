//! Procedural meshes in the engine's import format.

use std::f32::consts::{PI, TAU};

use tessera_engine::mesh::{ControlPointVertex, ImportedMesh};

fn vertex(position: [f32; 3], normal: [f32; 3], tangent: [f32; 3], uv: [f32; 2]) -> ControlPointVertex {
    ControlPointVertex { position, normal, tangent, uv }
}

/// Single triangle in the XY plane facing +Z, `size` wide and tall.
pub fn triangle(size: f32) -> ImportedMesh {
    let h = size * 0.5;
    let n = [0.0, 0.0, 1.0];
    let t = [1.0, 0.0, 0.0];
    let vertices = [
        vertex([0.0, h, 0.0], n, t, [0.5, 0.0]),
        vertex([-h, -h, 0.0], n, t, [0.0, 1.0]),
        vertex([h, -h, 0.0], n, t, [1.0, 1.0]),
    ];
    ImportedMesh::from_vertices(&vertices, vec![0, 1, 2])
}

/// Axis-aligned box centered on the origin; four vertices per face so every
/// face keeps its own normal.
pub fn cuboid(size: f32) -> ImportedMesh {
    let h = size * 0.5;
    // (normal, tangent, bitangent) per face; tangent follows +u, bitangent -v
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, t, b) in faces {
        let base = vertices.len() as u16;
        let corners = [
            (-1.0, 1.0, [0.0, 0.0]),
            (1.0, 1.0, [1.0, 0.0]),
            (1.0, -1.0, [1.0, 1.0]),
            (-1.0, -1.0, [0.0, 1.0]),
        ];
        for (su, sv, uv) in corners {
            let p = [
                (n[0] + t[0] * su + b[0] * sv) * h,
                (n[1] + t[1] * su + b[1] * sv) * h,
                (n[2] + t[2] * su + b[2] * sv) * h,
            ];
            vertices.push(vertex(p, n, t, uv));
        }
        indices.extend_from_slice(&[base, base + 3, base + 2, base, base + 2, base + 1]);
    }
    ImportedMesh::from_vertices(&vertices, indices)
}

/// Unit-radius UV sphere with `segments` rings and `segments` slices.
///
/// The seam column is duplicated so texture coordinates wrap; pole rows are
/// duplicated per slice. Pole triangles with two coincident corners are skipped.
pub fn uv_sphere(segments: u16) -> ImportedMesh {
    let segs = segments.max(3);
    let row = segs + 1;

    let mut vertices = Vec::with_capacity(usize::from(row) * usize::from(row));
    for r in 0..=segs {
        let v = f32::from(r) / f32::from(segs);
        let (sin_t, cos_t) = (v * PI).sin_cos();
        for s in 0..=segs {
            let u = f32::from(s) / f32::from(segs);
            let (sin_p, cos_p) = (u * TAU).sin_cos();
            let n = [sin_t * cos_p, cos_t, sin_t * sin_p];
            let t = [-sin_p, 0.0, cos_p];
            vertices.push(vertex(n, n, t, [u, v]));
        }
    }

    let mut indices = Vec::new();
    for r in 0..segs {
        for s in 0..segs {
            let a = r * row + s;
            let b = a + row;
            if r != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if r != segs - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }
    ImportedMesh::from_vertices(&vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_engine::tess::PatchGeometry;

    fn position(mesh: &ImportedMesh, i: usize) -> [f32; 3] {
        let v: ControlPointVertex = read_vertex(mesh.vertex_bytes(i).unwrap());
        v.position
    }

    fn read_vertex(bytes: &[u8]) -> ControlPointVertex {
        let f: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        vertex([f[0], f[1], f[2]], [f[3], f[4], f[5]], [f[6], f[7], f[8]], [f[9], f[10]])
    }

    #[test]
    fn triangle_is_one_patch() {
        let mesh = triangle(2.0);
        let patches = PatchGeometry::build(&mesh).unwrap();
        assert_eq!(patches.patch_count(), 1);
        assert_eq!(position(&mesh, 0), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn cuboid_has_twelve_patches_on_its_surface() {
        let mesh = cuboid(1.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(PatchGeometry::build(&mesh).unwrap().patch_count(), 12);
        for i in 0..mesh.vertex_count() {
            let p = position(&mesh, i);
            let max = p.iter().fold(0.0f32, |m, c| m.max(c.abs()));
            assert!((max - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn sphere_skips_degenerate_pole_triangles() {
        let mesh = uv_sphere(6);
        assert_eq!(mesh.vertex_count(), 49);
        assert_eq!(mesh.index_count(), 3 * 2 * 6 * 5);

        for i in 0..mesh.vertex_count() {
            let v = read_vertex(mesh.vertex_bytes(i).unwrap());
            let len = v.position.iter().map(|c| c * c).sum::<f32>().sqrt();
            assert!((len - 1.0).abs() < 1e-5);
            let nt: f32 = v.normal.iter().zip(v.tangent).map(|(a, b)| a * b).sum();
            assert!(nt.abs() < 1e-5, "tangent not perpendicular at {i}");
        }
    }
}
