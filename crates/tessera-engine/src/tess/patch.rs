//! Patch geometry builder.
//!
//! Converts an indexed triangle mesh into unindexed triangular patches. Every
//! index copies its vertex's full attribute block, so each patch owns its three
//! control points and no index buffer is needed at draw time.

use wgpu::util::DeviceExt;

use super::error::InvalidMeshError;
use crate::mesh::{ImportedMesh, VertexLayout};

/// Control points per triangular patch.
pub const CONTROL_POINTS_PER_PATCH: u32 = 3;

/// CPU-side patch list, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchGeometry {
    data: Vec<u8>,
    layout: VertexLayout,
    control_point_count: u32,
}

impl PatchGeometry {
    /// Flattens all submeshes, in order, into one patch list.
    pub fn build(mesh: &ImportedMesh) -> Result<Self, InvalidMeshError> {
        let stride = mesh.layout.stride;
        if stride == 0 || stride % 4 != 0 {
            return Err(InvalidMeshError::InvalidStride(stride));
        }
        if mesh.vertex_data.is_empty() {
            return Err(InvalidMeshError::NoVertexData);
        }
        if mesh.vertex_data.len() % stride as usize != 0 {
            return Err(InvalidMeshError::StrideMismatch { len: mesh.vertex_data.len(), stride });
        }
        if mesh.submeshes.is_empty() {
            return Err(InvalidMeshError::NoSubmeshes);
        }

        let vertex_count = mesh.vertex_count();
        let mut index_count = 0usize;
        for (submesh, s) in mesh.submeshes.iter().enumerate() {
            if s.indices.len() % 3 != 0 {
                return Err(InvalidMeshError::IndexCountNotTriangles { submesh, count: s.indices.len() });
            }
            if let Some(&index) = s.indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(InvalidMeshError::IndexOutOfRange { index, vertex_count });
            }
            index_count += s.indices.len();
        }
        if index_count == 0 {
            return Err(InvalidMeshError::NoIndices);
        }

        let stride = stride as usize;
        let mut data = Vec::with_capacity(index_count * stride);
        for &i in mesh.submeshes.iter().flat_map(|s| &s.indices) {
            let start = i as usize * stride;
            data.extend_from_slice(&mesh.vertex_data[start..start + stride]);
        }

        log::debug!(
            "patch geometry: {} vertices, {} indices -> {} patches ({} bytes)",
            vertex_count,
            index_count,
            index_count / 3,
            data.len()
        );

        Ok(Self {
            data,
            layout: mesh.layout.clone().per_patch_control_point(),
            control_point_count: index_count as u32,
        })
    }

    #[inline]
    pub fn control_point_count(&self) -> u32 {
        self.control_point_count
    }

    #[inline]
    pub fn patch_count(&self) -> u32 {
        self.control_point_count / CONTROL_POINTS_PER_PATCH
    }

    /// Layout of the patch data (always steps per patch control point).
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Attribute block of control point `i`.
    pub fn control_point(&self, i: usize) -> Option<&[u8]> {
        let stride = self.layout.stride as usize;
        let start = i.checked_mul(stride)?;
        self.data.get(start..start + stride)
    }

    /// Uploads the patch list into a storage buffer read by the tessellation stage.
    pub fn upload(&self, device: &wgpu::Device) -> PatchBuffer {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessera patch control points"),
            contents: &self.data,
            usage: wgpu::BufferUsages::STORAGE,
        });
        PatchBuffer {
            buffer,
            layout: self.layout.clone(),
            control_point_count: self.control_point_count,
        }
    }
}

/// GPU-resident patch list. Immutable after upload.
#[derive(Debug)]
pub struct PatchBuffer {
    pub buffer: wgpu::Buffer,
    pub layout: VertexLayout,
    pub control_point_count: u32,
}

impl PatchBuffer {
    #[inline]
    pub fn patch_count(&self) -> u32 {
        self.control_point_count / CONTROL_POINTS_PER_PATCH
    }
}

/// Builds and uploads in one step.
pub fn build_patch_buffer(device: &wgpu::Device, mesh: &ImportedMesh) -> Result<PatchBuffer, InvalidMeshError> {
    Ok(PatchGeometry::build(mesh)?.upload(device))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{ControlPointVertex, StepFunction, Submesh};

    fn vertex(i: usize) -> ControlPointVertex {
        let f = i as f32;
        ControlPointVertex {
            position: [f, f + 0.5, -f],
            normal: [0.0, 0.0, 1.0],
            tangent: [1.0, 0.0, 0.0],
            uv: [f * 0.1, 1.0 - f * 0.1],
        }
    }

    fn vertices(n: usize) -> Vec<ControlPointVertex> {
        (0..n).map(vertex).collect()
    }

    #[test]
    fn two_separate_triangles_make_two_patches() {
        let mesh = ImportedMesh::from_vertices(&vertices(6), vec![0, 1, 2, 3, 4, 5]);
        let patches = PatchGeometry::build(&mesh).unwrap();
        assert_eq!(patches.patch_count(), 2);
        assert_eq!(patches.control_point_count(), 6);
        assert_eq!(patches.bytes(), mesh.vertex_data.as_slice());
        assert_eq!(patches.layout().step_function, StepFunction::PerPatchControlPoint);
    }

    #[test]
    fn shared_vertices_are_duplicated_per_index() {
        // quad from 4 vertices, 2 triangles sharing an edge
        let verts = vertices(4);
        let indices = vec![0u16, 1, 2, 2, 1, 3];
        let mesh = ImportedMesh::from_vertices(&verts, indices.clone());
        let patches = PatchGeometry::build(&mesh).unwrap();

        assert_eq!(patches.patch_count(), 2);
        for (k, &i) in indices.iter().enumerate() {
            let cp: ControlPointVertex = bytemuck::pod_read_unaligned(patches.control_point(k).unwrap());
            assert_eq!(cp, verts[i as usize], "control point {k}");
        }
        assert!(patches.control_point(6).is_none());
    }

    #[test]
    fn submeshes_are_flattened_in_order() {
        let mut mesh = ImportedMesh::from_vertices(&vertices(3), vec![0, 1, 2]);
        mesh.submeshes.push(Submesh { indices: vec![2, 1, 0] });
        let patches = PatchGeometry::build(&mesh).unwrap();

        assert_eq!(patches.patch_count(), 2);
        let last: ControlPointVertex = bytemuck::pod_read_unaligned(patches.control_point(5).unwrap());
        assert_eq!(last, vertex(0));
    }

    #[test]
    fn patch_count_is_index_count_over_three() {
        for k in 1..12usize {
            let indices: Vec<u16> = (0..k * 3).map(|i| (i % 5) as u16).collect();
            let mesh = ImportedMesh::from_vertices(&vertices(5), indices);
            assert_eq!(PatchGeometry::build(&mesh).unwrap().patch_count(), k as u32);
        }
    }

    #[test]
    fn rejects_partial_triangles() {
        let mesh = ImportedMesh::from_vertices(&vertices(3), vec![0, 1, 2, 0]);
        assert_eq!(
            PatchGeometry::build(&mesh),
            Err(InvalidMeshError::IndexCountNotTriangles { submesh: 0, count: 4 })
        );
    }

    #[test]
    fn rejects_empty_meshes() {
        let mesh = ImportedMesh::from_vertices(&[], vec![]);
        assert_eq!(PatchGeometry::build(&mesh), Err(InvalidMeshError::NoVertexData));

        let mut no_submesh = ImportedMesh::from_vertices(&vertices(3), vec![]);
        no_submesh.submeshes.clear();
        assert_eq!(PatchGeometry::build(&no_submesh), Err(InvalidMeshError::NoSubmeshes));

        let no_indices = ImportedMesh::from_vertices(&vertices(3), vec![]);
        assert_eq!(PatchGeometry::build(&no_indices), Err(InvalidMeshError::NoIndices));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mesh = ImportedMesh::from_vertices(&vertices(3), vec![0, 1, 3]);
        assert_eq!(
            PatchGeometry::build(&mesh),
            Err(InvalidMeshError::IndexOutOfRange { index: 3, vertex_count: 3 })
        );
    }

    #[test]
    fn rejects_bad_strides() {
        let mut mesh = ImportedMesh::from_vertices(&vertices(3), vec![0, 1, 2]);
        mesh.vertex_data.push(0);
        assert!(matches!(PatchGeometry::build(&mesh), Err(InvalidMeshError::StrideMismatch { .. })));

        mesh.layout.stride = 0;
        assert_eq!(PatchGeometry::build(&mesh), Err(InvalidMeshError::InvalidStride(0)));

        mesh.layout.stride = 6;
        assert_eq!(PatchGeometry::build(&mesh), Err(InvalidMeshError::InvalidStride(6)));
    }
}
