use super::layout::{ControlPointVertex, VertexLayout};

/// One index range of a mesh, describing a triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submesh {
    pub indices: Vec<u16>,
}

/// Mesh handed over by the asset-loading collaborator.
///
/// Vertex data is interleaved according to `layout`. No validation happens here;
/// the patch builder rejects malformed meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedMesh {
    pub vertex_data: Vec<u8>,
    pub layout: VertexLayout,
    pub submeshes: Vec<Submesh>,
}

impl ImportedMesh {
    /// Builds a single-submesh mesh in the standard layout.
    pub fn from_vertices(vertices: &[ControlPointVertex], indices: Vec<u16>) -> Self {
        Self {
            vertex_data: bytemuck::cast_slice(vertices).to_vec(),
            layout: VertexLayout::standard(),
            submeshes: vec![Submesh { indices }],
        }
    }

    /// Number of whole vertices in `vertex_data` (0 for a zero stride).
    pub fn vertex_count(&self) -> usize {
        match self.layout.stride as usize {
            0 => 0,
            stride => self.vertex_data.len() / stride,
        }
    }

    pub fn index_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.indices.len()).sum()
    }

    /// Raw attribute bytes of vertex `i`, if in range.
    pub fn vertex_bytes(&self, i: usize) -> Option<&[u8]> {
        let stride = self.layout.stride as usize;
        let start = i.checked_mul(stride)?;
        self.vertex_data.get(start..start + stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vertices_uses_standard_stride() {
        let verts = [ControlPointVertex::default(); 3];
        let mesh = ImportedMesh::from_vertices(&verts, vec![0, 1, 2]);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.vertex_bytes(2).map(<[u8]>::len), Some(44));
        assert!(mesh.vertex_bytes(3).is_none());
    }
}
