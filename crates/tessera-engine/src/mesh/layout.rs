use bytemuck::{Pod, Zeroable};

/// Attribute meaning, used to locate control-point fields by role.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexSemantic {
    Position,
    Normal,
    Tangent,
    TexCoord,
}

/// Attribute storage format. Only 32-bit float vectors are supported; control points
/// are read from a storage buffer as `f32` words.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    #[inline]
    pub const fn size(self) -> u32 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

/// How the attribute stream advances.
///
/// The tessellation pipeline requires `PerPatchControlPoint`: control points are
/// pulled in sequence per patch, with no index buffer between them.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StepFunction {
    PerVertex,
    PerInstance,
    PerPatchControlPoint,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub format: VertexFormat,
    /// Byte offset inside one vertex.
    pub offset: u32,
}

/// Interleaved vertex layout: one buffer, fixed stride.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    pub stride: u32,
    pub step_function: StepFunction,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout of [`ControlPointVertex`], stepping per vertex (import side).
    pub fn standard() -> Self {
        Self {
            stride: std::mem::size_of::<ControlPointVertex>() as u32,
            step_function: StepFunction::PerVertex,
            attributes: vec![
                VertexAttribute { semantic: VertexSemantic::Position, format: VertexFormat::Float32x3, offset: 0 },
                VertexAttribute { semantic: VertexSemantic::Normal, format: VertexFormat::Float32x3, offset: 12 },
                VertexAttribute { semantic: VertexSemantic::Tangent, format: VertexFormat::Float32x3, offset: 24 },
                VertexAttribute { semantic: VertexSemantic::TexCoord, format: VertexFormat::Float32x2, offset: 36 },
            ],
        }
    }

    /// Same attributes, re-declared to step per patch control point.
    ///
    /// This is the layout the tessellation pipeline is built against.
    pub fn per_patch_control_point(mut self) -> Self {
        self.step_function = StepFunction::PerPatchControlPoint;
        self
    }

    pub fn attribute(&self, semantic: VertexSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }
}

/// Default interleaved vertex: position, normal, tangent, uv (44 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct ControlPointVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub uv: [f32; 2],
}

// Layout validation (matches `VertexLayout::standard`).
const _: [(); 44] = [(); std::mem::size_of::<ControlPointVertex>()];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_matches_vertex_struct() {
        let layout = VertexLayout::standard();
        assert_eq!(layout.stride, 44);
        for a in &layout.attributes {
            assert!(a.offset + a.format.size() <= layout.stride, "{a:?} overflows stride");
        }
        assert_eq!(layout.attribute(VertexSemantic::TexCoord).map(|a| a.offset), Some(36));
    }

    #[test]
    fn per_patch_control_point_only_changes_step_function() {
        let base = VertexLayout::standard();
        let patched = base.clone().per_patch_control_point();
        assert_eq!(patched.step_function, StepFunction::PerPatchControlPoint);
        assert_eq!(patched.attributes, base.attributes);
        assert_eq!(patched.stride, base.stride);
    }
}
