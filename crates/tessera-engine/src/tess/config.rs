use super::error::ConfigurationError;
use crate::mesh::{StepFunction, VertexFormat, VertexLayout, VertexSemantic};

/// Largest tessellation factor the emulated tessellator accepts.
pub const DEVICE_MAX_TESSELLATION_FACTOR: u16 = 64;

/// Storage precision of the factor record.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FactorFormat {
    #[default]
    Half,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ControlPointIndexType {
    #[default]
    None,
    UInt16,
    UInt32,
}

/// How factor records advance across patches and instances.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FactorStepFunction {
    /// One record shared by every patch.
    #[default]
    Constant,
    PerPatch,
    PerInstance,
    PerPatchAndPerInstance,
}

/// Emission order of domain triangles; also selects the pipeline front face.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Winding {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Winding {
    pub fn front_face(self) -> wgpu::FrontFace {
        match self {
            Winding::Clockwise => wgpu::FrontFace::Cw,
            Winding::CounterClockwise => wgpu::FrontFace::Ccw,
        }
    }
}

/// Edge partitioning scheme of the tessellator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PartitionMode {
    Integer,
    Pow2,
    FractionalOdd,
    #[default]
    FractionalEven,
}

impl PartitionMode {
    /// Smallest factor the mode can produce; inputs are clamped up to it.
    pub const fn min_factor(self) -> u16 {
        match self {
            PartitionMode::FractionalEven => 2,
            _ => 1,
        }
    }

    /// Discriminant shared with the WGSL tessellator library.
    pub(crate) const fn shader_id(self) -> u32 {
        match self {
            PartitionMode::Integer => 0,
            PartitionMode::Pow2 => 1,
            PartitionMode::FractionalOdd => 2,
            PartitionMode::FractionalEven => 3,
        }
    }
}

/// Fixed configuration of the tessellation stage chain.
///
/// `Default` yields the reference configuration:
/// - half-precision factors, one record per mesh
/// - unindexed control points
/// - clockwise winding, fractional-even partitioning, max factor 16
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TessellationConfig {
    pub factor_format: FactorFormat,
    pub control_point_index_type: ControlPointIndexType,
    pub factor_step_function: FactorStepFunction,
    pub output_winding: Winding,
    pub partition_mode: PartitionMode,
    pub max_tessellation_factor: u16,
    pub factor_scale_enabled: bool,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            factor_format: FactorFormat::Half,
            control_point_index_type: ControlPointIndexType::None,
            factor_step_function: FactorStepFunction::Constant,
            output_winding: Winding::Clockwise,
            partition_mode: PartitionMode::FractionalEven,
            max_tessellation_factor: 16,
            factor_scale_enabled: false,
        }
    }
}

impl TessellationConfig {
    /// Checks every option against what the emulated tessellator implements.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.control_point_index_type != ControlPointIndexType::None {
            return Err(ConfigurationError::IndexedControlPoints(self.control_point_index_type));
        }
        if self.factor_step_function != FactorStepFunction::Constant {
            return Err(ConfigurationError::FactorStepFunction(self.factor_step_function));
        }
        if self.factor_scale_enabled {
            return Err(ConfigurationError::FactorScaleEnabled);
        }
        let min = self.partition_mode.min_factor();
        if !(min..=DEVICE_MAX_TESSELLATION_FACTOR).contains(&self.max_tessellation_factor) {
            return Err(ConfigurationError::MaxFactorOutOfRange {
                value: self.max_tessellation_factor,
                min,
                device_max: DEVICE_MAX_TESSELLATION_FACTOR,
                partition: self.partition_mode,
            });
        }
        Ok(())
    }
}

/// Word offsets of the control-point fields inside one storage-buffer record.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ControlPointLayout {
    pub stride_words: u32,
    pub position: u32,
    pub normal: u32,
    pub tangent: Option<u32>,
    pub texcoord: u32,
}

impl ControlPointLayout {
    /// Resolves a vertex layout into word offsets.
    ///
    /// The layout must step per patch control point and provide position, normal
    /// and texcoord. Tangents are optional.
    pub fn resolve(layout: &VertexLayout) -> Result<Self, ConfigurationError> {
        if layout.step_function != StepFunction::PerPatchControlPoint {
            return Err(ConfigurationError::StepFunction(layout.step_function));
        }
        if layout.stride == 0 || layout.stride % 4 != 0 {
            return Err(ConfigurationError::InvalidStride(layout.stride));
        }

        let field = |semantic: VertexSemantic, format: VertexFormat| -> Result<Option<u32>, ConfigurationError> {
            let Some(a) = layout.attribute(semantic) else {
                return Ok(None);
            };
            if a.format != format || a.offset % 4 != 0 || a.offset + a.format.size() > layout.stride {
                return Err(ConfigurationError::InvalidAttribute(semantic));
            }
            Ok(Some(a.offset / 4))
        };
        let required = |semantic: VertexSemantic, format: VertexFormat| -> Result<u32, ConfigurationError> {
            field(semantic, format)?.ok_or(ConfigurationError::MissingAttribute(semantic))
        };

        Ok(Self {
            stride_words: layout.stride / 4,
            position: required(VertexSemantic::Position, VertexFormat::Float32x3)?,
            normal: required(VertexSemantic::Normal, VertexFormat::Float32x3)?,
            tangent: field(VertexSemantic::Tangent, VertexFormat::Float32x3)?,
            texcoord: required(VertexSemantic::TexCoord, VertexFormat::Float32x2)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexAttribute;

    #[test]
    fn reference_config_is_valid() {
        assert_eq!(TessellationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn unsupported_options_are_rejected() {
        let base = TessellationConfig::default();

        let indexed = TessellationConfig { control_point_index_type: ControlPointIndexType::UInt16, ..base };
        assert!(matches!(indexed.validate(), Err(ConfigurationError::IndexedControlPoints(_))));

        let per_patch = TessellationConfig { factor_step_function: FactorStepFunction::PerPatch, ..base };
        assert!(matches!(per_patch.validate(), Err(ConfigurationError::FactorStepFunction(_))));

        let scaled = TessellationConfig { factor_scale_enabled: true, ..base };
        assert_eq!(scaled.validate(), Err(ConfigurationError::FactorScaleEnabled));
    }

    #[test]
    fn max_factor_bounds_depend_on_partition() {
        let even = TessellationConfig { max_tessellation_factor: 1, ..Default::default() };
        assert!(matches!(even.validate(), Err(ConfigurationError::MaxFactorOutOfRange { min: 2, .. })));

        let integer = TessellationConfig {
            partition_mode: PartitionMode::Integer,
            max_tessellation_factor: 1,
            ..Default::default()
        };
        assert_eq!(integer.validate(), Ok(()));

        let too_big = TessellationConfig { max_tessellation_factor: 65, ..Default::default() };
        assert!(too_big.validate().is_err());
    }

    #[test]
    fn resolve_standard_layout() {
        let layout = VertexLayout::standard().per_patch_control_point();
        let cp = ControlPointLayout::resolve(&layout).unwrap();
        assert_eq!(
            cp,
            ControlPointLayout { stride_words: 11, position: 0, normal: 3, tangent: Some(6), texcoord: 9 }
        );
    }

    #[test]
    fn resolve_rejects_per_vertex_step() {
        let err = ControlPointLayout::resolve(&VertexLayout::standard()).unwrap_err();
        assert_eq!(err, ConfigurationError::StepFunction(StepFunction::PerVertex));
    }

    #[test]
    fn resolve_without_tangent_and_missing_normal() {
        let mut layout = VertexLayout::standard().per_patch_control_point();
        layout.attributes.retain(|a| a.semantic != VertexSemantic::Tangent);
        assert_eq!(ControlPointLayout::resolve(&layout).unwrap().tangent, None);

        layout.attributes.retain(|a| a.semantic != VertexSemantic::Normal);
        assert_eq!(
            ControlPointLayout::resolve(&layout),
            Err(ConfigurationError::MissingAttribute(VertexSemantic::Normal))
        );
    }

    #[test]
    fn resolve_rejects_misaligned_attribute() {
        let mut layout = VertexLayout::standard().per_patch_control_point();
        layout.attributes[1] = VertexAttribute {
            semantic: VertexSemantic::Normal,
            format: VertexFormat::Float32x3,
            offset: 13,
        };
        assert_eq!(
            ControlPointLayout::resolve(&layout),
            Err(ConfigurationError::InvalidAttribute(VertexSemantic::Normal))
        );
    }
}
