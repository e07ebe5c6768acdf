use thiserror::Error;

use super::config::{ControlPointIndexType, FactorStepFunction, PartitionMode};
use crate::mesh::{StepFunction, VertexSemantic};

/// Mesh rejected by the patch builder.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidMeshError {
    #[error("mesh has no vertex data")]
    NoVertexData,
    #[error("mesh has no submeshes")]
    NoSubmeshes,
    #[error("mesh has no indices")]
    NoIndices,
    #[error("vertex stride must be non-zero and a multiple of 4 bytes (got {0})")]
    InvalidStride(u32),
    #[error("vertex data length {len} is not a multiple of stride {stride}")]
    StrideMismatch { len: usize, stride: u32 },
    #[error("submesh {submesh} has {count} indices, which is not a multiple of 3")]
    IndexCountNotTriangles { submesh: usize, count: usize },
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },
}

/// Unsupported pipeline option or out-of-range runtime value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("tessellation factor {value} outside [1, {max}]")]
    FactorOutOfRange { value: u16, max: u16 },
    #[error("max tessellation factor {value} outside [{min}, {device_max}] for {partition:?}")]
    MaxFactorOutOfRange { value: u16, min: u16, device_max: u16, partition: PartitionMode },
    #[error("indexed control-point fetch ({0:?}) is not supported")]
    IndexedControlPoints(ControlPointIndexType),
    #[error("factor step function {0:?} is not supported; factors are uniform per mesh")]
    FactorStepFunction(FactorStepFunction),
    #[error("tessellation factor scaling is not supported")]
    FactorScaleEnabled,
    #[error("control-point attributes must step per patch control point (got {0:?})")]
    StepFunction(StepFunction),
    #[error("vertex layout is missing required attribute {0:?}")]
    MissingAttribute(VertexSemantic),
    #[error("vertex attribute {0:?} has an unsupported format or offset")]
    InvalidAttribute(VertexSemantic),
    #[error("vertex stride must be non-zero and a multiple of 4 bytes (got {0})")]
    InvalidStride(u32),
    #[error("mesh vertex layout differs from the layout the pipeline was built for")]
    LayoutMismatch,
}

/// Device cannot run the emulated tessellation pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceCapabilityError {
    #[error("device does not support compute shaders")]
    ComputeShaders,
    #[error("device does not support storage buffers in the vertex stage")]
    VertexStorage,
    #[error("device allows {available} storage buffers per shader stage, {required} required")]
    StorageBuffersPerStage { available: u32, required: u32 },
    #[error("device allows {available} bind groups, {required} required")]
    BindGroups { available: u32, required: u32 },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TessError {
    #[error(transparent)]
    InvalidMesh(#[from] InvalidMeshError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    DeviceCapability(#[from] DeviceCapabilityError),
}
