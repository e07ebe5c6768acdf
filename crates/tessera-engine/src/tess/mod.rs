//! GPU tessellation core.
//!
//! Data flow, once per mesh:
//! - `ImportedMesh` → [`PatchGeometry`] → [`PatchBuffer`]
//!
//! and per frame, for each active [`MeshRenderer`]:
//! - factor kernel writes the half-precision factor record ([`factors`])
//! - the tessellation stage expands every patch from that record ([`tessellator`])
//! - Lambert shading with diffuse/normal maps
//!
//! wgpu exposes no hull/domain stages, so tessellation is emulated in the vertex
//! stage: one draw instance per patch, control points pulled from storage.

mod config;
mod error;
pub mod factors;
mod patch;
mod pipeline;
mod renderer;
pub mod tessellator;
mod uniforms;

pub use config::{
    ControlPointIndexType, ControlPointLayout, FactorFormat, FactorStepFunction, PartitionMode, TessellationConfig,
    Winding, DEVICE_MAX_TESSELLATION_FACTOR,
};
pub use error::{ConfigurationError, DeviceCapabilityError, InvalidMeshError, TessError};
pub use factors::{FactorControl, FactorParams, TriangleFactors};
pub use patch::{build_patch_buffer, PatchBuffer, PatchGeometry, CONTROL_POINTS_PER_PATCH};
pub use pipeline::{check_device, PipelineTargets, TessellationPipelineState};
pub use renderer::{MeshRenderer, PatchDraw};
pub use tessellator::{PatchLayout, Tessellator};
pub use uniforms::{QueueUniformSink, ShadingUniformState, ShadingUniforms, TransformUniforms, UniformSink};
