//! Tessellation pipeline state object.
//!
//! Built once per device/target combination and shared (`Arc`) by every mesh
//! renderer. Owns the render pipelines (fill and optional wireframe), the
//! factor kernel, the bind group layouts and the depth state.

use std::sync::Arc;

use super::config::{ControlPointLayout, TessellationConfig};
use super::error::{DeviceCapabilityError, TessError};
use super::factors::{factor_read_layout, FactorKernel};
use super::tessellator::Tessellator;
use super::uniforms::{SHADING_UNIFORMS_SIZE, TRANSFORM_UNIFORMS_SIZE};
use crate::device::GpuCapabilities;
use crate::mesh::VertexLayout;

pub(crate) const TESSELLATION_SHADER: &str = include_str!("shaders/tessellation.wgsl");
pub(crate) const VERTEX_ENTRY_POINT: &str = "tessellation_triangle_vertex";
pub(crate) const FRAGMENT_ENTRY_POINT: &str = "lambert_fragment";

/// Storage buffers read by the tessellation vertex stage: control points + factor record.
const REQUIRED_STORAGE_BUFFERS_PER_STAGE: u32 = 2;
const REQUIRED_BIND_GROUPS: u32 = 2;

/// Attachment formats the pipeline renders into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PipelineTargets {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub sample_count: u32,
}

/// Fails when the device cannot run vertex-pulled tessellation.
pub fn check_device(caps: &GpuCapabilities) -> Result<(), DeviceCapabilityError> {
    if !caps.downlevel_flags.contains(wgpu::DownlevelFlags::COMPUTE_SHADERS) {
        return Err(DeviceCapabilityError::ComputeShaders);
    }
    if !caps.downlevel_flags.contains(wgpu::DownlevelFlags::VERTEX_STORAGE) {
        return Err(DeviceCapabilityError::VertexStorage);
    }
    let available = caps.limits.max_storage_buffers_per_shader_stage;
    if available < REQUIRED_STORAGE_BUFFERS_PER_STAGE {
        return Err(DeviceCapabilityError::StorageBuffersPerStage {
            available,
            required: REQUIRED_STORAGE_BUFFERS_PER_STAGE,
        });
    }
    let available = caps.limits.max_bind_groups;
    if available < REQUIRED_BIND_GROUPS {
        return Err(DeviceCapabilityError::BindGroups { available, required: REQUIRED_BIND_GROUPS });
    }
    Ok(())
}

/// Full WGSL source of the tessellation stage chain for one configuration.
pub(crate) fn compose_shader(tessellator: &Tessellator, cp: &ControlPointLayout) -> String {
    let mut src = format!(
        "// ---- control point layout (generated) ----\n\
         const CP_STRIDE: u32 = {}u;\n\
         const CP_POSITION: u32 = {}u;\n\
         const CP_NORMAL: u32 = {}u;\n\
         const CP_TANGENT: u32 = {}u;\n\
         const CP_HAS_TANGENT: bool = {};\n\
         const CP_TEXCOORD: u32 = {}u;\n",
        cp.stride_words,
        cp.position,
        cp.normal,
        cp.tangent.unwrap_or(0),
        cp.tangent.is_some(),
        cp.texcoord,
    );
    src.push_str(&tessellator.wgsl_library());
    src.push('\n');
    src.push_str(TESSELLATION_SHADER);
    src
}

/// Immutable, validated configuration of the tessellation stage chain.
#[derive(Debug)]
pub struct TessellationPipelineState {
    config: TessellationConfig,
    tessellator: Tessellator,
    control_points: ControlPointLayout,
    targets: PipelineTargets,

    fill: wgpu::RenderPipeline,
    wireframe: Option<wgpu::RenderPipeline>,
    depth_stencil: wgpu::DepthStencilState,

    material_layout: wgpu::BindGroupLayout,
    factor_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    factor_kernel: FactorKernel,
}

impl TessellationPipelineState {
    /// Validates `config`, `layout` and the device, then compiles every pipeline.
    ///
    /// Fails with:
    /// - `DeviceCapabilityError` when the device lacks compute/vertex-storage support
    /// - `ConfigurationError` for options the emulated tessellator does not implement
    pub fn build(
        device: &wgpu::Device,
        caps: &GpuCapabilities,
        targets: &PipelineTargets,
        layout: &VertexLayout,
        config: &TessellationConfig,
    ) -> Result<Arc<Self>, TessError> {
        check_device(caps)?;
        config.validate()?;
        let control_points = ControlPointLayout::resolve(layout)?;
        let tessellator = Tessellator::from_config(config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera tessellation shader"),
            source: wgpu::ShaderSource::Wgsl(compose_shader(&tessellator, &control_points).into()),
        });

        let material_layout = material_layout(device);
        let factor_layout = factor_read_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera tessellation pipeline layout"),
            bind_group_layouts: &[&material_layout, &factor_layout],
            immediate_size: 0,
        });

        let depth_stencil = wgpu::DepthStencilState {
            format: targets.depth_format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let make_pipeline = |label: &str, polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(VERTEX_ENTRY_POINT),
                    compilation_options: Default::default(),
                    // control points are pulled from storage per patch
                    buffers: &[],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(FRAGMENT_ENTRY_POINT),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: targets.color_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: config.output_winding.front_face(),
                    cull_mode: None,
                    polygon_mode,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: Some(depth_stencil.clone()),
                multisample: wgpu::MultisampleState {
                    count: targets.sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },

                multiview_mask: None,
                cache: None,
            })
        };

        let fill = make_pipeline("tessera tessellation pipeline", wgpu::PolygonMode::Fill);
        let wireframe = if caps.features.contains(wgpu::Features::POLYGON_MODE_LINE) {
            Some(make_pipeline("tessera tessellation wireframe pipeline", wgpu::PolygonMode::Line))
        } else {
            log::warn!("POLYGON_MODE_LINE unavailable; wireframe rendering disabled");
            None
        };

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessera material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let factor_kernel = FactorKernel::new(device);

        log::debug!(
            "tessellation pipeline built: {:?} {:?}, max factor {}, {} vertices per patch, {}x msaa",
            config.partition_mode,
            config.output_winding,
            config.max_tessellation_factor,
            tessellator.vertices_per_patch(),
            targets.sample_count
        );

        Ok(Arc::new(Self {
            config: *config,
            tessellator,
            control_points,
            targets: *targets,
            fill,
            wireframe,
            depth_stencil,
            material_layout,
            factor_layout,
            sampler,
            factor_kernel,
        }))
    }

    #[inline]
    pub fn config(&self) -> &TessellationConfig {
        &self.config
    }

    #[inline]
    pub fn tessellator(&self) -> &Tessellator {
        &self.tessellator
    }

    #[inline]
    pub fn control_points(&self) -> &ControlPointLayout {
        &self.control_points
    }

    #[inline]
    pub fn targets(&self) -> &PipelineTargets {
        &self.targets
    }

    pub fn depth_stencil(&self) -> &wgpu::DepthStencilState {
        &self.depth_stencil
    }

    pub fn supports_wireframe(&self) -> bool {
        self.wireframe.is_some()
    }

    /// Line-fill variant when requested and available, fill otherwise.
    pub fn pipeline(&self, wireframe: bool) -> &wgpu::RenderPipeline {
        match (&self.wireframe, wireframe) {
            (Some(line), true) => line,
            _ => &self.fill,
        }
    }

    pub(crate) fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    pub(crate) fn factor_layout(&self) -> &wgpu::BindGroupLayout {
        &self.factor_layout
    }

    pub(crate) fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub(crate) fn factor_kernel(&self) -> &FactorKernel {
        &self.factor_kernel
    }
}

fn buffer_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    ty: wgpu::BufferBindingType,
    min_size: u64,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(min_size),
        },
        count: None,
    }
}

fn texture_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Group 0: transforms, control points, shading uniforms, material maps, sampler.
fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    use wgpu::ShaderStages as S;

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("tessera material bgl"),
        entries: &[
            buffer_entry(0, S::VERTEX, wgpu::BufferBindingType::Uniform, TRANSFORM_UNIFORMS_SIZE),
            // one f32 word minimum; the array is runtime sized
            buffer_entry(1, S::VERTEX, wgpu::BufferBindingType::Storage { read_only: true }, 4),
            buffer_entry(2, S::VERTEX, wgpu::BufferBindingType::Uniform, SHADING_UNIFORMS_SIZE),
            texture_entry(3, S::VERTEX),
            texture_entry(4, S::FRAGMENT),
            texture_entry(5, S::FRAGMENT),
            wgpu::BindGroupLayoutEntry {
                binding: 6,
                visibility: S::VERTEX | S::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tess::config::{PartitionMode, Winding};
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    fn caps() -> GpuCapabilities {
        GpuCapabilities {
            features: wgpu::Features::empty(),
            limits: wgpu::Limits::default(),
            downlevel_flags: wgpu::DownlevelFlags::all(),
        }
    }

    fn validate(src: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(src).unwrap();
        Validator::new(ValidationFlags::all(), Capabilities::all()).validate(&module).unwrap();
        module
    }

    #[test]
    fn full_capabilities_pass() {
        assert_eq!(check_device(&caps()), Ok(()));
    }

    #[test]
    fn missing_vertex_storage_is_reported() {
        let mut c = caps();
        c.downlevel_flags.remove(wgpu::DownlevelFlags::VERTEX_STORAGE);
        assert_eq!(check_device(&c), Err(DeviceCapabilityError::VertexStorage));

        c.downlevel_flags.remove(wgpu::DownlevelFlags::COMPUTE_SHADERS);
        assert_eq!(check_device(&c), Err(DeviceCapabilityError::ComputeShaders));
    }

    #[test]
    fn storage_buffer_limit_is_checked() {
        let mut c = caps();
        c.limits.max_storage_buffers_per_shader_stage = 1;
        assert_eq!(
            check_device(&c),
            Err(DeviceCapabilityError::StorageBuffersPerStage { available: 1, required: 2 })
        );
    }

    #[test]
    fn composed_shader_validates_with_standard_layout() {
        let cp = ControlPointLayout::resolve(&VertexLayout::standard().per_patch_control_point()).unwrap();
        let tess = Tessellator::from_config(&TessellationConfig::default());
        let module = validate(&compose_shader(&tess, &cp));

        let names: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&VERTEX_ENTRY_POINT));
        assert!(names.contains(&FRAGMENT_ENTRY_POINT));
    }

    #[test]
    fn composed_shader_validates_without_tangents() {
        let mut layout = VertexLayout::standard().per_patch_control_point();
        layout.attributes.retain(|a| a.semantic != crate::mesh::VertexSemantic::Tangent);
        let cp = ControlPointLayout::resolve(&layout).unwrap();
        let tess = Tessellator::new(PartitionMode::Integer, Winding::CounterClockwise, 64);
        let src = compose_shader(&tess, &cp);
        assert!(src.contains("const CP_HAS_TANGENT: bool = false;"));
        validate(&src);
    }
}
