//! Tessellation factor compute stage.
//!
//! A single-thread compute kernel writes one half-precision triangle factor record
//! per mesh. The record never leaves the GPU; the host-side [`TriangleFactors`]
//! mirrors the kernel's output bit for bit.

use bytemuck::{Pod, Zeroable};
use half::f16;

use super::config::TessellationConfig;
use super::error::ConfigurationError;

pub(crate) const FACTOR_SHADER: &str = include_str!("shaders/factors.wgsl");
pub(crate) const FACTOR_ENTRY_POINT: &str = "tessellation_factors_compute";

/// Half-precision triangle factor record: three edge factors then the inside factor.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct TriangleFactors {
    pub edge: [u16; 3],
    pub inside: u16,
}

const _: [(); 8] = [(); std::mem::size_of::<TriangleFactors>()];

impl TriangleFactors {
    /// The record the kernel writes for uniform `edge` / `inside` factors.
    pub fn uniform(edge: u16, inside: u16) -> Self {
        let e = f16::from_f32(edge as f32).to_bits();
        Self {
            edge: [e; 3],
            inside: f16::from_f32(inside as f32).to_bits(),
        }
    }

    pub fn edge_factors(&self) -> [f32; 3] {
        self.edge.map(|b| f16::from_bits(b).to_f32())
    }

    pub fn inside_factor(&self) -> f32 {
        f16::from_bits(self.inside).to_f32()
    }

    /// Packed words as produced by WGSL `pack2x16float` (low half first).
    pub fn to_words(&self) -> [u32; 2] {
        [
            self.edge[0] as u32 | (self.edge[1] as u32) << 16,
            self.edge[2] as u32 | (self.inside as u32) << 16,
        ]
    }
}

/// Kernel input; padded to 16 bytes for uniform binding.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct FactorParams {
    pub edge: u32,
    pub inside: u32,
    pub _pad: [u32; 2],
}

impl FactorParams {
    pub fn new(edge: u16, inside: u16) -> Self {
        Self { edge: edge as u32, inside: inside as u32, _pad: [0; 2] }
    }
}

// ── factor control ────────────────────────────────────────────────────────

/// Edge/inside factor pair with range checking.
///
/// Out-of-range values are rejected and the previous value is kept, so a
/// dispatch only ever sees factors in `[1, max_tessellation_factor]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FactorControl {
    max: u16,
    edge: u16,
    inside: u16,
}

impl FactorControl {
    /// Starts at 2/2, or at the configured max when that is lower.
    pub fn new(config: &TessellationConfig) -> Self {
        let start = config.max_tessellation_factor.clamp(1, 2);
        Self { max: config.max_tessellation_factor, edge: start, inside: start }
    }

    pub fn set_edge(&mut self, value: u16) -> Result<(), ConfigurationError> {
        self.edge = self.check(value)?;
        Ok(())
    }

    pub fn set_inside(&mut self, value: u16) -> Result<(), ConfigurationError> {
        self.inside = self.check(value)?;
        Ok(())
    }

    /// Sets both factors, or neither when either is out of range.
    pub fn set_factors(&mut self, edge: u16, inside: u16) -> Result<(), ConfigurationError> {
        let (edge, inside) = (self.check(edge)?, self.check(inside)?);
        self.edge = edge;
        self.inside = inside;
        Ok(())
    }

    #[inline]
    pub fn edge(&self) -> u16 {
        self.edge
    }

    #[inline]
    pub fn inside(&self) -> u16 {
        self.inside
    }

    #[inline]
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Kernel parameters for the next dispatch.
    pub fn params(&self) -> FactorParams {
        FactorParams::new(self.edge, self.inside)
    }

    fn check(&self, value: u16) -> Result<u16, ConfigurationError> {
        if value == 0 || value > self.max {
            return Err(ConfigurationError::FactorOutOfRange { value, max: self.max });
        }
        Ok(value)
    }
}

// ── GPU kernel ────────────────────────────────────────────────────────────

/// Compiled factor kernel, shared by every factor stage.
#[derive(Debug)]
pub struct FactorKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl FactorKernel {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera factor shader"),
            source: wgpu::ShaderSource::Wgsl(FACTOR_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera factor compute bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<FactorParams>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<TriangleFactors>() as u64),
                    },
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera factor pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("tessera factor pipeline"),
            layout: Some(&layout),
            module: &shader,
            entry_point: Some(FACTOR_ENTRY_POINT),
            compilation_options: Default::default(),
            cache: None,
        });

        log::debug!("tessellation factor kernel built");

        Self { pipeline, bind_group_layout }
    }
}

/// Bind group layout of the factor record as seen by the tessellation stage (group 1).
pub(crate) fn factor_read_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("tessera factor read bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<TriangleFactors>() as u64),
            },
            count: None,
        }],
    })
}

/// Per-renderer factor record plus the buffers and bind groups that feed it.
#[derive(Debug)]
pub struct FactorStage {
    params_ubo: wgpu::Buffer,
    factor_buffer: wgpu::Buffer,
    compute_bind_group: wgpu::BindGroup,
    read_bind_group: wgpu::BindGroup,
}

impl FactorStage {
    pub fn new(device: &wgpu::Device, kernel: &FactorKernel, read_layout: &wgpu::BindGroupLayout) -> Self {
        let params_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera factor params ubo"),
            size: std::mem::size_of::<FactorParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Written by the kernel, read by the tessellation stage. Never touched by the host.
        let factor_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera factor buffer"),
            size: std::mem::size_of::<TriangleFactors>() as u64,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        let compute_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera factor compute bind group"),
            layout: &kernel.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: params_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: factor_buffer.as_entire_binding() },
            ],
        });

        let read_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera factor read bind group"),
            layout: read_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: factor_buffer.as_entire_binding() }],
        });

        Self { params_ubo, factor_buffer, compute_bind_group, read_bind_group }
    }

    /// Encodes the factor kernel for `params`.
    ///
    /// Must be encoded before the draw that reads the record, in the same encoder.
    pub fn dispatch(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        kernel: &FactorKernel,
        params: FactorParams,
    ) {
        queue.write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(&params));

        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("tessera factor pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&kernel.pipeline);
        cpass.set_bind_group(0, &self.compute_bind_group, &[]);
        cpass.dispatch_workgroups(1, 1, 1);
    }

    /// Group 1 bind group for the tessellation draw.
    pub fn read_bind_group(&self) -> &wgpu::BindGroup {
        &self.read_bind_group
    }

    pub fn factor_buffer(&self) -> &wgpu::Buffer {
        &self.factor_buffer
    }
}

#[cfg(test)]
mod tests {
    use naga::{Expression, Handle, MathFunction, Statement};

    use super::*;

    #[test]
    fn uniform_record_decodes_to_inputs() {
        for edge in 1..=64u16 {
            for inside in [1u16, 2, 7, 16, 64] {
                let r = TriangleFactors::uniform(edge, inside);
                assert_eq!(r.edge_factors(), [edge as f32; 3]);
                assert_eq!(r.inside_factor(), inside as f32);
            }
        }
    }

    #[test]
    fn edge_two_inside_two() {
        let r = TriangleFactors::uniform(2, 2);
        assert_eq!(r.edge_factors(), [2.0, 2.0, 2.0]);
        assert_eq!(r.inside_factor(), 2.0);
        // binary16 2.0 == 0x4000
        assert_eq!(r.edge, [0x4000; 3]);
    }

    #[test]
    fn words_match_record_bytes() {
        let r = TriangleFactors::uniform(5, 3);
        let words = r.to_words();
        let mut bytes = Vec::new();
        for w in words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        if cfg!(target_endian = "little") {
            assert_eq!(bytemuck::bytes_of(&r), bytes.as_slice());
        }
        assert_eq!(words[1] >> 16, r.inside as u32);
    }

    #[test]
    fn factor_control_rejects_out_of_range_and_keeps_prior() {
        let mut f = FactorControl::new(&TessellationConfig::default());
        f.set_edge(4).unwrap();
        f.set_inside(3).unwrap();
        let before = f.params();

        assert_eq!(f.set_edge(17), Err(ConfigurationError::FactorOutOfRange { value: 17, max: 16 }));
        assert!(f.set_inside(0).is_err());

        assert_eq!(f.edge(), 4);
        assert_eq!(f.inside(), 3);
        assert_eq!(f.params(), before);
    }

    #[test]
    fn paired_update_is_all_or_nothing() {
        let mut f = FactorControl::new(&TessellationConfig::default());
        f.set_factors(6, 4).unwrap();
        assert_eq!((f.edge(), f.inside()), (6, 4));

        assert!(f.set_factors(8, 17).is_err());
        assert!(f.set_factors(0, 8).is_err());
        assert_eq!((f.edge(), f.inside()), (6, 4));
    }

    #[test]
    fn factor_control_starts_at_two() {
        let f = FactorControl::new(&TessellationConfig::default());
        assert_eq!((f.edge(), f.inside()), (2, 2));
    }

    #[test]
    fn factor_control_accepts_bounds() {
        let mut f = FactorControl::new(&TessellationConfig::default());
        f.set_edge(16).unwrap();
        f.set_inside(1).unwrap();
        assert_eq!(f.params(), FactorParams::new(16, 1));
    }

    /// The `params` field an expression reads and converts to f32.
    fn param_field(module: &naga::Module, f: &naga::Function, h: Handle<Expression>) -> Option<u32> {
        let Expression::As { expr, kind: naga::ScalarKind::Float, .. } = &f.expressions[h] else {
            return None;
        };
        let Expression::Load { pointer } = &f.expressions[*expr] else {
            return None;
        };
        let Expression::AccessIndex { base, index } = &f.expressions[*pointer] else {
            return None;
        };
        let Expression::GlobalVariable(var) = &f.expressions[*base] else {
            return None;
        };
        (module.global_variables[*var].name.as_deref() == Some("params")).then_some(*index)
    }

    /// `(word, [low, high])` for every `packed[word] = pack2x16float(vec2(low, high))`.
    fn packed_stores(f: &naga::Function) -> Vec<(u32, [Handle<Expression>; 2])> {
        f.body
            .iter()
            .filter_map(|stmt| {
                let Statement::Store { pointer, value } = stmt else {
                    return None;
                };
                let Expression::AccessIndex { index: word, .. } = &f.expressions[*pointer] else {
                    return None;
                };
                let Expression::Math { fun: MathFunction::Pack2x16float, arg, .. } = &f.expressions[*value] else {
                    return None;
                };
                let Expression::Compose { components, .. } = &f.expressions[*arg] else {
                    return None;
                };
                Some((*word, [components[0], components[1]]))
            })
            .collect()
    }

    #[test]
    fn kernel_writes_edges_then_edge_and_inside() {
        let module = naga::front::wgsl::parse_str(FACTOR_SHADER).unwrap();
        let entry = module.entry_points.iter().find(|e| e.name == FACTOR_ENTRY_POINT).unwrap();
        let f = &entry.function;

        let stores = packed_stores(f);
        assert_eq!(stores.len(), 2);
        let fields = |halves: [Handle<Expression>; 2]| halves.map(|h| param_field(&module, f, h));

        // FactorParams: edge is field 0, inside field 1
        assert_eq!(stores[0].0, 0);
        assert_eq!(fields(stores[0].1), [Some(0), Some(0)]);
        assert_eq!(stores[1].0, 1);
        assert_eq!(fields(stores[1].1), [Some(0), Some(1)]);

        // and the host mirror agrees with that layout
        let words = TriangleFactors::uniform(6, 3).to_words();
        assert_eq!(words[0] & 0xffff, words[0] >> 16);
        assert_eq!(words[1] & 0xffff, words[0] & 0xffff);
    }

    #[test]
    fn factor_shader_validates() {
        let module = naga::front::wgsl::parse_str(FACTOR_SHADER).unwrap();
        assert!(module.entry_points.iter().any(|e| e.name == FACTOR_ENTRY_POINT));
        naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all())
            .validate(&module)
            .unwrap();
    }
}
