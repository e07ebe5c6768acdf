use std::ops::Range;
use std::sync::Arc;

use super::config::ControlPointLayout;
use super::error::{ConfigurationError, TessError};
use super::factors::{FactorControl, FactorStage};
use super::patch::{build_patch_buffer, PatchBuffer, CONTROL_POINTS_PER_PATCH};
use super::pipeline::TessellationPipelineState;
use super::tessellator::Tessellator;
use super::uniforms::{
    QueueUniformSink, ShadingUniformState, ShadingUniforms, TransformUniforms, SHADING_UNIFORMS_SIZE,
    TRANSFORM_UNIFORMS_SIZE,
};
use crate::coords::Mat4;
use crate::mesh::ImportedMesh;
use crate::render::{MaterialTextures, RenderCtx};
use crate::scene::RenderObject;

/// Patch draw call parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PatchDraw {
    pub control_points_per_patch: u32,
    pub patch_start: u32,
    pub patch_count: u32,
    pub instance_count: u32,
}

impl PatchDraw {
    /// Draw over every patch of a buffer holding `control_point_count` points.
    pub fn for_control_points(control_point_count: u32) -> Self {
        Self {
            control_points_per_patch: CONTROL_POINTS_PER_PATCH,
            patch_start: 0,
            patch_count: control_point_count / CONTROL_POINTS_PER_PATCH,
            instance_count: 1,
        }
    }

    /// Vertex range of one emulated patch: every corner of the densest tessellation.
    pub fn vertices(&self, tessellator: &Tessellator) -> Range<u32> {
        0..tessellator.vertices_per_patch()
    }

    /// Instance range; each instance is one patch.
    pub fn patches(&self) -> Range<u32> {
        self.patch_start..self.patch_start + self.patch_count
    }
}

/// Renders one imported mesh through the tessellation pipeline.
///
/// Owns the patch buffer, the factor record, the shading uniforms and the
/// transforms. The pipeline state is shared.
///
/// Per frame, while active:
/// - `update`: model = world transform × base transform
/// - `compute`: factor kernel for the current edge/inside factors
/// - `render`: bind groups 0/1 and the patch draw
pub struct MeshRenderer {
    name: String,
    active: bool,

    pipeline: Arc<TessellationPipelineState>,
    patches: PatchBuffer,
    factor_stage: FactorStage,
    factors: FactorControl,
    shading: ShadingUniformState<QueueUniformSink>,

    transforms_ubo: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,

    base_matrix: Mat4,
    model_matrix: Mat4,
}

impl MeshRenderer {
    /// Converts `mesh` into patches and allocates the per-mesh GPU state.
    ///
    /// Starts inactive, with factors 2/2 and zeroed shading parameters.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: Arc<TessellationPipelineState>,
        mesh: &ImportedMesh,
        material: &MaterialTextures,
    ) -> Result<Self, TessError> {
        let patches = build_patch_buffer(device, mesh)?;
        if ControlPointLayout::resolve(&patches.layout)? != *pipeline.control_points() {
            return Err(ConfigurationError::LayoutMismatch.into());
        }

        let factor_stage = FactorStage::new(device, pipeline.factor_kernel(), pipeline.factor_layout());
        let factors = FactorControl::new(pipeline.config());

        let transforms_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera transforms ubo"),
            size: TRANSFORM_UNIFORMS_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let shading_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera shading ubo"),
            size: SHADING_UNIFORMS_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera material bind group"),
            layout: pipeline.material_layout(),
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: transforms_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: patches.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: shading_ubo.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&material.displacement.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&material.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&material.diffuse.view),
                },
                wgpu::BindGroupEntry { binding: 6, resource: wgpu::BindingResource::Sampler(pipeline.sampler()) },
            ],
        });

        let identity = TransformUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY);
        queue.write_buffer(&transforms_ubo, 0, bytemuck::bytes_of(&identity));
        let shading = ShadingUniformState::new(QueueUniformSink::new(queue.clone(), shading_ubo));

        log::debug!(
            "mesh renderer: {} patches, {} control points",
            patches.patch_count(),
            patches.control_point_count
        );

        Ok(Self {
            name: String::from("tessellated mesh"),
            active: false,
            pipeline,
            patches,
            factor_stage,
            factors,
            shading,
            transforms_ubo,
            material_bind_group,
            base_matrix: Mat4::IDENTITY,
            model_matrix: Mat4::IDENTITY,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_base_transform(mut self, base: Mat4) -> Self {
        self.base_matrix = base;
        self
    }

    // ── tessellation factors ──────────────────────────────────────────────

    /// Subdivision of the three outer patch edges, independent of the inside factor.
    ///
    /// Takes effect at the next `compute`. Out-of-range values keep the prior factor.
    pub fn set_edge_factor(&mut self, value: u16) -> Result<(), ConfigurationError> {
        self.factors.set_edge(value)
    }

    /// Subdivision of the patch interior; the outer edges keep their own factor.
    ///
    /// Takes effect at the next `compute`. Out-of-range values keep the prior factor.
    pub fn set_inside_factor(&mut self, value: u16) -> Result<(), ConfigurationError> {
        self.factors.set_inside(value)
    }

    /// Sets edge and inside together; on error neither changes.
    pub fn set_factors(&mut self, edge: u16, inside: u16) -> Result<(), ConfigurationError> {
        self.factors.set_factors(edge, inside)
    }

    pub fn edge_factor(&self) -> u16 {
        self.factors.edge()
    }

    pub fn inside_factor(&self) -> u16 {
        self.factors.inside()
    }

    pub fn max_factor(&self) -> u16 {
        self.factors.max()
    }

    // ── shading (flushed immediately) ─────────────────────────────────────

    pub fn set_phong_factor(&mut self, value: f32) {
        self.shading.set_phong_factor(value);
    }

    pub fn set_displacement_factor(&mut self, value: f32) {
        self.shading.set_displacement_factor(value);
    }

    pub fn set_displacement_offset(&mut self, value: f32) {
        self.shading.set_displacement_offset(value);
    }

    pub fn shading(&self) -> ShadingUniforms {
        self.shading.values()
    }

    // ── transforms ────────────────────────────────────────────────────────

    pub fn set_base_transform(&mut self, base: Mat4) {
        self.base_matrix = base;
    }

    pub fn base_transform(&self) -> Mat4 {
        self.base_matrix
    }

    /// Last model transform computed by `update`.
    pub fn model_transform(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn patch_draw(&self) -> PatchDraw {
        PatchDraw::for_control_points(self.patches.control_point_count)
    }

    pub fn pipeline(&self) -> &Arc<TessellationPipelineState> {
        &self.pipeline
    }
}

impl RenderObject for MeshRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn update(&mut self, ctx: &RenderCtx<'_>) {
        self.model_matrix = ctx.world_transform * self.base_matrix;
        let u = TransformUniforms::new(self.model_matrix, ctx.view_projection);
        ctx.queue.write_buffer(&self.transforms_ubo, 0, bytemuck::bytes_of(&u));
    }

    fn compute(&mut self, ctx: &RenderCtx<'_>, encoder: &mut wgpu::CommandEncoder) {
        self.factor_stage
            .dispatch(ctx.queue, encoder, self.pipeline.factor_kernel(), self.factors.params());
    }

    fn render(&self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>) {
        let draw = self.patch_draw();
        if draw.patch_count == 0 {
            return;
        }

        pass.set_pipeline(self.pipeline.pipeline(ctx.wireframe));
        pass.set_bind_group(0, &self.material_bind_group, &[]);
        pass.set_bind_group(1, self.factor_stage.read_bind_group(), &[]);
        pass.draw(draw.vertices(self.pipeline.tessellator()), draw.patches());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tess::config::{PartitionMode, Winding};

    #[test]
    fn patch_draw_covers_every_patch() {
        let draw = PatchDraw::for_control_points(6);
        assert_eq!(
            draw,
            PatchDraw { control_points_per_patch: 3, patch_start: 0, patch_count: 2, instance_count: 1 }
        );
        assert_eq!(draw.patches(), 0..2);
    }

    #[test]
    fn patch_draw_vertex_range_fits_max_factor() {
        let tess = Tessellator::new(PartitionMode::FractionalEven, Winding::Clockwise, 16);
        let draw = PatchDraw::for_control_points(3 * 40);
        assert_eq!(draw.vertices(&tess), 0..768);
        assert_eq!(draw.patches().len(), 40);
    }
}
