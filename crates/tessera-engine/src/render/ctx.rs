use crate::coords::{Color, Mat4, Viewport};

/// Renderer-facing context for one frame.
///
/// Shared by every object drawn in the frame. Transforms are already resolved
/// for the current camera and world rotation.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub viewport: Viewport, // physical px
    pub view_projection: Mat4,
    pub world_transform: Mat4,
    pub wireframe: bool,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
            view_projection: Mat4::IDENTITY,
            world_transform: Mat4::IDENTITY,
            wireframe: false,
        }
    }

    pub fn with_view_projection(mut self, view_projection: Mat4) -> Self {
        self.view_projection = view_projection;
        self
    }

    pub fn with_world_transform(mut self, world_transform: Mat4) -> Self {
        self.world_transform = world_transform;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }
}

/// Target for drawing: encoder, color view, and the depth/MSAA attachments.
///
/// With MSAA, `color_view` is the multisampled texture and `resolve_target` the
/// surface view.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub resolve_target: Option<&'a wgpu::TextureView>,
    pub depth_view: &'a wgpu::TextureView,
    pub sample_count: u32,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        resolve_target: Option<&'a wgpu::TextureView>,
        depth_view: &'a wgpu::TextureView,
        sample_count: u32,
    ) -> Self {
        Self { encoder, color_view, resolve_target, depth_view, sample_count }
    }

    /// Begins the scene pass: clears color to `clear` and depth to 1.0.
    pub fn begin_scene_pass(&mut self, clear: Color) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: self.resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                    // the multisampled texture is only needed until it is resolved
                    store: if self.resolve_target.is_some() {
                        wgpu::StoreOp::Discard
                    } else {
                        wgpu::StoreOp::Store
                    },
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
