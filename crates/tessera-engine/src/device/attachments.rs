/// Depth buffer and optional multisampled color target, sized to the surface.
pub struct FrameAttachments {
    depth: wgpu::TextureView,
    msaa_color: Option<wgpu::TextureView>,
    sample_count: u32,
    depth_format: wgpu::TextureFormat,
}

impl FrameAttachments {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        let depth = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("tessera depth attachment"),
                size,
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: depth_format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default());

        let msaa_color = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("tessera msaa color attachment"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: color_format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        Self { depth, msaa_color, sample_count, depth_format }
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth
    }

    /// Multisampled color view; `None` when rendering straight to the surface.
    pub fn msaa_view(&self) -> Option<&wgpu::TextureView> {
        self.msaa_color.as_ref()
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth_format
    }
}
