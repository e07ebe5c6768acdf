/// Features, limits and downlevel flags of the created device.
///
/// Read by pipeline builders to reject devices they cannot run on.
#[derive(Debug, Clone)]
pub struct GpuCapabilities {
    pub features: wgpu::Features,
    pub limits: wgpu::Limits,
    pub downlevel_flags: wgpu::DownlevelFlags,
}

impl GpuCapabilities {
    pub fn from_device(adapter: &wgpu::Adapter, device: &wgpu::Device) -> Self {
        Self {
            features: device.features(),
            limits: device.limits(),
            downlevel_flags: adapter.get_downlevel_capabilities().flags,
        }
    }
}

/// Required features plus whichever optional ones the adapter offers.
pub(crate) fn negotiate_features(
    required: wgpu::Features,
    optional: wgpu::Features,
    available: wgpu::Features,
) -> wgpu::Features {
    required | (optional & available)
}

/// Highest sample count at or below `requested` (powers of two) accepted by `supported`.
pub(crate) fn choose_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    let mut count = requested.max(1).next_power_of_two();
    if count > requested.max(1) {
        count /= 2;
    }
    while count > 1 {
        if supported(count) {
            return count;
        }
        count /= 2;
    }
    1
}

/// Sample count usable by both the color and the depth attachment.
pub(crate) fn supported_sample_count(
    adapter: &wgpu::Adapter,
    requested: u32,
    color: wgpu::TextureFormat,
    depth: wgpu::TextureFormat,
) -> u32 {
    let color_flags = adapter.get_texture_format_features(color).flags;
    let depth_flags = adapter.get_texture_format_features(depth).flags;
    choose_sample_count(requested, |n| {
        color_flags.sample_count_supported(n) && depth_flags.sample_count_supported(n)
    })
}
