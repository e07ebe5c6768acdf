use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("texture size must be non-zero (got {width}x{height})")]
    EmptySize { width: u32, height: u32 },
    #[error("expected {expected} bytes of RGBA8 data, got {actual}")]
    DataLength { expected: usize, actual: usize },
}

/// How texel values are interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureUsage {
    /// Color data; sampled with sRGB decoding.
    Color,
    /// Normals, heights and other linear data.
    Data,
}

impl TextureUsage {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Data => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Immutable sampled 2D texture with a single mip level.
pub struct Texture2d {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl Texture2d {
    /// Uploads tightly packed RGBA8 rows.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        usage: TextureUsage,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self, TextureError> {
        check_rgba8(width, height, pixels.len())?;

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: usage.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { texture, view, width, height })
    }
}

fn check_rgba8(width: u32, height: u32, len: usize) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::EmptySize { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if len != expected {
        return Err(TextureError::DataLength { expected, actual: len });
    }
    Ok(())
}

/// Textures sampled by the tessellation pipeline.
///
/// Shared so several meshes can use one material.
#[derive(Clone)]
pub struct MaterialTextures {
    pub diffuse: Arc<Texture2d>,
    pub normal: Arc<Texture2d>,
    /// Height in the red channel.
    pub displacement: Arc<Texture2d>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_length_is_checked() {
        assert_eq!(check_rgba8(2, 3, 24), Ok(()));
        assert_eq!(
            check_rgba8(2, 3, 20),
            Err(TextureError::DataLength { expected: 24, actual: 20 })
        );
        assert_eq!(check_rgba8(0, 3, 0), Err(TextureError::EmptySize { width: 0, height: 3 }));
    }

    #[test]
    fn color_textures_decode_srgb() {
        assert!(TextureUsage::Color.format().is_srgb());
        assert!(!TextureUsage::Data.format().is_srgb());
    }
}
