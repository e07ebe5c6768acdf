//! GPU rendering subsystem.
//!
//! Shared per-frame context, the scene render target, the camera and material
//! textures. Renderers (see `tess`) own their own pipelines and buffers.
//!
//! Convention: right-handed world space, +Y up, depth cleared to 1.0 with
//! `Less` comparison.

mod camera;
mod ctx;
mod texture;

pub use camera::Camera;
pub use ctx::{RenderCtx, RenderTarget};
pub use texture::{MaterialTextures, Texture2d, TextureError, TextureUsage};
