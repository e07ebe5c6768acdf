//! Math types shared across the engine.
//!
//! Conventions:
//! - right-handed world space, +Y up
//! - column-major matrices (WGSL layout)
//! - clip-space depth in `[0, 1]`

mod color;
mod mat4;
mod vec3;
mod viewport;

pub use color::Color;
pub use mat4::Mat4;
pub use vec3::Vec3;
pub use viewport::Viewport;
