//! Tessera engine crate.
//!
//! GPU tessellation on wgpu: the patch builder, factor kernel and tessellation
//! pipeline live in [`tess`]; the rest is the platform + GPU runtime that
//! drives them.

pub mod core;
pub mod device;
pub mod input;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod tess;
