//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - negotiating optional features and the MSAA sample count
//! - creating & configuring the Surface (swapchain) and its depth/MSAA attachments
//! - acquiring frames and providing encoders/views for rendering

mod attachments;
mod caps;
mod gpu;
mod init;
mod surface;

pub use attachments::FrameAttachments;
pub use caps::GpuCapabilities;
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
