//! Core engine-facing contracts.
//!
//! The stable interface between the runtime (platform loop) and the studio:
//! the [`App`] trait and the per-frame [`FrameCtx`].

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, FrameView, WindowCtx};
