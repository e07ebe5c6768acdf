//! Time subsystem.
//!
//! - `FrameClock`: one per render loop, `tick()` once per presented frame
//! - `Playback`: animation time gated by play/pause
//! - `FpsCounter`: frame rate sampled once per interval

mod fps;
mod frame_clock;
mod playback;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
pub use playback::Playback;
