use winit::window::{Window, WindowId};

use crate::coords::{Color, Mat4, Viewport};
use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::render::{Camera, RenderCtx, RenderTarget};
use crate::scene::{RenderObject, Scene};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Drawable size in physical pixels.
    pub fn physical_size(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width as f32, size.height as f32)
    }
}

/// What a frame looks at: camera, world animation and clear color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameView {
    pub clear: Color,
    pub camera: Camera,
    /// Applied to every object's base transform.
    pub world_transform: Mat4,
    pub wireframe: bool,
}

impl Default for FrameView {
    fn default() -> Self {
        Self {
            clear: Color::gray(0.3),
            camera: Camera::default(),
            world_transform: Mat4::IDENTITY,
            wireframe: false,
        }
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires a frame, calls `draw` with a [`RenderCtx`] resolved for `view`
    /// and the frame's [`RenderTarget`], then presents.
    ///
    /// `draw` owns the pass structure; use [`FrameCtx::render_scene`] for the
    /// usual update/compute/render sequence. Minimized windows skip the frame.
    pub fn render<F>(&mut self, view: &FrameView, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let viewport = self.window.physical_size();
        if !viewport.is_valid() {
            return AppControl::Continue;
        }
        let Some(view_projection) = view.camera.view_projection(viewport.aspect()) else {
            return AppControl::Continue;
        };

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface error: {err}");
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    log::error!("surface lost: out of memory");
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            viewport,
        )
        .with_view_projection(view_projection)
        .with_world_transform(view.world_transform)
        .with_wireframe(view.wireframe);

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let attachments = self.gpu.attachments();
            let (color_view, resolve_target) = match attachments.msaa_view() {
                Some(msaa) => (msaa, Some(&frame.view)),
                None => (&frame.view, None),
            };
            let mut target = RenderTarget::new(
                &mut frame.encoder,
                color_view,
                resolve_target,
                attachments.depth_view(),
                attachments.sample_count(),
            );
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }

    /// Encodes and presents one frame of `scene` (see [`Scene::encode`]).
    pub fn render_scene<T: RenderObject>(&mut self, scene: &mut Scene<T>, view: &FrameView) -> AppControl {
        let clear = view.clear;
        self.render(view, |rctx, target| scene.encode(rctx, target, clear))
    }
}
