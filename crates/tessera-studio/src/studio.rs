//! The studio application: demo switching and keyboard controls.

use std::sync::Arc;

use anyhow::{Context, Result};
use tessera_engine::coords::Color;
use tessera_engine::core::{App, AppControl, FrameCtx, FrameView};
use tessera_engine::device::Gpu;
use tessera_engine::input::{InputFrame, Key};
use tessera_engine::mesh::VertexLayout;
use tessera_engine::render::Camera;
use tessera_engine::scene::{RenderObject, Scene};
use tessera_engine::tess::{MeshRenderer, PipelineTargets, TessellationConfig, TessellationPipelineState};
use tessera_engine::time::FpsCounter;

use crate::controls::Controls;
use crate::demo::{Demo, DemoKind};

const TITLE: &str = "tessera studio";

pub struct Studio {
    config: TessellationConfig,
    pipeline: Option<Arc<TessellationPipelineState>>,
    demo: Option<Demo>,
    /// Drawn while no demo runs.
    idle: Scene,
    controls: Controls,
    camera: Camera,
    fps: FpsCounter,
}

impl Studio {
    pub fn new(config: TessellationConfig) -> Self {
        let range = (config.partition_mode.min_factor(), config.max_tessellation_factor);
        Self {
            config,
            pipeline: None,
            demo: None,
            idle: Scene::new(),
            controls: Controls::new(range),
            camera: Camera::default(),
            fps: FpsCounter::default(),
        }
    }

    fn pipeline(&mut self, gpu: &Gpu<'_>) -> Result<Arc<TessellationPipelineState>> {
        if let Some(p) = &self.pipeline {
            return Ok(Arc::clone(p));
        }

        let targets = PipelineTargets {
            color_format: gpu.surface_format(),
            depth_format: gpu.depth_format(),
            sample_count: gpu.sample_count(),
        };
        let layout = VertexLayout::standard().per_patch_control_point();
        let p = TessellationPipelineState::build(gpu.device(), gpu.capabilities(), &targets, &layout, &self.config)
            .context("failed to build the tessellation pipeline")?;
        self.pipeline = Some(Arc::clone(&p));
        Ok(p)
    }

    fn start_demo(&mut self, kind: DemoKind, gpu: &Gpu<'_>) {
        // the previous scene goes away first so its GPU memory can be reused
        self.demo = None;
        let built = self
            .pipeline(gpu)
            .and_then(|p| Demo::build(kind, gpu.device(), gpu.queue(), &p));

        match built {
            Ok(demo) => {
                self.controls.start(kind.start_settings());
                self.demo = Some(demo);
                self.fps.reset();
                self.apply_shape_settings();
            }
            Err(e) => log::error!("demo '{}' unavailable: {e:#}", kind.label()),
        }
    }

    fn stop_demo(&mut self) {
        if let Some(demo) = self.demo.take() {
            log::info!("demo '{}' stopped", demo.kind.label());
        }
        self.controls.playback = Default::default();
    }

    /// Pushes every control value into the active mesh after a selection change.
    fn apply_shape_settings(&mut self) {
        let Some(demo) = self.demo.as_mut() else {
            return;
        };
        let Some(shape) = demo.shape() else {
            return;
        };
        if let Some(playing) = shape.playing_on_select {
            self.controls.playback.set_playing(playing);
        }
        let c = &mut self.controls;
        let Some(mesh) = demo.active_mesh() else {
            return;
        };
        // displacement is per mesh; the control mirrors the selected one
        c.displacement = mesh.shading().displacement_factor;
        mesh.set_phong_factor(c.phong);
        set_factor(mesh, c.applied_factor());
    }

    fn handle_keys(&mut self, input: &InputFrame, gpu: &Gpu<'_>) -> AppControl {
        if input.pressed(Key::Escape) {
            return AppControl::Exit;
        }

        for (key, kind) in [
            (Key::Digit1, DemoKind::Shapes),
            (Key::Digit2, DemoKind::Sphere),
            (Key::Digit3, DemoKind::Displacement),
        ] {
            if input.pressed(key) {
                self.start_demo(kind, gpu);
            }
        }
        if input.pressed(Key::Digit0) {
            self.stop_demo();
        }

        let Some(demo) = self.demo.as_mut() else {
            return AppControl::Continue;
        };

        if input.pressed(Key::Tab) && demo.shape_count() > 1 {
            demo.select_next();
            self.apply_shape_settings();
        }
        self.apply_adjustments(input);
        AppControl::Continue
    }

    fn apply_adjustments(&mut self, input: &InputFrame) {
        let c = &mut self.controls;
        let Some(demo) = self.demo.as_mut() else {
            return;
        };
        let Some(shape) = demo.shape() else {
            return;
        };
        let Some(mesh) = demo.active_mesh() else {
            return;
        };

        let steps = |up: Key, down: Key| input.press_count(up) as i32 - input.press_count(down) as i32;

        if input.pressed(Key::W) {
            c.wireframe = !c.wireframe;
            if c.wireframe && !mesh.pipeline().supports_wireframe() {
                log::warn!("wireframe requested but the device has no line polygon mode");
            }
        }
        if input.pressed(Key::T) {
            let factor = c.toggle_tessellation();
            log::debug!("tessellation {}", if c.tessellation { "on" } else { "off" });
            set_factor(mesh, factor);
        }
        if input.pressed(Key::Space) {
            let playing = c.playback.toggle();
            log::debug!("playback {}", if playing { "resumed" } else { "paused" });
        }

        let factor_steps = steps(Key::ArrowUp, Key::ArrowDown);
        if factor_steps != 0 && c.tessellation {
            set_factor(mesh, c.step_factor(factor_steps));
        }

        let phong_steps = steps(Key::ArrowRight, Key::ArrowLeft);
        if phong_steps != 0 {
            mesh.set_phong_factor(c.step_phong(phong_steps));
        }

        let displacement_steps = steps(Key::PageUp, Key::PageDown);
        if displacement_steps != 0 && shape.displacement_editable {
            mesh.set_displacement_factor(c.step_displacement(displacement_steps));
        }

        let zoom_steps = steps(Key::Z, Key::X);
        if zoom_steps != 0 {
            c.step_zoom(zoom_steps);
        }
    }

    fn report_fps(&mut self, ctx: &mut FrameCtx<'_, '_>) {
        let Some(demo) = &self.demo else {
            return;
        };
        if let Some(fps) = self.fps.frame(ctx.time.dt) {
            log::info!("{}: {fps:.0} fps", demo.kind.label());
            ctx.runtime.set_title(format!("{TITLE} · {} · {fps:.0} fps", demo.kind.label()));
        }
    }
}

/// Edge and inside factors move together; a rejected value changes neither.
fn set_factor(mesh: &mut MeshRenderer, factor: u16) {
    if let Err(e) = mesh.set_factors(factor, factor) {
        log::warn!("{}: {e}", mesh.name());
    }
}

impl App for Studio {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_keys(ctx.input_frame, ctx.gpu) == AppControl::Exit {
            return AppControl::Exit;
        }

        self.controls.playback.advance(ctx.time.dt);
        self.report_fps(ctx);

        let view = FrameView {
            clear: Color::gray(0.3),
            camera: self.camera,
            world_transform: self.controls.world_transform(),
            wireframe: self.controls.wireframe,
        };

        let scene = match self.demo.as_mut() {
            Some(demo) => &mut demo.scene,
            None => &mut self.idle,
        };
        ctx.render_scene(scene, &view)
    }
}
