//! Studio control state: the values the keyboard adjusts.

use tessera_engine::coords::{Mat4, Vec3};
use tessera_engine::time::Playback;

pub const ZOOM_RANGE: (f32, f32) = (0.5, 4.0);
const ZOOM_STEP: f32 = 0.1;
const PHONG_STEP: f32 = 0.05;
const DISPLACEMENT_STEP: f32 = 0.01;
const DISPLACEMENT_MAX: f32 = 0.2;
/// Radians per second of play time.
const SPIN_RATE: f32 = 0.5;

/// How a demo starts.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StartSettings {
    pub playing: bool,
    pub tessellation: bool,
    pub wireframe: bool,
    pub factor: FactorStart,
    pub phong: f32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FactorStart {
    Min,
    Max,
}

#[derive(Debug, Clone)]
pub struct Controls {
    /// When off, meshes draw at the lowest factor and `factor` is kept for later.
    pub tessellation: bool,
    pub factor: u16,
    pub factor_range: (u16, u16),
    pub phong: f32,
    pub displacement: f32,
    pub wireframe: bool,
    pub zoom: f32,
    pub playback: Playback,
}

impl Controls {
    pub fn new(factor_range: (u16, u16)) -> Self {
        Self {
            tessellation: true,
            factor: factor_range.0,
            factor_range,
            phong: 0.0,
            displacement: 0.0,
            wireframe: false,
            zoom: 1.0,
            playback: Playback::new(false),
        }
    }

    /// Resets for a new demo. Zoom carries over.
    pub fn start(&mut self, settings: StartSettings) {
        self.factor = match settings.factor {
            FactorStart::Min => self.factor_range.0,
            FactorStart::Max => self.factor_range.1,
        };
        self.phong = settings.phong;
        self.tessellation = settings.tessellation;
        self.wireframe = settings.wireframe;
        self.playback = Playback::new(settings.playing);
    }

    /// Factor the meshes should use right now.
    pub fn applied_factor(&self) -> u16 {
        if self.tessellation { self.factor } else { self.factor_range.0 }
    }

    pub fn toggle_tessellation(&mut self) -> u16 {
        self.tessellation = !self.tessellation;
        self.applied_factor()
    }

    pub fn step_factor(&mut self, steps: i32) -> u16 {
        let (lo, hi) = self.factor_range;
        self.factor = (i32::from(self.factor) + steps).clamp(i32::from(lo), i32::from(hi)) as u16;
        self.factor
    }

    pub fn step_phong(&mut self, steps: i32) -> f32 {
        self.phong = snap(self.phong + steps as f32 * PHONG_STEP).clamp(0.0, 1.0);
        self.phong
    }

    pub fn step_displacement(&mut self, steps: i32) -> f32 {
        self.displacement = snap(self.displacement + steps as f32 * DISPLACEMENT_STEP).clamp(0.0, DISPLACEMENT_MAX);
        self.displacement
    }

    pub fn step_zoom(&mut self, steps: i32) -> f32 {
        self.zoom = (self.zoom + steps as f32 * ZOOM_STEP).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
        self.zoom
    }

    /// `scale(zoom) × rotation_y(play time × spin rate)`.
    pub fn world_transform(&self) -> Mat4 {
        let angle = (self.playback.total_time() as f32) * SPIN_RATE;
        Mat4::from_scale(Vec3::splat(self.zoom)) * Mat4::from_rotation_y(angle)
    }
}

/// Rounds away float drift from repeated steps.
fn snap(v: f32) -> f32 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> Controls {
        Controls::new((2, 16))
    }

    #[test]
    fn factor_steps_stay_in_range() {
        let mut c = controls();
        assert_eq!(c.step_factor(-1), 2);
        assert_eq!(c.step_factor(5), 7);
        assert_eq!(c.step_factor(100), 16);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut c = controls();
        for _ in 0..100 {
            c.step_zoom(1);
        }
        assert_eq!(c.zoom, 4.0);
        for _ in 0..100 {
            c.step_zoom(-1);
        }
        assert_eq!(c.zoom, 0.5);
    }

    #[test]
    fn repeated_steps_do_not_drift() {
        let mut c = controls();
        for _ in 0..10 {
            c.step_phong(1);
        }
        assert_eq!(c.phong, 0.5);
        c.displacement = 0.04;
        c.step_displacement(1);
        assert_eq!(c.displacement, 0.05);
    }

    #[test]
    fn start_applies_demo_settings() {
        let mut c = controls();
        c.zoom = 2.0;
        c.start(StartSettings {
            playing: true,
            tessellation: true,
            wireframe: false,
            factor: FactorStart::Max,
            phong: 0.5,
        });
        assert_eq!(c.factor, 16);
        assert_eq!(c.phong, 0.5);
        assert!(c.playback.is_playing());
        assert_eq!(c.zoom, 2.0);
    }

    #[test]
    fn tessellation_off_draws_at_the_minimum_and_keeps_the_factor() {
        let mut c = controls();
        c.start(StartSettings {
            playing: false,
            tessellation: false,
            wireframe: true,
            factor: FactorStart::Max,
            phong: 0.0,
        });
        assert_eq!(c.factor, 16);
        assert_eq!(c.applied_factor(), 2);

        assert_eq!(c.toggle_tessellation(), 16);
        c.step_factor(-3);
        assert_eq!(c.applied_factor(), 13);

        assert_eq!(c.toggle_tessellation(), 2);
        assert_eq!(c.factor, 13);
    }

    #[test]
    fn world_transform_spins_with_play_time() {
        let mut c = controls();
        assert_eq!(c.world_transform(), Mat4::IDENTITY);

        c.playback.set_playing(true);
        c.playback.advance(std::f32::consts::TAU);
        // half a turn: +X maps to -X
        let p = c.world_transform().transform_point3(Vec3::X);
        assert!((p.x + 1.0).abs() < 1e-5 && p.z.abs() < 1e-5);
    }
}
