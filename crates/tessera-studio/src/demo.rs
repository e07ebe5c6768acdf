//! The three demo scenes.

use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use tessera_engine::coords::{Mat4, Vec3};
use tessera_engine::mesh::ImportedMesh;
use tessera_engine::render::{MaterialTextures, Texture2d, TextureUsage};
use tessera_engine::scene::{ObjectId, Scene, SceneObject};
use tessera_engine::tess::{MeshRenderer, TessellationPipelineState};

use crate::controls::{FactorStart, StartSettings};
use crate::shapes;
use crate::textures::{self, RgbaImage, FLAT_NORMAL};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DemoKind {
    /// Flat triangle and box.
    Shapes,
    /// Low-poly sphere for Phong smoothing.
    Sphere,
    /// Displacement-mapped metal and earth spheres.
    Displacement,
}

impl DemoKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Shapes => "shapes",
            Self::Sphere => "phong sphere",
            Self::Displacement => "displacement",
        }
    }

    /// The first two demos start on the bare control cage.
    pub fn start_settings(self) -> StartSettings {
        match self {
            Self::Shapes => StartSettings {
                playing: false,
                tessellation: false,
                wireframe: true,
                factor: FactorStart::Min,
                phong: 0.0,
            },
            Self::Sphere => StartSettings {
                playing: true,
                tessellation: false,
                wireframe: true,
                factor: FactorStart::Min,
                phong: 0.0,
            },
            Self::Displacement => StartSettings {
                playing: true,
                tessellation: true,
                wireframe: false,
                factor: FactorStart::Max,
                phong: 0.5,
            },
        }
    }

    /// Shape selected when the demo starts.
    fn initial_shape(self) -> usize {
        match self {
            Self::Displacement => 1,
            _ => 0,
        }
    }
}

/// One selectable mesh in a demo.
#[derive(Debug, Copy, Clone)]
pub struct Shape {
    pub id: ObjectId,
    /// Whether PageUp/PageDown may change its displacement.
    pub displacement_editable: bool,
    /// Play state forced on selection; `None` keeps the current one.
    pub playing_on_select: Option<bool>,
}

/// Per-shape setup inside a demo.
#[derive(Debug, Copy, Clone, Default)]
struct ShapeOptions {
    displacement: f32,
    displacement_editable: bool,
    playing_on_select: Option<bool>,
}

/// A running demo: its scene and the selectable shapes in it.
pub struct Demo {
    pub kind: DemoKind,
    pub scene: Scene,
    shapes: Vec<Shape>,
    current: usize,
}

impl Demo {
    pub fn build(
        kind: DemoKind,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &Arc<TessellationPipelineState>,
    ) -> Result<Self> {
        let mut b = DemoBuilder { device, queue, pipeline, scene: Scene::new(), shapes: Vec::new() };

        match kind {
            DemoKind::Shapes => {
                let white = b.material(
                    "white",
                    textures::solid([255; 4]),
                    textures::solid(FLAT_NORMAL),
                    textures::solid([0, 0, 0, 255]),
                )?;
                // the box spins, the triangle holds still
                let still = ShapeOptions { playing_on_select: Some(false), ..Default::default() };
                let spinning = ShapeOptions { playing_on_select: Some(true), ..Default::default() };
                b.add("triangle", &shapes::triangle(2.0), &white, Mat4::IDENTITY, still)?;
                b.add("box", &shapes::cuboid(1.0), &white, Mat4::from_uniform_scale(3.0), spinning)?;
            }

            DemoKind::Sphere => {
                let sand = b.material(
                    "sand",
                    textures::sand(256),
                    textures::solid(FLAT_NORMAL),
                    textures::solid([255; 4]),
                )?;
                let scale = Mat4::from_uniform_scale(4.0);
                b.add("sphere", &shapes::uv_sphere(6), &sand, scale, ShapeOptions::default())?;
            }

            DemoKind::Displacement => {
                let sphere = shapes::uv_sphere(16);

                let (diffuse, bump) = textures::metal(512);
                let normal = textures::normal_from_height(&bump, 6.0);
                let metal = b.material("metal", diffuse, normal, bump)?;
                let editable = ShapeOptions { displacement_editable: true, ..Default::default() };
                b.add("metal", &sphere, &metal, Mat4::from_uniform_scale(4.0), editable)?;

                let (diffuse, bump) = textures::earth(1024, 512);
                let normal = textures::normal_from_height(&bump, 8.0);
                let earth = b.material("earth", diffuse, normal, bump)?;
                let mirrored = Mat4::from_scale(Vec3::new(4.0, 4.0, -4.0));
                let raised = ShapeOptions { displacement: 0.04, ..Default::default() };
                b.add("earth", &sphere, &earth, mirrored, raised)?;
            }
        }

        let DemoBuilder { scene, shapes, .. } = b;
        ensure!(!shapes.is_empty(), "demo '{}' has no shapes", kind.label());
        let mut demo = Self { kind, scene, shapes, current: 0 };
        demo.select(kind.initial_shape());
        log::info!("demo '{}' started ({} objects)", kind.label(), demo.scene.len());
        Ok(demo)
    }

    pub fn shape(&self) -> Option<Shape> {
        self.shapes.get(self.current).copied()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Activates shape `index` (wrapping) and deactivates the previous one.
    pub fn select(&mut self, index: usize) -> Option<Shape> {
        self.current = index % self.shapes.len().max(1);
        let shape = self.shape()?;
        self.scene.activate(shape.id);
        Some(shape)
    }

    pub fn select_next(&mut self) -> Option<Shape> {
        self.select(self.current + 1)
    }

    /// Mesh of the current shape.
    pub fn active_mesh(&mut self) -> Option<&mut MeshRenderer> {
        let id = self.shapes.get(self.current)?.id;
        self.scene.get_mut(id).and_then(SceneObject::as_mesh_mut)
    }
}

struct DemoBuilder<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    pipeline: &'a Arc<TessellationPipelineState>,
    scene: Scene,
    shapes: Vec<Shape>,
}

impl DemoBuilder<'_> {
    fn texture(&self, label: &str, usage: TextureUsage, image: &RgbaImage) -> Result<Arc<Texture2d>> {
        let tex = Texture2d::from_rgba8(self.device, self.queue, label, usage, image.width, image.height, &image.pixels)
            .with_context(|| format!("failed to create texture '{label}'"))?;
        Ok(Arc::new(tex))
    }

    fn material(&self, name: &str, diffuse: RgbaImage, normal: RgbaImage, bump: RgbaImage) -> Result<MaterialTextures> {
        Ok(MaterialTextures {
            diffuse: self.texture(&format!("{name} diffuse"), TextureUsage::Color, &diffuse)?,
            normal: self.texture(&format!("{name} normal"), TextureUsage::Data, &normal)?,
            displacement: self.texture(&format!("{name} bump"), TextureUsage::Data, &bump)?,
        })
    }

    fn add(
        &mut self,
        name: &str,
        mesh: &ImportedMesh,
        material: &MaterialTextures,
        base: Mat4,
        options: ShapeOptions,
    ) -> Result<ObjectId> {
        let mut renderer = MeshRenderer::new(self.device, self.queue, Arc::clone(self.pipeline), mesh, material)
            .with_context(|| format!("failed to build mesh '{name}'"))?
            .with_name(name)
            .with_base_transform(base);
        renderer.set_displacement_factor(options.displacement);
        renderer.set_displacement_offset(0.0);
        renderer.set_phong_factor(0.0);

        let id = self.scene.add(renderer);
        self.shapes.push(Shape {
            id,
            displacement_editable: options.displacement_editable,
            playing_on_select: options.playing_on_select,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_in_an_empty_demo_finds_nothing() {
        let mut demo = Demo { kind: DemoKind::Shapes, scene: Scene::new(), shapes: Vec::new(), current: 0 };
        assert!(demo.select_next().is_none());
        assert!(demo.shape().is_none());
        assert!(demo.active_mesh().is_none());
    }

    #[test]
    fn only_the_displacement_demo_starts_tessellated() {
        assert!(!DemoKind::Shapes.start_settings().tessellation);
        assert!(!DemoKind::Sphere.start_settings().tessellation);
        let displacement = DemoKind::Displacement.start_settings();
        assert!(displacement.tessellation);
        assert_eq!(displacement.factor, FactorStart::Max);
    }
}
