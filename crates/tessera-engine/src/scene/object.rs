use crate::render::RenderCtx;
use crate::tess::MeshRenderer;

/// Per-frame contract between a scene and the objects it draws.
///
/// A frame calls, for every active object and in this order across objects:
/// `update` for all, `compute` for all, then `render` for all inside one pass.
pub trait RenderObject {
    fn name(&self) -> &str;

    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);

    /// CPU-side state and uniform uploads.
    fn update(&mut self, ctx: &RenderCtx<'_>);

    /// Compute passes; encoded before the scene render pass.
    fn compute(&mut self, ctx: &RenderCtx<'_>, encoder: &mut wgpu::CommandEncoder);

    fn render(&self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>);
}

/// Closed set of objects the engine knows how to draw.
pub enum SceneObject {
    Tessellated(MeshRenderer),
}

impl SceneObject {
    pub fn as_mesh(&self) -> Option<&MeshRenderer> {
        match self {
            Self::Tessellated(m) => Some(m),
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshRenderer> {
        match self {
            Self::Tessellated(m) => Some(m),
        }
    }
}

impl From<MeshRenderer> for SceneObject {
    fn from(m: MeshRenderer) -> Self {
        Self::Tessellated(m)
    }
}

impl RenderObject for SceneObject {
    fn name(&self) -> &str {
        match self {
            Self::Tessellated(m) => m.name(),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Self::Tessellated(m) => m.is_active(),
        }
    }

    fn set_active(&mut self, active: bool) {
        match self {
            Self::Tessellated(m) => m.set_active(active),
        }
    }

    fn update(&mut self, ctx: &RenderCtx<'_>) {
        match self {
            Self::Tessellated(m) => m.update(ctx),
        }
    }

    fn compute(&mut self, ctx: &RenderCtx<'_>, encoder: &mut wgpu::CommandEncoder) {
        match self {
            Self::Tessellated(m) => m.compute(ctx, encoder),
        }
    }

    fn render(&self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>) {
        match self {
            Self::Tessellated(m) => m.render(ctx, pass),
        }
    }
}
