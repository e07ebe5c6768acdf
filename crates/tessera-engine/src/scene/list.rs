use crate::coords::Color;
use crate::render::{RenderCtx, RenderTarget};

use super::{ObjectId, RenderObject, SceneObject};

/// Registry of render objects plus the per-frame driver.
///
/// Objects are appended and never removed; a new demo builds a new `Scene`.
/// At most one object is made active through [`Scene::activate`], though
/// objects may also be toggled individually through [`RenderObject::set_active`].
pub struct Scene<T: RenderObject = SceneObject> {
    objects: Vec<T>,

    /// Active indices for the frame being encoded; reused across frames.
    plan: Vec<usize>,
}

impl<T: RenderObject> Default for Scene<T> {
    fn default() -> Self {
        Self { objects: Vec::new(), plan: Vec::new() }
    }
}

impl<T: RenderObject> Scene<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: impl Into<T>) -> ObjectId {
        let id = ObjectId::new(self.objects.len());
        self.objects.push(object.into());
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.objects.get(id.index())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.objects.get_mut(id.index())
    }

    /// Makes `id` the only active object. Returns `false` (and changes nothing)
    /// for an unknown id.
    pub fn activate(&mut self, id: ObjectId) -> bool {
        if id.index() >= self.objects.len() {
            return false;
        }
        self.deactivate_all();
        self.objects[id.index()].set_active(true);
        log::debug!("scene: activated '{}'", self.objects[id.index()].name());
        true
    }

    pub fn deactivate_all(&mut self) {
        for obj in self.objects.iter_mut().filter(|o| o.is_active()) {
            obj.set_active(false);
        }
    }

    /// First active object, if any.
    pub fn active(&self) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.is_active())
            .map(ObjectId::new)
    }

    /// Objects the next frame will update, compute and draw, in registration order.
    pub fn frame_plan(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_active())
            .map(|(i, _)| ObjectId::new(i))
    }

    /// [`Scene::frame_plan`] as indices, in the reusable buffer. `encode` returns it.
    fn take_plan(&mut self) -> Vec<usize> {
        let mut plan = std::mem::take(&mut self.plan);
        plan.clear();
        plan.extend(self.frame_plan().map(ObjectId::index));
        plan
    }

    /// Encodes one frame: every active object's update, then compute passes,
    /// then a single scene pass cleared to `clear` that renders them all.
    ///
    /// The pass is begun even with nothing active so the frame is still cleared.
    pub fn encode(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, clear: Color) {
        let plan = self.take_plan();

        for &i in &plan {
            self.objects[i].update(ctx);
        }
        for &i in &plan {
            self.objects[i].compute(ctx, target.encoder);
        }

        {
            let mut pass = target.begin_scene_pass(clear);
            for &i in &plan {
                self.objects[i].render(ctx, &mut pass);
            }
        }
        self.plan = plan;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        name: &'static str,
        active: bool,
    }

    impl Stub {
        fn new(name: &'static str) -> Self {
            Self { name, active: false }
        }
    }

    impl RenderObject for Stub {
        fn name(&self) -> &str {
            self.name
        }
        fn is_active(&self) -> bool {
            self.active
        }
        fn set_active(&mut self, active: bool) {
            self.active = active;
        }
        fn update(&mut self, _: &RenderCtx<'_>) {}
        fn compute(&mut self, _: &RenderCtx<'_>, _: &mut wgpu::CommandEncoder) {}
        fn render(&self, _: &RenderCtx<'_>, _: &mut wgpu::RenderPass<'_>) {}
    }

    fn scene(names: &[&'static str]) -> (Scene<Stub>, Vec<ObjectId>) {
        let mut s = Scene::new();
        let ids = names.iter().map(|n| s.add(Stub::new(n))).collect();
        (s, ids)
    }

    #[test]
    fn objects_start_inactive() {
        let (s, ids) = scene(&["a", "b"]);
        assert_eq!(ids, vec![ObjectId::new(0), ObjectId::new(1)]);
        assert_eq!(s.frame_plan().count(), 0);
        assert_eq!(s.active(), None);
    }

    #[test]
    fn switching_within_a_frame_plans_only_the_new_object() {
        let (mut s, ids) = scene(&["a", "b"]);
        s.activate(ids[0]);

        s.get_mut(ids[0]).unwrap().set_active(false);
        s.activate(ids[1]);

        assert_eq!(s.frame_plan().collect::<Vec<_>>(), vec![ids[1]]);
        assert_eq!(s.take_plan(), vec![ids[1].index()]);
        assert_eq!(s.active(), Some(ids[1]));
    }

    #[test]
    fn activate_replaces_the_previous_object() {
        let (mut s, ids) = scene(&["a", "b", "c"]);
        s.activate(ids[0]);
        s.activate(ids[2]);
        assert!(!s.get(ids[0]).unwrap().is_active());
        assert_eq!(s.frame_plan().collect::<Vec<_>>(), vec![ids[2]]);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let (mut s, ids) = scene(&["a"]);
        s.activate(ids[0]);
        assert!(!s.activate(ObjectId::new(7)));
        assert_eq!(s.active(), Some(ids[0]));
    }

    #[test]
    fn manual_toggles_are_planned_in_order() {
        let (mut s, ids) = scene(&["a", "b", "c"]);
        s.get_mut(ids[2]).unwrap().set_active(true);
        s.get_mut(ids[0]).unwrap().set_active(true);
        assert_eq!(s.frame_plan().collect::<Vec<_>>(), vec![ids[0], ids[2]]);

        s.deactivate_all();
        assert_eq!(s.frame_plan().count(), 0);
    }
}
