/// Handle to an object registered in a [`super::Scene`].
///
/// Only valid for the scene that issued it; scenes never remove objects, so a
/// handle stays valid for the scene's lifetime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
