//! Scene registry and frame driver.
//!
//! A [`Scene`] owns the render objects of one demo. Each frame it updates,
//! computes and renders the active ones into a single encoder (see
//! [`Scene::encode`]).

mod key;
mod list;
mod object;

pub use key::ObjectId;
pub use list::Scene;
pub use object::{RenderObject, SceneObject};
