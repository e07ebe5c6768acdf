//! Mesh import boundary.
//!
//! `ImportedMesh` is what the asset collaborator hands over; `VertexLayout`
//! describes its interleaved attributes and is reused by the tessellation
//! pipeline to locate control-point fields.

mod imported;
mod layout;

pub use imported::{ImportedMesh, Submesh};
pub use layout::{
    ControlPointVertex, StepFunction, VertexAttribute, VertexFormat, VertexLayout, VertexSemantic,
};
