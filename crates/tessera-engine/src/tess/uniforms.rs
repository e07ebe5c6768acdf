//! Shading and transform uniforms of a tessellated mesh.

use bytemuck::{Pod, Zeroable};

use crate::coords::Mat4;

/// Phong blend and displacement parameters read by the tessellation stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct ShadingUniforms {
    pub phong_factor: f32,
    pub displacement_factor: f32,
    pub displacement_offset: f32,
    pub _pad: f32, // 16-byte alignment
}

pub const SHADING_UNIFORMS_SIZE: u64 = std::mem::size_of::<ShadingUniforms>() as u64;

/// Destination for serialized uniform bytes.
pub trait UniformSink {
    fn write(&mut self, bytes: &[u8]);
}

/// Writes into a GPU uniform buffer through the queue.
///
/// `write_buffer` is ordered before the next submission, so a value set during a
/// frame is visible to that frame's draws.
#[derive(Debug)]
pub struct QueueUniformSink {
    queue: wgpu::Queue,
    buffer: wgpu::Buffer,
}

impl QueueUniformSink {
    pub fn new(queue: wgpu::Queue, buffer: wgpu::Buffer) -> Self {
        Self { queue, buffer }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl UniformSink for QueueUniformSink {
    fn write(&mut self, bytes: &[u8]) {
        self.queue.write_buffer(&self.buffer, 0, bytes);
    }
}

/// Mutable shading record. Every setter rewrites the whole record into the sink.
#[derive(Debug)]
pub struct ShadingUniformState<S: UniformSink> {
    values: ShadingUniforms,
    sink: S,
}

impl<S: UniformSink> ShadingUniformState<S> {
    /// Creates the state and flushes the initial (all zero) record.
    pub fn new(sink: S) -> Self {
        let mut state = Self { values: ShadingUniforms::default(), sink };
        state.flush();
        state
    }

    pub fn set_phong_factor(&mut self, value: f32) {
        self.values.phong_factor = value;
        self.flush();
    }

    pub fn set_displacement_factor(&mut self, value: f32) {
        self.values.displacement_factor = value;
        self.flush();
    }

    pub fn set_displacement_offset(&mut self, value: f32) {
        self.values.displacement_offset = value;
        self.flush();
    }

    #[inline]
    pub fn values(&self) -> ShadingUniforms {
        self.values
    }

    /// Serialized form of the current record.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.values)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn flush(&mut self) {
        self.sink.write(bytemuck::bytes_of(&self.values));
    }
}

/// Per-mesh transforms (group 0, binding 0).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformUniforms {
    pub model: Mat4,
    pub view_projection: Mat4,
    pub normal_matrix: Mat4,
}

pub const TRANSFORM_UNIFORMS_SIZE: u64 = std::mem::size_of::<TransformUniforms>() as u64;

impl TransformUniforms {
    /// A singular model matrix falls back to an identity normal matrix.
    pub fn new(model: Mat4, view_projection: Mat4) -> Self {
        Self {
            model,
            view_projection,
            normal_matrix: model.normal_matrix().unwrap_or(Mat4::IDENTITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<Vec<u8>>,
    }

    impl UniformSink for RecordingSink {
        fn write(&mut self, bytes: &[u8]) {
            self.writes.push(bytes.to_vec());
        }
    }

    fn decode(bytes: &[u8]) -> ShadingUniforms {
        bytemuck::pod_read_unaligned(bytes)
    }

    #[test]
    fn new_flushes_zeroed_record() {
        let s = ShadingUniformState::new(RecordingSink::default());
        assert_eq!(s.sink().writes.len(), 1);
        assert_eq!(s.sink().writes[0], vec![0u8; 16]);
    }

    #[test]
    fn every_setter_flushes_full_record() {
        let mut s = ShadingUniformState::new(RecordingSink::default());
        s.set_phong_factor(0.5);
        s.set_displacement_offset(-0.1);

        let w = &s.sink().writes;
        assert_eq!(w.len(), 3);
        assert!(w.iter().all(|b| b.len() == SHADING_UNIFORMS_SIZE as usize));
        let last = decode(w.last().unwrap());
        assert_eq!(last.phong_factor, 0.5);
        assert_eq!(last.displacement_offset, -0.1);
    }

    #[test]
    fn displacement_change_leaves_other_fields() {
        let mut s = ShadingUniformState::new(RecordingSink::default());
        s.set_phong_factor(0.25);
        s.set_displacement_offset(0.1);
        s.set_displacement_factor(0.0);

        s.set_displacement_factor(0.04);
        let v = decode(s.bytes());
        assert_eq!(v.displacement_factor, 0.04);
        assert_eq!(v.phong_factor, 0.25);
        assert_eq!(v.displacement_offset, 0.1);
        assert_eq!(decode(s.sink().writes.last().unwrap()), v);
    }

    #[test]
    fn repeated_setter_is_idempotent() {
        let mut s = ShadingUniformState::new(RecordingSink::default());
        s.set_phong_factor(0.7);
        let once = s.bytes().to_vec();
        s.set_phong_factor(0.7);
        assert_eq!(s.bytes(), once.as_slice());
        // still flushed; no dirty-flag elision
        assert_eq!(s.sink().writes.len(), 3);
    }

    #[test]
    fn uniform_sizes() {
        assert_eq!(SHADING_UNIFORMS_SIZE, 16);
        assert_eq!(TRANSFORM_UNIFORMS_SIZE, 192);
    }

    #[test]
    fn transform_normal_matrix_falls_back_to_identity() {
        let singular = Mat4::from_uniform_scale(0.0);
        let t = TransformUniforms::new(singular, Mat4::IDENTITY);
        assert_eq!(t.normal_matrix, Mat4::IDENTITY);
    }
}
