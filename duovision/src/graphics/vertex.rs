//! Screen-rect vertices and the streaming vertex buffer.
//!
//! Every composite draw is one textured quad (4-vertex triangle strip).
//! Quads are bump-allocated into a fixed-size ring of CPU staging memory and
//! uploaded to a single GPU vertex buffer when the scheduler flushes; the
//! draw's first-vertex offset comes straight from the ring allocation.

/// Ring capacity in vertices. Far more than any layout needs per frame, so
/// a wrap can never overwrite vertices still referenced by pending commands.
pub const VERTEX_BUFFER_VERTICES: usize = 8192;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenRectVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl ScreenRectVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            tex_coord: [u, v],
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ScreenRectVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU side of the shared streaming vertex buffer.
///
/// `push_quad` bump-allocates, wrapping to the start when the ring is full.
/// The dirty range is written to the GPU buffer once per flush.
pub struct VertexStream {
    staging: Vec<ScreenRectVertex>,
    cursor: usize,
    dirty: Option<(usize, usize)>,
}

impl VertexStream {
    pub fn new(capacity: usize) -> Self {
        Self {
            staging: vec![ScreenRectVertex::default(); capacity],
            cursor: 0,
            dirty: None,
        }
    }

    /// Create the GPU buffer backing a stream of `VERTEX_BUFFER_VERTICES`.
    pub fn create_buffer(device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Screen Vertex Buffer"),
            size: (VERTEX_BUFFER_VERTICES * std::mem::size_of::<ScreenRectVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Stage one quad and return its first-vertex offset.
    pub fn push_quad(&mut self, quad: [ScreenRectVertex; 4]) -> u32 {
        if self.cursor + 4 > self.staging.len() {
            self.cursor = 0;
        }
        let first = self.cursor;
        self.staging[first..first + 4].copy_from_slice(&quad);
        self.cursor += 4;

        self.dirty = Some(match self.dirty {
            None => (first, first + 4),
            Some((lo, hi)) => (lo.min(first), hi.max(first + 4)),
        });

        first as u32
    }

    /// Write the staged range to the GPU buffer and clear the dirty marker.
    pub fn upload(&mut self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        if let Some((lo, hi)) = self.dirty.take() {
            let offset = (lo * std::mem::size_of::<ScreenRectVertex>()) as u64;
            queue.write_buffer(buffer, offset, bytemuck::cast_slice(&self.staging[lo..hi]));
        }
    }

    /// Staged vertices of the quad starting at `first_vertex`.
    pub fn quad(&self, first_vertex: u32) -> [ScreenRectVertex; 4] {
        let first = first_vertex as usize;
        self.staging[first..first + 4]
            .try_into()
            .expect("quad range within staging")
    }

    pub fn capacity(&self) -> usize {
        self.staging.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(n: f32) -> [ScreenRectVertex; 4] {
        [
            ScreenRectVertex::new(n, 0.0, 0.0, 0.0),
            ScreenRectVertex::new(n, 1.0, 0.0, 1.0),
            ScreenRectVertex::new(n, 2.0, 1.0, 0.0),
            ScreenRectVertex::new(n, 3.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<ScreenRectVertex>(), 16);
    }

    #[test]
    fn test_push_quad_bumps_offset() {
        let mut stream = VertexStream::new(16);
        assert_eq!(stream.push_quad(quad(0.0)), 0);
        assert_eq!(stream.push_quad(quad(1.0)), 4);
        assert_eq!(stream.push_quad(quad(2.0)), 8);
        assert_eq!(stream.quad(4)[0].position, [1.0, 0.0]);
    }

    #[test]
    fn test_push_quad_wraps() {
        let mut stream = VertexStream::new(8);
        assert_eq!(stream.push_quad(quad(0.0)), 0);
        assert_eq!(stream.push_quad(quad(1.0)), 4);
        // Ring is full; the next allocation wraps to the start.
        assert_eq!(stream.push_quad(quad(2.0)), 0);
        assert_eq!(stream.quad(0)[0].position, [2.0, 0.0]);
        assert_eq!(stream.quad(4)[0].position, [1.0, 0.0]);
    }

    #[test]
    fn test_dirty_range_widens_and_clears() {
        let mut stream = VertexStream::new(16);
        stream.push_quad(quad(0.0));
        stream.push_quad(quad(1.0));
        assert_eq!(stream.dirty, Some((0, 8)));
        stream.dirty = None;
        stream.push_quad(quad(2.0));
        assert_eq!(stream.dirty, Some((8, 12)));
    }
}
