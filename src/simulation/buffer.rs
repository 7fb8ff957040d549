//! Reusable point cloud storage.

/// Positions and colors for one attractor, reused across frames
///
/// Capacity tracks the active definition's iteration count. `resize` is a
/// no-op when the count is unchanged, so steady-state frames never allocate.
#[derive(Debug, Clone, Default)]
pub struct PointCloudBuffer {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
}

impl PointCloudBuffer {
    pub fn with_capacity(points: usize) -> Self {
        Self {
            positions: vec![[0.0; 3]; points],
            colors: vec![[0.0; 3]; points],
        }
    }

    /// Match the point count, keeping existing storage where possible
    pub fn resize(&mut self, points: usize) {
        if self.positions.len() != points {
            self.positions.resize(points, [0.0; 3]);
            self.colors.resize(points, [0.0; 3]);
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Mutable views of both arrays at once
    pub fn parts_mut(&mut self) -> (&mut [[f32; 3]], &mut [[f32; 3]]) {
        (&mut self.positions, &mut self.colors)
    }

    /// Raw position bytes for vertex buffer upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw color bytes for vertex buffer upload
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_keeps_storage_when_unchanged() {
        let mut buffer = PointCloudBuffer::with_capacity(1000);
        let ptr = buffer.positions().as_ptr();
        buffer.resize(1000);
        assert_eq!(buffer.positions().as_ptr(), ptr);
        assert_eq!(buffer.len(), 1000);

        buffer.resize(10);
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.colors().len(), 10);
    }

    #[test]
    fn test_byte_views() {
        let buffer = PointCloudBuffer::with_capacity(4);
        assert_eq!(buffer.position_bytes().len(), 4 * 3 * 4);
        assert_eq!(buffer.color_bytes().len(), 4 * 3 * 4);
    }
}
