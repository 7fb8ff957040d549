//! Surface meshes: vertex positions plus triangle indices.
//!
//! Only vertex positions matter for projection. Indices are kept so a
//! renderer can draw the mesh itself.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Static triangle mesh in its own un-rotated local frame
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    /// Wrap externally loaded vertex positions (no triangles)
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = [f32; 3]>,
    {
        Self {
            vertices: positions.into_iter().map(Vec3::from_array).collect(),
            indices: Vec::new(),
        }
    }

    /// Flat grid in the XZ plane, centered on the origin
    pub fn grid(cells: usize, spacing: f32) -> Self {
        let cells = cells.max(1);
        let half_size = (cells as f32 * spacing) / 2.0;
        let mut vertices = Vec::with_capacity((cells + 1) * (cells + 1));

        for z in 0..=cells {
            for x in 0..=cells {
                vertices.push(Vec3::new(
                    x as f32 * spacing - half_size,
                    0.0,
                    z as f32 * spacing - half_size,
                ));
            }
        }

        Self {
            vertices,
            indices: quad_indices(cells, cells, cells + 1),
        }
    }

    /// UV sphere with `segments` around and `rings` pole to pole
    pub fn uv_sphere(radius: f32, segments: usize, rings: usize) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity((rings + 1) * (segments + 1));

        for ring in 0..=rings {
            let theta = ring as f32 / rings as f32 * PI;
            let (sin_theta, cos_theta) = theta.sin_cos();
            for segment in 0..=segments {
                let phi = segment as f32 / segments as f32 * TAU;
                let (sin_phi, cos_phi) = phi.sin_cos();
                vertices.push(Vec3::new(
                    radius * sin_theta * cos_phi,
                    radius * cos_theta,
                    radius * sin_theta * sin_phi,
                ));
            }
        }

        Self {
            vertices,
            indices: quad_indices(segments, rings, segments + 1),
        }
    }

    /// Torus around the Y axis
    pub fn torus(major_radius: f32, minor_radius: f32, segments: usize, sides: usize) -> Self {
        let segments = segments.max(3);
        let sides = sides.max(3);
        let mut vertices = Vec::with_capacity((segments + 1) * (sides + 1));

        for side in 0..=sides {
            let v = side as f32 / sides as f32 * TAU;
            let (sin_v, cos_v) = v.sin_cos();
            for segment in 0..=segments {
                let u = segment as f32 / segments as f32 * TAU;
                let (sin_u, cos_u) = u.sin_cos();
                let ring = major_radius + minor_radius * cos_v;
                vertices.push(Vec3::new(ring * cos_u, minor_radius * sin_v, ring * sin_u));
            }
        }

        Self {
            vertices,
            indices: quad_indices(segments, sides, segments + 1),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw vertex bytes for buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Two counter-clockwise triangles per cell of a row-major vertex lattice
fn quad_indices(columns: usize, rows: usize, stride: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(columns * rows * 6);
    for row in 0..rows {
        for column in 0..columns {
            let top_left = (row * stride + column) as u32;
            let top_right = top_left + 1;
            let bottom_left = ((row + 1) * stride + column) as u32;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }
    indices
}
