//! Nearest-vertex projection of an attractor cloud onto a mesh.

use std::sync::atomic::{AtomicBool, Ordering};

use glam::{EulerRot, Mat3, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::mesh::SurfaceMesh;
use crate::params::SurfaceConfig;
use crate::simulation::PointCloudBuffer;

/// Attractor range (±2) mapped onto the mesh's scale
const SCALE_DIVISOR: f32 = 4.0;

/// Particles snapped onto a mesh, in the mesh's local frame
#[derive(Debug, Clone, Default)]
pub struct SurfaceParticleSet {
    /// Matched vertex positions
    pub positions: Vec<Vec3>,
    /// Colors copied from the sampled source points
    pub colors: Vec<[f32; 3]>,
    /// Per-particle size multiplier in [0.8, 1.2)
    pub size_jitter: Vec<f32>,
    /// Positions after the per-frame breathing displacement
    pub displaced: Vec<Vec3>,
    /// Mesh rotation the set was projected under (Euler XYZ)
    pub rotation: Vec3,
    /// Mesh scale the set was projected under
    pub scale: f32,
}

impl SurfaceParticleSet {
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Put every particle back on its matched vertex
    pub fn settle(&mut self) {
        self.displaced.copy_from_slice(&self.positions);
    }

    /// Displaced positions in world space (mesh rotation and scale applied)
    pub fn world_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        let transform = Mat3::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        ) * self.scale;
        self.displaced.iter().map(move |p| transform * *p)
    }

    /// Raw displaced-position bytes for buffer upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.displaced)
    }
}

/// Project `source` onto `mesh`; None while the mesh is unavailable
pub fn project(
    source: &PointCloudBuffer,
    mesh: Option<&SurfaceMesh>,
    config: &SurfaceConfig,
) -> Option<SurfaceParticleSet> {
    project_cancellable(source, mesh, config, &AtomicBool::new(false))
}

/// `project`, checking `cancel` between particles
///
/// Returns None if cancelled before completion.
pub fn project_cancellable(
    source: &PointCloudBuffer,
    mesh: Option<&SurfaceMesh>,
    config: &SurfaceConfig,
    cancel: &AtomicBool,
) -> Option<SurfaceParticleSet> {
    let mesh = mesh.filter(|mesh| !mesh.is_empty())?;
    let [rx, ry, rz] = config.rotation;

    let count = config.particle_budget.min(source.len());
    let mut set = SurfaceParticleSet {
        positions: Vec::with_capacity(count),
        colors: Vec::with_capacity(count),
        size_jitter: Vec::with_capacity(count),
        displaced: Vec::new(),
        rotation: Vec3::new(rx, ry, rz),
        scale: config.scale,
    };
    if count == 0 {
        return Some(set);
    }

    // Euler angles negated before composing, not the exact inverse for
    // multi-axis rotations
    let inverse = Mat3::from_euler(EulerRot::XYZ, -rx, -ry, -rz);
    let scale_factor = config.scale / SCALE_DIVISOR;
    let stride = source.len() / count;
    let vertex_step = (mesh.vertex_count() / config.vertex_scan_limit.max(1)).max(1);

    let mut rng = match config.jitter_seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    for i in 0..count {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }

        let index = i * stride;
        let target = inverse * (Vec3::from_array(source.positions()[index]) * scale_factor);

        set.positions.push(nearest_vertex(mesh, target, vertex_step));
        set.colors.push(source.colors()[index]);
        set.size_jitter.push(rng.gen_range(0.8..1.2));
    }

    set.displaced = set.positions.clone();
    Some(set)
}

/// Closest of every `step`-th mesh vertex to `target`
fn nearest_vertex(mesh: &SurfaceMesh, target: Vec3, step: usize) -> Vec3 {
    let mut best = mesh.vertices[0];
    let mut best_distance = f32::INFINITY;
    for &vertex in mesh.vertices.iter().step_by(step) {
        let distance = vertex.distance_squared(target);
        if distance < best_distance {
            best_distance = distance;
            best = vertex;
        }
    }
    best
}
