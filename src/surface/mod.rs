//! Surface layer: meshes, nearest-vertex projection and breathing motion.
//!
//! Projection is the expensive step and only reruns on structural changes
//! (mesh, budget, scale, rotation, attractor type). The per-frame work is the
//! cheap displacement in `SurfaceAnimator`.

mod animator;
mod mesh;
mod projector;
mod task;

pub use animator::SurfaceAnimator;
pub use mesh::SurfaceMesh;
pub use projector::{project, project_cancellable, SurfaceParticleSet};
pub use task::{ProjectionPoll, ProjectionTask};
