//! Background projection for dense meshes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use super::mesh::SurfaceMesh;
use super::projector::{project_cancellable, SurfaceParticleSet};
use crate::params::SurfaceConfig;
use crate::simulation::PointCloudBuffer;

/// State of a background projection
#[derive(Debug)]
pub enum ProjectionPoll {
    /// Still running
    Pending,
    /// Finished; None if cancelled or the mesh was unusable
    Done(Option<SurfaceParticleSet>),
}

/// Projection running on its own thread
///
/// The frame loop polls `try_take` once per frame and never blocks on it.
/// Dropping the task cancels it.
pub struct ProjectionTask {
    cancel: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<Option<SurfaceParticleSet>>>,
}

impl ProjectionTask {
    pub fn spawn(source: PointCloudBuffer, mesh: Arc<SurfaceMesh>, config: SurfaceConfig) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);

        log::debug!(
            "Projecting {} particles onto {} vertices in background",
            config.particle_budget,
            mesh.vertex_count()
        );

        let worker = thread::Builder::new()
            .name("strangewave-projection".to_string())
            .spawn(move || {
                project_cancellable(&source, Some(mesh.as_ref()), &config, &worker_cancel)
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("Cannot spawn projection thread: {}", err);
                None
            }
        };

        Self { cancel, worker }
    }

    /// Ask the worker to stop at its next particle
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Collect the result if the worker has finished
    pub fn try_take(&mut self) -> ProjectionPoll {
        match self.worker.take() {
            Some(worker) if !worker.is_finished() => {
                self.worker = Some(worker);
                ProjectionPoll::Pending
            }
            Some(worker) => match worker.join() {
                Ok(set) if !self.is_cancelled() => ProjectionPoll::Done(set),
                Ok(_) => ProjectionPoll::Done(None),
                Err(_) => {
                    log::error!("Projection worker panicked");
                    ProjectionPoll::Done(None)
                }
            },
            None => ProjectionPoll::Done(None),
        }
    }
}

impl Drop for ProjectionTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
