//! Per-frame orchestration of audio, attractor and surface layers.

use std::sync::Arc;

use crate::attractor::{AttractorDefinition, ParameterVector};
use crate::audio::{AudioAnalyzer, AudioBands, CaptureSource, CaptureStatus};
use crate::error::{AttractorError, AudioError};
use crate::params::{
    AudioTarget, BlendConfig, FFTConfig, PointStyle, RotationConfig, SurfaceConfig,
};
use crate::simulation::{
    recompute_points, AttractorInstance, FrameOutcome, PointCloudBuffer, ViewRotation,
};
use crate::surface::{
    project, ProjectionPoll, ProjectionTask, SurfaceAnimator, SurfaceMesh, SurfaceParticleSet,
};

/// Everything the visualizer needs to start
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    pub fft: FFTConfig,
    pub blend: BlendConfig,
    pub rotation: RotationConfig,
    pub style: PointStyle,
    pub surface: SurfaceConfig,
    pub audio_source: CaptureSource,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            fft: FFTConfig::default(),
            blend: BlendConfig::default(),
            rotation: RotationConfig::default(),
            style: PointStyle::default(),
            surface: SurfaceConfig::default(),
            audio_source: CaptureSource::Microphone,
        }
    }
}

/// Summary of one tick, for the host and renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub outcome: FrameOutcome,
    /// Bands sampled at the start of the tick
    pub bands: AudioBands,
    pub point_size: f32,
    pub surface_point_size: f32,
    pub surface_particles: usize,
}

/// Surface layer state owned by the frame loop
struct SurfaceState {
    config: SurfaceConfig,
    mesh: Option<Arc<SurfaceMesh>>,
    source: PointCloudBuffer,
    particles: Option<SurfaceParticleSet>,
    task: Option<ProjectionTask>,
    animator: SurfaceAnimator,
    dirty: bool,
    settled: bool,
}

impl SurfaceState {
    fn new(config: SurfaceConfig) -> Self {
        Self {
            animator: SurfaceAnimator::new(config.pulse_speed, config.volume_boost),
            config,
            mesh: None,
            source: PointCloudBuffer::default(),
            particles: None,
            task: None,
            dirty: false,
            settled: true,
        }
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }

    /// Collect a finished background projection
    fn poll_task(&mut self) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        if let ProjectionPoll::Done(set) = task.try_take() {
            self.task = None;
            if let Some(set) = set {
                log::info!("Surface projection ready: {} particles", set.count());
                self.particles = Some(set);
                self.settled = true;
            }
        }
    }

    /// Re-sample the source cloud and project it onto the mesh
    fn reproject(&mut self, def: &AttractorDefinition, base: &ParameterVector) {
        self.dirty = false;
        self.cancel_task();

        let Some(mesh) = self.mesh.as_ref() else {
            self.particles = None;
            return;
        };

        recompute_points(
            def,
            &def.slots(base),
            self.config.source_iterations,
            false,
            &AudioBands::default(),
            &mut self.source,
        );

        if mesh.vertex_count() > self.config.background_vertex_threshold {
            self.task = Some(ProjectionTask::spawn(
                self.source.clone(),
                Arc::clone(mesh),
                self.config.clone(),
            ));
        } else {
            self.particles = project(&self.source, Some(mesh), &self.config);
            self.settled = true;
            log::debug!(
                "Surface projected: {} particles onto {} vertices",
                self.particles.as_ref().map_or(0, SurfaceParticleSet::count),
                mesh.vertex_count()
            );
        }
    }

    fn animate(&mut self, reacting: bool, dt: f32, bands: &AudioBands) {
        let Some(set) = self.particles.as_mut() else {
            return;
        };
        if reacting {
            self.animator.animate(
                set,
                dt,
                bands.volume,
                self.config.surface_offset,
                self.config.effect_intensity,
            );
            self.settled = false;
        } else if !self.settled {
            set.settle();
            self.settled = true;
        }
    }
}

/// Audio-reactive attractor with an optional surface layer
pub struct Visualizer {
    attractor: AttractorInstance,
    style: PointStyle,
    fft: FFTConfig,
    audio_source: CaptureSource,
    audio: Option<AudioAnalyzer>,
    surface: SurfaceState,
    last_bands: AudioBands,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            attractor: AttractorInstance::new(config.blend, config.rotation),
            style: config.style,
            fft: config.fft,
            audio_source: config.audio_source,
            audio: None,
            surface: SurfaceState::new(config.surface),
            last_bands: AudioBands::default(),
        }
    }

    /// Switch attractor type; the surface is re-projected on the next tick
    pub fn select_attractor(
        &mut self,
        key: &str,
        params: Option<&ParameterVector>,
    ) -> Result<&'static AttractorDefinition, AttractorError> {
        let result = self.attractor.select(key, params);
        self.surface.dirty = true;
        result
    }

    /// Replace the base parameters (eased in over the next frames)
    pub fn set_params(&mut self, params: &ParameterVector) {
        self.attractor.set_base_params(params);
    }

    pub fn set_param(&mut self, key: &str, value: f64) -> bool {
        self.attractor.set_param(key, value)
    }

    /// Supply a loaded mesh; projection follows on the next tick
    pub fn set_mesh(&mut self, mesh: SurfaceMesh) {
        log::info!("Surface mesh: {} vertices", mesh.vertex_count());
        self.surface.mesh = Some(Arc::new(mesh));
        self.surface.dirty = true;
    }

    /// Drop the mesh and its particles
    pub fn clear_mesh(&mut self) {
        self.surface.cancel_task();
        self.surface.mesh = None;
        self.surface.particles = None;
        self.surface.dirty = false;
    }

    pub fn set_surface_config(&mut self, config: SurfaceConfig) {
        if self.surface.config.is_structural_change(&config) {
            self.surface.dirty = true;
        }
        if self.surface.config.pulse_speed != config.pulse_speed
            || self.surface.config.volume_boost != config.volume_boost
        {
            self.surface.animator = SurfaceAnimator::new(config.pulse_speed, config.volume_boost);
        }
        self.surface.config = config;
    }

    /// Force a re-projection (e.g. after parameter edits)
    pub fn invalidate_surface(&mut self) {
        self.surface.dirty = true;
    }

    /// Capture source used the next time audio is enabled
    pub fn set_audio_source(&mut self, source: CaptureSource) {
        self.audio_source = source;
    }

    /// Start or stop audio reactivity
    ///
    /// Stopping releases the capture synchronously and zeroes the bands.
    /// A capture that fails after starting leaves reactivity on with zero bands.
    pub fn set_audio_enabled(&mut self, enabled: bool) -> Result<(), AudioError> {
        match (enabled, self.audio.is_some()) {
            (true, false) => {
                self.audio = Some(AudioAnalyzer::start(self.audio_source.clone(), self.fft)?);
            }
            (false, true) => {
                if let Some(mut audio) = self.audio.take() {
                    audio.stop();
                }
                self.last_bands = AudioBands::default();
            }
            _ => {}
        }
        Ok(())
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio.is_some()
    }

    pub fn audio_status(&self) -> Option<CaptureStatus> {
        self.audio.as_ref().map(AudioAnalyzer::status)
    }

    /// Run one frame; `dt` is seconds since the previous frame
    pub fn tick(&mut self, dt: f32) -> FrameReport {
        let bands = self
            .audio
            .as_ref()
            .map(AudioAnalyzer::bands)
            .unwrap_or_default();
        self.last_bands = bands;

        let target = self.surface.config.audio_target;
        let attractor_reactive = self.audio_enabled() && target.drives_attractor();
        let surface_reactive = self.audio_enabled() && target.drives_surface();
        let surface_bands = if target == AudioTarget::DifferentBands {
            bands.bass_driven()
        } else {
            bands
        };

        let outcome = self.attractor.tick(attractor_reactive, &bands);

        self.surface.poll_task();
        if self.surface.dirty {
            if let Some(def) = self.attractor.definition() {
                self.surface.reproject(def, self.attractor.base_params());
            }
        }
        self.surface.animate(surface_reactive, dt, &surface_bands);

        FrameReport {
            outcome,
            bands,
            point_size: self.style.point_size(attractor_reactive, bands.bass),
            surface_point_size: self
                .surface
                .config
                .particle_size(surface_reactive, surface_bands.bass),
            surface_particles: self
                .surface
                .particles
                .as_ref()
                .map_or(0, SurfaceParticleSet::count),
        }
    }

    pub fn attractor(&self) -> &AttractorInstance {
        &self.attractor
    }

    pub fn cloud(&self) -> &PointCloudBuffer {
        self.attractor.buffer()
    }

    pub fn view_rotation(&self) -> &ViewRotation {
        self.attractor.rotation()
    }

    pub fn surface_particles(&self) -> Option<&SurfaceParticleSet> {
        self.surface.particles.as_ref()
    }

    pub fn surface_config(&self) -> &SurfaceConfig {
        &self.surface.config
    }

    /// True while a background projection is running
    pub fn projection_pending(&self) -> bool {
        self.surface.task.is_some()
    }

    pub fn style(&self) -> &PointStyle {
        &self.style
    }

    /// Mesh opacity for the current blend mode
    pub fn model_opacity(&self) -> f32 {
        self.surface.config.blend_mode.model_opacity()
    }

    pub fn last_bands(&self) -> AudioBands {
        self.last_bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn surface_config(budget: usize) -> SurfaceConfig {
        SurfaceConfig {
            particle_budget: budget,
            jitter_seed: Some(3),
            ..SurfaceConfig::default()
        }
    }

    fn visualizer(budget: usize) -> Visualizer {
        let mut vis = Visualizer::new(VisualizerConfig {
            surface: surface_config(budget),
            ..VisualizerConfig::default()
        });
        vis.select_attractor("clifford", None).unwrap();
        vis
    }

    #[test]
    fn test_tick_without_audio() {
        let mut vis = visualizer(500);
        let report = vis.tick(1.0 / 60.0);

        assert_eq!(report.outcome, FrameOutcome::Updated);
        assert_eq!(report.bands, AudioBands::default());
        assert_eq!(report.point_size, 0.008);
        assert_eq!(report.surface_particles, 0);
        assert_eq!(vis.cloud().len(), 75_000);
    }

    #[test]
    fn test_unknown_attractor_skips_frames() {
        let mut vis = visualizer(500);
        assert!(vis.select_attractor("lorenz", None).is_err());
        assert_eq!(vis.tick(0.016).outcome, FrameOutcome::Skipped);

        vis.select_attractor("aizawa", None).unwrap();
        assert_eq!(vis.tick(0.016).outcome, FrameOutcome::Updated);
    }

    #[test]
    fn test_mesh_projection_lifecycle() {
        let mut vis = visualizer(500);
        vis.set_mesh(SurfaceMesh::uv_sphere(5.0, 32, 16));
        let report = vis.tick(0.016);
        assert_eq!(report.surface_particles, 500);

        // Animation knobs keep the projected set
        let before = vis.surface_particles().unwrap().positions.clone();
        vis.set_surface_config(SurfaceConfig {
            effect_intensity: 2.0,
            ..surface_config(500)
        });
        vis.tick(0.016);
        assert_eq!(vis.surface_particles().unwrap().positions, before);

        vis.set_surface_config(surface_config(200));
        assert_eq!(vis.tick(0.016).surface_particles, 200);

        vis.clear_mesh();
        assert!(vis.surface_particles().is_none());
        assert_eq!(vis.tick(0.016).surface_particles, 0);
    }

    #[test]
    fn test_dense_mesh_projects_in_background() {
        let mut vis = Visualizer::new(VisualizerConfig {
            surface: SurfaceConfig {
                background_vertex_threshold: 0,
                ..surface_config(300)
            },
            ..VisualizerConfig::default()
        });
        vis.select_attractor("halvorsen", None).unwrap();
        vis.set_mesh(SurfaceMesh::torus(4.0, 1.0, 48, 24));

        vis.tick(0.016);
        let deadline = Instant::now() + Duration::from_secs(5);
        while vis.surface_particles().is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
            vis.tick(0.016);
        }
        assert_eq!(vis.surface_particles().map(|s| s.count()), Some(300));
        assert!(!vis.projection_pending());
    }

    #[test]
    fn test_surface_rests_without_audio() {
        let mut vis = visualizer(100);
        vis.set_mesh(SurfaceMesh::uv_sphere(5.0, 16, 8));
        for _ in 0..5 {
            vis.tick(0.016);
        }
        let set = vis.surface_particles().unwrap();
        assert_eq!(set.displaced, set.positions);
    }

    #[test]
    fn test_failed_capture_degrades_to_zero_bands() {
        let mut vis = visualizer(100);
        vis.set_audio_source(CaptureSource::File(PathBuf::from(
            "/nonexistent/strangewave.wav",
        )));
        vis.set_mesh(SurfaceMesh::uv_sphere(5.0, 16, 8));
        vis.set_audio_enabled(true).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while !matches!(vis.audio_status(), Some(CaptureStatus::Failed(_)))
            && Instant::now() < deadline
        {
            std::thread::sleep(Duration::from_millis(5));
        }

        let report = vis.tick(0.016);
        assert_eq!(report.outcome, FrameOutcome::Updated);
        assert_eq!(report.bands, AudioBands::default());

        // Still reactive: the resting offset keeps the surface breathing
        let set = vis.surface_particles().unwrap();
        assert_ne!(set.displaced, set.positions);

        vis.set_audio_enabled(false).unwrap();
        assert!(!vis.audio_enabled());
        vis.tick(0.016);
        let set = vis.surface_particles().unwrap();
        assert_eq!(set.displaced, set.positions);
    }

    #[test]
    fn test_audio_target_routing_sizes() {
        let mut vis = visualizer(100);
        vis.set_surface_config(SurfaceConfig {
            audio_target: AudioTarget::ModelOnly,
            ..surface_config(100)
        });
        let report = vis.tick(0.016);
        assert_eq!(report.point_size, 0.008);
        assert_eq!(report.surface_point_size, 0.015);
        assert_eq!(vis.model_opacity(), 0.6);
    }
}
