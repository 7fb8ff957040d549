//! Surface projection and mesh-layer configuration.

use std::f32::consts::FRAC_PI_2;

/// Which layers respond to audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioTarget {
    /// Attractor cloud and surface particles both react
    #[default]
    Both,
    /// Only the surface particles react
    ModelOnly,
    /// Only the free attractor cloud reacts
    ParticlesOnly,
    /// Both react; the surface layer is driven by bass alone
    DifferentBands,
}

impl AudioTarget {
    /// Does the free attractor cloud react to audio?
    pub fn drives_attractor(self) -> bool {
        matches!(self, Self::Both | Self::ParticlesOnly | Self::DifferentBands)
    }

    /// Does the surface layer react to audio?
    pub fn drives_surface(self) -> bool {
        matches!(self, Self::Both | Self::ModelOnly | Self::DifferentBands)
    }
}

/// Relative visibility of the mesh versus the particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    ModelPrimary,
    #[default]
    Equal,
    ParticlesPrimary,
}

impl BlendMode {
    /// Mesh opacity the renderer should use for this mode
    pub fn model_opacity(self) -> f32 {
        match self {
            Self::ModelPrimary => 0.9,
            Self::Equal => 0.6,
            Self::ParticlesPrimary => 0.3,
        }
    }
}

/// Surface projection parameters
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Mesh scale in world units; attractor points are scaled by scale / 4
    /// so the attractor's ±2 range spans the mesh
    pub scale: f32,

    /// Requested number of surface particles
    pub particle_budget: usize,

    /// Mesh rotation (Euler XYZ, radians)
    pub rotation: [f32; 3],

    /// Upper bound on mesh vertices scanned per nearest-point query
    pub vertex_scan_limit: usize,

    /// Iterations used for the surface source cloud (recomputed without audio)
    pub source_iterations: usize,

    /// Meshes with more vertices than this project on a background thread
    pub background_vertex_threshold: usize,

    /// Seed for per-particle size jitter (None = seeded from entropy)
    pub jitter_seed: Option<u64>,

    /// Resting displacement along the surface normal (mesh units)
    pub surface_offset: f32,

    /// Multiplier on the breathing displacement
    pub effect_intensity: f32,

    /// Extra displacement per unit of volume
    pub volume_boost: f32,

    /// Pulse phase advance per second
    pub pulse_speed: f32,

    /// Base point size of surface particles
    pub particle_size: f32,

    /// Surface particle opacity (additive blending)
    pub particle_opacity: f32,

    pub audio_target: AudioTarget,
    pub blend_mode: BlendMode,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            scale: 20.0,
            particle_budget: 10_000,
            rotation: [FRAC_PI_2, 0.0, 0.0],
            vertex_scan_limit: 1000,
            source_iterations: 50_000,
            background_vertex_threshold: 100_000,
            jitter_seed: None,
            surface_offset: 0.05,
            effect_intensity: 1.0,
            volume_boost: 0.2,
            pulse_speed: 10.0,
            particle_size: 0.015,
            particle_opacity: 0.8,
            audio_target: AudioTarget::default(),
            blend_mode: BlendMode::default(),
        }
    }
}

impl SurfaceConfig {
    /// Returns true if switching from `self` to `other` invalidates projected particles
    pub fn is_structural_change(&self, other: &SurfaceConfig) -> bool {
        self.scale != other.scale
            || self.particle_budget != other.particle_budget
            || self.rotation != other.rotation
            || self.vertex_scan_limit != other.vertex_scan_limit
            || self.source_iterations != other.source_iterations
    }

    /// Surface particle size, swelling with bass while the surface reacts
    pub fn particle_size(&self, reacting: bool, bass: f32) -> f32 {
        if reacting {
            self.particle_size * (1.0 + bass * 0.5)
        } else {
            self.particle_size
        }
    }
}
