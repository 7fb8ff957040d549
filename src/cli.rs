//! Command-line argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::attractor::{self, ParameterVector};
use crate::audio::CaptureSource;
use crate::params::{AudioTarget, BlendMode, SnapshotConfig, SurfaceConfig};
use crate::surface::SurfaceMesh;

/// Audio input selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudioMode {
    Off,
    Mic,
    Loopback,
    File,
}

/// Procedural stand-ins for a loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MeshKind {
    None,
    Sphere,
    Torus,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Both,
    ModelOnly,
    ParticlesOnly,
    DifferentBands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlendArg {
    ModelPrimary,
    Equal,
    ParticlesPrimary,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "strangewave")]
#[command(about = "Audio-reactive strange attractor point clouds", long_about = None)]
pub struct Args {
    /// List attractors and presets, then exit
    #[arg(long)]
    pub list: bool,

    /// Attractor key (see --list)
    #[arg(long, short, default_value = "clifford")]
    pub attractor: String,

    /// Named preset of the selected attractor
    #[arg(long)]
    pub preset: Option<String>,

    /// Parameter override, repeatable (e.g. --param a=-1.7)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, f64)>,

    /// Audio input
    #[arg(long, value_enum, default_value = "off")]
    pub audio: AudioMode,

    /// Input device name (substring match) for loopback capture
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// WAV file for --audio file
    #[arg(long, value_name = "PATH")]
    pub audio_file: Option<PathBuf>,

    /// Run for this many seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 10.0)]
    pub duration: f32,

    /// Run exactly this many frames (overrides --duration)
    #[arg(long)]
    pub frames: Option<u64>,

    /// Target frame rate
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Surface mesh to project onto
    #[arg(long, value_enum, default_value = "none")]
    pub mesh: MeshKind,

    /// Surface particle budget
    #[arg(long, default_value_t = 10_000)]
    pub particles: usize,

    /// Surface scale
    #[arg(long, default_value_t = 20.0)]
    pub scale: f32,

    /// Surface rotation in degrees (x,y,z)
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_rotation)]
    pub rotation: Option<[f32; 3]>,

    /// Which layers react to audio
    #[arg(long, value_enum, default_value = "both")]
    pub target: TargetArg,

    /// Mesh/particle visibility balance
    #[arg(long, value_enum, default_value = "equal")]
    pub blend: BlendArg,

    /// Write PNG snapshots into this directory
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Snapshot every N frames
    #[arg(long, default_value_t = 60)]
    pub snapshot_every: u64,

    /// Snapshot size in pixels (square)
    #[arg(long, default_value_t = 1024)]
    pub snapshot_size: u32,
}

impl Args {
    /// Capture source for the selected audio mode (None when off)
    pub fn capture_source(&self) -> Result<Option<CaptureSource>, String> {
        Ok(match self.audio {
            AudioMode::Off => None,
            AudioMode::Mic => Some(CaptureSource::Microphone),
            AudioMode::Loopback => Some(CaptureSource::Loopback {
                device: self.device.clone(),
            }),
            AudioMode::File => {
                let path = self
                    .audio_file
                    .clone()
                    .ok_or_else(|| "--audio file requires --audio-file".to_string())?;
                Some(CaptureSource::File(path))
            }
        })
    }

    /// Starting parameters: preset (if any) overlaid with --param values
    pub fn initial_params(&self) -> Result<Option<ParameterVector>, String> {
        let mut params = match &self.preset {
            Some(name) => {
                let presets = attractor::presets(&self.attractor).map_err(|e| e.to_string())?;
                let preset = presets
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| format!("'{}' has no preset '{}'", self.attractor, name))?;
                Some(preset.params())
            }
            None => None,
        };

        if !self.params.is_empty() {
            let overrides = params.get_or_insert_with(|| {
                attractor::lookup(&self.attractor)
                    .map(|def| def.default_params())
                    .unwrap_or_default()
            });
            for (key, value) in &self.params {
                overrides.insert(key.clone(), *value);
            }
        }

        Ok(params)
    }

    pub fn surface_config(&self) -> SurfaceConfig {
        let defaults = SurfaceConfig::default();
        SurfaceConfig {
            scale: self.scale,
            particle_budget: self.particles,
            rotation: self
                .rotation
                .map(|r| r.map(f32::to_radians))
                .unwrap_or(defaults.rotation),
            audio_target: match self.target {
                TargetArg::Both => AudioTarget::Both,
                TargetArg::ModelOnly => AudioTarget::ModelOnly,
                TargetArg::ParticlesOnly => AudioTarget::ParticlesOnly,
                TargetArg::DifferentBands => AudioTarget::DifferentBands,
            },
            blend_mode: match self.blend {
                BlendArg::ModelPrimary => BlendMode::ModelPrimary,
                BlendArg::Equal => BlendMode::Equal,
                BlendArg::ParticlesPrimary => BlendMode::ParticlesPrimary,
            },
            ..defaults
        }
    }

    /// Mesh sized so the attractor's ±2 range spans it
    pub fn mesh(&self) -> Option<SurfaceMesh> {
        let extent = self.scale / 4.0 * 2.0;
        match self.mesh {
            MeshKind::None => None,
            MeshKind::Sphere => Some(SurfaceMesh::uv_sphere(extent, 96, 48)),
            MeshKind::Torus => Some(SurfaceMesh::torus(extent * 0.7, extent * 0.3, 128, 48)),
            MeshKind::Grid => Some(SurfaceMesh::grid(100, extent * 2.0 / 100.0)),
        }
    }

    pub fn snapshot_config(&self) -> Option<SnapshotConfig> {
        self.snapshot_dir.as_ref().map(|dir| SnapshotConfig {
            width: self.snapshot_size,
            height: self.snapshot_size,
            output_dir: dir.clone(),
            every_n_frames: self.snapshot_every.max(1),
            ..SnapshotConfig::default()
        })
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Frames to run, from --frames or --duration
    pub fn frame_budget(&self) -> u64 {
        self.frames
            .unwrap_or_else(|| (self.duration.max(0.0) as f64 * self.fps.max(1) as f64) as u64)
    }
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad value for '{}': {}", key, e))?;
    Ok((key.trim().to_string(), value))
}

fn parse_rotation(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|part| part.trim().parse::<f32>().map_err(|e| e.to_string()))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(format!("expected X,Y,Z degrees, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("a=-1.7"), Ok(("a".to_string(), -1.7)));
        assert!(parse_param("a").is_err());
        assert!(parse_param("a=x").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("90, 0, 45"), Ok([90.0, 0.0, 45.0]));
        assert!(parse_rotation("90,0").is_err());
    }

    #[test]
    fn test_preset_with_override() {
        let args = Args::parse_from([
            "strangewave",
            "--preset",
            "spiral",
            "--param",
            "a=2.0",
        ]);
        let params = args.initial_params().unwrap().unwrap();
        assert_eq!(params["a"], 2.0);
        assert_eq!(params["d"], 1.2);
    }

    #[test]
    fn test_file_mode_needs_path() {
        let args = Args::parse_from(["strangewave", "--audio", "file"]);
        assert!(args.capture_source().is_err());

        let args = Args::parse_from(["strangewave", "--audio", "file", "--audio-file", "x.wav"]);
        assert_eq!(
            args.capture_source(),
            Ok(Some(CaptureSource::File(PathBuf::from("x.wav"))))
        );
    }

    #[test]
    fn test_frame_budget() {
        let args = Args::parse_from(["strangewave", "--duration", "2", "--fps", "30"]);
        assert_eq!(args.frame_budget(), 60);
        let args = Args::parse_from(["strangewave", "--frames", "5"]);
        assert_eq!(args.frame_budget(), 5);
    }

    #[test]
    fn test_surface_config_from_args() {
        let args = Args::parse_from([
            "strangewave",
            "--rotation",
            "0,90,0",
            "--target",
            "different-bands",
            "--particles",
            "500",
        ]);
        let config = args.surface_config();
        assert_eq!(config.particle_budget, 500);
        assert_eq!(config.audio_target, AudioTarget::DifferentBands);
        assert!((config.rotation[1] - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
