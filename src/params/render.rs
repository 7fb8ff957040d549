//! Point styling and snapshot output configuration.

use std::path::PathBuf;

/// Point sprite style handed to the renderer
#[derive(Debug, Clone)]
pub struct PointStyle {
    /// Point size with audio off (world units)
    pub base_size: f32,

    /// Extra size per unit of bass while audio-reactive
    pub bass_boost: f32,

    /// Point opacity (additive blending)
    pub opacity: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            base_size: 0.008,
            bass_boost: 0.01,
            opacity: 0.4,
        }
    }
}

impl PointStyle {
    pub fn point_size(&self, audio_reactive: bool, bass: f32) -> f32 {
        if audio_reactive {
            self.base_size + bass * self.bass_boost
        } else {
            self.base_size
        }
    }
}

/// Headless snapshot configuration
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Image width (pixels)
    pub width: u32,

    /// Image height (pixels)
    pub height: u32,

    /// Half-extent of the visible square in world units
    pub extent: f32,

    /// Output directory for PNG frames
    pub output_dir: PathBuf,

    /// Write a frame every N ticks
    pub every_n_frames: u64,

    pub style: PointStyle,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            extent: 1.5,
            output_dir: PathBuf::from("snapshots"),
            every_n_frames: 60,
            style: PointStyle::default(),
        }
    }
}

impl SnapshotConfig {
    /// Path of the PNG written for a frame
    pub fn frame_path(&self, frame: u64) -> PathBuf {
        self.output_dir.join(format!("frame_{frame:06}.png"))
    }
}
