//! Parameter definitions with units and documented semantics.
//!
//! All tunable constants live here with:
//! - Units (seconds, decibels, radians, etc.)
//! - Documented ranges and meanings
//! - Type safety where possible

mod audio;
mod render;
mod simulation;
mod surface;

// Re-export all types
pub use audio::FFTConfig;
pub use render::{PointStyle, SnapshotConfig};
pub use simulation::{BlendConfig, RotationConfig};
pub use surface::{AudioTarget, BlendMode, SurfaceConfig};
