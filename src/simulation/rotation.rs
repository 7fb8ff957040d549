//! Slow view rotation applied to the rendered cloud.

use glam::{EulerRot, Mat3, Vec3};

use crate::attractor::Dimension;
use crate::params::RotationConfig;

/// Accumulated Euler angles (radians, XYZ order)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewRotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl ViewRotation {
    /// Advance one frame; 2D patterns spin about z only
    ///
    /// Speed is `base_rate`, plus `volume * volume_boost` while audio-reactive.
    pub fn advance(
        &mut self,
        dimension: Dimension,
        audio_reactive: bool,
        volume: f32,
        config: &RotationConfig,
    ) {
        let speed = if audio_reactive {
            config.base_rate + volume * config.volume_boost
        } else {
            config.base_rate
        };

        self.z += speed;
        if dimension == Dimension::Three {
            self.x += speed * config.x_fraction;
            self.y += speed * config.y_fraction;
        }
    }

    pub fn angles(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Rotation matrix for render space
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_euler(EulerRot::XYZ, self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_patterns_spin_about_z() {
        let mut rotation = ViewRotation::default();
        rotation.advance(Dimension::Two, false, 1.0, &RotationConfig::default());
        assert_eq!(rotation.x, 0.0);
        assert_eq!(rotation.y, 0.0);
        assert!((rotation.z - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_volume_speeds_up_rotation() {
        let config = RotationConfig::default();
        let mut rotation = ViewRotation::default();
        rotation.advance(Dimension::Three, true, 1.0, &config);

        let speed = 0.006;
        assert!((rotation.z - speed).abs() < 1e-7);
        assert!((rotation.x - speed * 0.5).abs() < 1e-7);
        assert!((rotation.y - speed * 0.3).abs() < 1e-7);
    }
}
