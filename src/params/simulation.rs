//! Parameter smoothing and view rotation rates.

/// Exponential smoothing factors applied once per frame
///
/// Formula: current = current + (target - current) * rate
#[derive(Debug, Clone)]
pub struct BlendConfig {
    /// Smoothing factor while audio reactivity is off (dimensionless, 0..=1)
    pub idle_rate: f64,

    /// Smoothing factor while audio reactivity is on
    /// Higher so modulation feels immediate
    pub reactive_rate: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            idle_rate: 0.25,
            reactive_rate: 0.5,
        }
    }
}

impl BlendConfig {
    /// Pick the smoothing factor for the current audio state
    pub fn rate(&self, audio_reactive: bool) -> f64 {
        if audio_reactive {
            self.reactive_rate
        } else {
            self.idle_rate
        }
    }
}

/// Slow view rotation applied to the rendered cloud (radians per frame)
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Base Z rotation per frame
    pub base_rate: f32,

    /// Extra Z rotation per frame per unit of volume (audio-reactive only)
    pub volume_boost: f32,

    /// X rate as a fraction of the Z rate (3D attractors only)
    pub x_fraction: f32,

    /// Y rate as a fraction of the Z rate (3D attractors only)
    pub y_fraction: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.001,
            volume_boost: 0.005,
            x_fraction: 0.5,
            y_fraction: 0.3,
        }
    }
}
