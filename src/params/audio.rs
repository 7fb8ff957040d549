//! Audio analysis configuration.

use std::ops::Range;

/// FFT analysis configuration with proportional band boundaries
#[derive(Debug, Clone, Copy)]
pub struct FFTConfig {
    /// FFT window size in samples (must be power of 2)
    /// 1024 samples yield 512 magnitude bins
    pub fft_size: usize,

    /// Analysis interval (milliseconds)
    /// 16 ms ≈ one analysis per 60 Hz frame
    pub update_interval_ms: u64,

    /// Magnitude mapped to 0.0 (decibels)
    pub min_decibels: f32,

    /// Magnitude mapped to 1.0 (decibels)
    pub max_decibels: f32,

    /// Temporal smoothing between successive spectra (0 = none, <1)
    pub smoothing: f32,

    /// End of the bass band as a fraction of the bin range
    pub bass_fraction: f32,

    /// End of the mid band as a fraction of the bin range
    pub mid_fraction: f32,
}

impl Default for FFTConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            update_interval_ms: 16,
            min_decibels: -100.0,
            max_decibels: -30.0,
            smoothing: 0.8,
            bass_fraction: 0.1,
            mid_fraction: 0.4,
        }
    }
}

impl FFTConfig {
    /// Number of magnitude bins produced per analysis
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Frequency width of one bin at the given sample rate
    pub fn bin_resolution_hz(&self, sample_rate_hz: u32) -> f32 {
        sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Split `bin_count` bins at floor(n * bass_fraction) and floor(n * mid_fraction)
    pub fn band_edges(&self, bin_count: usize) -> (usize, usize) {
        let bass_end = ((bin_count as f32 * self.bass_fraction).floor() as usize).min(bin_count);
        let mid_end = ((bin_count as f32 * self.mid_fraction).floor() as usize)
            .clamp(bass_end, bin_count);
        (bass_end, mid_end)
    }

    /// Get bin range for bass
    pub fn bass_bins(&self) -> Range<usize> {
        let (bass_end, _) = self.band_edges(self.bin_count());
        0..bass_end
    }

    /// Get bin range for mids
    pub fn mid_bins(&self) -> Range<usize> {
        let (bass_end, mid_end) = self.band_edges(self.bin_count());
        bass_end..mid_end
    }

    /// Get bin range for highs
    pub fn high_bins(&self) -> Range<usize> {
        let (_, mid_end) = self.band_edges(self.bin_count());
        mid_end..self.bin_count()
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 2 {
            return Err(format!(
                "FFT size must be a power of 2, got {}",
                self.fft_size
            ));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(format!("smoothing must be in [0, 1), got {}", self.smoothing));
        }
        if !(0.0 < self.bass_fraction
            && self.bass_fraction < self.mid_fraction
            && self.mid_fraction < 1.0)
        {
            return Err(format!(
                "band fractions must satisfy 0 < bass ({}) < mid ({}) < 1",
                self.bass_fraction, self.mid_fraction
            ));
        }
        Ok(())
    }
}
