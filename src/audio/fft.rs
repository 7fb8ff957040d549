//! Windowed FFT and band reduction.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::AudioBands;
use crate::params::FFTConfig;

/// Reusable spectrum analyzer producing normalized magnitude bins
///
/// Magnitudes are smoothed over time, converted to decibels and mapped from
/// `[min_decibels, max_decibels]` onto `[0, 1]`.
pub struct SpectrumAnalyzer {
    config: FFTConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bins: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new(config: FFTConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let window = (0..config.fft_size)
            .map(|i| hann_window(i, config.fft_size))
            .collect();

        Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            scratch,
            smoothed: vec![0.0; config.bin_count()],
            bins: vec![0.0; config.bin_count()],
            config,
        }
    }

    /// Analyze the most recent `fft_size` samples
    ///
    /// Shorter input is zero-padded at the front.
    pub fn analyze(&mut self, samples: &[f32]) -> AudioBands {
        let size = self.config.fft_size;
        let recent = &samples[samples.len().saturating_sub(size)..];
        let pad = size - recent.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let smoothing = self.config.smoothing;
        let range_db = self.config.max_decibels - self.config.min_decibels;
        for (k, bin) in self.bins.iter_mut().enumerate() {
            let magnitude = self.buffer[k].norm() / size as f32;
            let smoothed = smoothing * self.smoothed[k] + (1.0 - smoothing) * magnitude;
            self.smoothed[k] = smoothed;

            *bin = if smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                ((db - self.config.min_decibels) / range_db).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }

        reduce_bands(&self.bins, &self.config)
    }

    /// Normalized bins from the last analysis
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// Forget smoothing history
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.bins.fill(0.0);
    }
}

/// Reduce normalized bins to band means
///
/// Bass covers the first `bass_fraction` of the bins, mid runs up to
/// `mid_fraction`, high takes the rest. Volume is the mean over every bin.
pub fn reduce_bands(bins: &[f32], config: &FFTConfig) -> AudioBands {
    let (bass_end, mid_end) = config.band_edges(bins.len());

    AudioBands {
        bass: mean(&bins[..bass_end]),
        mid: mean(&bins[bass_end..mid_end]),
        high: mean(&bins[mid_end..]),
        volume: mean(bins),
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}
