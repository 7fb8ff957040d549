//! Live audio capture and spectrum analysis.
//!
//! Captures a live input (or a WAV file) on a worker thread, runs a windowed
//! FFT over the most recent samples and reduces the spectrum to four bands.
//! The bands are the only state shared with the frame loop.

mod capture;
mod fft;
mod system;

// Re-export public types
pub use capture::CaptureSource;
pub use fft::{hann_window, reduce_bands, SpectrumAnalyzer};
pub use system::{AudioAnalyzer, CaptureStatus};

/// Frequency band selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioBand {
    Bass,
    Mid,
    High,
    Volume,
}

/// Normalized band energies in [0, 1]
///
/// `volume` is the mean over all bins, not a blend of the other three.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioBands {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub volume: f32,
}

impl AudioBands {
    pub fn get(&self, band: AudioBand) -> f32 {
        match band {
            AudioBand::Bass => self.bass,
            AudioBand::Mid => self.mid,
            AudioBand::High => self.high,
            AudioBand::Volume => self.volume,
        }
    }

    /// Bass-only derivative used when the surface listens to a different band mix
    pub fn bass_driven(&self) -> Self {
        Self {
            bass: self.bass,
            mid: self.bass * 0.5,
            high: self.bass * 0.3,
            volume: self.bass,
        }
    }
}
