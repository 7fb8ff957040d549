//! Audio analyzer lifecycle: start, status, band snapshots and stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use super::capture::{ActiveCapture, CaptureSource, SampleQueue};
use super::fft::SpectrumAnalyzer;
use super::AudioBands;
use crate::error::AudioError;
use crate::params::FFTConfig;

/// Lock a mutex, recovering the data if another thread panicked holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Capture lifecycle as seen from the frame loop
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureStatus {
    /// Waiting for the source to open (may be awaiting a permission grant)
    Pending,
    /// Capturing and analyzing
    Running { source: String, sample_rate: u32 },
    /// Capture could not start; bands stay at zero and nothing retries
    Failed(AudioError),
    /// Released by `stop`
    Stopped,
}

/// State shared between the analysis thread and the frame loop
struct Shared {
    bands: Mutex<AudioBands>,
    status: Mutex<CaptureStatus>,
    stop: AtomicBool,
}

/// Live spectrum analyzer running on its own thread
///
/// `start` returns immediately; the source is opened on the worker thread so
/// the frame loop keeps running (with zero bands) while acquisition is pending.
pub struct AudioAnalyzer {
    shared: Arc<Shared>,
    worker: Option<thread::JoinHandle<()>>,
    source: CaptureSource,
}

impl AudioAnalyzer {
    /// Validate the configuration and begin capturing from `source`
    pub fn start(source: CaptureSource, fft_config: FFTConfig) -> Result<Self, AudioError> {
        fft_config.validate().map_err(AudioError::InvalidConfig)?;

        let shared = Arc::new(Shared {
            bands: Mutex::new(AudioBands::default()),
            status: Mutex::new(CaptureStatus::Pending),
            stop: AtomicBool::new(false),
        });

        log::info!("Starting audio capture from {}", source.describe());

        let worker_shared = Arc::clone(&shared);
        let worker_source = source.clone();
        let worker = thread::Builder::new()
            .name("strangewave-audio".to_string())
            .spawn(move || run_capture(worker_source, fft_config, worker_shared))
            .map_err(|e| AudioError::Permission(format!("cannot spawn audio thread: {}", e)))?;

        Ok(Self {
            shared,
            worker: Some(worker),
            source,
        })
    }

    /// Consistent snapshot of the latest bands
    pub fn bands(&self) -> AudioBands {
        *lock(&self.shared.bands)
    }

    pub fn status(&self) -> CaptureStatus {
        lock(&self.shared.status).clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status(), CaptureStatus::Running { .. })
    }

    pub fn source(&self) -> &CaptureSource {
        &self.source
    }

    /// Block until the capture is running or has failed
    ///
    /// Intended for hosts that can afford to wait (CLI startup); the frame
    /// loop should poll `status` instead.
    pub fn wait_ready(&self, timeout: Duration) -> Result<(), AudioError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.status() {
                CaptureStatus::Running { .. } => return Ok(()),
                CaptureStatus::Failed(err) => return Err(err),
                CaptureStatus::Stopped => {
                    return Err(AudioError::Permission("capture was stopped".to_string()))
                }
                CaptureStatus::Pending if Instant::now() >= deadline => {
                    return Err(AudioError::Permission(
                        "timed out waiting for capture permission".to_string(),
                    ))
                }
                CaptureStatus::Pending => thread::sleep(Duration::from_millis(5)),
            }
        }
    }

    /// Release the capture, stop analysis and zero the bands
    ///
    /// Joins the worker once it is running, so the device is closed when this
    /// returns. A worker still waiting on acquisition is detached; it releases
    /// the source as soon as acquisition completes.
    pub fn stop(&mut self) {
        // Flag and status change together; the worker re-checks the flag under
        // the same lock before publishing Running.
        let pending = {
            let status = lock(&self.shared.status);
            self.shared.stop.store(true, Ordering::SeqCst);
            matches!(*status, CaptureStatus::Pending)
        };

        if let Some(worker) = self.worker.take() {
            if pending {
                log::debug!("Audio capture still pending; detaching worker");
            } else if worker.join().is_err() {
                log::error!("Audio worker panicked");
            }
        }

        *lock(&self.shared.bands) = AudioBands::default();
        let mut status = lock(&self.shared.status);
        if !matches!(*status, CaptureStatus::Failed(_)) {
            *status = CaptureStatus::Stopped;
        }
        log::info!("Audio capture stopped");
    }
}

impl Drop for AudioAnalyzer {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

/// Worker body: open the source, then analyze until asked to stop
fn run_capture(source: CaptureSource, config: FFTConfig, shared: Arc<Shared>) {
    let queue = SampleQueue::new(config.fft_size * 2);

    let mut capture = match ActiveCapture::open(&source, &queue) {
        Ok(capture) => capture,
        Err(err) => {
            log::warn!("Audio capture failed: {}", err);
            *lock(&shared.bands) = AudioBands::default();
            let mut status = lock(&shared.status);
            if !shared.stop.load(Ordering::SeqCst) {
                *status = CaptureStatus::Failed(err);
            }
            return;
        }
    };

    {
        let mut status = lock(&shared.status);
        if shared.stop.load(Ordering::SeqCst) {
            // Stopped while acquisition was pending
            drop(status);
            drop(capture);
            return;
        }
        *status = CaptureStatus::Running {
            source: capture.name(),
            sample_rate: capture.sample_rate(),
        };
    }

    log::info!(
        "Audio analysis: {} bins, {:.1} Hz per bin",
        config.bin_count(),
        config.bin_resolution_hz(capture.sample_rate())
    );

    let interval = Duration::from_millis(config.update_interval_ms);
    let fft_size = config.fft_size;
    let mut analyzer = SpectrumAnalyzer::new(config);

    while !shared.stop.load(Ordering::SeqCst) {
        thread::sleep(interval);

        if let Err(err) = capture.pump(&queue) {
            log::warn!("Audio source error: {}", err);
            *lock(&shared.status) = CaptureStatus::Failed(err);
            break;
        }

        if queue.len() < fft_size {
            continue;
        }
        let bands = queue.with_samples(|samples| analyzer.analyze(samples));
        *lock(&shared.bands) = bands;
    }

    drop(capture);
    *lock(&shared.bands) = AudioBands::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_tone(path: &std::path::Path, seconds: f32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (22_050.0 * seconds) as usize;
        for i in 0..frames {
            let t = i as f32 / 22_050.0;
            writer
                .write_sample((2.0 * std::f32::consts::PI * 120.0 * t).sin() * 0.5)
                .unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_invalid_config_is_rejected_synchronously() {
        let config = FFTConfig {
            fft_size: 1000,
            ..FFTConfig::default()
        };
        let result = AudioAnalyzer::start(CaptureSource::File(PathBuf::from("x.wav")), config);
        assert!(matches!(result, Err(AudioError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file_fails_without_retry() {
        let analyzer = AudioAnalyzer::start(
            CaptureSource::File(PathBuf::from("/nonexistent/strangewave.wav")),
            FFTConfig::default(),
        )
        .unwrap();

        let result = analyzer.wait_ready(Duration::from_secs(2));
        assert!(matches!(result, Err(AudioError::Source(_))));
        assert!(matches!(analyzer.status(), CaptureStatus::Failed(_)));
        assert_eq!(analyzer.bands(), AudioBands::default());
    }

    #[test]
    fn test_empty_wav_reports_no_audio_track() {
        let path =
            std::env::temp_dir().join(format!("strangewave_empty_{}.wav", std::process::id()));
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        hound::WavWriter::create(&path, spec).unwrap().finalize().unwrap();

        let analyzer =
            AudioAnalyzer::start(CaptureSource::File(path.clone()), FFTConfig::default()).unwrap();
        let result = analyzer.wait_ready(Duration::from_secs(2));
        assert!(matches!(result, Err(AudioError::NoAudioTrack(_))));
        assert!(matches!(
            analyzer.status(),
            CaptureStatus::Failed(AudioError::NoAudioTrack(_))
        ));
        assert!(!analyzer.is_running());
        assert_eq!(analyzer.bands(), AudioBands::default());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_stop_right_after_start_stays_stopped() {
        let path =
            std::env::temp_dir().join(format!("strangewave_restart_{}.wav", std::process::id()));
        write_tone(&path, 0.5);

        for _ in 0..20 {
            let mut analyzer =
                AudioAnalyzer::start(CaptureSource::File(path.clone()), FFTConfig::default())
                    .unwrap();
            analyzer.stop();
            assert_eq!(analyzer.status(), CaptureStatus::Stopped);

            thread::sleep(Duration::from_millis(20));
            assert_eq!(analyzer.status(), CaptureStatus::Stopped);
            assert!(!analyzer.is_running());
            assert_eq!(analyzer.bands(), AudioBands::default());
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_capture_produces_bands_and_stop_zeroes_them() {
        let path =
            std::env::temp_dir().join(format!("strangewave_tone_{}.wav", std::process::id()));
        write_tone(&path, 1.0);

        let mut analyzer =
            AudioAnalyzer::start(CaptureSource::File(path.clone()), FFTConfig::default()).unwrap();
        analyzer.wait_ready(Duration::from_secs(2)).unwrap();
        assert!(analyzer.is_running());

        let deadline = Instant::now() + Duration::from_secs(2);
        while analyzer.bands().volume == 0.0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        let bands = analyzer.bands();
        assert!(bands.bass > 0.0);
        assert!(bands.bass > bands.high);

        analyzer.stop();
        assert_eq!(analyzer.bands(), AudioBands::default());
        assert_eq!(analyzer.status(), CaptureStatus::Stopped);

        let _ = std::fs::remove_file(&path);
    }
}
