//! Capture sources feeding the analysis buffer.
//!
//! Device captures push mono samples from the cpal callback. File captures
//! are pumped by the analysis loop at wall-clock pace so a WAV file behaves
//! like a live stream.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use super::system::lock;
use crate::error::AudioError;

/// Device names that usually expose system output as an input
const LOOPBACK_HINTS: [&str; 5] = ["monitor", "loopback", "stereo mix", "blackhole", "what u hear"];

/// Where audio comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    /// Default input device
    Microphone,
    /// System output captured through a loopback/monitor input
    /// (named device, or the first input whose name looks like one)
    Loopback { device: Option<String> },
    /// WAV file streamed in real time, looping at the end
    File(PathBuf),
}

impl CaptureSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Microphone => "microphone".to_string(),
            Self::Loopback { device: Some(name) } => format!("loopback '{}'", name),
            Self::Loopback { device: None } => "loopback".to_string(),
            Self::File(path) => format!("file {}", path.display()),
        }
    }
}

/// Shared mono sample queue, bounded to `capacity` samples
#[derive(Clone)]
pub struct SampleQueue {
    samples: Arc<Mutex<Vec<f32>>>,
    capacity: usize,
}

impl SampleQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(Vec::with_capacity(capacity * 2))),
            capacity,
        }
    }

    /// Append samples, dropping the oldest beyond capacity
    pub fn extend<I: IntoIterator<Item = f32>>(&self, incoming: I) {
        let mut samples = lock(&self.samples);
        samples.extend(incoming);
        if samples.len() > self.capacity {
            let excess = samples.len() - self.capacity;
            samples.drain(0..excess);
        }
    }

    /// Run `f` over the current contents
    pub fn with_samples<R>(&self, f: impl FnOnce(&[f32]) -> R) -> R {
        f(&lock(&self.samples))
    }

    pub fn len(&self) -> usize {
        lock(&self.samples).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        lock(&self.samples).clear();
    }
}

/// An open capture; dropping it releases the device or file
pub enum ActiveCapture {
    Device {
        _stream: cpal::Stream,
        name: String,
        sample_rate: u32,
    },
    File(FileCapture),
}

impl ActiveCapture {
    /// Open the requested source, pushing samples into `queue`
    pub fn open(source: &CaptureSource, queue: &SampleQueue) -> Result<Self, AudioError> {
        match source {
            CaptureSource::Microphone => {
                let host = cpal::default_host();
                let device = host.default_input_device().ok_or_else(|| {
                    AudioError::NoAudioTrack("no default input device".to_string())
                })?;
                open_device(device, queue)
            }
            CaptureSource::Loopback { device } => {
                let device = find_loopback_device(device.as_deref())?;
                open_device(device, queue)
            }
            CaptureSource::File(path) => FileCapture::open(path).map(ActiveCapture::File),
        }
    }

    /// Move any due samples into the queue (no-op for device captures)
    pub fn pump(&mut self, queue: &SampleQueue) -> Result<(), AudioError> {
        match self {
            ActiveCapture::Device { .. } => Ok(()),
            ActiveCapture::File(file) => file.pump(queue),
        }
    }

    pub fn name(&self) -> String {
        match self {
            ActiveCapture::Device { name, .. } => name.clone(),
            ActiveCapture::File(file) => file.path.display().to_string(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        match self {
            ActiveCapture::Device { sample_rate, .. } => *sample_rate,
            ActiveCapture::File(file) => file.sample_rate,
        }
    }
}

fn find_loopback_device(requested: Option<&str>) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| AudioError::Permission(format!("cannot enumerate input devices: {}", e)))?;

    for device in devices {
        let Ok(name) = device.name() else { continue };
        let lowered = name.to_lowercase();
        let matches = match requested {
            Some(wanted) => lowered.contains(&wanted.to_lowercase()),
            None => LOOPBACK_HINTS.iter().any(|hint| lowered.contains(hint)),
        };
        if matches {
            return Ok(device);
        }
    }

    Err(AudioError::NoAudioTrack(match requested {
        Some(wanted) => format!("no input device matching '{}'", wanted),
        None => "no loopback or monitor input device found".to_string(),
    }))
}

fn open_device(device: cpal::Device, queue: &SampleQueue) -> Result<ActiveCapture, AudioError> {
    let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

    let supported = device.default_input_config().map_err(|e| match e {
        cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
            AudioError::NoAudioTrack(format!("'{}' offers no input stream", name))
        }
        other => AudioError::Permission(format!("'{}': {}", name, other)),
    })?;

    let config: cpal::StreamConfig = supported.config();
    if config.channels == 0 {
        return Err(AudioError::NoAudioTrack(format!(
            "'{}' reports zero input channels",
            name
        )));
    }
    let sample_rate = config.sample_rate.0;

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_input_stream::<f32>(&device, &config, queue.clone())?,
        cpal::SampleFormat::I16 => build_input_stream::<i16>(&device, &config, queue.clone())?,
        cpal::SampleFormat::U16 => build_input_stream::<u16>(&device, &config, queue.clone())?,
        other => {
            return Err(AudioError::NoAudioTrack(format!(
                "unsupported input sample format {:?}",
                other
            )));
        }
    };
    stream.play()?;

    log::info!(
        "Audio capture: {} @ {}Hz, {} channel(s)",
        name,
        sample_rate,
        config.channels
    );

    Ok(ActiveCapture::Device {
        _stream: stream,
        name,
        sample_rate,
    })
}

fn build_input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    queue: SampleQueue,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            queue.extend(data.chunks(channels).map(downmix));
        },
        |err| log::error!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Average one interleaved frame down to mono
fn downmix<T>(frame: &[T]) -> f32
where
    T: Sample,
    f32: FromSample<T>,
{
    let sum: f32 = frame.iter().map(|s| s.to_sample::<f32>()).sum();
    sum / frame.len().max(1) as f32
}

/// WAV file replayed at its own sample rate
pub struct FileCapture {
    path: PathBuf,
    reader: hound::WavReader<BufReader<File>>,
    channels: usize,
    sample_rate: u32,
    started: Instant,
    frames_sent: u64,
}

impl FileCapture {
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        if spec.channels == 0 || reader.duration() == 0 {
            return Err(AudioError::NoAudioTrack(format!(
                "{} contains no audio frames",
                path.display()
            )));
        }

        log::info!(
            "Audio file: {} @ {}Hz, {} channel(s), {} frames",
            path.display(),
            spec.sample_rate,
            spec.channels,
            reader.duration()
        );

        Ok(Self {
            path: path.to_path_buf(),
            channels: spec.channels as usize,
            sample_rate: spec.sample_rate,
            reader,
            started: Instant::now(),
            frames_sent: 0,
        })
    }

    /// Push the frames that should have played since the last call
    pub fn pump(&mut self, queue: &SampleQueue) -> Result<(), AudioError> {
        let due = (self.started.elapsed().as_secs_f64() * self.sample_rate as f64) as u64;
        let wanted = due.saturating_sub(self.frames_sent);
        if wanted == 0 {
            return Ok(());
        }

        let mut mono = Vec::with_capacity(wanted as usize);
        let mut frame = Vec::with_capacity(self.channels);
        while (mono.len() as u64) < wanted {
            frame.clear();
            for _ in 0..self.channels {
                match self.next_sample()? {
                    Some(sample) => frame.push(sample),
                    None => break,
                }
            }
            if frame.len() < self.channels {
                // End of file: loop
                self.reader
                    .seek(0)
                    .map_err(|e| AudioError::Source(format!("rewind failed: {}", e)))?;
                continue;
            }
            mono.push(frame.iter().sum::<f32>() / self.channels as f32);
        }

        self.frames_sent += wanted;
        queue.extend(mono);
        Ok(())
    }

    fn next_sample(&mut self) -> Result<Option<f32>, AudioError> {
        let spec = self.reader.spec();
        let sample = match spec.sample_format {
            hound::SampleFormat::Float => self.reader.samples::<f32>().next().transpose()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                self.reader
                    .samples::<i32>()
                    .next()
                    .transpose()?
                    .map(|s| s as f32 / full_scale)
            }
        };
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, frames: usize) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            let v = if i % 2 == 0 { i16::MAX / 2 } else { -(i16::MAX / 2) };
            writer.write_sample(v).unwrap();
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_queue_is_bounded() {
        let queue = SampleQueue::new(4);
        queue.extend([1.0, 2.0, 3.0]);
        queue.extend([4.0, 5.0, 6.0]);
        queue.with_samples(|s| assert_eq!(s, &[3.0, 4.0, 5.0, 6.0]));
        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_downmix_averages_channels() {
        assert_eq!(downmix(&[0.5f32, -0.5]), 0.0);
        assert_eq!(downmix(&[1.0f32, 0.5]), 0.75);
    }

    #[test]
    fn test_file_capture_pumps_mono_samples() {
        let path =
            std::env::temp_dir().join(format!("strangewave_pump_{}.wav", std::process::id()));
        write_test_wav(&path, 100);

        let mut capture = FileCapture::open(&path).unwrap();
        assert_eq!(capture.reader.duration(), 100);

        let queue = SampleQueue::new(10_000);
        std::thread::sleep(std::time::Duration::from_millis(30));
        capture.pump(&queue).unwrap();

        // 30 ms at 8 kHz is at least 240 frames; the 100-frame file loops
        assert!(queue.len() >= 240);
        queue.with_samples(|s| {
            assert!(s.iter().all(|v| v.abs() <= 0.51));
            assert!(s[0] > 0.0);
        });

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_a_source_error() {
        let result = FileCapture::open(Path::new("/nonexistent/strangewave.wav"));
        assert!(matches!(result, Err(AudioError::Source(_))));
    }
}
