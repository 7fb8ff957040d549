//! Error types for strangewave.
//!
//! None of these are fatal to the frame loop: an unknown attractor skips the
//! frame, and audio failures leave the bands at zero.

use std::fmt;

/// Errors from the attractor registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttractorError {
    /// No definition registered under this key.
    UnknownType(String),
}

impl fmt::Display for AttractorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttractorError::UnknownType(key) => write!(f, "Unknown attractor type '{}'", key),
        }
    }
}

impl std::error::Error for AttractorError {}

/// Errors from audio capture and analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Capture was refused or the stream could not be opened.
    Permission(String),
    /// The selected source was granted but carries no audio.
    NoAudioTrack(String),
    /// Analysis configuration is invalid.
    InvalidConfig(String),
    /// A file source could not be read or decoded.
    Source(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Permission(msg) => write!(f, "Audio capture denied: {}", msg),
            AudioError::NoAudioTrack(msg) => {
                write!(f, "Selected capture source has no audio track: {}", msg)
            }
            AudioError::InvalidConfig(msg) => write!(f, "Invalid FFT config: {}", msg),
            AudioError::Source(msg) => write!(f, "Failed to read audio source: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<hound::Error> for AudioError {
    fn from(e: hound::Error) -> Self {
        AudioError::Source(e.to_string())
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(e: cpal::BuildStreamError) -> Self {
        match e {
            cpal::BuildStreamError::StreamConfigNotSupported => {
                AudioError::NoAudioTrack(e.to_string())
            }
            other => AudioError::Permission(other.to_string()),
        }
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(e: cpal::PlayStreamError) -> Self {
        AudioError::Permission(e.to_string())
    }
}

/// Errors that can occur while writing snapshots.
#[derive(Debug)]
pub enum SnapshotError {
    /// Failed to create the output directory or file.
    Io(std::io::Error),
    /// Failed to encode the image.
    Encode(image::ImageError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "Failed to write snapshot: {}", e),
            SnapshotError::Encode(e) => write!(f, "Failed to encode snapshot: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(e) => Some(e),
            SnapshotError::Encode(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

impl From<image::ImageError> for SnapshotError {
    fn from(e: image::ImageError) -> Self {
        SnapshotError::Encode(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_key() {
        let err = AttractorError::UnknownType("lorenz".to_string());
        assert_eq!(err.to_string(), "Unknown attractor type 'lorenz'");
    }

    #[test]
    fn test_unsupported_config_means_no_audio() {
        let err: AudioError = cpal::BuildStreamError::StreamConfigNotSupported.into();
        assert!(matches!(err, AudioError::NoAudioTrack(_)));

        let err: AudioError = cpal::BuildStreamError::DeviceNotAvailable.into();
        assert!(matches!(err, AudioError::Permission(_)));
    }
}
