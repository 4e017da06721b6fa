use error_location::ErrorLocation;
use thiserror::Error;

/// Recorder errors with source location tracking.
///
/// Every variant is recoverable at the controller boundary; none of them
/// leaves a session partially transitioned.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Microphone permission is not granted at call time.
    #[error("Microphone permission denied {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device could not open or finalize a span.
    #[error("Audio device unavailable: {reason} {location}")]
    DeviceUnavailable {
        /// Description of the device failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The upload request failed at the transport level or was rejected.
    #[error("Upload failed: {reason} {location}")]
    UploadFailed {
        /// Transport-level reason, e.g. `HTTP error! status: 500`.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No usable upload endpoint is configured.
    #[error("Configuration missing: {reason} {location}")]
    ConfigurationMissing {
        /// What is missing from the configuration.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading, writing or joining a WAV span failed.
    #[error("Recording artifact error: {reason} {location}")]
    Artifact {
        /// Description of the artifact failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
