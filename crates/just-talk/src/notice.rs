//! User-facing notices printed to the console.

use just_talk_core::{Outcome, RecorderError, RecordingState};

use std::fmt;

/// User action a failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Starting a new recording.
    Start,
    /// Pausing.
    Pause,
    /// Resuming a paused recording.
    Resume,
    /// Stopping and sending.
    Stop,
}

/// A titled message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Short heading, e.g. "Upload Failed".
    pub title: &'static str,
    /// Body text.
    pub message: &'static str,
}

impl Notice {
    /// Shown at startup when microphone access was not granted.
    pub fn permission_required() -> Self {
        Self {
            title: "Permission Required",
            message: "Please grant microphone permissions to use this app.",
        }
    }

    /// Notice for a failed action.
    pub fn for_failure(action: Action, error: &RecorderError) -> Self {
        match error {
            RecorderError::PermissionDenied { .. } => Self {
                title: "Permission Denied",
                message: "Microphone permission is required.",
            },
            RecorderError::ConfigurationMissing { .. } => Self {
                title: "Configuration Required",
                message: "Please set your webhook URL in config.toml",
            },
            RecorderError::UploadFailed { .. } => Self {
                title: "Upload Failed",
                message: "Failed to send recording. Please check your webhook URL and try again.",
            },
            RecorderError::DeviceUnavailable { .. } | RecorderError::Artifact { .. } => Self {
                title: "Error",
                message: match action {
                    Action::Start => "Failed to start recording. Please try again.",
                    Action::Pause => "Failed to pause recording.",
                    Action::Resume => "Failed to resume recording. Please try again.",
                    Action::Stop => "Failed to stop recording. Please try again.",
                },
            },
        }
    }

    /// Notice for an outcome that finished a session, if any.
    pub fn for_outcome(outcome: &Outcome) -> Option<Self> {
        match outcome {
            Outcome::Completed { result: Ok(()), .. } => Some(Self {
                title: "Success",
                message: "Recording sent successfully!",
            }),
            Outcome::Completed { result: Err(e), .. } => Some(Self::for_failure(Action::Stop, e)),
            _ => None,
        }
    }

    /// Print the notice to stdout.
    pub fn show(&self) {
        println!("{}", self);
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.title, self.message)
    }
}

/// Format elapsed seconds as `MM:SS`; minutes keep counting past 99.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One-line summary for the `status` command.
pub fn status_line(state: RecordingState, seconds: u64, multi_speaker: bool) -> String {
    format!(
        "{:?} {} (multi-speaker: {})",
        state,
        format_elapsed(seconds),
        if multi_speaker { "on" } else { "off" }
    )
}
