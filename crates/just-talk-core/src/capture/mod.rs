//! Audio capture collaborator.
//!
//! The controller only sees [`CaptureDevice`]: open a span, close it into a
//! file, or throw it away. [`MicrophoneDevice`] is the cpal-backed
//! implementation used by the desktop binary.

mod microphone;
mod wav;

pub(crate) use wav::{SPAN_MIME_TYPE, SpanWriter, join_spans, remove_spans};

#[cfg(test)]
pub(crate) use wav::write_span;

pub use microphone::{CaptureSpan, MicrophoneDevice};

use crate::CoreResult;

use std::path::{Path, PathBuf};

/// A finalized capture span on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    path: PathBuf,
}

impl FileReference {
    /// Wrap a path to a finished WAV file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used for the upload, falling back to `recording.wav`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording.wav".to_string())
    }
}

/// A microphone that records in independent spans.
///
/// The device has no in-place pause: every span is opened, then either
/// closed into a [`FileReference`] or discarded.
pub trait CaptureDevice {
    /// Exclusive handle for one span in progress.
    type Handle;

    /// Begin a new span.
    ///
    /// # Errors
    ///
    /// `DeviceUnavailable` if no session can be opened.
    fn open(&mut self) -> CoreResult<Self::Handle>;

    /// Finish a span and persist its samples.
    fn close(&mut self, handle: Self::Handle) -> CoreResult<FileReference>;

    /// Tear a span down without keeping any audio.
    fn discard(&mut self, handle: Self::Handle) -> CoreResult<()>;
}
