//! Upload collaborator.

mod webhook;

pub use webhook::{PLACEHOLDER_ENDPOINT, WebhookTransport};

use crate::{CoreResult, capture::FileReference};

use std::future::Future;

/// Metadata sent alongside the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadMetadata {
    /// Seconds spent recording across every span of the session.
    pub duration_seconds: u64,
    /// Whether the recording has more than one speaker.
    pub multi_speaker: bool,
}

/// One-shot delivery of a finished recording.
///
/// Called at most once per completed session: no retry, no chunking.
pub trait UploadTransport: Send + Sync + 'static {
    /// Refuse up front when the transport cannot possibly deliver, e.g.
    /// because no endpoint is configured.
    fn ready(&self) -> CoreResult<()>;

    /// Deliver `file` with `metadata`.
    fn send(
        &self,
        file: FileReference,
        metadata: UploadMetadata,
    ) -> impl Future<Output = CoreResult<()>> + Send;
}
