use crate::{
    CoreResult, RecorderError,
    capture::{FileReference, SPAN_MIME_TYPE},
    upload::{UploadMetadata, UploadTransport},
};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use reqwest::{Client, Url, multipart};
use tracing::{debug, info, instrument};

/// Endpoint value shipped in default configuration; never a real target.
pub const PLACEHOLDER_ENDPOINT: &str = "YOUR_WEBHOOK_URL_HERE";

/// Posts recordings to a webhook as `multipart/form-data`.
///
/// Form fields:
/// - `audio`: the WAV file
/// - `duration`: whole seconds, as text
/// - `multiSpeaker`: `true` or `false`
pub struct WebhookTransport {
    endpoint: Option<Url>,
    client: Client,
}

#[track_caller]
fn upload_failed(reason: String) -> RecorderError {
    RecorderError::UploadFailed {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

impl WebhookTransport {
    /// Create a transport for `endpoint`.
    ///
    /// `None` is accepted so the application can start without a
    /// configured webhook; every upload is then refused with
    /// `ConfigurationMissing`.
    #[track_caller]
    #[instrument]
    pub fn new(endpoint: Option<Url>, timeout: Duration) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| upload_failed(format!("Failed to build HTTP client: {}", e)))?;

        info!(endpoint = ?endpoint.as_ref().map(Url::as_str), "WebhookTransport initialized");

        Ok(Self { endpoint, client })
    }

    #[track_caller]
    fn endpoint(&self) -> CoreResult<&Url> {
        self.endpoint
            .as_ref()
            .ok_or_else(|| RecorderError::ConfigurationMissing {
                reason: "Webhook URL is not set".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl UploadTransport for WebhookTransport {
    fn ready(&self) -> CoreResult<()> {
        self.endpoint().map(|_| ())
    }

    #[instrument(skip(self, file), fields(file = ?file.path()))]
    async fn send(&self, file: FileReference, metadata: UploadMetadata) -> CoreResult<()> {
        let endpoint = self.endpoint()?.clone();

        let bytes = tokio::fs::read(file.path())
            .await
            .map_err(|e| RecorderError::Artifact {
                reason: format!("Failed to read {:?}: {}", file.path(), e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        let byte_count = bytes.len();

        let audio = multipart::Part::bytes(bytes)
            .file_name(file.file_name())
            .mime_str(SPAN_MIME_TYPE)
            .map_err(|e| upload_failed(format!("Invalid audio part: {}", e)))?;

        let form = multipart::Form::new()
            .part("audio", audio)
            .text("duration", metadata.duration_seconds.to_string())
            .text("multiSpeaker", metadata.multi_speaker.to_string());

        debug!(bytes = byte_count, endpoint = %endpoint, "Sending recording to webhook");

        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_failed(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upload_failed(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        info!(
            status = status.as_u16(),
            bytes = byte_count,
            duration_seconds = metadata.duration_seconds,
            multi_speaker = metadata.multi_speaker,
            "Recording uploaded"
        );

        Ok(())
    }
}
