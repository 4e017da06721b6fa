use crate::{
    FileReference, RecorderError, UploadMetadata, UploadTransport, Url, WebhookTransport,
    capture::write_span,
};

use std::time::Duration;

use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const TIMEOUT: Duration = Duration::from_secs(5);
const WEBHOOK_PATH: &str = "/webhook/just-talk";

#[allow(clippy::unwrap_used)]
fn span_file() -> (TempDir, FileReference) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("span.wav");
    write_span(&path, &[0.0; 32], 1, 16_000).unwrap();
    (dir, FileReference::new(path))
}

#[allow(clippy::unwrap_used)]
fn endpoint(server: &MockServer) -> Url {
    format!("{}{}", server.uri(), WEBHOOK_PATH).parse().unwrap()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// WHAT: The recording is posted as multipart with duration and speaker flag
/// WHY: The webhook expects `audio`, `duration` and `multiSpeaker` fields
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_configured_endpoint_when_sending_then_multipart_fields_posted() {
    // Given: A webhook accepting one POST
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let transport = WebhookTransport::new(Some(endpoint(&server)), TIMEOUT).unwrap();
    let (_dir, file) = span_file();

    // When: Sending 7 seconds, multi-speaker
    let metadata = UploadMetadata {
        duration_seconds: 7,
        multi_speaker: true,
    };
    let result = transport.send(file, metadata).await;

    // Then: Success and the body carries every field
    assert!(result.is_ok());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    assert!(contains(body, b"name=\"audio\"; filename=\"span.wav\""));
    assert!(contains(body, b"audio/wav"));
    assert!(contains(body, b"name=\"duration\"\r\n\r\n7\r\n"));
    assert!(contains(body, b"name=\"multiSpeaker\"\r\n\r\ntrue\r\n"));
    assert!(contains(body, b"RIFF"));
}

/// WHAT: A non-success status becomes UploadFailed with the status code
/// WHY: The user must learn the upload did not go through
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_server_error_when_sending_then_upload_failed_with_status() {
    // Given: A webhook answering 500
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let transport = WebhookTransport::new(Some(endpoint(&server)), TIMEOUT).unwrap();
    let (_dir, file) = span_file();

    // When: Sending
    let result = transport
        .send(
            file,
            UploadMetadata {
                duration_seconds: 1,
                multi_speaker: false,
            },
        )
        .await;

    // Then: UploadFailed mentioning the status
    match result {
        Err(RecorderError::UploadFailed { reason, .. }) => {
            assert_eq!(reason, "HTTP error! status: 500");
        }
        other => unreachable!("expected UploadFailed, got {:?}", other),
    }
}

/// WHAT: Without an endpoint the transport refuses before any request
/// WHY: An unset webhook URL is a configuration error, not a network error
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_endpoint_when_checking_ready_or_sending_then_configuration_missing() {
    // Given: A transport without endpoint
    let transport = WebhookTransport::new(None, TIMEOUT).unwrap();
    let (_dir, file) = span_file();

    // When: Checking readiness and sending anyway
    let ready = transport.ready();
    let sent = transport
        .send(
            file,
            UploadMetadata {
                duration_seconds: 3,
                multi_speaker: true,
            },
        )
        .await;

    // Then: Both refuse with ConfigurationMissing
    assert!(matches!(ready, Err(RecorderError::ConfigurationMissing { .. })));
    assert!(matches!(sent, Err(RecorderError::ConfigurationMissing { .. })));
}

/// WHAT: A missing recording file fails before any request
/// WHY: Nothing should be posted without audio
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_file_when_sending_then_artifact_error_and_no_request() {
    // Given: A reachable webhook and a file that does not exist
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let transport = WebhookTransport::new(Some(endpoint(&server)), TIMEOUT).unwrap();
    let file = FileReference::new("/nonexistent/span.wav");

    // When: Sending
    let result = transport
        .send(
            file,
            UploadMetadata {
                duration_seconds: 1,
                multi_speaker: false,
            },
        )
        .await;

    // Then: Artifact error
    assert!(matches!(result, Err(RecorderError::Artifact { .. })));
}
