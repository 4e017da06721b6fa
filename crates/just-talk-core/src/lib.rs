//! Just Talk Core Library
//!
//! Recording lifecycle for a record-and-send voice note app: microphone
//! capture in pausable spans (CPAL + hound), one-second duration
//! accounting, and a single multipart upload to a webhook (reqwest).
//!
//! # Example
//!
//! ```no_run
//! use just_talk_core::{
//!     CoreResult, MicrophoneDevice, Outcome, PermissionGate, RecordingController,
//!     WebhookTransport,
//! };
//!
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let device = MicrophoneDevice::new(None, std::env::temp_dir().join("just-talk"))?;
//!     let endpoint = "https://example.com/webhook/just-talk".parse().ok();
//!     let transport = WebhookTransport::new(endpoint, Duration::from_secs(30))?;
//!     let mut controller =
//!         RecordingController::new(device, PermissionGate::new(true), transport, false);
//!
//!     controller.start()?;
//!     while let Some(event) = controller.next_event().await {
//!         match controller.handle_event(event) {
//!             Outcome::Ticked { accumulated_seconds: 5 } => {
//!                 controller.stop();
//!             }
//!             Outcome::Completed { result, .. } => return result,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod capture;
mod error;
mod permission;
mod session;
mod upload;

pub use {
    capture::{CaptureDevice, CaptureSpan, FileReference, MicrophoneDevice},
    error::{RecorderError, Result as CoreResult},
    permission::{PermissionGate, PermissionProvider, PermissionStatus},
    reqwest::Url,
    session::{ControllerEvent, Outcome, RecordingController, RecordingState, Session},
    upload::{PLACEHOLDER_ENDPOINT, UploadMetadata, UploadTransport, WebhookTransport},
};

#[cfg(test)]
mod tests;
