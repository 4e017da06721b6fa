//! Recording lifecycle controller.
//!
//! Transition table:
//!
//! | From                       | Event            | To                |
//! |----------------------------|------------------|-------------------|
//! | Idle                       | `start`          | Recording         |
//! | Recording                  | `pause`          | Paused            |
//! | Paused                     | `resume`/`start` | Recording         |
//! | Recording, Paused          | `stop`           | Stopping → Idle   |
//! | Recording, Paused, Stopping| `cancel`         | Idle              |
//!
//! Every other combination is a no-op reported as [`Outcome::Ignored`].
//!
//! The controller never blocks: ticks and upload completions come back as
//! [`ControllerEvent`]s which the owner feeds to
//! [`RecordingController::handle_event`] from its event loop.

use crate::{
    CoreResult, RecorderError,
    capture::{CaptureDevice, FileReference, join_spans, remove_spans},
    permission::{PermissionProvider, PermissionStatus},
    session::{DurationTicker, Phase, RecordingState, Session},
    upload::{UploadMetadata, UploadTransport},
};

use std::{panic::Location, path::PathBuf, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Asynchronous results delivered back to the controller.
#[derive(Debug)]
pub enum ControllerEvent {
    /// One second elapsed in the given span.
    Tick {
        /// Span the tick belongs to.
        span: u64,
    },
    /// The upload for a session finished.
    UploadFinished {
        /// Session that was uploaded.
        session_id: Uuid,
        /// Metadata that was sent.
        metadata: UploadMetadata,
        /// Transport result.
        result: CoreResult<()>,
    },
}

/// What a call or event did to the session.
#[derive(Debug)]
pub enum Outcome {
    /// A new session started recording.
    Started,
    /// A paused session is recording again.
    Resumed,
    /// Recording paused; duration frozen.
    Paused,
    /// Capture finished and the upload is in flight.
    Uploading(UploadMetadata),
    /// The session finished (uploaded or failed) and is back to Idle.
    Completed {
        /// Metadata of the finished session.
        metadata: UploadMetadata,
        /// Upload result.
        result: CoreResult<()>,
    },
    /// The session was discarded without uploading.
    Cancelled,
    /// One more second was recorded.
    Ticked {
        /// Total seconds recorded so far.
        accumulated_seconds: u64,
    },
    /// The call or event did not apply to the current state.
    Ignored,
}

/// Owns the recording session and drives it through its lifecycle.
pub struct RecordingController<D, P, U>
where
    D: CaptureDevice,
    P: PermissionProvider,
    U: UploadTransport,
{
    device: D,
    permissions: P,
    transport: Arc<U>,
    session: Session<D::Handle>,
    ticker: Option<DurationTicker>,
    next_span: u64,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
}

impl<D, P, U> RecordingController<D, P, U>
where
    D: CaptureDevice,
    P: PermissionProvider,
    U: UploadTransport,
{
    /// Create a controller with an Idle session.
    pub fn new(device: D, permissions: P, transport: U, multi_speaker: bool) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            device,
            permissions,
            transport: Arc::new(transport),
            session: Session::new(multi_speaker),
            ticker: None,
            next_span: 0,
            events_tx,
            events_rx,
        }
    }

    /// The session this controller owns.
    pub fn session(&self) -> &Session<D::Handle> {
        &self.session
    }

    /// Current state of the session.
    pub fn state(&self) -> RecordingState {
        self.session.state()
    }

    /// Whether the duration ticker is running.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Ask the permission provider for microphone access.
    pub fn request_permission(&mut self) -> PermissionStatus {
        self.permissions.request()
    }

    /// Wait for the next tick or upload completion.
    ///
    /// The controller keeps its own sender, so this only resolves to `None`
    /// if the controller is being torn down.
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        self.events_rx.recv().await
    }

    /// Start recording, or resume when paused.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` or `DeviceUnavailable`; the session keeps the
    /// state it had before the call.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn start(&mut self) -> CoreResult<Outcome> {
        match self.session.state() {
            RecordingState::Idle => {
                self.open_span()?;
                info!("Recording started");
                Ok(Outcome::Started)
            }
            RecordingState::Paused => self.resume(),
            state => {
                debug!(?state, "Start ignored");
                Ok(Outcome::Ignored)
            }
        }
    }

    /// Pause recording.
    ///
    /// The current span is closed into a file and the duration is frozen.
    ///
    /// # Errors
    ///
    /// Returns the device error if the span could not be finalized. The
    /// session is Paused either way, since the handle is already released.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn pause(&mut self) -> CoreResult<Outcome> {
        if self.session.state() != RecordingState::Recording {
            debug!(state = ?self.session.state(), "Pause ignored");
            return Ok(Outcome::Ignored);
        }

        if let Some(ticker) = self.ticker.take() {
            self.session.carry(ticker.until_next_tick());
        }

        if let Some(handle) = self.session.end_span(Phase::Paused) {
            let file = self.device.close(handle)?;
            self.session.push_span(file);
        }

        info!(
            accumulated_seconds = self.session.accumulated_seconds(),
            span_count = self.session.spans().len(),
            "Recording paused"
        );

        Ok(Outcome::Paused)
    }

    /// Resume a paused session in a new span without resetting duration.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` or `DeviceUnavailable`; the session stays Paused.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn resume(&mut self) -> CoreResult<Outcome> {
        if self.session.state() != RecordingState::Paused {
            debug!(state = ?self.session.state(), "Resume ignored");
            return Ok(Outcome::Ignored);
        }

        self.open_span()?;

        info!(
            accumulated_seconds = self.session.accumulated_seconds(),
            "Recording resumed"
        );

        Ok(Outcome::Resumed)
    }

    /// Finish capture and hand the recording to the upload transport.
    ///
    /// Works from Recording and from Paused. Returns
    /// [`Outcome::Uploading`] while the upload runs in the background, or
    /// [`Outcome::Completed`] with an error when the session could not even
    /// be handed over (span not finalized, no audio captured, transport not
    /// configured).
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn stop(&mut self) -> Outcome {
        match self.session.state() {
            RecordingState::Recording | RecordingState::Paused => {}
            state => {
                debug!(?state, "Stop ignored");
                return Outcome::Ignored;
            }
        }

        self.ticker = None;

        let metadata = UploadMetadata {
            duration_seconds: self.session.accumulated_seconds(),
            multi_speaker: self.session.multi_speaker(),
        };

        if let Some(handle) = self.session.end_span(Phase::Stopping) {
            match self.device.close(handle) {
                Ok(file) => self.session.push_span(file),
                Err(e) => return self.finish(metadata, Err(e)),
            }
        }

        if self.session.spans().is_empty() {
            return self.finish(
                metadata,
                Err(RecorderError::Artifact {
                    reason: "No audio was captured".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                }),
            );
        }

        if let Err(e) = self.transport.ready() {
            return self.finish(metadata, Err(e));
        }

        let session_id = self.session.id();
        let spans = self.session.take_spans();
        let transport = Arc::clone(&self.transport);
        let events_tx = self.events_tx.clone();

        info!(
            duration_seconds = metadata.duration_seconds,
            multi_speaker = metadata.multi_speaker,
            span_count = spans.len(),
            "Recording stopped, uploading"
        );

        tokio::spawn(async move {
            let result = deliver(transport, session_id, spans, metadata).await;
            let _ = events_tx.send(ControllerEvent::UploadFinished {
                session_id,
                metadata,
                result,
            });
        });

        Outcome::Uploading(metadata)
    }

    /// Discard the session without uploading.
    ///
    /// Teardown errors are logged and never block the reset. During an
    /// upload the session resets immediately and the upload's eventual
    /// result is ignored.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub fn cancel(&mut self) -> Outcome {
        let state = self.session.state();
        if state == RecordingState::Idle {
            debug!("Cancel ignored");
            return Outcome::Ignored;
        }

        self.ticker = None;

        let (handle, spans) = self.session.reset();
        self.release(handle, spans);

        info!(from = ?state, "Recording cancelled");

        Outcome::Cancelled
    }

    /// Flip the multi-speaker flag and return the new value.
    #[instrument(skip(self))]
    pub fn toggle_multi_speaker(&mut self) -> bool {
        let multi_speaker = self.session.toggle_multi_speaker();
        debug!(multi_speaker, "Multi-speaker toggled");
        multi_speaker
    }

    /// Apply a tick or upload completion.
    pub fn handle_event(&mut self, event: ControllerEvent) -> Outcome {
        match event {
            ControllerEvent::Tick { span } => {
                if self.session.tick(span) {
                    if let Some(ticker) = self.ticker.as_mut() {
                        ticker.advance();
                    }
                    Outcome::Ticked {
                        accumulated_seconds: self.session.accumulated_seconds(),
                    }
                } else {
                    debug!(span, "Stale tick ignored");
                    Outcome::Ignored
                }
            }
            ControllerEvent::UploadFinished {
                session_id,
                metadata,
                result,
            } => {
                if self.session.state() == RecordingState::Stopping
                    && self.session.id() == session_id
                {
                    self.finish(metadata, result)
                } else {
                    debug!(
                        session_id = %session_id,
                        succeeded = result.is_ok(),
                        "Upload result for a reset session ignored"
                    );
                    Outcome::Ignored
                }
            }
        }
    }

    #[track_caller]
    fn open_span(&mut self) -> CoreResult<()> {
        if !self.permissions.check().is_granted() {
            return Err(RecorderError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let handle = self.device.open()?;

        self.ticker = None;
        let span = self.next_span;
        self.next_span += 1;
        self.session.begin_span(handle, span);
        self.ticker = Some(DurationTicker::start(
            span,
            self.session.until_next_tick(),
            self.events_tx.clone(),
        ));

        Ok(())
    }

    /// Best-effort teardown of whatever a reset handed back.
    fn release(&mut self, handle: Option<D::Handle>, spans: Vec<FileReference>) {
        if let Some(handle) = handle {
            if let Err(e) = self.device.discard(handle) {
                debug!(error = ?e, "Capture teardown failed, ignoring");
            }
        }
        remove_spans(&spans);
    }

    fn finish(&mut self, metadata: UploadMetadata, result: CoreResult<()>) -> Outcome {
        let session_id = self.session.id();
        let (handle, spans) = self.session.reset();
        self.release(handle, spans);

        match &result {
            Ok(()) => info!(
                session_id = %session_id,
                duration_seconds = metadata.duration_seconds,
                "Session completed"
            ),
            Err(e) => warn!(session_id = %session_id, error = %e, "Session failed"),
        }

        Outcome::Completed { metadata, result }
    }
}

/// Join the spans, send the artifact and delete every local file.
async fn deliver<U: UploadTransport>(
    transport: Arc<U>,
    session_id: Uuid,
    spans: Vec<FileReference>,
    metadata: UploadMetadata,
) -> CoreResult<()> {
    let output = spans
        .first()
        .map(|f| f.path().with_file_name(format!("{}.wav", session_id)))
        .unwrap_or_else(PathBuf::new);

    let join_input = spans.clone();
    let joined = tokio::task::spawn_blocking(move || join_spans(&join_input, &output))
        .await
        .map_err(|e| RecorderError::Artifact {
            reason: format!("Span join task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
        .and_then(|joined| joined);

    let result = match joined {
        Ok(file) => {
            let result = transport.send(file.clone(), metadata).await;
            if !spans.contains(&file) {
                remove_spans([&file]);
            }
            result
        }
        Err(e) => Err(e),
    };

    remove_spans(&spans);

    result
}
