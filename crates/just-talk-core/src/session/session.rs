use crate::{
    capture::FileReference,
    session::{RecordingState, TICK_INTERVAL},
};

use std::time::Duration;

use uuid::Uuid;

pub(crate) enum Phase<H> {
    Idle,
    Recording { handle: H, span: u64 },
    Paused,
    Stopping,
}

/// The single recording session of a running application.
///
/// The capture handle lives inside the `Recording` phase, so a handle
/// exists exactly when the session is recording.
pub struct Session<H> {
    id: Uuid,
    phase: Phase<H>,
    accumulated_seconds: u64,
    /// Recording time left before the next whole second, carried from the
    /// span that was last paused.
    until_next_tick: Duration,
    multi_speaker: bool,
    spans: Vec<FileReference>,
}

impl<H> Session<H> {
    pub(crate) fn new(multi_speaker: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Idle,
            accumulated_seconds: 0,
            until_next_tick: TICK_INTERVAL,
            multi_speaker,
            spans: Vec::new(),
        }
    }

    /// Correlation id, renewed on every reset.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> RecordingState {
        match self.phase {
            Phase::Idle => RecordingState::Idle,
            Phase::Recording { .. } => RecordingState::Recording,
            Phase::Paused => RecordingState::Paused,
            Phase::Stopping => RecordingState::Stopping,
        }
    }

    /// Whole seconds spent recording so far.
    pub fn accumulated_seconds(&self) -> u64 {
        self.accumulated_seconds
    }

    /// Multi-speaker flag sent with the next upload.
    pub fn multi_speaker(&self) -> bool {
        self.multi_speaker
    }

    /// Whether a capture handle is currently held.
    pub fn has_capture_handle(&self) -> bool {
        matches!(self.phase, Phase::Recording { .. })
    }

    /// Finalized spans waiting for stop or cancel.
    pub fn spans(&self) -> &[FileReference] {
        &self.spans
    }

    pub(crate) fn current_span(&self) -> Option<u64> {
        match self.phase {
            Phase::Recording { span, .. } => Some(span),
            _ => None,
        }
    }

    pub(crate) fn until_next_tick(&self) -> Duration {
        self.until_next_tick
    }

    /// Remember how far the interrupted second had got.
    pub(crate) fn carry(&mut self, until_next_tick: Duration) {
        self.until_next_tick = until_next_tick.min(TICK_INTERVAL);
    }

    pub(crate) fn toggle_multi_speaker(&mut self) -> bool {
        self.multi_speaker = !self.multi_speaker;
        self.multi_speaker
    }

    /// Enter `Recording` with a fresh handle. Only valid from Idle or
    /// Paused, where no handle is held.
    pub(crate) fn begin_span(&mut self, handle: H, span: u64) {
        self.phase = Phase::Recording { handle, span };
    }

    /// Leave `Recording` for `next`, handing back the capture handle.
    pub(crate) fn end_span(&mut self, next: Phase<H>) -> Option<H> {
        match std::mem::replace(&mut self.phase, next) {
            Phase::Recording { handle, .. } => Some(handle),
            _ => None,
        }
    }

    pub(crate) fn push_span(&mut self, file: FileReference) {
        self.spans.push(file);
    }

    pub(crate) fn take_spans(&mut self) -> Vec<FileReference> {
        std::mem::take(&mut self.spans)
    }

    /// Count one second if `span` is the one currently recording.
    pub(crate) fn tick(&mut self, span: u64) -> bool {
        if self.current_span() == Some(span) {
            self.accumulated_seconds += 1;
            true
        } else {
            false
        }
    }

    /// Back to `Idle` with zero duration and a new id. Returns the handle
    /// and spans that were still held so the caller can release them.
    pub(crate) fn reset(&mut self) -> (Option<H>, Vec<FileReference>) {
        let handle = self.end_span(Phase::Idle);
        let spans = self.take_spans();
        self.accumulated_seconds = 0;
        self.until_next_tick = TICK_INTERVAL;
        self.id = Uuid::new_v4();
        (handle, spans)
    }
}
