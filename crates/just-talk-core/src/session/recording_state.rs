/// Observable state of the recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Nothing captured, nothing pending.
    Idle,
    /// A capture span is open and the duration ticker is running.
    Recording,
    /// The last span is finalized; duration is frozen.
    Paused,
    /// Capture is finished and the upload is in flight.
    Stopping,
}
