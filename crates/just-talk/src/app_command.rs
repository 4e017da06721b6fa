/// Commands sent from the console handler to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start recording, or resume a paused session.
    Start,
    /// Pause the current recording.
    Pause,
    /// Resume a paused recording.
    Resume,
    /// Stop and send the recording.
    Stop,
    /// Discard the current recording.
    Cancel,
    /// Flip the multi-speaker flag.
    ToggleMultiSpeaker,
    /// Allow microphone capture.
    GrantPermission,
    /// Withdraw microphone capture permission.
    RevokePermission,
    /// Print the current state and elapsed time.
    Status,
    /// Request application shutdown.
    Shutdown,
}
