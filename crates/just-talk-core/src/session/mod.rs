mod controller;
mod recording_state;
#[allow(clippy::module_inception)]
mod session;
mod ticker;

pub(crate) use {
    session::Phase,
    ticker::{DurationTicker, TICK_INTERVAL},
};

pub use {
    controller::{ControllerEvent, Outcome, RecordingController},
    recording_state::RecordingState,
    session::Session,
};
