use crate::{
    FileReference, RecordingState, Session,
    session::{Phase, TICK_INTERVAL},
};

use std::time::Duration;

/// WHAT: Ticks only count for the span that is recording
/// WHY: Duration must freeze outside Recording
#[test]
fn given_session_when_ticking_outside_current_span_then_duration_unchanged() {
    // Given: A fresh session
    let mut session: Session<()> = Session::new(false);

    // When: Ticking while Idle, then while recording span 3
    let idle_tick = session.tick(3);
    session.begin_span((), 3);
    let live_tick = session.tick(3);
    let stale_tick = session.tick(2);

    // Then: Only the live tick counted
    assert!(!idle_tick);
    assert!(live_tick);
    assert!(!stale_tick);
    assert_eq!(session.accumulated_seconds(), 1);
}

/// WHAT: The handle exists exactly while Recording
/// WHY: Leaving Recording must always hand the handle back for release
#[test]
fn given_recording_session_when_ending_span_then_handle_returned_once() {
    // Given: A recording session
    let mut session: Session<u8> = Session::new(false);
    session.begin_span(7, 0);
    assert!(session.has_capture_handle());
    assert_eq!(session.state(), RecordingState::Recording);

    // When: Pausing twice
    let first = session.end_span(Phase::Paused);
    let second = session.end_span(Phase::Paused);

    // Then: The handle comes back once and the session is Paused
    assert_eq!(first, Some(7));
    assert_eq!(second, None);
    assert!(!session.has_capture_handle());
    assert_eq!(session.state(), RecordingState::Paused);
}

/// WHAT: Reset clears duration and spans and renews the id
/// WHY: Every completed or cancelled session starts over from zero
#[test]
fn given_used_session_when_reset_then_idle_zero_and_new_id() {
    // Given: A session with a span, a tick and an open handle
    let mut session: Session<u8> = Session::new(true);
    let id = session.id();
    session.push_span(FileReference::new("/tmp/span-1.wav"));
    session.begin_span(1, 0);
    session.tick(0);
    session.carry(Duration::from_millis(300));

    // When: Resetting
    let (handle, spans) = session.reset();

    // Then: Everything handed back, state cleared, flag kept
    assert_eq!(handle, Some(1));
    assert_eq!(spans.len(), 1);
    assert_eq!(session.state(), RecordingState::Idle);
    assert_eq!(session.accumulated_seconds(), 0);
    assert_eq!(session.until_next_tick(), TICK_INTERVAL);
    assert!(session.spans().is_empty());
    assert_ne!(session.id(), id);
    assert!(session.multi_speaker());
}
