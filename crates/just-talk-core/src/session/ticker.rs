use crate::session::ControllerEvent;

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, interval_at},
};
use tracing::debug;

/// Interval between duration ticks.
pub(crate) const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// One-second ticker for a single capture span.
///
/// Dropping the ticker aborts its task. Ticks carry the span number so a
/// tick that was already queued when the span ended can be told apart
/// from a live one.
pub(crate) struct DurationTicker {
    span: u64,
    /// When the next counted tick is due.
    next_due: Instant,
    handle: JoinHandle<()>,
}

impl DurationTicker {
    /// Spawn a ticker whose first tick fires after `first_tick`, then
    /// every [`TICK_INTERVAL`].
    ///
    /// Passing the remainder of an interrupted second keeps the phase
    /// across pause and resume.
    pub(crate) fn start(
        span: u64,
        first_tick: Duration,
        events_tx: mpsc::UnboundedSender<ControllerEvent>,
    ) -> Self {
        let next_due = Instant::now() + first_tick;

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(next_due, TICK_INTERVAL);
            loop {
                interval.tick().await;
                if events_tx.send(ControllerEvent::Tick { span }).is_err() {
                    break;
                }
            }
        });

        debug!(span, first_tick_ms = first_tick.as_millis(), "Duration ticker started");

        Self {
            span,
            next_due,
            handle,
        }
    }

    /// Record that the due tick was counted.
    pub(crate) fn advance(&mut self) {
        self.next_due += TICK_INTERVAL;
    }

    /// Time still needed to complete the current second, zero when a tick
    /// is overdue.
    pub(crate) fn until_next_tick(&self) -> Duration {
        self.next_due.saturating_duration_since(Instant::now())
    }
}

impl Drop for DurationTicker {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(span = self.span, "Duration ticker stopped");
    }
}
