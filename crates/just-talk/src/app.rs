use crate::{Action, AppCommand, AppResult, Notice, format_elapsed, notice::status_line};

use std::time::Duration;

use just_talk_core::{
    CoreResult, MicrophoneDevice, Outcome, PermissionGate, RecordingController, RecordingState,
    WebhookTransport,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

pub(crate) type Controller = RecordingController<MicrophoneDevice, PermissionGate, WebhookTransport>;

/// Main application state.
///
/// Owns the recording controller and is the only place its methods are
/// called from, so commands and controller events never interleave.
pub struct App {
    pub(crate) controller: Controller,
    pub(crate) permission: PermissionGate,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    /// How long shutdown waits for an in-flight upload.
    pub(crate) drain_timeout: Duration,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Just Talk starting");

        if !self.controller.request_permission().is_granted() {
            Notice::permission_required().show();
        }

        loop {
            tokio::select! {
                Some(command) = self.command_rx.recv() => {
                    if command == AppCommand::Shutdown {
                        info!("Shutdown requested");
                        break;
                    }
                    self.handle_command(command);
                }

                Some(event) = self.controller.next_event() => {
                    let outcome = self.controller.handle_event(event);
                    present(&outcome);
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.shutdown().await;

        let _ = self.shutdown_tx.send(true);
        info!("Just Talk shut down successfully");

        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) fn handle_command(&mut self, command: AppCommand) {
        let outcome = match command {
            AppCommand::Start => self.report(Action::Start, |c| c.start()),
            AppCommand::Pause => self.report(Action::Pause, |c| c.pause()),
            AppCommand::Resume => self.report(Action::Resume, |c| c.resume()),
            AppCommand::Stop => Some(self.controller.stop()),
            AppCommand::Cancel => Some(self.controller.cancel()),
            AppCommand::ToggleMultiSpeaker => {
                let on = self.controller.toggle_multi_speaker();
                println!("Multi-speaker: {}", if on { "on" } else { "off" });
                None
            }
            AppCommand::GrantPermission => {
                self.permission.grant();
                println!("Microphone access granted");
                None
            }
            AppCommand::RevokePermission => {
                self.permission.revoke();
                println!("Microphone access revoked");
                None
            }
            AppCommand::Status => {
                let session = self.controller.session();
                println!(
                    "{}",
                    status_line(
                        session.state(),
                        session.accumulated_seconds(),
                        session.multi_speaker()
                    )
                );
                None
            }
            AppCommand::Shutdown => None,
        };

        match outcome {
            Some(Outcome::Ignored) => {
                println!("Nothing to do while {:?}", self.controller.state());
            }
            Some(outcome) => present(&outcome),
            None => {}
        }
    }

    /// Run a fallible controller call, turning an error into a notice.
    fn report(
        &mut self,
        action: Action,
        call: impl FnOnce(&mut Controller) -> CoreResult<Outcome>,
    ) -> Option<Outcome> {
        match call(&mut self.controller) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(?action, error = ?e, "Action failed");
                Notice::for_failure(action, &e).show();
                None
            }
        }
    }

    /// Let an in-flight upload finish; discard anything still recording.
    async fn shutdown(&mut self) {
        match self.controller.state() {
            RecordingState::Idle => {}
            RecordingState::Recording | RecordingState::Paused => {
                warn!("Discarding unsent recording on shutdown");
                self.controller.cancel();
            }
            RecordingState::Stopping => {
                info!("Waiting for upload to finish");
                let drained = tokio::time::timeout(self.drain_timeout, async {
                    while let Some(event) = self.controller.next_event().await {
                        let outcome = self.controller.handle_event(event);
                        present(&outcome);
                        if self.controller.state() != RecordingState::Stopping {
                            break;
                        }
                    }
                })
                .await;

                if drained.is_err() {
                    warn!("Upload did not finish in time, abandoning it");
                    self.controller.cancel();
                }
            }
        }
    }
}

fn present(outcome: &Outcome) {
    match outcome {
        Outcome::Started => println!("Recording..."),
        Outcome::Resumed => println!("Recording resumed"),
        Outcome::Paused => println!("Paused"),
        Outcome::Uploading(metadata) => println!(
            "Sending {} recording...",
            format_elapsed(metadata.duration_seconds)
        ),
        Outcome::Cancelled => println!("Recording cancelled"),
        Outcome::Ticked {
            accumulated_seconds,
        } => debug!(elapsed = %format_elapsed(*accumulated_seconds), "Recording"),
        Outcome::Completed { .. } => {
            if let Some(notice) = Notice::for_outcome(outcome) {
                notice.show();
            }
        }
        Outcome::Ignored => {}
    }
}
