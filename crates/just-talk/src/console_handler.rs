//! Console command handler.
//!
//! Reads line commands from stdin and forwards them to the main application
//! as [`AppCommand`]s over an async channel.

use crate::{AppCommand, AppError, AppResult};

use std::{
    io::{BufRead, ErrorKind},
    panic::Location,
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Printed at startup and for unknown input.
pub(crate) const HELP: &str = "\
Commands:
  start, r     start recording (resumes when paused)
  pause, p     pause recording
  resume       resume a paused recording
  stop, s      stop and send the recording
  cancel, c    discard the recording
  multi, m     toggle multi-speaker
  grant        allow microphone access
  revoke       withdraw microphone access
  status       show state and elapsed time
  quit, q      exit";

/// Turns stdin lines into application commands.
pub struct ConsoleHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ConsoleHandler {
    /// Create a handler sending to `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Parse one input line. Case and surrounding whitespace are ignored.
    pub fn parse(line: &str) -> Option<AppCommand> {
        let command = match line.trim().to_ascii_lowercase().as_str() {
            "start" | "r" => AppCommand::Start,
            "pause" | "p" => AppCommand::Pause,
            "resume" => AppCommand::Resume,
            "stop" | "s" => AppCommand::Stop,
            "cancel" | "c" => AppCommand::Cancel,
            "multi" | "m" => AppCommand::ToggleMultiSpeaker,
            "grant" => AppCommand::GrantPermission,
            "revoke" => AppCommand::RevokePermission,
            "status" => AppCommand::Status,
            "quit" | "q" | "exit" => AppCommand::Shutdown,
            _ => return None,
        };

        Some(command)
    }

    /// Run the console loop until shutdown, `quit` or end of input.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let (line_tx, mut line_rx) = mpsc::channel::<String>(32);

        // Stdin has no async read in our stack; one blocking task forwards
        // lines.
        let handle = tokio::task::spawn_blocking(move || {
            forward_lines(std::io::stdin().lock(), &line_tx);
        });

        println!("{}", HELP);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Console handler shutting down");
                    break;
                }
                line = line_rx.recv() => {
                    let Some(line) = line else {
                        info!("End of input, requesting shutdown");
                        self.send(AppCommand::Shutdown).await?;
                        break;
                    };

                    match Self::parse(&line) {
                        Some(command) => {
                            self.send(command).await?;
                            if command == AppCommand::Shutdown {
                                break;
                            }
                        }
                        None if line.trim().is_empty() => {}
                        None => {
                            debug!(input = %line.trim(), "Unknown command");
                            println!("{}", HELP);
                        }
                    }
                }
            }
        }

        drop(line_rx);

        // The blocking task may be parked in read_line until the next line
        // arrives; the runtime is shut down in the background on exit.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Stdin forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Stdin forwarder task panicked"),
            Err(_) => debug!(
                "Stdin forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Forward lines from `reader` until EOF, a read error, or the receiver
/// going away. Lines that are not valid UTF-8 are skipped.
pub(crate) fn forward_lines(reader: impl BufRead, line_tx: &mpsc::Sender<String>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!(error = %e, "Skipping input line that is not valid UTF-8");
                continue;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stdin, no more commands");
                break;
            }
        };

        if line_tx.blocking_send(line).is_err() {
            break;
        }
    }
}
