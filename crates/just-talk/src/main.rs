//! Just Talk: record voice notes from the console and send them to a webhook.

mod app;
mod app_command;
mod config;
mod console_handler;
mod error;
mod notice;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    console_handler::ConsoleHandler,
    error::{AppError, Result as AppResult},
    notice::{Action, Notice, format_elapsed},
};

use crate::config::Config;

use std::time::Duration;

use just_talk_core::{MicrophoneDevice, PermissionGate, RecordingController, WebhookTransport};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

/// Extra time granted to a pending upload on shutdown, on top of its timeout.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("just_talk=debug,just_talk_core=debug")
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        error!(error = ?e, "Just Talk failed to start");
        std::process::exit(1);
    }
}

fn run() -> AppResult<()> {
    let config = Config::load()?;
    let endpoint = config.resolve_endpoint()?;
    let recordings_dir = config.recordings_dir()?;

    let device = MicrophoneDevice::new(config.audio.selected_device.clone(), recordings_dir)?;
    let transport = WebhookTransport::new(endpoint, config.upload_timeout())?;
    let permission = PermissionGate::new(config.audio.microphone_permission);
    let controller = RecordingController::new(
        device,
        permission.clone(),
        transport,
        config.behavior.multi_speaker,
    );

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let console = ConsoleHandler::new(command_tx);
    let app = App {
        controller,
        permission,
        command_rx,
        shutdown_tx,
        drain_timeout: config.upload_timeout() + DRAIN_GRACE,
    };

    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        tokio::join!(
            async {
                if let Err(e) = console.run(shutdown_rx).await {
                    error!(error = ?e, "Console handler error");
                }
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );
    });

    // The stdin forwarder may still be parked in a blocking read.
    rt.shutdown_background();
    info!("Exited");

    Ok(())
}
