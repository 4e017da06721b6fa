use crate::{
    CoreResult, RecorderError,
    capture::{CaptureDevice, FileReference, SpanWriter, remove_spans},
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Grace period after dropping the stream for an in-flight callback to
/// observe the shutdown flag.
const STREAM_SETTLE_DELAY: Duration = Duration::from_millis(5);

/// cpal-backed microphone writing each span to a WAV file.
pub struct MicrophoneDevice {
    selected_device: Option<String>,
    recordings_dir: PathBuf,
}

/// One open microphone stream and the file its samples stream into.
pub struct CaptureSpan {
    stream: Stream,
    writer: SpanWriter,
    /// Signals the audio callback to stop sending. Set before the stream
    /// is dropped so no chunk arrives after `close` finalizes the file.
    shutdown: Arc<AtomicBool>,
    started_at: Instant,
}

impl MicrophoneDevice {
    /// Create a device that records from `selected_device` (or the host
    /// default) into `recordings_dir`.
    ///
    /// No audio hardware is touched here; the input device is resolved on
    /// every [`CaptureDevice::open`] so unplugging a microphone between
    /// spans surfaces as `DeviceUnavailable` instead of a stale handle.
    #[track_caller]
    #[instrument(skip(recordings_dir))]
    pub fn new(
        selected_device: Option<String>,
        recordings_dir: impl Into<PathBuf>,
    ) -> CoreResult<Self> {
        let recordings_dir = recordings_dir.into();

        std::fs::create_dir_all(&recordings_dir).map_err(|e| RecorderError::Artifact {
            reason: format!(
                "Failed to create recordings directory {:?}: {}",
                recordings_dir, e
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(recordings_dir = ?recordings_dir, "MicrophoneDevice initialized");

        Ok(Self {
            selected_device,
            recordings_dir,
        })
    }

    #[track_caller]
    fn input_device(&self) -> CoreResult<Device> {
        let host = cpal::default_host();

        if let Some(wanted) = &self.selected_device {
            let devices = host
                .input_devices()
                .map_err(|e| RecorderError::DeviceUnavailable {
                    reason: format!("Failed to enumerate input devices: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            #[allow(deprecated)]
            let found = devices
                .into_iter()
                .find(|d| d.name().map(|n| n == *wanted).unwrap_or(false));

            if let Some(device) = found {
                return Ok(device);
            }

            warn!(device = %wanted, "Selected input device not found, using default");
        }

        host.default_input_device()
            .ok_or_else(|| RecorderError::DeviceUnavailable {
                reason: "No microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Stop the stream and finalize the span file.
    fn stop_stream(span: CaptureSpan) -> (CoreResult<(FileReference, u64)>, Duration) {
        let CaptureSpan {
            stream,
            writer,
            shutdown,
            started_at,
        } = span;

        shutdown.store(true, Ordering::Release);
        drop(stream);
        std::thread::sleep(STREAM_SETTLE_DELAY);

        (writer.finish(), started_at.elapsed())
    }
}

impl CaptureDevice for MicrophoneDevice {
    type Handle = CaptureSpan;

    #[track_caller]
    #[instrument(skip(self))]
    fn open(&mut self) -> CoreResult<CaptureSpan> {
        let device = self.input_device()?;

        let config: StreamConfig = device
            .default_input_config()
            .map_err(|e| RecorderError::DeviceUnavailable {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .into();

        let path = self.recordings_dir.join(format!("{}.wav", Uuid::new_v4()));
        let writer = SpanWriter::create(&path, config.channels, config.sample_rate)?;
        let shutdown = Arc::new(AtomicBool::new(false));

        let chunks = writer.sender();
        let callback_shutdown = Arc::clone(&shutdown);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if callback_shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    chunks.send(data);
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| format!("Failed to build stream: {}", e))
            .and_then(|stream| {
                stream
                    .play()
                    .map(|()| stream)
                    .map_err(|e| format!("Failed to start stream: {}", e))
            });

        let stream = match stream {
            Ok(stream) => stream,
            Err(reason) => {
                if let Ok((file, _)) = writer.finish() {
                    remove_spans([&file]);
                }
                return Err(RecorderError::DeviceUnavailable {
                    reason,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        info!(
            path = ?path,
            sample_rate = config.sample_rate,
            channels = config.channels,
            "Capture span opened"
        );

        Ok(CaptureSpan {
            stream,
            writer,
            shutdown,
            started_at: Instant::now(),
        })
    }

    #[track_caller]
    #[instrument(skip(self, handle))]
    fn close(&mut self, handle: CaptureSpan) -> CoreResult<FileReference> {
        let (finished, elapsed) = Self::stop_stream(handle);
        let (file, sample_count) = finished?;

        info!(
            path = ?file.path(),
            sample_count,
            elapsed_ms = elapsed.as_millis(),
            "Capture span closed"
        );

        Ok(file)
    }

    #[instrument(skip(self, handle))]
    fn discard(&mut self, handle: CaptureSpan) -> CoreResult<()> {
        let (finished, elapsed) = Self::stop_stream(handle);
        let (file, sample_count) = finished?;
        remove_spans([&file]);

        debug!(
            sample_count,
            elapsed_ms = elapsed.as_millis(),
            "Capture span discarded"
        );

        Ok(())
    }
}
