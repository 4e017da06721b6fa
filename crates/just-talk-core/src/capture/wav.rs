use crate::{CoreResult, RecorderError, capture::FileReference};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::mpsc,
    thread::JoinHandle,
};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, instrument, warn};

/// MIME type of every span and joined artifact.
pub(crate) const SPAN_MIME_TYPE: &str = "audio/wav";

#[track_caller]
fn artifact_error(reason: String) -> RecorderError {
    RecorderError::Artifact {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Longest span kept, in samples: 3 hours of 48kHz stereo.
///
/// 16-bit samples make this ~2GB on disk, inside the 4GB WAV limit. Later
/// samples are dropped so the span keeps its beginning.
pub(crate) const MAX_SPAN_SAMPLES: u64 = 48_000 * 2 * 60 * 60 * 3;

fn to_pcm(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

enum WriterMessage {
    Samples(Vec<f32>),
    Finish,
}

/// Cloneable handle the audio callback pushes samples through.
#[derive(Clone)]
pub(crate) struct SampleSender(mpsc::Sender<WriterMessage>);

impl SampleSender {
    /// Queue a chunk for writing. Chunks sent after the writer finished
    /// are discarded.
    pub(crate) fn send(&self, samples: &[f32]) {
        let _ = self.0.send(WriterMessage::Samples(samples.to_vec()));
    }
}

/// Streams interleaved f32 chunks into a 16-bit PCM WAV file.
///
/// Encoding and disk writes happen on a dedicated thread, so memory holds
/// only the chunks not yet written, whatever the span length.
pub(crate) struct SpanWriter {
    path: PathBuf,
    chunks: mpsc::Sender<WriterMessage>,
    worker: JoinHandle<CoreResult<u64>>,
}

impl SpanWriter {
    /// Create the file and start the writer thread.
    #[track_caller]
    pub(crate) fn create(path: &Path, channels: u16, sample_rate: u32) -> CoreResult<Self> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)
            .map_err(|e| artifact_error(format!("Failed to create {:?}: {}", path, e)))?;

        let (chunks, rx) = mpsc::channel::<WriterMessage>();
        let worker_path = path.to_path_buf();

        let worker = std::thread::Builder::new()
            .name("span-writer".to_string())
            .spawn(move || -> CoreResult<u64> {
                let mut written = 0u64;
                let mut dropped = 0u64;

                // Stops at Finish even if a callback still holds a sender.
                for message in rx {
                    let WriterMessage::Samples(chunk) = message else {
                        break;
                    };
                    for sample in chunk {
                        if written >= MAX_SPAN_SAMPLES {
                            dropped += 1;
                            continue;
                        }
                        writer.write_sample(to_pcm(sample)).map_err(|e| {
                            artifact_error(format!("Failed to write {:?}: {}", worker_path, e))
                        })?;
                        written += 1;
                    }
                }

                if dropped > 0 {
                    warn!(
                        max_samples = MAX_SPAN_SAMPLES,
                        dropped, "Span hit the length cap, trailing audio was dropped"
                    );
                }

                writer.finalize().map_err(|e| {
                    artifact_error(format!("Failed to finalize {:?}: {}", worker_path, e))
                })?;

                Ok(written)
            })
            .map_err(|e| artifact_error(format!("Failed to spawn span writer: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            chunks,
            worker,
        })
    }

    /// A sender for the audio callback.
    pub(crate) fn sender(&self) -> SampleSender {
        SampleSender(self.chunks.clone())
    }

    /// Write everything queued so far and finalize the file. Returns the
    /// file and the number of samples written.
    #[track_caller]
    pub(crate) fn finish(self) -> CoreResult<(FileReference, u64)> {
        let Self {
            path,
            chunks,
            worker,
        } = self;
        let _ = chunks.send(WriterMessage::Finish);

        let written = worker
            .join()
            .map_err(|_| artifact_error(format!("Span writer for {:?} panicked", path)))??;

        Ok((FileReference::new(path), written))
    }
}

/// Write interleaved f32 samples as a 16-bit PCM WAV file in one go.
#[cfg(test)]
pub(crate) fn write_span(
    path: &Path,
    samples: &[f32],
    channels: u16,
    sample_rate: u32,
) -> CoreResult<()> {
    let writer = SpanWriter::create(path, channels, sample_rate)?;
    writer.sender().send(samples);
    writer.finish().map(|_| ())
}

/// Concatenate the spans of one session into a single WAV at `output`.
///
/// A single span is returned unchanged. All spans must share the channel
/// count, sample rate and sample width of the first one.
#[instrument(skip(spans), fields(span_count = spans.len()))]
pub(crate) fn join_spans(spans: &[FileReference], output: &Path) -> CoreResult<FileReference> {
    match spans {
        [] => return Err(artifact_error("No spans to upload".to_string())),
        [only] => return Ok(only.clone()),
        _ => {}
    }

    let mut readers = Vec::with_capacity(spans.len());
    for span in spans {
        let reader = WavReader::open(span.path())
            .map_err(|e| artifact_error(format!("Failed to open {:?}: {}", span.path(), e)))?;
        readers.push((span.path(), reader));
    }

    let spec = readers[0].1.spec();
    if let Some((path, reader)) = readers.iter().find(|(_, r)| r.spec() != spec) {
        return Err(artifact_error(format!(
            "Span {:?} has format {:?}, expected {:?}",
            path,
            reader.spec(),
            spec
        )));
    }

    let mut writer = WavWriter::create(output, spec)
        .map_err(|e| artifact_error(format!("Failed to create {:?}: {}", output, e)))?;
    let mut total_samples = 0usize;

    for (path, mut reader) in readers {
        for sample in reader.samples::<i16>() {
            let sample =
                sample.map_err(|e| artifact_error(format!("Failed to read {:?}: {}", path, e)))?;
            writer
                .write_sample(sample)
                .map_err(|e| artifact_error(format!("Failed to write {:?}: {}", output, e)))?;
            total_samples += 1;
        }
    }

    writer
        .finalize()
        .map_err(|e| artifact_error(format!("Failed to finalize {:?}: {}", output, e)))?;

    debug!(output = ?output, total_samples, "Spans joined");

    Ok(FileReference::new(output))
}

/// Best-effort removal of span files; failures are only logged.
pub(crate) fn remove_spans<'a>(files: impl IntoIterator<Item = &'a FileReference>) {
    for file in files {
        match std::fs::remove_file(file.path()) {
            Ok(()) => debug!(path = ?file.path(), "Removed span file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = ?file.path(), error = %e, "Failed to remove span file"),
        }
    }
}
