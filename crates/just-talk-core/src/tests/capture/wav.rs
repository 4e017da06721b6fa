use crate::{
    FileReference, RecorderError,
    capture::{SpanWriter, join_spans, remove_spans, write_span},
};

use std::thread;

use hound::WavReader;

/// WHAT: Spans are concatenated in order into one artifact
/// WHY: A paused and resumed session uploads as a single recording
#[test]
#[allow(clippy::unwrap_used)]
fn given_two_spans_when_joining_then_samples_concatenated_in_order() {
    // Given: Two mono spans with distinct levels
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.wav");
    let second = dir.path().join("second.wav");
    write_span(&first, &[0.5; 100], 1, 16_000).unwrap();
    write_span(&second, &[-0.5; 50], 1, 16_000).unwrap();
    let spans = [FileReference::new(&first), FileReference::new(&second)];

    // When: Joining
    let output = dir.path().join("joined.wav");
    let joined = join_spans(&spans, &output).unwrap();

    // Then: 150 samples, first span first
    assert_eq!(joined.path(), output.as_path());
    let mut reader = WavReader::open(&output).unwrap();
    assert_eq!(reader.len(), 150);
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert!(samples[..100].iter().all(|&s| s > 0));
    assert!(samples[100..].iter().all(|&s| s < 0));
}

/// WHAT: A single span is forwarded without copying
/// WHY: The common case needs no extra file
#[test]
#[allow(clippy::unwrap_used)]
fn given_single_span_when_joining_then_same_reference_returned() {
    // Given: One span
    let dir = tempfile::tempdir().unwrap();
    let only = dir.path().join("only.wav");
    write_span(&only, &[0.1; 10], 1, 16_000).unwrap();
    let spans = [FileReference::new(&only)];

    // When: Joining
    let output = dir.path().join("joined.wav");
    let joined = join_spans(&spans, &output).unwrap();

    // Then: The span itself is returned and no output file is written
    assert_eq!(joined, spans[0]);
    assert!(!output.exists());
}

/// WHAT: Spans with different formats are rejected
/// WHY: Samples of different rates cannot be concatenated
#[test]
#[allow(clippy::unwrap_used)]
fn given_spans_with_different_sample_rates_when_joining_then_artifact_error() {
    // Given: Spans recorded at 16kHz and 48kHz
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.wav");
    let second = dir.path().join("second.wav");
    write_span(&first, &[0.0; 10], 1, 16_000).unwrap();
    write_span(&second, &[0.0; 10], 1, 48_000).unwrap();
    let spans = [FileReference::new(&first), FileReference::new(&second)];

    // When: Joining
    let result = join_spans(&spans, &dir.path().join("joined.wav"));

    // Then: Artifact error
    assert!(matches!(result, Err(RecorderError::Artifact { .. })));
}

/// WHAT: Joining nothing is an error
/// WHY: A session without spans has nothing to upload
#[test]
fn given_no_spans_when_joining_then_artifact_error() {
    // Given/When: Joining an empty list
    let result = join_spans(&[], std::path::Path::new("unused.wav"));

    // Then: Artifact error
    assert!(matches!(result, Err(RecorderError::Artifact { .. })));
}

/// WHAT: Samples outside [-1, 1] are clamped
/// WHY: Overdriven input must not wrap around to the opposite sign
#[test]
#[allow(clippy::unwrap_used)]
fn given_out_of_range_samples_when_writing_then_clamped() {
    // Given: Samples beyond full scale
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loud.wav");

    // When: Writing
    write_span(&path, &[2.0, -2.0], 1, 16_000).unwrap();

    // Then: Full-scale values with the original sign
    let mut reader = WavReader::open(&path).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
}

/// WHAT: Removing spans tolerates files that are already gone
/// WHY: Cleanup runs after cancel and after upload, possibly twice
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_and_present_files_when_removing_then_present_file_deleted() {
    // Given: One real file and one that never existed
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("present.wav");
    write_span(&present, &[0.0; 4], 1, 16_000).unwrap();
    let files = [
        FileReference::new(&present),
        FileReference::new(dir.path().join("missing.wav")),
    ];

    // When: Removing
    remove_spans(&files);

    // Then: The real file is gone
    assert!(!present.exists());
}

/// WHAT: Chunks streamed from another thread land on disk in order
/// WHY: The audio callback writes through the span writer instead of a buffer
#[test]
#[allow(clippy::unwrap_used)]
fn given_chunks_streamed_from_callback_thread_when_finishing_then_all_samples_written_in_order() {
    // Given: A stereo span writer and a sender on another thread
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("streamed.wav");
    let writer = SpanWriter::create(&path, 2, 48_000).unwrap();
    let sender = writer.sender();

    // When: Streaming 100 chunks of rising level, then finishing
    thread::spawn(move || {
        for i in 0..100 {
            sender.send(&[i as f32 / 100.0; 64]);
        }
    })
    .join()
    .unwrap();
    let (file, written) = writer.finish().unwrap();

    // Then: Every sample is there, in order, in the expected format
    assert_eq!(file.path(), path.as_path());
    assert_eq!(written, 6_400);
    let mut reader = WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.len(), 6_400);
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
}

/// WHAT: Finishing does not wait for callbacks that still hold a sender
/// WHY: A stream torn down late must not hang pause or stop
#[test]
#[allow(clippy::unwrap_used)]
fn given_sender_still_alive_when_finishing_then_file_finalized_and_late_chunks_ignored() {
    // Given: A writer whose sender outlives it
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.wav");
    let writer = SpanWriter::create(&path, 1, 16_000).unwrap();
    let sender = writer.sender();
    sender.send(&[0.5; 10]);

    // When: Finishing, then sending more
    let (_, written) = writer.finish().unwrap();
    sender.send(&[0.5; 10]);

    // Then: Only the samples queued before finish were written
    assert_eq!(written, 10);
    assert_eq!(WavReader::open(&path).unwrap().len(), 10);
}
