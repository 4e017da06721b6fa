use crate::{CaptureDevice, FileReference, MicrophoneDevice, RecorderError};

use std::time::Duration;

/// WHAT: Creating the device prepares the recordings directory
/// WHY: Span files need somewhere to land before the first close
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_recordings_dir_when_creating_device_then_dir_created() {
    // Given: A path that does not exist yet
    let root = tempfile::tempdir().unwrap();
    let recordings = root.path().join("nested").join("recordings");

    // When: Creating the device
    let result = MicrophoneDevice::new(None, &recordings);

    // Then: Succeeds without touching audio hardware, directory exists
    assert!(result.is_ok());
    assert!(recordings.is_dir());
}

/// WHAT: File name is taken from the path
/// WHY: The webhook receives the span's own file name
#[test]
fn given_paths_when_naming_upload_then_file_name_or_fallback() {
    // Given/When/Then: A normal path and a bare root
    assert_eq!(
        FileReference::new("/tmp/recordings/abc.wav").file_name(),
        "abc.wav"
    );
    assert_eq!(FileReference::new("/").file_name(), "recording.wav");
}

/// WHAT: A named device that does not exist is reported as unavailable
/// WHY: A stale device name in the config must not crash the recorder
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_unknown_device_name_when_opening_then_device_unavailable() {
    // Given: A device configured with a name no host will have
    let root = tempfile::tempdir().unwrap();
    let mut device =
        MicrophoneDevice::new(Some("no-such-microphone-0000".to_string()), root.path()).unwrap();

    // When: Opening a span
    let result = device.open();

    // Then: DeviceUnavailable
    assert!(matches!(
        result,
        Err(RecorderError::DeviceUnavailable { .. })
    ));
}

/// WHAT: A real span records into a WAV file in the recordings directory
/// WHY: Verifies the capture path end to end on machines with a microphone
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_default_microphone_when_recording_briefly_then_span_file_written() {
    // Given: The default input device
    let root = tempfile::tempdir().unwrap();
    let mut device = MicrophoneDevice::new(None, root.path()).unwrap();

    // When: Recording for a moment and closing
    let span = device.open().unwrap();
    std::thread::sleep(Duration::from_millis(300));
    let file = device.close(span).unwrap();

    // Then: A readable WAV inside the recordings directory
    assert!(file.path().starts_with(root.path()));
    let reader = hound::WavReader::open(file.path()).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 16);
}
