use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::capture::CaptureError;

/// Plays `samples` (mono, at `sample_rate`) on the default output device.
/// Used only by `--play` to let a human follow along with file-mode
/// streaming; has no bearing on transcription correctness.
pub fn play(samples: Arc<Vec<f32>>, sample_rate: u32) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(CaptureError::NoOutputDevice)?;

    let mut config: cpal::StreamConfig = device.default_output_config()?.into();
    config.sample_rate = cpal::SampleRate(sample_rate);
    config.channels = 1;

    let cursor = Mutex::new(0usize);
    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _| {
            let mut cursor = cursor.lock().expect("playback cursor lock poisoned");
            for out in data.iter_mut() {
                *out = samples.get(*cursor).copied().unwrap_or(0.0);
                *cursor += 1;
            }
        },
        |err| tracing::error!(%err, "output stream error"),
        None,
    )?;
    stream.play()?;
    Ok(stream)
}
