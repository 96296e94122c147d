use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::error;

use super::buffer::AudioBuffer;

/// Errors raised while configuring or opening the default input device.
///
/// Device enumeration and stream construction are an external collaborator
/// of this crate: failures here are reported and are fatal to the session,
/// but their internals (driver quirks, device listing) are not modelled.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no default input device available")]
    NoInputDevice,
    #[error("no default output device available")]
    NoOutputDevice,
    #[error("failed to read default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Opens the system default input device and appends captured audio, down-
/// mixed to mono (first channel), into `buffer`. The returned `Stream` must
/// be kept alive for the duration of the session; dropping it stops
/// capture.
pub fn start_capture(
    channels: u16,
    sample_rate: u32,
    block_size: usize,
    buffer: Arc<AudioBuffer>,
) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(CaptureError::NoInputDevice)?;

    let mut config: cpal::StreamConfig = device.default_input_config()?.into();
    config.channels = channels;
    config.sample_rate = cpal::SampleRate(sample_rate);
    config.buffer_size = cpal::BufferSize::Fixed(block_size as u32);

    let channels = channels as usize;
    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _info: &cpal::InputCallbackInfo| {
            // This closure runs on the audio driver's real-time thread: no
            // allocation beyond the one scratch Vec, no blocking, no network.
            let mono: Vec<f32> = data.chunks(channels.max(1)).map(|frame| frame[0]).collect();
            buffer.append(&mono);
        },
        move |err| error!(%err, "input stream error"),
        None,
    )?;

    stream.play()?;
    Ok(stream)
}
