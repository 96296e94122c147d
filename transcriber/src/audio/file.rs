use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::buffer::AudioBuffer;

#[derive(Debug, thiserror::Error)]
pub enum FileAudioError {
    #[error("failed to open audio file: {0}")]
    Open(#[from] std::io::Error),
    #[error("unsupported or corrupt audio container: {0}")]
    Probe(SymphoniaError),
    #[error("no audio track found in file")]
    NoAudioTrack,
    #[error("decode error: {0}")]
    Decode(SymphoniaError),
    #[error("resample error: {0}")]
    Resample(#[from] rubato::ResampleError),
    #[error("resampler construction error: {0}")]
    ResamplerConstruction(#[from] rubato::ResamplerConstructionError),
}

/// Decode an entire `.wav`/`.mp3` file to mono `f32` PCM at `target_rate`,
/// blocking until fully decoded. This function exists to hand the pacer
/// the same `Vec<f32>` shape a live microphone capture would produce,
/// nothing more.
pub fn decode_file(path: &Path, target_rate: u32) -> Result<Vec<f32>, FileAudioError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(FileAudioError::Probe)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or(FileAudioError::NoAudioTrack)?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(FileAudioError::Decode)?;

    let mut mono = Vec::new();
    let mut native_rate = track.codec_params.sample_rate.unwrap_or(target_rate);

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(_)) => break, // EOF
            Err(e) => return Err(FileAudioError::Decode(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(_)) => continue, // skip bad frame
            Err(e) => return Err(FileAudioError::Decode(e)),
        };

        let spec: SignalSpec = *decoded.spec();
        native_rate = spec.rate;
        let channels = spec.channels.count().max(1);
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        mono.extend(sample_buf.samples().chunks(channels).map(|frame| frame[0]));
    }

    if native_rate == target_rate {
        Ok(mono)
    } else {
        resample(&mono, native_rate, target_rate)
    }
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, FileAudioError> {
    const CHUNK: usize = 1024;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        2.0,
        params,
        CHUNK,
        1,
    )?;

    let mut out = Vec::with_capacity(samples.len() * to_rate as usize / from_rate.max(1) as usize);
    let mut pos = 0;
    while pos < samples.len() {
        let end = (pos + CHUNK).min(samples.len());
        let mut chunk = samples[pos..end].to_vec();
        chunk.resize(CHUNK, 0.0); // rubato wants fixed-size input; pad the tail
        let produced = resampler.process(&[chunk], None)?;
        out.extend_from_slice(&produced[0]);
        pos = end;
    }
    Ok(out)
}

/// Drives `buffer` with a wall-clock "fake callback": each tick advances
/// the logical buffer length towards `len(file)` by up to `block_size`
/// samples, simulating real-time arrival from a pre-decoded file. Runs
/// until the whole file has been appended, then returns.
pub fn play_file_into_buffer(file: Arc<Vec<f32>>, block_size: usize, sample_rate: u32, buffer: Arc<AudioBuffer>) {
    let tick = Duration::from_secs_f64(block_size as f64 / sample_rate as f64);
    let mut appended = 0usize;
    while appended < file.len() {
        let next = (appended + block_size).min(file.len());
        buffer.append(&file[appended..next]);
        appended = next;
        if appended < file.len() {
            thread::sleep(tick);
        }
    }
}
