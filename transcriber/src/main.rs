mod asr_client;
mod audio;
mod cli;
mod pacer;
mod render;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use asr_client::AsrClient;
use audio::AudioBuffer;
use cli::Args;
use pacer::{Pacer, PacerConfig};
use shared_reconciler::{ReconcilerConfig, SegmentReconciler};

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || {
            info!("received interrupt, finishing current tick and stopping");
            interrupted.store(true, Ordering::SeqCst);
        })
        .context("failed to install interrupt handler")?;
    }

    let sample_rate = args.audio.srate;
    let buffer = Arc::new(AudioBuffer::new());

    // Streams are held for the duration of the run purely to keep their
    // producer threads alive; nothing in this function reads from them
    // directly.
    let _capture_stream;
    let _playback_stream;
    let file_len: Option<u64>;

    if let Some(path) = &args.audio.file {
        info!(?path, "decoding file for streaming playback");
        let decoded =
            audio::file::decode_file(path, sample_rate).context("failed to decode audio file")?;
        file_len = Some(decoded.len() as u64);
        let decoded = Arc::new(decoded);

        if args.audio.play {
            _playback_stream = Some(
                audio::playback::play(decoded.clone(), sample_rate)
                    .context("failed to start file playback")?,
            );
        } else {
            _playback_stream = None;
        }
        _capture_stream = None;

        let block = args.audio.block;
        let buffer_for_feed = buffer.clone();
        std::thread::spawn(move || {
            audio::file::play_file_into_buffer(decoded, block, sample_rate, buffer_for_feed);
        });
    } else {
        info!("opening default microphone input");
        _capture_stream = Some(
            audio::capture::start_capture(args.audio.channels, sample_rate, args.audio.block, buffer.clone())
                .context("failed to start microphone capture")?,
        );
        _playback_stream = None;
        file_len = None;
    }

    let client = AsrClient::new(
        args.url.clone(),
        Duration::from_secs(args.stream.timeout),
        args.stream.task.into(),
        args.stream.lang.clone(),
        args.stream.beam,
        sample_rate,
    )
    .context("failed to build ASR client")?;

    let reconciler_config = ReconcilerConfig {
        sample_rate,
        min_common_words: args.stream.min_common_words,
        min_remain_words: args.stream.min_remain_words,
        max_segment_time: args.stream.max_segment_time,
    };
    let reconciler = SegmentReconciler::new(reconciler_config, 0);

    let pacer_config = PacerConfig {
        every: Duration::from_secs_f64(args.stream.every),
        skip_empty_tick: args.stream.skip_empty_tick,
        sample_rate,
    };
    let mut pacer = Pacer::new(pacer_config, buffer, client, reconciler);

    pacer.run(file_len, &interrupted).context("ASR backend request failed")?;

    Ok(())
}
