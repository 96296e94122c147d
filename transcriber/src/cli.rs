use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use shared_protocol::Task;

#[derive(Parser, Debug)]
#[command(
    name = "transcriber",
    about = "Streams audio from a microphone or file to a remote ASR server and \
             renders an incrementally-confirmed transcript."
)]
pub struct Args {
    /// Server URL (e.g. http://0.0.0.0:8000/whisper)
    pub url: String,

    #[command(flatten)]
    pub audio: AudioArgs,

    #[command(flatten)]
    pub stream: StreamArgs,

    /// Logging level
    #[arg(long, default_value = "warn")]
    pub log: String,
}

#[derive(Parser, Debug)]
pub struct AudioArgs {
    /// Channels: 1 (mono), 2 (stereo)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=2))]
    pub channels: u16,

    /// Sample rate
    #[arg(long, default_value_t = shared_protocol::DEFAULT_SAMPLE_RATE)]
    pub srate: u32,

    /// Size of audio block captured per callback, in frames
    #[arg(long, default_value_t = 4096)]
    pub block: usize,

    /// Stream this wav/mp3 file rather than the microphone
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Play audio while streaming a file
    #[arg(long)]
    pub play: bool,
}

#[derive(Parser, Debug)]
pub struct StreamArgs {
    /// Task to perform
    #[arg(long, value_enum, default_value_t = CliTask::Transcribe)]
    pub task: CliTask,

    /// Force language (defaults to auto-detect)
    #[arg(long)]
    pub lang: Option<String>,

    /// Beam size
    #[arg(long, default_value_t = 5)]
    pub beam: u32,

    /// Minimum delay (seconds) between transcriptions
    #[arg(long, default_value_t = 1.0)]
    pub every: f64,

    /// Segments larger than this (seconds) are forced to confirm
    #[arg(long, default_value_t = 5.0)]
    pub max_segment_time: f64,

    /// Minimum number of common words to confirm a prefix
    #[arg(long, default_value_t = 2)]
    pub min_common_words: usize,

    /// Minimum number of remaining words after the confirmed prefix
    #[arg(long, default_value_t = 2)]
    pub min_remain_words: usize,

    /// URL request timeout, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Skip the request entirely when no new audio has accumulated since
    /// the last tick, instead of issuing a call with an empty slice.
    #[arg(long)]
    pub skip_empty_tick: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliTask {
    Transcribe,
    Translate,
}

impl From<CliTask> for Task {
    fn from(task: CliTask) -> Self {
        match task {
            CliTask::Transcribe => Task::Transcribe,
            CliTask::Translate => Task::Translate,
        }
    }
}
