use std::time::{Duration, Instant};

use shared_protocol::{BackendRequest, BackendResponse, Hypothesis, SampleIndex, Task};
use tracing::debug;

/// Transport failures talking to the ASR backend. Every variant here is
/// fatal to the session: there is no retry, and the single in-flight
/// request invariant means this client is never called concurrently with
/// itself.
#[derive(Debug, thiserror::Error)]
pub enum AsrError {
    #[error("request to ASR backend timed out or was refused: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("ASR backend returned {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
}

pub struct AsrClient {
    http: reqwest::blocking::Client,
    url: String,
    task: Task,
    lang: Option<String>,
    beam_size: u32,
    sample_rate: u32,
}

impl AsrClient {
    pub fn new(
        url: String,
        timeout: Duration,
        task: Task,
        lang: Option<String>,
        beam_size: u32,
        sample_rate: u32,
    ) -> Result<Self, AsrError> {
        let http = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url, task, lang, beam_size, sample_rate })
    }

    /// Submit the sample slice `[start, end)` plus the committed-prefix
    /// `history`, and return the hypothesis with absolute sample indices.
    pub fn transcribe(
        &self,
        audio: Vec<f32>,
        history: String,
        start: SampleIndex,
        end: SampleIndex,
    ) -> Result<Hypothesis, AsrError> {
        let request = BackendRequest {
            audio,
            history,
            task: self.task,
            lang: self.lang.clone(),
            beam_size: self.beam_size,
        };

        let tic = Instant::now();
        let response = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AsrError::Status { status, body });
        }

        let body: BackendResponse = response.json()?;
        debug!(elapsed = ?tic.elapsed(), n_words = body.hyp.len(), "server request completed");

        Ok(body.into_hypothesis(start, end, self.sample_rate))
    }
}
