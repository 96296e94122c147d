use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use shared_reconciler::SegmentReconciler;
use tracing::{info, warn};

use crate::asr_client::{AsrClient, AsrError};
use crate::audio::AudioBuffer;
use crate::render;

pub struct PacerConfig {
    pub every: Duration,
    pub skip_empty_tick: bool,
    pub sample_rate: u32,
}

/// Translates wall-clock pacing into one backend call per tick, feeding the
/// result into the reconciler and rendering the outcome. Owns the
/// reconciler exclusively — no locking needed on that side, only the
/// shared `AudioBuffer` crosses threads.
pub struct Pacer {
    config: PacerConfig,
    buffer: Arc<AudioBuffer>,
    client: AsrClient,
    reconciler: SegmentReconciler,
    session_start: Instant,
}

impl Pacer {
    pub fn new(
        config: PacerConfig,
        buffer: Arc<AudioBuffer>,
        client: AsrClient,
        reconciler: SegmentReconciler,
    ) -> Self {
        Self { config, buffer, client, reconciler, session_start: Instant::now() }
    }

    /// Runs the tick loop. `file_len` is `Some(total_samples)` in file
    /// mode (drives the run to completion and a final `finish` tick) or
    /// `None` in live-mic mode (runs until `interrupted` is set).
    pub fn run(&mut self, file_len: Option<u64>, interrupted: &AtomicBool) -> Result<(), AsrError> {
        let mut next_tick = Instant::now() + self.config.every;

        loop {
            if interrupted.load(Ordering::SeqCst) {
                info!("interrupted, stopping without a final commit");
                return Ok(());
            }

            let now = Instant::now();
            if next_tick > now {
                let sleep_for = next_tick - now;
                thread::sleep(sleep_for);
            } else {
                warn!(late_seconds = (now - next_tick).as_secs_f64(), "pacer tick running late");
            }
            next_tick += self.config.every;

            self.tick(false)?;

            if let Some(len) = file_len {
                if self.buffer.length() >= len {
                    break;
                }
            }
            if interrupted.load(Ordering::SeqCst) {
                info!("interrupted, stopping without a final commit");
                return Ok(());
            }
        }

        if file_len.is_some() {
            self.tick(true)?;
        }
        Ok(())
    }

    /// One call to the backend plus one reconciliation. Exposed for tests
    /// that want to drive the pacer without real sleeps.
    pub fn tick(&mut self, finish: bool) -> Result<(), AsrError> {
        let committed = self.reconciler.committed_sample();
        let end = self.buffer.length();

        if end == committed && !finish && self.config.skip_empty_tick {
            return Ok(());
        }

        let audio = self.buffer.slice(committed, end);
        let history = self.reconciler.segment().prefix_text();

        info!(start = committed, end, "requesting transcription");
        let hypothesis = self.client.transcribe(audio, history, committed, end)?;
        let event = self.reconciler.reconcile(hypothesis, finish);

        if !event.committed.is_empty() || finish {
            let segment = self.reconciler.segment();
            let _ = render::render(&segment.prefix_text(), &segment.tail_text(), finish);

            let real_time = self.session_start.elapsed().as_secs_f64();
            let confirmed_time = event.committed_sample as f64 / self.config.sample_rate as f64;
            info!(
                n_committed = event.committed.len(),
                delay_seconds = real_time - confirmed_time,
                "commit"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_protocol::Task;
    use shared_reconciler::ReconcilerConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hyp_response(words: &[(&str, f64, f64)]) -> serde_json::Value {
        serde_json::json!({
            "lang": "en",
            "langP": 0.99,
            "hyp": words.iter().map(|(word, start, end)| serde_json::json!({
                "word": word, "start": start, "end": end, "wordP": 0.9
            })).collect::<Vec<_>>()
        })
    }

    // reqwest's blocking client panics if built or used on a thread that
    // already has a tokio runtime entered, so the mock server is driven
    // from a background runtime and the pacer ticks run on this, plain,
    // thread.
    #[test]
    fn tick_commits_on_agreement_across_two_calls() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/whisper"))
                .respond_with(ResponseTemplate::new(200).set_body_json(hyp_response(&[
                    ("Hello", 0.0, 0.25),
                    (" world", 0.25, 0.5),
                    (" how", 0.5, 0.7),
                    (" are", 0.7, 0.9),
                ])))
                .up_to_n_times(1)
                .mount(&server)
                .await;
            Mock::given(method("POST"))
                .and(path("/whisper"))
                .respond_with(ResponseTemplate::new(200).set_body_json(hyp_response(&[
                    ("Hello", 0.0, 0.25),
                    (" world", 0.25, 0.5),
                    (" how", 0.5, 0.7),
                    (" are", 0.7, 0.9),
                    (" you", 0.9, 1.0),
                ])))
                .mount(&server)
                .await;
            server
        });

        let buffer = Arc::new(AudioBuffer::new());
        buffer.append(&vec![0.0f32; 16_000]);

        let client = AsrClient::new(
            format!("{}/whisper", server.uri()),
            Duration::from_secs(5),
            Task::Transcribe,
            None,
            5,
            16_000,
        )
        .unwrap();

        let reconciler = SegmentReconciler::new(
            ReconcilerConfig { sample_rate: 16_000, min_common_words: 2, min_remain_words: 2, max_segment_time: 5.0 },
            0,
        );
        let mut pacer = Pacer::new(
            PacerConfig { every: Duration::from_millis(1), skip_empty_tick: false, sample_rate: 16_000 },
            buffer,
            client,
            reconciler,
        );

        pacer.tick(false).unwrap();
        assert!(pacer.reconciler.segment().prefix.is_empty());

        pacer.tick(false).unwrap();
        assert_eq!(pacer.reconciler.segment().prefix_text(), "Hello world how");
    }
}
