use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// PCM sample count since session start. Time in seconds = index / sample_rate.
pub type SampleIndex = u64;

/// The task the backend should perform on the submitted audio slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Transcribe,
    Translate,
}

impl Default for Task {
    fn default() -> Self {
        Task::Transcribe
    }
}

/// One word as emitted by the backend, including any leading space as part
/// of `text`. Equality for agreement purposes compares `text` only — start
/// and end are not part of the comparison (see `shared-reconciler`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub start: SampleIndex,
    pub end: SampleIndex,
    pub text: String,
    pub confidence: Option<f32>,
}

/// One decoding of one audio slice. Ephemeral: retained only long enough to
/// compare with the hypothesis from the previous tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hypothesis {
    pub start: SampleIndex,
    pub end: SampleIndex,
    pub words: Vec<Word>,
    pub language: Option<String>,
    pub language_probability: Option<f32>,
}

impl Hypothesis {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// The currently open utterance. `prefix` only ever grows; `tail` is
/// replaced wholesale on every reconciliation tick that doesn't commit it
/// away entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Segment {
    pub start_sample: SampleIndex,
    pub end_sample: SampleIndex,
    pub prefix: Vec<Word>,
    pub tail: Vec<Word>,
    pub language: Option<String>,
    pub language_probability: Option<f32>,
}

impl Segment {
    /// `prefix.last().end`, or `start_sample` if nothing has been
    /// committed yet. This is where the next request's slice must begin.
    pub fn committed_sample(&self) -> SampleIndex {
        self.prefix
            .last()
            .map(|w| w.end)
            .unwrap_or(self.start_sample)
    }

    pub fn prefix_text(&self) -> String {
        self.prefix.iter().map(|w| w.text.as_str()).collect()
    }

    pub fn tail_text(&self) -> String {
        self.tail.iter().map(|w| w.text.as_str()).collect()
    }
}

/// Request body POSTed to the ASR backend (`Content-Type: application/json`).
#[derive(Debug, Clone, Serialize)]
pub struct BackendRequest {
    pub audio: Vec<f32>,
    pub history: String,
    pub task: Task,
    pub lang: Option<String>,
    pub beam_size: u32,
}

/// One word as returned by the backend, with timestamps in seconds
/// relative to the submitted slice (not yet absolute sample indices).
#[derive(Debug, Clone, Deserialize)]
pub struct BackendWord {
    pub start: f64,
    pub end: f64,
    pub word: String,
    #[serde(rename = "wordP")]
    pub word_p: Option<f32>,
}

/// Response body returned by the ASR backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendResponse {
    pub lang: String,
    #[serde(rename = "langP")]
    pub lang_p: f32,
    pub hyp: Vec<BackendWord>,
}

impl BackendResponse {
    /// Translate backend timestamps (seconds within the submitted slice)
    /// into absolute sample indices, anchoring at `start`.
    pub fn into_hypothesis(
        self,
        start: SampleIndex,
        end: SampleIndex,
        sample_rate: u32,
    ) -> Hypothesis {
        let words = self
            .hyp
            .into_iter()
            .map(|w| Word {
                start: start + (w.start * sample_rate as f64) as SampleIndex,
                end: start + (w.end * sample_rate as f64) as SampleIndex,
                text: w.word,
                confidence: w.word_p,
            })
            .collect();
        Hypothesis {
            start,
            end,
            words,
            language: Some(self.lang),
            language_probability: Some(self.lang_p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_sample_falls_back_to_start_when_prefix_empty() {
        let seg = Segment {
            start_sample: 42,
            end_sample: 100,
            ..Default::default()
        };
        assert_eq!(seg.committed_sample(), 42);
    }

    #[test]
    fn committed_sample_is_end_of_last_prefix_word() {
        let seg = Segment {
            start_sample: 0,
            end_sample: 100,
            prefix: vec![
                Word { start: 0, end: 10, text: "Hello".into(), confidence: None },
                Word { start: 10, end: 20, text: " world".into(), confidence: None },
            ],
            ..Default::default()
        };
        assert_eq!(seg.committed_sample(), 20);
    }

    #[test]
    fn backend_response_converts_seconds_to_absolute_samples() {
        let resp = BackendResponse {
            lang: "en".into(),
            lang_p: 0.98,
            hyp: vec![BackendWord { start: 0.0, end: 0.5, word: "Hello".into(), word_p: Some(0.9) }],
        };
        let hyp = resp.into_hypothesis(16_000, 24_000, 16_000);
        assert_eq!(hyp.words[0].start, 16_000);
        assert_eq!(hyp.words[0].end, 24_000);
    }

    #[test]
    fn wire_round_trip_via_json() {
        let req = BackendRequest {
            audio: vec![0.0, 0.1, -0.1],
            history: "Hello".into(),
            task: Task::Transcribe,
            lang: None,
            beam_size: 5,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"task\":\"transcribe\""));
    }
}
