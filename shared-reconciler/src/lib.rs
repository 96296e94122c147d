//! LocalAgreement-2 commit algorithm.
//!
//! [`SegmentReconciler`] owns one open [`Segment`] and decides, on every new
//! [`Hypothesis`], how many words move from the volatile `tail` into the
//! immutable `prefix`. It has no knowledge of audio devices, HTTP, or a
//! terminal — it is pure state and is exercised entirely through
//! `reconcile()` in the tests below.

use shared_protocol::{Hypothesis, SampleIndex, Segment, Word};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub sample_rate: u32,
    pub min_common_words: usize,
    pub min_remain_words: usize,
    pub max_segment_time: f64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            sample_rate: shared_protocol::DEFAULT_SAMPLE_RATE,
            min_common_words: 2,
            min_remain_words: 2,
            max_segment_time: 5.0,
        }
    }
}

/// The outcome of one `reconcile()` call, for the pacer to render and log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitEvent {
    /// Words newly promoted from tail to prefix this tick. Empty if
    /// nothing was confirmed.
    pub committed: Vec<Word>,
    /// `segment.committed_sample()` after this tick.
    pub committed_sample: SampleIndex,
}

pub struct SegmentReconciler {
    config: ReconcilerConfig,
    segment: Segment,
    previous: Option<Hypothesis>,
    finished: bool,
}

impl SegmentReconciler {
    pub fn new(config: ReconcilerConfig, start_sample: SampleIndex) -> Self {
        Self {
            config,
            segment: Segment {
                start_sample,
                end_sample: start_sample,
                ..Default::default()
            },
            previous: None,
            finished: false,
        }
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn committed_sample(&self) -> SampleIndex {
        self.segment.committed_sample()
    }

    /// Feed one new hypothesis, covering slice `[hypothesis.start,
    /// hypothesis.end)`, into the reconciler.
    ///
    /// Once `finish` has been passed as `true` once, the segment is closed:
    /// every subsequent call (finish or not) is a no-op, which is what makes
    /// a repeated `finish=true` idempotent.
    pub fn reconcile(&mut self, hypothesis: Hypothesis, finish: bool) -> CommitEvent {
        if self.finished {
            return CommitEvent {
                committed: Vec::new(),
                committed_sample: self.committed_sample(),
            };
        }

        self.segment.end_sample = hypothesis.end;
        self.segment.language = hypothesis.language.clone();
        self.segment.language_probability = hypothesis.language_probability;

        let previous = self.previous.replace(hypothesis.clone());

        if finish {
            self.finished = true;
            let n = hypothesis.words.len();
            return self.commit(hypothesis.words, n);
        }

        let duration = (hypothesis.end - hypothesis.start) as f64 / self.config.sample_rate as f64;
        if hypothesis.len() > self.config.min_remain_words && duration > self.config.max_segment_time {
            debug!(duration, "force-commit: segment exceeds max_segment_time");
            let k = hypothesis.len() - self.config.min_remain_words;
            return self.commit(hypothesis.words, k);
        }

        let Some(previous) = previous else {
            self.segment.tail = hypothesis.words;
            return self.no_commit();
        };

        if previous.start != hypothesis.start {
            debug!("different slice origin, skipping commit this tick");
            self.segment.tail = hypothesis.words;
            return self.no_commit();
        }

        let k = agreed_prefix_len(&previous.words, &hypothesis.words);
        let k = k.min(hypothesis.len().saturating_sub(self.config.min_remain_words));

        if k >= self.config.min_common_words && hypothesis.len() - k >= self.config.min_remain_words {
            self.commit(hypothesis.words, k)
        } else {
            debug!(k, "no common/remain words, skipping commit");
            self.segment.tail = hypothesis.words;
            self.no_commit()
        }
    }

    fn commit(&mut self, words: Vec<Word>, k: usize) -> CommitEvent {
        let k = k.min(words.len());
        let mut words = words;
        let tail = words.split_off(k);
        let committed = words;
        self.segment.prefix.extend(committed.iter().cloned());
        self.segment.tail = tail;
        CommitEvent {
            committed,
            committed_sample: self.committed_sample(),
        }
    }

    fn no_commit(&self) -> CommitEvent {
        CommitEvent {
            committed: Vec::new(),
            committed_sample: self.committed_sample(),
        }
    }
}

/// The source's agreement check is written as a bigram comparison
/// (`prev[i]==new[i] && prev[i-1]==new[i-1]`), but since the scan is
/// ordered and index `i-1` only matters once it has already matched on a
/// prior iteration, that check is equivalent to a plain unigram prefix
/// scan — the largest `k` such that `prev[0..k] == new[0..k]` by text.
fn agreed_prefix_len(previous: &[Word], current: &[Word]) -> usize {
    previous
        .iter()
        .zip(current.iter())
        .take_while(|(p, c)| p.text == c.text)
        .count()
}
