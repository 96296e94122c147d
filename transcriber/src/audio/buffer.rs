use std::sync::Mutex;

use tracing::debug;

/// Append-only, monotonically growing sequence of 32-bit mono PCM samples.
///
/// Filled by an audio producer (the device callback or the file-playback
/// shim) and read by the pacer. The lock is held only across the append or
/// the copy-out of a slice — never across a network call.
pub struct AudioBuffer {
    samples: Mutex<Vec<f32>>,
}

impl Default for AudioBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBuffer {
    pub fn new() -> Self {
        Self { samples: Mutex::new(Vec::new()) }
    }

    /// Extend the buffer with `samples`. Safe to call from the audio
    /// subsystem's callback thread: the lock is held only long enough to
    /// append, never to block on I/O.
    pub fn append(&self, samples: &[f32]) {
        let mut guard = self.samples.lock().expect("audio buffer lock poisoned");
        guard.extend_from_slice(samples);
        debug!(len = guard.len(), "appended audio");
    }

    pub fn length(&self) -> u64 {
        self.samples.lock().expect("audio buffer lock poisoned").len() as u64
    }

    /// Copy out samples `[from, to)`. Not invalidated by concurrent
    /// appends: the returned `Vec` is an independent snapshot.
    pub fn slice(&self, from: u64, to: u64) -> Vec<f32> {
        let guard = self.samples.lock().expect("audio buffer lock poisoned");
        let from = (from as usize).min(guard.len());
        let to = (to as usize).min(guard.len());
        if from >= to {
            return Vec::new();
        }
        guard[from..to].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_grows_with_append() {
        let buf = AudioBuffer::new();
        assert_eq!(buf.length(), 0);
        buf.append(&[0.0, 0.1, 0.2]);
        assert_eq!(buf.length(), 3);
        buf.append(&[0.3]);
        assert_eq!(buf.length(), 4);
    }

    #[test]
    fn slice_returns_requested_range() {
        let buf = AudioBuffer::new();
        buf.append(&[0.0, 0.1, 0.2, 0.3, 0.4]);
        assert_eq!(buf.slice(1, 4), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn slice_clamps_to_current_length() {
        let buf = AudioBuffer::new();
        buf.append(&[0.0, 0.1]);
        assert_eq!(buf.slice(0, 100), vec![0.0, 0.1]);
        assert!(buf.slice(5, 10).is_empty());
    }

    #[test]
    fn slice_sees_samples_appended_after_snapshot_only_on_next_call() {
        let buf = AudioBuffer::new();
        buf.append(&[0.0]);
        let snapshot_len = buf.length();
        buf.append(&[0.1]);
        // the earlier snapshot length is still valid to slice against
        assert_eq!(buf.slice(0, snapshot_len), vec![0.0]);
        assert_eq!(buf.slice(0, buf.length()), vec![0.0, 0.1]);
    }
}
