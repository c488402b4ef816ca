//! Slicing the continuous capture stream into fixed-duration chunks.
//!
//! The cpal callback delivers buffers of arbitrary length at the device's
//! native rate.  The chunker thread normalises each buffer to 16 kHz mono,
//! accumulates samples in a [`ChunkSlicer`], and submits every complete
//! block to the bounded chunk queue as an [`AudioChunk`].
//!
//! # Overflow policy
//!
//! Submission uses the queue's non-blocking send.  When the transcription
//! worker falls behind and the queue is full, the **newest chunk is dropped**
//! and a warning is logged.  The audio thread is never blocked and the queue
//! never grows past its capacity.
//!
//! # Recording gate
//!
//! The render thread owns an `Arc<AtomicBool>` gate.  While the gate is off
//! (Onboarding, Loading, Finished) incoming samples are discarded and any
//! partial block is cleared, so a resumed session starts on a fresh block
//! boundary and nothing can be enqueued after the shutdown sentinel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use crate::pipeline::{QueueSendError, QueueSender};

use super::capture::RawBuffer;
use super::resample::{resample_to_16k, stereo_to_mono};

/// Sample rate every chunk is normalised to before transcription.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// One fixed-duration block of 16 kHz mono samples.
///
/// Immutable once built; owned by the chunk queue until the transcription
/// worker consumes it.  `seq` records emission order so fragment causality
/// can be asserted downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// 16 kHz mono PCM samples; always exactly the configured block length.
    pub samples: Vec<f32>,
    /// Sample rate in Hz — [`TARGET_SAMPLE_RATE`] for every chunk.
    pub sample_rate: u32,
    /// Emission order, starting at 0.
    pub seq: u64,
}

// ---------------------------------------------------------------------------
// ChunkSlicer
// ---------------------------------------------------------------------------

/// Accumulates samples and emits complete fixed-length blocks.
///
/// Pure state machine — no I/O, no threads — so the block arithmetic can be
/// tested in isolation.
///
/// ```
/// use echo_journal::audio::ChunkSlicer;
///
/// let mut slicer = ChunkSlicer::new(4);
/// assert!(slicer.push(&[1.0, 2.0, 3.0]).is_empty()); // partial block held
/// let blocks = slicer.push(&[4.0, 5.0]);
/// assert_eq!(blocks, vec![vec![1.0, 2.0, 3.0, 4.0]]);
/// assert_eq!(slicer.pending(), 1); // 5.0 carried into the next block
/// ```
pub struct ChunkSlicer {
    block_len: usize,
    pending: Vec<f32>,
}

impl ChunkSlicer {
    /// Create a slicer emitting blocks of exactly `block_len` samples.
    ///
    /// # Panics
    ///
    /// Panics if `block_len == 0`.
    pub fn new(block_len: usize) -> Self {
        assert!(block_len > 0, "ChunkSlicer block length must be > 0");
        Self {
            block_len,
            pending: Vec::with_capacity(block_len),
        }
    }

    /// Append `samples`, returning every complete block they produce.
    ///
    /// Leftover samples stay buffered for the next call; each returned block
    /// is a fresh copy, never aliasing the input.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        self.pending.extend_from_slice(samples);

        let mut blocks = Vec::new();
        while self.pending.len() >= self.block_len {
            let rest = self.pending.split_off(self.block_len);
            blocks.push(std::mem::replace(&mut self.pending, rest));
        }
        blocks
    }

    /// Discard any partially accumulated block.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of samples waiting for the current block to fill.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Configured block length in samples.
    pub fn block_len(&self) -> usize {
        self.block_len
    }
}

// ---------------------------------------------------------------------------
// Chunker thread
// ---------------------------------------------------------------------------

/// Spawn the chunker thread.
///
/// Drains [`RawBuffer`]s from `raw_rx`, downmixes and resamples them to
/// 16 kHz mono, and submits complete `block_len`-sample [`AudioChunk`]s to
/// `chunk_tx` while `recording` is set.  The thread exits when every sender
/// side of `raw_rx` has been dropped (capture stream torn down).
pub fn spawn_chunker(
    raw_rx: mpsc::Receiver<RawBuffer>,
    chunk_tx: QueueSender<AudioChunk>,
    recording: Arc<AtomicBool>,
    block_len: usize,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("audio-chunker".into())
        .spawn(move || {
            let mut slicer = ChunkSlicer::new(block_len);
            let mut seq: u64 = 0;
            let mut dropped: u64 = 0;

            while let Ok(buffer) = raw_rx.recv() {
                if !recording.load(Ordering::Acquire) {
                    // Discard samples while gated off so a resumed session
                    // starts on a fresh block boundary.
                    slicer.clear();
                    continue;
                }

                let mono = stereo_to_mono(&buffer.samples, buffer.channels);
                let resampled = resample_to_16k(&mono, buffer.sample_rate);

                for samples in slicer.push(&resampled) {
                    let chunk = AudioChunk {
                        samples,
                        sample_rate: TARGET_SAMPLE_RATE,
                        seq,
                    };
                    seq += 1;

                    match chunk_tx.send(chunk) {
                        Ok(()) => {}
                        Err(QueueSendError::Full) => {
                            dropped += 1;
                            log::warn!(
                                "chunk queue full — dropped chunk {} ({} dropped so far)",
                                seq - 1,
                                dropped
                            );
                        }
                        Err(QueueSendError::Disconnected) => {
                            log::info!("chunk queue closed, chunker exiting");
                            return;
                        }
                    }
                }
            }

            log::info!("capture stream closed, chunker exiting ({dropped} chunks dropped)");
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
