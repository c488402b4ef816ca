//! Transcription worker thread.
//!
//! [`spawn_worker`] starts the single thread that owns the STT engine.  It
//! loads the engine through a caller-supplied factory (so model loading
//! happens off the render thread), then drains the chunk queue in FIFO
//! order, pushing each non-empty transcript fragment onto the text queue.
//!
//! Failure handling:
//!
//! - model-load failure puts the worker into **degraded** mode: it stays
//!   alive and keeps draining (and discarding) chunks so the shutdown
//!   protocol is identical to the healthy path;
//! - a per-chunk transcription error is logged, counted and skipped —
//!   one bad chunk never takes the session down.
//!
//! The worker stops only on the shutdown sentinel or when the chunk queue
//! disconnects.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::audio::AudioChunk;
use crate::pipeline::queue::{QueueItem, QueueReceiver, QueueRecvError, QueueSendError, QueueSender};
use crate::stt::{SttEngine, SttError};

/// How long one `recv_timeout` waits before re-checking the queue.
const RECV_TIMEOUT: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// WorkerState / WorkerStatus
// ---------------------------------------------------------------------------

/// Coarse lifecycle of the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Engine factory still running.
    ModelLoading,
    /// Draining chunks (healthy or degraded).
    Ready,
    /// Observed the shutdown sentinel or a disconnect; the thread has
    /// finished its loop.
    Stopped,
}

/// Shared status block, readable from the render thread every frame.
#[derive(Debug)]
pub struct WorkerStatus {
    model_ready: AtomicBool,
    degraded: AtomicBool,
    chunk_errors: AtomicU64,
    state: Mutex<WorkerState>,
}

impl WorkerStatus {
    fn new() -> Self {
        Self {
            model_ready: AtomicBool::new(false),
            degraded: AtomicBool::new(false),
            chunk_errors: AtomicU64::new(0),
            state: Mutex::new(WorkerState::ModelLoading),
        }
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.lock().expect("worker state lock") = state;
    }

    /// `true` once the engine factory has finished, successfully or not.
    /// One-shot: never goes back to `false`.
    pub fn is_ready(&self) -> bool {
        self.model_ready.load(Ordering::Acquire)
    }

    /// `true` when the engine failed to load and chunks are being discarded.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Number of chunks skipped due to transcription errors.
    pub fn error_count(&self) -> u64 {
        self.chunk_errors.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().expect("worker state lock")
    }
}

// ---------------------------------------------------------------------------
// TranscriptFragment
// ---------------------------------------------------------------------------

/// One non-empty transcription result, in chunk order.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptFragment {
    pub text: String,
    /// Sequence number of the audio chunk this fragment came from.
    pub seq: u64,
}

// ---------------------------------------------------------------------------
// WorkerHandle
// ---------------------------------------------------------------------------

/// Owning handle to the worker thread: status access plus a joinable exit.
#[derive(Debug)]
pub struct WorkerHandle {
    join: Option<JoinHandle<()>>,
    status: Arc<WorkerStatus>,
}

impl WorkerHandle {
    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    pub fn is_degraded(&self) -> bool {
        self.status.is_degraded()
    }

    pub fn error_count(&self) -> u64 {
        self.status.error_count()
    }

    pub fn state(&self) -> WorkerState {
        self.status.state()
    }

    /// Wait for the worker thread to exit.  Call only after the shutdown
    /// sentinel has been sent, otherwise this blocks until the chunk queue
    /// disconnects.  Idempotent.
    pub fn join(&mut self) {
        if let Some(handle) = self.join.take() {
            if handle.join().is_err() {
                error!("transcription worker panicked");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// spawn_worker
// ---------------------------------------------------------------------------

/// Start the transcription worker thread.
///
/// `engine_factory` runs on the worker thread; a factory error flips the
/// worker into degraded mode instead of killing it.
pub fn spawn_worker<F>(
    engine_factory: F,
    chunk_rx: QueueReceiver<AudioChunk>,
    text_tx: QueueSender<TranscriptFragment>,
) -> io::Result<WorkerHandle>
where
    F: FnOnce() -> Result<Box<dyn SttEngine>, SttError> + Send + 'static,
{
    let status = Arc::new(WorkerStatus::new());
    let thread_status = Arc::clone(&status);

    let join = thread::Builder::new()
        .name("transcription-worker".into())
        .spawn(move || run_worker(engine_factory, chunk_rx, text_tx, thread_status))?;

    Ok(WorkerHandle {
        join: Some(join),
        status,
    })
}

fn run_worker<F>(
    engine_factory: F,
    chunk_rx: QueueReceiver<AudioChunk>,
    text_tx: QueueSender<TranscriptFragment>,
    status: Arc<WorkerStatus>,
) where
    F: FnOnce() -> Result<Box<dyn SttEngine>, SttError>,
{
    let engine = match engine_factory() {
        Ok(engine) => {
            info!("transcription engine loaded");
            Some(engine)
        }
        Err(e) => {
            error!("transcription engine failed to load, running degraded: {e}");
            status.degraded.store(true, Ordering::Release);
            None
        }
    };

    status.model_ready.store(true, Ordering::Release);
    status.set_state(WorkerState::Ready);

    loop {
        match chunk_rx.recv_timeout(RECV_TIMEOUT) {
            Ok(QueueItem::Item(chunk)) => {
                let Some(engine) = engine.as_deref() else {
                    // Degraded: keep the queue flowing so producers and the
                    // shutdown sentinel are not blocked behind stale chunks.
                    debug!("degraded worker discarding chunk {}", chunk.seq);
                    continue;
                };
                transcribe_chunk(engine, &chunk, &text_tx, &status);
            }
            Ok(QueueItem::Shutdown) => {
                info!("transcription worker received shutdown");
                break;
            }
            Err(QueueRecvError::Empty) => continue,
            Err(QueueRecvError::Disconnected) => {
                warn!("chunk queue disconnected; stopping transcription worker");
                break;
            }
        }
    }

    status.set_state(WorkerState::Stopped);
}

fn transcribe_chunk(
    engine: &dyn SttEngine,
    chunk: &AudioChunk,
    text_tx: &QueueSender<TranscriptFragment>,
    status: &WorkerStatus,
) {
    match engine.transcribe(&chunk.samples) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                debug!("chunk {} transcribed to silence", chunk.seq);
                return;
            }
            let fragment = TranscriptFragment {
                text: text.to_string(),
                seq: chunk.seq,
            };
            match text_tx.send(fragment) {
                Ok(()) => {}
                Err(QueueSendError::Full) => {
                    warn!("text queue full; dropping fragment for chunk {}", chunk.seq);
                }
                Err(QueueSendError::Disconnected) => {
                    debug!("text queue disconnected; fragment for chunk {} lost", chunk.seq);
                }
            }
        }
        Err(e) => {
            // One bad chunk must not end the session.
            warn!("transcription failed for chunk {}: {e}", chunk.seq);
            status.chunk_errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
