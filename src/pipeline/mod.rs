//! Pipeline plumbing — bounded queues and the transcription worker.
//!
//! Two bounded queues connect the three stages:
//!
//! ```text
//! chunker thread ──AudioChunk──▶ transcription worker ──TranscriptFragment──▶ render loop
//! ```
//!
//! Both queues carry a shutdown sentinel; producers are gated off before the
//! sentinel is sent so a consumer that sees it knows nothing follows.

pub mod queue;
pub mod worker;

pub use queue::{
    bounded_queue, QueueItem, QueueReceiver, QueueRecvError, QueueSendError, QueueSender,
};
pub use worker::{spawn_worker, TranscriptFragment, WorkerHandle, WorkerState, WorkerStatus};
