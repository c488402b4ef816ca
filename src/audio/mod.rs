//! Audio pipeline — microphone capture → resampling → fixed-duration chunks.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → RawBuffer (mpsc) → stereo_to_mono
//!           → resample_to_16k → ChunkSlicer → AudioChunk → bounded queue
//! ```
//!
//! The chunker thread ([`spawn_chunker`]) sits between the real-time cpal
//! callback and the bounded chunk queue, so the callback itself never touches
//! pipeline state beyond an unbounded mpsc send of copied samples.

pub mod capture;
pub mod chunker;
pub mod resample;

pub use capture::{AudioCapture, CaptureError, RawBuffer, StreamHandle};
pub use chunker::{spawn_chunker, AudioChunk, ChunkSlicer, TARGET_SAMPLE_RATE};
pub use resample::{resample_to_16k, stereo_to_mono};
