//! Echo Journal — real-time journaling with emotion-colored transcription.
//!
//! # Architecture
//!
//! ```text
//! Microphone → cpal callback → RawBuffer (mpsc) → chunker thread
//!           → AudioChunk → bounded chunk queue → transcription worker
//!           → TranscriptFragment → bounded text queue → egui render loop
//!           → EmotionClassifier → layout_transcript → screen
//! ```
//!
//! Two threads feed the main (render) thread:
//!
//! * the cpal audio callback plus the chunker thread, which normalise raw
//!   device buffers to 16 kHz mono and slice them into fixed-duration
//!   [`audio::AudioChunk`]s;
//! * the transcription worker, which runs Whisper on each chunk and emits
//!   [`pipeline::TranscriptFragment`]s in chunk order.
//!
//! The bounded queues in [`pipeline::queue`] are the only state shared across
//! threads.  The session transcript, counters, and lifecycle phase live
//! exclusively on the render thread ([`app::EchoJournalApp`]).

pub mod app;
pub mod audio;
pub mod config;
pub mod emotion;
pub mod layout;
pub mod lifecycle;
pub mod pipeline;
pub mod session;
pub mod snapshot;
pub mod stt;
