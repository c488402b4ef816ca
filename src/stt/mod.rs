//! STT (Speech-to-Text) engine module.
//!
//! The transcription worker feeds each 16 kHz mono audio chunk to an
//! [`SttEngine`]; [`WhisperEngine`] is the production implementation.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use echo_journal::stt::{SttEngine, TranscribeParams, WhisperEngine};
//!
//! let params = TranscribeParams::default(); // language = "en", greedy
//! let engine = WhisperEngine::load("models/ggml-base.en.bin", params)
//!     .expect("model file missing");
//!
//! // audio: 16 kHz, mono, f32 PCM — one chunk from the audio module
//! let audio: Vec<f32> = vec![0.0; 48_000]; // 3 s of silence
//! let text = engine.transcribe(&audio).unwrap();
//! println!("{text}");
//! ```

pub mod engine;

pub use engine::{SttEngine, SttError, TranscribeParams, WhisperEngine};

// test-only re-export so pipeline tests can import MockSttEngine without
// `use echo_journal::stt::engine::MockSttEngine`.
#[cfg(test)]
pub use engine::MockSttEngine;
