//! Application entry point — Echo Journal.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the emotion lexicon (empty lexicon on failure — every word then
//!    renders in the default color).
//! 4. Create the bounded chunk and fragment queues.
//! 5. Spawn the transcription worker; the Whisper model loads on that
//!    thread while the UI shows the onboarding/loading screens.
//! 6. Open the default microphone and spawn the chunker thread.
//! 7. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.
//! 8. Join the chunker thread after the UI exits.

use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

use echo_journal::{
    app::{EchoJournalApp, PipelineEndpoints},
    audio::{spawn_chunker, AudioCapture, RawBuffer},
    config::{AppConfig, AppPaths},
    emotion::{EmotionClassifier, Lexicon},
    pipeline::{bounded_queue, spawn_worker},
    stt::{SttEngine, TranscribeParams, WhisperEngine},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    // Fixed-size window: the layout geometry assumes an exact surface.
    let vp = egui::ViewportBuilder::default()
        .with_inner_size([config.ui.window_width, config.ui.window_height])
        .with_resizable(false)
        .with_title("Echo Journal");

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Echo Journal starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let paths = AppPaths::new();

    // 3. Emotion lexicon
    let lexicon_path = config
        .emotion
        .lexicon_file
        .clone()
        .unwrap_or_else(|| paths.lexicon_file.clone());
    let lexicon = Lexicon::load_from(&lexicon_path).unwrap_or_else(|e| {
        log::warn!(
            "Could not load lexicon from {} ({e:#}); words will use the default color",
            lexicon_path.display()
        );
        Lexicon::empty()
    });
    log::info!("emotion lexicon loaded ({} words)", lexicon.len());
    let classifier = EmotionClassifier::new(lexicon);

    // 4. Bounded queues
    let (chunk_tx, chunk_rx) = bounded_queue(config.audio.queue_capacity);
    let (text_tx, text_rx) = bounded_queue(config.audio.queue_capacity);

    // 5. Transcription worker — the Whisper model loads on its thread so the
    //    window opens immediately.
    let model_path = paths.models_dir.join(format!("ggml-{}.bin", config.stt.model));
    let stt_params = TranscribeParams {
        language: config.stt.language.clone(),
        ..TranscribeParams::default()
    };
    let worker = spawn_worker(
        move || {
            WhisperEngine::load(&model_path, stt_params)
                .map(|engine| Box::new(engine) as Box<dyn SttEngine>)
        },
        chunk_rx,
        text_tx,
    )
    .expect("failed to spawn transcription worker");

    // 6. Microphone + chunker thread
    let capture = match AudioCapture::new() {
        Ok(capture) => Some(capture),
        Err(e) => {
            log::warn!("Audio capture unavailable: {e}");
            None
        }
    };

    let recording = Arc::new(AtomicBool::new(false));
    let (raw_tx, raw_rx) = mpsc::channel::<RawBuffer>();
    let chunker = spawn_chunker(
        raw_rx,
        chunk_tx.clone(),
        Arc::clone(&recording),
        config.audio.chunk_samples(),
    )
    .expect("failed to spawn audio-chunker thread");

    // 7. Build the egui app and run it (blocks until the window is closed)
    let app = EchoJournalApp::new(
        config.clone(),
        classifier,
        PipelineEndpoints {
            chunk_tx,
            text_rx,
            worker,
            recording,
            raw_tx,
        },
        capture,
        paths.snapshots_dir.clone(),
    );
    let options = native_options(&config);

    let result = eframe::run_native("Echo Journal", options, Box::new(move |_cc| Ok(Box::new(app))));

    // 8. The app dropped its raw_tx and stream on exit, so the chunker's
    //    channel is closed and the thread winds down.
    if chunker.join().is_err() {
        log::error!("audio-chunker thread panicked");
    }
    log::info!("Echo Journal shut down");

    result
}
