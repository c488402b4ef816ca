//! Echo Journal — egui/eframe application.
//!
//! # Architecture
//!
//! [`EchoJournalApp`] is the top-level [`eframe::App`].  It owns the UI-side
//! session state (phase, transcript, counters) and the render-thread ends of
//! the pipeline:
//!
//! * `chunk_tx` — used only to deliver the shutdown sentinel to the worker;
//! * `text_rx`  — non-blocking receiver of [`TranscriptFragment`]s;
//! * `recording` — the gate the chunker thread checks before slicing.
//!
//! Every frame polls at most **one** fragment, reruns the pure two-column
//! layout over the whole transcript, and paints the result.  All phase
//! changes go through [`Phase::apply`]; this module only performs the side
//! effects the returned transition demands (stream play/pause, gate flips,
//! pipeline shutdown).
//!
//! # Screens
//!
//! | Phase | Visual |
//! |-------|--------|
//! | `Onboarding` | "Press any key to begin" prompt |
//! | `Loading` | "Loading model…" while the worker warms up |
//! | `Running` | Two-column transcript, person figure, red recording notice |
//! | `Finished` | Frozen transcript + Save Snapshot / Resume buttons |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use eframe::egui;
use log::{error, info, warn};

use crate::audio::{AudioCapture, AudioChunk, RawBuffer, StreamHandle};
use crate::config::AppConfig;
use crate::emotion::EmotionClassifier;
use crate::layout::{layout_transcript, FontMetrics, LayoutGeometry, LayoutResult};
use crate::lifecycle::{LifecycleEvent, Phase, Transition};
use crate::pipeline::{QueueItem, QueueReceiver, QueueSender, TranscriptFragment, WorkerHandle};
use crate::session::{SessionCounters, SessionTranscript};
use crate::snapshot;

/// Frame cadence while live transcription is on screen.
const LIVE_REPAINT: Duration = Duration::from_millis(10);
/// Frame cadence on the static screens.
const IDLE_REPAINT: Duration = Duration::from_millis(100);

const BACKGROUND: egui::Color32 = egui::Color32::WHITE;
const RECORDING_NOTICE: egui::Color32 = egui::Color32::from_rgb(200, 30, 30);
const PERSON_RADIUS: f32 = 30.0;

// ---------------------------------------------------------------------------
// PipelineEndpoints
// ---------------------------------------------------------------------------

/// The render-thread ends of the capture → transcription pipeline, bundled
/// so [`EchoJournalApp::new`] stays readable.
pub struct PipelineEndpoints {
    /// Producer side of the chunk queue — used only for the shutdown
    /// sentinel; the chunker thread holds its own clone for chunks.
    pub chunk_tx: QueueSender<AudioChunk>,
    /// Consumer side of the fragment queue.
    pub text_rx: QueueReceiver<TranscriptFragment>,
    /// Handle to the transcription worker thread.
    pub worker: WorkerHandle,
    /// Gate read by the chunker; off outside Running.
    pub recording: Arc<AtomicBool>,
    /// Sender the capture stream writes raw buffers to.
    pub raw_tx: mpsc::Sender<RawBuffer>,
}

// ---------------------------------------------------------------------------
// UiFontMetrics
// ---------------------------------------------------------------------------

/// [`FontMetrics`] backed by the live egui font atlas.
struct UiFontMetrics<'a> {
    ctx: &'a egui::Context,
    font_id: egui::FontId,
}

impl FontMetrics for UiFontMetrics<'_> {
    fn word_width(&self, word: &str) -> f32 {
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(word.to_owned(), self.font_id.clone(), egui::Color32::BLACK)
                .size()
                .x
        })
    }

    fn space_width(&self) -> f32 {
        self.ctx.fonts(|fonts| fonts.glyph_width(&self.font_id, ' '))
    }

    fn line_height(&self) -> f32 {
        self.ctx.fonts(|fonts| fonts.row_height(&self.font_id))
    }
}

// ---------------------------------------------------------------------------
// EchoJournalApp
// ---------------------------------------------------------------------------

/// eframe application — the journal window.
pub struct EchoJournalApp {
    // ── Session state ────────────────────────────────────────────────────
    phase: Phase,
    /// Latched once the layout runs out of space; blocks Resume.
    overflowed: bool,
    transcript: SessionTranscript,
    counters: SessionCounters,
    classifier: EmotionClassifier,

    // ── Pipeline ─────────────────────────────────────────────────────────
    endpoints: Option<PipelineEndpoints>,
    /// Microphone wrapper; `None` when no input device was found.
    capture: Option<AudioCapture>,
    /// Live cpal stream, created on the Loading → Running transition.
    stream: Option<StreamHandle>,

    // ── Configuration ────────────────────────────────────────────────────
    config: AppConfig,
    font_id: egui::FontId,
    snapshots_dir: std::path::PathBuf,
}

impl EchoJournalApp {
    pub fn new(
        config: AppConfig,
        classifier: EmotionClassifier,
        endpoints: PipelineEndpoints,
        capture: Option<AudioCapture>,
        snapshots_dir: std::path::PathBuf,
    ) -> Self {
        let counters = SessionCounters::new(config.ui.target_chars);
        let font_id = egui::FontId::proportional(config.ui.font_size);
        Self {
            phase: Phase::default(),
            overflowed: false,
            transcript: SessionTranscript::new(),
            counters,
            classifier,
            endpoints: Some(endpoints),
            capture,
            stream: None,
            config,
            font_id,
            snapshots_dir,
        }
    }

    fn geometry(&self) -> LayoutGeometry {
        LayoutGeometry {
            surface_width: self.config.ui.window_width,
            surface_height: self.config.ui.window_height,
            margin: self.config.ui.margin,
            person_area_width: self.config.ui.person_area_width,
        }
    }

    // ── Lifecycle dispatch ───────────────────────────────────────────────

    /// Apply `event` through the pure transition table, then perform the
    /// side effects the transition demands.
    fn dispatch(&mut self, event: LifecycleEvent, ctx: &egui::Context) {
        match self.phase.apply(event, self.overflowed) {
            Transition::Stay => {}
            Transition::Enter(next) => {
                info!("phase {} -> {}", self.phase.label(), next.label());
                match next {
                    Phase::Running => self.enter_running(),
                    Phase::Finished => self.enter_finished(),
                    Phase::Onboarding | Phase::Loading => {}
                }
                self.phase = next;
            }
            Transition::Terminate => {
                info!("terminating from phase {}", self.phase.label());
                self.shutdown_pipeline();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    /// Open the gate and resume the stream.  Gate first, so no sample that
    /// arrives before the stream is live can be mis-ordered.
    fn enter_running(&mut self) {
        if let Some(endpoints) = &self.endpoints {
            endpoints.recording.store(true, Ordering::Release);
        }
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.play() {
                error!("failed to resume capture stream: {e}");
            }
        }
    }

    /// Close the gate and pause the stream; in-flight chunks keep flowing
    /// through the worker and are still rendered.
    fn enter_finished(&mut self) {
        if let Some(endpoints) = &self.endpoints {
            endpoints.recording.store(false, Ordering::Release);
        }
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                warn!("failed to pause capture stream: {e}");
            }
        }
    }

    /// Gate off, sentinel in, worker joined, stream dropped.  Idempotent:
    /// taking `endpoints` the first time makes later calls no-ops.
    fn shutdown_pipeline(&mut self) {
        let Some(endpoints) = self.endpoints.take() else {
            return;
        };
        endpoints.recording.store(false, Ordering::Release);
        // Dropping the stream stops the cpal callback before the sentinel
        // goes in, so nothing can be enqueued behind it.
        self.stream = None;

        let PipelineEndpoints {
            chunk_tx,
            mut worker,
            ..
        } = endpoints;
        if chunk_tx.send_shutdown().is_err() {
            info!("chunk queue already closed during shutdown");
        }
        worker.join();
        info!("pipeline shut down cleanly");
    }

    // ── Per-frame work ───────────────────────────────────────────────────

    /// Phase-specific input and pipeline polling.
    fn advance(&mut self, ctx: &egui::Context) {
        match self.phase {
            Phase::Onboarding => {
                let key_pressed = ctx.input(|i| {
                    i.events
                        .iter()
                        .any(|e| matches!(e, egui::Event::Key { pressed: true, .. }))
                });
                if key_pressed {
                    self.dispatch(LifecycleEvent::KeyPressed, ctx);
                }
            }
            Phase::Loading => {
                let ready = self
                    .endpoints
                    .as_ref()
                    .is_some_and(|e| e.worker.is_ready());
                if ready {
                    if self.start_stream() {
                        self.dispatch(LifecycleEvent::ModelReadyStreamStarted, ctx);
                    } else {
                        error!("could not start audio input; exiting");
                        self.dispatch(LifecycleEvent::StreamStartFailed, ctx);
                    }
                }
            }
            Phase::Running => self.poll_fragment(),
            Phase::Finished => {}
        }
    }

    /// Build and start the cpal input stream.  Returns `false` when there is
    /// no device or the platform refuses the stream.
    fn start_stream(&mut self) -> bool {
        let Some(capture) = &self.capture else {
            error!("no audio input device available");
            return false;
        };
        let Some(endpoints) = &self.endpoints else {
            return false;
        };
        match capture.start(endpoints.raw_tx.clone()) {
            Ok(stream) => {
                info!(
                    "capture stream started ({} Hz, {} ch)",
                    capture.sample_rate(),
                    capture.channels()
                );
                self.stream = Some(stream);
                true
            }
            Err(e) => {
                error!("failed to start capture stream: {e}");
                false
            }
        }
    }

    /// Ingest at most one transcript fragment per frame.
    fn poll_fragment(&mut self) {
        let Some(endpoints) = &self.endpoints else {
            return;
        };
        if let Ok(QueueItem::Item(fragment)) = endpoints.text_rx.try_recv() {
            self.ingest_fragment(&fragment.text);
        }
    }

    /// Count, classify and append one fragment.
    fn ingest_fragment(&mut self, text: &str) {
        self.counters.add_chars(text.chars().count());
        let chunk = self.classifier.classify_fragment(text);
        self.transcript.push(chunk);
    }

    // ── Drawing ──────────────────────────────────────────────────────────

    fn draw_onboarding(&self, ui: &egui::Ui) {
        let geometry = self.geometry();
        let painter = ui.painter();
        painter.text(
            egui::pos2(geometry.surface_width / 2.0, geometry.surface_height / 2.0),
            egui::Align2::CENTER_CENTER,
            "Speak your feelings out loud.\nPress any key to begin.",
            self.font_id.clone(),
            egui::Color32::DARK_GRAY,
        );
    }

    fn draw_loading(&self, ui: &egui::Ui) {
        let geometry = self.geometry();
        let painter = ui.painter();
        painter.text(
            egui::pos2(geometry.surface_width / 2.0, geometry.surface_height / 2.0),
            egui::Align2::CENTER_CENTER,
            "Loading transcription model…",
            self.font_id.clone(),
            egui::Color32::DARK_GRAY,
        );
    }

    /// The person figure in the centre: a circle whose gray level tracks the
    /// lightness counter, dark at the start and white at the release target.
    fn draw_person(&self, painter: &egui::Painter) {
        let geometry = self.geometry();
        let center = egui::pos2(
            geometry.surface_width / 2.0,
            geometry.surface_height / 2.0 - 50.0,
        );
        let level = (self.counters.lightness_level() * 255.0) as u8;
        painter.circle(
            center,
            PERSON_RADIUS,
            egui::Color32::from_gray(level),
            egui::Stroke::new(2.0, egui::Color32::DARK_GRAY),
        );
    }

    fn draw_transcript(&self, painter: &egui::Painter, layout: &LayoutResult) {
        for placement in &layout.placements {
            painter.text(
                egui::pos2(placement.x, placement.y),
                egui::Align2::LEFT_TOP,
                &placement.word,
                self.font_id.clone(),
                placement.color,
            );
        }
    }

    fn draw_status(&self, painter: &egui::Painter) {
        let geometry = self.geometry();
        if self.phase == Phase::Running {
            painter.text(
                egui::pos2(geometry.margin, geometry.surface_height - geometry.margin / 2.0),
                egui::Align2::LEFT_CENTER,
                "Recording in progress",
                egui::FontId::proportional(14.0),
                RECORDING_NOTICE,
            );
        }
        let degraded = self
            .endpoints
            .as_ref()
            .is_some_and(|e| e.worker.is_degraded());
        if degraded {
            painter.text(
                egui::pos2(geometry.surface_width / 2.0, geometry.margin / 2.0),
                egui::Align2::CENTER_CENTER,
                "Transcription unavailable — model failed to load",
                egui::FontId::proportional(14.0),
                RECORDING_NOTICE,
            );
        }
    }

    /// Pause / Resume / Save Snapshot controls, anchored bottom-right.
    fn draw_controls(&mut self, ctx: &egui::Context) {
        let phase = self.phase;
        let overflowed = self.overflowed;
        let mut pause = false;
        let mut resume = false;
        let mut save = false;

        egui::Area::new(egui::Id::new("session-controls"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match phase {
                        Phase::Running => {
                            pause = ui.button("Pause Recording").clicked();
                        }
                        Phase::Finished => {
                            save = ui.button("Save Snapshot").clicked();
                            if !overflowed {
                                resume = ui.button("Resume").clicked();
                            }
                        }
                        _ => {}
                    }
                });
            });

        if pause {
            self.dispatch(LifecycleEvent::Pause, ctx);
        }
        if resume {
            self.dispatch(LifecycleEvent::Resume, ctx);
        }
        if save {
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
        }
    }

    /// Write out any screenshot egui delivered this frame.
    fn handle_screenshots(&self, ctx: &egui::Context) {
        let frames: Vec<Arc<egui::ColorImage>> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Screenshot { image, .. } => Some(Arc::clone(image)),
                    _ => None,
                })
                .collect()
        });
        for frame in frames {
            let now = chrono::Local::now();
            match snapshot::save_snapshot(frame.as_ref(), &self.snapshots_dir, &now) {
                Ok(path) => info!("journal snapshot written to {}", path.display()),
                Err(e) => error!("snapshot failed: {e:#}"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for EchoJournalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Input and pipeline polling ------------------------------------
        self.advance(ctx);
        self.handle_screenshots(ctx);

        // --- Layout (recomputed from scratch every frame) ------------------
        let layout = {
            let metrics = UiFontMetrics {
                ctx,
                font_id: self.font_id.clone(),
            };
            layout_transcript(self.transcript.chunks(), &self.geometry(), &metrics)
        };
        if layout.overflow && self.phase == Phase::Running {
            warn!("transcript filled both columns; ending session");
            self.overflowed = true;
            self.dispatch(LifecycleEvent::Overflow, ctx);
        }

        // --- Paint ---------------------------------------------------------
        let frame = egui::Frame::new().fill(BACKGROUND);
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            match self.phase {
                Phase::Onboarding => self.draw_onboarding(ui),
                Phase::Loading => self.draw_loading(ui),
                Phase::Running | Phase::Finished => {
                    let painter = ui.painter();
                    self.draw_person(painter);
                    self.draw_transcript(painter, &layout);
                    self.draw_status(painter);
                }
            }
        });
        self.draw_controls(ctx);

        // --- Repaint cadence -----------------------------------------------
        let cadence = match self.phase {
            Phase::Running | Phase::Loading => LIVE_REPAINT,
            Phase::Onboarding | Phase::Finished => IDLE_REPAINT,
        };
        ctx.request_repaint_after(cadence);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Echo Journal closing");
        self.shutdown_pipeline();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{color_for_tag, Lexicon, DEFAULT_TEXT_COLOR};
    use crate::pipeline::{bounded_queue, spawn_worker};
    use crate::stt::{MockSttEngine, SttEngine};
    use std::collections::HashMap;

    fn test_classifier() -> EmotionClassifier {
        let mut map = HashMap::new();
        map.insert("happy".to_string(), vec!["joy".to_string()]);
        EmotionClassifier::new(Lexicon::from_map(map))
    }

    fn test_app() -> EchoJournalApp {
        let (chunk_tx, chunk_rx) = bounded_queue(4);
        let (text_tx, text_rx) = bounded_queue(4);
        let worker = spawn_worker(
            || Ok(Box::new(MockSttEngine::ok("unused")) as Box<dyn SttEngine>),
            chunk_rx,
            text_tx,
        )
        .expect("spawn worker");
        let (raw_tx, _raw_rx) = mpsc::channel();

        EchoJournalApp::new(
            AppConfig::default(),
            test_classifier(),
            PipelineEndpoints {
                chunk_tx,
                text_rx,
                worker,
                recording: Arc::new(AtomicBool::new(false)),
                raw_tx,
            },
            None,
            std::env::temp_dir(),
        )
    }

    #[test]
    fn starts_in_onboarding_with_empty_session() {
        let mut app = test_app();
        assert_eq!(app.phase, Phase::Onboarding);
        assert!(app.transcript.is_empty());
        assert_eq!(app.counters.total_chars(), 0);
        app.shutdown_pipeline();
    }

    #[test]
    fn ingest_counts_chars_and_classifies_words() {
        let mut app = test_app();

        app.ingest_fragment("I am happy");

        assert_eq!(app.counters.total_chars(), 10);
        assert_eq!(app.transcript.len(), 1);
        let words = &app.transcript.chunks()[0].words;
        assert_eq!(words[0].color, DEFAULT_TEXT_COLOR);
        assert_eq!(words[2].color, color_for_tag("joy").unwrap());
        app.shutdown_pipeline();
    }

    #[test]
    fn silent_fragment_counts_chars_but_adds_no_chunk() {
        let mut app = test_app();
        app.ingest_fragment("   ");
        assert_eq!(app.counters.total_chars(), 3);
        assert!(app.transcript.is_empty());
        app.shutdown_pipeline();
    }

    #[test]
    fn lightness_accumulates_across_fragments() {
        let mut app = test_app();
        // target_chars defaults to 500; 250 chars → level 0.5
        app.ingest_fragment(&"x".repeat(150));
        app.ingest_fragment(&"y".repeat(100));
        assert!((app.counters.lightness_level() - 0.5).abs() < 1e-6);
        app.shutdown_pipeline();
    }

    #[test]
    fn shutdown_is_idempotent_and_joins_the_worker() {
        let mut app = test_app();
        app.shutdown_pipeline();
        assert!(app.endpoints.is_none());
        app.shutdown_pipeline(); // second call is a no-op
    }

    #[test]
    fn geometry_comes_from_config() {
        let app = test_app();
        let g = app.geometry();
        assert_eq!(g.surface_width, 1200.0);
        assert_eq!(g.surface_height, 800.0);
        assert_eq!(g.margin, 40.0);
        assert_eq!(g.person_area_width, 250.0);
        // (1200 - 250 - 80) / 2
        assert_eq!(g.column_width(), 435.0);
    }
}
