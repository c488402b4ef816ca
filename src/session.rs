//! Session transcript and counters.
//!
//! Everything in this module is owned exclusively by the render thread.
//! [`SessionTranscript`] grows by whole [`TextChunk`]s (one per transcript
//! fragment) and is never mutated otherwise; [`SessionCounters`] tracks the
//! accumulated character count that drives the lightness indicator.

use egui::Color32;

// ---------------------------------------------------------------------------
// WordToken / TextChunk
// ---------------------------------------------------------------------------

/// A word paired with its resolved display color.  Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct WordToken {
    /// The word exactly as transcribed (original casing and punctuation).
    pub word: String,
    /// Display color resolved by the emotion classifier.
    pub color: Color32,
}

/// The ordered word tokens produced from one transcript fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextChunk {
    pub words: Vec<WordToken>,
}

impl TextChunk {
    /// Returns `true` when the fragment contained no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SessionTranscript
// ---------------------------------------------------------------------------

/// Append-only sequence of [`TextChunk`]s for the current session.
///
/// There is no eviction: a session ends (layout overflow → Finished) long
/// before the retained history becomes a memory concern.
#[derive(Debug, Default)]
pub struct SessionTranscript {
    chunks: Vec<TextChunk>,
}

impl SessionTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk.  Empty chunks are ignored so the layout never
    /// renders a blank forced line break for a silent fragment.
    pub fn push(&mut self, chunk: TextChunk) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    /// All chunks in arrival order.
    pub fn chunks(&self) -> &[TextChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SessionCounters
// ---------------------------------------------------------------------------

/// Monotone character counter and the lightness level derived from it.
///
/// `lightness_level` maps the accumulated transcript length onto `[0, 1]`:
/// `0.0` at the start of a session, `1.0` once `target_chars` characters
/// have been transcribed ("emotional release" fully reached).
#[derive(Debug, Clone, Copy)]
pub struct SessionCounters {
    total_chars: usize,
    target_chars: usize,
}

impl SessionCounters {
    /// Create counters aiming for `target_chars` accumulated characters.
    pub fn new(target_chars: usize) -> Self {
        Self {
            total_chars: 0,
            target_chars,
        }
    }

    /// Record `n` more transcribed characters.  The total never decreases.
    pub fn add_chars(&mut self, n: usize) {
        self.total_chars = self.total_chars.saturating_add(n);
    }

    /// Total characters transcribed this session.
    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    /// `clamp(total_chars / target_chars, 0.0, 1.0)`.
    ///
    /// A zero target is treated as already reached.
    pub fn lightness_level(&self) -> f32 {
        if self.target_chars == 0 {
            return 1.0;
        }
        (self.total_chars as f32 / self.target_chars as f32).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn token(word: &str) -> WordToken {
        WordToken {
            word: word.into(),
            color: Color32::BLACK,
        }
    }

    // ---- SessionTranscript -------------------------------------------------

    #[test]
    fn transcript_appends_in_order() {
        let mut transcript = SessionTranscript::new();
        transcript.push(TextChunk {
            words: vec![token("first")],
        });
        transcript.push(TextChunk {
            words: vec![token("second")],
        });

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.chunks()[0].words[0].word, "first");
        assert_eq!(transcript.chunks()[1].words[0].word, "second");
    }

    #[test]
    fn empty_chunks_are_not_retained() {
        let mut transcript = SessionTranscript::new();
        transcript.push(TextChunk::default());
        assert!(transcript.is_empty());
    }

    // ---- SessionCounters ---------------------------------------------------

    #[test]
    fn lightness_is_zero_at_session_start() {
        let counters = SessionCounters::new(500);
        assert_eq!(counters.total_chars(), 0);
        assert!((counters.lightness_level() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn half_target_gives_half_lightness() {
        // target 500, 250 chars transcribed → 0.5
        let mut counters = SessionCounters::new(500);
        counters.add_chars(100);
        counters.add_chars(150);
        assert!((counters.lightness_level() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn lightness_clamps_at_one() {
        let mut counters = SessionCounters::new(100);
        counters.add_chars(250);
        assert!((counters.lightness_level() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn total_chars_is_monotone_non_decreasing() {
        let mut counters = SessionCounters::new(500);
        let mut last = 0;
        for n in [3, 0, 17, 1, 0, 42] {
            counters.add_chars(n);
            assert!(counters.total_chars() >= last);
            last = counters.total_chars();
        }
        assert_eq!(last, 63);
    }

    #[test]
    fn zero_target_is_treated_as_reached() {
        let counters = SessionCounters::new(0);
        assert!((counters.lightness_level() - 1.0).abs() < f32::EPSILON);
    }
}
