//! Word → display-color classification.
//!
//! [`EmotionClassifier`] resolves each transcribed word to a color through
//! the lexicon: the word's **first** affect tag is looked up in the fixed
//! [`EMOTION_COLORS`] table.  An unmapped word, or a first tag missing from
//! the table, falls back to [`DEFAULT_TEXT_COLOR`] — even when a later tag
//! would have matched.  This first-tag-wins rule is load-bearing for
//! existing journals and must not be "improved".
//!
//! Classification is pure: the same word against the same lexicon always
//! yields the same color, independent of call order.

use egui::Color32;

use crate::session::{TextChunk, WordToken};

use super::lexicon::Lexicon;

// ---------------------------------------------------------------------------
// Color table
// ---------------------------------------------------------------------------

/// Fallback color for words without a usable affect tag.
pub const DEFAULT_TEXT_COLOR: Color32 = Color32::BLACK;

/// Affect tag → display color, in fixed priority order.
///
/// Specific emotions come before the general positive/negative sentiments.
pub const EMOTION_COLORS: &[(&str, Color32)] = &[
    ("fear", Color32::from_rgb(100, 149, 237)),         // medium blue
    ("anger", Color32::from_rgb(220, 20, 60)),          // crimson red
    ("sadness", Color32::from_rgb(119, 136, 153)),      // slate gray
    ("disgust", Color32::from_rgb(107, 142, 35)),       // olive drab
    ("joy", Color32::from_rgb(255, 165, 0)),            // orange
    ("surprise", Color32::from_rgb(255, 215, 0)),       // gold
    ("trust", Color32::from_rgb(255, 182, 193)),        // light pink
    ("anticipation", Color32::from_rgb(144, 238, 144)), // light green
    ("positive", Color32::from_rgb(60, 179, 113)),      // medium sea green
    ("negative", Color32::from_rgb(169, 169, 169)),     // dark gray
];

/// The display color for an affect tag, or `None` when the tag is not in
/// the table.
pub fn color_for_tag(tag: &str) -> Option<Color32> {
    EMOTION_COLORS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, color)| *color)
}

// ---------------------------------------------------------------------------
// EmotionClassifier
// ---------------------------------------------------------------------------

/// Resolves words to display colors through a read-only [`Lexicon`].
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    lexicon: Lexicon,
}

impl EmotionClassifier {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// The display color for `word`.
    ///
    /// First affect tag wins: only the first tag of the lexicon entry is
    /// consulted, and a miss in the color table falls back to
    /// [`DEFAULT_TEXT_COLOR`].
    pub fn color_for(&self, word: &str) -> Color32 {
        self.lexicon
            .affects(word)
            .and_then(|tags| tags.first())
            .and_then(|tag| color_for_tag(tag))
            .unwrap_or(DEFAULT_TEXT_COLOR)
    }

    /// Split a transcript fragment on whitespace and classify every word.
    ///
    /// Words keep their original casing and punctuation; only the lexicon
    /// lookup is case-insensitive.
    pub fn classify_fragment(&self, text: &str) -> TextChunk {
        let words = text
            .split_whitespace()
            .map(|word| WordToken {
                word: word.to_string(),
                color: self.color_for(word),
            })
            .collect();
        TextChunk { words }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
