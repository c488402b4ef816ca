//! Emotion classification — lexicon lookup and the fixed color table.
//!
//! ```rust
//! use std::collections::HashMap;
//! use echo_journal::emotion::{EmotionClassifier, Lexicon};
//!
//! let mut map = HashMap::new();
//! map.insert("happy".to_string(), vec!["joy".to_string()]);
//!
//! let classifier = EmotionClassifier::new(Lexicon::from_map(map));
//! let chunk = classifier.classify_fragment("I am happy");
//! assert_eq!(chunk.words.len(), 3);
//! ```

pub mod classifier;
pub mod lexicon;

pub use classifier::{color_for_tag, EmotionClassifier, DEFAULT_TEXT_COLOR, EMOTION_COLORS};
pub use lexicon::Lexicon;
