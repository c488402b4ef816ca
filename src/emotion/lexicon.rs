//! Word → affect-tags lexicon.
//!
//! [`Lexicon`] is the read-only mapping behind the emotion classifier.  It is
//! loaded once at startup from a JSON object of the shape
//!
//! ```json
//! {
//!   "happy": ["joy", "positive"],
//!   "afraid": ["fear", "negative"]
//! }
//! ```
//!
//! and never mutated afterwards.  Keys are normalised to lowercase on load so
//! lookups are case-insensitive.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

/// Read-only word → ordered affect-tags mapping.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    map: HashMap<String, Vec<String>>,
}

impl Lexicon {
    /// A lexicon with no entries — every lookup misses.
    ///
    /// Used as the degraded fallback when the lexicon file cannot be loaded;
    /// the classifier then colors every word with the default text color.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a lexicon from an in-memory map (useful for tests).
    ///
    /// Keys are lowercased; tag order within each entry is preserved.
    pub fn from_map(map: HashMap<String, Vec<String>>) -> Self {
        let map = map
            .into_iter()
            .map(|(word, tags)| (word.to_lowercase(), tags))
            .collect();
        Self { map }
    }

    /// Load a lexicon from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse as a
    /// `{word: [tags…]}` object.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading lexicon file {}", path.display()))?;
        let map: HashMap<String, Vec<String>> = serde_json::from_str(&data)
            .with_context(|| format!("parsing lexicon file {}", path.display()))?;
        Ok(Self::from_map(map))
    }

    /// The ordered affect tags for `word`, or `None` when unmapped.
    ///
    /// Lookup is case-insensitive; the word is otherwise used verbatim
    /// (no punctuation stripping).
    pub fn affects(&self, word: &str) -> Option<&[String]> {
        self.map.get(&word.to_lowercase()).map(Vec::as_slice)
    }

    /// Number of words in the lexicon.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` when the lexicon has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Lexicon {
        let mut map = HashMap::new();
        map.insert("happy".to_string(), vec!["joy".to_string(), "positive".to_string()]);
        map.insert("Dread".to_string(), vec!["fear".to_string()]);
        Lexicon::from_map(map)
    }

    #[test]
    fn lookup_hits_and_preserves_tag_order() {
        let lexicon = sample();
        let tags = lexicon.affects("happy").unwrap();
        assert_eq!(tags, ["joy", "positive"]);
    }

    #[test]
    fn lookup_is_case_insensitive_both_ways() {
        let lexicon = sample();
        // Uppercase query hits a lowercase key…
        assert!(lexicon.affects("HAPPY").is_some());
        // …and a mixed-case key was normalised on load.
        assert_eq!(lexicon.affects("dread").unwrap(), ["fear"]);
    }

    #[test]
    fn unmapped_word_misses() {
        let lexicon = sample();
        assert!(lexicon.affects("table").is_none());
    }

    #[test]
    fn punctuation_is_not_stripped() {
        // "happy," is a different key than "happy" — verbatim lookup.
        let lexicon = sample();
        assert!(lexicon.affects("happy,").is_none());
    }

    #[test]
    fn empty_lexicon_always_misses() {
        let lexicon = Lexicon::empty();
        assert!(lexicon.is_empty());
        assert!(lexicon.affects("happy").is_none());
    }

    #[test]
    fn load_from_json_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("lexicon.json");
        std::fs::write(&path, r#"{"Calm": ["trust", "positive"], "angry": ["anger"]}"#)
            .expect("write lexicon");

        let lexicon = Lexicon::load_from(&path).expect("load");
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.affects("calm").unwrap(), ["trust", "positive"]);
        assert_eq!(lexicon.affects("ANGRY").unwrap(), ["anger"]);
    }

    #[test]
    fn load_missing_file_errors() {
        let result = Lexicon::load_from("/nonexistent/lexicon.json");
        assert!(result.is_err());
    }

    #[test]
    fn load_malformed_json_errors() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json at all").expect("write");
        assert!(Lexicon::load_from(&path).is_err());
    }
}
