//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for audio capture and chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate in Hz passed to Whisper (must be 16 000).
    pub sample_rate: u32,
    /// Fixed chunk duration in seconds; each chunk is transcribed as one
    /// unit.
    pub chunk_secs: f32,
    /// Capacity of the bounded chunk and fragment queues.
    pub queue_capacity: usize,
}

impl AudioConfig {
    /// Samples per chunk at the target sample rate.
    pub fn chunk_samples(&self) -> usize {
        (self.sample_rate as f32 * self.chunk_secs) as usize
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            chunk_secs: 3.0,
            queue_capacity: 16,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the Whisper STT engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    /// GGML model name / file stem (e.g. `"base.en"`).
    pub model: String,
    /// Primary speech language as an ISO-639-1 code, or `"auto"` for
    /// Whisper's built-in language detection.
    pub language: String,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "base.en".into(),
            language: "en".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window geometry and rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Fixed window width in logical points.
    pub window_width: f32,
    /// Fixed window height in logical points.
    pub window_height: f32,
    /// Margin around the drawable surface.
    pub margin: f32,
    /// Width reserved in the middle of the window for the person figure.
    pub person_area_width: f32,
    /// Transcript font size in points.
    pub font_size: f32,
    /// Accumulated character count at which the lightness indicator reaches
    /// full brightness ("release" target).
    pub target_chars: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_width: 1200.0,
            window_height: 800.0,
            margin: 40.0,
            person_area_width: 250.0,
            font_size: 18.0,
            target_chars: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// EmotionConfig
// ---------------------------------------------------------------------------

/// Settings for the emotion lexicon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Explicit lexicon file path — `None` means the default
    /// `lexicon.json` in the config directory.
    pub lexicon_file: Option<std::path::PathBuf>,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use echo_journal::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Audio capture / chunking settings.
    pub audio: AudioConfig,
    /// STT engine settings.
    pub stt: SttConfig,
    /// Window / rendering settings.
    pub ui: UiConfig,
    /// Emotion lexicon settings.
    pub emotion: EmotionConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
