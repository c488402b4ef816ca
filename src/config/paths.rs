//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings + lexicon):
//!   Windows: %APPDATA%\echo-journal\
//!   macOS:   ~/Library/Application Support/echo-journal/
//!   Linux:   ~/.config/echo-journal/
//!
//! Data dir (models + snapshots):
//!   Windows: %LOCALAPPDATA%\echo-journal\
//!   macOS:   ~/Library/Application Support/echo-journal/
//!   Linux:   ~/.local/share/echo-journal/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `lexicon.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the emotion lexicon (`lexicon.json`).
    pub lexicon_file: PathBuf,
    /// Directory for downloaded GGML model files.
    pub models_dir: PathBuf,
    /// Directory where journal snapshots are written.
    pub snapshots_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "echo-journal";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let lexicon_file = config_dir.join("lexicon.json");
        let models_dir = data_dir.join("models");
        let snapshots_dir = data_dir.join("snapshots");

        Self {
            config_dir,
            settings_file,
            lexicon_file,
            models_dir,
            snapshots_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
