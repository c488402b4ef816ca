//! PNG snapshots of the journal surface.
//!
//! The app requests a viewport screenshot from egui; once the frame arrives
//! as a `ColorImage` it is written out as
//! `EchoJournal_YYYYMMDD_HHMMSS.png` in the snapshot directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::info;

/// File name for a snapshot taken at `timestamp`.
pub fn snapshot_filename(timestamp: &DateTime<Local>) -> String {
    format!("EchoJournal_{}.png", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Write `frame` to `dir` as a timestamped PNG and return its path.
///
/// The directory is created if missing.
pub fn save_snapshot(
    frame: &egui::ColorImage,
    dir: &Path,
    timestamp: &DateTime<Local>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating snapshot directory {}", dir.display()))?;

    let path = dir.join(snapshot_filename(timestamp));

    // egui stores the frame as tightly packed RGBA8.
    let width = frame.size[0] as u32;
    let height = frame.size[1] as u32;
    let bytes: Vec<u8> = frame
        .pixels
        .iter()
        .flat_map(|p| p.to_array())
        .collect();

    image::save_buffer(&path, &bytes, width, height, image::ExtendedColorType::Rgba8)
        .with_context(|| format!("writing snapshot {}", path.display()))?;

    info!("snapshot saved to {}", path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_encodes_the_timestamp() {
        let ts = Local.with_ymd_and_hms(2026, 8, 31, 14, 5, 9).unwrap();
        assert_eq!(snapshot_filename(&ts), "EchoJournal_20260831_140509.png");
    }

    #[test]
    fn save_writes_a_png_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let frame = egui::ColorImage::new([2, 2], egui::Color32::WHITE);
        let ts = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        let path = save_snapshot(&frame, dir.path(), &ts).expect("save");

        assert!(path.exists());
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "EchoJournal_20260102_030405.png"
        );
        // PNG magic bytes.
        let data = std::fs::read(&path).expect("read back");
        assert_eq!(&data[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("a").join("b");
        let frame = egui::ColorImage::new([1, 1], egui::Color32::BLACK);
        let ts = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let path = save_snapshot(&frame, &nested, &ts).expect("save");
        assert!(path.exists());
    }
}
