//! Numbered frame files for one run.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::FrameIndex,
        error::{MonitorError, MonitorResult},
    },
    render::FrameRGBA,
};

pub const FRAME_EXTENSION: &str = "png";

/// Owns `<root>/<name>/` for the duration of a run.
#[derive(Clone, Debug)]
pub struct ImageStore {
    name: String,
    dir: PathBuf,
}

impl ImageStore {
    /// Create the run directory if needed and delete every file in it whose name starts with
    /// the run name.
    pub fn open(root: &Path, name: &str) -> MonitorResult<Self> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(MonitorError::validation(format!(
                "run name '{name}' must be a non-empty single path component"
            )));
        }

        let dir = root.join(name);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;

        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("failed to list output directory '{}'", dir.display()))?;

        let mut total = 0usize;
        let mut failed = 0usize;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to list output directory '{}'", dir.display()))?;
            if !entry.file_name().to_string_lossy().starts_with(name) {
                continue;
            }
            total += 1;
            if let Err(err) = std::fs::remove_file(entry.path()) {
                tracing::warn!(
                    path = %entry.path().display(),
                    %err,
                    "failed to delete stale frame"
                );
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(MonitorError::Reset { dir, failed, total });
        }
        tracing::debug!(dir = %dir.display(), deleted = total, "reset run directory");

        Ok(Self {
            name: name.to_string(),
            dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<name>-NNNNN.png`; indices past 99999 simply get more digits.
    pub fn file_name(&self, index: FrameIndex) -> String {
        format!("{}-{:05}.{}", self.name, index.0, FRAME_EXTENSION)
    }

    pub fn frame_path(&self, index: FrameIndex) -> PathBuf {
        self.dir.join(self.file_name(index))
    }

    pub fn save(&self, frame: &FrameRGBA, index: FrameIndex) -> MonitorResult<PathBuf> {
        let path = self.frame_path(index);
        let rgb = image::RgbImage::from_raw(frame.width, frame.height, frame.to_rgb8())
            .ok_or_else(|| {
                MonitorError::render(format!(
                    "frame buffer does not match {}x{}",
                    frame.width, frame.height
                ))
            })?;
        rgb.save_with_format(&path, image::ImageFormat::Png)
            .map_err(|source| MonitorError::Persist {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
