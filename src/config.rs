use std::path::{Path, PathBuf};

use crate::foundation::error::{MonitorError, MonitorResult};

pub const DEFAULT_DIR: &str = "/tmp/tessellation";
pub const DEFAULT_WIDTH: u32 = 1500;
pub const DEFAULT_HEIGHT: u32 = 1000;
pub const DEFAULT_MARGIN: u32 = 100;

/// Output and drawing settings for a monitor.
///
/// Immutable once built; `with_labels` and `make_verbose` return adjusted copies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    root: PathBuf,
    width: u32,
    height: u32,
    margin: u32,
    verbose: bool,
    labels: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DIR, DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_MARGIN)
    }
}

impl Config {
    pub fn new(root: impl Into<PathBuf>, width: u32, height: u32, margin: u32) -> Self {
        Self::with_flags(root, width, height, margin, false, false)
    }

    pub fn with_flags(
        root: impl Into<PathBuf>,
        width: u32,
        height: u32,
        margin: u32,
        verbose: bool,
        labels: bool,
    ) -> Self {
        Self {
            root: root.into(),
            width,
            height,
            margin,
            verbose,
            labels,
        }
    }

    pub fn with_labels(&self) -> Self {
        Self {
            labels: true,
            ..self.clone()
        }
    }

    pub fn make_verbose(&self) -> Self {
        Self {
            verbose: true,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> MonitorResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MonitorError::validation(
                "image width/height must be non-zero",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(MonitorError::validation(format!(
                "image size {}x{} exceeds {}x{}",
                self.width,
                self.height,
                u16::MAX,
                u16::MAX
            )));
        }
        if 2 * u64::from(self.margin) >= u64::from(self.width.min(self.height)) {
            return Err(MonitorError::validation(format!(
                "margin {} leaves no drawing area in a {}x{} image",
                self.margin, self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn labels(&self) -> bool {
        self.labels
    }
}
