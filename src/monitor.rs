//! The callback contract used by a tessellator and the frame-recording monitor behind it.

use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    foundation::{
        core::FrameIndex,
        error::{MonitorError, MonitorResult},
    },
    geometry::{GeoPoint, Polygon, Triangle},
    render::{
        scene::{Scene, SceneRenderer},
        text::TextOverlay,
    },
    store::ImageStore,
};

/// Frames emitted before and again after the diagonal is added in [`Monitor::start_split`].
pub const SPLIT_HOLD_FRAMES: usize = 3;

/// Progress callbacks invoked in-line by a tessellator.
///
/// A call returns only once any resulting frames are written; errors should be propagated by
/// the tessellator so that a failed run stops immediately.
pub trait Monitor {
    /// Record the current state, optionally highlighting a working point chain and the
    /// triangles produced so far.
    fn current_state(
        &mut self,
        status: Option<&str>,
        points: Option<&[GeoPoint]>,
        triangles: Option<&[Triangle]>,
    ) -> MonitorResult<()>;

    /// A polygon is about to be split into `left` and `right` along the diagonal between
    /// their first points.
    fn start_split(
        &mut self,
        status: Option<&str>,
        left: &[GeoPoint],
        right: &[GeoPoint],
    ) -> MonitorResult<()>;

    fn end_split(&mut self, status: Option<&str>) -> MonitorResult<()>;
}

impl<M: Monitor + ?Sized> Monitor for &mut M {
    fn current_state(
        &mut self,
        status: Option<&str>,
        points: Option<&[GeoPoint]>,
        triangles: Option<&[Triangle]>,
    ) -> MonitorResult<()> {
        (**self).current_state(status, points, triangles)
    }

    fn start_split(
        &mut self,
        status: Option<&str>,
        left: &[GeoPoint],
        right: &[GeoPoint],
    ) -> MonitorResult<()> {
        (**self).start_split(status, left, right)
    }

    fn end_split(&mut self, status: Option<&str>) -> MonitorResult<()> {
        (**self).end_split(status)
    }
}

/// Point chains shown while a split is in progress.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitChains {
    pub left: Vec<GeoPoint>,
    pub right: Vec<GeoPoint>,
    pub diagonal: Vec<GeoPoint>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SplitState {
    #[default]
    Idle,
    Splitting(SplitChains),
}

impl SplitState {
    pub fn chains(&self) -> Option<&SplitChains> {
        match self {
            Self::Idle => None,
            Self::Splitting(chains) => Some(chains),
        }
    }
}

/// Renders and stores one frame per observed tessellator state.
///
/// Frame 0 (the bare polygon) is written by [`TriangulationMonitor::new`]; every later frame
/// index is exactly one more than the previous one.
pub struct TriangulationMonitor {
    config: Config,
    renderer: SceneRenderer,
    store: ImageStore,
    next_frame: FrameIndex,
    split: SplitState,
}

impl TriangulationMonitor {
    pub fn new(name: &str, polygon: Polygon, config: &Config) -> MonitorResult<Self> {
        Self::with_text_overlay(name, polygon, config, TextOverlay::with_system_fonts())
    }

    /// Like [`TriangulationMonitor::new`] with a caller-supplied font set, so several runs can
    /// share one font database.
    pub fn with_text_overlay(
        name: &str,
        polygon: Polygon,
        config: &Config,
        text: TextOverlay,
    ) -> MonitorResult<Self> {
        let renderer = SceneRenderer::new(polygon, config, text)?;
        let store = ImageStore::open(config.root(), name)?;
        let mut monitor = Self {
            config: config.clone(),
            renderer,
            store,
            next_frame: FrameIndex(0),
            split: SplitState::Idle,
        };
        monitor.current_state(None, None, None)?;
        Ok(monitor)
    }

    pub fn name(&self) -> &str {
        self.store.name()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn polygon(&self) -> &Polygon {
        self.renderer.polygon()
    }

    pub fn run_dir(&self) -> &Path {
        self.store.dir()
    }

    /// Number of frames written so far, which is also the index of the next one.
    pub fn frames_written(&self) -> u64 {
        self.next_frame.0
    }

    pub fn split_state(&self) -> &SplitState {
        &self.split
    }

    pub fn is_splitting(&self) -> bool {
        matches!(self.split, SplitState::Splitting(_))
    }

    fn emit(
        &mut self,
        status: Option<&str>,
        points: Option<&[GeoPoint]>,
        triangles: Option<&[Triangle]>,
    ) -> MonitorResult<PathBuf> {
        let index = self.next_frame;
        let chains = self.split.chains();
        let scene = Scene {
            frame: index,
            run_name: self.store.name(),
            status,
            triangles,
            left: chains.map(|c| c.left.as_slice()),
            right: chains.map(|c| c.right.as_slice()),
            diagonal: chains.map(|c| c.diagonal.as_slice()),
            points,
        };
        let path = self.store.frame_path(index);
        if self.config.verbose() {
            tracing::info!(path = %path.display(), "saving image");
        } else {
            tracing::debug!(path = %path.display(), "saving image");
        }

        let frame = self.renderer.render(&scene)?;
        let path = self.store.save(&frame, index)?;
        self.next_frame = index.next();
        Ok(path)
    }

    fn hold(&mut self, status: Option<&str>) -> MonitorResult<()> {
        for _ in 0..SPLIT_HOLD_FRAMES {
            self.emit(status, None, None)?;
        }
        Ok(())
    }
}

impl Monitor for TriangulationMonitor {
    fn current_state(
        &mut self,
        status: Option<&str>,
        points: Option<&[GeoPoint]>,
        triangles: Option<&[Triangle]>,
    ) -> MonitorResult<()> {
        self.emit(status, points, triangles).map(|_| ())
    }

    fn start_split(
        &mut self,
        status: Option<&str>,
        left: &[GeoPoint],
        right: &[GeoPoint],
    ) -> MonitorResult<()> {
        if self.is_splitting() {
            return Err(MonitorError::state(
                "start_split called while a split is already active",
            ));
        }
        let (Some(&left_first), Some(&right_first)) = (left.first(), right.first()) else {
            return Err(MonitorError::validation(format!(
                "split chains must not be empty (left: {}, right: {})",
                left.len(),
                right.len()
            )));
        };
        tracing::debug!(
            run = self.store.name(),
            left = left.len(),
            right = right.len(),
            "start split"
        );

        self.split = SplitState::Splitting(SplitChains {
            left: left.to_vec(),
            right: right.to_vec(),
            diagonal: Vec::new(),
        });
        self.hold(status)?;

        if let SplitState::Splitting(chains) = &mut self.split {
            chains.diagonal.extend([left_first, right_first]);
        }
        self.hold(status)
    }

    fn end_split(&mut self, _status: Option<&str>) -> MonitorResult<()> {
        if !self.is_splitting() {
            return Err(MonitorError::state("end_split called without an active split"));
        }
        tracing::debug!(run = self.store.name(), "end split");
        self.split = SplitState::Idle;
        Ok(())
    }
}
