//! Frame-by-frame recorder for polygon tessellation.
//!
//! A tessellator reports its progress through the [`Monitor`] callbacks; the
//! [`TriangulationMonitor`] turns every reported state into one numbered PNG so the run can be
//! replayed as a video.
//!
//! # Pipeline overview
//!
//! 1. **Observe**: `Monitor` callback -> lifecycle update (idle / splitting)
//! 2. **Render**: `Scene -> FrameRGBA` (polygon, triangles, split chains, labels, caption)
//! 3. **Store**: `FrameRGBA -> <root>/<run>/<run>-NNNNN.png`
//!
//! The projection from longitude/latitude to pixels is fixed by the first polygon of a run and
//! reused for every frame, so consecutive frames line up when played back.
//!
//! Runs can also be captured with a [`TraceRecorder`] and rendered later from a [`Trace`].
#![forbid(unsafe_code)]

mod config;
mod foundation;
mod geometry;
mod labels;
mod monitor;
mod projection;
mod render;
mod store;
mod trace;

pub use config::{Config, DEFAULT_DIR, DEFAULT_HEIGHT, DEFAULT_MARGIN, DEFAULT_WIDTH};
pub use foundation::core::{FrameIndex, Point, Rgba8};
pub use foundation::error::{MonitorError, MonitorResult};
pub use geometry::{GeoBounds, GeoPoint, Polygon, Triangle};
pub use labels::{DEFAULT_MIN_DISTANCE, LABEL_OFFSET, Label, LabelPlacer, LabelSide};
pub use monitor::{Monitor, SPLIT_HOLD_FRAMES, SplitChains, SplitState, TriangulationMonitor};
pub use projection::GeoProjector;
pub use render::FrameRGBA;
pub use render::scene::{BACKGROUND, POLYGON_FILL, Scene, SceneRenderer};
pub use render::text::{TextAnchor, TextItem, TextOverlay};
pub use store::{FRAME_EXTENSION, ImageStore};
pub use trace::{MonitorEvent, Trace, TraceRecorder, TraceRun};
