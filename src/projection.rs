//! Mapping from the polygon's geographic space to image pixels.

use crate::{
    config::Config,
    foundation::core::Point,
    geometry::{GeoBounds, GeoPoint},
};

/// Largest pixel coordinate magnitude [`GeoProjector::project_px`] returns.
pub const PIXEL_LIMIT: f64 = (1 << 24) as f64;

/// Fixed geographic-to-pixel mapping for one run.
///
/// The view is derived once from the top-level polygon's bounds: `margin` pixels on every side
/// of the image correspond to geographic padding around the bounding box, so the box corners
/// land exactly on the margin band. The margin is pixel-exact: the padding is
/// `range * margin / (size - 2 * margin)`, not `range * margin / size`.
///
/// Geometry drawn later (for example split sub-polygons) is projected with the same view even
/// if it falls outside the original bounds.
///
/// The bounding box must have a positive extent on both axes; a zero-width or zero-height
/// polygon yields non-finite coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoProjector {
    width: f64,
    height: f64,
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
}

impl GeoProjector {
    pub fn new(bounds: GeoBounds, config: &Config) -> Self {
        let width = f64::from(config.width());
        let height = f64::from(config.height());
        let margin = f64::from(config.margin());

        let lon_margin = bounds.lon_range() * margin / (width - 2.0 * margin);
        let lat_margin = bounds.lat_range() * margin / (height - 2.0 * margin);

        Self {
            width,
            height,
            left: bounds.min_lon - lon_margin,
            right: bounds.max_lon + lon_margin,
            bottom: bounds.min_lat - lat_margin,
            top: bounds.max_lat + lat_margin,
        }
    }

    pub fn project_x(&self, lon: f64) -> f64 {
        (lon - self.left) / (self.right - self.left) * self.width
    }

    /// Larger latitudes map to smaller pixel rows.
    pub fn project_y(&self, lat: f64) -> f64 {
        self.height - (lat - self.bottom) / (self.top - self.bottom) * self.height
    }

    pub fn project(&self, p: GeoPoint) -> Point {
        Point::new(self.project_x(p.lon), self.project_y(p.lat))
    }

    /// Projected point snapped to the pixel grid and clamped to [`PIXEL_LIMIT`] on both axes,
    /// so label offsets can be added without overflowing.
    pub fn project_px(&self, p: GeoPoint) -> (i32, i32) {
        let q = self.project(p);
        let snap = |v: f64| v.round().clamp(-PIXEL_LIMIT, PIXEL_LIMIT) as i32;
        (snap(q.x), snap(q.y))
    }

    /// Geographic extent covered by the whole image, margin included.
    pub fn view_bounds(&self) -> GeoBounds {
        GeoBounds {
            min_lon: self.left,
            max_lon: self.right,
            min_lat: self.bottom,
            max_lat: self.top,
        }
    }
}
