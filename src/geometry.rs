//! Geographic input types handed to the monitor by the tessellator.

use crate::foundation::error::{MonitorError, MonitorResult};

/// A single `(longitude, latitude)` pair.
///
/// Serialized as a two-element array `[lon, lat]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lon, p.lat]
    }
}

/// Axis-aligned geographic bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    fn of(points: &[GeoPoint]) -> Self {
        let mut b = Self {
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
        };
        for p in points {
            b.min_lon = b.min_lon.min(p.lon);
            b.max_lon = b.max_lon.max(p.lon);
            b.min_lat = b.min_lat.min(p.lat);
            b.max_lat = b.max_lat.max(p.lat);
        }
        b
    }

    pub fn lon_range(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_range(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

/// A closed ring of vertices plus zero or more holes.
///
/// The last vertex is implicitly connected back to the first. Bounds are computed from the
/// ring alone when the polygon is built and never change afterwards; holes do not widen them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "PolygonRepr", into = "PolygonRepr")]
pub struct Polygon {
    ring: Vec<GeoPoint>,
    holes: Vec<Polygon>,
    bounds: GeoBounds,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PolygonRepr {
    ring: Vec<GeoPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    holes: Vec<PolygonRepr>,
}

impl Polygon {
    pub fn new(ring: Vec<GeoPoint>, holes: Vec<Polygon>) -> MonitorResult<Self> {
        if ring.len() < 3 {
            return Err(MonitorError::validation(format!(
                "polygon ring needs at least 3 vertices, got {}",
                ring.len()
            )));
        }
        if let Some(p) = ring.iter().find(|p| !p.is_finite()) {
            return Err(MonitorError::validation(format!(
                "polygon vertex ({}, {}) is not finite",
                p.lon, p.lat
            )));
        }
        let bounds = GeoBounds::of(&ring);
        Ok(Self {
            ring,
            holes,
            bounds,
        })
    }

    /// Convenience for a hole-less polygon given as `(lon, lat)` tuples.
    pub fn from_lon_lat(coords: &[(f64, f64)]) -> MonitorResult<Self> {
        Self::new(
            coords
                .iter()
                .map(|&(lon, lat)| GeoPoint::new(lon, lat))
                .collect(),
            Vec::new(),
        )
    }

    pub fn with_holes(self, holes: Vec<Polygon>) -> Self {
        Self { holes, ..self }
    }

    pub fn ring(&self) -> &[GeoPoint] {
        &self.ring
    }

    pub fn holes(&self) -> &[Polygon] {
        &self.holes
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }
}

impl TryFrom<PolygonRepr> for Polygon {
    type Error = MonitorError;

    fn try_from(repr: PolygonRepr) -> Result<Self, Self::Error> {
        let holes = repr
            .holes
            .into_iter()
            .map(Polygon::try_from)
            .collect::<MonitorResult<Vec<_>>>()?;
        Polygon::new(repr.ring, holes)
    }
}

impl From<Polygon> for PolygonRepr {
    fn from(p: Polygon) -> Self {
        Self {
            ring: p.ring,
            holes: p.holes.into_iter().map(PolygonRepr::from).collect(),
        }
    }
}

/// One output triangle of the tessellator.
///
/// `edge_from_polygon[i]` tells whether edge `i -> (i + 1) % 3` lies on the original polygon
/// boundary rather than being an internal diagonal.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Triangle {
    pub vertices: [GeoPoint; 3],
    #[serde(default)]
    pub edge_from_polygon: [bool; 3],
}

impl Triangle {
    pub fn new(a: GeoPoint, b: GeoPoint, c: GeoPoint) -> Self {
        Self {
            vertices: [a, b, c],
            edge_from_polygon: [false; 3],
        }
    }

    pub fn with_polygon_edges(self, edge_from_polygon: [bool; 3]) -> Self {
        Self {
            edge_from_polygon,
            ..self
        }
    }
}
