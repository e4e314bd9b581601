//! Drawing one complete monitor frame.
//!
//! Layers, back to front: background, outer ring and holes, triangles, split chains,
//! highlighted points, vertex labels, status caption.

use crate::{
    config::Config,
    foundation::{
        core::{FrameIndex, Point, Rgba8},
        error::{MonitorError, MonitorResult},
    },
    geometry::{GeoPoint, Polygon, Triangle},
    labels::{Label, LabelPlacer, LabelSide},
    projection::GeoProjector,
    render::{
        FrameRGBA, composite,
        text::{TextAnchor, TextItem, TextOverlay},
    },
};

pub const BACKGROUND: Rgba8 = Rgba8::rgb(0xa0, 0xd0, 0xf0);
pub const POLYGON_FILL: Rgba8 = Rgba8::rgb(0x80, 0xd0, 0xd0);

const RING_STROKE: LineStyle = LineStyle::new(Rgba8::LIGHT_GRAY, 8.0);
const TRIANGLE_STROKE: LineStyle = LineStyle::new(Rgba8::RED, 2.0);
const TRIANGLE_FILL_ALPHA: u8 = 50;
const LEFT_CHAIN: LineStyle = LineStyle::new(Rgba8::CYAN, 8.0);
const RIGHT_CHAIN: LineStyle = LineStyle::new(Rgba8::GREEN, 5.0);
const DIAGONAL_CHAIN: LineStyle = LineStyle::new(Rgba8::BLUE, 5.0);
const POINTS_CHAIN: LineStyle = LineStyle::new(Rgba8::WHITE, 2.0);

const RING_LABEL_SIZE: f32 = 14.0;
const POINT_LABEL_SIZE: f32 = 10.0;
const CAPTION_SIZE: f32 = 40.0;
const CAPTION_MIN_INSET: u32 = 6;

#[derive(Clone, Copy, Debug)]
struct LineStyle {
    color: Rgba8,
    width: f64,
}

impl LineStyle {
    const fn new(color: Rgba8, width: f64) -> Self {
        Self { color, width }
    }
}

/// Everything that varies between two frames of a run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scene<'a> {
    pub frame: FrameIndex,
    pub run_name: &'a str,
    pub status: Option<&'a str>,
    pub triangles: Option<&'a [Triangle]>,
    pub left: Option<&'a [GeoPoint]>,
    pub right: Option<&'a [GeoPoint]>,
    pub diagonal: Option<&'a [GeoPoint]>,
    pub points: Option<&'a [GeoPoint]>,
}

impl<'a> Scene<'a> {
    pub fn new(frame: FrameIndex, run_name: &'a str) -> Self {
        Self {
            frame,
            run_name,
            ..Self::default()
        }
    }

    /// Text in the bottom-right corner: `"<frame>: <run>[, <status>]"`.
    pub fn caption(&self) -> String {
        match self.status {
            Some(status) => format!("{}: {}, {}", self.frame, self.run_name, status),
            None => format!("{}: {}", self.frame, self.run_name),
        }
    }

    /// Hole numbering is meaningless while a cure or split is rewriting the rings.
    pub fn shows_hole_labels(&self) -> bool {
        !self.status.is_some_and(|s| {
            let s = s.to_ascii_uppercase();
            s.contains("CURE") || s.contains("SPLIT")
        })
    }
}

pub struct SceneRenderer {
    polygon: Polygon,
    projector: GeoProjector,
    width: u16,
    height: u16,
    margin: u32,
    labels: bool,
    placer: LabelPlacer,
    text: TextOverlay,
}

impl SceneRenderer {
    pub fn new(polygon: Polygon, config: &Config, text: TextOverlay) -> MonitorResult<Self> {
        config.validate()?;
        let width: u16 = config
            .width()
            .try_into()
            .map_err(|_| MonitorError::render("image width exceeds u16"))?;
        let height: u16 = config
            .height()
            .try_into()
            .map_err(|_| MonitorError::render("image height exceeds u16"))?;

        Ok(Self {
            projector: GeoProjector::new(polygon.bounds(), config),
            polygon,
            width,
            height,
            margin: config.margin(),
            labels: config.labels(),
            placer: LabelPlacer::default(),
            text,
        })
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn projector(&self) -> &GeoProjector {
        &self.projector
    }

    pub fn render(&self, scene: &Scene<'_>) -> MonitorResult<FrameRGBA> {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);

        ctx.set_paint(to_cpu_color(BACKGROUND));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));

        self.draw_ring(&mut ctx, &self.polygon, POLYGON_FILL);
        for hole in self.polygon.holes() {
            self.draw_ring(&mut ctx, hole, BACKGROUND);
        }

        if let Some(triangles) = scene.triangles {
            self.draw_triangles(&mut ctx, triangles);
        }
        for (chain, style) in [
            (scene.left, LEFT_CHAIN),
            (scene.right, RIGHT_CHAIN),
            (scene.diagonal, DIAGONAL_CHAIN),
            (scene.points, POINTS_CHAIN),
        ] {
            if let Some(chain) = chain {
                self.draw_chain(&mut ctx, chain, style);
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        ctx.render_to_pixmap(&mut pixmap);
        let mut data = pixmap.data_as_u8_slice().to_vec();

        let mut items: Vec<TextItem> = self
            .placer
            .place(self.collect_labels(scene))
            .iter()
            .map(label_item)
            .collect();
        items.push(self.caption_item(scene));

        let (w, h) = (u32::from(self.width), u32::from(self.height));
        if let Some(layer) = self.text.rasterize(w, h, &items)? {
            composite::over_in_place(&mut data, &layer)?;
        }

        Ok(FrameRGBA {
            width: w,
            height: h,
            data,
            premultiplied: true,
        })
    }

    /// Vertex labels for one frame, before overlap reduction.
    ///
    /// Outer ring vertices are `S0, S1, ..`, each hole's vertices `H0, H1, ..` (hidden while
    /// [`Scene::shows_hole_labels`] is false) and highlighted points are numbered from 0. Split
    /// chains are never labelled. Empty when labels are disabled.
    pub(crate) fn collect_labels(&self, scene: &Scene<'_>) -> Vec<Label> {
        let mut labels = Vec::new();
        if !self.labels {
            return labels;
        }

        self.ring_labels(&mut labels, &self.polygon, "S", LabelSide::Outer);
        if scene.shows_hole_labels() {
            for hole in self.polygon.holes() {
                self.ring_labels(&mut labels, hole, "H", LabelSide::Hole);
            }
        }

        if let Some(points) = scene.points {
            let center = (i32::from(self.width) / 2, i32::from(self.height) / 2);
            for (i, p) in points.iter().enumerate() {
                labels.push(Label::new(
                    i.to_string(),
                    self.projector.project_px(*p),
                    center,
                    LabelSide::Outer,
                    POINT_LABEL_SIZE,
                    Rgba8::WHITE,
                ));
            }
        }
        labels
    }

    fn ring_labels(
        &self,
        labels: &mut Vec<Label>,
        ring: &Polygon,
        prefix: &str,
        side: LabelSide,
    ) {
        let reference = self.projector.project_px(ring.bounds().center());
        for (i, p) in ring.ring().iter().enumerate() {
            labels.push(Label::new(
                format!("{prefix}{i}"),
                self.projector.project_px(*p),
                reference,
                side,
                RING_LABEL_SIZE,
                Rgba8::WHITE,
            ));
        }
    }

    fn draw_ring(&self, ctx: &mut vello_cpu::RenderContext, ring: &Polygon, fill: Rgba8) {
        let path = self.path_through(ring.ring(), true);
        ctx.set_paint(to_cpu_color(fill));
        ctx.fill_path(&path);
        self.stroke(ctx, &path, RING_STROKE);
    }

    fn draw_triangles(&self, ctx: &mut vello_cpu::RenderContext, triangles: &[Triangle]) {
        let fill = TRIANGLE_STROKE.color.with_alpha(TRIANGLE_FILL_ALPHA);
        for t in triangles {
            let path = self.path_through(&t.vertices, true);
            ctx.set_paint(to_cpu_color(fill));
            ctx.fill_path(&path);
            self.stroke(ctx, &path, TRIANGLE_STROKE);
        }
    }

    /// Closed polyline through `points`; a single point draws nothing.
    fn draw_chain(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        points: &[GeoPoint],
        style: LineStyle,
    ) {
        if points.len() >= 2 {
            let path = self.path_through(points, true);
            self.stroke(ctx, &path, style);
        }
    }

    fn stroke(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        path: &vello_cpu::kurbo::BezPath,
        style: LineStyle,
    ) {
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(style.width));
        ctx.set_paint(to_cpu_color(style.color));
        ctx.stroke_path(path);
    }

    fn path_through(&self, points: &[GeoPoint], close: bool) -> vello_cpu::kurbo::BezPath {
        let mut path = vello_cpu::kurbo::BezPath::new();
        for (i, p) in points.iter().enumerate() {
            let q = point_to_cpu(self.projector.project(*p));
            if i == 0 {
                path.move_to(q);
            } else {
                path.line_to(q);
            }
        }
        if close && !points.is_empty() {
            path.close_path();
        }
        path
    }

    fn caption_item(&self, scene: &Scene<'_>) -> TextItem {
        let inset = (self.margin / 2).max(CAPTION_MIN_INSET);
        TextItem {
            text: scene.caption(),
            x: f64::from(u32::from(self.width).saturating_sub(inset)),
            y: f64::from(u32::from(self.height).saturating_sub(inset)),
            size: CAPTION_SIZE,
            color: Rgba8::WHITE,
            anchor: TextAnchor::End,
        }
    }
}

fn label_item(label: &Label) -> TextItem {
    let (x, y) = label.position();
    TextItem {
        text: label.text().to_string(),
        x: f64::from(x),
        // Baseline sits below the center so the glyphs straddle it.
        y: f64::from(y) + f64::from(label.size()) * 0.35,
        size: label.size(),
        color: label.color(),
        anchor: TextAnchor::Middle,
    }
}

fn to_cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::labels::LABEL_OFFSET;

    fn renderer(config: &Config) -> SceneRenderer {
        let square =
            Polygon::from_lon_lat(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]).unwrap();
        let hole =
            Polygon::from_lon_lat(&[(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]).unwrap();
        let text = TextOverlay::new(Arc::new(usvg::fontdb::Database::new()));
        SceneRenderer::new(square.with_holes(vec![hole]), config, text).unwrap()
    }

    fn rgb(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, _] = frame.pixel(x, y).unwrap();
        [r, g, b]
    }

    fn opaque(c: Rgba8) -> [u8; 3] {
        [c.r, c.g, c.b]
    }

    #[test]
    fn caption_and_hole_label_rules() {
        let mut scene = Scene::new(FrameIndex(7), "poly");
        assert_eq!(scene.caption(), "7: poly");
        assert!(scene.shows_hole_labels());

        scene.status = Some("SPLIT polygon");
        assert_eq!(scene.caption(), "7: poly, SPLIT polygon");
        assert!(!scene.shows_hole_labels());

        scene.status = Some("cure local intersections");
        assert!(!scene.shows_hole_labels());

        scene.status = Some("earcut");
        assert!(scene.shows_hole_labels());
    }

    #[test]
    fn base_frame_layers_background_polygon_and_hole() {
        let r = renderer(&Config::new("o", 100, 100, 10));
        let frame = r.render(&Scene::new(FrameIndex(0), "sq")).unwrap();

        assert_eq!((frame.width, frame.height), (100, 100));
        assert_eq!(frame.data.len(), 100 * 100 * 4);
        assert_eq!(rgb(&frame, 2, 2), opaque(BACKGROUND));
        assert_eq!(rgb(&frame, 30, 30), opaque(POLYGON_FILL));
        // The hole (4..6 in both axes) projects to 42..58 and is filled with the background.
        assert_eq!(rgb(&frame, 50, 50), opaque(BACKGROUND));
        assert_eq!(frame.pixel(30, 30).unwrap()[3], 255);
    }

    #[test]
    fn triangles_tint_the_fill() {
        let r = renderer(&Config::new("o", 100, 100, 10));
        let tri = Triangle::new(
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(4.0, 10.0),
            GeoPoint::new(0.0, 6.0),
        );
        let triangles = [tri];
        let scene = Scene {
            triangles: Some(&triangles),
            ..Scene::new(FrameIndex(1), "sq")
        };
        let frame = r.render(&scene).unwrap();
        let px = rgb(&frame, 20, 20);
        assert_ne!(px, opaque(POLYGON_FILL));
        assert!(px[0] > POLYGON_FILL.r, "{px:?}");
        // Outside the triangle the polygon is untouched.
        assert_eq!(rgb(&frame, 70, 35), opaque(POLYGON_FILL));
    }

    #[test]
    fn split_chains_are_stroked() {
        let r = renderer(&Config::new("o", 100, 100, 10));
        let left = [GeoPoint::new(1.0, 8.0), GeoPoint::new(3.0, 8.0)];
        let scene = Scene {
            left: Some(&left),
            right: Some(&[]),
            diagonal: Some(&[]),
            ..Scene::new(FrameIndex(2), "sq")
        };
        let frame = r.render(&scene).unwrap();
        // Chain segment runs along row 26 between columns 18 and 34.
        assert_eq!(rgb(&frame, 26, 26), opaque(Rgba8::CYAN));
    }

    fn texts(labels: &[Label]) -> Vec<&str> {
        labels.iter().map(Label::text).collect()
    }

    #[test]
    fn labels_are_only_collected_when_enabled() {
        let r = renderer(&Config::new("o", 100, 100, 10));
        let points = [GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0)];
        let scene = Scene {
            points: Some(&points),
            ..Scene::new(FrameIndex(0), "sq")
        };
        assert!(r.collect_labels(&scene).is_empty());
    }

    #[test]
    fn ring_labels_push_outer_vertices_out_and_hole_vertices_in() {
        let r = renderer(&Config::new("o", 100, 100, 10).with_labels());
        let labels = r.collect_labels(&Scene::new(FrameIndex(0), "sq"));
        assert_eq!(
            texts(&labels),
            ["S0", "S1", "S2", "S3", "H0", "H1", "H2", "H3"]
        );

        // S0 is the square's lower-left corner at (10, 90).
        assert_eq!(labels[0].anchor(), (10, 90));
        assert_eq!(labels[0].offset(), (-LABEL_OFFSET, LABEL_OFFSET));
        // H0 is the hole's lower-left corner at (42, 58), pushed towards the hole center.
        assert_eq!(labels[4].anchor(), (42, 58));
        assert_eq!(labels[4].offset(), (LABEL_OFFSET, -LABEL_OFFSET));
    }

    #[test]
    fn hole_labels_are_hidden_while_curing_or_splitting() {
        let r = renderer(&Config::new("o", 100, 100, 10).with_labels());
        for status in ["SPLIT", "CURE local", "split again"] {
            let scene = Scene {
                status: Some(status),
                ..Scene::new(FrameIndex(3), "sq")
            };
            assert_eq!(texts(&r.collect_labels(&scene)), ["S0", "S1", "S2", "S3"], "{status}");
        }

        let scene = Scene {
            status: Some("EARCUT"),
            ..Scene::new(FrameIndex(3), "sq")
        };
        assert_eq!(r.collect_labels(&scene).len(), 8);
    }

    #[test]
    fn highlighted_points_are_numbered_but_split_chains_are_not() {
        let r = renderer(&Config::new("o", 100, 100, 10).with_labels());
        let chain = [GeoPoint::new(1.0, 8.0), GeoPoint::new(3.0, 8.0)];
        let points = [
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(9.0, 1.0),
            GeoPoint::new(9.0, 9.0),
        ];
        let scene = Scene {
            status: Some("SPLIT"),
            left: Some(&chain),
            right: Some(&chain),
            diagonal: Some(&chain[..1]),
            points: Some(&points),
            ..Scene::new(FrameIndex(4), "sq")
        };
        let labels = r.collect_labels(&scene);
        assert_eq!(texts(&labels), ["S0", "S1", "S2", "S3", "0", "1", "2"]);
        // Point labels are pushed away from the image center (50, 50).
        assert_eq!(labels[4].offset(), (-LABEL_OFFSET, LABEL_OFFSET));
        assert_eq!(labels[6].offset(), (LABEL_OFFSET, -LABEL_OFFSET));
    }

    #[test]
    fn far_outside_points_still_get_labels() {
        let tiny = Polygon::from_lon_lat(&[(0.0, 0.0), (1e-6, 0.0), (1e-6, 1e-6), (0.0, 1e-6)])
            .unwrap();
        let config = Config::new("o", 100, 100, 10).with_labels();
        let text = TextOverlay::new(Arc::new(usvg::fontdb::Database::new()));
        let r = SceneRenderer::new(tiny, &config, text).unwrap();
        let points = [GeoPoint::new(180.0, 0.0), GeoPoint::new(-180.0, 0.0)];
        let scene = Scene {
            points: Some(&points),
            ..Scene::new(FrameIndex(1), "tiny")
        };

        let placed = r.placer.place(r.collect_labels(&scene));
        assert_eq!(placed.len(), 6);
        let (x, _) = placed[4].position();
        assert!(x > 1_000_000, "{x}");
        assert!(r.render(&scene).is_ok());
    }
}
