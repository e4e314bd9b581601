//! Text drawn on top of a frame.
//!
//! Text items are laid out as an SVG document and rasterized with `resvg` into a transparent
//! layer the size of the frame, which the scene renderer then blends over its geometry.

use std::{fmt::Write as _, sync::Arc};

use crate::foundation::{
    core::Rgba8,
    error::{MonitorError, MonitorResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// A single line of text; `(x, y)` is the baseline point the anchor refers to.
#[derive(Clone, Debug, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f32,
    pub color: Rgba8,
    pub anchor: TextAnchor,
}

#[derive(Clone)]
pub struct TextOverlay {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for TextOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextOverlay")
            .field("font_faces", &self.font_count())
            .finish()
    }
}

impl TextOverlay {
    pub fn new(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { fontdb }
    }

    pub fn with_system_fonts() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self::new(Arc::new(db))
    }

    pub fn font_count(&self) -> usize {
        self.fontdb.len()
    }

    /// Premultiplied RGBA8 layer of `width * height` pixels, or `None` when there is no text.
    pub fn rasterize(
        &self,
        width: u32,
        height: u32,
        items: &[TextItem],
    ) -> MonitorResult<Option<Vec<u8>>> {
        if items.is_empty() {
            return Ok(None);
        }

        let svg = svg_document(width, height, items);
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| MonitorError::render(format!("parse text overlay: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| MonitorError::render("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        Ok(Some(pixmap.data().to_vec()))
    }
}

pub fn svg_document(width: u32, height: u32, items: &[TextItem]) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    for item in items {
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="{:.1}" fill="{}" fill-opacity="{:.3}" text-anchor="{}">{}</text>"#,
            item.x,
            item.y,
            item.size,
            item.color.to_hex(),
            item.color.opacity(),
            item.anchor.as_svg(),
            escape_xml(&item.text),
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Escapes markup and drops characters XML 1.0 does not allow in a document.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' | '\n' | '\r' => out.push(c),
            c if c < ' ' || c == '\u{fffe}' || c == '\u{ffff}' => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Monospace);

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style: usvg::fontdb::Style::Normal,
            };

            // Any installed face beats dropping the label.
            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> TextItem {
        TextItem {
            text: text.to_string(),
            x: 10.0,
            y: 20.5,
            size: 14.0,
            color: Rgba8::WHITE,
            anchor: TextAnchor::Middle,
        }
    }

    #[test]
    fn document_escapes_markup() {
        let svg = svg_document(64, 32, &[item("a<b & \"c\"")]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("a&lt;b &amp; &quot;c&quot;"));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r##"fill="#ffffff""##));
        assert!(svg.contains(r#"x="10.0" y="20.5""#));
    }

    #[test]
    fn document_drops_characters_xml_forbids() {
        assert_eq!(escape_xml("bad\u{1}status\u{1f}"), "badstatus");
        assert_eq!(escape_xml("a\tb\u{fffe}\u{ffff}c"), "a\tbc");
        assert_eq!(escape_xml("ünïcode ✓"), "ünïcode ✓");

        let overlay = TextOverlay::new(Arc::new(usvg::fontdb::Database::new()));
        let layer = overlay
            .rasterize(16, 8, &[item("bad\u{1}status"), item("\u{0}")])
            .unwrap();
        assert!(layer.is_some());
    }

    #[test]
    fn empty_items_produce_no_layer() {
        let overlay = TextOverlay::new(Arc::new(usvg::fontdb::Database::new()));
        assert!(overlay.rasterize(8, 8, &[]).unwrap().is_none());
    }

    #[test]
    fn layer_has_frame_size_without_fonts() {
        let overlay = TextOverlay::new(Arc::new(usvg::fontdb::Database::new()));
        assert_eq!(overlay.font_count(), 0);
        let layer = overlay.rasterize(8, 4, &[item("S0")]).unwrap().unwrap();
        assert_eq!(layer.len(), 8 * 4 * 4);
    }
}
