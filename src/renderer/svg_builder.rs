//! SVG builder — accumulates SVG elements and produces the final string.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub(super) struct SvgBuilder {
    elements: Vec<String>,
    width: f64,
    height: f64,
}

impl SvgBuilder {
    pub(super) fn new(width: f64, height: f64) -> Self {
        Self {
            elements: Vec::new(),
            width,
            height,
        }
    }

    pub(super) fn build(self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push('\n');
        for el in &self.elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    pub(super) fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        self.elements.push(format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x, y, w, h, fill
        ));
    }

    pub(super) fn image(&mut self, x: f64, y: f64, w: f64, h: f64, mime: &str, bytes: &[u8]) {
        self.elements.push(format!(
            r#"<image x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" href="data:{};base64,{}"/>"#,
            x,
            y,
            w,
            h,
            mime,
            STANDARD.encode(bytes)
        ));
    }
}

/// Placeholder document shown when there is nothing to draw.
pub(crate) fn empty_svg() -> String {
    SvgBuilder::new(0.0, 0.0).build()
}
