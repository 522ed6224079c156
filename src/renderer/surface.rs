//! The drawing produced by one render: a sized surface and the primitives on it.

use crate::glyphs::ImageHandle;
use crate::model::NoteDuration;

use super::constants::LINE_COLOR;
use super::svg_builder::SvgBuilder;

/// One primitive drawn on a notation surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// One of the five staff lines, spanning the full surface width.
    StaffLine { y: f64, width: f64, thickness: f64 },
    /// Short line segment extending the staff under a note below it.
    LedgerLine { x: f64, y: f64, width: f64, thickness: f64 },
    /// A note glyph scaled into its box.
    Glyph {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        duration: NoteDuration,
        image: ImageHandle,
    },
}

/// A freshly drawn notation image. Every render returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct NotationSurface {
    pub width: u32,
    pub height: u32,
    pub elements: Vec<Element>,
}

impl NotationSurface {
    pub(super) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn staff_lines(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| matches!(e, Element::StaffLine { .. }))
    }

    pub fn ledger_lines(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| matches!(e, Element::LedgerLine { .. }))
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| matches!(e, Element::Glyph { .. }))
    }

    /// Serialize as a standalone SVG document. Glyph images are embedded.
    pub fn to_svg(&self) -> String {
        let mut svg = SvgBuilder::new(self.width as f64, self.height as f64);
        for element in &self.elements {
            match element {
                Element::StaffLine { y, width, thickness } => {
                    svg.rect(0.0, *y, *width, *thickness, LINE_COLOR);
                }
                Element::LedgerLine { x, y, width, thickness } => {
                    svg.rect(*x, *y, *width, *thickness, LINE_COLOR);
                }
                Element::Glyph { x, y, width, height, image, .. } => {
                    svg.image(*x, *y, *width, *height, image.mime, &image.bytes);
                }
            }
        }
        svg.build()
    }
}
