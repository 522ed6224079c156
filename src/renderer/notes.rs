//! Note glyph placement.

use crate::glyphs::ImageHandle;
use crate::model::NoteDuration;
use super::constants::*;
use super::staff::line_y;
use super::surface::{Element, NotationSurface};

/// Draw `image` scaled to the note width, its bottom resting half a row
/// below the given staff line.
pub(super) fn render_note_glyph(
    surface: &mut NotationSurface,
    x: f64,
    line: f64,
    duration: NoteDuration,
    image: ImageHandle,
) {
    let width = NOTE_WIDTH;
    let height = image.natural_height as f64 * (width / image.natural_width as f64);
    let y = line_y(line) - (height - (0.5 * NOTE_HEIGHT).ceil());
    surface.elements.push(Element::Glyph {
        x,
        y,
        width,
        height,
        duration,
        image,
    });
}
