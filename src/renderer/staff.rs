//! Staff geometry: where each note name sits and the lines drawn around it.

use crate::model::NoteName;
use super::constants::*;
use super::surface::{Element, NotationSurface};

/// Staff position of a note, counted in lines from the top line (1) down to
/// the bottom line (5). Half steps fall into the space between two lines.
/// C and D sit below the bottom line and get a ledger line at their own
/// position; nothing sits above the top line.
pub fn line_position(name: NoteName) -> f64 {
    match name {
        NoteName::C => 6.0,
        NoteName::D => 5.5,
        NoteName::E => 5.0,
        NoteName::F => 4.5,
        NoteName::G => 4.0,
        NoteName::A => 3.5,
        NoteName::B => 3.0,
    }
}

/// Vertical coordinate of a (possibly fractional) line position.
pub fn line_y(line: f64) -> f64 {
    ROWS_ABOVE_STAFF as f64 * NOTE_HEIGHT + (line - 1.0) * (LINE_WIDTH + DISTANCE_BETWEEN_LINES)
}

pub(super) fn needs_ledger_line(line: f64) -> bool {
    line > NUMBER_OF_LINES as f64
}

pub(super) fn render_staff_lines(surface: &mut NotationSurface) {
    let width = surface.width as f64;
    for line in 1..=NUMBER_OF_LINES {
        surface.elements.push(Element::StaffLine {
            y: line_y(line as f64),
            width,
            thickness: LINE_WIDTH,
        });
    }
}

/// Short line through `line`, centred on a note whose box starts at `note_x`.
pub(super) fn render_ledger_line(surface: &mut NotationSurface, note_x: f64, line: f64) {
    surface.elements.push(Element::LedgerLine {
        x: note_x - LEDGER_LINE_OVERHANG,
        y: line_y(line),
        width: NOTE_WIDTH + 2.0 * LEDGER_LINE_OVERHANG,
        thickness: LINE_WIDTH,
    });
}
