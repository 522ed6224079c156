//! Notation renderer — draws a short run of melody notes on a staff.
//!
//! The staff is five lines with three empty rows of padding above and below.
//! Notes are placed left to right at a fixed advance; a note below the staff
//! gets a short ledger line under it. Each render produces a new
//! [`NotationSurface`] which can be exported as SVG.

mod constants;
mod notes;
mod staff;
mod surface;
mod svg_builder;

use std::sync::Arc;

use crate::error::ResourceLoadError;
use crate::glyphs::{ImageLoader, NoteGlyphCache};
use crate::model::MelodyEvent;
use constants::*;
use notes::render_note_glyph;
use staff::{needs_ledger_line, render_ledger_line, render_staff_lines};

pub use staff::{line_position, line_y};
pub use surface::{Element, NotationSurface};
pub(crate) use svg_builder::empty_svg;

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Width of a surface holding `note_count` notes.
pub fn surface_width(note_count: usize) -> u32 {
    let width = FIRST_NOTE_OFFSET
        + LAST_NOTE_SPACE_RIGHT
        + note_count as f64 * NOTE_WIDTH
        + note_count.saturating_sub(1) as f64 * NOTE_SPACE;
    width as u32
}

/// Height of every surface: the five staff rows plus padding rows.
pub fn surface_height() -> u32 {
    let rows = ROWS_ABOVE_STAFF + NUMBER_OF_LINES + ROWS_BELOW_STAFF;
    (rows as f64 * NOTE_HEIGHT) as u32
}

/// Renders melody events using glyphs from a shared [`NoteGlyphCache`].
pub struct NotationRenderer<L> {
    glyphs: Arc<NoteGlyphCache<L>>,
}

impl<L: ImageLoader> NotationRenderer<L> {
    pub fn new(glyphs: Arc<NoteGlyphCache<L>>) -> Self {
        Self { glyphs }
    }

    pub fn glyph_cache(&self) -> &Arc<NoteGlyphCache<L>> {
        &self.glyphs
    }

    /// Draw `events` in order. The glyph cache is populated on the first
    /// render that has a note to draw; a load failure is returned as is.
    pub async fn render(&self, events: &[MelodyEvent]) -> Result<NotationSurface, ResourceLoadError> {
        let mut surface = NotationSurface::new(surface_width(events.len()), surface_height());
        render_staff_lines(&mut surface);

        if events.is_empty() {
            return Ok(surface);
        }

        let glyphs = self.glyphs.glyphs().await?;
        let mut x = FIRST_NOTE_OFFSET;
        for event in events {
            let line = line_position(event.name);
            if needs_ledger_line(line) {
                render_ledger_line(&mut surface, x, line);
            }
            render_note_glyph(&mut surface, x, line, event.duration, glyphs.get(event.duration).clone());
            x += NOTE_SPACE;
        }

        Ok(surface)
    }
}
