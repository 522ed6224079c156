//! pianotutor — a MIDI keyboard piano tutor.
//!
//! Shows one note of a melody at a time, as a letter and as staff notation,
//! and moves on when that note is played on a connected MIDI keyboard.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use pianotutor::{
//!     FileDisplay, FileImageLoader, NotationRenderer, NoteGlyphCache, PianoLearningProgram,
//! };
//!
//! # async fn example() -> Result<(), pianotutor::ResourceLoadError> {
//! let glyphs = Arc::new(NoteGlyphCache::new(FileImageLoader::new("images/notes")));
//! let renderer = NotationRenderer::new(glyphs);
//! let mut program = PianoLearningProgram::with_default_melody(renderer, FileDisplay::new("notation.svg"));
//!
//! program.render_current().await?;
//! program.on_midi_message(&[0x90, 48, 100]).await?; // C
//! assert_eq!(program.cursor(), 1);
//! # Ok(())
//! # }
//! ```

pub mod display;
pub mod error;
pub mod glyphs;
pub mod midi;
pub mod model;
pub mod pitch;
pub mod program;
pub mod renderer;

pub use display::{Display, FileDisplay, MemoryDisplay};
pub use error::{Error, MidiError, PitchTableError, ResourceLoadError, Result};
pub use glyphs::{FileImageLoader, GlyphImage, ImageHandle, ImageLoader, NoteGlyphCache};
pub use midi::{forward_to, MidiInput, MidiMessage, SubscriptionHandle, VirtualMidiInput, NOTE_ON};
pub use model::*;
pub use pitch::PitchTable;
pub use program::{snapshot_to_json, PianoLearningProgram, Progress, ProgressSnapshot};
pub use renderer::{NotationRenderer, NotationSurface};

/// Render a sequence of notes straight to an SVG document.
/// Convenience function combining glyph loading and rendering.
pub async fn render_to_svg<L: ImageLoader>(
    glyphs: std::sync::Arc<NoteGlyphCache<L>>,
    events: &[MelodyEvent],
) -> Result<String, ResourceLoadError> {
    let surface = NotationRenderer::new(glyphs).render(events).await?;
    Ok(surface.to_svg())
}
