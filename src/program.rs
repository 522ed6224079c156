//! The melody progress state machine.
//!
//! Holds a cursor into a fixed melody. The note under the cursor is shown as
//! a label and as notation; playing that note on the keyboard moves the
//! cursor one step and redraws. Wrong notes, unknown keys and anything that
//! is not a note-on are ignored. Once the cursor reaches the end of the
//! melody both outputs are cleared and nothing changes any more.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::display::Display;
use crate::error::ResourceLoadError;
use crate::glyphs::ImageLoader;
use crate::midi::MidiMessage;
use crate::model::{MelodyEvent, DEFAULT_MELODY};
use crate::pitch::PitchTable;
use crate::renderer::NotationRenderer;

/// Where the learner is in the melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Waiting for the note at this index.
    InProgress(usize),
    /// Every note has been played.
    Complete,
}

/// Serializable view of the progress, for status output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub cursor: usize,
    pub length: usize,
    pub complete: bool,
    /// The note expected next, if any.
    pub current: Option<MelodyEvent>,
}

pub fn snapshot_to_json(snapshot: &ProgressSnapshot) -> String {
    serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string())
}

type AdvanceObserver = Box<dyn FnMut(&ProgressSnapshot) + Send>;

pub struct PianoLearningProgram<D, L> {
    melody: Vec<MelodyEvent>,
    pitch_table: PitchTable,
    renderer: NotationRenderer<L>,
    display: D,
    index: usize,
    on_advance: Option<AdvanceObserver>,
}

impl<D: Display, L: ImageLoader> PianoLearningProgram<D, L> {
    pub fn new(
        melody: impl Into<Vec<MelodyEvent>>,
        pitch_table: PitchTable,
        renderer: NotationRenderer<L>,
        display: D,
    ) -> Self {
        Self {
            melody: melody.into(),
            pitch_table,
            renderer,
            display,
            index: 0,
            on_advance: None,
        }
    }

    /// The built-in melody on the built-in key table.
    pub fn with_default_melody(renderer: NotationRenderer<L>, display: D) -> Self {
        Self::new(DEFAULT_MELODY, PitchTable::default(), renderer, display)
    }

    /// Call `observer` after every advance, once the new note has been drawn.
    pub fn on_advance(mut self, observer: impl FnMut(&ProgressSnapshot) + Send + 'static) -> Self {
        self.on_advance = Some(Box::new(observer));
        self
    }

    pub fn cursor(&self) -> usize {
        self.index
    }

    pub fn melody(&self) -> &[MelodyEvent] {
        &self.melody
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn renderer(&self) -> &NotationRenderer<L> {
        &self.renderer
    }

    pub fn progress(&self) -> Progress {
        if self.index < self.melody.len() {
            Progress::InProgress(self.index)
        } else {
            Progress::Complete
        }
    }

    pub fn current_event(&self) -> Option<&MelodyEvent> {
        self.melody.get(self.index)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            cursor: self.index,
            length: self.melody.len(),
            complete: self.progress() == Progress::Complete,
            current: self.current_event().copied(),
        }
    }

    /// Show the expected note, or clear both outputs once the melody is done.
    ///
    /// On a glyph load error nothing on the display is changed.
    pub async fn render_current(&mut self) -> Result<(), ResourceLoadError> {
        match self.current_event().copied() {
            Some(event) => {
                let surface = self.renderer.render(&[event]).await?;
                self.display.set_label(event.name.as_str());
                self.display.set_notation(surface);
            }
            None => {
                self.display.clear_label();
                self.display.clear_notation();
            }
        }
        Ok(())
    }

    /// Handle one raw MIDI message. Returns whether the cursor advanced.
    pub async fn on_midi_message(&mut self, bytes: &[u8]) -> Result<bool, ResourceLoadError> {
        match MidiMessage::parse(bytes).and_then(MidiMessage::note_on_pitch) {
            Some(pitch) => self.on_note_on(pitch).await,
            None => {
                log::trace!("ignoring MIDI message {bytes:02x?}");
                Ok(false)
            }
        }
    }

    /// Handle a key press. Returns whether the cursor advanced.
    ///
    /// The cursor has already moved when a render error is returned.
    pub async fn on_note_on(&mut self, pitch: u8) -> Result<bool, ResourceLoadError> {
        let Some(played) = self.pitch_table.note_name_for_pitch(pitch) else {
            log::debug!("ignoring key {pitch}: not in the key table");
            return Ok(false);
        };
        let Some(expected) = self.current_event().map(|e| e.name) else {
            log::debug!("ignoring {played}: melody complete");
            return Ok(false);
        };
        if played != expected {
            log::debug!("ignoring {played}: expecting {expected}");
            return Ok(false);
        }

        self.index += 1;
        match self.progress() {
            Progress::InProgress(i) => log::info!("{played} played, next note {}/{}", i + 1, self.melody.len()),
            Progress::Complete => log::info!("{played} played, melody complete"),
        }
        self.render_current().await?;

        let snapshot = self.snapshot();
        if let Some(observer) = self.on_advance.as_mut() {
            observer(&snapshot);
        }
        Ok(true)
    }

    /// Draw the first note, then handle queued messages one at a time, in
    /// arrival order, until the sending side is closed.
    pub async fn run(&mut self, mut messages: UnboundedReceiver<Vec<u8>>) -> Result<(), ResourceLoadError> {
        self.render_current().await?;
        while let Some(bytes) = messages.recv().await {
            self.on_midi_message(&bytes).await?;
        }
        log::debug!("MIDI input closed at {}/{}", self.index, self.melody.len());
        Ok(())
    }
}
