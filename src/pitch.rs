//! Mapping between keyboard keys (MIDI note numbers) and note names.

use std::collections::HashMap;

use crate::error::PitchTableError;
use crate::model::{NoteName, PitchTableEntry, DEFAULT_KEYS};

/// Bidirectional key table.
///
/// Built from a forward list of (name, pitch) entries; the reverse lookup is
/// its exact inverse, so construction fails if two names would share a pitch.
#[derive(Debug, Clone)]
pub struct PitchTable {
    entries: Vec<PitchTableEntry>,
    by_pitch: HashMap<u8, NoteName>,
}

impl PitchTable {
    pub fn new(entries: &[PitchTableEntry]) -> Result<Self, PitchTableError> {
        let mut by_pitch: HashMap<u8, NoteName> = HashMap::with_capacity(entries.len());
        let mut seen_names = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.pitch > 127 {
                return Err(PitchTableError::OutOfRange(entry.pitch));
            }
            if seen_names.contains(&entry.name) {
                return Err(PitchTableError::DuplicateName(entry.name));
            }
            if let Some(&first) = by_pitch.get(&entry.pitch) {
                return Err(PitchTableError::DuplicatePitch {
                    pitch: entry.pitch,
                    first,
                    second: entry.name,
                });
            }
            seen_names.push(entry.name);
            by_pitch.insert(entry.pitch, entry.name);
        }

        Ok(Self {
            entries: entries.to_vec(),
            by_pitch,
        })
    }

    /// Note name sent by the given key, or `None` for keys outside the table.
    pub fn note_name_for_pitch(&self, pitch: u8) -> Option<NoteName> {
        self.by_pitch.get(&pitch).copied()
    }

    pub fn pitch_for_note_name(&self, name: NoteName) -> Option<u8> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.pitch)
    }

    pub fn entries(&self) -> &[PitchTableEntry] {
        &self.entries
    }
}

impl Default for PitchTable {
    fn default() -> Self {
        let by_pitch = DEFAULT_KEYS.iter().map(|e| (e.pitch, e.name)).collect();
        Self {
            entries: DEFAULT_KEYS.to_vec(),
            by_pitch,
        }
    }
}
