//! Data model for the melody being practised and the keyboard it is played on.
//!
//! Notes carry a letter name only. Octaves are deliberately absent: a "C"
//! played anywhere on the keyboard satisfies a required "C".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the seven natural note letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    pub const ALL: [NoteName; 7] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::D => "D",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::G => "G",
            NoteName::A => "A",
            NoteName::B => "B",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteName::ALL
            .iter()
            .copied()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| format!("Unknown note name '{s}'"))
    }
}

/// Written length of a note relative to a whole note.
///
/// Only affects which glyph is drawn; it plays no part in advancing the melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteDuration {
    Whole,
    Half,
    Quarter,
}

impl NoteDuration {
    pub const ALL: [NoteDuration; 3] = [NoteDuration::Whole, NoteDuration::Half, NoteDuration::Quarter];

    /// Length as a fraction of a whole note.
    pub fn fraction(self) -> f64 {
        match self {
            NoteDuration::Whole => 1.0,
            NoteDuration::Half => 0.5,
            NoteDuration::Quarter => 0.25,
        }
    }

    pub fn from_fraction(fraction: f64) -> Option<Self> {
        NoteDuration::ALL
            .iter()
            .copied()
            .find(|d| (d.fraction() - fraction).abs() < f64::EPSILON)
    }

    /// File name of the glyph image drawn for this duration.
    pub fn glyph_file(self) -> &'static str {
        match self {
            NoteDuration::Whole => "whole.png",
            NoteDuration::Half => "half.png",
            NoteDuration::Quarter => "quarter.png",
        }
    }
}

/// A single note of the melody: what to play and how it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MelodyEvent {
    pub name: NoteName,
    pub duration: NoteDuration,
}

impl MelodyEvent {
    pub const fn new(name: NoteName, duration: NoteDuration) -> Self {
        Self { name, duration }
    }
}

/// A keyboard key: the note name it counts as and the MIDI note number it sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchTableEntry {
    pub name: NoteName,
    /// MIDI note number (0-127)
    pub pitch: u8,
}

impl PitchTableEntry {
    pub const fn new(name: NoteName, pitch: u8) -> Self {
        Self { name, pitch }
    }
}

/// The keys of the octave starting at C3.
pub const DEFAULT_KEYS: [PitchTableEntry; 7] = [
    PitchTableEntry::new(NoteName::C, 48),
    PitchTableEntry::new(NoteName::D, 50),
    PitchTableEntry::new(NoteName::E, 52),
    PitchTableEntry::new(NoteName::F, 53),
    PitchTableEntry::new(NoteName::G, 55),
    PitchTableEntry::new(NoteName::A, 57),
    PitchTableEntry::new(NoteName::B, 59),
];

const fn quarter(name: NoteName) -> MelodyEvent {
    MelodyEvent::new(name, NoteDuration::Quarter)
}

const fn half(name: NoteName) -> MelodyEvent {
    MelodyEvent::new(name, NoteDuration::Half)
}

const fn whole(name: NoteName) -> MelodyEvent {
    MelodyEvent::new(name, NoteDuration::Whole)
}

/// "Alle meine Entchen", 4/4.
pub const DEFAULT_MELODY: [MelodyEvent; 27] = {
    use NoteName::*;
    [
        quarter(C),
        quarter(D),
        quarter(E),
        quarter(F),
        half(G),
        half(G),
        quarter(A),
        quarter(A),
        quarter(A),
        quarter(A),
        whole(G),
        quarter(A),
        quarter(A),
        quarter(A),
        quarter(A),
        whole(G),
        quarter(F),
        quarter(F),
        quarter(F),
        quarter(F),
        half(E),
        half(E),
        quarter(D),
        quarter(D),
        quarter(D),
        quarter(D),
        whole(C),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names_parse_back_from_display() {
        for name in NoteName::ALL {
            assert_eq!(name.to_string().parse::<NoteName>(), Ok(name));
        }
        assert!("H".parse::<NoteName>().is_err());
        assert!("c".parse::<NoteName>().is_err());
    }

    #[test]
    fn durations_map_from_fractions() {
        assert_eq!(NoteDuration::from_fraction(1.0), Some(NoteDuration::Whole));
        assert_eq!(NoteDuration::from_fraction(0.5), Some(NoteDuration::Half));
        assert_eq!(NoteDuration::from_fraction(0.25), Some(NoteDuration::Quarter));
        assert_eq!(NoteDuration::from_fraction(0.125), None);
    }

    #[test]
    fn default_melody_opens_and_closes_on_c() {
        assert_eq!(DEFAULT_MELODY.len(), 27);
        assert_eq!(DEFAULT_MELODY[0], quarter(NoteName::C));
        assert_eq!(DEFAULT_MELODY[26], whole(NoteName::C));
        // four A's in a row right after the opening G G
        assert!(DEFAULT_MELODY[6..10].iter().all(|e| e.name == NoteName::A));
    }

    #[test]
    fn melody_event_serializes_with_labels() {
        let json = serde_json::to_string(&half(NoteName::G)).unwrap();
        assert_eq!(json, r#"{"name":"G","duration":"Half"}"#);
    }
}
