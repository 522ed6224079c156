//! Error types.
//!
//! Ignored input (unknown pitches, non note-on messages, wrong notes) is not
//! an error anywhere in this crate; only configuration, device and glyph
//! loading problems are.

use std::sync::Arc;

use crate::model::NoteName;

/// A glyph image could not be read or decoded.
///
/// Cloneable so one failed load can be handed to every caller waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResourceLoadError {
    #[error("Failed to read image '{url}': {source}")]
    Io {
        url: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Failed to decode image '{url}': {reason}")]
    Decode { url: String, reason: String },
}

impl ResourceLoadError {
    /// The resource identifier that failed to load.
    pub fn url(&self) -> &str {
        match self {
            ResourceLoadError::Io { url, .. } | ResourceLoadError::Decode { url, .. } => url,
        }
    }
}

/// The key table would not have an exact inverse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PitchTableError {
    #[error("MIDI pitch {pitch} is assigned to both {first} and {second}")]
    DuplicatePitch {
        pitch: u8,
        first: NoteName,
        second: NoteName,
    },

    #[error("Note {0} appears more than once in the key table")]
    DuplicateName(NoteName),

    #[error("MIDI pitch {0} is outside 0-127")]
    OutOfRange(u8),
}

/// Errors raised while talking to a MIDI source.
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("Failed to initialize MIDI: {0}")]
    InitFailed(String),

    #[error("Port not found: {0}")]
    PortNotFound(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    ResourceLoad(#[from] ResourceLoadError),

    #[error(transparent)]
    PitchTable(#[from] PitchTableError),

    #[error(transparent)]
    Midi(#[from] MidiError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
