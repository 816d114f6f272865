//! Bildsequenz (Hintergrundbilder pro Frame).

use serde::{Deserialize, Serialize};

/// Dateiliste und Verzeichnis der geladenen Bildsequenz.
///
/// Die Frame-Anzahl wird immer aus `files` abgeleitet und nie separat gespeichert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSequence {
    /// Geordnete Bildpfade (ein Eintrag pro Frame)
    pub files: Vec<String>,
    /// Quellverzeichnis (optional)
    pub directory: Option<String>,
}

impl ImageSequence {
    /// Erstellt eine leere Sequenz.
    pub fn new() -> Self {
        Self::default()
    }

    /// Anzahl der Frames: `max(1, files.len())`.
    pub fn total_frames(&self) -> usize {
        self.files.len().max(1)
    }

    /// Gibt den Bildpfad für einen 1-basierten Frame zurück.
    pub fn file_for_frame(&self, frame: i32) -> Option<&str> {
        let index = usize::try_from(frame).ok()?.checked_sub(1)?;
        self.files.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
