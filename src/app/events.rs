//! Änderungsbenachrichtigungen des Zustandsspeichers.

use crate::core::{CurveData, ImageSequence};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Art einer Benachrichtigung (ohne Nutzdaten).
///
/// Innerhalb eines Batches wird pro Art nur die letzte Benachrichtigung
/// ausgeliefert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Kurvendaten geändert
    Curves,
    /// Selektion einer Kurve geändert
    Selection,
    /// Aktive Kurve gewechselt
    ActiveCurve,
    /// Aktueller Frame gewechselt
    Frame,
    /// Bildsequenz (Dateien oder Verzeichnis) geändert
    ImageSequence,
    /// Sichtbarkeit einer Kurve geändert
    CurveVisibility,
}

/// Benachrichtigung mit Nutzdaten.
///
/// Alle Nutzdaten sind Kopien; Subscriber können sie nicht verwenden, um
/// den Store zu verändern.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// Vollständige Kopie aller Kurven (Name → Punkte), in Einfügereihenfolge
    CurvesChanged(IndexMap<String, CurveData>),
    /// Neue Selektion einer Kurve
    SelectionChanged {
        curve: String,
        indices: BTreeSet<usize>,
    },
    /// Neue aktive Kurve, `None` unverändert als `None`
    ActiveCurveChanged(Option<String>),
    /// Neuer aktueller Frame (1-basiert)
    FrameChanged(i32),
    /// Neue Bildsequenz als Ganzes
    ImageSequenceChanged(ImageSequence),
    /// Neue Sichtbarkeit einer Kurve
    CurveVisibilityChanged { curve: String, visible: bool },
}

impl StateEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StateEvent::CurvesChanged(_) => EventKind::Curves,
            StateEvent::SelectionChanged { .. } => EventKind::Selection,
            StateEvent::ActiveCurveChanged(_) => EventKind::ActiveCurve,
            StateEvent::FrameChanged(_) => EventKind::Frame,
            StateEvent::ImageSequenceChanged(_) => EventKind::ImageSequence,
            StateEvent::CurveVisibilityChanged { .. } => EventKind::CurveVisibility,
        }
    }
}
