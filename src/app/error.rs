//! Typisierte Fehler des Zustandsspeichers.

use std::thread::ThreadId;
use thiserror::Error;

/// Fehler aus Zugriffen auf den [`ApplicationState`](super::ApplicationState).
///
/// Jede Vorbedingungsverletzung hat eine eigene Variante; der Store
/// liefert nie stillschweigend leere Werte statt eines Fehlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Kein Kurvenname angegeben und keine aktive Kurve gesetzt
    #[error("keine aktive Kurve gesetzt und kein Kurvenname angegeben")]
    NoActiveCurve,
    /// Kurve existiert nicht im Store
    #[error("unbekannte Kurve: {0:?}")]
    UnknownCurve(String),
    /// Punkt-Index außerhalb der Kurve
    #[error("Index {index} außerhalb von Kurve {curve:?} (Länge {len})")]
    IndexOutOfRange {
        curve: String,
        index: usize,
        len: usize,
    },
    /// Zugriff außerhalb des Besitzer-Threads
    #[error("Zugriff von Thread {actual:?}, der Store gehört zu Thread {owner:?}")]
    WrongThread { owner: ThreadId, actual: ThreadId },
    /// Bildsequenz überschreitet die konfigurierte Obergrenze
    #[error("{count} Bilddateien überschreiten die Obergrenze von {limit}")]
    TooManyImageFiles { count: usize, limit: usize },
    /// Leerer Pfad in der Bildsequenz
    #[error("leerer Bildpfad an Position {index}")]
    InvalidImagePath { index: usize },
    /// Leerer Kurvenname
    #[error("Kurvenname darf nicht leer sein")]
    InvalidCurveName,
}

/// Ergebnis-Alias für Store-Operationen.
pub type StateResult<T> = Result<T, StateError>;
