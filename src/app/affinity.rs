//! Thread-Bindung des Zustandsspeichers.
//!
//! Der Store ist durch seine Subscriber-Closures bereits `!Send`; die
//! Laufzeitprüfung hier deckt zusätzlich Zugriffe über Umwege ab
//! (z.B. Host-Bridges) und liefert einen typisierten Fehler statt
//! undefinierter Reihenfolge.

use super::error::{StateError, StateResult};
use std::thread::{self, ThreadId};

/// Merkt sich den Thread, der den Store erzeugt hat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl ThreadAffinity {
    /// Bindet an den aufrufenden Thread.
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Prüft, ob der aufrufende Thread der Besitzer ist.
    pub fn check(&self) -> StateResult<()> {
        let actual = thread::current().id();
        if actual == self.owner {
            Ok(())
        } else {
            Err(StateError::WrongThread {
                owner: self.owner,
                actual,
            })
        }
    }

    /// Wie [`check`](Self::check), bricht bei Verletzung aber sofort ab.
    ///
    /// Für infallible Getter, die keinen `Result` zurückgeben.
    pub fn assert_owner(&self) {
        if let Err(e) = self.check() {
            panic!("{e}");
        }
    }
}
