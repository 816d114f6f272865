//! Transaktionales Bündeln von Benachrichtigungen.
//!
//! Zwei Formen:
//! - [`ApplicationState::batch`]: Closure mit `Result`; bei `Err` werden die
//!   Benachrichtigungen dieser Ebene verworfen.
//! - [`ApplicationState::begin_batch`]: RAII-Guard mit `Deref` auf den Store.
//!   Drop liefert aus (wie `commit`), außer beim Unwinding einer Panic.
//!
//! Verschachtelung ist beliebig tief; ausgeliefert wird erst beim Schließen
//! der äußersten Ebene. Datenänderungen selbst werden bei Fehlern nicht
//! zurückgerollt.

use super::ApplicationState;
use std::ops::{Deref, DerefMut};

/// Offene Batch-Ebene auf dem Store.
pub struct BatchGuard<'a> {
    state: &'a mut ApplicationState,
    finished: bool,
}

impl BatchGuard<'_> {
    /// Schließt die Ebene regulär.
    pub fn commit(mut self) {
        self.finish(true);
    }

    /// Schließt die Ebene und verwirft deren Benachrichtigungen.
    pub fn abandon(mut self) {
        self.finish(false);
    }

    fn finish(&mut self, ok: bool) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.state.exit_batch_level(ok);
    }
}

impl Deref for BatchGuard<'_> {
    type Target = ApplicationState;

    fn deref(&self) -> &ApplicationState {
        self.state
    }
}

impl DerefMut for BatchGuard<'_> {
    fn deref_mut(&mut self) -> &mut ApplicationState {
        self.state
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        let ok = !std::thread::panicking();
        self.finish(ok);
    }
}

impl ApplicationState {
    /// Öffnet eine Batch-Ebene und gibt den Guard zurück.
    pub fn begin_batch(&mut self) -> BatchGuard<'_> {
        self.affinity.assert_owner();
        self.signals.enter_level();
        BatchGuard {
            state: self,
            finished: false,
        }
    }

    /// Führt `f` in einer Batch-Ebene aus.
    ///
    /// `Ok` → Ebene regulär schließen, `Err` → Benachrichtigungen der Ebene
    /// verwerfen. Der Fehler wird unverändert zurückgegeben.
    pub fn batch<T, E>(
        &mut self,
        f: impl FnOnce(&mut ApplicationState) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self.begin_batch();
        let result = f(&mut guard);
        if result.is_ok() {
            guard.commit();
        } else {
            guard.abandon();
        }
        result
    }

    /// Aktuelle Verschachtelungstiefe (0 = kein Batch offen).
    pub fn batch_depth(&self) -> usize {
        self.affinity.assert_owner();
        self.signals.depth()
    }

    pub fn is_batching(&self) -> bool {
        self.affinity.assert_owner();
        self.signals.depth() > 0
    }

    /// `true` während Subscriber aufgerufen werden.
    pub fn is_emitting(&self) -> bool {
        self.affinity.assert_owner();
        self.signals.is_emitting()
    }

    fn exit_batch_level(&mut self, ok: bool) {
        if let Some(queued) = self.signals.exit_level(ok) {
            self.deliver(queued);
        }
    }
}
