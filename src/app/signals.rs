//! Observer-Liste, Warteschlange und Auslieferung der Benachrichtigungen.
//!
//! # Auslieferung
//!
//! - Ohne offenen Batch wird eine Benachrichtigung sofort ausgeliefert.
//! - In einem Batch (Tiefe > 0) oder während einer laufenden Auslieferung
//!   landet sie in der Warteschlange.
//! - Beim Schließen des äußersten Batches wird die Warteschlange pro
//!   [`EventKind`] zusammengefasst (letzte Nutzdaten gewinnen, Position der
//!   ersten Einreihung bleibt) und in einer Runde ausgeliefert.
//! - Mutiert ein Subscriber während einer Runde, wird das Ergebnis erst in
//!   der nächsten Runde ausgeliefert. Die Rundenzahl ist durch
//!   `EditorOptions::max_flush_rounds` begrenzt.
//!
//! Das `emitting`-Flag ist ein Re-Entrancy-Schutz, kein Lock: der Store
//! läuft ausschließlich auf einem Thread.
//!
//! Panict ein Subscriber, werden Subscriber-Liste und Flags wiederhergestellt,
//! die restliche Warteschlange verworfen und die Panic weitergereicht.

use super::emission_log::EmissionLog;
use super::events::{EventKind, StateEvent};
use super::ApplicationState;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// Callback eines Subscribers.
///
/// Erhält die Benachrichtigung und den Store selbst; Mutationen aus dem
/// Callback werden eingereiht, nicht rekursiv ausgeliefert.
pub type Callback = Box<dyn FnMut(&StateEvent, &mut ApplicationState)>;

/// Handle einer Registrierung, für [`ApplicationState::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    /// `None` = alle Arten
    kinds: Option<Vec<EventKind>>,
    callback: Callback,
}

impl Subscriber {
    fn wants(&self, kind: EventKind) -> bool {
        self.kinds.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Eingereihte Benachrichtigung.
///
/// Die Kurvenkopie wird erst bei der Auslieferung erzeugt: jede Kurven-
/// Mutation reiht `Curves` ein, die letzte Einreihung entspricht damit immer
/// dem Stand bei Rundenbeginn.
#[derive(Debug, Clone)]
pub(crate) enum Queued {
    Event(StateEvent),
    Curves,
}

impl Queued {
    fn kind(&self) -> EventKind {
        match self {
            Queued::Event(event) => event.kind(),
            Queued::Curves => EventKind::Curves,
        }
    }
}

/// Subscriber-Liste plus Batch-/Auslieferungszustand.
pub(crate) struct SignalHub {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    /// IDs der Subscriber, die in der laufenden Runde aufgerufen werden
    in_flight: HashSet<SubscriptionId>,
    /// Während der Runde abgemeldete IDs aus `in_flight`
    removed_in_flight: HashSet<SubscriptionId>,
    pending: Vec<Queued>,
    /// Warteschlangenlänge beim Betreten jeder Batch-Ebene (Länge = Tiefe)
    level_marks: Vec<usize>,
    emitting: bool,
    max_flush_rounds: usize,
    log: EmissionLog,
}

impl SignalHub {
    pub(crate) fn new(max_flush_rounds: usize, log_capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
            in_flight: HashSet::new(),
            removed_in_flight: HashSet::new(),
            pending: Vec::new(),
            level_marks: Vec::new(),
            emitting: false,
            max_flush_rounds: max_flush_rounds.max(1),
            log: EmissionLog::new(log_capacity),
        }
    }

    pub(crate) fn subscribe(
        &mut self,
        kinds: Option<Vec<EventKind>>,
        callback: Callback,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            kinds,
            callback,
        });
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if let Some(pos) = self.subscribers.iter().position(|s| s.id == id) {
            self.subscribers.remove(pos);
            return true;
        }
        if self.in_flight.contains(&id) {
            return self.removed_in_flight.insert(id);
        }
        false
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len() + self.in_flight.len() - self.removed_in_flight.len()
    }

    pub(crate) fn depth(&self) -> usize {
        self.level_marks.len()
    }

    pub(crate) fn is_emitting(&self) -> bool {
        self.emitting
    }

    /// `true`, wenn Benachrichtigungen eingereiht statt ausgeliefert werden.
    fn is_deferring(&self) -> bool {
        self.emitting || !self.level_marks.is_empty()
    }

    /// Öffnet eine Batch-Ebene.
    ///
    /// Nur die äußerste Ebene außerhalb einer Auslieferung leert die
    /// Warteschlange; während einer Auslieferung gehört deren Inhalt zur
    /// nächsten Runde.
    pub(crate) fn enter_level(&mut self) {
        if self.level_marks.is_empty() && !self.emitting {
            self.pending.clear();
        }
        self.level_marks.push(self.pending.len());
        log::debug!("Batch betreten (Tiefe {})", self.level_marks.len());
    }

    /// Schließt eine Batch-Ebene; bei `ok == false` wird verworfen, was diese
    /// Ebene eingereiht hat.
    ///
    /// Gibt die auszuliefernden Einträge zurück, wenn die äußerste Ebene
    /// außerhalb einer Auslieferung geschlossen wurde.
    pub(crate) fn exit_level(&mut self, ok: bool) -> Option<Vec<Queued>> {
        let mark = self.level_marks.pop()?;
        if !ok {
            let dropped = self.pending.len().saturating_sub(mark);
            self.pending.truncate(mark);
            log::debug!(
                "Batch-Ebene {} fehlgeschlagen, {} Benachrichtigungen verworfen",
                self.level_marks.len() + 1,
                dropped
            );
        } else {
            log::debug!("Batch verlassen (Tiefe {})", self.level_marks.len());
        }

        if self.level_marks.is_empty() && !self.emitting && !self.pending.is_empty() {
            Some(std::mem::take(&mut self.pending))
        } else {
            None
        }
    }

    pub(crate) fn log(&self) -> &EmissionLog {
        &self.log
    }

    pub(crate) fn clear_log(&mut self) {
        self.log.clear();
    }
}

/// Fasst eingereihte Benachrichtigungen pro Art zusammen.
///
/// Letzter Eintrag einer Art gewinnt, Reihenfolge = erste Einreihung der Art.
pub(crate) fn collapse(queued: Vec<Queued>) -> Vec<Queued> {
    let mut by_kind: IndexMap<EventKind, Queued> = IndexMap::new();
    for entry in queued {
        by_kind.insert(entry.kind(), entry);
    }
    by_kind.into_values().collect()
}

impl ApplicationState {
    /// Liefert eine Benachrichtigung aus oder reiht sie ein.
    pub(crate) fn emit(&mut self, event: StateEvent) {
        self.dispatch(Queued::Event(event));
    }

    /// Meldet geänderte Kurvendaten (Kopie wird bei Auslieferung erzeugt).
    pub(crate) fn emit_curves_changed(&mut self) {
        self.dispatch(Queued::Curves);
    }

    fn dispatch(&mut self, entry: Queued) {
        if self.signals.is_deferring() {
            self.signals.pending.push(entry);
        } else {
            self.deliver(vec![entry]);
        }
    }

    /// Liefert eingereihte Einträge in Runden aus, bis keine Reaktion mehr
    /// nachkommt oder das Rundenlimit erreicht ist.
    pub(crate) fn deliver(&mut self, queued: Vec<Queued>) {
        self.signals.emitting = true;
        let mut round = collapse(queued);
        let mut rounds = 0;

        while !round.is_empty() {
            rounds += 1;
            if rounds > self.signals.max_flush_rounds {
                log::error!(
                    "Abbruch nach {} Auslieferungsrunden, {} Benachrichtigungen verworfen",
                    self.signals.max_flush_rounds,
                    round.len()
                );
                self.signals.pending.clear();
                break;
            }

            let events: Vec<StateEvent> = round
                .into_iter()
                .map(|entry| match entry {
                    Queued::Event(event) => event,
                    Queued::Curves => StateEvent::CurvesChanged(self.curves.clone()),
                })
                .collect();
            if let Err(payload) = self.deliver_round(&events) {
                log::error!("Subscriber-Panic während der Auslieferung, Warteschlange verworfen");
                self.signals.pending.clear();
                self.signals.emitting = false;
                panic::resume_unwind(payload);
            }

            round = collapse(std::mem::take(&mut self.signals.pending));
        }

        self.signals.emitting = false;
    }

    /// Ruft die Subscriber für eine Runde auf.
    ///
    /// Die Subscriber-Liste wird auch bei einer Panic im Callback
    /// zurückgelegt; die Panic wird als `Err` an den Aufrufer gereicht.
    fn deliver_round(&mut self, events: &[StateEvent]) -> thread::Result<()> {
        let mut subscribers = std::mem::take(&mut self.signals.subscribers);
        self.signals.in_flight = subscribers.iter().map(|s| s.id).collect();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            for event in events {
                let kind = event.kind();
                self.signals.log.record(kind);
                log::debug!("Benachrichtigung: {:?}", kind);

                for subscriber in subscribers.iter_mut() {
                    if self.signals.removed_in_flight.contains(&subscriber.id)
                        || !subscriber.wants(kind)
                    {
                        continue;
                    }
                    (subscriber.callback)(event, self);
                }
            }
        }));

        let removed = std::mem::take(&mut self.signals.removed_in_flight);
        subscribers.retain(|s| !removed.contains(&s.id));
        self.signals.in_flight.clear();

        // Während der Runde hinzugekommene Subscriber hinten anhängen
        let added = std::mem::replace(&mut self.signals.subscribers, subscribers);
        self.signals.subscribers.extend(added);
        outcome
    }
}
