//! Begrenztes Log ausgelieferter Benachrichtigungen.

use super::events::EventKind;

/// Speichert ausgelieferte Benachrichtigungsarten in Reihenfolge.
#[derive(Debug, Clone)]
pub struct EmissionLog {
    entries: Vec<EventKind>,
    capacity: usize,
}

impl Default for EmissionLog {
    fn default() -> Self {
        Self::new(crate::shared::options::EMISSION_LOG_CAPACITY)
    }
}

impl EmissionLog {
    /// Erstellt ein leeres Log mit maximaler Kapazität.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(2),
        }
    }

    /// Fügt eine ausgelieferte Benachrichtigung hinzu.
    /// Bei voller Kapazität wird die ältere Hälfte verworfen.
    pub fn record(&mut self, kind: EventKind) {
        if self.entries.len() >= self.capacity {
            self.entries.drain(..self.capacity / 2);
        }
        self.entries.push(kind);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Liefert eine read-only Sicht auf alle Einträge.
    pub fn entries(&self) -> &[EventKind] {
        &self.entries
    }

    /// Zählt die Einträge einer Art.
    pub fn count(&self, kind: EventKind) -> usize {
        self.entries.iter().filter(|k| **k == kind).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_and_counts() {
        let mut log = EmissionLog::new(10);
        log.record(EventKind::Curves);
        log.record(EventKind::Frame);
        log.record(EventKind::Curves);

        assert_eq!(
            log.entries(),
            &[EventKind::Curves, EventKind::Frame, EventKind::Curves]
        );
        assert_eq!(log.count(EventKind::Curves), 2);
        assert_eq!(log.count(EventKind::Selection), 0);
    }

    #[test]
    fn drops_older_half_at_capacity() {
        let mut log = EmissionLog::new(4);
        for _ in 0..4 {
            log.record(EventKind::Frame);
        }
        log.record(EventKind::Curves);

        assert_eq!(log.len(), 3);
        assert_eq!(log.entries().last(), Some(&EventKind::Curves));
    }
}
