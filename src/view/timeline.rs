//! Timeline-Anzeige „aktueller Frame / Gesamtzahl“.

use crate::app::{ApplicationState, EventKind, FrameIndicator, StateEvent, SubscriptionId};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
struct TimelineInner {
    current: i32,
    total: usize,
}

/// Teilbares Handle auf die Timeline-Anzeige.
///
/// Klone teilen denselben Zustand: ein Klon hängt am Koordinator, ein
/// anderer wird vom Frontend gelesen.
#[derive(Debug, Clone)]
pub struct TimelineIndicator {
    inner: Rc<RefCell<TimelineInner>>,
}

impl Default for TimelineIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineIndicator {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimelineInner {
                current: 1,
                total: 1,
            })),
        }
    }

    pub fn current_frame(&self) -> i32 {
        self.inner.borrow().current
    }

    pub fn total_frames(&self) -> usize {
        self.inner.borrow().total
    }

    pub fn set_total_frames(&self, total: usize) {
        self.inner.borrow_mut().total = total.max(1);
    }

    /// Anzeigetext, z.B. `"5 / 120"`.
    pub fn label(&self) -> String {
        let inner = self.inner.borrow();
        format!("{} / {}", inner.current, inner.total)
    }

    /// Übernimmt die Gesamtzahl aus dem Store und folgt Sequenz-Änderungen.
    ///
    /// Unabhängige Reaktion, daher normaler Subscriber; der Frame selbst
    /// kommt über den Koordinator.
    pub fn track_sequence(&self, state: &mut ApplicationState) -> SubscriptionId {
        self.set_total_frames(state.get_total_frames());
        let handle = self.clone();
        state.subscribe_to(&[EventKind::ImageSequence], move |event, _| {
            if let StateEvent::ImageSequenceChanged(sequence) = event {
                handle.set_total_frames(sequence.total_frames());
            }
        })
    }
}

impl FrameIndicator for TimelineIndicator {
    fn refresh(&mut self, frame: i32) {
        self.inner.borrow_mut().current = frame;
    }
}
