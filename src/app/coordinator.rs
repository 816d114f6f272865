//! Geordnete Reaktion auf Framewechsel.
//!
//! Ein Framewechsel betrifft mehrere sonst unabhängige Teilsysteme, deren
//! Reaktionen voneinander abhängen:
//!
//! 1. Hintergrundbild für den neuen Frame laden (keine Abhängigkeit)
//! 2. View zentrieren (braucht die Bildgröße aus Schritt 1)
//! 3. Render-Caches invalidieren (braucht Pan/Offset aus Schritt 2)
//! 4. Hilfs-Widgets aktualisieren (Timeline, Labels; kein eigenes Repaint)
//! 5. Genau ein Repaint anfordern
//!
//! Als unabhängige Subscriber wäre die Reihenfolge nicht garantiert und es
//! gäbe mehrere Repaints. Der Koordinator ist deshalb ein einziger Subscriber
//! und ruft die Schritte direkt nacheinander auf. Er hält keinen Zustand
//! zwischen zwei Framewechseln außer dem letzten Bericht.

use super::events::{EventKind, StateEvent};
use super::signals::SubscriptionId;
use super::ApplicationState;
use std::cell::RefCell;
use std::rc::Rc;

/// Grund einer Cache-Invalidierung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// Aktueller Frame hat gewechselt
    FrameChanged,
    /// Hintergrundbild wurde ersetzt oder entfernt
    BackgroundChanged,
    /// Kamera wurde bewegt
    ViewMoved,
}

/// Render-/View-Teilsystem aus Sicht des Koordinators.
pub trait RenderView {
    /// Lädt das Hintergrundbild für `frame`. Fehler sind nicht fatal.
    fn reload_background(&mut self, frame: i32) -> anyhow::Result<()>;
    /// Zentriert die Ansicht für `frame` (nutzt ggf. die Bildgröße).
    fn recentre(&mut self, frame: i32);
    /// Verwirft abgeleitete Render-Caches.
    fn invalidate_caches(&mut self, reason: InvalidationReason);
    /// Fordert ein Neuzeichnen an.
    fn request_repaint(&mut self);
}

/// Hilfs-Widget, das den aktuellen Frame anzeigt (ohne eigenes Repaint).
pub trait FrameIndicator {
    fn refresh(&mut self, frame: i32);
}

/// Einzelschritt eines Framewechsels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorStep {
    ReloadBackground,
    Recentre,
    InvalidateCaches,
    RefreshWidgets,
    RequestRepaint,
}

/// Ergebnis eines Framewechsels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameChangeReport {
    /// Frame, für den die Schritte liefen
    pub frame: i32,
    /// Ausgeführte Schritte in Reihenfolge
    pub steps: Vec<CoordinatorStep>,
    /// Fehlermeldung aus Schritt 1, falls das Laden fehlschlug
    pub background_error: Option<String>,
}

impl FrameChangeReport {
    pub fn background_loaded(&self) -> bool {
        self.background_error.is_none()
    }
}

/// Führt die fünf Framewechsel-Schritte in fester Reihenfolge aus.
pub struct FrameChangeCoordinator<V: RenderView> {
    view: V,
    widgets: Vec<Box<dyn FrameIndicator>>,
    last_report: Option<FrameChangeReport>,
}

impl<V: RenderView> FrameChangeCoordinator<V> {
    /// Erstellt einen Koordinator ohne Widgets.
    pub fn new(view: V) -> Self {
        Self {
            view,
            widgets: Vec::new(),
            last_report: None,
        }
    }

    /// Hängt ein Widget an; Widgets werden in dieser Reihenfolge aktualisiert.
    pub fn add_widget(&mut self, widget: Box<dyn FrameIndicator>) {
        self.widgets.push(widget);
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn last_report(&self) -> Option<&FrameChangeReport> {
        self.last_report.as_ref()
    }

    /// Führt alle Schritte synchron aus.
    ///
    /// Ein Fehler beim Laden des Hintergrunds wird geloggt und im Bericht
    /// vermerkt; die übrigen Schritte laufen trotzdem.
    pub fn on_frame_changed(&mut self, frame: i32) -> FrameChangeReport {
        let mut steps = Vec::with_capacity(5);

        // 1. Hintergrund
        let background_error = match self.view.reload_background(frame) {
            Ok(()) => None,
            Err(e) => {
                log::warn!(
                    "Hintergrund für Frame {} nicht geladen, fahre ohne fort: {:#}",
                    frame,
                    e
                );
                Some(format!("{e:#}"))
            }
        };
        steps.push(CoordinatorStep::ReloadBackground);

        // 2. Zentrierung
        self.view.recentre(frame);
        steps.push(CoordinatorStep::Recentre);

        // 3. Caches
        self.view.invalidate_caches(InvalidationReason::FrameChanged);
        steps.push(CoordinatorStep::InvalidateCaches);

        // 4. Widgets
        for widget in &mut self.widgets {
            widget.refresh(frame);
        }
        steps.push(CoordinatorStep::RefreshWidgets);

        // 5. Repaint
        self.view.request_repaint();
        steps.push(CoordinatorStep::RequestRepaint);

        log::debug!("Framewechsel auf {} koordiniert", frame);
        let report = FrameChangeReport {
            frame,
            steps,
            background_error,
        };
        self.last_report = Some(report.clone());
        report
    }
}

impl<V: RenderView + 'static> FrameChangeCoordinator<V> {
    /// Registriert den Koordinator als einzigen Frame-Subscriber am Store.
    pub fn attach(
        coordinator: Rc<RefCell<Self>>,
        state: &mut ApplicationState,
    ) -> SubscriptionId {
        log::info!("Frame-Koordinator angemeldet");
        state.subscribe_to(&[EventKind::Frame], move |event, _state| {
            if let StateEvent::FrameChanged(frame) = event {
                coordinator.borrow_mut().on_frame_changed(*frame);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    type CallLog = Rc<RefCell<Vec<String>>>;

    struct RecordingView {
        calls: CallLog,
        fail_background: bool,
    }

    impl RenderView for RecordingView {
        fn reload_background(&mut self, frame: i32) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(format!("reload {frame}"));
            if self.fail_background {
                Err(anyhow!("Bild fehlt"))
            } else {
                Ok(())
            }
        }

        fn recentre(&mut self, frame: i32) {
            self.calls.borrow_mut().push(format!("recentre {frame}"));
        }

        fn invalidate_caches(&mut self, reason: InvalidationReason) {
            self.calls.borrow_mut().push(format!("invalidate {reason:?}"));
        }

        fn request_repaint(&mut self) {
            self.calls.borrow_mut().push("repaint".into());
        }
    }

    struct RecordingWidget {
        name: &'static str,
        calls: CallLog,
    }

    impl FrameIndicator for RecordingWidget {
        fn refresh(&mut self, frame: i32) {
            self.calls
                .borrow_mut()
                .push(format!("{} {frame}", self.name));
        }
    }

    fn coordinator(fail_background: bool) -> (FrameChangeCoordinator<RecordingView>, CallLog) {
        let calls = CallLog::default();
        let mut coordinator = FrameChangeCoordinator::new(RecordingView {
            calls: Rc::clone(&calls),
            fail_background,
        });
        for name in ["timeline", "label"] {
            coordinator.add_widget(Box::new(RecordingWidget {
                name,
                calls: Rc::clone(&calls),
            }));
        }
        (coordinator, calls)
    }

    #[test]
    fn steps_run_in_fixed_order() {
        let (mut coordinator, calls) = coordinator(false);
        let report = coordinator.on_frame_changed(5);

        assert_eq!(
            *calls.borrow(),
            vec![
                "reload 5",
                "recentre 5",
                "invalidate FrameChanged",
                "timeline 5",
                "label 5",
                "repaint",
            ]
        );
        assert!(report.background_loaded());
        assert_eq!(report.steps.len(), 5);
    }

    #[test]
    fn background_failure_degrades_and_continues() {
        let (mut coordinator, calls) = coordinator(true);
        let report = coordinator.on_frame_changed(5);

        assert_eq!(report.background_error.as_deref(), Some("Bild fehlt"));
        assert_eq!(
            report.steps,
            vec![
                CoordinatorStep::ReloadBackground,
                CoordinatorStep::Recentre,
                CoordinatorStep::InvalidateCaches,
                CoordinatorStep::RefreshWidgets,
                CoordinatorStep::RequestRepaint,
            ]
        );
        let repaints = calls.borrow().iter().filter(|c| *c == "repaint").count();
        assert_eq!(repaints, 1);
        assert_eq!(coordinator.last_report(), Some(&report));
    }
}
