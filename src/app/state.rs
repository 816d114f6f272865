//! Application State: zentrale Datenhaltung.
//!
//! Einzige Quelle für Kurven, Selektion, aktive Kurve, aktuellen Frame,
//! Bildsequenz und Original-Snapshots.
//!
//! # Besitzverhältnisse
//!
//! - Setter nehmen Daten per Wert (`Vec`, `String`); der Aufrufer behält
//!   keinen Alias auf gespeicherte Daten.
//! - Getter geben Kopien zurück; Änderungen daran wirken nie auf den Store.
//! - Benachrichtigungen tragen ebenfalls Kopien.
//!
//! # Fehler
//!
//! Unbekannte Kurven, ungültige Indizes und fehlende aktive Kurve liefern
//! [`StateError`]. Ausnahmen mit der Konvention „leer = nicht vorhanden“:
//! [`ApplicationState::get_selection`] und [`ApplicationState::get_original_data`].

use super::affinity::ThreadAffinity;
use super::emission_log::EmissionLog;
use super::error::{StateError, StateResult};
use super::events::{EventKind, StateEvent};
use super::signals::{SignalHub, SubscriptionId};
use crate::core::{CurveData, CurvePoint, ImageSequence};
use crate::shared::EditorOptions;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Darstellungs-Metadaten einer Kurve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveMetadata {
    /// Ob die Kurve gezeichnet wird
    pub visible: bool,
    /// Zeichenfarbe (RGBA)
    pub color: [f32; 4],
}

/// Ziel einer Lösch-Operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope<'a> {
    /// Nur die genannte Kurve
    Curve(&'a str),
    /// Alle Kurven
    All,
}

/// Kompakte Zustandsübersicht für Logging und Diagnose
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub curve_count: usize,
    pub point_count: usize,
    pub active_curve: Option<String>,
    pub current_frame: i32,
    pub total_frames: usize,
    pub image_directory: Option<String>,
    pub selected_points: usize,
    pub original_snapshots: usize,
    pub subscriber_count: usize,
}

/// Hauptzustand der Anwendung
pub struct ApplicationState {
    /// Kurvendaten in Einfügereihenfolge
    pub(super) curves: IndexMap<String, CurveData>,
    /// Metadaten pro Kurve (gleiche Schlüssel wie `curves`)
    metadata: HashMap<String, CurveMetadata>,
    /// Selektierte Punkt-Indizes pro Kurve (nur nicht-leere Einträge)
    selection: HashMap<String, BTreeSet<usize>>,
    active_curve: Option<String>,
    current_frame: i32,
    images: ImageSequence,
    /// Baselines vor destruktiven Operationen
    original_data: HashMap<String, CurveData>,
    options: EditorOptions,
    pub(super) affinity: ThreadAffinity,
    pub(super) signals: SignalHub,
}

impl ApplicationState {
    /// Erstellt einen leeren Store mit Standardoptionen.
    ///
    /// Der Store wird an den aufrufenden Thread gebunden.
    pub fn new() -> Self {
        Self::with_options(EditorOptions::default())
    }

    /// Erstellt einen leeren Store mit den angegebenen Optionen.
    pub fn with_options(options: EditorOptions) -> Self {
        let signals = SignalHub::new(options.max_flush_rounds, options.emission_log_capacity);
        Self {
            curves: IndexMap::new(),
            metadata: HashMap::new(),
            selection: HashMap::new(),
            active_curve: None,
            current_frame: 1,
            images: ImageSequence::new(),
            original_data: HashMap::new(),
            options,
            affinity: ThreadAffinity::current(),
            signals,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        self.affinity.assert_owner();
        &self.options
    }

    // ── Subscriber ──────────────────────────────────────────────────

    /// Registriert einen Subscriber für alle Benachrichtigungen.
    ///
    /// Subscriber werden in Registrierungsreihenfolge aufgerufen.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StateEvent, &mut ApplicationState) + 'static,
    {
        self.affinity.assert_owner();
        self.signals.subscribe(None, Box::new(callback))
    }

    /// Registriert einen Subscriber nur für die angegebenen Arten.
    pub fn subscribe_to<F>(&mut self, kinds: &[EventKind], callback: F) -> SubscriptionId
    where
        F: FnMut(&StateEvent, &mut ApplicationState) + 'static,
    {
        self.affinity.assert_owner();
        self.signals.subscribe(Some(kinds.to_vec()), Box::new(callback))
    }

    /// Meldet einen Subscriber ab. `false`, wenn die ID unbekannt ist.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.affinity.assert_owner();
        self.signals.unsubscribe(id)
    }

    /// Read-only Sicht auf die zuletzt ausgelieferten Benachrichtigungen.
    pub fn emission_log(&self) -> &EmissionLog {
        self.affinity.assert_owner();
        self.signals.log()
    }

    pub fn clear_emission_log(&mut self) {
        self.affinity.assert_owner();
        self.signals.clear_log();
    }

    // ── Kurvendaten ─────────────────────────────────────────────────

    /// Kopie der Punkte einer Kurve; `None` = aktive Kurve.
    ///
    /// Eine existierende Kurve ohne Punkte liefert eine leere Liste, eine
    /// fehlende Kurve dagegen [`StateError::UnknownCurve`].
    pub fn get_curve_data(&self, name: Option<&str>) -> StateResult<CurveData> {
        self.affinity.check()?;
        let name = self.resolve(name)?;
        self.curves
            .get(&name)
            .cloned()
            .ok_or(StateError::UnknownCurve(name))
    }

    /// Ersetzt (oder erzeugt) eine Kurve vollständig.
    ///
    /// Selektierte Indizes, die danach keinen Punkt mehr adressieren,
    /// werden entfernt.
    pub fn set_curve_data(&mut self, name: &str, data: CurveData) -> StateResult<()> {
        self.affinity.check()?;
        validate_name(name)?;

        let len = data.len();
        if self.curves.insert(name.to_string(), data).is_none() {
            self.metadata.insert(
                name.to_string(),
                CurveMetadata {
                    visible: true,
                    color: self.options.default_curve_color,
                },
            );
            log::debug!("Kurve angelegt: {}", name);
        }

        self.batch(|state| {
            state.emit_curves_changed();
            state.prune_selection(name, len);
            Ok(())
        })
    }

    /// Ersetzt die Punkte der aktiven Kurve.
    ///
    /// Ohne aktive Kurve: [`StateError::NoActiveCurve`]; es wird keine
    /// Standardkurve angelegt.
    pub fn set_active_curve_data(&mut self, data: CurveData) -> StateResult<()> {
        self.affinity.check()?;
        let name = self.resolve(None)?;
        self.set_curve_data(&name, data)
    }

    /// Ersetzt einen einzelnen Punkt.
    pub fn update_point(&mut self, name: &str, index: usize, point: CurvePoint) -> StateResult<()> {
        self.affinity.check()?;
        let slot = self.point_mut(name, index)?;
        *slot = point;
        self.emit_curves_changed();
        Ok(())
    }

    /// Hängt einen Punkt an eine existierende Kurve an.
    pub fn add_point(&mut self, name: &str, point: CurvePoint) -> StateResult<()> {
        self.affinity.check()?;
        self.curve_mut(name)?.push(point);
        self.emit_curves_changed();
        Ok(())
    }

    /// Entfernt einen Punkt; Selektionsindizes dahinter rücken nach.
    pub fn remove_point(&mut self, name: &str, index: usize) -> StateResult<CurvePoint> {
        self.affinity.check()?;
        self.point_mut(name, index)?;
        let removed = self.curve_mut(name)?.remove(index);

        let remapped = self.selection.get(name).map(|selected| {
            selected
                .iter()
                .filter(|&&i| i != index)
                .map(|&i| if i > index { i - 1 } else { i })
                .collect::<BTreeSet<usize>>()
        });

        self.batch(|state| {
            state.emit_curves_changed();
            if let Some(remapped) = remapped {
                state.store_selection(name, remapped);
            }
            Ok(removed)
        })
    }

    /// Löscht eine Kurve samt Selektion, Metadaten und Original-Snapshot.
    ///
    /// War sie aktiv, wird die aktive Kurve auf `None` gesetzt.
    pub fn delete_curve(&mut self, name: &str) -> StateResult<()> {
        self.affinity.check()?;
        if self.curves.shift_remove(name).is_none() {
            return Err(StateError::UnknownCurve(name.to_string()));
        }
        self.metadata.remove(name);
        self.original_data.remove(name);
        log::debug!("Kurve gelöscht: {}", name);

        self.batch(|state| {
            state.emit_curves_changed();
            state.store_selection(name, BTreeSet::new());
            if state.active_curve.as_deref() == Some(name) {
                state.active_curve = None;
                state.emit(StateEvent::ActiveCurveChanged(None));
            }
            Ok(())
        })
    }

    /// Namen aller Kurven in Einfügereihenfolge.
    pub fn curve_names(&self) -> Vec<String> {
        self.affinity.assert_owner();
        self.curves.keys().cloned().collect()
    }

    pub fn has_curve(&self, name: &str) -> bool {
        self.affinity.assert_owner();
        self.curves.contains_key(name)
    }

    pub fn curve_count(&self) -> usize {
        self.affinity.assert_owner();
        self.curves.len()
    }

    /// Kopie aller Kurven in Einfügereihenfolge.
    pub fn get_all_curves(&self) -> IndexMap<String, CurveData> {
        self.affinity.assert_owner();
        self.curves.clone()
    }

    // ── Metadaten ───────────────────────────────────────────────────

    pub fn get_curve_metadata(&self, name: &str) -> StateResult<CurveMetadata> {
        self.affinity.check()?;
        self.metadata
            .get(name)
            .cloned()
            .ok_or_else(|| StateError::UnknownCurve(name.to_string()))
    }

    /// Setzt die Sichtbarkeit; ohne Änderung keine Benachrichtigung.
    pub fn set_curve_visibility(&mut self, name: &str, visible: bool) -> StateResult<()> {
        self.affinity.check()?;
        let meta = self
            .metadata
            .get_mut(name)
            .ok_or_else(|| StateError::UnknownCurve(name.to_string()))?;
        if meta.visible == visible {
            return Ok(());
        }
        meta.visible = visible;
        self.emit(StateEvent::CurveVisibilityChanged {
            curve: name.to_string(),
            visible,
        });
        Ok(())
    }

    // ── Selektion ───────────────────────────────────────────────────

    /// Kopie der Selektion einer Kurve; `None` = aktive Kurve.
    ///
    /// Für unbekannte (z.B. gelöschte) Kurven: leere Menge.
    pub fn get_selection(&self, name: Option<&str>) -> StateResult<BTreeSet<usize>> {
        self.affinity.check()?;
        let name = self.resolve(name)?;
        Ok(self.selection.get(&name).cloned().unwrap_or_default())
    }

    /// Ersetzt die Selektion einer Kurve.
    pub fn set_selection(
        &mut self,
        name: &str,
        indices: impl IntoIterator<Item = usize>,
    ) -> StateResult<()> {
        self.affinity.check()?;
        let len = self.curve_len(name)?;
        let indices: BTreeSet<usize> = indices.into_iter().collect();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(StateError::IndexOutOfRange {
                curve: name.to_string(),
                index,
                len,
            });
        }
        self.store_selection(name, indices);
        Ok(())
    }

    /// Fügt einen Index zur Selektion hinzu.
    pub fn add_to_selection(&mut self, name: &str, index: usize) -> StateResult<()> {
        self.affinity.check()?;
        let len = self.curve_len(name)?;
        if index >= len {
            return Err(StateError::IndexOutOfRange {
                curve: name.to_string(),
                index,
                len,
            });
        }
        let mut selected = self.selection.get(name).cloned().unwrap_or_default();
        selected.insert(index);
        self.store_selection(name, selected);
        Ok(())
    }

    /// Entfernt einen Index aus der Selektion (nicht selektiert → no-op).
    pub fn remove_from_selection(&mut self, name: &str, index: usize) -> StateResult<()> {
        self.affinity.check()?;
        self.curve_len(name)?;
        let mut selected = self.selection.get(name).cloned().unwrap_or_default();
        selected.remove(&index);
        self.store_selection(name, selected);
        Ok(())
    }

    /// Leert die Selektion einer Kurve oder aller Kurven.
    pub fn clear_selection(&mut self, scope: ClearScope<'_>) -> StateResult<()> {
        self.affinity.check()?;
        match scope {
            ClearScope::Curve(name) => {
                self.curve_len(name)?;
                self.store_selection(name, BTreeSet::new());
                Ok(())
            }
            ClearScope::All => {
                let mut names: Vec<String> = self.selection.keys().cloned().collect();
                names.sort();
                self.batch(|state| {
                    for name in &names {
                        state.store_selection(name, BTreeSet::new());
                    }
                    Ok(())
                })
            }
        }
    }

    // ── Aktive Kurve ────────────────────────────────────────────────

    /// Kopie des Namens der aktiven Kurve.
    pub fn active_curve(&self) -> Option<String> {
        self.affinity.assert_owner();
        self.active_curve.clone()
    }

    /// Setzt die aktive Kurve; `None` bleibt `None` (auch in der Benachrichtigung).
    ///
    /// Die Existenz der Kurve wird nicht geprüft, Löschen setzt sie zurück.
    pub fn set_active_curve(&mut self, name: Option<&str>) -> StateResult<()> {
        self.affinity.check()?;
        if let Some(name) = name {
            validate_name(name)?;
        }
        if self.active_curve.as_deref() == name {
            return Ok(());
        }
        self.active_curve = name.map(str::to_string);
        self.emit(StateEvent::ActiveCurveChanged(self.active_curve.clone()));
        Ok(())
    }

    // ── Frame ───────────────────────────────────────────────────────

    pub fn current_frame(&self) -> i32 {
        self.affinity.assert_owner();
        self.current_frame
    }

    /// Setzt den aktuellen Frame, begrenzt auf `[1, total_frames]`.
    pub fn set_frame(&mut self, frame: i32) -> StateResult<()> {
        self.affinity.check()?;
        let clamped = self.clamp_frame(frame);
        if clamped == self.current_frame {
            return Ok(());
        }
        self.current_frame = clamped;
        self.emit(StateEvent::FrameChanged(clamped));
        Ok(())
    }

    // ── Bildsequenz ─────────────────────────────────────────────────

    /// Setzt die Bildsequenz; `directory == None` behält das aktuelle Verzeichnis.
    ///
    /// Listen über `max_image_files` und leere Pfade werden abgelehnt.
    /// Bei Änderung genau eine Sequenz-Benachrichtigung; verkürzt sich die
    /// Sequenz unter den aktuellen Frame, folgt eine Frame-Benachrichtigung.
    pub fn set_image_files(
        &mut self,
        files: Vec<String>,
        directory: Option<String>,
    ) -> StateResult<()> {
        self.affinity.check()?;
        let limit = self.options.max_image_files;
        if files.len() > limit {
            return Err(StateError::TooManyImageFiles {
                count: files.len(),
                limit,
            });
        }
        if let Some(index) = files.iter().position(|f| f.trim().is_empty()) {
            return Err(StateError::InvalidImagePath { index });
        }

        let directory = directory.or_else(|| self.images.directory.clone());
        if files == self.images.files && directory == self.images.directory {
            return Ok(());
        }
        self.images = ImageSequence { files, directory };
        log::info!(
            "Bildsequenz gesetzt: {} Frames (Verzeichnis: {:?})",
            self.images.total_frames(),
            self.images.directory
        );

        self.batch(|state| {
            state.emit(StateEvent::ImageSequenceChanged(state.images.clone()));
            let frame = state.current_frame;
            state.set_frame(frame)
        })
    }

    pub fn get_image_files(&self) -> Vec<String> {
        self.affinity.assert_owner();
        self.images.files.clone()
    }

    pub fn get_image_directory(&self) -> Option<String> {
        self.affinity.assert_owner();
        self.images.directory.clone()
    }

    /// Kopie der ganzen Sequenz.
    pub fn image_sequence(&self) -> ImageSequence {
        self.affinity.assert_owner();
        self.images.clone()
    }

    /// Abgeleitet: `max(1, Anzahl Bilddateien)`.
    pub fn get_total_frames(&self) -> usize {
        self.affinity.assert_owner();
        self.images.total_frames()
    }

    // ── Original-Snapshots ──────────────────────────────────────────

    /// Speichert eine Baseline vor einer destruktiven Operation.
    pub fn set_original_data(&mut self, name: &str, data: CurveData) -> StateResult<()> {
        self.affinity.check()?;
        validate_name(name)?;
        self.original_data.insert(name.to_string(), data);
        Ok(())
    }

    /// Kopie der Baseline; leer, wenn keine gespeichert ist.
    pub fn get_original_data(&self, name: &str) -> CurveData {
        self.affinity.assert_owner();
        self.original_data.get(name).cloned().unwrap_or_default()
    }

    pub fn has_original_data(&self, name: &str) -> bool {
        self.affinity.assert_owner();
        self.original_data.contains_key(name)
    }

    pub fn clear_original_data(&mut self, scope: ClearScope<'_>) -> StateResult<()> {
        self.affinity.check()?;
        match scope {
            ClearScope::Curve(name) => {
                self.original_data.remove(name);
            }
            ClearScope::All => self.original_data.clear(),
        }
        Ok(())
    }

    // ── Lebenszyklus ────────────────────────────────────────────────

    /// Setzt den Store auf den Leerzustand zurück; Subscriber bleiben.
    ///
    /// Nur für Test-Harnesses und „Neue Sitzung“; es gibt kein implizites Reset.
    pub fn reset(&mut self) -> StateResult<()> {
        self.affinity.check()?;
        log::info!("Application State wird zurückgesetzt");

        self.batch(|state| {
            if !state.curves.is_empty() {
                state.curves.clear();
                state.emit_curves_changed();
            }
            state.metadata.clear();
            state.original_data.clear();

            let mut selected: Vec<String> = state.selection.keys().cloned().collect();
            selected.sort();
            for name in &selected {
                state.store_selection(name, BTreeSet::new());
            }

            if state.active_curve.take().is_some() {
                state.emit(StateEvent::ActiveCurveChanged(None));
            }
            if state.images != ImageSequence::default() {
                state.images = ImageSequence::default();
                state.emit(StateEvent::ImageSequenceChanged(ImageSequence::default()));
            }
            state.set_frame(1)
        })
    }

    /// Kompakte Übersicht (serialisierbar).
    pub fn summary(&self) -> StateSummary {
        self.affinity.assert_owner();
        StateSummary {
            curve_count: self.curves.len(),
            point_count: self.curves.values().map(Vec::len).sum(),
            active_curve: self.active_curve.clone(),
            current_frame: self.current_frame,
            total_frames: self.images.total_frames(),
            image_directory: self.images.directory.clone(),
            selected_points: self.selection.values().map(BTreeSet::len).sum(),
            original_snapshots: self.original_data.len(),
            subscriber_count: self.signals.subscriber_count(),
        }
    }

    // ── Interne Helfer ──────────────────────────────────────────────

    /// Expliziter Name oder aktive Kurve.
    fn resolve(&self, name: Option<&str>) -> StateResult<String> {
        match name {
            Some(name) => Ok(name.to_string()),
            None => self.active_curve.clone().ok_or(StateError::NoActiveCurve),
        }
    }

    fn curve_mut(&mut self, name: &str) -> StateResult<&mut CurveData> {
        self.curves
            .get_mut(name)
            .ok_or_else(|| StateError::UnknownCurve(name.to_string()))
    }

    fn curve_len(&self, name: &str) -> StateResult<usize> {
        self.curves
            .get(name)
            .map(Vec::len)
            .ok_or_else(|| StateError::UnknownCurve(name.to_string()))
    }

    fn point_mut(&mut self, name: &str, index: usize) -> StateResult<&mut CurvePoint> {
        let curve = self.curve_mut(name)?;
        let len = curve.len();
        curve.get_mut(index).ok_or_else(|| StateError::IndexOutOfRange {
            curve: name.to_string(),
            index,
            len,
        })
    }

    fn clamp_frame(&self, frame: i32) -> i32 {
        let total = i32::try_from(self.images.total_frames()).unwrap_or(i32::MAX);
        frame.clamp(1, total)
    }

    /// Speichert eine Selektion und meldet sie, falls sie sich geändert hat.
    fn store_selection(&mut self, name: &str, indices: BTreeSet<usize>) {
        let previous = self.selection.get(name);
        let unchanged = match previous {
            Some(prev) => *prev == indices,
            None => indices.is_empty(),
        };
        if unchanged {
            return;
        }

        if indices.is_empty() {
            self.selection.remove(name);
        } else {
            self.selection.insert(name.to_string(), indices.clone());
        }
        self.emit(StateEvent::SelectionChanged {
            curve: name.to_string(),
            indices,
        });
    }

    /// Entfernt Selektionsindizes `>= len`.
    fn prune_selection(&mut self, name: &str, len: usize) {
        let Some(selected) = self.selection.get(name) else {
            return;
        };
        if selected.iter().all(|&i| i < len) {
            return;
        }
        let kept: BTreeSet<usize> = selected.iter().copied().filter(|&i| i < len).collect();
        log::warn!(
            "Selektion von {:?} auf {} gültige Indizes gekürzt",
            name,
            kept.len()
        );
        self.store_selection(name, kept);
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str) -> StateResult<()> {
    if name.trim().is_empty() {
        Err(StateError::InvalidCurveName)
    } else {
        Ok(())
    }
}
