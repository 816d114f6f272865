//! Headless-Viewport: Hintergrund, Kamera, Cache-Generation, Repaints.
//!
//! Implementiert [`RenderView`] ohne GPU; ein echtes Frontend ersetzt nur
//! das Zeichnen, die Zustandsübergänge bleiben dieselben.

use crate::app::{InvalidationReason, RenderView};
use crate::core::Camera2D;
use crate::shared::EditorOptions;
use anyhow::{Context, Result};
use glam::Vec2;
use std::collections::BTreeSet;

/// Liefert die Bildgröße des Hintergrunds pro Frame.
pub trait BackgroundSource {
    fn frame_size(&mut self, frame: i32) -> Result<[u32; 2]>;
}

/// Quelle mit fester Bildgröße und optional fehlenden Frames.
#[derive(Debug, Clone)]
pub struct StaticBackground {
    size: [u32; 2],
    missing: BTreeSet<i32>,
}

impl StaticBackground {
    pub fn new(size: [u32; 2]) -> Self {
        Self {
            size,
            missing: BTreeSet::new(),
        }
    }

    /// Markiert Frames, für die kein Bild existiert.
    pub fn with_missing(mut self, frames: impl IntoIterator<Item = i32>) -> Self {
        self.missing.extend(frames);
        self
    }
}

impl BackgroundSource for StaticBackground {
    fn frame_size(&mut self, frame: i32) -> Result<[u32; 2]> {
        if self.missing.contains(&frame) {
            anyhow::bail!("kein Bild für Frame {}", frame);
        }
        Ok(self.size)
    }
}

/// Geladener Hintergrund
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundFrame {
    pub frame: i32,
    pub size: [u32; 2],
}

/// View-Zustand ohne Rendering
pub struct HeadlessViewport<S: BackgroundSource> {
    source: S,
    /// 2D-Kamera für die Ansicht
    pub camera: Camera2D,
    background: Option<BackgroundFrame>,
    centre_on_content: bool,
    zoom_range: (f32, f32),
    cache_generation: u64,
    /// Kameraposition, für die die Caches zuletzt aufgebaut wurden
    cache_anchor: Vec2,
    last_invalidation: Option<InvalidationReason>,
    repaint_requests: u64,
}

impl<S: BackgroundSource> HeadlessViewport<S> {
    /// Erstellt den Viewport mit den View-Optionen aus `options`.
    pub fn new(source: S, options: &EditorOptions) -> Self {
        Self {
            source,
            camera: Camera2D::new(),
            background: None,
            centre_on_content: options.centre_on_content,
            zoom_range: (options.camera_zoom_min, options.camera_zoom_max),
            cache_generation: 0,
            cache_anchor: Vec2::ZERO,
            last_invalidation: None,
            repaint_requests: 0,
        }
    }

    pub fn background(&self) -> Option<BackgroundFrame> {
        self.background
    }

    pub fn cache_generation(&self) -> u64 {
        self.cache_generation
    }

    pub fn cache_anchor(&self) -> Vec2 {
        self.cache_anchor
    }

    pub fn last_invalidation(&self) -> Option<InvalidationReason> {
        self.last_invalidation
    }

    pub fn repaint_requests(&self) -> u64 {
        self.repaint_requests
    }

    /// Verschiebt die Kamera und invalidiert die Caches.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.camera.pan(delta);
        self.invalidate_caches(InvalidationReason::ViewMoved);
    }

    /// Zoomt innerhalb der konfigurierten Grenzen und invalidiert die Caches.
    pub fn zoom_by(&mut self, factor: f32) {
        let (min, max) = self.zoom_range;
        self.camera.zoom_by_clamped(factor, min, max);
        self.invalidate_caches(InvalidationReason::ViewMoved);
    }
}

impl<S: BackgroundSource> RenderView for HeadlessViewport<S> {
    fn reload_background(&mut self, frame: i32) -> Result<()> {
        match self.source.frame_size(frame) {
            Ok(size) => {
                self.background = Some(BackgroundFrame { frame, size });
                log::debug!("Hintergrund Frame {}: {}x{}", frame, size[0], size[1]);
                Ok(())
            }
            Err(e) => {
                if self.background.take().is_some() {
                    self.invalidate_caches(InvalidationReason::BackgroundChanged);
                }
                Err(e).with_context(|| format!("Hintergrund für Frame {frame}"))
            }
        }
    }

    fn recentre(&mut self, _frame: i32) {
        if !self.centre_on_content {
            return;
        }
        if let Some(background) = self.background {
            self.camera.centre_on_image(background.size);
        }
    }

    fn invalidate_caches(&mut self, reason: InvalidationReason) {
        self.cache_generation += 1;
        self.cache_anchor = self.camera.position;
        self.last_invalidation = Some(reason);
        log::trace!(
            "Render-Caches invalidiert ({:?}), Generation {}",
            reason,
            self.cache_generation
        );
    }

    fn request_repaint(&mut self) {
        self.repaint_requests += 1;
    }
}
