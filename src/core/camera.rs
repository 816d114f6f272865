//! 2D-Kamera für Pan und Zoom über dem Hintergrundbild.

use glam::Vec2;

/// 2D-Kamera in Bild-Koordinaten (Pixel des Hintergrundbilds)
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    /// Blickpunkt der Kamera in Bild-Koordinaten
    pub position: Vec2,
    /// Zoom-Level (1.0 = ein Bildpixel pro Screenpixel)
    pub zoom: f32,
}

impl Camera2D {
    /// Erstellt eine neue Kamera
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Zentriert die Kamera auf einen Punkt
    pub fn look_at(&mut self, target: Vec2) {
        self.position = target;
    }

    /// Zentriert die Kamera auf die Mitte eines Bildes der Größe `[w, h]`.
    pub fn centre_on_image(&mut self, size: [u32; 2]) {
        self.look_at(Vec2::new(size[0] as f32, size[1] as f32) * 0.5);
    }

    /// Verschiebt die Kamera (Pan)
    pub fn pan(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Ändert den Zoom-Level innerhalb konfigurierbarer Grenzen
    pub fn zoom_by_clamped(&mut self, factor: f32, min: f32, max: f32) {
        self.zoom = (self.zoom * factor).clamp(min, max);
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new()
    }
}
