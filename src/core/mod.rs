//! Core-Domänentypen: Kurvenpunkte, Bildsequenz, Kamera.

pub mod camera;
pub mod image_sequence;
/// Kurvenpunkte und Kurvendaten
///
/// Ein Punkt ist `(frame, x, y, status)`; eine Kurve ist eine geordnete
/// Punktliste, deren Indizes von der Selektion referenziert werden.
pub mod point;

pub use camera::Camera2D;
pub use image_sequence::ImageSequence;
pub use point::{CurveData, CurvePoint, PointStatus};
