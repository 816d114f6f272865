//! Tracking-Punkte und Kurvendaten.

use serde::{Deserialize, Serialize};

/// Status eines Tracking-Punkts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointStatus {
    /// Normaler Punkt ohne Sonderbedeutung
    #[default]
    Normal,
    /// Manuell gesetzter Keyframe
    Keyframe,
    /// Letzter Frame eines Tracking-Segments
    Endframe,
    /// Vom Tracker ermittelter Punkt
    Tracked,
    /// Zwischen Keyframes interpolierter Punkt
    Interpolated,
}

/// Einzelner Punkt einer Trajektorie (Wertetyp, `Copy`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Frame-Nummer
    pub frame: i32,
    /// X-Position
    pub x: f64,
    /// Y-Position
    pub y: f64,
    /// Tracking-Status
    #[serde(default)]
    pub status: PointStatus,
}

impl CurvePoint {
    /// Erstellt einen Punkt mit Status `Normal`.
    pub fn new(frame: i32, x: f64, y: f64) -> Self {
        Self {
            frame,
            x,
            y,
            status: PointStatus::Normal,
        }
    }

    /// Gibt eine Kopie mit geändertem Status zurück.
    pub fn with_status(self, status: PointStatus) -> Self {
        Self { status, ..self }
    }

    /// Gibt eine Kopie an neuer Position zurück (Frame und Status bleiben).
    pub fn with_coordinates(self, x: f64, y: f64) -> Self {
        Self { x, y, ..self }
    }
}

/// Geordnete Punktfolge einer Kurve.
///
/// Die Reihenfolge ist die Einfügereihenfolge des Aufrufers; der Store
/// sortiert nicht nach Frame.
pub type CurveData = Vec<CurvePoint>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_status_keeps_position_and_frame() {
        let p = CurvePoint::new(12, 3.5, -1.0).with_status(PointStatus::Keyframe);
        assert_eq!(p.frame, 12);
        assert_eq!(p.x, 3.5);
        assert_eq!(p.y, -1.0);
        assert_eq!(p.status, PointStatus::Keyframe);
    }

    #[test]
    fn status_deserializes_lowercase_and_defaults_to_normal() {
        let p: CurvePoint =
            serde_json::from_str(r#"{"frame":1,"x":0.0,"y":0.0,"status":"tracked"}"#)
                .expect("gültiges JSON");
        assert_eq!(p.status, PointStatus::Tracked);

        let p: CurvePoint =
            serde_json::from_str(r#"{"frame":2,"x":1.0,"y":2.0}"#).expect("gültiges JSON");
        assert_eq!(p.status, PointStatus::Normal);
    }
}
