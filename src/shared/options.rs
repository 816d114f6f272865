//! Zentrale Konfiguration für den Kurveneditor-Kern.
//!
//! `EditorOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Bildsequenz ─────────────────────────────────────────────────────

/// Obergrenze für die Länge einer Bildsequenz (größere Listen werden abgelehnt).
pub const MAX_IMAGE_FILES: usize = 100_000;

// ── Signale ─────────────────────────────────────────────────────────

/// Maximale Anzahl an Nachlauf-Runden, wenn Subscriber während der
/// Auslieferung erneut mutieren.
pub const MAX_FLUSH_ROUNDS: usize = 16;
/// Kapazität des Emissions-Logs.
pub const EMISSION_LOG_CAPACITY: usize = 1000;

// ── Kurven ──────────────────────────────────────────────────────────

/// Standardfarbe neuer Kurven (RGBA: Cyan).
pub const CURVE_COLOR_DEFAULT: [f32; 4] = [0.0, 0.8, 1.0, 1.0];

// ── Kamera ──────────────────────────────────────────────────────────

/// Minimaler Zoom-Faktor.
pub const CAMERA_ZOOM_MIN: f32 = 0.05;
/// Maximaler Zoom-Faktor.
pub const CAMERA_ZOOM_MAX: f32 = 64.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Editor-Optionen.
/// Wird als `curve_track_editor.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorOptions {
    // ── Bildsequenz ─────────────────────────────────────────────
    /// Maximale Anzahl Bilddateien pro Sequenz
    pub max_image_files: usize,

    // ── Signale ─────────────────────────────────────────────────
    /// Maximale Nachlauf-Runden bei Mutationen aus Subscribern
    pub max_flush_rounds: usize,
    /// Anzahl gemerkter Emissionen im Emissions-Log
    pub emission_log_capacity: usize,

    // ── View ────────────────────────────────────────────────────
    /// View bei Framewechsel auf das Hintergrundbild zentrieren
    pub centre_on_content: bool,
    /// Minimaler Zoom-Faktor
    pub camera_zoom_min: f32,
    /// Maximaler Zoom-Faktor
    pub camera_zoom_max: f32,

    // ── Kurven ──────────────────────────────────────────────────
    /// Farbe für neu angelegte Kurven
    #[serde(default = "default_curve_color")]
    pub default_curve_color: [f32; 4],
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            max_image_files: MAX_IMAGE_FILES,

            max_flush_rounds: MAX_FLUSH_ROUNDS,
            emission_log_capacity: EMISSION_LOG_CAPACITY,

            centre_on_content: true,
            camera_zoom_min: CAMERA_ZOOM_MIN,
            camera_zoom_max: CAMERA_ZOOM_MAX,

            default_curve_color: CURVE_COLOR_DEFAULT,
        }
    }
}

/// Serde-Default für `default_curve_color` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_curve_color() -> [f32; 4] {
    CURVE_COLOR_DEFAULT
}

impl EditorOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("curve_track_editor"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("curve_track_editor.toml")
    }
}
