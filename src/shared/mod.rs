//! Geteilte Konfiguration für `app` und `view`.

pub mod options;

pub use options::EditorOptions;
pub use options::{EMISSION_LOG_CAPACITY, MAX_FLUSH_ROUNDS, MAX_IMAGE_FILES};
