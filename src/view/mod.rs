//! Headless-Implementierungen der View-Schnittstellen des Koordinators.

pub mod timeline;
pub mod viewport;

pub use timeline::TimelineIndicator;
pub use viewport::{BackgroundFrame, BackgroundSource, HeadlessViewport, StaticBackground};
