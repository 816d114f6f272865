//! Application-Layer: Store, Benachrichtigungen, Batching und Frame-Koordination.

mod affinity;
pub mod batch;
pub mod coordinator;
pub mod emission_log;
pub mod error;
pub mod events;
pub mod signals;
/// Zentraler Anwendungszustand
///
/// Einzige Quelle der Wahrheit für Kurven, Selektion, aktive Kurve,
/// Frame, Bildsequenz und Originaldaten.
pub mod state;

pub use affinity::ThreadAffinity;
pub use batch::BatchGuard;
pub use coordinator::{
    CoordinatorStep, FrameChangeCoordinator, FrameChangeReport, FrameIndicator,
    InvalidationReason, RenderView,
};
pub use emission_log::EmissionLog;
pub use error::{StateError, StateResult};
pub use events::{EventKind, StateEvent};
pub use signals::{Callback, SubscriptionId};
pub use state::{ApplicationState, ClearScope, CurveMetadata, StateSummary};
