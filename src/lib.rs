//! Curve Track Editor Library.
//! Zustandskern (Store, Batching, Frame-Koordination) als Library für
//! Frontends, Tests und Benchmarks.

pub mod app;
pub mod core;
pub mod shared;
pub mod view;

pub use app::{
    ApplicationState, BatchGuard, ClearScope, EventKind, FrameChangeCoordinator,
    FrameChangeReport, StateError, StateEvent, StateResult, SubscriptionId,
};
pub use core::{Camera2D, CurveData, CurvePoint, ImageSequence, PointStatus};
pub use shared::EditorOptions;
pub use view::{HeadlessViewport, StaticBackground, TimelineIndicator};
