//! Curve Track Editor (headless).
//!
//! Startet den Zustandskern ohne GUI: lädt die Optionen, baut eine
//! Beispielsitzung auf, spielt die Frames einmal durch und gibt die
//! Zustandsübersicht als JSON aus.

use curve_track_editor::app::FrameIndicator;
use curve_track_editor::{
    ApplicationState, CurvePoint, EditorOptions, FrameChangeCoordinator, HeadlessViewport,
    PointStatus, StaticBackground, TimelineIndicator,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Anzahl Frames der Beispielsequenz
const DEMO_FRAMES: i32 = 24;

fn main() -> anyhow::Result<()> {
    AppRunner::run()
}

struct AppRunner;

impl AppRunner {
    fn run() -> anyhow::Result<()> {
        // Logger initialisieren
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();

        log::info!(
            "Curve Track Editor v{} startet (headless)...",
            env!("CARGO_PKG_VERSION")
        );

        // Optionen aus TOML laden (oder Standardwerte)
        let config_path = EditorOptions::config_path();
        let options = EditorOptions::load_from_file(&config_path);

        let mut state = ApplicationState::with_options(options.clone());
        let timeline = TimelineIndicator::new();
        timeline.track_sequence(&mut state);

        // Frame 7 fehlt absichtlich: der Koordinator läuft ohne Hintergrund weiter
        let background = StaticBackground::new([1920, 1080]).with_missing([7]);
        let coordinator = Rc::new(RefCell::new(FrameChangeCoordinator::new(
            HeadlessViewport::new(background, &options),
        )));
        coordinator
            .borrow_mut()
            .add_widget(Box::new(timeline.clone()) as Box<dyn FrameIndicator>);
        FrameChangeCoordinator::attach(Rc::clone(&coordinator), &mut state);

        Self::load_demo_session(&mut state)?;

        let sequence = state.image_sequence();
        for frame in 2..=DEMO_FRAMES {
            state.set_frame(frame)?;
            log::debug!(
                "Timeline: {} ({})",
                timeline.label(),
                sequence.file_for_frame(frame).unwrap_or("-")
            );
        }

        // Manuelle Korrektur eines getrackten Punkts
        let point = state
            .get_curve_data(None)?
            .get(6)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Beispielkurve hat weniger als 7 Punkte"))?;
        state.update_point("track_1", 6, point.with_coordinates(190.0, 270.0))?;

        {
            let coordinator = coordinator.borrow();
            let viewport = coordinator.view();
            log::info!(
                "Viewport: {} Repaints, Cache-Generation {}",
                viewport.repaint_requests(),
                viewport.cache_generation()
            );
        }

        let summary = serde_json::to_string_pretty(&state.summary())?;
        println!("{summary}");
        Ok(())
    }

    /// Baut eine kleine Sitzung in einem einzigen Batch auf.
    fn load_demo_session(state: &mut ApplicationState) -> anyhow::Result<()> {
        let files = (1..=DEMO_FRAMES)
            .map(|i| format!("frame_{i:04}.png"))
            .collect();

        let track: Vec<CurvePoint> = (1..=DEMO_FRAMES)
            .map(|frame| {
                let t = f64::from(frame);
                let point = CurvePoint::new(frame, 100.0 + t * 12.5, 300.0 - t * 4.0);
                if frame == 1 || frame == DEMO_FRAMES {
                    point.with_status(PointStatus::Keyframe)
                } else {
                    point.with_status(PointStatus::Tracked)
                }
            })
            .collect();

        let mut batch = state.begin_batch();
        batch.set_image_files(files, Some("demo".to_string()))?;
        batch.set_curve_data("track_1", track.clone())?;
        batch.set_original_data("track_1", track)?;
        batch.set_active_curve(Some("track_1"))?;
        batch.set_selection("track_1", [0, DEMO_FRAMES as usize - 1])?;
        batch.commit();

        log::info!(
            "Beispielsitzung geladen: {} Kurve(n), {} Frames",
            state.curve_count(),
            state.get_total_frames()
        );
        Ok(())
    }
}
