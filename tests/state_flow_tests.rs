use curve_track_editor::{
    ApplicationState, ClearScope, CurveData, CurvePoint, EventKind, StateError, StateEvent,
};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

fn curve(n: usize) -> CurveData {
    (0..n)
        .map(|i| CurvePoint::new(i as i32 + 1, i as f64 * 2.0, i as f64 * -1.5))
        .collect()
}

fn files(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("img_{i:03}.png")).collect()
}

fn record_kinds(state: &mut ApplicationState) -> Rc<RefCell<Vec<EventKind>>> {
    let kinds = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&kinds);
    state.subscribe(move |event, _| sink.borrow_mut().push(event.kind()));
    kinds
}

#[test]
fn test_delete_selected_curve_leaves_no_trace() {
    let mut state = ApplicationState::new();
    state
        .set_curve_data("A", curve(3))
        .expect("Kurve A sollte angelegt werden");
    state
        .set_selection("A", [0, 2])
        .expect("Selektion sollte gesetzt werden");
    state
        .set_original_data("A", curve(3))
        .expect("Baseline sollte gespeichert werden");

    state.delete_curve("A").expect("Löschen sollte klappen");

    assert!(state
        .get_selection(Some("A"))
        .expect("Selektion gelöschter Kurven ist leer, kein Fehler")
        .is_empty());
    assert_eq!(
        state.get_curve_data(Some("A")),
        Err(StateError::UnknownCurve("A".into()))
    );
    assert!(!state.has_original_data("A"));
}

#[test]
fn test_set_frame_zero_clamps_to_first_frame() {
    let mut state = ApplicationState::new();
    state
        .set_image_files(files(10), Some("/tmp/seq".into()))
        .expect("Sequenz sollte gesetzt werden");
    state.set_frame(6).expect("Frame 6 existiert");

    state.set_frame(0).expect("Clamping ist kein Fehler");

    assert_eq!(state.current_frame(), 1);
}

#[test]
fn test_delete_active_curve_resets_active_to_none() {
    let mut state = ApplicationState::new();
    state.set_curve_data("A", curve(2)).expect("Kurve A");
    state.set_active_curve(Some("A")).expect("aktiv setzen");
    state.set_selection("A", [1]).expect("Selektion");

    state.delete_curve("A").expect("Löschen");

    assert_eq!(state.active_curve(), None);
    assert_eq!(state.get_selection(None), Err(StateError::NoActiveCurve));
    assert_eq!(state.get_curve_data(None), Err(StateError::NoActiveCurve));
}

#[test]
fn test_no_active_curve_differs_from_empty_curve() {
    let mut state = ApplicationState::new();
    assert_eq!(state.get_curve_data(None), Err(StateError::NoActiveCurve));

    state.set_curve_data("leer", Vec::new()).expect("leere Kurve");
    state.set_active_curve(Some("leer")).expect("aktiv setzen");

    assert_eq!(state.get_curve_data(None), Ok(Vec::new()));
}

#[test]
fn test_loader_style_session_setup_in_one_batch() {
    let mut state = ApplicationState::new();
    let kinds = record_kinds(&mut state);

    state
        .batch(|s| -> Result<(), StateError> {
            s.set_image_files(files(30), Some("/data/shot_01".into()))?;
            for name in ["track_1", "track_2", "track_3"] {
                s.set_curve_data(name, curve(30))?;
                s.set_original_data(name, curve(30))?;
            }
            s.set_active_curve(Some("track_2"))?;
            s.set_frame(12)
        })
        .expect("Sitzung sollte geladen werden");

    assert_eq!(
        *kinds.borrow(),
        vec![
            EventKind::ImageSequence,
            EventKind::Curves,
            EventKind::ActiveCurve,
            EventKind::Frame,
        ]
    );
    let summary = state.summary();
    assert_eq!(summary.curve_count, 3);
    assert_eq!(summary.point_count, 90);
    assert_eq!(summary.current_frame, 12);
    assert_eq!(summary.original_snapshots, 3);
}

#[test]
fn test_clear_all_then_reset_keeps_subscribers() {
    let mut state = ApplicationState::new();
    state.set_curve_data("A", curve(4)).expect("Kurve A");
    state.set_curve_data("B", curve(4)).expect("Kurve B");
    state.set_selection("A", [0, 1]).expect("Selektion A");
    state.set_selection("B", [3]).expect("Selektion B");
    let kinds = record_kinds(&mut state);

    state
        .clear_selection(ClearScope::All)
        .expect("alles deselektieren");
    assert!(state.get_selection(Some("A")).expect("A").is_empty());
    assert!(state.get_selection(Some("B")).expect("B").is_empty());

    state.reset().expect("Reset");
    assert_eq!(state.curve_count(), 0);
    assert_eq!(state.summary().subscriber_count, 1);

    state.set_frame(1).expect("unverändert");
    state.set_curve_data("C", curve(1)).expect("Kurve C");
    assert_eq!(kinds.borrow().last(), Some(&EventKind::Curves));
}

#[test]
fn test_notification_payloads_are_snapshots() {
    let mut state = ApplicationState::new();
    let seen: Rc<RefCell<Vec<StateEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    state.subscribe_to(&[EventKind::Curves], move |event, _| {
        sink.borrow_mut().push(event.clone());
    });

    state.set_curve_data("A", curve(2)).expect("Kurve A");
    state
        .update_point("A", 0, CurvePoint::new(1, 99.0, 99.0))
        .expect("Punkt ersetzen");

    let seen = seen.borrow();
    let StateEvent::CurvesChanged(first) = &seen[0] else {
        panic!("Erwartet CurvesChanged, erhalten {:?}", seen[0]);
    };
    assert_eq!(first["A"][0].x, 0.0);
    let StateEvent::CurvesChanged(second) = &seen[1] else {
        panic!("Erwartet CurvesChanged, erhalten {:?}", seen[1]);
    };
    assert_eq!(second["A"][0].x, 99.0);
}

// ── Eigenschaften ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    SetCurve { curve: usize, len: usize },
    DeleteCurve(usize),
    SetActive(Option<usize>),
    Select { curve: usize, index: usize },
    SetFrame(i32),
    SetImages(usize),
}

const NAMES: [&str; 3] = ["A", "B", "C"];

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 0..6usize).prop_map(|(curve, len)| Op::SetCurve { curve, len }),
        (0..3usize).prop_map(Op::DeleteCurve),
        proptest::option::of(0..3usize).prop_map(Op::SetActive),
        (0..3usize, 0..6usize).prop_map(|(curve, index)| Op::Select { curve, index }),
        (-3..15i32).prop_map(Op::SetFrame),
        (0..12usize).prop_map(Op::SetImages),
    ]
}

/// Wendet eine Operation an; Fehler sind Teil des Szenarios und werden ignoriert.
fn apply(state: &mut ApplicationState, op: &Op) {
    let _ = match op {
        Op::SetCurve { curve: c, len } => state.set_curve_data(NAMES[*c], curve(*len)),
        Op::DeleteCurve(c) => state.delete_curve(NAMES[*c]),
        Op::SetActive(c) => state.set_active_curve(c.map(|c| NAMES[c])),
        Op::Select { curve: c, index } => state.add_to_selection(NAMES[*c], *index),
        Op::SetFrame(frame) => state.set_frame(*frame),
        Op::SetImages(n) => state.set_image_files(files(*n), None),
    };
}

type Snapshot = (
    BTreeMap<String, CurveData>,
    BTreeMap<String, BTreeSet<usize>>,
    Option<String>,
    i32,
    usize,
);

fn snapshot(state: &ApplicationState) -> Snapshot {
    let curves: BTreeMap<String, CurveData> = state.get_all_curves().into_iter().collect();
    let selection = curves
        .keys()
        .map(|name| {
            let selected = state.get_selection(Some(name)).expect("Kurve existiert");
            (name.clone(), selected)
        })
        .collect();
    (
        curves,
        selection,
        state.active_curve(),
        state.current_frame(),
        state.get_total_frames(),
    )
}

proptest! {
    #[test]
    fn prop_curve_roundtrip_returns_independent_copy(
        points in proptest::collection::vec((1..500i32, -1e6..1e6f64, -1e6..1e6f64), 0..40)
    ) {
        let data: CurveData = points
            .iter()
            .map(|&(frame, x, y)| CurvePoint::new(frame, x, y))
            .collect();
        let mut state = ApplicationState::new();
        state.set_curve_data("kurve", data.clone()).expect("gültiger Name");

        let mut copy = state.get_curve_data(Some("kurve")).expect("existiert");
        prop_assert_eq!(&copy, &data);

        copy.push(CurvePoint::new(0, 0.0, 0.0));
        prop_assert_eq!(state.get_curve_data(Some("kurve")).expect("existiert"), data);
    }

    #[test]
    fn prop_total_frames_follows_image_files(lengths in proptest::collection::vec(0..200usize, 1..8)) {
        let mut state = ApplicationState::new();
        for len in lengths {
            state.set_image_files(files(len), None).expect("gültige Liste");
            prop_assert_eq!(state.get_total_frames(), len.max(1));
            prop_assert!(state.current_frame() >= 1);
            prop_assert!(state.current_frame() as usize <= len.max(1));
        }
    }

    #[test]
    fn prop_batch_matches_unbatched_state_with_one_notification_per_kind(
        ops in proptest::collection::vec(op_strategy(), 0..25)
    ) {
        let mut plain = ApplicationState::new();
        for op in &ops {
            apply(&mut plain, op);
        }

        let mut batched = ApplicationState::new();
        let kinds = record_kinds(&mut batched);
        {
            let mut guard = batched.begin_batch();
            for op in &ops {
                apply(&mut guard, op);
            }
            prop_assert!(kinds.borrow().is_empty());
            guard.commit();
        }

        prop_assert_eq!(snapshot(&plain), snapshot(&batched));
        let kinds = kinds.borrow();
        let distinct: BTreeSet<EventKind> = kinds.iter().copied().collect();
        prop_assert_eq!(distinct.len(), kinds.len());
    }

    #[test]
    fn prop_nested_batches_flush_once_at_outermost_exit(depth in 1..6usize) {
        fn nested(
            state: &mut ApplicationState,
            level: usize,
            leaked: &mut usize,
        ) -> Result<(), StateError> {
            state.batch(|s| {
                s.set_frame(level as i32 + 1)?;
                s.set_active_curve(Some(NAMES[level % NAMES.len()]))?;
                *leaked += s.emission_log().len();
                if level > 0 {
                    nested(s, level - 1, &mut *leaked)?;
                }
                *leaked += s.emission_log().len();
                Ok(())
            })
        }

        let mut state = ApplicationState::new();
        state.set_image_files(files(10), None).expect("Sequenz");
        state.clear_emission_log();

        let mut leaked = 0;
        nested(&mut state, depth, &mut leaked).expect("keine Fehler");

        prop_assert_eq!(leaked, 0);
        prop_assert_eq!(state.batch_depth(), 0);
        prop_assert_eq!(state.emission_log().count(EventKind::Frame), 1);
        prop_assert_eq!(state.emission_log().count(EventKind::ActiveCurve), 1);
        prop_assert_eq!(state.current_frame(), 1);
    }
}
