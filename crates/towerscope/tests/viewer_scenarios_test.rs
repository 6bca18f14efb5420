//! End-to-end scenarios for the viewer state machine.
//!
//! Everything here runs on the GPU-free [`Viewer`], ticking it at a fixed
//! 60 Hz frame time the way the window loop would.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use towerscope::*;

const DT: f32 = 1.0 / 60.0;
const FRAME_LIMIT: usize = 1000;

const ROOF: usize = 0;
const WINDOWS: usize = 1;
const PARKING: usize = 2;

fn viewer() -> Viewer {
    Viewer::new(ViewerOptions::default()).expect("default viewer")
}

/// Ticks until a transition completes, checking the overlay invariant on
/// every frame.
fn run_until_settled(viewer: &mut Viewer) -> TransitionComplete {
    for _ in 0..FRAME_LIMIT {
        let done = viewer.tick(DT);
        assert_overlay_invariant(viewer);
        if let Some(done) = done {
            return done;
        }
    }
    panic!("transition did not settle within {FRAME_LIMIT} frames");
}

/// The card is logically visible iff the phase is `Active(v)` and `v` has content.
fn assert_overlay_invariant(viewer: &Viewer) {
    let expected = match viewer.phase() {
        ViewPhase::Active(v) => viewer.catalog().overlay_for(v).map(|p| p.view.clone()),
        _ => None,
    };
    let shown = viewer.overlay().panel().map(|p| p.view.clone());
    assert_eq!(shown, expected, "overlay out of step with {:?}", viewer.phase());
}

#[test]
fn test_every_view_settles() {
    let ids: Vec<String> = viewer()
        .controller()
        .views()
        .iter()
        .map(|v| v.id.clone())
        .collect();
    for id in ids {
        let mut viewer = viewer();
        viewer.request_view(&id).unwrap();
        let done = run_until_settled(&mut viewer);
        assert_eq!(done.view, id);
        assert!(!done.forced, "'{id}' needed the fallback");
        if id == DEFAULT_VIEW {
            assert_eq!(viewer.phase(), &ViewPhase::Default);
        } else {
            assert_eq!(viewer.phase(), &ViewPhase::Active(id.clone()));
        }
    }
}

#[test]
fn test_roof_round_trip() {
    let mut viewer = viewer();
    assert_eq!(viewer.phase(), &ViewPhase::Default);
    assert!(!viewer.overlay().is_drawn());

    viewer.click_hotspot(ROOF).unwrap();
    assert_eq!(
        viewer.phase(),
        &ViewPhase::Transitioning {
            target: "roof".into()
        }
    );
    assert!(!viewer.overlay().is_visible());

    run_until_settled(&mut viewer);
    assert_eq!(viewer.phase(), &ViewPhase::Active("roof".into()));
    let panel = viewer.overlay().panel().expect("roof card");
    assert_eq!(panel.view, "roof");
    let labels: Vec<&str> = panel.metrics.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, ["Load", "Anomalies", "Last Audit"]);

    let outcome = viewer.click_hotspot(ROOF).unwrap();
    assert_eq!(outcome, Some(ClickOutcome::Deactivated("roof".into())));
    assert_eq!(
        viewer.phase(),
        &ViewPhase::Transitioning {
            target: DEFAULT_VIEW.into()
        }
    );
    assert!(!viewer.overlay().is_visible());
    // The exit motion still draws for a moment.
    assert!(viewer.overlay().is_drawn());

    run_until_settled(&mut viewer);
    assert_eq!(viewer.phase(), &ViewPhase::Default);
    assert!(!viewer.overlay().is_drawn());
}

#[test]
fn test_retarget_before_arrival() {
    let mut viewer = viewer();
    viewer.click_hotspot(ROOF).unwrap();
    for _ in 0..5 {
        assert!(viewer.tick(DT).is_none());
    }
    viewer.click_hotspot(PARKING).unwrap();

    let done = run_until_settled(&mut viewer);
    assert_eq!(done.view, "parking");
    assert_eq!(viewer.phase(), &ViewPhase::Active("parking".into()));
    let panel = viewer.overlay().panel().unwrap();
    assert_eq!(panel.view, "parking");
    assert!(panel.metrics.iter().all(|m| m.label != "Anomalies"));
}

#[test]
fn test_switch_between_active_views() {
    let mut viewer = viewer();
    viewer.click_hotspot(WINDOWS).unwrap();
    run_until_settled(&mut viewer);
    assert_eq!(viewer.overlay().panel().unwrap().view, "windows");

    viewer.click_hotspot(ROOF).unwrap();
    assert!(viewer.overlay().panel().is_none());
    run_until_settled(&mut viewer);
    assert_eq!(viewer.overlay().panel().unwrap().view, "roof");
}

#[test]
fn test_completion_fires_once_per_transition() {
    let mut viewer = viewer();
    let completions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&completions);
    viewer.on_transition_complete(move |done| sink.borrow_mut().push(done.view.clone()));

    viewer.click_hotspot(ROOF).unwrap();
    run_until_settled(&mut viewer);
    for _ in 0..120 {
        viewer.tick(DT);
    }
    viewer.click_hotspot(ROOF).unwrap();
    run_until_settled(&mut viewer);
    for _ in 0..120 {
        viewer.tick(DT);
    }

    assert_eq!(*completions.borrow(), ["roof", DEFAULT_VIEW]);
}

#[test]
fn test_ready_fires_once() {
    let mut viewer = viewer();
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    viewer.on_ready(move || counter.set(counter.get() + 1));

    viewer.click_hotspot(ROOF).unwrap();
    for _ in 0..600 {
        viewer.tick(DT);
    }
    assert_eq!(count.get(), 1);
    assert!(viewer.is_ready());
}

#[test]
fn test_ready_falls_back_while_moving() {
    let mut options = ViewerOptions::default();
    options.transition.smoothing_factor = 0.001;
    let mut viewer = Viewer::new(options).unwrap();
    viewer.request_view("roof").unwrap();

    let mut fired_at = None;
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    viewer.on_ready(move || counter.set(counter.get() + 1));
    for frame in 0..200 {
        viewer.tick(DT);
        if count.get() == 1 && fired_at.is_none() {
            fired_at = Some(frame);
        }
    }
    assert!(viewer.controller().is_transitioning());
    // 1.5 s at 60 Hz
    let frame = fired_at.expect("ready never fired");
    assert!((88..=91).contains(&frame), "fired on frame {frame}");
    assert_eq!(count.get(), 1);
}

#[test]
fn test_stalled_transition_is_forced() {
    let mut options = ViewerOptions::default();
    options.transition.smoothing_factor = 0.001;
    options.transition.max_transition_frames = 30;
    let mut viewer = Viewer::new(options).unwrap();

    viewer.click_hotspot(PARKING).unwrap();
    let done = run_until_settled(&mut viewer);
    assert!(done.forced);
    assert_eq!(done.frames, 30);
    assert_eq!(viewer.phase(), &ViewPhase::Active("parking".into()));
    let parking = viewer.controller().views().get("parking").unwrap().clone();
    assert_eq!(viewer.camera().position, parking.position);
}

#[test]
fn test_drag_mid_flight_lands_on_target() {
    let mut viewer = viewer();
    viewer.click_hotspot(WINDOWS).unwrap();
    viewer.tick(DT);
    viewer.begin_drag();
    assert_eq!(viewer.phase(), &ViewPhase::Active("windows".into()));
    assert_overlay_invariant(&viewer);
    viewer.drag(-30.0, 10.0);
    viewer.end_drag();

    // A later click flies again from wherever the user left the camera.
    viewer.click_hotspot(WINDOWS).unwrap();
    let done = run_until_settled(&mut viewer);
    assert_eq!(done.view, DEFAULT_VIEW);
}

#[test]
fn test_unknown_view_rejected() {
    let mut viewer = viewer();
    assert!(matches!(
        viewer.request_view("basement"),
        Err(ViewerError::UnknownView(v)) if v == "basement"
    ));
    assert_eq!(viewer.phase(), &ViewPhase::Default);
    assert_eq!(viewer.click_hotspot(99).unwrap(), None);
}

#[test]
fn test_typewriter_title_reveals() {
    let mut viewer = viewer();
    viewer.click_hotspot(ROOF).unwrap();
    run_until_settled(&mut viewer);

    let mut previous = 0;
    let mut seen = Vec::new();
    for _ in 0..120 {
        let title = viewer.overlay_frame().unwrap().title.to_string();
        let n = title.chars().count();
        assert!(n == previous || n == previous + 1, "jumped from {previous} to {n}");
        previous = n;
        seen.push(title);
        viewer.tick(DT);
    }
    assert_eq!(seen.last().unwrap(), "Roof Systems");
}

#[test]
fn test_rerequesting_active_view_retypes_title() {
    let mut viewer = viewer();
    viewer.click_hotspot(ROOF).unwrap();
    run_until_settled(&mut viewer);
    for _ in 0..120 {
        viewer.tick(DT);
    }
    assert_eq!(viewer.overlay_frame().unwrap().title, "Roof Systems");

    // Already at the pose, so this settles on the next frame while the old
    // card is still mid-exit.
    viewer.request_view("roof").unwrap();
    let done = viewer.tick(DT).expect("settles immediately");
    assert_eq!(done.view, "roof");

    let frame = viewer.overlay_frame().unwrap();
    assert!(!frame.exiting);
    assert_eq!(frame.title, "");

    for _ in 0..120 {
        viewer.tick(DT);
    }
    assert_eq!(viewer.overlay_frame().unwrap().title, "Roof Systems");
}

#[test]
fn test_custom_catalog() {
    let json = r#"{
        "views": [
            { "id": "default", "position": [20, 12, 20], "look_at": [0, 2, 0] },
            { "id": "lobby", "position": [4, 2, 4], "look_at": [0, 1, 0] }
        ],
        "hotspots": [
            { "position": [0, 1, 3], "label": "LOBBY", "view": "lobby", "color": 16776960 }
        ],
        "overlays": [
            { "view": "lobby", "title": "Lobby", "status": "Open",
              "metrics": [ { "label": "Visitors", "value": "12" } ] }
        ]
    }"#;
    let catalog = Catalog::from_json_str(json).unwrap();
    let mut viewer = Viewer::with_catalog(ViewerOptions::default(), catalog).unwrap();
    viewer.click_hotspot(0).unwrap();
    run_until_settled(&mut viewer);
    assert_eq!(viewer.overlay().panel().unwrap().title, "Lobby");
    assert_eq!(viewer.markers().len(), 1);
}

#[derive(Debug, Clone)]
enum Input {
    Click(usize),
    Tick(u8),
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        (0usize..3).prop_map(Input::Click),
        (1u8..40).prop_map(Input::Tick),
    ]
}

proptest! {
    #[test]
    fn prop_overlay_tracks_phase(inputs in prop::collection::vec(input(), 1..25)) {
        let mut viewer = viewer();
        let mut last_target = DEFAULT_VIEW.to_string();
        for input in inputs {
            match input {
                Input::Click(i) => {
                    if let Some(outcome) = viewer.click_hotspot(i).unwrap() {
                        last_target = match outcome {
                            ClickOutcome::Activated(v) => v,
                            ClickOutcome::Deactivated(_) => DEFAULT_VIEW.to_string(),
                        };
                    }
                }
                Input::Tick(n) => {
                    for _ in 0..n {
                        viewer.tick(DT);
                        assert_overlay_invariant(&viewer);
                    }
                }
            }
        }
        if viewer.controller().is_transitioning() {
            run_until_settled(&mut viewer);
        }
        prop_assert_eq!(viewer.controller().view_id(), last_target.as_str());
    }
}
