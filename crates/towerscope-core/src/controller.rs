//! View-state controller: smooths the camera from view to view.
//!
//! The controller owns the interpolated camera pose. Each frame tick moves
//! the pose a fixed fraction of the remaining distance toward the target view
//! (`current += (target - current) * smoothing_factor`). When the position is
//! within the convergence threshold the transition completes and exactly one
//! [`TransitionComplete`] is returned. A transition that never gets there is
//! force-completed after a frame or time budget.

use glam::Vec3;

use crate::error::{Result, ViewerError};
use crate::options::TransitionOptions;
use crate::view::{View, ViewTable};

/// Logical state of the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPhase {
    /// Settled on the overview pose.
    Default,
    /// Flying toward the named view.
    Transitioning { target: String },
    /// Settled on a non-default view.
    Active(String),
}

impl ViewPhase {
    /// True while a transition is in progress.
    pub fn is_transitioning(&self) -> bool {
        matches!(self, ViewPhase::Transitioning { .. })
    }
}

/// Emitted once when a transition ends.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionComplete {
    /// View the camera arrived at.
    pub view: String,
    /// Frame ticks spent in the transition.
    pub frames: u32,
    /// True if the liveness fallback snapped the camera, or a manual drag took over.
    pub forced: bool,
}

/// Owns the current view and the interpolated camera pose.
#[derive(Debug, Clone)]
pub struct ViewController {
    views: ViewTable,
    options: TransitionOptions,
    phase: ViewPhase,
    target: View,
    position: Vec3,
    look_at: Vec3,
    frames: u32,
    elapsed: f32,
    dragging: bool,
    suspended: bool,
}

impl ViewController {
    /// Creates a controller resting on the default view.
    pub fn new(views: ViewTable, options: TransitionOptions) -> Self {
        let target = views.default_view().clone();
        Self {
            position: target.position,
            look_at: target.look_at,
            target,
            views,
            options,
            phase: ViewPhase::Default,
            frames: 0,
            elapsed: 0.0,
            dragging: false,
            suspended: false,
        }
    }

    /// Starts smoothing toward `view_id` from wherever the camera is now.
    ///
    /// Re-targeting mid-flight simply replaces the target. A pending drag
    /// suspension is lifted.
    pub fn request(&mut self, view_id: &str) -> Result<()> {
        let view = self
            .views
            .get(view_id)
            .ok_or_else(|| ViewerError::UnknownView(view_id.to_string()))?
            .clone();

        if let ViewPhase::Transitioning { target } = &self.phase {
            if target != view_id {
                log::debug!("retarget view '{target}' -> '{view_id}'");
            }
        } else {
            log::debug!("view transition -> '{view_id}'");
        }

        self.target = view;
        self.phase = ViewPhase::Transitioning {
            target: view_id.to_string(),
        };
        self.frames = 0;
        self.elapsed = 0.0;
        self.suspended = false;
        Ok(())
    }

    /// Starts smoothing back to the overview pose.
    pub fn request_default(&mut self) {
        let id = self.views.default_id().to_string();
        // The default view always exists in a constructed table.
        if let Err(e) = self.request(&id) {
            log::warn!("{e}");
        }
    }

    /// Advances the transition by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Option<TransitionComplete> {
        if !self.phase.is_transitioning() || self.suspended {
            return None;
        }

        let k = self.options.smoothing_factor;
        self.position += (self.target.position - self.position) * k;
        self.look_at += (self.target.look_at - self.look_at) * k;
        self.frames += 1;
        self.elapsed += dt.max(0.0);

        if self.position.distance(self.target.position) < self.options.convergence_threshold {
            return Some(self.settle(false));
        }

        if self.frames >= self.options.max_transition_frames
            || self.elapsed >= self.options.max_transition_secs
        {
            log::warn!(
                "view '{}' did not converge after {} frames ({:.2}s), snapping",
                self.target.id,
                self.frames,
                self.elapsed
            );
            self.position = self.target.position;
            self.look_at = self.target.look_at;
            return Some(self.settle(true));
        }

        None
    }

    fn settle(&mut self, forced: bool) -> TransitionComplete {
        let view = self.target.id.clone();
        self.phase = if view == self.views.default_id() {
            ViewPhase::Default
        } else {
            ViewPhase::Active(view.clone())
        };
        log::debug!("view '{view}' settled after {} frames", self.frames);
        TransitionComplete {
            view,
            frames: self.frames,
            forced,
        }
    }

    /// The user grabbed the camera. Automatic interpolation stops until the
    /// next [`request`](Self::request); an in-flight transition settles on its
    /// target without moving the camera further.
    pub fn begin_drag(&mut self) -> Option<TransitionComplete> {
        self.dragging = true;
        self.suspended = true;
        if self.phase.is_transitioning() {
            Some(self.settle(true))
        } else {
            None
        }
    }

    /// The user let go of the camera. Interpolation stays suspended.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Writes back a pose changed by manual navigation (orbit, zoom, idle orbit).
    pub fn sync_manual_pose(&mut self, position: Vec3, look_at: Vec3) {
        self.position = position;
        self.look_at = look_at;
    }

    /// Current logical phase.
    pub fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    /// Identifier of the active view. During a transition this is the target.
    pub fn view_id(&self) -> &str {
        &self.target.id
    }

    /// Identifier of the settled view, or `None` while transitioning.
    pub fn settled_view(&self) -> Option<&str> {
        match &self.phase {
            ViewPhase::Transitioning { .. } => None,
            ViewPhase::Default => Some(self.views.default_id()),
            ViewPhase::Active(id) => Some(id),
        }
    }

    /// True while the camera is flying toward a target.
    pub fn is_transitioning(&self) -> bool {
        self.phase.is_transitioning()
    }

    /// True while the pointer is dragging the camera.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// True while automatic interpolation is suspended by manual control.
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Current interpolated camera position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current interpolated look-at point.
    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    /// The pose the camera is heading to (or resting at).
    pub fn target(&self) -> &View {
        &self.target
    }

    /// The view table.
    pub fn views(&self) -> &ViewTable {
        &self.views
    }

    /// Transition tunables.
    pub fn options(&self) -> &TransitionOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::DEFAULT_VIEW;
    use proptest::prelude::*;

    fn table() -> ViewTable {
        ViewTable::new(
            vec![
                View::new(DEFAULT_VIEW, Vec3::new(25.0, 18.0, 30.0), Vec3::new(0.0, 8.0, 0.0)),
                View::new("roof", Vec3::new(8.0, 25.0, 12.0), Vec3::new(0.0, 16.0, 0.0)),
                View::new("windows", Vec3::new(18.0, 10.0, 8.0), Vec3::new(0.0, 8.0, 0.0)),
                View::new("parking", Vec3::new(15.0, 4.0, 18.0), Vec3::new(0.0, 1.0, 0.0)),
            ],
            DEFAULT_VIEW,
        )
        .unwrap()
    }

    fn controller() -> ViewController {
        ViewController::new(table(), TransitionOptions::default())
    }

    fn run_to_completion(c: &mut ViewController) -> Vec<TransitionComplete> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            if let Some(e) = c.tick(1.0 / 60.0) {
                events.push(e);
            }
            if !c.is_transitioning() {
                break;
            }
        }
        events
    }

    #[test]
    fn test_starts_on_default() {
        let c = controller();
        assert_eq!(c.phase(), &ViewPhase::Default);
        assert_eq!(c.view_id(), DEFAULT_VIEW);
        assert_eq!(c.position(), Vec3::new(25.0, 18.0, 30.0));
    }

    #[test]
    fn test_request_converges_once() {
        let mut c = controller();
        c.request("roof").unwrap();
        assert_eq!(
            c.phase(),
            &ViewPhase::Transitioning {
                target: "roof".into()
            }
        );
        let events = run_to_completion(&mut c);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].view, "roof");
        assert!(!events[0].forced);
        assert_eq!(c.phase(), &ViewPhase::Active("roof".into()));
        assert!(c.position().distance(Vec3::new(8.0, 25.0, 12.0)) < 0.1);

        // No further events once settled.
        assert!(c.tick(1.0 / 60.0).is_none());
    }

    #[test]
    fn test_first_step_is_smoothing_fraction() {
        let mut c = controller();
        c.request("roof").unwrap();
        c.tick(1.0 / 60.0);
        let expected = Vec3::new(25.0, 18.0, 30.0)
            + (Vec3::new(8.0, 25.0, 12.0) - Vec3::new(25.0, 18.0, 30.0)) * 0.05;
        assert!(c.position().distance(expected) < 1e-5);
    }

    #[test]
    fn test_returning_to_default_yields_default_phase() {
        let mut c = controller();
        c.request("roof").unwrap();
        run_to_completion(&mut c);
        c.request_default();
        let events = run_to_completion(&mut c);
        assert_eq!(events.len(), 1);
        assert_eq!(c.phase(), &ViewPhase::Default);
    }

    #[test]
    fn test_retarget_has_no_jump() {
        let mut c = controller();
        c.request("roof").unwrap();
        for _ in 0..10 {
            c.tick(1.0 / 60.0);
        }
        let before = c.position();
        c.request("parking").unwrap();
        assert_eq!(c.position(), before);
        c.tick(1.0 / 60.0);
        let step = c.position().distance(before);
        let remaining = before.distance(Vec3::new(15.0, 4.0, 18.0));
        assert!((step - remaining * 0.05).abs() < 1e-4);

        let events = run_to_completion(&mut c);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].view, "parking");
        assert_eq!(c.phase(), &ViewPhase::Active("parking".into()));
    }

    #[test]
    fn test_unknown_view_leaves_state() {
        let mut c = controller();
        c.request("roof").unwrap();
        let err = c.request("basement").unwrap_err();
        assert!(matches!(err, ViewerError::UnknownView(ref id) if id == "basement"));
        assert_eq!(c.view_id(), "roof");
    }

    #[test]
    fn test_stalled_transition_is_forced() {
        let options = TransitionOptions {
            smoothing_factor: 0.05,
            // Unreachable threshold: the exact-zero distance never happens.
            convergence_threshold: f32::MIN_POSITIVE,
            max_transition_frames: 120,
            max_transition_secs: 100.0,
        };
        let mut c = ViewController::new(table(), options);
        c.request("roof").unwrap();
        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(c.tick(1.0 / 60.0));
        }
        assert_eq!(events.len(), 1);
        assert!(events[0].forced);
        assert_eq!(events[0].frames, 120);
        assert_eq!(c.position(), Vec3::new(8.0, 25.0, 12.0));
        assert_eq!(c.phase(), &ViewPhase::Active("roof".into()));
    }

    #[test]
    fn test_elapsed_time_fallback() {
        let options = TransitionOptions {
            smoothing_factor: 0.0001,
            max_transition_secs: 1.0,
            ..TransitionOptions::default()
        };
        let mut c = ViewController::new(table(), options);
        c.request("parking").unwrap();
        let mut forced = None;
        for _ in 0..20 {
            if let Some(e) = c.tick(0.1) {
                forced = Some(e);
                break;
            }
        }
        let forced = forced.expect("fallback should fire");
        assert!(forced.forced);
        assert!(forced.frames <= 11);
    }

    #[test]
    fn test_drag_suspends_until_next_request() {
        let mut c = controller();
        c.request("roof").unwrap();
        c.tick(1.0 / 60.0);
        let settled = c.begin_drag().expect("drag settles the flight");
        assert_eq!(settled.view, "roof");
        assert_eq!(c.phase(), &ViewPhase::Active("roof".into()));

        let manual = Vec3::new(-20.0, 12.0, 5.0);
        c.sync_manual_pose(manual, Vec3::new(0.0, 16.0, 0.0));
        c.end_drag();
        assert!(!c.is_dragging());
        assert!(c.is_suspended());
        assert!(c.tick(1.0 / 60.0).is_none());
        assert_eq!(c.position(), manual);

        c.request("parking").unwrap();
        assert!(!c.is_suspended());
        c.tick(1.0 / 60.0);
        assert_ne!(c.position(), manual);
        let events = run_to_completion(&mut c);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_drag_while_settled_emits_nothing() {
        let mut c = controller();
        assert!(c.begin_drag().is_none());
        c.end_drag();
        assert_eq!(c.phase(), &ViewPhase::Default);
    }

    proptest! {
        #[test]
        fn prop_every_view_settles(
            idx in 0usize..4,
            smoothing in 0.01f32..0.5,
        ) {
            let options = TransitionOptions {
                smoothing_factor: smoothing,
                ..TransitionOptions::default()
            };
            let mut c = ViewController::new(table(), options);
            let id = c.views().iter().nth(idx).unwrap().id.clone();
            c.request(&id).unwrap();
            let events = run_to_completion(&mut c);
            prop_assert_eq!(events.len(), 1);
            prop_assert_eq!(c.settled_view(), Some(id.as_str()));
        }

        #[test]
        fn prop_retarget_ends_on_last_request(
            first in 1usize..4,
            second in 1usize..4,
            frames in 0u32..80,
        ) {
            let mut c = controller();
            let a = c.views().iter().nth(first).unwrap().id.clone();
            let b = c.views().iter().nth(second).unwrap().id.clone();
            c.request(&a).unwrap();
            let mut early = Vec::new();
            for _ in 0..frames {
                early.extend(c.tick(1.0 / 60.0));
            }
            c.request(&b).unwrap();
            let events = run_to_completion(&mut c);
            prop_assert_eq!(events.last().map(|e| e.view.as_str()), Some(b.as_str()));
            prop_assert_eq!(c.phase(), &ViewPhase::Active(b.clone()));
            prop_assert!(early.len() <= 1);
        }
    }
}
