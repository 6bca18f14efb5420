//! The viewer state: every component wired together, without a GPU.

use glam::{Vec2, Vec3};
use towerscope_core::{
    Catalog, ClickOutcome, HotspotDispatcher, OverlayFrame, OverlayPresenter, Ray, ReadySignal,
    Result, SceneGraph, TransitionComplete, ViewController, ViewPhase, ViewerOptions,
};
use towerscope_render::{Camera, MarkerInstance};
use towerscope_ui::HotspotLabel;

use crate::loader::SceneLoader;

/// Height above a marker at which its label is pinned.
const LABEL_LIFT: f32 = 1.2;

enum SceneSource {
    Loaded(SceneGraph),
    Loading(SceneLoader),
}

/// The interactive scene viewer.
///
/// Owns the view controller, hotspot dispatcher, overlay presenter, scene and
/// orbit camera. Advance it with [`tick`](Self::tick) once per frame and feed
/// it pointer input; [`show`](crate::show) and
/// [`render_to_image`](crate::render_to_image) do both for you.
pub struct Viewer {
    options: ViewerOptions,
    catalog: Catalog,
    controller: ViewController,
    dispatcher: HotspotDispatcher,
    overlay: OverlayPresenter,
    scene: SceneSource,
    ready: ReadySignal,
    camera: Camera,
    elapsed: f32,
    on_ready: Option<Box<dyn FnMut()>>,
    on_transition_complete: Option<Box<dyn FnMut(&TransitionComplete)>>,
}

impl Viewer {
    /// Creates a viewer over the built-in facility catalog.
    pub fn new(options: ViewerOptions) -> Result<Self> {
        Self::with_catalog(options, Catalog::facility())
    }

    /// Creates a viewer over `catalog`.
    ///
    /// Both the options and the catalog are validated first. If
    /// `options.external_scene` names a file, it starts loading in the
    /// background and the viewer shows a placeholder until it arrives.
    pub fn with_catalog(options: ViewerOptions, catalog: Catalog) -> Result<Self> {
        options.validate()?;
        catalog.validate()?;

        let controller = ViewController::new(catalog.view_table()?, options.transition.clone());
        let dispatcher = HotspotDispatcher::new(catalog.hotspots.clone());
        let overlay = OverlayPresenter::new(options.overlay.clone());
        let ready = ReadySignal::new(options.ready_fallback_secs);

        let scene = match options.external_scene_path() {
            Some(path) => SceneSource::Loading(SceneLoader::spawn(path, options.star_count)),
            None => SceneSource::Loaded(SceneGraph::facility(options.star_count)),
        };

        let (w, h) = options.window_size;
        #[allow(clippy::cast_precision_loss)]
        let mut camera = Camera::new(w.max(1) as f32 / h.max(1) as f32);
        camera.set_fov_degrees(options.fov_degrees);
        camera.set_pose(controller.position(), controller.look_at());

        log::info!(
            "viewer mounted: {} views, {} hotspots",
            controller.views().len(),
            dispatcher.hotspots().len()
        );

        Ok(Self {
            options,
            catalog,
            controller,
            dispatcher,
            overlay,
            scene,
            ready,
            camera,
            elapsed: 0.0,
            on_ready: None,
            on_transition_complete: None,
        })
    }

    /// Registers the one-shot ready callback.
    pub fn on_ready(&mut self, callback: impl FnMut() + 'static) {
        self.on_ready = Some(Box::new(callback));
    }

    /// Registers a callback fired once per finished transition.
    pub fn on_transition_complete(&mut self, callback: impl FnMut(&TransitionComplete) + 'static) {
        self.on_transition_complete = Some(Box::new(callback));
    }

    /// Advances everything by one frame of `dt` seconds.
    ///
    /// Returns the transition that finished on this frame, if any.
    pub fn tick(&mut self, dt: f32) -> Option<TransitionComplete> {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        self.poll_scene();

        let completed = self.controller.tick(dt);
        if let Some(done) = &completed {
            self.arrive(done);
        }

        if self.options.orbit.auto_rotate
            && !self.controller.is_dragging()
            && !self.controller.is_transitioning()
        {
            self.camera
                .rotate_around_up(self.options.orbit.auto_rotate_speed * dt);
            self.controller
                .sync_manual_pose(self.camera.position, self.camera.target);
        }
        self.camera
            .set_pose(self.controller.position(), self.controller.look_at());

        self.overlay.tick(dt);

        let loaded = matches!(self.scene, SceneSource::Loaded(_));
        if self
            .ready
            .tick(dt, loaded, !self.controller.is_transitioning())
        {
            if let Some(callback) = &mut self.on_ready {
                callback();
            }
        }

        completed
    }

    /// Flies to `view_id`. The data card leaves immediately.
    pub fn request_view(&mut self, view_id: &str) -> Result<()> {
        self.controller.request(view_id)?;
        self.overlay.hide();
        Ok(())
    }

    /// Flies back to the overview.
    pub fn request_default(&mut self) {
        self.controller.request_default();
        self.overlay.hide();
    }

    /// Clicks hotspot `index`: its view is targeted, or the default view if it
    /// already was.
    pub fn click_hotspot(&mut self, index: usize) -> Result<Option<ClickOutcome>> {
        let outcome = self.dispatcher.click(index, &mut self.controller)?;
        if outcome.is_some() {
            self.overlay.hide();
        }
        Ok(outcome)
    }

    /// Clicks whatever hotspot lies under pixel `(x, y)`.
    pub fn click_at(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<Option<ClickOutcome>> {
        match self.pick_at(x, y, width, height) {
            Some(index) => {
                log::debug!("picked hotspot {index} at ({x:.0}, {y:.0})");
                self.click_hotspot(index)
            }
            None => Ok(None),
        }
    }

    /// Index of the nearest hotspot under pixel `(x, y)`.
    pub fn pick_at(&self, x: f32, y: f32, width: f32, height: f32) -> Option<usize> {
        let (origin, direction) = self.camera.screen_ray(x, y, width, height);
        self.dispatcher
            .pick(&Ray::new(origin, direction), self.elapsed)
    }

    /// Updates the hover highlight from the pointer position.
    pub fn hover_at(&mut self, x: f32, y: f32, width: f32, height: f32) -> Option<usize> {
        let hit = self.pick_at(x, y, width, height);
        self.dispatcher.set_hovered(hit);
        hit
    }

    /// Clears the hover highlight.
    pub fn clear_hover(&mut self) {
        self.dispatcher.set_hovered(None);
    }

    /// The user grabbed the camera. A flight in progress settles on its target.
    pub fn begin_drag(&mut self) {
        if let Some(done) = self.controller.begin_drag() {
            self.arrive(&done);
        }
    }

    /// Orbits by a pointer delta in pixels while dragging.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        if !self.controller.is_dragging() {
            return;
        }
        let speed = self.options.orbit.rotate_speed;
        self.camera.orbit(dx * speed, dy * speed, &self.options.orbit);
        self.controller
            .sync_manual_pose(self.camera.position, self.camera.target);
    }

    /// The user let go of the camera.
    pub fn end_drag(&mut self) {
        self.controller.end_drag();
    }

    /// Dollies by wheel `steps`; positive moves closer.
    pub fn zoom(&mut self, steps: f32) {
        let orbit = &self.options.orbit;
        let delta = steps * orbit.zoom_speed * self.camera.distance();
        self.camera.zoom(delta, orbit);
        self.controller
            .sync_manual_pose(self.camera.position, self.camera.target);
    }

    /// Tells the camera the viewport size so picking and projection match.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            #[allow(clippy::cast_precision_loss)]
            self.camera.set_aspect_ratio(width as f32 / height as f32);
        }
    }

    /// Hotspot markers to draw this frame.
    pub fn markers(&self) -> Vec<MarkerInstance> {
        self.dispatcher
            .visuals(self.controller.view_id(), self.elapsed)
            .into_iter()
            .zip(self.dispatcher.hotspots())
            .map(|(visual, hotspot)| MarkerInstance {
                visual,
                color: hotspot.rgb(),
            })
            .collect()
    }

    /// Marker labels in logical points for a `width`×`height` pixel viewport.
    pub fn labels(&self, width: f32, height: f32, pixels_per_point: f32) -> Vec<HotspotLabel> {
        let ppp = pixels_per_point.max(f32::EPSILON);
        self.markers()
            .into_iter()
            .zip(self.dispatcher.hotspots())
            .filter_map(|(marker, hotspot)| {
                let anchor = marker.visual.position + Vec3::Y * LABEL_LIFT;
                let pixel = self.camera.project(anchor, width, height)?;
                Some(HotspotLabel {
                    text: hotspot.label.clone(),
                    color: marker.color,
                    screen_pos: pixel / ppp,
                    active: marker.visual.active,
                    hovered: marker.visual.hovered,
                })
            })
            .collect()
    }

    /// Data card draw state, if a card is on screen.
    pub fn overlay_frame(&self) -> Option<OverlayFrame<'_>> {
        self.overlay.frame()
    }

    /// The scene, once it is available.
    pub fn scene(&self) -> Option<&SceneGraph> {
        match &self.scene {
            SceneSource::Loaded(scene) => Some(scene),
            SceneSource::Loading(_) => None,
        }
    }

    /// True while an external scene is still loading.
    pub fn is_loading(&self) -> bool {
        matches!(self.scene, SceneSource::Loading(_))
    }

    /// Blocks until a pending external scene has been loaded (or replaced by
    /// the built-in one).
    pub fn wait_for_scene(&mut self) {
        if let SceneSource::Loading(loader) = &self.scene {
            let result = loader.wait();
            self.finish_loading(result);
        }
    }

    fn poll_scene(&mut self) {
        if let SceneSource::Loading(loader) = &self.scene {
            if let Some(result) = loader.poll() {
                self.finish_loading(result);
            }
        }
    }

    fn finish_loading(&mut self, result: Result<SceneGraph>) {
        let source = match &self.scene {
            SceneSource::Loading(loader) => loader.path().display().to_string(),
            SceneSource::Loaded(_) => String::new(),
        };
        let scene = match result {
            Ok(scene) => {
                log::info!(
                    "external scene {source} loaded: {} elements",
                    scene.elements().len()
                );
                scene
            }
            Err(e) => {
                log::warn!("{source}: {e}; using the built-in scene");
                SceneGraph::facility(self.options.star_count)
            }
        };
        self.scene = SceneSource::Loaded(scene);
    }

    fn arrive(&mut self, done: &TransitionComplete) {
        log::debug!(
            "transition complete: '{}' after {} frames{}",
            done.view,
            done.frames,
            if done.forced { " (forced)" } else { "" }
        );
        if let Some(panel) = self.catalog.overlay_for(&done.view) {
            self.overlay.show(panel);
        }
        if let Some(callback) = &mut self.on_transition_complete {
            callback(done);
        }
    }

    /// Current logical phase.
    pub fn phase(&self) -> &ViewPhase {
        self.controller.phase()
    }

    /// The view controller.
    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    /// The hotspot dispatcher.
    pub fn dispatcher(&self) -> &HotspotDispatcher {
        &self.dispatcher
    }

    /// The overlay presenter.
    pub fn overlay(&self) -> &OverlayPresenter {
        &self.overlay
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Seconds since mount.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// True once the ready signal has fired.
    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// Screen-space position of hotspot `index` for a viewport, in pixels.
    pub fn hotspot_screen_position(&self, index: usize, width: f32, height: f32) -> Option<Vec2> {
        let hotspot = self.dispatcher.hotspots().get(index)?;
        self.camera.project(hotspot.position, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn settle(viewer: &mut Viewer) -> Option<TransitionComplete> {
        for _ in 0..600 {
            if let Some(done) = viewer.tick(DT) {
                return Some(done);
            }
        }
        None
    }

    #[test]
    fn test_camera_follows_controller() {
        let mut viewer = Viewer::new(ViewerOptions::default()).unwrap();
        viewer.request_view("roof").unwrap();
        viewer.tick(DT);
        assert_eq!(viewer.camera().position, viewer.controller().position());
        settle(&mut viewer).unwrap();
        let roof = viewer.catalog().view_table().unwrap().get("roof").unwrap().clone();
        assert!(viewer.camera().position.distance(roof.position) < 0.1);
    }

    #[test]
    fn test_drag_settles_flight_and_shows_card() {
        let mut viewer = Viewer::new(ViewerOptions::default()).unwrap();
        viewer.request_view("roof").unwrap();
        viewer.tick(DT);
        viewer.begin_drag();
        assert_eq!(viewer.phase(), &ViewPhase::Active("roof".into()));
        assert!(viewer.overlay().is_visible());

        let before = viewer.camera().position;
        viewer.drag(40.0, 0.0);
        viewer.end_drag();
        viewer.tick(DT);
        assert_ne!(viewer.camera().position, before);
        // Suspended: no pull back toward the view.
        let moved = viewer.camera().position;
        viewer.tick(DT);
        assert_eq!(viewer.camera().position, moved);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut viewer = Viewer::new(ViewerOptions::default()).unwrap();
        for _ in 0..100 {
            viewer.zoom(1.0);
        }
        let min = viewer.options().orbit.min_distance;
        assert!((viewer.camera().distance() - min).abs() < 1e-3);
        for _ in 0..100 {
            viewer.zoom(-1.0);
        }
        let max = viewer.options().orbit.max_distance;
        assert!((viewer.camera().distance() - max).abs() < 1e-3);
    }

    #[test]
    fn test_auto_rotate_only_when_idle() {
        let mut options = ViewerOptions::default();
        options.orbit.auto_rotate = true;
        let mut viewer = Viewer::new(options).unwrap();
        let start = viewer.camera().position;
        viewer.tick(DT);
        assert_ne!(viewer.camera().position, start);
        assert_eq!(viewer.camera().position, viewer.controller().position());
    }

    #[test]
    fn test_pick_projected_hotspot() {
        let mut viewer = Viewer::new(ViewerOptions::default()).unwrap();
        viewer.set_viewport(1280, 720);
        viewer.tick(DT);
        let pos = viewer.hotspot_screen_position(0, 1280.0, 720.0).unwrap();
        // Markers float a little; a direct hit on the anchor stays inside the pick radius.
        assert_eq!(viewer.pick_at(pos.x, pos.y, 1280.0, 720.0), Some(0));
        assert_eq!(viewer.pick_at(2.0, 2.0, 1280.0, 720.0), None);
    }

    #[test]
    fn test_labels_follow_markers() {
        let viewer = Viewer::new(ViewerOptions::default()).unwrap();
        let labels = viewer.labels(1280.0, 720.0, 2.0);
        assert_eq!(labels.len(), viewer.dispatcher().hotspots().len());
        for label in &labels {
            assert!(label.screen_pos.x > 0.0 && label.screen_pos.x < 640.0);
        }
    }

    #[test]
    fn test_missing_external_scene_falls_back() {
        let options = ViewerOptions {
            external_scene: Some(std::env::temp_dir().join("towerscope_no_such_scene.json")),
            ..ViewerOptions::default()
        };
        let mut viewer = Viewer::new(options).unwrap();
        viewer.wait_for_scene();
        assert!(!viewer.is_loading());
        assert!(viewer.scene().unwrap().element("core").is_some());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut options = ViewerOptions::default();
        options.transition.smoothing_factor = 0.0;
        assert!(Viewer::new(options).is_err());
    }
}
