//! In-scene markers that switch the camera between views.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::controller::ViewController;
use crate::error::Result;

/// Radius of the pickable sphere around a marker.
pub const PICK_RADIUS: f32 = 0.6;

/// A labeled marker bound to a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// World-space anchor.
    pub position: Vec3,
    /// Display label.
    pub label: String,
    /// View activated by clicking this marker.
    pub view: String,
    /// Accent color as `0xRRGGBB`.
    pub color: u32,
}

impl Hotspot {
    /// Creates a new hotspot.
    pub fn new(position: Vec3, label: impl Into<String>, view: impl Into<String>, color: u32) -> Self {
        Self {
            position,
            label: label.into(),
            view: view.into(),
            color,
        }
    }

    /// Accent color as linear RGB.
    pub fn rgb(&self) -> [f32; 3] {
        crate::hex_color(self.color)
    }
}

/// A ray in world space, used for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Distance along the ray to the first intersection with a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t0 = -b - sq;
        let t1 = -b + sq;
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            // Origin inside the sphere.
            Some(t1)
        } else {
            None
        }
    }
}

/// Animated transform of one marker for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerVisual {
    /// Anchor plus float offset.
    pub position: Vec3,
    /// Uniform scale of the core sphere.
    pub scale: f32,
    /// Rotation of the outer ring around its axis, radians.
    pub ring_rotation: f32,
    /// Uniform scale of the outer ring.
    pub ring_scale: f32,
    /// Emissive boost; active and hovered markers glow.
    pub glow: f32,
    pub active: bool,
    pub hovered: bool,
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The hotspot's view became the target.
    Activated(String),
    /// The hotspot was already targeted; the camera returns to the default view.
    Deactivated(String),
}

/// Maps pointer interaction on markers to view requests.
#[derive(Debug, Clone)]
pub struct HotspotDispatcher {
    hotspots: Vec<Hotspot>,
    hovered: Option<usize>,
}

impl HotspotDispatcher {
    /// Creates a dispatcher over `hotspots`.
    pub fn new(hotspots: Vec<Hotspot>) -> Self {
        Self {
            hotspots,
            hovered: None,
        }
    }

    /// All markers in declaration order.
    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    /// Toggles the view of hotspot `index`.
    ///
    /// If the hotspot's view is already the controller's target, the camera
    /// goes back to the default view. Otherwise the hotspot's view is requested.
    pub fn click(&self, index: usize, controller: &mut ViewController) -> Result<Option<ClickOutcome>> {
        let Some(hotspot) = self.hotspots.get(index) else {
            return Ok(None);
        };
        if controller.view_id() == hotspot.view {
            log::info!("hotspot '{}' toggled off", hotspot.label);
            controller.request_default();
            Ok(Some(ClickOutcome::Deactivated(hotspot.view.clone())))
        } else {
            log::info!("hotspot '{}' -> view '{}'", hotspot.label, hotspot.view);
            controller.request(&hotspot.view)?;
            Ok(Some(ClickOutcome::Activated(hotspot.view.clone())))
        }
    }

    /// Sets the hovered marker. Hover never changes the view.
    pub fn set_hovered(&mut self, index: Option<usize>) {
        self.hovered = index.filter(|&i| i < self.hotspots.len());
    }

    /// Currently hovered marker.
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Index of the nearest marker hit by `ray` at time `t`.
    pub fn pick(&self, ray: &Ray, t: f32) -> Option<usize> {
        self.hotspots
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                let center = h.position + Vec3::Y * float_offset(t, i);
                ray.intersect_sphere(center, PICK_RADIUS).map(|d| (i, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Visual state of every marker at time `t` for the given target view.
    pub fn visuals(&self, active_view: &str, t: f32) -> Vec<MarkerVisual> {
        self.hotspots
            .iter()
            .enumerate()
            .map(|(i, h)| {
                marker_visual(
                    h,
                    i,
                    h.view == active_view,
                    self.hovered == Some(i),
                    t,
                )
            })
            .collect()
    }
}

fn float_offset(t: f32, index: usize) -> f32 {
    (2.0 * t + index as f32).sin() * 0.15
}

/// Animated transform of a single marker.
pub fn marker_visual(hotspot: &Hotspot, index: usize, active: bool, hovered: bool, t: f32) -> MarkerVisual {
    let scale = if active {
        1.3
    } else if hovered {
        1.15
    } else {
        1.0 + (3.0 * t).sin() * 0.1
    };
    let glow = if active {
        1.0
    } else if hovered {
        0.8
    } else {
        0.5
    };
    MarkerVisual {
        position: hotspot.position + Vec3::Y * float_offset(t, index),
        scale,
        ring_rotation: t,
        ring_scale: 1.0 + (2.0 * t).sin() * 0.2,
        glow,
        active,
        hovered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransitionOptions;
    use crate::view::{View, ViewTable, DEFAULT_VIEW};

    fn setup() -> (HotspotDispatcher, ViewController) {
        let views = ViewTable::new(
            vec![
                View::new(DEFAULT_VIEW, Vec3::new(25.0, 18.0, 30.0), Vec3::new(0.0, 8.0, 0.0)),
                View::new("roof", Vec3::new(8.0, 25.0, 12.0), Vec3::new(0.0, 16.0, 0.0)),
                View::new("parking", Vec3::new(15.0, 4.0, 18.0), Vec3::new(0.0, 1.0, 0.0)),
            ],
            DEFAULT_VIEW,
        )
        .unwrap();
        let dispatcher = HotspotDispatcher::new(vec![
            Hotspot::new(Vec3::new(0.0, 18.0, 0.0), "ROOF SYSTEMS", "roof", 0x0022_d3ee),
            Hotspot::new(Vec3::new(6.0, 1.5, 6.0), "ENTRANCE / PARKING", "parking", 0x0010_b981),
        ]);
        (dispatcher, ViewController::new(views, TransitionOptions::default()))
    }

    #[test]
    fn test_click_toggles() {
        let (d, mut c) = setup();
        assert_eq!(
            d.click(0, &mut c).unwrap(),
            Some(ClickOutcome::Activated("roof".into()))
        );
        assert_eq!(c.view_id(), "roof");
        // Clicking again while still in flight returns to the overview.
        assert_eq!(
            d.click(0, &mut c).unwrap(),
            Some(ClickOutcome::Deactivated("roof".into()))
        );
        assert_eq!(c.view_id(), DEFAULT_VIEW);
    }

    #[test]
    fn test_click_other_hotspot_retargets() {
        let (d, mut c) = setup();
        d.click(0, &mut c).unwrap();
        d.click(1, &mut c).unwrap();
        assert_eq!(c.view_id(), "parking");
    }

    #[test]
    fn test_click_out_of_range_is_ignored() {
        let (d, mut c) = setup();
        assert_eq!(d.click(9, &mut c).unwrap(), None);
        assert!(!c.is_transitioning());
    }

    #[test]
    fn test_hover_is_visual_only() {
        let (mut d, c) = setup();
        d.set_hovered(Some(1));
        assert!(!c.is_transitioning());
        let v = d.visuals(c.view_id(), 0.0);
        assert_eq!(v[1].scale, 1.15);
        assert!(v[1].hovered);
        assert!(!v[0].hovered);

        d.set_hovered(Some(7));
        assert_eq!(d.hovered(), None);
    }

    #[test]
    fn test_active_marker_scale() {
        let (d, _) = setup();
        let v = d.visuals("roof", 1.0);
        assert_eq!(v[0].scale, 1.3);
        assert!(v[0].active);
        assert!((v[1].scale - (1.0 + 3.0f32.sin() * 0.1)).abs() < 1e-6);
        assert!((v[0].ring_scale - (1.0 + 2.0f32.sin() * 0.2)).abs() < 1e-6);
    }

    #[test]
    fn test_pick_nearest() {
        let (d, _) = setup();
        // Straight down through the roof marker; t chosen so float offsets are zero-ish.
        let ray = Ray::new(Vec3::new(0.0, 40.0, 0.0), Vec3::NEG_Y);
        assert_eq!(d.pick(&ray, 0.0), Some(0));

        let miss = Ray::new(Vec3::new(30.0, 40.0, 30.0), Vec3::NEG_Y);
        assert_eq!(d.pick(&miss, 0.0), None);
    }

    #[test]
    fn test_pick_prefers_closer_marker() {
        let d = HotspotDispatcher::new(vec![
            Hotspot::new(Vec3::new(0.0, 0.0, -10.0), "far", "a", 0),
            Hotspot::new(Vec3::new(0.0, 0.0, -5.0), "near", "b", 0),
        ]);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        // At t = 0 marker 1 floats by sin(1) * 0.15, well inside the pick radius.
        assert_eq!(d.pick(&ray, 0.0), Some(1));
    }

    #[test]
    fn test_ray_sphere() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let d = ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0).unwrap();
        assert!((d - 4.0).abs() < 1e-5);
        assert!(ray.intersect_sphere(Vec3::new(-5.0, 0.0, 0.0), 1.0).is_none());
        let inside = ray.intersect_sphere(Vec3::ZERO, 1.0).unwrap();
        assert!((inside - 1.0).abs() < 1e-5);
    }
}
