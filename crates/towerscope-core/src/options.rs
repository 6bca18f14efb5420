//! Configuration options for the viewer.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Tunables for the camera flight between views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionOptions {
    /// Fraction of the remaining distance covered per frame tick.
    pub smoothing_factor: f32,

    /// Distance (scene units) below which the camera has arrived.
    pub convergence_threshold: f32,

    /// Ticks after which a transition is force-completed.
    pub max_transition_frames: u32,

    /// Seconds after which a transition is force-completed.
    pub max_transition_secs: f32,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.05,
            convergence_threshold: 0.1,
            max_transition_frames: 600,
            max_transition_secs: 6.0,
        }
    }
}

/// Timings for the data-card overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// Seconds for the panel entry motion.
    pub enter_secs: f32,

    /// Seconds for the panel exit motion.
    pub exit_secs: f32,

    /// Delay before the first metric row starts to appear.
    pub row_base_delay_secs: f32,

    /// Additional delay per metric row.
    pub row_stagger_secs: f32,

    /// Seconds for a single row to fade in.
    pub row_fade_secs: f32,

    /// Seconds per revealed title character (0 disables the typewriter).
    pub typewriter_interval_secs: f32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            enter_secs: 0.3,
            exit_secs: 0.2,
            row_base_delay_secs: 0.1,
            row_stagger_secs: 0.05,
            row_fade_secs: 0.2,
            typewriter_interval_secs: 0.04,
        }
    }
}

/// Manual orbit limits and sensitivities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitOptions {
    /// Closest allowed distance from the look-at point.
    pub min_distance: f32,

    /// Farthest allowed distance from the look-at point.
    pub max_distance: f32,

    /// Smallest polar angle (radians from straight up).
    pub min_polar_angle: f32,

    /// Largest polar angle (radians from straight up).
    pub max_polar_angle: f32,

    /// Radians of orbit per pixel of drag.
    pub rotate_speed: f32,

    /// Fraction of the current distance per wheel line.
    pub zoom_speed: f32,

    /// Whether the camera slowly circles the scene while idle.
    pub auto_rotate: bool,

    /// Idle orbit speed in radians per second.
    pub auto_rotate_speed: f32,
}

impl Default for OrbitOptions {
    fn default() -> Self {
        Self {
            min_distance: 10.0,
            max_distance: 50.0,
            min_polar_angle: 0.2,
            max_polar_angle: std::f32::consts::FRAC_PI_2 - 0.1,
            rotate_speed: 0.01,
            zoom_speed: 0.1,
            auto_rotate: false,
            auto_rotate_speed: 0.15,
        }
    }
}

/// Global configuration options for the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Camera flight tunables.
    pub transition: TransitionOptions,

    /// Overlay timings.
    pub overlay: OverlayOptions,

    /// Manual orbit limits.
    pub orbit: OrbitOptions,

    /// Seconds after mount at which the ready signal fires regardless of settling.
    pub ready_fallback_secs: f32,

    /// Number of background stars in the built-in scene.
    pub star_count: u32,

    /// Background color.
    pub background_color: Vec3,

    /// Vertical field of view in degrees.
    pub fov_degrees: f32,

    /// Initial window size in logical pixels.
    pub window_size: (u32, u32),

    /// Window title.
    pub window_title: String,

    /// Optional JSON scene description replacing the built-in scene.
    pub external_scene: Option<PathBuf>,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            transition: TransitionOptions::default(),
            overlay: OverlayOptions::default(),
            orbit: OrbitOptions::default(),
            ready_fallback_secs: 1.5,
            star_count: 400,
            background_color: Vec3::new(0.02, 0.02, 0.063),
            fov_degrees: 45.0,
            window_size: (1280, 720),
            window_title: "towerscope".to_string(),
            external_scene: None,
        }
    }
}

impl ViewerOptions {
    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Returns the external scene path, treating an empty path as unset.
    pub fn external_scene_path(&self) -> Option<&Path> {
        self.external_scene
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Checks that every tunable is inside its usable range.
    pub fn validate(&self) -> Result<()> {
        let t = &self.transition;
        if !(t.smoothing_factor > 0.0 && t.smoothing_factor <= 1.0) {
            return Err(invalid(
                "transition.smoothing_factor",
                format!("must be in (0, 1], got {}", t.smoothing_factor),
            ));
        }
        if t.convergence_threshold <= 0.0 {
            return Err(invalid(
                "transition.convergence_threshold",
                format!("must be positive, got {}", t.convergence_threshold),
            ));
        }
        if t.max_transition_frames == 0 {
            return Err(invalid("transition.max_transition_frames", "must be non-zero"));
        }
        if t.max_transition_secs <= 0.0 {
            return Err(invalid(
                "transition.max_transition_secs",
                format!("must be positive, got {}", t.max_transition_secs),
            ));
        }

        let o = &self.overlay;
        for (name, value) in [
            ("overlay.enter_secs", o.enter_secs),
            ("overlay.exit_secs", o.exit_secs),
            ("overlay.row_base_delay_secs", o.row_base_delay_secs),
            ("overlay.row_stagger_secs", o.row_stagger_secs),
            ("overlay.row_fade_secs", o.row_fade_secs),
            ("overlay.typewriter_interval_secs", o.typewriter_interval_secs),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(invalid(name, format!("must be a non-negative number, got {value}")));
            }
        }

        let orbit = &self.orbit;
        if orbit.min_distance <= 0.0 || orbit.min_distance > orbit.max_distance {
            return Err(invalid(
                "orbit.min_distance",
                format!(
                    "must be positive and not above max_distance ({} > {})",
                    orbit.min_distance, orbit.max_distance
                ),
            ));
        }
        if orbit.min_polar_angle < 0.0
            || orbit.min_polar_angle >= orbit.max_polar_angle
            || orbit.max_polar_angle > std::f32::consts::PI
        {
            return Err(invalid(
                "orbit.min_polar_angle",
                "polar range must satisfy 0 <= min < max <= pi",
            ));
        }

        if self.ready_fallback_secs < 0.0 {
            return Err(invalid("ready_fallback_secs", "must be non-negative"));
        }
        if !(1.0..=170.0).contains(&self.fov_degrees) {
            return Err(invalid(
                "fov_degrees",
                format!("must be in [1, 170], got {}", self.fov_degrees),
            ));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ViewerError {
    ViewerError::InvalidOption {
        name,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = ViewerOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.transition.smoothing_factor, 0.05);
        assert_eq!(options.transition.convergence_threshold, 0.1);
        assert_eq!(options.ready_fallback_secs, 1.5);
        assert!(options.external_scene_path().is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options =
            ViewerOptions::from_json_str(r#"{ "transition": { "smoothing_factor": 0.2 } }"#)
                .unwrap();
        assert_eq!(options.transition.smoothing_factor, 0.2);
        assert_eq!(options.transition.convergence_threshold, 0.1);
        assert_eq!(options.star_count, 400);
    }

    #[test]
    fn test_rejects_zero_smoothing() {
        let err = ViewerOptions::from_json_str(r#"{ "transition": { "smoothing_factor": 0.0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ViewerError::InvalidOption {
                name: "transition.smoothing_factor",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_inverted_orbit_range() {
        let mut options = ViewerOptions::default();
        options.orbit.min_distance = 60.0;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_empty_external_scene_is_unset() {
        let options = ViewerOptions {
            external_scene: Some(PathBuf::new()),
            ..ViewerOptions::default()
        };
        assert!(options.external_scene_path().is_none());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            ViewerOptions::from_json_str("{ not json"),
            Err(ViewerError::Json(_))
        ));
    }
}
