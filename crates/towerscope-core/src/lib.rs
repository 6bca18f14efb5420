//! Core logic for towerscope.
//!
//! This crate holds everything that does not touch the GPU:
//! - [`Catalog`] with the view, hotspot and overlay tables
//! - [`ViewController`], which smooths the camera between named views
//! - [`HotspotDispatcher`], which turns marker clicks into view requests
//! - [`OverlayPresenter`] and [`Typewriter`] for the data card
//! - [`SceneGraph`], the immutable scene
//! - Configuration options and the ready signal

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Indices are tiny; float casts are fine
#![allow(clippy::cast_precision_loss)]

pub mod catalog;
pub mod controller;
pub mod error;
pub mod hotspot;
pub mod options;
pub mod overlay;
pub mod ready;
pub mod scene;
pub mod typewriter;
pub mod view;

pub use catalog::Catalog;
pub use controller::{TransitionComplete, ViewController, ViewPhase};
pub use error::{Result, ViewerError};
pub use hotspot::{ClickOutcome, Hotspot, HotspotDispatcher, MarkerVisual, Ray, PICK_RADIUS};
pub use options::{OrbitOptions, OverlayOptions, TransitionOptions, ViewerOptions};
pub use overlay::{
    ease_out_cubic, MetricRow, MetricStatus, OverlayFrame, OverlayPanel, OverlayPresenter, RowFrame,
};
pub use ready::ReadySignal;
pub use scene::{Grid, Material, SceneDescription, SceneElement, SceneGraph, Shape, Star};
pub use typewriter::Typewriter;
pub use view::{View, ViewTable, DEFAULT_VIEW};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Splits a `0xRRGGBB` color into RGB components in `[0, 1]`.
pub fn hex_color(rgb: u32) -> [f32; 3] {
    let channel = |shift: u32| f32::from(((rgb >> shift) & 0xff) as u8) / 255.0;
    [channel(16), channel(8), channel(0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0x00ff_0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_color(0x0000_00ff), [0.0, 0.0, 1.0]);
        let [r, g, b] = hex_color(0x0022_d3ee);
        assert!((r - 34.0 / 255.0).abs() < 1e-6);
        assert!((g - 211.0 / 255.0).abs() < 1e-6);
        assert!((b - 238.0 / 255.0).abs() < 1e-6);
    }
}
