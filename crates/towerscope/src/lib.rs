//! towerscope: an interactive 3D facility viewer.
//!
//! A stylized building sits on a glowing grid under a field of stars. Labeled
//! hotspot markers float around it; clicking one flies the camera to that
//! part of the building and, once the camera arrives, slides in a data card
//! with a typewriter title and staggered metric rows. Clicking the same
//! hotspot again flies back to the overview.
//!
//! # Quick Start
//!
//! ```no_run
//! use towerscope::*;
//!
//! fn main() -> Result<()> {
//!     let mut viewer = Viewer::new(ViewerOptions::default())?;
//!     viewer.on_ready(|| println!("scene ready"));
//!     viewer.request_view("roof")?;
//!
//!     // Opens the window and blocks until it is closed
//!     show(viewer)
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Viewer`] composes the [`ViewController`], [`HotspotDispatcher`],
//!   [`OverlayPresenter`] and [`SceneGraph`] and needs no GPU, so it can be
//!   driven from tests with [`Viewer::tick`].
//! - [`show`] runs it in a winit window with wgpu and egui.
//! - [`render_to_image`] and [`render_to_file`] capture a frame offscreen.

mod app;
mod headless;
mod loader;
mod viewer;

pub use headless::{render_to_file, render_to_image};
pub use viewer::Viewer;

// Re-export core types
pub use towerscope_core::{
    Catalog, ClickOutcome, Grid, Hotspot, HotspotDispatcher, Material, MetricRow, MetricStatus,
    OrbitOptions, OverlayOptions, OverlayPanel, OverlayPresenter, Result, SceneDescription,
    SceneElement, SceneGraph, Shape, TransitionComplete, TransitionOptions, Typewriter, View,
    ViewController, ViewPhase, ViewTable, ViewerError, ViewerOptions, DEFAULT_VIEW,
    Mat4, Vec2, Vec3, Vec4,
};

// Re-export render types
pub use towerscope_render::{Camera, MarkerInstance, RenderEngine};

/// Opens the viewer window.
///
/// Blocks until the window is closed (Escape or the close button). Logging is
/// initialized from `RUST_LOG` if nothing else has set it up.
///
/// # Errors
/// Returns an error if the event loop, window or GPU device cannot be created.
pub fn show(viewer: Viewer) -> Result<()> {
    let _ = env_logger::try_init();
    app::run_app(viewer)
}
