//! Application window and event loop management.

mod input;
mod render;

pub(super) use std::sync::Arc;

pub(super) use egui_wgpu::ScreenDescriptor;
pub(super) use pollster::FutureExt;
pub(super) use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

pub(super) use towerscope_render::RenderEngine;
pub(super) use towerscope_ui::EguiIntegration;

pub(crate) use render::draw_viewer_ui;

use crate::{Result, Viewer, ViewerError};

/// The towerscope application state.
pub struct App {
    pub(super) viewer: Viewer,
    pub(super) window: Option<Arc<Window>>,
    pub(super) engine: Option<RenderEngine>,
    pub(super) egui: Option<EguiIntegration>,
    // Physical pointer state, tracked even when egui consumes the event
    pub(super) mouse_pos: (f64, f64),
    pub(super) left_mouse_down: bool,
    // Accumulated distance since the left button went down
    pub(super) drag_distance: f64,
    // True once the press has turned into an orbit drag
    pub(super) orbiting: bool,
    pub(super) last_frame_time: Option<std::time::Instant>,
    // First fatal error hit inside the event loop
    pub(super) error: Option<ViewerError>,
}

impl App {
    /// Creates a new application around `viewer`.
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            window: None,
            engine: None,
            egui: None,
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            drag_distance: 0.0,
            orbiting: false,
            last_frame_time: None,
            error: None,
        }
    }

    /// Records a fatal error and stops the event loop.
    pub(super) fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{error}");
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }
}

/// Runs the application until the window closes.
pub fn run_app(viewer: Viewer) -> Result<()> {
    let event_loop = EventLoop::new()
        .map_err(|e| ViewerError::RenderError(format!("failed to create event loop: {e}")))?;
    let mut app = App::new(viewer);

    event_loop
        .run_app(&mut app)
        .map_err(|e| ViewerError::RenderError(format!("event loop error: {e}")))?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
