//! Headless rendering API for towerscope.
//!
//! Renders the viewer's current frame to an image buffer or file without
//! opening a window. Useful for integration tests and for generating stills
//! of each view.

use std::path::Path;

use pollster::FutureExt;
use towerscope_render::RenderEngine;

use crate::app::draw_viewer_ui;
use crate::{Result, Viewer, ViewerError};

/// Renders the viewer's current frame to a PNG or JPEG file.
///
/// # Example
/// ```no_run
/// use towerscope::*;
///
/// let mut viewer = Viewer::new(ViewerOptions::default()).unwrap();
/// render_to_file(&mut viewer, "overview.png", 800, 600).unwrap();
/// ```
pub fn render_to_file(
    viewer: &mut Viewer,
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> Result<()> {
    let data = render_to_image(viewer, width, height)?;
    towerscope_render::save_image(path, &data, width, height)
        .map_err(|e| ViewerError::RenderError(format!("failed to save image: {e}")))
}

/// Renders the viewer's current frame to a raw RGBA pixel buffer.
///
/// The scene, hotspot markers, labels and data card are drawn as they would
/// be in the window. A pending external scene is waited for first. The buffer
/// holds `width * height * 4` bytes, row by row from the top left.
pub fn render_to_image(viewer: &mut Viewer, width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(ViewerError::RenderError(format!(
            "invalid capture size {width}x{height}"
        )));
    }
    viewer.wait_for_scene();
    viewer.set_viewport(width, height);

    let mut engine = RenderEngine::new_headless(width, height)
        .block_on()
        .map_err(|e| ViewerError::RenderError(format!("failed to create headless engine: {e}")))?;
    engine.camera = viewer.camera().clone();

    if let Some(scene) = viewer.scene() {
        engine.prepare_scene(scene, &viewer.markers(), viewer.elapsed());
    }

    let view = engine.create_capture_target();
    let mut encoder = engine
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("headless encoder"),
        });
    engine.render_scene(
        &mut encoder,
        &view,
        viewer.options().background_color,
        viewer.scene().is_some(),
    );
    let ui_renderer = paint_ui(&engine, viewer, &mut encoder, &view);
    engine.queue.submit(std::iter::once(encoder.finish()));
    drop(ui_renderer);

    engine
        .capture_frame()
        .map_err(|e| ViewerError::RenderError(format!("failed to capture frame: {e}")))
}

/// Runs one egui pass for the viewer and paints it over `view`.
///
/// The returned renderer owns the buffers the pass reads; keep it until the
/// encoder is submitted.
fn paint_ui(
    engine: &RenderEngine,
    viewer: &Viewer,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
) -> egui_wgpu::Renderer {
    let (width, height) = engine.dimensions();
    let ctx = egui::Context::default();
    ctx.set_visuals(egui::Visuals::dark());

    #[allow(clippy::cast_precision_loss)]
    let raw_input = egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(width as f32, height as f32),
        )),
        ..Default::default()
    };
    let output = ctx.run(raw_input, |ctx| {
        draw_viewer_ui(ctx, viewer, width, height);
    });

    let mut renderer = egui_wgpu::Renderer::new(
        &engine.device,
        engine.target_format(),
        egui_wgpu::RendererOptions::default(),
    );
    let screen_descriptor = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [width, height],
        pixels_per_point: 1.0,
    };
    towerscope_ui::paint_output(
        &ctx,
        &mut renderer,
        &engine.device,
        &engine.queue,
        encoder,
        view,
        &screen_descriptor,
        output,
    );
    renderer
}
