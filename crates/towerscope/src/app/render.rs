use super::{ActiveEventLoop, App, ScreenDescriptor};
use crate::{Viewer, ViewerError};

/// Draws the labels, the data card or the loading placeholder for one frame
/// of a `width`×`height` pixel viewport.
pub(crate) fn draw_viewer_ui(ctx: &egui::Context, viewer: &Viewer, width: u32, height: u32) {
    if viewer.scene().is_none() {
        towerscope_ui::draw_loading_placeholder(ctx, viewer.elapsed());
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let labels = viewer.labels(width as f32, height as f32, ctx.pixels_per_point());
    towerscope_ui::draw_hotspot_labels(ctx, &labels);

    if let Some(frame) = viewer.overlay_frame() {
        towerscope_ui::draw_data_card(ctx, &frame);
    }
}

impl App {
    /// Renders a single frame.
    pub(super) fn render(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(engine), Some(egui), Some(window)) =
            (&mut self.engine, &mut self.egui, &self.window)
        else {
            return;
        };
        let Some(surface) = &engine.surface else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = engine.dimensions();
                engine.resize(width, height);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
                return;
            }
            Err(e @ (wgpu::SurfaceError::OutOfMemory | wgpu::SurfaceError::Other)) => {
                self.fail(event_loop, ViewerError::RenderError(e.to_string()));
                return;
            }
        };

        engine.camera = self.viewer.camera().clone();
        let t = self.viewer.elapsed();
        let draw_geometry = match self.viewer.scene() {
            Some(scene) => {
                engine.prepare_scene(scene, &self.viewer.markers(), t);
                true
            }
            None => {
                engine.update_camera_uniforms(t);
                false
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        engine.render_scene(
            &mut encoder,
            &view,
            self.viewer.options().background_color,
            draw_geometry,
        );

        egui.begin_frame(window);
        draw_viewer_ui(&egui.context, &self.viewer, engine.width, engine.height);
        let egui_output = egui.end_frame(window);

        #[allow(clippy::cast_possible_truncation)]
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [engine.width, engine.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        egui.render(
            &engine.device,
            &engine.queue,
            &mut encoder,
            &view,
            &screen_descriptor,
            egui_output,
        );

        engine.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
