//! egui integration with wgpu and winit.

use egui::Context;
use egui_wgpu::Renderer as EguiRenderer;
use egui_wgpu::ScreenDescriptor;
use egui_winit::State as EguiWinitState;
use winit::event::WindowEvent;
use winit::window::Window;

/// Manages egui state and rendering.
pub struct EguiIntegration {
    pub context: Context,
    pub state: EguiWinitState,
    pub renderer: EguiRenderer,
}

impl EguiIntegration {
    /// Creates a new egui integration.
    #[must_use]
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat, window: &Window) -> Self {
        let context = Context::default();

        // Configure dark theme
        context.set_visuals(egui::Visuals::dark());

        let viewport_id = context.viewport_id();
        let state = EguiWinitState::new(context.clone(), viewport_id, window, None, None, None);

        let renderer =
            EguiRenderer::new(device, output_format, egui_wgpu::RendererOptions::default());

        Self {
            context,
            state,
            renderer,
        }
    }

    /// Handles a winit window event.
    /// Returns true if egui consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    /// True while the pointer is over an egui area (the data card, for example).
    pub fn wants_pointer(&self) -> bool {
        self.context.is_pointer_over_area() || self.context.wants_pointer_input()
    }

    /// Begins a new frame by collecting input events and starting the egui pass.
    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.context.begin_pass(raw_input);
    }

    /// Ends the frame, handles platform output and returns the paint data.
    pub fn end_frame(&mut self, window: &Window) -> egui::FullOutput {
        let output = self.context.end_pass();
        self.state
            .handle_platform_output(window, output.platform_output.clone());
        output
    }

    /// Renders egui on top of `view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        screen_descriptor: &ScreenDescriptor,
        output: egui::FullOutput,
    ) {
        paint_output(
            &self.context,
            &mut self.renderer,
            device,
            queue,
            encoder,
            view,
            screen_descriptor,
            output,
        );
    }
}

/// Tessellates `output` and paints it over `view` without clearing.
///
/// Shared by the windowed integration and offscreen captures, which drive a
/// bare [`Context`] with no winit state.
#[allow(clippy::too_many_arguments)]
pub fn paint_output(
    context: &Context,
    renderer: &mut EguiRenderer,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    screen_descriptor: &ScreenDescriptor,
    output: egui::FullOutput,
) {
    let paint_jobs = context.tessellate(output.shapes, output.pixels_per_point);

    for (id, image_delta) in &output.textures_delta.set {
        renderer.update_texture(device, queue, *id, image_delta);
    }

    renderer.update_buffers(device, queue, encoder, &paint_jobs, screen_descriptor);

    {
        let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // Don't clear - render on top
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        // egui-wgpu wants a 'static pass
        let mut render_pass = render_pass.forget_lifetime();
        renderer.render(&mut render_pass, &paint_jobs, screen_descriptor);
    }

    for id in &output.textures_delta.free {
        renderer.free_texture(id);
    }
}
