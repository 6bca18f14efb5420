use super::{
    ActiveEventLoop, App, ApplicationHandler, Arc, EguiIntegration, ElementState, FutureExt,
    KeyCode, LogicalSize, MouseButton, MouseScrollDelta, PhysicalKey, RenderEngine, Window,
    WindowEvent, WindowId,
};
use crate::ViewerError;

/// Pointer travel in pixels below which a press counts as a click.
const DRAG_THRESHOLD: f64 = 5.0;

/// Pixel wheel deltas per line step.
const PIXELS_PER_LINE: f64 = 50.0;

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let options = self.viewer.options();
        let (width, height) = options.window_size;
        let window_attributes = Window::default_attributes()
            .with_title(options.window_title.clone())
            .with_inner_size(LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(
                    event_loop,
                    ViewerError::RenderError(format!("failed to create window: {e}")),
                );
                return;
            }
        };

        let engine = match RenderEngine::new_windowed(window.clone()).block_on() {
            Ok(engine) => engine,
            Err(e) => {
                self.fail(
                    event_loop,
                    ViewerError::RenderError(format!("failed to create render engine: {e}")),
                );
                return;
            }
        };

        let egui = EguiIntegration::new(&engine.device, engine.surface_config.format, &window);
        self.viewer.set_viewport(engine.width, engine.height);
        log::info!(
            "window ready: {}x{} ({:?})",
            engine.width,
            engine.height,
            engine.target_format()
        );

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        self.egui = Some(egui);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Track the physical button even if egui takes the event, so the
        // pointer state never gets stuck.
        let pressed_in_scene = self.left_mouse_down;
        if let WindowEvent::MouseInput {
            state: ElementState::Released,
            button: MouseButton::Left,
            ..
        } = &event
        {
            self.left_mouse_down = false;
        }

        let egui_consumed = if let (Some(egui), Some(window)) = (&mut self.egui, &self.window) {
            egui.handle_event(window, &event)
        } else {
            false
        };
        let egui_wants_pointer = self.egui.as_ref().is_some_and(EguiIntegration::wants_pointer);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
                self.viewer.set_viewport(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let now = std::time::Instant::now();
                let dt = self
                    .last_frame_time
                    .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
                self.last_frame_time = Some(now);

                self.viewer.tick(dt);
                self.render(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = position.x - self.mouse_pos.0;
                let delta_y = position.y - self.mouse_pos.1;
                self.mouse_pos = (position.x, position.y);
                let (width, height) = self.viewport();

                if self.left_mouse_down {
                    self.drag_distance += delta_x.abs() + delta_y.abs();
                    if !self.orbiting && self.drag_distance >= DRAG_THRESHOLD {
                        self.orbiting = true;
                        self.viewer.clear_hover();
                        self.viewer.begin_drag();
                    }
                    if self.orbiting {
                        #[allow(clippy::cast_possible_truncation)]
                        self.viewer.drag(delta_x as f32, delta_y as f32);
                    }
                } else if egui_wants_pointer {
                    self.viewer.clear_hover();
                } else {
                    #[allow(clippy::cast_possible_truncation)]
                    self.viewer
                        .hover_at(position.x as f32, position.y as f32, width, height);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.viewer.clear_hover();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button != MouseButton::Left {
                    return;
                }
                match state {
                    ElementState::Pressed => {
                        if egui_consumed || egui_wants_pointer {
                            return;
                        }
                        self.left_mouse_down = true;
                        self.drag_distance = 0.0;
                    }
                    ElementState::Released => {
                        if self.orbiting {
                            self.orbiting = false;
                            self.viewer.end_drag();
                        } else if pressed_in_scene && self.drag_distance < DRAG_THRESHOLD {
                            let (width, height) = self.viewport();
                            #[allow(clippy::cast_possible_truncation)]
                            let (x, y) = (self.mouse_pos.0 as f32, self.mouse_pos.1 as f32);
                            if let Err(e) = self.viewer.click_at(x, y, width, height) {
                                log::warn!("hotspot click ignored: {e}");
                            }
                        }
                        self.drag_distance = 0.0;
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if egui_wants_pointer {
                    return;
                }
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => f64::from(y),
                    MouseScrollDelta::PixelDelta(pos) => pos.y / PIXELS_PER_LINE,
                };
                #[allow(clippy::cast_possible_truncation)]
                self.viewer.zoom(steps as f32);
            }
            _ => {}
        }
    }
}

impl App {
    /// Viewport size in physical pixels.
    #[allow(clippy::cast_precision_loss)]
    fn viewport(&self) -> (f32, f32) {
        self.engine
            .as_ref()
            .map_or((1.0, 1.0), |e| (e.width as f32, e.height as f32))
    }
}
