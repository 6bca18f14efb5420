//! The main rendering engine.

mod capture;
mod pipelines;

use std::sync::Arc;

use glam::Vec3;
use towerscope_core::SceneGraph;

use crate::buffer::create_uniform_buffer;
use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::ground_plane::GroundPlaneRenderData;
use crate::scene_render::{MarkerInstance, SceneInstances, SceneRenderData};

/// Depth format shared by every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Camera uniforms for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    /// Elapsed scene time in seconds.
    pub time: f32,
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0, 0.0, 5.0],
            time: 0.0,
        }
    }
}

/// The main rendering engine backed by wgpu.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    /// The render surface (None for headless).
    pub surface: Option<wgpu::Surface<'static>>,
    /// Surface configuration. Headless engines keep one too, for the target format.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Depth texture.
    pub depth_texture: wgpu::Texture,
    /// Depth texture view.
    pub depth_view: wgpu::TextureView,
    /// Main camera.
    pub camera: Camera,
    /// Current viewport width.
    pub width: u32,
    /// Current viewport height.
    pub height: u32,
    /// Camera uniform buffer.
    pub camera_buffer: wgpu::Buffer,
    /// Instanced primitive pipeline.
    pub(crate) scene_pipeline: wgpu::RenderPipeline,
    /// Camera bind group for the scene pipeline.
    pub(crate) scene_bind_group: wgpu::BindGroup,
    /// Ground plane pipeline.
    pub(crate) ground_plane_pipeline: wgpu::RenderPipeline,
    /// Ground plane uniforms and bind group.
    pub(crate) ground_plane_render_data: GroundPlaneRenderData,
    /// Instance buffers for the scene.
    pub(crate) scene_render_data: SceneRenderData,
    /// Capture texture (lazily initialized).
    pub(crate) capture_texture: Option<wgpu::Texture>,
    /// Capture readback buffer (lazily initialized).
    pub(crate) capture_buffer: Option<wgpu::Buffer>,
}

impl RenderEngine {
    /// Creates a new windowed render engine.
    pub async fn new_windowed(window: Arc<winit::window::Window>) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("towerscope device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::SurfaceConfigurationFailed)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        log::info!(
            "render engine ready: {} ({:?}), {width}x{height}, {surface_format:?}",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        Ok(Self::from_parts(
            instance,
            adapter,
            device,
            queue,
            Some(surface),
            surface_config,
        ))
    }

    /// Creates a new headless render engine.
    pub async fn new_headless(width: u32, height: u32) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("towerscope device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let width = width.max(1);
        let height = height.max(1);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        log::debug!(
            "headless render engine: {} ({:?}), {width}x{height}",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        Ok(Self::from_parts(
            instance,
            adapter,
            device,
            queue,
            None,
            surface_config,
        ))
    }

    fn from_parts(
        instance: wgpu::Instance,
        adapter: wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: Option<wgpu::Surface<'static>>,
        surface_config: wgpu::SurfaceConfiguration,
    ) -> Self {
        let width = surface_config.width;
        let height = surface_config.height;
        let (depth_texture, depth_view) = Self::create_depth_texture(&device, width, height);

        #[allow(clippy::cast_precision_loss)]
        let camera = Camera::new(width as f32 / height as f32);

        let camera_buffer =
            create_uniform_buffer(&device, &CameraUniforms::default(), Some("camera uniforms"));

        let camera_bind_group_layout = pipelines::create_camera_bind_group_layout(&device);
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene bind group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        let scene_pipeline =
            pipelines::create_scene_pipeline(&device, &camera_bind_group_layout, surface_config.format);

        let ground_plane_bind_group_layout = pipelines::create_ground_plane_bind_group_layout(&device);
        let ground_plane_pipeline = pipelines::create_ground_plane_pipeline(
            &device,
            &ground_plane_bind_group_layout,
            surface_config.format,
        );
        let ground_plane_render_data =
            GroundPlaneRenderData::new(&device, &ground_plane_bind_group_layout, &camera_buffer);

        let scene_render_data = SceneRenderData::new(&device);

        Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            depth_texture,
            depth_view,
            camera,
            width,
            height,
            camera_buffer,
            scene_pipeline,
            scene_bind_group,
            ground_plane_pipeline,
            ground_plane_render_data,
            scene_render_data,
            capture_texture: None,
            capture_buffer: None,
        }
    }

    /// Resizes the render target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;

        if let Some(ref surface) = self.surface {
            surface.configure(&self.device, &self.surface_config);
        }

        let (depth_texture, depth_view) = Self::create_depth_texture(&self.device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;

        #[allow(clippy::cast_precision_loss)]
        self.camera.set_aspect_ratio(width as f32 / height as f32);
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Updates camera uniforms.
    pub fn update_camera_uniforms(&self, time: f32) {
        let uniforms = CameraUniforms {
            view_proj: self.camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: self.camera.position.to_array(),
            time,
        };

        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Uploads the scene, markers and grid for the frame at elapsed time `t`.
    pub fn prepare_scene(&mut self, scene: &SceneGraph, markers: &[MarkerInstance], t: f32) {
        self.update_camera_uniforms(t);
        let instances = SceneInstances::collect(scene, markers, t);
        self.scene_render_data
            .update(&self.device, &self.queue, &instances);
        self.ground_plane_render_data.update(&self.queue, scene.grid());
    }

    /// Records the scene pass into `view`, clearing it to `background`.
    ///
    /// Call [`prepare_scene`](Self::prepare_scene) first.
    pub fn render_scene(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        background: Vec3,
        draw_geometry: bool,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(background.x),
                        g: f64::from(background.y),
                        b: f64::from(background.z),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        if !draw_geometry {
            return;
        }

        render_pass.set_pipeline(&self.ground_plane_pipeline);
        render_pass.set_bind_group(0, self.ground_plane_render_data.bind_group(), &[]);
        render_pass.draw(0..6, 0..1);

        render_pass.set_pipeline(&self.scene_pipeline);
        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
        self.scene_render_data.draw(&mut render_pass);
    }

    /// Color format of the render target.
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Returns the viewport dimensions.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
