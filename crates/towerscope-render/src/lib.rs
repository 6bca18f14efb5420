//! Rendering backend for towerscope.
//!
//! This crate provides the wgpu-based rendering engine, including:
//! - GPU resource management (buffers, instanced primitive meshes)
//! - WGSL shaders for the scene and the ground grid
//! - The orbit camera, screen rays and projection
//! - Offscreen capture and image saving

pub mod buffer;
pub mod camera;
pub mod engine;
pub mod error;
pub mod ground_plane;
pub mod mesh;
pub mod scene_render;
pub mod screenshot;

pub use camera::Camera;
pub use engine::{CameraUniforms, RenderEngine};
pub use error::{RenderError, RenderResult};
pub use ground_plane::{GroundPlaneRenderData, GroundPlaneUniforms};
pub use mesh::{MeshData, MeshVertex};
pub use scene_render::{InstanceRaw, MarkerInstance, SceneInstances, SceneRenderData};
pub use screenshot::{save_image, ScreenshotError};
