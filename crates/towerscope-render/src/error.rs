//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface reports no usable texture format.
    #[error("surface has no supported format")]
    SurfaceConfigurationFailed,

    /// Acquiring the next swapchain texture failed.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// A frame could not be read back from the GPU.
    #[error("frame capture failed: {0}")]
    CaptureFailed(String),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
