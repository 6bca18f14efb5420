//! Offscreen capture and pixel readback.

use super::RenderEngine;
use crate::error::{RenderError, RenderResult};

impl RenderEngine {
    /// Creates an offscreen color target of the viewport size and returns its view.
    ///
    /// Render into the view, submit, then call [`capture_frame`](Self::capture_frame).
    pub fn create_capture_target(&mut self) -> wgpu::TextureView {
        let bytes_per_row = Self::aligned_bytes_per_row(self.width);
        let buffer_size = u64::from(bytes_per_row * self.height);

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capture texture"),
            size: wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.surface_config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("capture buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        self.capture_texture = Some(texture);
        self.capture_buffer = Some(buffer);
        view
    }

    /// Calculates bytes per row with proper alignment for wgpu buffer copies.
    fn aligned_bytes_per_row(width: u32) -> u32 {
        let bytes_per_pixel = 4u32;
        let unaligned = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        unaligned.div_ceil(align) * align
    }

    /// Reads back the capture target as tightly packed RGBA8 rows, top row first.
    pub fn capture_frame(&mut self) -> RenderResult<Vec<u8>> {
        let texture = self
            .capture_texture
            .take()
            .ok_or_else(|| RenderError::CaptureFailed("no capture target".into()))?;
        let buffer = self
            .capture_buffer
            .take()
            .ok_or_else(|| RenderError::CaptureFailed("no capture buffer".into()))?;

        let bytes_per_row = Self::aligned_bytes_per_row(self.width);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("capture copy encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver outlives the poll below.
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv()
            .map_err(|e| RenderError::CaptureFailed(e.to_string()))?
            .map_err(|e| RenderError::CaptureFailed(e.to_string()))?;

        // Copy data, removing row padding
        let data = buffer_slice.get_mapped_range();
        let row_bytes = (self.width * 4) as usize;
        let mut result = Vec::with_capacity(row_bytes * self.height as usize);
        for row in 0..self.height {
            let start = (row * bytes_per_row) as usize;
            result.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        buffer.unmap();

        if matches!(
            self.surface_config.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            for pixel in result.chunks_exact_mut(4) {
                pixel.swap(0, 2);
            }
        }

        Ok(result)
    }
}
