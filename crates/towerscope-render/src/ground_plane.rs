//! Ground plane and grid rendering.

use towerscope_core::{hex_color, Grid};

use crate::buffer::create_uniform_buffer;

/// GPU representation of ground plane uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct GroundPlaneUniforms {
    pub ground_color: [f32; 4],
    pub line_color: [f32; 4],
    pub center_color: [f32; 4],
    /// Side length of the plane.
    pub size: f32,
    /// Number of grid cells along each side.
    pub divisions: f32,
    pub height: f32,
    pub _padding: f32,
}

impl Default for GroundPlaneUniforms {
    fn default() -> Self {
        Self::from(&Grid::default())
    }
}

impl From<&Grid> for GroundPlaneUniforms {
    #[allow(clippy::cast_precision_loss)]
    fn from(grid: &Grid) -> Self {
        let rgba = |c: u32| {
            let [r, g, b] = hex_color(c);
            [r, g, b, 1.0]
        };
        Self {
            ground_color: rgba(grid.ground_color),
            line_color: rgba(grid.line_color),
            center_color: rgba(grid.center_color),
            size: grid.size,
            divisions: grid.divisions.max(1) as f32,
            height: 0.0,
            _padding: 0.0,
        }
    }
}

/// Ground plane render resources.
pub struct GroundPlaneRenderData {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GroundPlaneRenderData {
    /// Creates new ground plane render data.
    pub fn new(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
    ) -> Self {
        let uniform_buffer = create_uniform_buffer(
            device,
            &GroundPlaneUniforms::default(),
            Some("Ground Plane Uniform Buffer"),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Ground Plane Bind Group"),
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            uniform_buffer,
            bind_group,
        }
    }

    /// Updates the ground plane uniforms.
    pub fn update(&self, queue: &wgpu::Queue, grid: &Grid) {
        let uniforms = GroundPlaneUniforms::from(grid);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Returns the bind group for rendering.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<GroundPlaneUniforms>(), 64);
    }

    #[test]
    fn test_from_grid() {
        let u = GroundPlaneUniforms::from(&Grid::default());
        assert_eq!(u.size, 100.0);
        assert_eq!(u.divisions, 50.0);
        assert_eq!(u.ground_color[3], 1.0);
    }
}
