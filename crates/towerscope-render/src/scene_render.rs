//! Instanced drawing of the scene graph, hotspot markers and stars.

use glam::{Mat4, Quat, Vec3};
use towerscope_core::{hex_color, MarkerVisual, SceneGraph, Shape};
use wgpu::util::DeviceExt;

use crate::buffer::{create_index_buffer, create_vertex_buffer};
use crate::mesh::MeshData;

/// Per-instance data read by `scene.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    /// Base color (rgb) and opacity (a).
    pub color: [f32; 4],
    /// Emissive color premultiplied by intensity (rgb); `w` > 0 skips lighting.
    pub emissive: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4,
        6 => Float32x4, 7 => Float32x4,
    ];

    /// Vertex buffer layout (slot 1, per instance).
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn new(model: Mat4, color: [f32; 3], opacity: f32, emissive: [f32; 3], intensity: f32, unlit: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [color[0], color[1], color[2], opacity],
            emissive: [
                emissive[0] * intensity,
                emissive[1] * intensity,
                emissive[2] * intensity,
                if unlit { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// A hotspot marker ready to draw.
#[derive(Debug, Clone, Copy)]
pub struct MarkerInstance {
    pub visual: MarkerVisual,
    pub color: [f32; 3],
}

/// Instances grouped by primitive, opaque ones first.
#[derive(Debug, Clone, Default)]
pub struct SceneInstances {
    pub boxes: Vec<InstanceRaw>,
    pub cylinders: Vec<InstanceRaw>,
    pub spheres: Vec<InstanceRaw>,
}

impl SceneInstances {
    /// Collects every instance of the frame at elapsed time `t`.
    pub fn collect(scene: &SceneGraph, markers: &[MarkerInstance], t: f32) -> Self {
        let mut out = Self::default();

        for element in scene.elements() {
            let m = &element.material;
            let raw = InstanceRaw::new(
                element.transform(t),
                hex_color(m.color),
                m.opacity,
                hex_color(m.emissive),
                m.emissive_intensity,
                false,
            );
            out.bucket(element.shape).push(raw);
        }

        for star in scene.stars() {
            let model = Mat4::from_scale_rotation_translation(
                Vec3::splat(0.4 * star.size),
                Quat::IDENTITY,
                star.position,
            );
            out.spheres
                .push(InstanceRaw::new(model, [1.0; 3], 1.0, [1.0; 3], 0.8, true));
        }

        for marker in markers {
            let v = &marker.visual;
            let core = Mat4::from_scale_rotation_translation(
                Vec3::splat(0.6 * v.scale),
                Quat::IDENTITY,
                v.position,
            );
            let intensity = if v.active { 2.0 } else { 1.0 } * v.glow;
            out.spheres.push(InstanceRaw::new(
                core,
                marker.color,
                0.9,
                marker.color,
                intensity,
                true,
            ));

            let ring = Mat4::from_scale_rotation_translation(
                Vec3::new(1.2 * v.ring_scale, 0.02, 1.2 * v.ring_scale),
                Quat::from_rotation_x(v.ring_rotation),
                v.position,
            );
            out.cylinders.push(InstanceRaw::new(
                ring,
                marker.color,
                0.35,
                marker.color,
                v.glow,
                true,
            ));
        }

        for bucket in [&mut out.boxes, &mut out.cylinders, &mut out.spheres] {
            // Translucent instances last so they blend over what is behind them.
            bucket.sort_by(|a, b| b.color[3].total_cmp(&a.color[3]));
        }
        out
    }

    fn bucket(&mut self, shape: Shape) -> &mut Vec<InstanceRaw> {
        match shape {
            Shape::Box => &mut self.boxes,
            Shape::Cylinder => &mut self.cylinders,
            Shape::Sphere => &mut self.spheres,
        }
    }

    /// Total instance count.
    pub fn len(&self) -> usize {
        self.boxes.len() + self.cylinders.len() + self.spheres.len()
    }

    /// True if nothing will be drawn.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: Option<wgpu::Buffer>,
    instance_capacity: usize,
    instance_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, shape: Shape) -> Self {
        let data = MeshData::for_shape(shape);
        Self {
            vertex_buffer: create_vertex_buffer(device, &data.vertices, Some("primitive vertices")),
            index_buffer: create_index_buffer(device, &data.indices, Some("primitive indices")),
            index_count: u32::try_from(data.indices.len()).unwrap_or(0),
            instance_buffer: None,
            instance_capacity: 0,
            instance_count: 0,
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &[InstanceRaw]) {
        self.instance_count = u32::try_from(instances.len()).unwrap_or(0);
        if instances.is_empty() {
            return;
        }
        match &self.instance_buffer {
            Some(buffer) if instances.len() <= self.instance_capacity => {
                queue.write_buffer(buffer, 0, bytemuck::cast_slice(instances));
            }
            _ => {
                self.instance_buffer = Some(device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some("scene instances"),
                        contents: bytemuck::cast_slice(instances),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    },
                ));
                self.instance_capacity = instances.len();
            }
        }
    }

    fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let Some(instances) = &self.instance_buffer else {
            return;
        };
        if self.instance_count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, instances.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }
}

/// GPU resources for the instanced scene draw.
pub struct SceneRenderData {
    boxes: GpuMesh,
    cylinders: GpuMesh,
    spheres: GpuMesh,
}

impl SceneRenderData {
    /// Uploads the unit primitives.
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            boxes: GpuMesh::new(device, Shape::Box),
            cylinders: GpuMesh::new(device, Shape::Cylinder),
            spheres: GpuMesh::new(device, Shape::Sphere),
        }
    }

    /// Replaces the instance data for the next draw.
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &SceneInstances) {
        self.boxes.upload(device, queue, &instances.boxes);
        self.cylinders.upload(device, queue, &instances.cylinders);
        self.spheres.upload(device, queue, &instances.spheres);
    }

    /// Records the draw calls. The scene pipeline must already be bound.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        self.boxes.draw(render_pass);
        self.cylinders.draw(render_pass);
        self.spheres.draw(render_pass);
    }
}
