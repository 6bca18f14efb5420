//! Unit primitive meshes shared by every instanced draw.

use std::f32::consts::{PI, TAU};

use towerscope_core::Shape;

/// Vertex of a unit primitive.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Vertex buffer layout (slot 0).
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side geometry of a primitive.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Geometry for `shape`, fitting the unit cube centered at the origin.
    pub fn for_shape(shape: Shape) -> Self {
        match shape {
            Shape::Box => unit_box(),
            Shape::Cylinder => unit_cylinder(24),
            Shape::Sphere => unit_sphere(16, 24),
        }
    }

    fn push(&mut self, position: [f32; 3], normal: [f32; 3]) -> u32 {
        let index = u32::try_from(self.vertices.len()).unwrap_or(u32::MAX);
        self.vertices.push(MeshVertex { position, normal });
        index
    }
}

fn unit_box() -> MeshData {
    // (normal, u axis, v axis) per face, wound counter-clockwise seen from outside.
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut mesh = MeshData::default();
    for (n, u, v) in FACES {
        let corner = |su: f32, sv: f32| {
            [
                0.5 * (n[0] + su * u[0] + sv * v[0]),
                0.5 * (n[1] + su * u[1] + sv * v[1]),
                0.5 * (n[2] + su * u[2] + sv * v[2]),
            ]
        };
        let a = mesh.push(corner(-1.0, -1.0), n);
        let b = mesh.push(corner(1.0, -1.0), n);
        let c = mesh.push(corner(1.0, 1.0), n);
        let d = mesh.push(corner(-1.0, 1.0), n);
        mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
    mesh
}

#[allow(clippy::cast_precision_loss)]
fn unit_cylinder(segments: u32) -> MeshData {
    let mut mesh = MeshData::default();

    // Side wall.
    let base = u32::try_from(mesh.vertices.len()).unwrap_or(0);
    for i in 0..=segments {
        let a = TAU * i as f32 / segments as f32;
        let (s, c) = a.sin_cos();
        mesh.push([0.5 * c, -0.5, 0.5 * s], [c, 0.0, s]);
        mesh.push([0.5 * c, 0.5, 0.5 * s], [c, 0.0, s]);
    }
    for i in 0..segments {
        let b0 = base + 2 * i;
        let t0 = b0 + 1;
        let b1 = b0 + 2;
        let t1 = b0 + 3;
        mesh.indices.extend_from_slice(&[b0, t0, b1, b1, t0, t1]);
    }

    // Caps.
    for (y, ny) in [(0.5f32, 1.0f32), (-0.5, -1.0)] {
        let center = mesh.push([0.0, y, 0.0], [0.0, ny, 0.0]);
        let first = center + 1;
        for i in 0..=segments {
            let a = TAU * i as f32 / segments as f32;
            let (s, c) = a.sin_cos();
            mesh.push([0.5 * c, y, 0.5 * s], [0.0, ny, 0.0]);
        }
        for i in 0..segments {
            if ny > 0.0 {
                mesh.indices
                    .extend_from_slice(&[center, first + i + 1, first + i]);
            } else {
                mesh.indices
                    .extend_from_slice(&[center, first + i, first + i + 1]);
            }
        }
    }
    mesh
}

#[allow(clippy::cast_precision_loss)]
fn unit_sphere(stacks: u32, slices: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for i in 0..=stacks {
        let phi = PI * i as f32 / stacks as f32;
        let (sp, cp) = phi.sin_cos();
        for j in 0..=slices {
            let theta = TAU * j as f32 / slices as f32;
            let (st, ct) = theta.sin_cos();
            let n = [sp * ct, cp, sp * st];
            mesh.push([0.5 * n[0], 0.5 * n[1], 0.5 * n[2]], n);
        }
    }
    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            mesh.indices
                .extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    mesh
}
