//! Shared box geometry for every bar group.

use glam::Vec3;
use wgpu::util::DeviceExt;
use wgpu::{Buffer, Device, VertexBufferLayout};

use super::resources::ResourceLedger;
use crate::scene::waveform::{BAR_DEPTH, BAR_WIDTH};
use crate::scene::BarInstance;

/// Box vertex with a flat face normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BoxVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl BoxVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<BoxVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4,
];

/// Per-instance layout for [`BarInstance`]: four model matrix columns and a tint.
pub fn instance_layout() -> VertexBufferLayout<'static> {
    VertexBufferLayout {
        array_stride: std::mem::size_of::<BarInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRIBUTES,
    }
}

// (normal, u, v) with u x v = normal, so corners wind counter-clockwise from outside.
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Axis-aligned box centered on the origin, 24 vertices and 36 indices.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGeometry {
    pub vertices: Vec<BoxVertex>,
    pub indices: Vec<u16>,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width, height, depth) * 0.5;
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in FACES {
            let (n, u, v) = (Vec3::from(normal), Vec3::from(u), Vec3::from(v));
            let base = vertices.len() as u16;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                vertices.push(BoxVertex {
                    position: ((n + u * su + v * sv) * half).to_array(),
                    normal,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }

    /// Bar box: unit height so the instance's y scale is the bar height.
    pub fn bar() -> Self {
        Self::new(BAR_WIDTH, 1.0, BAR_DEPTH)
    }
}

/// GPU copy of a [`BoxGeometry`], shared by all bar groups.
pub struct GeometryBuffers {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

impl GeometryBuffers {
    const VERTEX_LABEL: &'static str = "bar_geometry_vertices";
    const INDEX_LABEL: &'static str = "bar_geometry_indices";

    pub fn upload(device: &Device, geometry: &BoxGeometry, ledger: &mut ResourceLedger) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(Self::VERTEX_LABEL),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(Self::INDEX_LABEL),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        ledger.allocate(Self::VERTEX_LABEL);
        ledger.allocate(Self::INDEX_LABEL);

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
        }
    }

    pub fn dispose(&self, ledger: &mut ResourceLedger) {
        ledger.release_buffer(Self::VERTEX_LABEL, &self.vertex_buffer);
        ledger.release_buffer(Self::INDEX_LABEL, &self.index_buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_box_extents() {
        let geometry = BoxGeometry::bar();
        assert_eq!(geometry.vertices.len(), 24);
        assert_eq!(geometry.indices.len(), 36);

        let max = geometry
            .vertices
            .iter()
            .fold(Vec3::splat(f32::MIN), |acc, v| acc.max(Vec3::from(v.position)));
        let min = geometry
            .vertices
            .iter()
            .fold(Vec3::splat(f32::MAX), |acc, v| acc.min(Vec3::from(v.position)));
        let size = max - min;
        assert!((size.x - BAR_WIDTH).abs() < 1e-6);
        assert!((size.y - 1.0).abs() < 1e-6);
        assert!((size.z - BAR_DEPTH).abs() < 1e-6);
        assert!((max + min).length() < 1e-6);
    }

    #[test]
    fn test_faces_wind_outward() {
        let geometry = BoxGeometry::new(1.0, 1.0, 1.0);
        for tri in geometry.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| geometry.vertices[i as usize]);
            let face_normal = (Vec3::from(b.position) - Vec3::from(a.position))
                .cross(Vec3::from(c.position) - Vec3::from(a.position))
                .normalize();
            assert!(face_normal.dot(Vec3::from(a.normal)) > 0.99);
        }
    }
}
