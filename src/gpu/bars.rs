//! Batched bar groups: one instance buffer and one draw call per group.

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, Queue, RenderPass};

use super::geometry::GeometryBuffers;
use super::resources::ResourceLedger;
use crate::scene::{BarInstance, LayerKind, MaterialPreset};

/// Material uniform block (group 1 of the bar shader).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    /// rgb + opacity
    pub color: [f32; 4],
    /// rgb scaled by the emissive intensity
    pub emissive: [f32; 4],
    /// x: roughness, y: metalness
    pub params: [f32; 4],
}

impl From<&MaterialPreset> for MaterialUniforms {
    fn from(preset: &MaterialPreset) -> Self {
        let [r, g, b] = preset.color;
        let [er, eg, eb] = preset.emissive.map(|c| c * preset.emissive_intensity);
        Self {
            color: [r, g, b, preset.opacity],
            emissive: [er, eg, eb, 1.0],
            params: [preset.roughness, preset.metalness, 0.0, 0.0],
        }
    }
}

/// A material uploaded once and bound by one or more bar groups.
pub struct MaterialBinding {
    pub preset: MaterialPreset,
    label: String,
    buffer: Buffer,
    bind_group: BindGroup,
}

impl MaterialBinding {
    pub fn new(
        device: &Device,
        layout: &BindGroupLayout,
        preset: MaterialPreset,
        ledger: &mut ResourceLedger,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let label = format!("material_{}", preset.name);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label.as_str()),
            contents: bytemuck::bytes_of(&MaterialUniforms::from(&preset)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label.as_str()),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        ledger.allocate(&label);

        Self {
            preset,
            label,
            buffer,
            bind_group,
        }
    }

    pub fn bind_group(&self) -> &BindGroup {
        &self.bind_group
    }

    pub fn dispose(&self, ledger: &mut ResourceLedger) {
        ledger.release_buffer(&self.label, &self.buffer);
    }
}

/// Fixed-capacity instanced group of bars sharing geometry and material.
pub struct BarBatch {
    layer: LayerKind,
    /// Index into the renderer's material list.
    material: usize,
    capacity: u32,
    count: u32,
    label: String,
    instance_buffer: Buffer,
}

impl BarBatch {
    pub fn new(
        device: &Device,
        layer: LayerKind,
        material: usize,
        ledger: &mut ResourceLedger,
    ) -> Self {
        let capacity = layer.instance_count() as u32;
        let label = format!("bars_{}_instances", layer.name());
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label.as_str()),
            size: (std::mem::size_of::<BarInstance>() * capacity as usize) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ledger.allocate(&label);

        Self {
            layer,
            material,
            capacity,
            count: 0,
            label,
            instance_buffer,
        }
    }

    pub fn layer(&self) -> LayerKind {
        self.layer
    }

    pub fn material(&self) -> usize {
        self.material
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Overwrite every instance of the group.
    pub fn write(&mut self, queue: &Queue, instances: &[BarInstance]) {
        if instances.len() > self.capacity as usize {
            log::warn!(
                "Group '{}' holds {} instances, dropping {}",
                self.layer.name(),
                self.capacity,
                instances.len() - self.capacity as usize
            );
        }
        let count = instances.len().min(self.capacity as usize);
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&instances[..count]),
        );
        self.count = count as u32;
    }

    /// Record the group's single instanced draw.
    pub fn draw(
        &self,
        pass: &mut RenderPass<'_>,
        geometry: &GeometryBuffers,
        material: &MaterialBinding,
    ) {
        if self.count == 0 {
            return;
        }
        pass.set_bind_group(1, material.bind_group(), &[]);
        pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..geometry.index_count, 0, 0..self.count);
    }

    pub fn dispose(&self, ledger: &mut ResourceLedger) {
        ledger.release_buffer(&self.label, &self.instance_buffer);
    }
}
