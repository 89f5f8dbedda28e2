//! Bind group layout builders for the scene pipelines.

use wgpu::{BindGroupLayout, BindGroupLayoutEntry, Device, ShaderStages};

/// Builder for creating bind group layouts with common patterns.
pub struct BindGroupLayoutBuilder {
    label: Option<&'static str>,
    entries: Vec<BindGroupLayoutEntry>,
}

impl BindGroupLayoutBuilder {
    /// Create a new bind group layout builder.
    pub fn new(label: &'static str) -> Self {
        Self {
            label: Some(label),
            entries: Vec::new(),
        }
    }

    /// Add a uniform buffer entry.
    pub fn uniform(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    /// Build the bind group layout.
    pub fn build(self, device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: self.label,
            entries: &self.entries,
        })
    }
}

/// Camera + lights, shared by every bar group (group 0).
pub fn create_scene_layout(device: &Device) -> BindGroupLayout {
    BindGroupLayoutBuilder::new("scene_bind_group_layout")
        .uniform(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT)
        .build(device)
}

/// Per-group material (group 1).
pub fn create_material_layout(device: &Device) -> BindGroupLayout {
    BindGroupLayoutBuilder::new("material_bind_group_layout")
        .uniform(0, ShaderStages::FRAGMENT)
        .build(device)
}

/// Point sprite uniforms.
pub fn create_points_layout(device: &Device) -> BindGroupLayout {
    BindGroupLayoutBuilder::new("points_bind_group_layout")
        .uniform(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT)
        .build(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[tokio::test]
    async fn test_bind_group_layout_builder() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return, // Skip if no GPU
        };

        let layout = BindGroupLayoutBuilder::new("test_layout")
            .uniform(0, ShaderStages::VERTEX)
            .uniform(1, ShaderStages::FRAGMENT)
            .build(&ctx.device);

        drop(layout);
    }

    #[tokio::test]
    async fn test_scene_layouts_creation() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let _scene = create_scene_layout(&ctx.device);
        let _material = create_material_layout(&ctx.device);
        let _points = create_points_layout(&ctx.device);
    }
}
