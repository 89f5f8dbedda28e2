//! Additive point sprites for the particle field.

use wgpu::{BindGroup, Buffer, Device, Queue, RenderPass, RenderPipeline, TextureFormat};

use super::layouts::create_points_layout;
use super::pipelines::{create_pipeline_layout, RenderPipelineBuilder, ADDITIVE_BLENDING};
use super::resources::ResourceLedger;
use crate::scene::{Blending, FrameData, PointsMaterial};

/// Uniform block of the points shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointsUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// rgb + current field opacity
    pub color: [f32; 4],
    /// x: size, y: size attenuation flag, zw: drawing buffer size in pixels
    pub params: [f32; 4],
}

impl PointsUniforms {
    pub fn new(frame: &FrameData<'_>, material: &PointsMaterial, buffer_size: (u32, u32)) -> Self {
        let [r, g, b] = material.color;
        Self {
            view: frame.camera.view_matrix().to_cols_array_2d(),
            projection: frame.camera.projection_matrix().to_cols_array_2d(),
            color: [r, g, b, frame.particles.opacity()],
            params: [
                material.size,
                if material.size_attenuation { 1.0 } else { 0.0 },
                buffer_size.0 as f32,
                buffer_size.1 as f32,
            ],
        }
    }
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x3];

/// GPU state of the particle field: positions, material uniforms, pipeline.
pub struct ParticlePoints {
    material: PointsMaterial,
    capacity: u32,
    count: u32,
    pipeline: RenderPipeline,
    position_buffer: Buffer,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
}

impl ParticlePoints {
    const POSITIONS_LABEL: &'static str = "particle_positions";
    const UNIFORMS_LABEL: &'static str = "particle_material";

    pub fn new(
        device: &Device,
        format: TextureFormat,
        material: PointsMaterial,
        capacity: usize,
        ledger: &mut ResourceLedger,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/points.wgsl").into()),
        });

        let bind_group_layout = create_points_layout(device);
        let pipeline_layout =
            create_pipeline_layout(device, "points_pipeline_layout", &[&bind_group_layout]);

        let blend = match material.blending {
            Blending::Additive => ADDITIVE_BLENDING,
            Blending::Normal => wgpu::BlendState::ALPHA_BLENDING,
        };
        let pipeline = RenderPipelineBuilder::new("points_pipeline", &shader)
            .layout(&pipeline_layout)
            .vertex_buffers(vec![wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &POSITION_ATTRIBUTES,
            }])
            .format(format)
            .blend(blend)
            .topology(wgpu::PrimitiveTopology::TriangleStrip)
            .depth(false)
            .build(device);

        let position_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(Self::POSITIONS_LABEL),
            size: (std::mem::size_of::<[f32; 3]>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(Self::UNIFORMS_LABEL),
            size: std::mem::size_of::<PointsUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("points_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        ledger.allocate(Self::POSITIONS_LABEL);
        ledger.allocate(Self::UNIFORMS_LABEL);

        Self {
            material,
            capacity: capacity as u32,
            count: 0,
            pipeline,
            position_buffer,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn material(&self) -> &PointsMaterial {
        &self.material
    }

    /// Upload positions and the animated opacity.
    pub fn write(&mut self, queue: &Queue, frame: &FrameData<'_>, buffer_size: (u32, u32)) {
        let positions = frame.particles.positions();
        let count = positions.len().min(self.capacity as usize);
        queue.write_buffer(
            &self.position_buffer,
            0,
            bytemuck::cast_slice(&positions[..count]),
        );
        let uniforms = PointsUniforms::new(frame, &self.material, buffer_size);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.count = count as u32;
    }

    pub fn draw(&self, pass: &mut RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        // 4 vertices per point (triangle strip quad)
        pass.draw(0..4, 0..self.count);
    }

    pub fn dispose(&self, ledger: &mut ResourceLedger) {
        ledger.release_buffer(Self::POSITIONS_LABEL, &self.position_buffer);
        ledger.release_buffer(Self::UNIFORMS_LABEL, &self.uniform_buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneOptions, Viewport, WaveformScene};

    #[test]
    fn test_points_uniforms_follow_frame() {
        let mut scene =
            WaveformScene::build(Viewport::new(800, 600, 1.0, 2.0), SceneOptions::default());
        let frame = scene.update();
        let uniforms = PointsUniforms::new(&frame, &PointsMaterial::sparkles(), (800, 600));
        assert_eq!(uniforms.color[3], frame.particles.opacity());
        assert_eq!(uniforms.params, [0.04, 1.0, 800.0, 600.0]);
        assert_eq!(std::mem::size_of::<PointsUniforms>() % 16, 0);
    }
}
