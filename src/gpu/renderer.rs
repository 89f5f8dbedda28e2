//! GPU state of one mounted scene and per-frame encoding.

use std::sync::Arc;

use wgpu::{BindGroup, Buffer, Device, Queue, RenderPipeline, TextureFormat, TextureView};

use super::bars::{BarBatch, MaterialBinding};
use super::geometry::{instance_layout, BoxGeometry, BoxVertex, GeometryBuffers};
use super::layouts::{create_material_layout, create_scene_layout};
use super::pipelines::{create_pipeline_layout, RenderPipelineBuilder};
use super::points::ParticlePoints;
use super::resources::ResourceLedger;
use super::textures::RenderTarget;
use crate::scene::{FrameData, LayerKind, LightRig, MaterialPreset, PointsMaterial, PARTICLE_COUNT};

/// Camera and light block shared by every bar group (group 0).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// rgb scaled by intensity
    pub ambient: [f32; 4],
    /// xyz: direction towards the light
    pub key_direction: [f32; 4],
    pub key_color: [f32; 4],
    /// xyz: position, w: range
    pub point_position: [[f32; 4]; 2],
    pub point_color: [[f32; 4]; 2],
}

fn scaled(color: [f32; 3], intensity: f32) -> [f32; 4] {
    [color[0] * intensity, color[1] * intensity, color[2] * intensity, 1.0]
}

impl SceneUniforms {
    pub fn new(frame: &FrameData<'_>) -> Self {
        let camera = frame.camera.position;
        let rig: &LightRig = frame.lights;
        // Directional lights shine from their position towards the origin.
        let key = rig.key.position.normalize_or_zero();
        let points = rig.point_lights();
        Self {
            view_proj: frame.camera.view_projection().to_cols_array_2d(),
            camera_position: [camera.x, camera.y, camera.z, 1.0],
            ambient: scaled(rig.ambient.color, rig.ambient.intensity),
            key_direction: [key.x, key.y, key.z, 0.0],
            key_color: scaled(rig.key.color, rig.key.intensity),
            point_position: points.map(|p| [p.position.x, p.position.y, p.position.z, p.range]),
            point_color: points.map(|p| scaled(p.color, p.intensity)),
        }
    }
}

/// Materials in upload order; ghost groups share the last one.
const MATERIAL_ORANGE: usize = 0;
const MATERIAL_GRAY: usize = 1;
const MATERIAL_GHOST: usize = 2;

/// Back to front, so the faint ghosts blend under the primary row.
const DRAW_ORDER: [LayerKind; 4] = [
    LayerKind::Ghost2,
    LayerKind::Ghost1,
    LayerKind::LeftPrimary,
    LayerKind::RightPrimary,
];

fn material_for(layer: LayerKind) -> usize {
    match layer {
        LayerKind::LeftPrimary => MATERIAL_ORANGE,
        LayerKind::RightPrimary => MATERIAL_GRAY,
        LayerKind::Ghost1 | LayerKind::Ghost2 => MATERIAL_GHOST,
    }
}

/// Every GPU object of the hero scene.
///
/// Built once per mount. [`SceneRenderer::upload`] rewrites all instance data,
/// [`SceneRenderer::encode`] records one render pass into a caller-owned
/// color target, [`SceneRenderer::dispose`] destroys everything.
pub struct SceneRenderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    format: TextureFormat,
    size: (u32, u32),
    bar_pipeline: RenderPipeline,
    scene_buffer: Buffer,
    scene_bind_group: BindGroup,
    geometry: GeometryBuffers,
    materials: Vec<MaterialBinding>,
    batches: Vec<BarBatch>,
    points: ParticlePoints,
    depth: RenderTarget,
    background: [f32; 3],
    ledger: ResourceLedger,
    disposed: bool,
}

impl SceneRenderer {
    const SCENE_LABEL: &'static str = "scene_uniforms";
    const DEPTH_LABEL: &'static str = "depth_buffer";

    /// Create the renderer for a color target of `format` and `size` (pixels).
    pub fn new(device: Arc<Device>, queue: Arc<Queue>, format: TextureFormat, size: (u32, u32)) -> Self {
        let mut ledger = ResourceLedger::new();
        let size = (size.0.max(1), size.1.max(1));

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bars_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/bars.wgsl").into()),
        });
        let scene_layout = create_scene_layout(&device);
        let material_layout = create_material_layout(&device);
        let pipeline_layout = create_pipeline_layout(
            &device,
            "bars_pipeline_layout",
            &[&scene_layout, &material_layout],
        );
        let bar_pipeline = RenderPipelineBuilder::new("bars_pipeline", &shader)
            .layout(&pipeline_layout)
            .vertex_buffers(vec![BoxVertex::layout(), instance_layout()])
            .format(format)
            .blend(wgpu::BlendState::ALPHA_BLENDING)
            .depth(true)
            .build(&device);

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(Self::SCENE_LABEL),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });
        ledger.allocate(Self::SCENE_LABEL);

        let geometry = GeometryBuffers::upload(&device, &BoxGeometry::bar(), &mut ledger);
        let materials = [MaterialPreset::orange(), MaterialPreset::gray(), MaterialPreset::ghost()]
            .into_iter()
            .map(|preset| MaterialBinding::new(&device, &material_layout, preset, &mut ledger))
            .collect();
        let batches = LayerKind::all()
            .iter()
            .map(|&layer| BarBatch::new(&device, layer, material_for(layer), &mut ledger))
            .collect();
        let points = ParticlePoints::new(
            &device,
            format,
            PointsMaterial::sparkles(),
            PARTICLE_COUNT,
            &mut ledger,
        );

        let depth = RenderTarget::for_depth(&device, Self::DEPTH_LABEL, size.0, size.1);
        ledger.allocate(Self::DEPTH_LABEL);

        Self {
            device,
            queue,
            format,
            size,
            bar_pipeline,
            scene_buffer,
            scene_bind_group,
            geometry,
            materials,
            batches,
            points,
            depth,
            background: [0.0; 3],
            ledger,
            disposed: false,
        }
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Allocation record of everything this renderer created.
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn batches(&self) -> &[BarBatch] {
        &self.batches
    }

    /// Rewrite every uniform and instance buffer from `frame`.
    pub fn upload(&mut self, frame: &FrameData<'_>) {
        if self.disposed {
            return;
        }
        self.background = frame.background;
        self.queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::bytes_of(&SceneUniforms::new(frame)),
        );
        for batch in &mut self.batches {
            batch.write(&self.queue, frame.layers.instances(batch.layer()));
        }
        self.points.write(&self.queue, frame, self.size);
    }

    /// Record the frame's render pass into `target`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &TextureView) {
        if self.disposed {
            return;
        }
        let [r, g, b] = self.background;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.bar_pipeline);
        pass.set_bind_group(0, &self.scene_bind_group, &[]);
        for layer in DRAW_ORDER {
            if let Some(batch) = self.batches.iter().find(|b| b.layer() == layer) {
                batch.draw(&mut pass, &self.geometry, &self.materials[batch.material()]);
            }
        }

        self.points.draw(&mut pass);
    }

    /// Recreate the depth buffer for a new drawing buffer size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        self.ledger
            .release_texture(Self::DEPTH_LABEL, self.depth.texture());
        self.depth = RenderTarget::for_depth(&self.device, Self::DEPTH_LABEL, width, height);
        self.ledger.allocate(Self::DEPTH_LABEL);
        self.size = (width, height);
    }

    /// Destroy every buffer and texture. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.ledger
            .release_buffer(Self::SCENE_LABEL, &self.scene_buffer);
        self.geometry.dispose(&mut self.ledger);
        for material in &self.materials {
            material.dispose(&mut self.ledger);
        }
        for batch in &self.batches {
            batch.dispose(&mut self.ledger);
        }
        self.points.dispose(&mut self.ledger);
        self.ledger
            .release_texture(Self::DEPTH_LABEL, self.depth.texture());

        log::info!(
            "Released {} GPU resources (outstanding: {})",
            self.ledger.allocations(),
            self.ledger.outstanding()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneOptions, Viewport, WaveformScene};

    #[test]
    fn test_scene_uniforms_from_frame() {
        let mut scene =
            WaveformScene::build(Viewport::new(1280, 720, 1.0, 2.0), SceneOptions::default());
        let frame = scene.update();
        let uniforms = SceneUniforms::new(&frame);

        assert_eq!(uniforms.camera_position[2], 15.0);
        assert!((uniforms.ambient[0] - 0.1).abs() < 1e-6);
        assert!((uniforms.key_color[0] - 1.5).abs() < 1e-6);
        assert_eq!(uniforms.point_position[0][3], 20.0);
        assert_eq!(uniforms.point_position[1][3], 15.0);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn test_ghosts_share_material_and_draw_first() {
        assert_eq!(material_for(LayerKind::Ghost1), material_for(LayerKind::Ghost2));
        assert_ne!(
            material_for(LayerKind::LeftPrimary),
            material_for(LayerKind::RightPrimary)
        );
        assert_eq!(DRAW_ORDER[0], LayerKind::Ghost2);
        assert_eq!(DRAW_ORDER.len(), LayerKind::all().len());
    }
}
