//! Render pipeline builders for the scene passes.

use wgpu::{
    BindGroupLayout, ColorTargetState, Device, PipelineLayout, RenderPipeline, ShaderModule,
    TextureFormat, VertexBufferLayout,
};

/// Depth format shared by every pass that tests against the depth buffer.
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Additive blending: `src * src_alpha + dst`.
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Zero,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Builder for creating render pipelines with common patterns.
pub struct RenderPipelineBuilder<'a> {
    label: Option<&'static str>,
    layout: Option<&'a PipelineLayout>,
    shader: &'a ShaderModule,
    vertex_entry: &'static str,
    fragment_entry: &'static str,
    vertex_buffers: Vec<VertexBufferLayout<'static>>,
    format: TextureFormat,
    blend: Option<wgpu::BlendState>,
    topology: wgpu::PrimitiveTopology,
    depth_write: Option<bool>,
}

impl<'a> RenderPipelineBuilder<'a> {
    /// Create a new render pipeline builder.
    pub fn new(label: &'static str, shader: &'a ShaderModule) -> Self {
        Self {
            label: Some(label),
            layout: None,
            shader,
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            vertex_buffers: Vec::new(),
            format: TextureFormat::Rgba8Unorm,
            blend: Some(wgpu::BlendState::REPLACE),
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_write: None,
        }
    }

    /// Set the pipeline layout.
    pub fn layout(mut self, layout: &'a PipelineLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Set vertex buffer layouts.
    pub fn vertex_buffers(mut self, buffers: Vec<VertexBufferLayout<'static>>) -> Self {
        self.vertex_buffers = buffers;
        self
    }

    /// Set the texture format.
    pub fn format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the blend state.
    pub fn blend(mut self, blend: wgpu::BlendState) -> Self {
        self.blend = Some(blend);
        self
    }

    pub fn topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Test against [`DEPTH_FORMAT`]; `write` controls depth writes.
    pub fn depth(mut self, write: bool) -> Self {
        self.depth_write = Some(write);
        self
    }

    /// Build the render pipeline.
    pub fn build(self, device: &Device) -> RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: self.label,
            layout: self.layout,
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: Some(self.vertex_entry),
                buffers: &self.vertex_buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: Some(self.fragment_entry),
                targets: &[Some(ColorTargetState {
                    format: self.format,
                    blend: self.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                ..Default::default()
            },
            depth_stencil: self.depth_write.map(|write| wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

/// Create a pipeline layout from bind group layouts.
pub fn create_pipeline_layout(
    device: &Device,
    label: &'static str,
    layouts: &[&BindGroupLayout],
) -> PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: layouts,
        immediate_size: 0,
    })
}
