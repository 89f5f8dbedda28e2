//! Windowed backend: draws into a presentable swapchain surface.

use super::context::{GpuContext, GpuError};
use super::renderer::SceneRenderer;
use super::resources::ResourceLedger;
use crate::component::{ComponentError, SceneBackend};
use crate::scene::{FrameData, Viewport};

/// Pick a non-sRGB format so colors are presented as authored.
fn choose_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

/// What to do with a frame whose surface texture could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRecovery {
    /// Reconfigure the surface and skip the frame.
    Reconfigure,
    /// Skip the frame; the next one may succeed.
    Skip,
    /// Report the error to the host.
    Fail,
}

pub fn recovery_for(error: &wgpu::SurfaceError) -> SurfaceRecovery {
    match error {
        wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost => SurfaceRecovery::Reconfigure,
        wgpu::SurfaceError::Timeout => SurfaceRecovery::Skip,
        _ => SurfaceRecovery::Fail,
    }
}

/// Renders the scene to a window surface sized to the drawing buffer.
///
/// The surface is dropped on dispose, before the renderer itself.
pub struct SurfaceRenderer {
    ctx: GpuContext,
    surface: Option<wgpu::Surface<'static>>,
    config: wgpu::SurfaceConfiguration,
    renderer: SceneRenderer,
    disposed: bool,
}

impl SurfaceRenderer {
    /// Configure `surface` for `viewport`. `surface` must come from `ctx.instance`.
    pub fn new(
        ctx: GpuContext,
        surface: wgpu::Surface<'static>,
        viewport: &Viewport,
        vsync: bool,
    ) -> Result<Self, GpuError> {
        let caps = surface.get_capabilities(&ctx.adapter);
        let format = choose_format(&caps.formats).ok_or(GpuError::IncompatibleSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let (width, height) = viewport.drawing_buffer_size_within(ctx.max_texture_dimension());

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctx.device, &config);
        log::info!("Surface configured: {}x{} {:?}", width, height, format);

        let renderer = SceneRenderer::new(ctx.device.clone(), ctx.queue.clone(), format, (width, height));

        Ok(Self {
            ctx,
            surface: Some(surface),
            config,
            renderer,
            disposed: false,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn ledger(&self) -> &ResourceLedger {
        self.renderer.ledger()
    }

    /// Whether the swapchain surface is still held.
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    fn reconfigure(&self) {
        if let Some(surface) = &self.surface {
            surface.configure(&self.ctx.device, &self.config);
        }
    }
}

impl SceneBackend for SurfaceRenderer {
    fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), ComponentError> {
        let Some(surface) = self.surface.as_ref().filter(|_| !self.disposed) else {
            return Err(ComponentError::NotMounted);
        };

        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => match recovery_for(&e) {
                SurfaceRecovery::Reconfigure => {
                    log::warn!("Surface {}, reconfiguring and skipping frame", e);
                    self.reconfigure();
                    return Ok(());
                }
                SurfaceRecovery::Skip => {
                    log::warn!("Surface {}, skipping frame", e);
                    return Ok(());
                }
                SurfaceRecovery::Fail => return Err(ComponentError::Backend(e.to_string())),
            },
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.upload(frame);
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("surface_encoder"),
            });
        self.renderer.encode(&mut encoder, &view);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, viewport: &Viewport) {
        let (width, height) = viewport.drawing_buffer_size_within(self.ctx.max_texture_dimension());
        if self.disposed || viewport.is_empty() || (width, height) == self.size() {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        self.renderer.resize(width, height);
        log::debug!("Surface resized to {}x{}", width, height);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.renderer.dispose();
        self.surface = None;
        log::info!("Released window surface");
    }
}
