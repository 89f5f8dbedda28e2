//! Headless backend: render to a texture and read the pixels back.

use std::path::Path;

use super::context::{GpuContext, GpuError};
use super::renderer::SceneRenderer;
use super::resources::ResourceLedger;
use super::textures::{ReadbackBuffer, ReadbackError, RenderTarget};
use crate::component::{ComponentError, SceneBackend};
use crate::scene::{FrameData, Viewport};

/// Errors from headless rendering and export.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Readback failed: {0}")]
    Readback(#[from] ReadbackError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No frame has been rendered yet")]
    NoFrame,
    #[error("Renderer has been disposed")]
    Disposed,
}

impl From<RenderError> for ComponentError {
    fn from(err: RenderError) -> Self {
        ComponentError::Backend(err.to_string())
    }
}

/// Offscreen color format. Colors are written as-is, without sRGB encoding.
pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Renders frames into an offscreen texture and keeps the last one as RGBA8.
pub struct OffscreenRenderer {
    ctx: GpuContext,
    renderer: SceneRenderer,
    target: RenderTarget,
    readback: ReadbackBuffer,
    pixels: Option<Vec<u8>>,
    disposed: bool,
}

impl OffscreenRenderer {
    const TARGET_LABEL: &'static str = "offscreen_target";

    /// Acquire a headless GPU context sized for `viewport`'s drawing buffer.
    pub async fn new(viewport: &Viewport) -> Result<Self, RenderError> {
        let ctx = GpuContext::new().await?;
        Ok(Self::with_context(ctx, viewport))
    }

    /// Drawing buffers larger than the device's texture limit are scaled down.
    pub fn with_context(ctx: GpuContext, viewport: &Viewport) -> Self {
        let (width, height) = viewport.drawing_buffer_size_within(ctx.max_texture_dimension());
        let renderer = SceneRenderer::new(
            ctx.device.clone(),
            ctx.queue.clone(),
            OUTPUT_FORMAT,
            (width, height),
        );
        let target = RenderTarget::for_output(&ctx.device, Self::TARGET_LABEL, width, height, OUTPUT_FORMAT);
        let readback = ReadbackBuffer::new(&ctx.device, width, height);

        Self {
            ctx,
            renderer,
            target,
            readback,
            pixels: None,
            disposed: false,
        }
    }

    /// Drawing buffer size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.target.size()
    }

    /// Render `frame` and return its RGBA pixels (row-major, no padding).
    pub fn render(&mut self, frame: &FrameData<'_>) -> Result<&[u8], RenderError> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        self.renderer.upload(frame);

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("offscreen_encoder"),
            });
        self.renderer.encode(&mut encoder, self.target.view());
        self.readback.copy_from(&mut encoder, self.target.texture());
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        let pixels = self.readback.read_pixels(&self.ctx.device)?;
        Ok(self.pixels.insert(pixels).as_slice())
    }

    /// Pixels of the last rendered frame.
    pub fn pixels(&self) -> Option<&[u8]> {
        self.pixels.as_deref()
    }

    /// Write the last rendered frame as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let pixels = self.pixels.as_ref().ok_or(RenderError::NoFrame)?;
        save_png(path, self.size(), pixels.clone())
    }

    pub fn ledger(&self) -> &ResourceLedger {
        self.renderer.ledger()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Encode RGBA8 pixels of `size` as a PNG file.
pub fn save_png(path: impl AsRef<Path>, size: (u32, u32), pixels: Vec<u8>) -> Result<(), RenderError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let image = image::RgbaImage::from_raw(size.0, size.1, pixels).ok_or_else(|| {
        RenderError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "pixel buffer does not match image size",
        ))
    })?;
    image.save(path)?;
    Ok(())
}

impl SceneBackend for OffscreenRenderer {
    fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), ComponentError> {
        self.render(frame)?;
        Ok(())
    }

    fn resize(&mut self, viewport: &Viewport) {
        if self.disposed {
            return;
        }
        let (width, height) = viewport.drawing_buffer_size_within(self.ctx.max_texture_dimension());
        if (width, height) == self.size() {
            return;
        }
        self.renderer.resize(width, height);
        self.target.texture().destroy();
        self.target = RenderTarget::for_output(&self.ctx.device, Self::TARGET_LABEL, width, height, OUTPUT_FORMAT);
        self.readback = ReadbackBuffer::new(&self.ctx.device, width, height);
        self.pixels = None;
        log::debug!("Offscreen target resized to {}x{}", width, height);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.renderer.dispose();
        self.target.texture().destroy();
        self.readback.buffer().destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_png_rejects_short_buffer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = save_png(dir.path().join("frame.png"), (4, 4), vec![0; 8]);
        assert!(matches!(result, Err(RenderError::Io(_))));
    }

    #[test]
    fn test_save_png_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("frame.png");
        save_png(&path, (2, 2), vec![255; 16]).expect("save png");
        let decoded = image::open(&path).expect("decode png").to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
    }
}
