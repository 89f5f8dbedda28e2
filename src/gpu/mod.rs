//! GPU rendering using wgpu.
//!
//! Turns computed [`crate::scene::FrameData`] into pixels, either into a
//! window surface ([`SurfaceRenderer`]) or an offscreen texture
//! ([`OffscreenRenderer`]). Both share one [`SceneRenderer`] holding the
//! bar geometry, materials, instance buffers and particle sprites.

pub mod bars;
pub mod context;
pub mod geometry;
pub mod layouts;
pub mod offscreen;
pub mod pipelines;
pub mod points;
pub mod renderer;
pub mod resources;
pub mod surface;
pub mod textures;

pub use context::{GpuContext, GpuError};
pub use offscreen::{OffscreenRenderer, RenderError};
pub use renderer::SceneRenderer;
pub use resources::ResourceLedger;
pub use surface::SurfaceRenderer;
