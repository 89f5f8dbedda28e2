//! Hero Waveform
//!
//! GPU-rendered animated 3D waveform backdrop for landing page hero sections.
//!
//! # Features
//!
//! - Three layered bar waveforms (orange/gray primary row, two ghost echoes)
//!   animated with layered sine functions on a fixed-step clock
//! - 2000-point additive particle field
//! - Instanced rendering via wgpu (Metal, Vulkan, DX12, GL)
//! - Window host via winit (when `window` feature is enabled)
//! - Headless rendering with PNG export

pub mod component;
pub mod config;
pub mod gpu;
pub mod scene;

#[cfg(feature = "window")]
pub mod app;

// Re-export commonly used types
pub use component::{ComponentError, FrameSchedule, SceneBackend, VoiceWaveform};
pub use config::{parse_hex_color, ConfigError, HeroConfig};
pub use gpu::{GpuContext, GpuError, OffscreenRenderer, RenderError, SurfaceRenderer};
pub use scene::{FrameData, SceneOptions, Viewport, WaveformScene};
