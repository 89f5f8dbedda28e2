//! Native window host: mounts the backdrop into a full-viewport window.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::component::{FrameSchedule, VoiceWaveform};
use crate::config::{ConfigError, HeroConfig};
use crate::gpu::{GpuContext, GpuError, SurfaceRenderer};
use crate::scene::{SceneOptions, Viewport};

/// Errors that end the window host.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}

/// Open a window and run the backdrop until it is closed.
pub fn run(config: HeroConfig) -> Result<(), AppError> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let options = config.scene_options()?;
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = HeroApp::new(config, options);
    event_loop.run_app(&mut app)?;
    app.error.take().map_or(Ok(()), Err)
}

struct HeroApp {
    config: HeroConfig,
    options: SceneOptions,
    window: Option<Arc<Window>>,
    component: Option<VoiceWaveform<SurfaceRenderer>>,
    error: Option<AppError>,
}

impl HeroApp {
    fn new(config: HeroConfig, options: SceneOptions) -> Self {
        Self {
            config,
            options,
            window: None,
            component: None,
            error: None,
        }
    }

    fn mount(&mut self, window: Arc<Window>) -> Result<(), AppError> {
        let instance = GpuContext::create_instance();
        let surface = instance
            .create_surface(window.clone())
            .map_err(GpuError::from)?;
        let ctx = pollster::block_on(GpuContext::with_surface(instance, Some(&surface)))?;

        let size = window.inner_size();
        let viewport = Viewport::from_physical(
            size.width,
            size.height,
            window.scale_factor(),
            self.config.max_pixel_ratio,
        );
        let backend = SurfaceRenderer::new(ctx, surface, &viewport, self.config.vsync)?;
        self.component = Some(VoiceWaveform::mount(backend, viewport, self.options));
        window.request_redraw();
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(mut component) = self.component.take() {
            component.unmount();
        }
    }
}

impl ApplicationHandler for HeroApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));
        if self.config.fullscreen {
            attributes =
                attributes.with_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        if let Err(e) = self.mount(window) {
            log::error!("Failed to mount waveform: {}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                self.teardown();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                let (Some(component), Some(window)) = (self.component.as_mut(), &self.window)
                else {
                    return;
                };
                let logical = Viewport::from_physical(
                    size.width,
                    size.height,
                    window.scale_factor(),
                    self.config.max_pixel_ratio,
                );
                component.resize(logical.width, logical.height);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(component) = self.component.as_mut() {
                    log::info!("Scale factor changed to {}", scale_factor);
                    component.set_device_pixel_ratio(scale_factor);
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(component) = self.component.as_mut() else {
                    return;
                };
                match component.frame() {
                    Ok(FrameSchedule::Continue) => {
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                    Ok(FrameSchedule::Stop) => event_loop.exit(),
                    Err(e) => {
                        log::error!("Frame failed: {}", e);
                        self.teardown();
                        event_loop.exit();
                    }
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}
