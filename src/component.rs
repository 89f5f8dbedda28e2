//! Mount/frame/resize/unmount lifecycle of the waveform backdrop.
//!
//! [`VoiceWaveform`] owns the scene and a [`SceneBackend`] that turns each
//! computed frame into pixels. The host drives it from its frame callback and
//! forwards resize events; after [`VoiceWaveform::unmount`] every call is inert.

use crate::scene::{FrameData, SceneOptions, Viewport, WaveformScene};

/// Errors surfaced by the component lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("Component is not mounted")]
    NotMounted,
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Something that can draw a [`FrameData`]: a window surface or an offscreen texture.
pub trait SceneBackend {
    /// Upload the frame's instance data and draw it.
    fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), ComponentError>;

    /// Resize the output to the viewport's drawing buffer size.
    fn resize(&mut self, viewport: &Viewport);

    /// Release every GPU resource. Called exactly once per mount.
    fn dispose(&mut self);
}

/// What the host should do after a frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSchedule {
    /// Request another frame.
    Continue,
    /// Stop the frame loop.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MountState {
    Mounted,
    Unmounted,
}

/// The animated backdrop component.
pub struct VoiceWaveform<B: SceneBackend> {
    scene: WaveformScene,
    backend: B,
    state: MountState,
    listening_for_resize: bool,
    frames_rendered: u64,
}

impl<B: SceneBackend> VoiceWaveform<B> {
    /// Build the scene for `viewport` and attach it to `backend`.
    pub fn mount(backend: B, viewport: Viewport, options: SceneOptions) -> Self {
        let scene = WaveformScene::build(viewport, options);
        log::info!(
            "Mounted waveform: {}x{} @ {:.2}x, {} bar instances, {} particles",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio(),
            scene.layers.total_instances(),
            scene.particles.len()
        );
        Self {
            scene,
            backend,
            state: MountState::Mounted,
            listening_for_resize: true,
            frames_rendered: 0,
        }
    }

    /// Frame callback: advance the animation and draw.
    ///
    /// Returns [`FrameSchedule::Stop`] once unmounted so the host stops
    /// requesting frames.
    pub fn frame(&mut self) -> Result<FrameSchedule, ComponentError> {
        if self.state != MountState::Mounted {
            return Ok(FrameSchedule::Stop);
        }
        let frame = self.scene.update();
        self.backend.draw(&frame)?;
        self.frames_rendered += 1;
        Ok(FrameSchedule::Continue)
    }

    /// Resize handler. Returns whether the resize was applied.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.listening_for_resize || width == 0 || height == 0 {
            return false;
        }
        self.scene.resize(width, height);
        self.backend.resize(&self.scene.viewport);
        log::debug!(
            "Resized to {}x{} (aspect {:.3})",
            width,
            height,
            self.scene.camera.aspect
        );
        true
    }

    /// Device pixel ratio changed; the drawing buffer follows.
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        if !self.listening_for_resize {
            return;
        }
        self.scene.set_device_pixel_ratio(ratio);
        self.backend.resize(&self.scene.viewport);
    }

    /// Stop listening for resizes, stop the frame loop and release the backend.
    ///
    /// Calling it again is a no-op.
    pub fn unmount(&mut self) {
        if self.state != MountState::Mounted {
            return;
        }
        self.listening_for_resize = false;
        self.state = MountState::Unmounted;
        self.backend.dispose();
        log::info!("Unmounted waveform after {} frames", self.frames_rendered);
    }

    pub fn is_mounted(&self) -> bool {
        self.state == MountState::Mounted
    }

    pub fn is_listening_for_resize(&self) -> bool {
        self.listening_for_resize
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn scene(&self) -> &WaveformScene {
        &self.scene
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: SceneBackend> Drop for VoiceWaveform<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingBackend {
        draws: usize,
        resizes: Vec<(u32, u32)>,
        disposals: usize,
    }

    impl SceneBackend for CountingBackend {
        fn draw(&mut self, _frame: &FrameData<'_>) -> Result<(), ComponentError> {
            self.draws += 1;
            Ok(())
        }

        fn resize(&mut self, viewport: &Viewport) {
            self.resizes.push(viewport.drawing_buffer_size());
        }

        fn dispose(&mut self) {
            self.disposals += 1;
        }
    }

    fn mounted() -> VoiceWaveform<CountingBackend> {
        VoiceWaveform::mount(
            CountingBackend::default(),
            Viewport::new(800, 600, 1.0, 2.0),
            SceneOptions::default(),
        )
    }

    #[test]
    fn test_frame_draws_while_mounted() {
        let mut waveform = mounted();
        assert_eq!(waveform.frame().unwrap(), FrameSchedule::Continue);
        assert_eq!(waveform.frame().unwrap(), FrameSchedule::Continue);
        assert_eq!(waveform.backend().draws, 2);
        assert_eq!(waveform.frames_rendered(), 2);
    }

    #[test]
    fn test_zero_sized_resize_ignored() {
        let mut waveform = mounted();
        assert!(!waveform.resize(0, 600));
        assert!(waveform.backend().resizes.is_empty());
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let mut waveform = mounted();
        waveform.unmount();
        waveform.unmount();
        assert_eq!(waveform.backend().disposals, 1);
        assert!(!waveform.is_mounted());
    }

    #[test]
    fn test_no_frame_work_after_unmount() {
        let mut waveform = mounted();
        waveform.frame().unwrap();
        waveform.unmount();
        assert_eq!(waveform.frame().unwrap(), FrameSchedule::Stop);
        assert_eq!(waveform.backend().draws, 1);
        assert!(!waveform.resize(1024, 768));
        assert!(waveform.backend().resizes.is_empty());
    }
}
