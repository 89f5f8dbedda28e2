//! Hero scene: everything that is computed on the CPU each frame.
//!
//! - `clock`: fixed-step animation time
//! - `waveform`: the primary row and its two ghost echoes
//! - `particles`: floating glitter field
//! - `camera`: perspective camera with idle drift, viewport
//! - `lights` / `materials`: static rig and surface presets
//!
//! Nothing here touches the GPU; backends consume [`FrameData`].

pub mod camera;
pub mod clock;
pub mod lights;
pub mod materials;
pub mod particles;
pub mod waveform;

pub use camera::{PerspectiveCamera, Viewport};
pub use clock::{AnimationClock, TIME_STEP};
pub use lights::{AmbientLight, DirectionalLight, LightRig, PointLight};
pub use materials::{hex_rgb, Blending, MaterialPreset, PointsMaterial};
pub use particles::{ParticleDrift, ParticleField, PARTICLE_COUNT};
pub use waveform::{LayerKind, WaveformLayers, BAR_COUNT, HALF_COUNT, MIN_BAR_HEIGHT};

use glam::Mat4;

/// Per-bar instance data uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BarInstance {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
    /// Instance tint, multiplied with the material color.
    pub color: [f32; 4],
}

impl Default for BarInstance {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0; 4],
        }
    }
}

impl BarInstance {
    pub fn new(model: Mat4, color: [f32; 3]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [color[0], color[1], color[2], 1.0],
        }
    }

    /// Vertical scale, i.e. the rendered bar height.
    pub fn height(&self) -> f32 {
        self.model[1][1]
    }

    pub fn width_scale(&self) -> f32 {
        self.model[0][0]
    }

    pub fn position(&self) -> [f32; 3] {
        [self.model[3][0], self.model[3][1], self.model[3][2]]
    }
}

/// Scene construction options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    /// Seed for the particle scatter.
    pub seed: u32,
    pub particle_drift: ParticleDrift,
    /// Background clear color.
    pub background: [f32; 3],
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            particle_drift: ParticleDrift::Unbounded,
            background: [0.0, 0.0, 0.0],
        }
    }
}

/// Complete scene graph state owned by one mounted component.
#[derive(Debug, Clone)]
pub struct WaveformScene {
    pub camera: PerspectiveCamera,
    pub viewport: Viewport,
    pub clock: AnimationClock,
    pub layers: WaveformLayers,
    pub particles: ParticleField,
    pub lights: LightRig,
    pub background: [f32; 3],
}

/// Read-only view of one computed frame, handed to a backend for drawing.
#[derive(Debug, Clone, Copy)]
pub struct FrameData<'a> {
    pub time: f32,
    pub camera: &'a PerspectiveCamera,
    pub viewport: &'a Viewport,
    pub layers: &'a WaveformLayers,
    pub particles: &'a ParticleField,
    pub lights: &'a LightRig,
    pub background: [f32; 3],
}

impl WaveformScene {
    /// Build the scene once at mount time.
    pub fn build(viewport: Viewport, options: SceneOptions) -> Self {
        let mut scene = Self {
            camera: PerspectiveCamera::new(viewport.aspect()),
            viewport,
            clock: AnimationClock::new(),
            layers: WaveformLayers::new(),
            particles: ParticleField::new(options.seed, options.particle_drift),
            lights: LightRig::default(),
            background: options.background,
        };
        scene.layers.update(0.0);
        scene
    }

    /// Advance the clock one step and recompute camera, particles and bars.
    pub fn update(&mut self) -> FrameData<'_> {
        let time = self.clock.tick();
        self.camera.drift(time);
        self.particles.update(time);
        self.layers.update(time);
        self.frame()
    }

    /// Current frame state without advancing time.
    pub fn frame(&self) -> FrameData<'_> {
        FrameData {
            time: self.clock.time(),
            camera: &self.camera,
            viewport: &self.viewport,
            layers: &self.layers,
            particles: &self.particles,
            lights: &self.lights,
            background: self.background,
        }
    }

    /// Apply a new output size: camera aspect and projection follow.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.camera.set_aspect(self.viewport.aspect());
    }

    /// Change the device pixel ratio (moving between monitors).
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.viewport.device_pixel_ratio = ratio;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1280, 720, 1.0, 2.0)
    }

    #[test]
    fn test_build_starts_at_time_zero() {
        let scene = WaveformScene::build(viewport(), SceneOptions::default());
        assert_eq!(scene.clock.time(), 0.0);
        assert!((scene.camera.aspect - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_advances_clock() {
        let mut scene = WaveformScene::build(viewport(), SceneOptions::default());
        let time = scene.update().time;
        assert!((time - TIME_STEP).abs() < 1e-6);
    }

    #[test]
    fn test_bar_instance_accessors() {
        let instance = BarInstance::new(
            Mat4::from_scale_rotation_translation(
                glam::Vec3::new(1.2, 3.0, 1.0),
                glam::Quat::IDENTITY,
                glam::Vec3::new(-2.0, 0.0, -1.5),
            ),
            [0.5, 0.25, 0.0],
        );
        assert_eq!(instance.height(), 3.0);
        assert_eq!(instance.width_scale(), 1.2);
        assert_eq!(instance.position(), [-2.0, 0.0, -1.5]);
        assert_eq!(instance.color, [0.5, 0.25, 0.0, 1.0]);
    }

    #[test]
    fn test_resize_updates_camera() {
        let mut scene = WaveformScene::build(viewport(), SceneOptions::default());
        let before = scene.camera.projection_matrix();
        scene.resize(600, 800);
        assert_eq!((scene.viewport.width, scene.viewport.height), (600, 800));
        assert!((scene.camera.aspect - 0.75).abs() < 1e-6);
        assert_ne!(before, scene.camera.projection_matrix());
    }
}
