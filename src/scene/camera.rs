//! Perspective camera with a slow idle drift, and the viewport it projects onto.

use glam::{Mat4, Vec3};

/// Vertical field of view. Kept narrow for a cinematic look.
pub const FOV_Y_DEGREES: f32 = 35.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;
/// Distance of the camera from the row of bars.
pub const CAMERA_DISTANCE: f32 = 15.0;

/// Horizontal drift amplitude.
pub const DRIFT_X: f32 = 0.4;
/// Vertical drift amplitude.
pub const DRIFT_Y: f32 = 0.2;

/// Perspective camera always aimed at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    /// Create the hero camera at its rest position for the given aspect ratio.
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            fov_y_degrees: FOV_Y_DEGREES,
            aspect,
            near: NEAR,
            far: FAR,
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            target: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the cached projection from fov/aspect/near/far.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    /// Change the aspect ratio and recompute the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Move along the idle ellipse for animation time `time` and re-aim at the target.
    pub fn drift(&mut self, time: f32) {
        self.position.x = (time * 0.2).sin() * DRIFT_X;
        self.position.y = (time * 0.15).cos() * DRIFT_Y;
        self.look_at(Vec3::ZERO);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

/// Size of the output surface in logical pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
    /// Upper bound applied to the device pixel ratio.
    pub max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            max_pixel_ratio,
        }
    }

    /// Build from a physical surface size, the way windowing systems report it.
    pub fn from_physical(
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
        max_pixel_ratio: f64,
    ) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            width: (physical_width as f64 / scale).round() as u32,
            height: (physical_height as f64 / scale).round() as u32,
            device_pixel_ratio: scale,
            max_pixel_ratio,
        }
    }

    /// Device pixel ratio, capped.
    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(self.max_pixel_ratio)
    }

    /// Size of the color buffer actually rendered into.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            ((self.width as f64 * ratio).floor() as u32).max(1),
            ((self.height as f64 * ratio).floor() as u32).max(1),
        )
    }

    /// [`Self::drawing_buffer_size`] scaled down uniformly so neither side
    /// exceeds `max_dimension` (the device's texture size limit).
    pub fn drawing_buffer_size_within(&self, max_dimension: u32) -> (u32, u32) {
        let (width, height) = self.drawing_buffer_size();
        let max_dimension = max_dimension.max(1);
        if width <= max_dimension && height <= max_dimension {
            return (width, height);
        }
        let shrink = |side: u32, longest: u32| {
            ((side as u64 * max_dimension as u64 / longest as u64) as u32).max(1)
        };
        if width >= height {
            (max_dimension, shrink(height, width))
        } else {
            (shrink(width, height), max_dimension)
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
