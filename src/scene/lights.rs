//! Static lighting rig. Lights are fixed after construction.

use glam::Vec3;

use super::materials::hex_rgb;

/// Uniform light applied to every surface regardless of orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Light arriving from `position` towards the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vec3,
}

/// Omnidirectional light with a cutoff distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Distance at which the contribution reaches zero.
    pub range: f32,
    pub position: Vec3,
}

/// The four lights of the hero scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    /// Warm accent on the orange side.
    pub warm: PointLight,
    /// Cool accent on the gray side.
    pub cool: PointLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: hex_rgb(0xffffff),
                intensity: 0.1,
            },
            key: DirectionalLight {
                color: hex_rgb(0xffffff),
                intensity: 1.5,
                position: Vec3::new(5.0, 5.0, 10.0),
            },
            warm: PointLight {
                color: hex_rgb(0xff8c00),
                intensity: 5.0,
                range: 20.0,
                position: Vec3::new(-8.0, 2.0, 5.0),
            },
            cool: PointLight {
                color: hex_rgb(0x71717a),
                intensity: 1.0,
                range: 15.0,
                position: Vec3::new(8.0, 2.0, 5.0),
            },
        }
    }
}

impl LightRig {
    /// Number of light sources in the rig.
    pub const COUNT: usize = 4;

    /// Point lights in left-to-right order.
    pub fn point_lights(&self) -> [PointLight; 2] {
        [self.warm, self.cool]
    }
}
