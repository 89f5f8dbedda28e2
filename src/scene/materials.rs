//! Material presets for the bar groups and the particle field.

/// Convert a packed `0xRRGGBB` color to normalized RGB.
pub fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// How fragments combine with what is already in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blending {
    /// Standard alpha blending.
    #[default]
    Normal,
    /// Source is added on top of the destination (glow).
    Additive,
}

/// Physically-based surface description shared by all instances of a bar group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialPreset {
    pub name: &'static str,
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
}

impl MaterialPreset {
    /// High-metalness glowing orange used by the left half of the primary row.
    pub fn orange() -> Self {
        Self {
            name: "orange",
            color: hex_rgb(0xffa500),
            emissive: hex_rgb(0xff4500),
            emissive_intensity: 4.0,
            roughness: 0.05,
            metalness: 1.0,
            opacity: 1.0,
        }
    }

    /// Zinc tones for the right half of the primary row.
    pub fn gray() -> Self {
        Self {
            name: "gray",
            color: hex_rgb(0xd4d4d8),
            emissive: hex_rgb(0x3f3f46),
            emissive_intensity: 0.2,
            roughness: 0.2,
            metalness: 0.8,
            opacity: 0.9,
        }
    }

    /// Barely visible neutral shared by both ghost layers.
    pub fn ghost() -> Self {
        Self {
            name: "ghost",
            color: hex_rgb(0x27272a),
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            roughness: 1.0,
            metalness: 0.0,
            opacity: 0.05,
        }
    }

    /// Whether the material needs alpha blending.
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Material for the glitter point field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsMaterial {
    pub color: [f32; 3],
    /// World-space point size.
    pub size: f32,
    /// Base opacity; animated every frame by the particle field.
    pub opacity: f32,
    /// Shrink points with distance from the camera.
    pub size_attenuation: bool,
    pub blending: Blending,
}

impl PointsMaterial {
    /// Golden additive glitter.
    pub fn sparkles() -> Self {
        Self {
            color: hex_rgb(0xffba08),
            size: 0.04,
            opacity: 0.6,
            size_attenuation: true,
            blending: Blending::Additive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb(0x000000), [0.0, 0.0, 0.0]);
        assert_eq!(hex_rgb(0xffffff), [1.0, 1.0, 1.0]);
        let orange = hex_rgb(0xffa500);
        assert_eq!(orange[0], 1.0);
        assert!((orange[1] - 165.0 / 255.0).abs() < 1e-6);
        assert_eq!(orange[2], 0.0);
    }

    #[test]
    fn test_transparency_flags() {
        assert!(!MaterialPreset::orange().is_transparent());
        assert!(MaterialPreset::gray().is_transparent());
        assert!(MaterialPreset::ghost().is_transparent());
    }

    #[test]
    fn test_sparkles_are_additive() {
        let material = PointsMaterial::sparkles();
        assert_eq!(material.blending, Blending::Additive);
        assert!(material.size_attenuation);
    }
}
