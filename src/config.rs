//! Runtime configuration for the hero backdrop.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::scene::{ParticleDrift, SceneOptions, Viewport};

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Configuration for mounting the waveform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    /// Initial logical window width.
    pub width: u32,
    /// Initial logical window height.
    pub height: u32,
    pub title: String,
    /// Borderless fullscreen instead of a plain window.
    pub fullscreen: bool,
    /// Particle scatter seed. `None` seeds from the system clock.
    pub seed: Option<u32>,
    /// Cap for the device pixel ratio.
    pub max_pixel_ratio: f64,
    pub particle_drift: ParticleDrift,
    /// Background color as `#rrggbb`.
    pub background: String,
    /// Present in lock-step with the display refresh.
    pub vsync: bool,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Intelligent Voice".to_string(),
            fullscreen: false,
            seed: None,
            max_pixel_ratio: 2.0,
            particle_drift: ParticleDrift::Unbounded,
            background: "#000000".to_string(),
            vsync: true,
        }
    }
}

impl HeroConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.background_rgb()?;
        Ok(config)
    }

    pub fn background_rgb(&self) -> Result<[f32; 3], ConfigError> {
        parse_hex_color(&self.background)
            .ok_or_else(|| ConfigError::InvalidColor(self.background.clone()))
    }

    /// Scene options derived from this config.
    pub fn scene_options(&self) -> Result<SceneOptions, ConfigError> {
        Ok(SceneOptions {
            seed: self.seed.unwrap_or_else(clock_seed),
            particle_drift: self.particle_drift,
            background: self.background_rgb()?,
        })
    }

    /// Viewport for the configured initial size at the given pixel ratio.
    pub fn viewport(&self, device_pixel_ratio: f64) -> Viewport {
        Viewport::new(self.width, self.height, device_pixel_ratio, self.max_pixel_ratio)
    }
}

fn clock_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

/// Parse hex color to RGB floats (accepts 6-char RGB or 8-char RGBA, alpha is ignored).
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()? as f32 / 255.0;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()? as f32 / 255.0;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()? as f32 / 255.0;
    Some([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ffa500"), Some([1.0, 165.0 / 255.0, 0.0]));
        assert_eq!(parse_hex_color("ffffff"), Some([1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("#00000000"), Some([0.0, 0.0, 0.0]));
        assert_eq!(parse_hex_color("invalid"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_config_default() {
        let config = HeroConfig::default();
        assert_eq!(config.max_pixel_ratio, 2.0);
        assert_eq!(config.background_rgb().unwrap(), [0.0, 0.0, 0.0]);
        assert!(config.vsync);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = HeroConfig::from_json(r#"{ "width": 640, "particle_drift": "wrap", "seed": 3 }"#)
            .unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 720);
        assert_eq!(config.particle_drift, ParticleDrift::Wrap);
        assert_eq!(config.scene_options().unwrap().seed, 3);
    }

    #[test]
    fn test_invalid_background_rejected() {
        let err = HeroConfig::from_json(r##"{ "background": "#zz" }"##).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor(_)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.json");
        std::fs::write(&path, r#"{ "title": "Demo", "vsync": false }"#).unwrap();
        let config = HeroConfig::from_json_file(&path).unwrap();
        assert_eq!(config.title, "Demo");
        assert!(!config.vsync);

        let missing = HeroConfig::from_json_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
