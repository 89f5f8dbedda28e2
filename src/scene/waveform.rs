//! Synthetic waveform: per-bar amplitude, height, color and transforms.
//!
//! Every value is a pure function of the animation time and the bar index, so
//! a frame can be recomputed from scratch without any carried state.

use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec3};

use super::materials::hex_rgb;
use super::BarInstance;

/// Bars in one full row.
pub const BAR_COUNT: usize = 150;
/// Bars drawn with the orange material; the rest of the row is gray.
pub const HALF_COUNT: usize = BAR_COUNT / 2;
/// Distance between neighbouring bar centers.
pub const SPACING: f32 = 0.1;
/// Total width of the row.
pub const WAVEFORM_WIDTH: f32 = BAR_COUNT as f32 * SPACING;
/// Box geometry extents before per-instance scaling.
pub const BAR_WIDTH: f32 = 0.06;
pub const BAR_DEPTH: f32 = 0.2;
/// Smallest height a bar is ever given.
pub const MIN_BAR_HEIGHT: f32 = 0.05;

const ENVELOPE_POWER: f32 = 0.6;
const PRIMARY_GAIN: f32 = 3.5;
/// Amplitude at which a left bar is fully shifted to the accent color.
const ACCENT_SATURATION: f32 = 2.5;

/// One of the four batched bar groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    LeftPrimary,
    RightPrimary,
    Ghost1,
    Ghost2,
}

impl LayerKind {
    pub fn all() -> &'static [Self] {
        &[
            Self::LeftPrimary,
            Self::RightPrimary,
            Self::Ghost1,
            Self::Ghost2,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftPrimary => "left-primary",
            Self::RightPrimary => "right-primary",
            Self::Ghost1 => "ghost-1",
            Self::Ghost2 => "ghost-2",
        }
    }

    /// Fixed instance count of the group.
    pub fn instance_count(&self) -> usize {
        match self {
            Self::LeftPrimary => HALF_COUNT,
            Self::RightPrimary => BAR_COUNT - HALF_COUNT,
            Self::Ghost1 | Self::Ghost2 => BAR_COUNT,
        }
    }

    /// Z offset of the layer; ghosts sit behind the primary row.
    pub fn depth(&self) -> f32 {
        match self {
            Self::LeftPrimary | Self::RightPrimary => 0.0,
            Self::Ghost1 => -1.5,
            Self::Ghost2 => -3.0,
        }
    }

    /// Horizontal scale applied to each box.
    pub fn width_scale(&self) -> f32 {
        match self {
            Self::LeftPrimary | Self::RightPrimary => 1.0,
            Self::Ghost1 => 1.2,
            Self::Ghost2 => 1.5,
        }
    }

    /// Amplitude-to-height multiplier.
    pub fn gain(&self) -> f32 {
        match self {
            Self::LeftPrimary | Self::RightPrimary => PRIMARY_GAIN,
            Self::Ghost1 => 4.5,
            Self::Ghost2 => 5.5,
        }
    }
}

/// Amplitude shaping that tapers the row towards both ends.
///
/// Zero at index 0; the power below one widens the plateau in the middle.
pub fn envelope(index: usize) -> f32 {
    (index as f32 / BAR_COUNT as f32 * PI)
        .sin()
        .max(0.0)
        .powf(ENVELOPE_POWER)
}

/// Horizontal center of bar `index`, with the row centered on the origin.
pub fn row_x(index: usize) -> f32 {
    index as f32 * SPACING - WAVEFORM_WIDTH / 2.0
}

/// Foreground amplitude: three layered sines offset above zero.
pub fn primary_amplitude(time: f32, index: usize) -> f32 {
    let i = index as f32;
    let slow = (time * 1.2 + i * 0.05).sin();
    let fast = (time * 3.5 + i * 0.2).sin() * 0.4;
    let micro = (time * 8.0 - i * 0.1).sin() * 0.15;
    (slow + fast + micro + 1.2) * envelope(index)
}

/// First ghost layer, slower and deeper. Range is [-0.3, 1.3] times the envelope.
pub fn ghost1_amplitude(time: f32, index: usize) -> f32 {
    let wave = (time * 0.6 + index as f32 * 0.04).sin() * 0.8 + 0.5;
    wave * envelope(index)
}

/// Second ghost layer. Range is [-0.2, 1.0] times the envelope.
pub fn ghost2_amplitude(time: f32, index: usize) -> f32 {
    let wave = (time * 0.4 - index as f32 * 0.03).sin() * 0.6 + 0.4;
    wave * envelope(index)
}

/// Amplitude of bar `index` in `layer`.
pub fn layer_amplitude(layer: LayerKind, time: f32, index: usize) -> f32 {
    match layer {
        LayerKind::LeftPrimary | LayerKind::RightPrimary => primary_amplitude(time, index),
        LayerKind::Ghost1 => ghost1_amplitude(time, index),
        LayerKind::Ghost2 => ghost2_amplitude(time, index),
    }
}

/// Scale an amplitude into a bar height, never below [`MIN_BAR_HEIGHT`].
pub fn bar_height(amplitude: f32, gain: f32) -> f32 {
    (amplitude * gain).max(MIN_BAR_HEIGHT)
}

/// Interpolation factor towards the accent color for a left bar.
pub fn accent_mix(amplitude: f32) -> f32 {
    (amplitude / ACCENT_SATURATION).clamp(0.0, 1.0)
}

/// Left bars: orange shifting to red-orange as they get louder.
pub fn left_color(amplitude: f32) -> [f32; 3] {
    let base = hex_rgb(0xffa500);
    let accent = hex_rgb(0xff4500);
    let t = accent_mix(amplitude);
    [
        base[0] + (accent[0] - base[0]) * t,
        base[1] + (accent[1] - base[1]) * t,
        base[2] + (accent[2] - base[2]) * t,
    ]
}

/// Brightness multiplier of right bars, oscillating in [0.6, 1.0].
pub fn gray_brightness(time: f32, index: usize) -> f32 {
    0.8 + (time + index as f32 * 0.1).sin() * 0.2
}

/// Right bars: zinc gray scaled by [`gray_brightness`].
pub fn right_color(time: f32, index: usize) -> [f32; 3] {
    let gray = hex_rgb(0xd4d4d8);
    let k = gray_brightness(time, index);
    [gray[0] * k, gray[1] * k, gray[2] * k]
}

fn bar_transform(x: f32, z: f32, width_scale: f32, height: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(width_scale, height, 1.0),
        Quat::IDENTITY,
        Vec3::new(x, 0.0, z),
    )
}

/// Instance data of all four bar groups.
///
/// Buffers are allocated once with their fixed counts and fully rewritten on
/// every [`WaveformLayers::update`].
#[derive(Debug, Clone)]
pub struct WaveformLayers {
    left: Vec<BarInstance>,
    right: Vec<BarInstance>,
    ghost1: Vec<BarInstance>,
    ghost2: Vec<BarInstance>,
}

impl Default for WaveformLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformLayers {
    pub fn new() -> Self {
        let alloc = |layer: LayerKind| vec![BarInstance::default(); layer.instance_count()];
        Self {
            left: alloc(LayerKind::LeftPrimary),
            right: alloc(LayerKind::RightPrimary),
            ghost1: alloc(LayerKind::Ghost1),
            ghost2: alloc(LayerKind::Ghost2),
        }
    }

    /// Recompute every instance of every group for animation time `time`.
    pub fn update(&mut self, time: f32) {
        for i in 0..BAR_COUNT {
            let x = row_x(i);

            let amplitude = primary_amplitude(time, i);
            let height = bar_height(amplitude, PRIMARY_GAIN);
            let model = bar_transform(x, 0.0, 1.0, height);
            if i < HALF_COUNT {
                self.left[i] = BarInstance::new(model, left_color(amplitude));
            } else {
                self.right[i - HALF_COUNT] = BarInstance::new(model, right_color(time, i));
            }

            for (layer, slot) in [
                (LayerKind::Ghost1, &mut self.ghost1[i]),
                (LayerKind::Ghost2, &mut self.ghost2[i]),
            ] {
                let height = bar_height(layer_amplitude(layer, time, i), layer.gain());
                let model = bar_transform(x, layer.depth(), layer.width_scale(), height);
                *slot = BarInstance::new(model, [1.0, 1.0, 1.0]);
            }
        }
    }

    /// Instances of one group.
    pub fn instances(&self, layer: LayerKind) -> &[BarInstance] {
        match layer {
            LayerKind::LeftPrimary => &self.left,
            LayerKind::RightPrimary => &self.right,
            LayerKind::Ghost1 => &self.ghost1,
            LayerKind::Ghost2 => &self.ghost2,
        }
    }

    /// Total instance count over all groups.
    pub fn total_instances(&self) -> usize {
        LayerKind::all()
            .iter()
            .map(|layer| self.instances(*layer).len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_counts() {
        assert_eq!(LayerKind::LeftPrimary.instance_count(), 75);
        assert_eq!(LayerKind::RightPrimary.instance_count(), 75);
        assert_eq!(LayerKind::Ghost1.instance_count(), 150);
        assert_eq!(LayerKind::Ghost2.instance_count(), 150);
        assert_eq!(WaveformLayers::new().total_instances(), 450);
    }

    #[test]
    fn test_envelope_shape() {
        assert_eq!(envelope(0), 0.0);
        let mid = envelope(BAR_COUNT / 2);
        assert!((mid - 1.0).abs() < 1e-4);
        // Symmetric around the middle of the row.
        assert!((envelope(10) - envelope(BAR_COUNT - 10)).abs() < 1e-4);
        // Power below one lifts values above the plain sine.
        let plain = (10.0 / BAR_COUNT as f32 * PI).sin();
        assert!(envelope(10) > plain);
    }

    #[test]
    fn test_row_is_centered() {
        assert!((row_x(0) + WAVEFORM_WIDTH / 2.0).abs() < 1e-6);
        assert!((row_x(1) - row_x(0) - SPACING).abs() < 1e-6);
    }

    #[test]
    fn test_edge_bar_height_at_time_zero() {
        let amplitude = primary_amplitude(0.0, 0);
        assert_eq!(amplitude, 0.0);
        assert_eq!(bar_height(amplitude, PRIMARY_GAIN), MIN_BAR_HEIGHT);
    }

    #[test]
    fn test_accent_mix_clamped() {
        assert_eq!(accent_mix(-3.0), 0.0);
        assert_eq!(accent_mix(100.0), 1.0);
        assert!((accent_mix(1.25) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_left_color_endpoints() {
        assert_eq!(left_color(0.0), hex_rgb(0xffa500));
        assert_eq!(left_color(10.0), hex_rgb(0xff4500));
    }

    #[test]
    fn test_gray_brightness_range() {
        for step in 0..500 {
            let time = step as f32 * 0.37;
            for i in 0..BAR_COUNT {
                let k = gray_brightness(time, i);
                assert!((0.6 - 1e-5..=1.0 + 1e-5).contains(&k));
            }
        }
    }

    #[test]
    fn test_update_writes_heights_and_depths() {
        let mut layers = WaveformLayers::new();
        layers.update(1.0);

        let mid = HALF_COUNT - 1;
        let expected = bar_height(primary_amplitude(1.0, mid), PRIMARY_GAIN);
        let instance = layers.instances(LayerKind::LeftPrimary)[mid];
        assert!((instance.height() - expected).abs() < 1e-5);
        assert_eq!(instance.position()[2], 0.0);

        let ghost = layers.instances(LayerKind::Ghost2)[mid];
        assert_eq!(ghost.position()[2], -3.0);
        assert!((ghost.width_scale() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_right_half_uses_global_index() {
        let mut layers = WaveformLayers::new();
        layers.update(2.0);
        let first_right = layers.instances(LayerKind::RightPrimary)[0];
        assert!((first_right.position()[0] - row_x(HALF_COUNT)).abs() < 1e-5);
        let expected = right_color(2.0, HALF_COUNT);
        for c in 0..3 {
            assert!((first_right.color[c] - expected[c]).abs() < 1e-6);
        }
    }
}
