//! Glitter particle field.
//!
//! A fixed set of points scattered in a box around the row. Each frame every
//! point floats vertically and the whole field's opacity pulses.

use serde::{Deserialize, Serialize};

/// Number of points in the field.
pub const PARTICLE_COUNT: usize = 2000;
/// Full extents of the initial scatter box, centered on the origin.
pub const SCATTER_EXTENT: [f32; 3] = [30.0, 20.0, 20.0];
/// Per-frame vertical float amplitude.
const FLOAT_STEP: f32 = 0.005;

/// What happens to points that float far from where they started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleDrift {
    /// Accumulate without bound.
    #[default]
    Unbounded,
    /// Wrap the vertical coordinate back into the scatter box.
    Wrap,
}

/// Simple pseudo-random number generator for deterministic particle placement.
struct Rng {
    state: u32,
}

impl Rng {
    fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    /// Uniform in [0, 1).
    fn next(&mut self) -> f32 {
        // xorshift32
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        (self.state >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// Point positions plus a per-point random phase slot.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<[f32; 3]>,
    velocities: Vec<f32>,
    opacity: f32,
    drift: ParticleDrift,
}

impl ParticleField {
    /// Scatter [`PARTICLE_COUNT`] points uniformly in the scatter box.
    pub fn new(seed: u32, drift: ParticleDrift) -> Self {
        Self::with_count(PARTICLE_COUNT, seed, drift)
    }

    pub fn with_count(count: usize, seed: u32, drift: ParticleDrift) -> Self {
        let mut rng = Rng::new(seed);
        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push([
                (rng.next() - 0.5) * SCATTER_EXTENT[0],
                (rng.next() - 0.5) * SCATTER_EXTENT[1],
                (rng.next() - 0.5) * SCATTER_EXTENT[2],
            ]);
            velocities.push(rng.next());
        }

        Self {
            positions,
            velocities,
            opacity: opacity_at(0.0),
            drift,
        }
    }

    /// Float every point and pulse the field opacity for animation time `time`.
    pub fn update(&mut self, time: f32) {
        let half_height = SCATTER_EXTENT[1] * 0.5;
        for (k, position) in self.positions.iter_mut().enumerate() {
            position[1] += (time + k as f32).sin() * FLOAT_STEP;
            if self.drift == ParticleDrift::Wrap {
                position[1] = (position[1] + half_height).rem_euclid(SCATTER_EXTENT[1]) - half_height;
            }
        }
        self.opacity = opacity_at(time);
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    /// Current global opacity of the field.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Field opacity, oscillating in [0.2, 0.6].
pub fn opacity_at(time: f32) -> f32 {
    0.4 + (time * 2.0).sin() * 0.2
}
