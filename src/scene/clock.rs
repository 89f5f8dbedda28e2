//! Fixed-step animation clock.

/// Time added to the clock on every frame.
pub const TIME_STEP: f32 = 0.01;

/// Monotonic animation time, advanced once per rendered frame.
///
/// The step is fixed rather than derived from wall-clock deltas, so apparent
/// motion speed follows the display refresh rate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationClock {
    time: f32,
}

impl AnimationClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one step and return the new time.
    pub fn tick(&mut self) -> f32 {
        self.time += TIME_STEP;
        self.time
    }

    /// Current time.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Reset back to zero.
    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}
