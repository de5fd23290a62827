use glam::Vec2;

/// Linear interpolation, `a + (b - a) * t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Exponential smoother that moves a fixed fraction toward its input on every
/// update, independent of the time elapsed between updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSmoother {
    value: f32,
    factor: f32,
}

impl ExponentialSmoother {
    pub fn new(initial: f32, factor: f32) -> Self {
        debug_assert!(factor > 0.0 && factor <= 1.0, "smoothing factor out of range");
        Self {
            value: initial,
            factor,
        }
    }

    /// Moves the smoothed value toward `target` and returns the new value.
    pub fn update(&mut self, target: f32) -> f32 {
        self.value = lerp(self.value, target, self.factor);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }
}

/// Componentwise [`ExponentialSmoother`] for 2D signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSmoother2D {
    pub x: ExponentialSmoother,
    pub y: ExponentialSmoother,
}

impl ExponentialSmoother2D {
    pub fn new(initial: Vec2, factor: f32) -> Self {
        Self {
            x: ExponentialSmoother::new(initial.x, factor),
            y: ExponentialSmoother::new(initial.y, factor),
        }
    }

    pub fn update(&mut self, target: Vec2) -> Vec2 {
        Vec2::new(self.x.update(target.x), self.y.update(target.y))
    }

    pub fn value(&self) -> Vec2 {
        Vec2::new(self.x.value(), self.y.value())
    }
}
