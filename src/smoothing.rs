//! Exponential smoothing of the tracked fingertip
//!
//! Higher factors weight history more: smoother but laggier.

/// Default weight given to the previous position
pub const DEFAULT_SMOOTHING_FACTOR: f32 = 0.5;

/// Single-pole low-pass filter over a normalized 2D position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSmoother {
    /// Weight of the previous position, in (0, 1)
    factor: f32,

    // State
    x_prev: f32,
    y_prev: f32,
}

impl Default for PositionSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_FACTOR)
    }
}

impl PositionSmoother {
    /// Factors outside (0, 1) are clamped just inside the interval
    pub fn new(factor: f32) -> Self {
        Self {
            factor: factor.clamp(f32::EPSILON, 1.0 - f32::EPSILON),
            x_prev: 0.0,
            y_prev: 0.0,
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Last emitted position
    pub fn position(&self) -> (f32, f32) {
        (self.x_prev, self.y_prev)
    }

    /// Blend a raw position into the state and return the smoothed one
    pub fn smooth(&mut self, x: f32, y: f32) -> (f32, f32) {
        self.x_prev = self.x_prev * self.factor + x * (1.0 - self.factor);
        self.y_prev = self.y_prev * self.factor + y * (1.0 - self.factor);
        (self.x_prev, self.y_prev)
    }

    /// Replace the state, e.g. with the other strategy's last fingertip
    pub fn reseed(&mut self, x: f32, y: f32) {
        self.x_prev = x;
        self.y_prev = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_without_overshoot() {
        let mut smoother = PositionSmoother::new(0.5);
        let expected = [0.5, 0.75, 0.875, 0.9375];
        for e in expected {
            let (x, y) = smoother.smooth(1.0, 1.0);
            assert!((x - e).abs() < 1e-6);
            assert!((y - e).abs() < 1e-6);
        }

        let mut last = smoother.position().0;
        for _ in 0..100 {
            let (x, _) = smoother.smooth(1.0, 1.0);
            assert!(x >= last);
            assert!(x <= 1.0);
            last = x;
        }
    }

    #[test]
    fn test_axes_are_independent() {
        let mut smoother = PositionSmoother::new(0.5);
        let (x, y) = smoother.smooth(1.0, 0.0);
        assert!((x - 0.5).abs() < 1e-6);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_lower_factor_responds_faster() {
        let mut fast = PositionSmoother::new(0.1);
        let mut slow = PositionSmoother::new(0.9);
        let (fx, _) = fast.smooth(1.0, 1.0);
        let (sx, _) = slow.smooth(1.0, 1.0);
        assert!((fx - 0.9).abs() < 1e-6);
        assert!((sx - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_reseed_avoids_jump() {
        let mut smoother = PositionSmoother::default();
        smoother.reseed(0.8, 0.2);
        let (x, y) = smoother.smooth(0.8, 0.2);
        assert!((x - 0.8).abs() < 1e-6);
        assert!((y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_factor_is_kept_inside_open_interval() {
        assert!(PositionSmoother::new(0.0).factor() > 0.0);
        assert!(PositionSmoother::new(1.5).factor() < 1.0);
    }
}
