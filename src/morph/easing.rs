//! Timing curves for transitions.

/// Maps linear time in `[0, 1]` to eased progress in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// CSS `cubic-bezier(x1, y1, x2, y2)` with fixed endpoints `(0,0)` and `(1,1)`.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 32;
const EPSILON: f32 = 1e-6;

impl Easing {
    /// Material "standard" curve, `cubic-bezier(0.4, 0.0, 0.2, 1.0)`.
    pub const STANDARD: Self = Self::CubicBezier {
        x1: 0.4,
        y1: 0.0,
        x2: 0.2,
        y2: 1.0,
    };

    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Self::Linear => t,
            Self::CubicBezier { x1, y1, x2, y2 } => {
                let x = Polynomial::new(x1, x2);
                let y = Polynomial::new(y1, y2);
                y.sample(x.solve(t))
            }
        }
    }
}

/// One axis of a unit cubic Bezier in power form: `((a*s + b)*s + c)*s`.
#[derive(Clone, Copy)]
struct Polynomial {
    a: f32,
    b: f32,
    c: f32,
}

impl Polynomial {
    fn new(p1: f32, p2: f32) -> Self {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        Self { a, b, c }
    }

    #[inline]
    fn sample(&self, s: f32) -> f32 {
        ((self.a * s + self.b) * s + self.c) * s
    }

    #[inline]
    fn derivative(&self, s: f32) -> f32 {
        (3.0 * self.a * s + 2.0 * self.b) * s + self.c
    }

    /// Parameter `s` with `sample(s) == x`.
    fn solve(&self, x: f32) -> f32 {
        let mut s = x;
        for _ in 0..NEWTON_ITERATIONS {
            let error = self.sample(s) - x;
            if error.abs() < EPSILON {
                return s;
            }
            let slope = self.derivative(s);
            if slope.abs() < EPSILON {
                break;
            }
            s -= error / slope;
        }

        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        s = x;
        for _ in 0..BISECTION_ITERATIONS {
            let value = self.sample(s);
            if (value - x).abs() < EPSILON {
                break;
            }
            if value < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) * 0.5;
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [Easing::Linear, Easing::STANDARD] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(-3.0), 0.0);
            assert_eq!(easing.apply(7.0), 1.0);
        }
    }

    #[test]
    fn test_standard_is_monotone() {
        let mut last = 0.0;
        for i in 0..=1000 {
            let v = Easing::STANDARD.apply(i as f32 / 1000.0);
            assert!(v >= last - 1e-6, "{v} < {last} at step {i}");
            assert!((0.0..=1.0).contains(&v));
            last = v;
        }
    }

    #[test]
    fn test_standard_shape() {
        // Slow start, fast finish.
        assert!(Easing::STANDARD.apply(0.1) < 0.1);
        assert!(Easing::STANDARD.apply(0.5) > 0.5);
        assert!(Easing::STANDARD.apply(0.9) > 0.95);
    }

    #[test]
    fn test_symmetric_curve_midpoint() {
        let ease = Easing::CubicBezier {
            x1: 0.42,
            y1: 0.0,
            x2: 0.58,
            y2: 1.0,
        };
        assert!((ease.apply(0.5) - 0.5).abs() < 1e-4);
    }
}
