//! A single timed morph toward one shape.

use super::Easing;
use std::time::Duration;

/// Progress of one morph. Advanced by simulated frame time only, so a
/// scene that stops producing frames freezes its transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    target: usize,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
    progress: f32,
}

impl Transition {
    pub fn new(target: usize, duration: Duration, easing: Easing) -> Self {
        Self {
            target,
            elapsed: Duration::ZERO,
            duration,
            easing,
            progress: 0.0,
        }
    }

    /// Step forward by `dt` and return the eased progress.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        let linear = if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f32() / self.duration.as_secs_f32()
        };
        self.progress = self.easing.apply(linear);
        self.progress
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_to_completion() {
        let mut t = Transition::new(2, Duration::from_millis(100), Easing::Linear);
        assert_eq!(t.progress(), 0.0);
        assert!(!t.is_complete());

        assert!((t.advance(Duration::from_millis(25)) - 0.25).abs() < 1e-6);
        t.advance(Duration::from_millis(200));
        assert!(t.is_complete());
        assert_eq!(t.progress(), 1.0);
        assert_eq!(t.elapsed(), Duration::from_millis(100));
        assert_eq!(t.target(), 2);
    }

    #[test]
    fn test_zero_step_does_not_move() {
        let mut t = Transition::new(0, Duration::from_secs(4), Easing::STANDARD);
        t.advance(Duration::from_secs(1));
        let before = t.progress();
        assert_eq!(t.advance(Duration::ZERO), before);
    }
}
