//! Frame pacing and visibility gating.

use std::time::Duration;

/// Largest simulated step. Longer gaps, such as a stalled window, are
/// clamped so transitions never jump.
pub const MAX_DELTA: Duration = Duration::from_millis(100);

/// Simulated time for one executed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Total simulated time. Stops while paused.
    pub elapsed: Duration,
    /// Time since the previous executed frame, clamped to [`MAX_DELTA`].
    pub delta: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDecision {
    /// Scene is hidden; no work this frame.
    Paused,
    /// Too soon after the previous frame.
    Throttled,
    Run(FrameTime),
}

/// Decides which host ticks become simulation frames.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    max_delta: Duration,
    last_frame: Option<Duration>,
    elapsed: Duration,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_delta: MAX_DELTA,
            last_frame: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Classify a host tick at monotonic time `now`.
    ///
    /// A hidden tick still records `now`, so the first visible frame after
    /// a pause measures its delta from the pause and not from before it.
    pub fn tick(&mut self, now: Duration, visible: bool) -> FrameDecision {
        if !visible {
            self.last_frame = Some(now);
            return FrameDecision::Paused;
        }

        let delta = match self.last_frame {
            None => Duration::ZERO,
            Some(last) => {
                let since = now.saturating_sub(last);
                if since < self.interval {
                    return FrameDecision::Throttled;
                }
                since.min(self.max_delta)
            }
        };

        self.last_frame = Some(now);
        self.elapsed += delta;
        FrameDecision::Run(FrameTime {
            elapsed: self.elapsed,
            delta,
        })
    }

    /// Forget the previous frame so the next visible tick runs with a
    /// zero delta.
    pub fn resume(&mut self) {
        self.last_frame = None;
    }

    /// Earliest time at which the next tick can run.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.last_frame.map(|last| last + self.interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_first_tick_runs_with_zero_delta() {
        let mut pacer = FramePacer::new(ms(16));
        assert_eq!(
            pacer.tick(ms(1000), true),
            FrameDecision::Run(FrameTime::default())
        );
    }

    #[test]
    fn test_throttles_inside_interval() {
        let mut pacer = FramePacer::new(ms(33));
        pacer.tick(ms(0), true);
        assert_eq!(pacer.tick(ms(20), true), FrameDecision::Throttled);
        match pacer.tick(ms(34), true) {
            FrameDecision::Run(frame) => assert_eq!(frame.delta, ms(34)),
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut pacer = FramePacer::new(ms(16));
        pacer.tick(ms(0), true);
        match pacer.tick(ms(5000), true) {
            FrameDecision::Run(frame) => {
                assert_eq!(frame.delta, MAX_DELTA);
                assert_eq!(frame.elapsed, MAX_DELTA);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_pause_does_not_jump_on_resume() {
        let mut pacer = FramePacer::new(ms(16));
        pacer.tick(ms(0), true);
        pacer.tick(ms(20), true);
        for t in (40..2000).step_by(20) {
            assert_eq!(pacer.tick(ms(t), false), FrameDecision::Paused);
        }
        match pacer.tick(ms(2000), true) {
            FrameDecision::Run(frame) => {
                assert_eq!(frame.delta, ms(20));
                assert_eq!(frame.elapsed, ms(40));
            }
            other => panic!("expected run, got {other:?}"),
        }
        assert_eq!(pacer.next_deadline(), Some(ms(2016)));
    }

    #[test]
    fn test_resume_restarts_delta() {
        let mut pacer = FramePacer::new(ms(16));
        pacer.tick(ms(0), true);
        pacer.tick(ms(50), true);
        pacer.resume();
        assert_eq!(pacer.next_deadline(), None);
        match pacer.tick(ms(10_000), true) {
            FrameDecision::Run(frame) => {
                assert_eq!(frame.delta, Duration::ZERO);
                assert_eq!(frame.elapsed, ms(50));
            }
            other => panic!("expected run, got {other:?}"),
        }
    }
}
