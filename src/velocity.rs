//! Time-windowed velocity estimation.
use std::collections::VecDeque;
use std::time::Duration;

use crate::geometry::{Offset, Point};

/// Tracks recent samples and reports the average velocity over the most
/// recent `window`.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    window: Duration,
    samples: VecDeque<(Duration, Point)>,
}

impl VelocityTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            samples: VecDeque::new(),
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn add(&mut self, time: Duration, point: Point) {
        // Out-of-order timestamps restart tracking.
        if self.samples.back().is_some_and(|(t, _)| *t > time) {
            self.reset();
        }
        self.samples.push_back((time, point));
        while let Some((t, _)) = self.samples.front() {
            if time.saturating_sub(*t) > self.window && self.samples.len() > 2 {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Velocity in pixels per second, zero with fewer than two samples.
    pub fn velocity(&self) -> Offset {
        let (Some((t0, p0)), Some((t1, p1))) = (self.samples.front(), self.samples.back()) else {
            return Offset::ZERO;
        };
        let dt = t1.saturating_sub(*t0).as_secs_f64();
        if dt <= 0.0 {
            return Offset::ZERO;
        }
        (*p1 - *p0).scale(1.0 / dt)
    }

    pub fn speed(&self) -> f64 {
        self.velocity().length()
    }
}
