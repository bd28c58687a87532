// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Frame timing.

use keystone_core::FrameInfo;
use std::time::{Duration, Instant};

/// Measures the time between frames and produces the [`FrameInfo`] handed
/// to module callbacks.
///
/// Measured deltas are clamped to `max_delta` so a stall (a breakpoint, a
/// slow disk) does not feed one enormous step into the modules.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last_tick: Option<Instant>,
    max_delta: Duration,
    current: FrameInfo,
}

impl FrameTimer {
    /// Creates a timer that clamps deltas to `max_delta`.
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last_tick: None,
            max_delta,
            current: FrameInfo::STARTUP,
        }
    }

    /// Resets the clock; the next [`tick`](Self::tick) measures from now.
    pub fn start(&mut self) {
        self.last_tick = Some(Instant::now());
        self.current = FrameInfo::STARTUP;
    }

    /// Measures the wall-clock time since the previous tick and advances
    /// to the next frame.
    pub fn tick(&mut self) -> FrameInfo {
        let now = Instant::now();
        let measured = self
            .last_tick
            .map(|last| now.duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);
        self.advance(measured)
    }

    /// Advances to the next frame by an explicit `delta`, still clamped.
    pub fn advance(&mut self, delta: Duration) -> FrameInfo {
        let delta = self.clamp(delta);
        self.current = self.current.next(delta);
        self.current
    }

    /// The most recently produced frame.
    pub fn current(&self) -> FrameInfo {
        self.current
    }

    /// The clamp applied to every delta.
    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }

    fn clamp(&self, delta: Duration) -> Duration {
        if delta > self.max_delta {
            log::debug!(
                "Frame delta {:?} clamped to {:?}",
                delta,
                self.max_delta
            );
            self.max_delta
        } else {
            delta
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_frames_and_time() {
        let mut timer = FrameTimer::default();
        timer.advance(Duration::from_millis(16));
        let frame = timer.advance(Duration::from_millis(20));

        assert_eq!(frame.frame, 2);
        assert_eq!(frame.elapsed, Duration::from_millis(36));
        assert_eq!(timer.current(), frame);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut timer = FrameTimer::new(Duration::from_millis(100));
        let frame = timer.advance(Duration::from_secs(5));

        assert_eq!(frame.delta, Duration::from_millis(100));
        assert_eq!(frame.elapsed, Duration::from_millis(100));
    }

    #[test]
    fn test_tick_measures_wall_clock() {
        let mut timer = FrameTimer::new(Duration::from_secs(10));
        timer.start();
        std::thread::sleep(Duration::from_millis(5));
        let frame = timer.tick();

        assert_eq!(frame.frame, 1);
        assert!(frame.delta >= Duration::from_millis(5));
    }
}
