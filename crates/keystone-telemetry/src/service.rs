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

//! Gates the profile phase and reports what modules profiled.

use keystone_core::{FrameInfo, Profiler};
use std::time::Duration;

/// Decides on which frames the profile phase runs and logs its results.
///
/// Time is read from the [`FrameInfo`] being dispatched rather than the
/// wall clock, so a host driving deterministic deltas gets deterministic
/// profiling.
#[derive(Debug)]
pub struct TelemetryService {
    enabled: bool,
    interval: Duration,
    last_profile: Duration,
    reports: u64,
}

impl TelemetryService {
    /// Creates a service that profiles once every `interval` of frame time.
    pub fn new(interval: Duration) -> Self {
        Self {
            enabled: true,
            interval,
            last_profile: Duration::ZERO,
            reports: 0,
        }
    }

    /// Creates a service that never profiles.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Returns `true` if profiling is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The profiling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of summaries reported so far.
    pub fn reports(&self) -> u64 {
        self.reports
    }

    /// Should be called once per frame, after the update phases.
    /// Returns `true` if the profile phase is due on this frame.
    pub fn tick(&mut self, frame: FrameInfo) -> bool {
        if !self.enabled {
            return false;
        }
        if frame.elapsed.saturating_sub(self.last_profile) >= self.interval {
            log::trace!("Profile due at frame {}", frame.frame);
            self.last_profile = frame.elapsed;
            true
        } else {
            false
        }
    }

    /// Logs every tab of `profiler` at info level.
    pub fn log_summary(&mut self, frame: FrameInfo, profiler: &Profiler) {
        self.reports += 1;
        log::info!(
            "--- Profile Summary (frame {}, {:.2}s) ---",
            frame.frame,
            frame.elapsed.as_secs_f64()
        );
        if profiler.is_empty() {
            log::info!("  No module reported.");
            return;
        }
        for (name, tab) in profiler.tabs() {
            if tab.entries().is_empty() {
                continue;
            }
            log::info!("  [{}]", name);
            for entry in tab.entries() {
                log::info!("    {}: {}", entry.title, entry.value);
            }
        }
    }
}

impl Default for TelemetryService {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
