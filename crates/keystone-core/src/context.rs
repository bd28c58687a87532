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

//! Per-frame timing information handed to module callbacks.

use std::time::Duration;

/// Timing snapshot for the frame currently being dispatched.
///
/// The init pass runs with frame `0` and a zero delta; the first update
/// frame is frame `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// Monotonic frame counter.
    pub frame: u64,
    /// Time elapsed since the previous frame.
    pub delta: Duration,
    /// Total time accumulated since the framework started.
    pub elapsed: Duration,
}

impl FrameInfo {
    /// The snapshot used while running the init pass.
    pub const STARTUP: Self = Self {
        frame: 0,
        delta: Duration::ZERO,
        elapsed: Duration::ZERO,
    };

    /// Returns the snapshot for the frame following `self`.
    #[must_use]
    pub fn next(&self, delta: Duration) -> Self {
        Self {
            frame: self.frame + 1,
            delta,
            elapsed: self.elapsed + delta,
        }
    }

    /// Delta time in seconds, the unit most module logic works in.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
