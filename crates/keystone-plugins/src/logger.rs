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

//! A module that counts frames and reports time, the root every other
//! sample module depends on.

use keystone_core::{Module, ModuleContext, ModuleDescriptor, PhaseSet, Profiler};
use std::any::Any;
use std::time::Duration;

/// Frame counter and timing reporter.
#[derive(Debug, Default)]
pub struct LoggerModule {
    frames: u64,
    elapsed: Duration,
    last_delta: Duration,
}

impl LoggerModule {
    /// Descriptor registering this module.
    pub fn descriptor() -> ModuleDescriptor {
        ModuleDescriptor::new::<Self>()
            .phases(PhaseSet::STANDARD | PhaseSet::PROFILE)
            .profile_tab("Logger")
    }

    /// Frames seen since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frame time accumulated since start.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Delta of the last frame.
    pub fn last_delta(&self) -> Duration {
        self.last_delta
    }
}

impl Module for LoggerModule {
    fn on_init(&mut self, _ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        log::info!("Logger ready");
        Ok(())
    }

    fn on_pre_update(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        let frame = ctx.frame();
        self.frames += 1;
        self.elapsed = frame.elapsed;
        self.last_delta = frame.delta;
        log::trace!("Frame {} ({:?})", frame.frame, frame.delta);
        Ok(())
    }

    fn on_profile(&self, profiler: &mut Profiler) {
        profiler.add("Frames", self.frames);
        profiler.add("Elapsed (s)", format!("{:.2}", self.elapsed.as_secs_f32()));
        profiler.add(
            "Last Delta (ms)",
            format!("{:.2}", self.last_delta.as_secs_f32() * 1000.0),
        );
    }

    fn on_dispose(&mut self) -> anyhow::Result<()> {
        log::info!("Logger closing after {} frames", self.frames);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
