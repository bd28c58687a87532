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

//! # Keystone SDK
//!
//! The public-facing API: build a [`Framework`], register modules and
//! capability candidates, start it and tick it once per frame.
//!
//! ```rust
//! use keystone_sdk::prelude::*;
//! use std::any::Any;
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct Counter {
//!     frames: u64,
//! }
//!
//! impl Module for Counter {
//!     fn on_pre_update(&mut self, _ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
//!         self.frames += 1;
//!         Ok(())
//!     }
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//! }
//!
//! let mut framework = Framework::new(FrameworkConfig::default());
//! framework.register(ModuleDescriptor::new::<Counter>()).unwrap();
//! framework.start().unwrap();
//! framework.run_frames(3, Duration::from_millis(16)).unwrap();
//! assert_eq!(framework.instance::<Counter>().unwrap().frames, 3);
//! framework.shutdown().unwrap();
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod framework;

pub use config::{ConfigError, FailurePolicy, FrameworkConfig, ProfilingConfig};
pub use framework::Framework;
pub use keystone_control::{DisposeReport, FrameworkState, ModuleState};
pub use keystone_core::{FrameworkError, Result};

/// Everything a module or host typically needs.
pub mod prelude {
    pub use crate::config::{FailurePolicy, FrameworkConfig};
    pub use crate::framework::Framework;
    pub use keystone_control::{DisposeReport, FrameworkState, ModuleState};
    pub use keystone_core::{
        CapabilitySlot, Extension, FrameInfo, FrameworkError, Module, ModuleContext,
        ModuleDescriptor, ModuleId, Phase, PhaseSet, Profiler, Resolution,
    };
}
