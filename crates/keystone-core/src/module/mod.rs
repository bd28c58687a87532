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

//! # Module Abstraction
//!
//! A **Module** is a singleton subsystem (devices, platform, networking,
//! rendering...) driven by the framework through a fixed set of lifecycle
//! phases. Each module is described by a [`ModuleDescriptor`] that names its
//! dependencies and the phases it takes part in; the framework owns the one
//! instance built from that descriptor.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keystone_core::{Module, ModuleContext, ModuleDescriptor, PhaseSet, Profiler};
//!
//! #[derive(Default)]
//! struct Mouse { x: f32 }
//!
//! impl Module for Mouse {
//!     fn on_pre_update(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
//!         let display = ctx.dependency::<Display>()?;
//!         self.x = self.x.min(display.width() as f32);
//!         Ok(())
//!     }
//!
//!     fn on_profile(&self, profiler: &mut Profiler) {
//!         profiler.add("X", self.x);
//!     }
//!
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
//! }
//!
//! let descriptor = ModuleDescriptor::new::<Mouse>()
//!     .depends_on::<Display>()
//!     .phases(PhaseSet::STANDARD | PhaseSet::PROFILE);
//! ```

mod context;
mod descriptor;
mod id;
mod phase;

pub use context::{Dependencies, ModuleContext, ModuleLookup};
pub use descriptor::{ModuleDescriptor, ModuleFactory};
pub use id::ModuleId;
pub use phase::{Phase, PhaseSet};

use crate::telemetry::Profiler;
use std::any::Any;

/// The interface every framework-managed subsystem implements.
///
/// All callbacks have no-op defaults; the descriptor's [`PhaseSet`] decides
/// which of them the dispatcher actually calls.
pub trait Module: Any {
    /// Called exactly once, after every dependency has been initialized.
    fn on_init(&mut self, _ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called every frame, in scheduler order.
    fn on_pre_update(&mut self, _ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called every frame after every module's pre-update.
    fn on_post_update(&mut self, _ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Reports diagnostics into the module's profiler tab.
    fn on_profile(&self, _profiler: &mut Profiler) {}

    /// Releases resources at teardown, in reverse scheduler order.
    fn on_dispose(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Allows downcasting to the concrete module type.
    fn as_any(&self) -> &dyn Any;

    /// Allows mutable downcasting to the concrete module type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
