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

//! # Keystone Core
//!
//! Foundational crate containing the module model, the dependency graph
//! algorithms, capability slots and the error contracts shared by every
//! other Keystone crate.

#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod extension;
pub mod graph;
pub mod module;
pub mod telemetry;

pub use context::FrameInfo;
pub use error::{FrameworkError, Result};
pub use extension::{CapabilitySlot, Extension, ExtensionRegistry, Resolution};
pub use module::{
    Dependencies, Module, ModuleContext, ModuleDescriptor, ModuleFactory, ModuleId, ModuleLookup,
    Phase, PhaseSet,
};
pub use telemetry::Profiler;
