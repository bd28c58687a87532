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

//! # Keystone Control
//!
//! Owns module singletons and drives them: the [`ModuleRegistry`] stores
//! descriptors and instances, [`compute_order`] derives the scheduler order
//! from declared dependencies, and the [`PhaseDispatcher`] walks that order
//! phase by phase.

#![warn(missing_docs)]

pub mod dispatcher;
pub mod lifecycle;
pub mod registry;
pub mod scheduler;

pub use dispatcher::{DisposeReport, PhaseDispatcher};
pub use lifecycle::FrameworkState;
pub use registry::{ModuleRegistry, ModuleState};
pub use scheduler::compute_order;
