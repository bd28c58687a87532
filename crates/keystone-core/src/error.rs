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

//! Defines the error hierarchy of the module framework.
//!
//! Structural errors ([`DuplicateModule`](FrameworkError::DuplicateModule),
//! [`CyclicDependency`](FrameworkError::CyclicDependency) and
//! [`UnresolvedDependency`](FrameworkError::UnresolvedDependency)) are raised
//! before the first frame. Everything else is raised while the framework runs.

use crate::module::{ModuleId, Phase};
use thiserror::Error;

/// The boxed error carried by callback failures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A specialized `Result` for framework operations.
pub type Result<T, E = FrameworkError> = std::result::Result<T, E>;

/// Every failure the framework itself can report.
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// Two descriptors were registered under the same identity.
    #[error("module `{0}` is already registered")]
    DuplicateModule(ModuleId),

    /// The dependency graph contains a cycle. Members are listed in the
    /// order they were walked.
    #[error("cyclic dependency between modules: {}", format_cycle(.0))]
    CyclicDependency(Vec<ModuleId>),

    /// A descriptor depends on an identity that was never registered.
    #[error("module `{module}` depends on `{dependency}`, which is not registered")]
    UnresolvedDependency {
        /// The module declaring the dependency.
        module: ModuleId,
        /// The missing dependency.
        dependency: ModuleId,
    },

    /// A lookup named an identity that was never registered.
    #[error("module `{0}` is not registered")]
    UnknownModule(ModuleId),

    /// A module asked for another module it did not declare as a dependency.
    #[error("module `{module}` did not declare `{dependency}` as a dependency")]
    UndeclaredDependency {
        /// The module performing the lookup.
        module: ModuleId,
        /// The module it tried to reach.
        dependency: ModuleId,
    },

    /// The module instance was already torn down.
    #[error("module `{0}` has already been disposed")]
    ModuleDisposed(ModuleId),

    /// A capability slot was consulted while no candidate is active.
    #[error("capability `{0}` has no active implementation")]
    NoActiveImplementation(&'static str),

    /// A capability was declared twice.
    #[error("capability `{0}` is already declared")]
    DuplicateCapability(&'static str),

    /// A capability was used without being declared, or claimed twice.
    #[error("capability `{0}` is not declared or has already been claimed")]
    UnknownCapability(&'static str),

    /// A candidate failed to initialize while being swapped in.
    #[error("extension `{candidate}` for capability `{capability}` failed to initialize")]
    ExtensionInit {
        /// The capability being resolved.
        capability: &'static str,
        /// The candidate that failed.
        candidate: String,
        /// The underlying failure.
        #[source]
        source: BoxedError,
    },

    /// A lifecycle callback returned an error.
    #[error("module `{module}` failed during {phase}")]
    Callback {
        /// The module whose callback failed.
        module: ModuleId,
        /// The phase being dispatched.
        phase: Phase,
        /// The underlying failure.
        #[source]
        source: BoxedError,
    },

    /// An operation was attempted in a lifecycle state that does not allow it.
    #[error("cannot {operation} while the framework is {state}")]
    InvalidState {
        /// Name of the current lifecycle state.
        state: &'static str,
        /// The rejected operation.
        operation: &'static str,
    },
}

impl FrameworkError {
    /// Wraps a callback failure with the module and phase it came from.
    pub fn callback(module: ModuleId, phase: Phase, source: anyhow::Error) -> Self {
        FrameworkError::Callback {
            module,
            phase,
            source: source.into(),
        }
    }

    /// Returns `true` for the errors that can only be raised at startup.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            FrameworkError::DuplicateModule(_)
                | FrameworkError::CyclicDependency(_)
                | FrameworkError::UnresolvedDependency { .. }
        )
    }

    /// The module and phase attached to a callback failure, if any.
    pub fn callback_origin(&self) -> Option<(ModuleId, Phase)> {
        match self {
            FrameworkError::Callback { module, phase, .. } => Some((*module, *phase)),
            _ => None,
        }
    }
}

fn format_cycle(members: &[ModuleId]) -> String {
    let mut names: Vec<&str> = members.iter().map(|id| id.name()).collect();
    if let Some(first) = members.first() {
        names.push(first.name());
    }
    names.join(" -> ")
}
