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

//! The context handed to module callbacks.
//!
//! A callback never reaches another module through a global. It gets a
//! [`Dependencies`] view that only resolves the identities its descriptor
//! declared, and only as shared references.

use super::{Module, ModuleId};
use crate::context::FrameInfo;
use crate::error::{FrameworkError, Result};
use crate::extension::{CapabilitySlot, Extension, ExtensionRegistry};

/// Resolves module instances by identity.
///
/// Implemented by the registry over the modules that precede the caller in
/// scheduler order.
pub trait ModuleLookup {
    /// Returns the live instance registered under `id`, if reachable.
    fn find(&self, id: ModuleId) -> Option<&dyn Module>;
}

struct NoModules;

impl ModuleLookup for NoModules {
    fn find(&self, _id: ModuleId) -> Option<&dyn Module> {
        None
    }
}

static NO_MODULES: NoModules = NoModules;

/// Read-only access to the dependencies a module declared.
#[derive(Clone, Copy)]
pub struct Dependencies<'a> {
    owner: ModuleId,
    declared: &'a [ModuleId],
    lookup: &'a dyn ModuleLookup,
}

impl<'a> Dependencies<'a> {
    /// Creates a view for `owner` restricted to `declared`.
    pub fn new(owner: ModuleId, declared: &'a [ModuleId], lookup: &'a dyn ModuleLookup) -> Self {
        Self {
            owner,
            declared,
            lookup,
        }
    }

    /// A view with no reachable modules.
    pub fn none(owner: ModuleId) -> Self {
        Self {
            owner,
            declared: &[],
            lookup: &NO_MODULES,
        }
    }

    /// The module this view belongs to.
    pub fn owner(&self) -> ModuleId {
        self.owner
    }

    /// The declared dependency identities.
    pub fn declared(&self) -> &'a [ModuleId] {
        self.declared
    }

    /// Resolves a declared dependency by identity.
    pub fn get_by_id(&self, id: ModuleId) -> Result<&'a dyn Module> {
        if !self.declared.contains(&id) {
            return Err(FrameworkError::UndeclaredDependency {
                module: self.owner,
                dependency: id,
            });
        }
        self.lookup.find(id).ok_or(FrameworkError::UnknownModule(id))
    }

    /// Resolves a declared dependency by type.
    pub fn get<M: Module>(&self) -> Result<&'a M> {
        let id = ModuleId::of::<M>();
        self.get_by_id(id)?
            .as_any()
            .downcast_ref::<M>()
            .ok_or(FrameworkError::UnknownModule(id))
    }
}

/// Everything a lifecycle callback may touch besides its own state.
pub struct ModuleContext<'a> {
    frame: FrameInfo,
    dependencies: Dependencies<'a>,
    extensions: &'a mut ExtensionRegistry,
}

impl<'a> ModuleContext<'a> {
    /// Creates a context for one callback invocation.
    pub fn new(
        frame: FrameInfo,
        dependencies: Dependencies<'a>,
        extensions: &'a mut ExtensionRegistry,
    ) -> Self {
        Self {
            frame,
            dependencies,
            extensions,
        }
    }

    /// The module being called.
    pub fn module_id(&self) -> ModuleId {
        self.dependencies.owner()
    }

    /// Timing of the frame being dispatched.
    pub fn frame(&self) -> FrameInfo {
        self.frame
    }

    /// Returns a declared dependency.
    ///
    /// Fails with [`FrameworkError::UndeclaredDependency`] if `M` is not in
    /// the caller's dependency set.
    pub fn dependency<M: Module>(&self) -> Result<&'a M> {
        self.dependencies.get::<M>()
    }

    /// The full dependency view.
    pub fn dependencies(&self) -> Dependencies<'a> {
        self.dependencies
    }

    /// The capability registry.
    pub fn extensions(&mut self) -> &mut ExtensionRegistry {
        &mut *self.extensions
    }

    /// Moves the slot for capability `E` out of the registry so this module
    /// can host it.
    pub fn claim_capability<E>(&mut self) -> Result<CapabilitySlot<E>>
    where
        E: ?Sized + Extension + 'static,
    {
        let slot = self.extensions.claim::<E>()?;
        log::debug!(
            "Module {} claimed capability {}",
            self.module_id(),
            slot.capability()
        );
        Ok(slot)
    }
}
