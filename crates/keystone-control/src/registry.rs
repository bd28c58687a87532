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

//! The module registry: the sole owner of module singletons.

use crate::scheduler::compute_order;
use keystone_core::{
    Dependencies, FrameworkError, Module, ModuleDescriptor, ModuleId, ModuleLookup, Result,
};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle state of one module. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleState {
    /// Described but not yet initialized.
    Registered,
    /// Its init step has run.
    Initialized,
    /// Its dispose step has run and the instance is gone.
    Disposed,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleState::Registered => "registered",
            ModuleState::Initialized => "initialized",
            ModuleState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

pub(crate) struct ModuleEntry {
    pub(crate) descriptor: ModuleDescriptor,
    pub(crate) instance: Option<Box<dyn Module>>,
    pub(crate) state: ModuleState,
}

impl ModuleEntry {
    fn construct(&mut self) -> Result<&mut Box<dyn Module>> {
        let id = self.descriptor.id();
        if self.state == ModuleState::Disposed {
            return Err(FrameworkError::ModuleDisposed(id));
        }
        if self.instance.is_none() {
            let factory = self
                .descriptor
                .take_factory()
                .ok_or(FrameworkError::UnknownModule(id))?;
            log::debug!("ModuleRegistry: constructing {}", id);
            self.instance = Some(factory());
        }
        self.instance
            .as_mut()
            .ok_or(FrameworkError::UnknownModule(id))
    }
}

/// Lookup over the entries that precede a module in scheduler order.
struct Preceding<'a> {
    entries: &'a [ModuleEntry],
    index: &'a HashMap<ModuleId, usize>,
}

impl ModuleLookup for Preceding<'_> {
    fn find(&self, id: ModuleId) -> Option<&dyn Module> {
        let position = *self.index.get(&id)?;
        self.entries.get(position)?.instance.as_deref()
    }
}

/// Process-wide table of module descriptors and their singleton instances.
///
/// Descriptors are added with [`register`](Self::register) until the registry
/// is [sealed](Self::seal). Sealing computes the scheduler order and stores
/// the entries in that order, so dispatch is a plain walk over the table.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<ModuleEntry>,
    index: HashMap<ModuleId, usize>,
    sealed: bool,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor.
    ///
    /// Fails with [`FrameworkError::DuplicateModule`] if the identity is
    /// already registered, and with [`FrameworkError::InvalidState`] once
    /// the registry is sealed.
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> Result<()> {
        if self.sealed {
            return Err(FrameworkError::InvalidState {
                state: "running",
                operation: "register a module",
            });
        }
        let id = descriptor.id();
        if self.index.contains_key(&id) {
            return Err(FrameworkError::DuplicateModule(id));
        }

        log::info!(
            "ModuleRegistry: Registered {} (depends on [{}], phases={})",
            id,
            descriptor
                .dependencies()
                .iter()
                .map(ModuleId::name)
                .collect::<Vec<_>>()
                .join(", "),
            descriptor.phase_set()
        );
        self.index.insert(id, self.entries.len());
        self.entries.push(ModuleEntry {
            descriptor,
            instance: None,
            state: ModuleState::Registered,
        });
        Ok(())
    }

    /// Computes the scheduler order and freezes the table.
    ///
    /// Structural errors leave the registry unsealed and untouched.
    pub fn seal(&mut self) -> Result<Vec<ModuleId>> {
        if self.sealed {
            return Ok(self.order());
        }

        let order = compute_order(self.entries.iter().map(|entry| &entry.descriptor))?;

        let mut slots: Vec<Option<ModuleEntry>> = self.entries.drain(..).map(Some).collect();
        for id in &order {
            if let Some(entry) = self.index.get(id).and_then(|&pos| slots[pos].take()) {
                self.entries.push(entry);
            }
        }
        self.rebuild_index();
        self.sealed = true;
        Ok(order)
    }

    /// Returns `true` once [`seal`](Self::seal) succeeded.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Identities in table order, which is scheduler order once sealed.
    pub fn order(&self) -> Vec<ModuleId> {
        self.entries.iter().map(|entry| entry.descriptor.id()).collect()
    }

    /// Returns `true` if `id` was registered.
    pub fn contains(&self, id: ModuleId) -> bool {
        self.index.contains_key(&id)
    }

    /// The descriptor registered under `id`.
    pub fn descriptor(&self, id: ModuleId) -> Result<&ModuleDescriptor> {
        self.entry(id).map(|entry| &entry.descriptor)
    }

    /// The lifecycle state of `id`.
    pub fn state(&self, id: ModuleId) -> Result<ModuleState> {
        self.entry(id).map(|entry| entry.state)
    }

    /// Returns the singleton for `id`, constructing it on first access.
    ///
    /// Fails with [`FrameworkError::UnknownModule`] if `id` was never
    /// registered and with [`FrameworkError::ModuleDisposed`] after teardown.
    pub fn instance_of(&mut self, id: ModuleId) -> Result<&dyn Module> {
        let position = self.position(id)?;
        Ok(&**self.entries[position].construct()?)
    }

    /// Mutable access to the singleton for `id`, constructing it on first
    /// access.
    pub fn instance_of_mut(&mut self, id: ModuleId) -> Result<&mut dyn Module> {
        let position = self.position(id)?;
        Ok(&mut **self.entries[position].construct()?)
    }

    /// Typed access to the singleton of `M`.
    pub fn instance<M: Module>(&mut self) -> Result<&M> {
        let id = ModuleId::of::<M>();
        self.instance_of(id)?
            .as_any()
            .downcast_ref::<M>()
            .ok_or(FrameworkError::UnknownModule(id))
    }

    /// Typed mutable access to the singleton of `M`.
    pub fn instance_mut<M: Module>(&mut self) -> Result<&mut M> {
        let id = ModuleId::of::<M>();
        self.instance_of_mut(id)?
            .as_any_mut()
            .downcast_mut::<M>()
            .ok_or(FrameworkError::UnknownModule(id))
    }

    /// Returns the number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no module is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entry_at(&self, position: usize) -> &ModuleEntry {
        &self.entries[position]
    }

    pub(crate) fn set_state(&mut self, position: usize, state: ModuleState) {
        let entry = &mut self.entries[position];
        debug_assert!(state >= entry.state, "module state moved backwards");
        entry.state = state;
        if state == ModuleState::Disposed {
            entry.instance = None;
        }
    }

    /// Hands the module at `position` to `call` together with a view of its
    /// declared dependencies, constructing the instance if needed.
    ///
    /// Only entries before `position` are reachable through the view.
    pub(crate) fn with_module<R>(
        &mut self,
        position: usize,
        call: impl FnOnce(&mut dyn Module, Dependencies<'_>) -> R,
    ) -> Result<R> {
        let (preceding, rest) = self.entries.split_at_mut(position);
        let entry = rest
            .first_mut()
            .ok_or(FrameworkError::InvalidState {
                state: "sealed",
                operation: "dispatch past the module table",
            })?;
        entry.construct()?;

        let ModuleEntry {
            descriptor,
            instance,
            ..
        } = entry;
        let owner = descriptor.id();
        let module = instance
            .as_deref_mut()
            .ok_or(FrameworkError::UnknownModule(owner))?;
        let lookup = Preceding {
            entries: preceding,
            index: &self.index,
        };
        let dependencies = Dependencies::new(owner, descriptor.dependencies(), &lookup);
        Ok(call(module, dependencies))
    }

    fn position(&self, id: ModuleId) -> Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(FrameworkError::UnknownModule(id))
    }

    fn entry(&self, id: ModuleId) -> Result<&ModuleEntry> {
        self.position(id).map(|position| &self.entries[position])
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.descriptor.id(), position))
            .collect();
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("order", &self.order())
            .field("sealed", &self.sealed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Logger {
        lines: u32,
    }

    #[derive(Default)]
    struct Display;

    #[derive(Default)]
    struct Mouse;

    impl Module for Logger {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl Module for Display {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl Module for Mouse {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn sample_registry() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry
            .register(
                ModuleDescriptor::new::<Mouse>()
                    .depends_on::<Logger>()
                    .depends_on::<Display>(),
            )
            .unwrap();
        registry
            .register(ModuleDescriptor::new::<Display>().depends_on::<Logger>())
            .unwrap();
        registry.register(ModuleDescriptor::new::<Logger>()).unwrap();
        registry
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ModuleRegistry::new();
        registry.register(ModuleDescriptor::new::<Logger>()).unwrap();

        let result = registry.register(ModuleDescriptor::new::<Logger>());
        assert!(matches!(result, Err(FrameworkError::DuplicateModule(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_seal_stores_scheduler_order() {
        let mut registry = sample_registry();
        let order = registry.seal().unwrap();

        let names: Vec<_> = order.iter().map(ModuleId::name).collect();
        assert_eq!(names, vec!["Logger", "Display", "Mouse"]);
        assert_eq!(registry.order(), order);
        assert!(registry.is_sealed());
    }

    #[test]
    fn test_register_after_seal_fails() {
        let mut registry = ModuleRegistry::new();
        registry.seal().unwrap();

        assert!(matches!(
            registry.register(ModuleDescriptor::new::<Logger>()),
            Err(FrameworkError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_failed_seal_leaves_registry_open() {
        let mut registry = ModuleRegistry::new();
        registry
            .register(ModuleDescriptor::new::<Mouse>().depends_on::<Display>())
            .unwrap();

        assert!(matches!(
            registry.seal(),
            Err(FrameworkError::UnresolvedDependency { .. })
        ));
        assert!(!registry.is_sealed());
        registry.register(ModuleDescriptor::new::<Display>()).unwrap();
        assert!(registry.seal().is_ok());
    }

    #[test]
    fn test_instance_is_constructed_once_on_first_access() {
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        let mut registry = ModuleRegistry::new();
        registry
            .register(ModuleDescriptor::with_factory(move || {
                counter.set(counter.get() + 1);
                Logger { lines: 7 }
            }))
            .unwrap();
        assert_eq!(built.get(), 0, "construction must be lazy");

        assert_eq!(registry.instance::<Logger>().unwrap().lines, 7);
        registry.instance_mut::<Logger>().unwrap().lines += 1;
        assert_eq!(registry.instance::<Logger>().unwrap().lines, 8);
        assert_eq!(built.get(), 1);
    }

    #[test]
    fn test_unknown_module_lookup_fails() {
        let mut registry = ModuleRegistry::new();
        assert!(matches!(
            registry.instance::<Mouse>(),
            Err(FrameworkError::UnknownModule(id)) if id == ModuleId::of::<Mouse>()
        ));
        assert!(registry.state(ModuleId::of::<Mouse>()).is_err());
    }

    #[test]
    fn test_dependency_view_reaches_only_declared_predecessors() {
        let mut registry = sample_registry();
        registry.seal().unwrap();
        registry.instance_mut::<Logger>().unwrap().lines = 3;

        // Display (position 1) declared Logger only.
        let (lines, mouse) = registry
            .with_module(1, |_, dependencies| {
                (
                    dependencies.get::<Logger>().map(|logger| logger.lines),
                    dependencies.get::<Mouse>().err(),
                )
            })
            .unwrap();

        assert_eq!(lines.unwrap(), 3);
        assert!(matches!(
            mouse,
            Some(FrameworkError::UndeclaredDependency { .. })
        ));
    }

    #[test]
    fn test_disposed_instance_is_gone() {
        let mut registry = sample_registry();
        registry.seal().unwrap();
        registry.instance::<Logger>().unwrap();

        registry.set_state(0, ModuleState::Initialized);
        registry.set_state(0, ModuleState::Disposed);

        assert_eq!(
            registry.state(ModuleId::of::<Logger>()).unwrap(),
            ModuleState::Disposed
        );
        assert!(matches!(
            registry.instance::<Logger>(),
            Err(FrameworkError::ModuleDisposed(_))
        ));
    }
}
