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

//! Static metadata describing one module.

use super::{Module, ModuleId, Phase, PhaseSet};
use std::fmt;

/// Deferred constructor for a module singleton.
///
/// The registry calls it at most once, the first time the instance is needed.
pub type ModuleFactory = Box<dyn FnOnce() -> Box<dyn Module>>;

/// Declares a module: its identity, what it depends on, which phases it
/// takes part in, and how to build its singleton.
///
/// # Example
///
/// ```rust
/// use keystone_core::{Module, ModuleDescriptor, PhaseSet};
/// use std::any::Any;
///
/// #[derive(Default)]
/// struct Logger;
///
/// impl Module for Logger {
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
///
/// #[derive(Default)]
/// struct Display;
///
/// impl Module for Display {
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
/// }
///
/// let descriptor = ModuleDescriptor::new::<Display>()
///     .depends_on::<Logger>()
///     .phases(PhaseSet::STANDARD | PhaseSet::PROFILE);
///
/// assert_eq!(descriptor.id().name(), "Display");
/// assert_eq!(descriptor.dependencies().len(), 1);
/// ```
pub struct ModuleDescriptor {
    id: ModuleId,
    dependencies: Vec<ModuleId>,
    phases: PhaseSet,
    profile_tab: Option<&'static str>,
    factory: Option<ModuleFactory>,
}

impl ModuleDescriptor {
    /// Describes a module built with `M::default()`.
    pub fn new<M: Module + Default>() -> Self {
        Self::with_factory(M::default)
    }

    /// Describes a module built by `factory`.
    pub fn with_factory<M: Module>(factory: impl FnOnce() -> M + 'static) -> Self {
        Self {
            id: ModuleId::of::<M>(),
            dependencies: Vec::new(),
            phases: PhaseSet::default(),
            profile_tab: None,
            factory: Some(Box::new(move || Box::new(factory()) as Box<dyn Module>)),
        }
    }

    /// Declares that this module depends on `D`.
    #[must_use]
    pub fn depends_on<D: Module>(self) -> Self {
        self.depends_on_id(ModuleId::of::<D>())
    }

    /// Declares a dependency by identity. Repeated identities are ignored.
    #[must_use]
    pub fn depends_on_id(mut self, dependency: ModuleId) -> Self {
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
        self
    }

    /// Sets the phases this module participates in.
    #[must_use]
    pub fn phases(mut self, phases: PhaseSet) -> Self {
        self.phases = phases;
        self
    }

    /// Names the profiler tab this module reports into.
    #[must_use]
    pub fn profile_tab(mut self, tab: &'static str) -> Self {
        self.profile_tab = Some(tab);
        self
    }

    /// The module identity.
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Declared dependencies, in declaration order.
    pub fn dependencies(&self) -> &[ModuleId] {
        &self.dependencies
    }

    /// Returns `true` if `dependency` was declared.
    pub fn depends_on_module(&self, dependency: ModuleId) -> bool {
        self.dependencies.contains(&dependency)
    }

    /// The declared phase set.
    pub fn phase_set(&self) -> PhaseSet {
        self.phases
    }

    /// Returns `true` if the module participates in `phase`.
    pub fn participates_in(&self, phase: Phase) -> bool {
        self.phases.contains(phase)
    }

    /// The profiler tab name, defaulting to the module name.
    pub fn tab_name(&self) -> &'static str {
        self.profile_tab.unwrap_or(self.id.name())
    }

    /// Takes the factory out of the descriptor. Returns `None` once taken.
    pub fn take_factory(&mut self) -> Option<ModuleFactory> {
        self.factory.take()
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .field("phases", &self.phases)
            .field("profile_tab", &self.profile_tab)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Default)]
    struct Logger;

    impl Module for Logger {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Display {
        width: u32,
    }

    impl Module for Display {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_duplicate_dependencies_collapse() {
        let descriptor = ModuleDescriptor::new::<Logger>()
            .depends_on_id(ModuleId::of::<Display>())
            .depends_on_id(ModuleId::of::<Display>());
        assert_eq!(descriptor.dependencies(), &[ModuleId::of::<Display>()]);
    }

    #[test]
    fn test_factory_is_taken_once() {
        let mut descriptor = ModuleDescriptor::with_factory(|| Display { width: 1280 });
        let factory = descriptor.take_factory().expect("factory should be present");
        let module = factory();
        let display = module.as_any().downcast_ref::<Display>().unwrap();
        assert_eq!(display.width, 1280);
        assert!(descriptor.take_factory().is_none());
    }

    #[test]
    fn test_tab_name_defaults_to_module_name() {
        let plain = ModuleDescriptor::new::<Logger>();
        assert_eq!(plain.tab_name(), "Logger");
        assert_eq!(plain.phase_set(), PhaseSet::STANDARD);

        let named = ModuleDescriptor::new::<Logger>().profile_tab("Logs");
        assert_eq!(named.tab_name(), "Logs");
    }
}
