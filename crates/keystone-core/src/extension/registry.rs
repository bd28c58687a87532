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

//! A type-keyed registry of capability slots.
//!
//! Slots are stored as `Box<dyn Any>` keyed by the [`TypeId`] of
//! `CapabilitySlot<E>` and retrieved by their capability type. Candidates are
//! registered explicitly; nothing is discovered by scanning.

use super::{capability_name, CapabilitySlot, Extension};
use crate::error::{FrameworkError, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;

enum SlotState {
    Declared(Box<dyn Any>),
    Claimed,
}

struct SlotEntry {
    name: &'static str,
    state: SlotState,
}

/// Collects capability slots and their candidates until hosting modules
/// claim them.
///
/// # Example
///
/// ```rust
/// use keystone_core::{Extension, ExtensionRegistry};
///
/// trait Backend: Extension {}
///
/// struct Headless;
/// impl Extension for Headless {
///     fn name(&self) -> &str { "headless" }
///     fn matches(&self, _active: Option<&str>) -> bool { true }
/// }
/// impl Backend for Headless {}
///
/// let mut registry = ExtensionRegistry::new();
/// registry.declare::<dyn Backend>().unwrap();
/// registry.provide::<dyn Backend>(Box::new(Headless)).unwrap();
///
/// let slot = registry.claim::<dyn Backend>().unwrap();
/// assert_eq!(slot.len(), 1);
/// assert!(registry.claim::<dyn Backend>().is_err());
/// ```
#[derive(Default)]
pub struct ExtensionRegistry {
    slots: HashMap<TypeId, SlotEntry>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Declares the slot for capability `E`.
    ///
    /// Each capability can be declared once.
    pub fn declare<E>(&mut self) -> Result<()>
    where
        E: ?Sized + Extension + 'static,
    {
        let name = capability_name::<E>();
        let key = TypeId::of::<CapabilitySlot<E>>();
        if self.slots.contains_key(&key) {
            return Err(FrameworkError::DuplicateCapability(name));
        }
        self.slots.insert(
            key,
            SlotEntry {
                name,
                state: SlotState::Declared(Box::new(CapabilitySlot::<E>::new())),
            },
        );
        log::info!("ExtensionRegistry: declared capability {}", name);
        Ok(())
    }

    /// Adds a candidate to the declared, unclaimed slot for `E`.
    pub fn provide<E>(&mut self, candidate: Box<E>) -> Result<()>
    where
        E: ?Sized + Extension + 'static,
    {
        let slot = self
            .slots
            .get_mut(&TypeId::of::<CapabilitySlot<E>>())
            .and_then(|entry| match &mut entry.state {
                SlotState::Declared(slot) => slot.downcast_mut::<CapabilitySlot<E>>(),
                SlotState::Claimed => None,
            })
            .ok_or(FrameworkError::UnknownCapability(capability_name::<E>()))?;
        slot.register(candidate);
        Ok(())
    }

    /// Moves the slot for `E` out of the registry.
    ///
    /// A slot can be claimed once; the claiming module becomes its only owner.
    pub fn claim<E>(&mut self) -> Result<CapabilitySlot<E>>
    where
        E: ?Sized + Extension + 'static,
    {
        let name = capability_name::<E>();
        let entry = self
            .slots
            .get_mut(&TypeId::of::<CapabilitySlot<E>>())
            .ok_or(FrameworkError::UnknownCapability(name))?;

        match std::mem::replace(&mut entry.state, SlotState::Claimed) {
            SlotState::Declared(slot) => slot
                .downcast::<CapabilitySlot<E>>()
                .map(|slot| *slot)
                .map_err(|_| FrameworkError::UnknownCapability(name)),
            SlotState::Claimed => Err(FrameworkError::UnknownCapability(name)),
        }
    }

    /// Returns `true` if capability `E` was declared.
    #[must_use]
    pub fn is_declared<E>(&self) -> bool
    where
        E: ?Sized + Extension + 'static,
    {
        self.slots.contains_key(&TypeId::of::<CapabilitySlot<E>>())
    }

    /// Returns `true` if the slot for `E` has been claimed by a module.
    #[must_use]
    pub fn is_claimed<E>(&self) -> bool
    where
        E: ?Sized + Extension + 'static,
    {
        matches!(
            self.slots.get(&TypeId::of::<CapabilitySlot<E>>()),
            Some(SlotEntry {
                state: SlotState::Claimed,
                ..
            })
        )
    }

    /// Names of declared capabilities that no module has claimed.
    pub fn unclaimed(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .slots
            .values()
            .filter(|entry| matches!(entry.state, SlotState::Declared(_)))
            .map(|entry| entry.name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of declared capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no capability is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Platform: Extension {}
    trait Joystick: Extension {}

    struct Fake(&'static str);

    impl Extension for Fake {
        fn name(&self) -> &str {
            self.0
        }
        fn matches(&self, _active: Option<&str>) -> bool {
            true
        }
    }

    impl Platform for Fake {}

    #[test]
    fn test_declare_twice_fails() {
        let mut registry = ExtensionRegistry::new();
        registry.declare::<dyn Platform>().unwrap();
        assert!(matches!(
            registry.declare::<dyn Platform>(),
            Err(FrameworkError::DuplicateCapability("Platform"))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_provide_requires_declaration() {
        let mut registry = ExtensionRegistry::new();
        assert!(matches!(
            registry.provide::<dyn Platform>(Box::new(Fake("desktop"))),
            Err(FrameworkError::UnknownCapability("Platform"))
        ));
    }

    #[test]
    fn test_claim_moves_candidates_in_order() {
        let mut registry = ExtensionRegistry::new();
        registry.declare::<dyn Platform>().unwrap();
        registry.declare::<dyn Joystick>().unwrap();
        registry
            .provide::<dyn Platform>(Box::new(Fake("desktop")))
            .unwrap();
        registry
            .provide::<dyn Platform>(Box::new(Fake("headless")))
            .unwrap();

        let slot = registry.claim::<dyn Platform>().unwrap();
        assert_eq!(
            slot.candidate_names().collect::<Vec<_>>(),
            vec!["desktop", "headless"]
        );
        assert!(registry.is_claimed::<dyn Platform>());
        assert_eq!(registry.unclaimed(), vec!["Joystick"]);

        // Claimed slots no longer accept candidates.
        assert!(registry
            .provide::<dyn Platform>(Box::new(Fake("late")))
            .is_err());
    }

    #[test]
    fn test_default_is_empty() {
        let registry = ExtensionRegistry::default();
        assert!(registry.is_empty());
        assert!(!registry.is_declared::<dyn Platform>());
    }
}
