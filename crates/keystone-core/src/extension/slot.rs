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

//! Capability slots and the per-frame extension matcher.

use super::{capability_name, Extension};
use crate::error::{FrameworkError, Result};
use std::fmt;

struct Candidate<E: ?Sized> {
    extension: Box<E>,
    initialized: bool,
    /// Match result of the current evaluation.
    matched_now: bool,
    /// Match result of the previous evaluation.
    matched_before: bool,
}

/// Outcome of one [`CapabilitySlot::resolve`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The active implementation did not change.
    Unchanged,
    /// A new candidate was swapped in.
    Swapped {
        /// The candidate that stopped being active, if any.
        previous: Option<String>,
        /// The candidate that is now active.
        current: String,
    },
}

/// One swappable role and its candidate implementations.
///
/// The slot exclusively owns every candidate. At most one of them is active
/// at any time, and swapping happens inside [`resolve`](Self::resolve), so a
/// consumer holding `&CapabilitySlot` always sees a single, stable active
/// implementation.
pub struct CapabilitySlot<E: ?Sized> {
    capability: &'static str,
    candidates: Vec<Candidate<E>>,
    active: Option<usize>,
}

impl<E: ?Sized + Extension> CapabilitySlot<E> {
    /// Creates an empty slot for capability `E`.
    pub fn new() -> Self {
        Self {
            capability: capability_name::<E>(),
            candidates: Vec::new(),
            active: None,
        }
    }

    /// The capability name used in logs and errors.
    pub fn capability(&self) -> &'static str {
        self.capability
    }

    /// Adds a candidate. Declaration order is the tie-break order.
    pub fn register(&mut self, candidate: Box<E>) {
        log::debug!(
            "Capability {}: registered candidate '{}'",
            self.capability,
            candidate.name()
        );
        self.candidates.push(Candidate {
            extension: candidate,
            initialized: false,
            matched_now: false,
            matched_before: false,
        });
    }

    /// Number of known candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns `true` if no candidate is known.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Names of the candidates, in declaration order.
    pub fn candidate_names(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.extension.name())
    }

    /// Re-evaluates every candidate and swaps in a new one if warranted.
    ///
    /// A candidate other than the active one is picked when it matches and
    /// either it did not match on the previous evaluation, or the active
    /// implementation no longer matches (or there is none). Among several
    /// such candidates the first declared wins. The previous active
    /// implementation is only deactivated, never disposed.
    ///
    /// If the chosen candidate fails to initialize, the slot is left as it
    /// was and [`FrameworkError::ExtensionInit`] is returned.
    pub fn resolve(&mut self) -> Result<Resolution> {
        for index in 0..self.candidates.len() {
            let matched = {
                let active_name = self
                    .active
                    .map(|active| self.candidates[active].extension.name());
                self.candidates[index].extension.matches(active_name)
            };
            self.candidates[index].matched_now = matched;
        }

        let active_holds = self
            .active
            .is_some_and(|active| self.candidates[active].matched_now);
        let chosen = self.candidates.iter().enumerate().position(|(index, c)| {
            Some(index) != self.active && c.matched_now && (!c.matched_before || !active_holds)
        });

        for candidate in &mut self.candidates {
            candidate.matched_before = candidate.matched_now;
        }

        let Some(next) = chosen else {
            return Ok(Resolution::Unchanged);
        };

        if !self.candidates[next].initialized {
            let candidate = &mut self.candidates[next];
            if let Err(source) = candidate.extension.initialize() {
                // Retry on the next evaluation.
                candidate.matched_before = false;
                log::error!(
                    "Capability {}: candidate '{}' failed to initialize: {}",
                    self.capability,
                    candidate.extension.name(),
                    source
                );
                return Err(FrameworkError::ExtensionInit {
                    capability: self.capability,
                    candidate: candidate.extension.name().to_owned(),
                    source: source.into(),
                });
            }
            candidate.initialized = true;
        }

        let previous = self.active.map(|previous| {
            let candidate = &mut self.candidates[previous];
            candidate.extension.set_active(false);
            candidate.extension.name().to_owned()
        });

        let current = &mut self.candidates[next];
        current.extension.set_active(true);
        let current = current.extension.name().to_owned();
        self.active = Some(next);

        log::info!(
            "Capability {}: switched to '{}' (was {})",
            self.capability,
            current,
            previous.as_deref().unwrap_or("none")
        );

        Ok(Resolution::Swapped { previous, current })
    }

    /// The active implementation.
    ///
    /// Fails with [`FrameworkError::NoActiveImplementation`] if no candidate
    /// has matched yet.
    pub fn active(&self) -> Result<&E> {
        self.active
            .map(|index| self.candidates[index].extension.as_ref())
            .ok_or(FrameworkError::NoActiveImplementation(self.capability))
    }

    /// Mutable access to the active implementation.
    pub fn active_mut(&mut self) -> Result<&mut E> {
        match self.active {
            Some(index) => Ok(self.candidates[index].extension.as_mut()),
            None => Err(FrameworkError::NoActiveImplementation(self.capability)),
        }
    }

    /// Name of the active implementation, if any.
    pub fn active_name(&self) -> Option<&str> {
        self.active
            .map(|index| self.candidates[index].extension.name())
    }

    /// Returns `true` if the candidate called `name` is the active one.
    pub fn is_active(&self, name: &str) -> bool {
        self.active_name() == Some(name)
    }

    /// Returns `true` if the candidate called `name` was ever initialized.
    pub fn is_initialized(&self, name: &str) -> bool {
        self.candidates
            .iter()
            .any(|c| c.initialized && c.extension.name() == name)
    }

    /// Looks up a candidate by name, active or not.
    pub fn candidate(&self, name: &str) -> Option<&E> {
        self.candidates
            .iter()
            .find(|c| c.extension.name() == name)
            .map(|c| c.extension.as_ref())
    }
}

impl<E: ?Sized + Extension> Default for CapabilitySlot<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized + Extension> fmt::Debug for CapabilitySlot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySlot")
            .field("capability", &self.capability)
            .field("candidates", &self.candidate_names().collect::<Vec<_>>())
            .field("active", &self.active_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    trait Backend: Extension {
        fn init_count(&self) -> u32;
        fn is_flagged_active(&self) -> bool;
    }

    struct Switchable {
        name: &'static str,
        available: Rc<Cell<bool>>,
        fail_init: bool,
        inits: u32,
        active: bool,
    }

    impl Switchable {
        fn boxed(name: &'static str, available: &Rc<Cell<bool>>) -> Box<dyn Backend> {
            Box::new(Self {
                name,
                available: Rc::clone(available),
                fail_init: false,
                inits: 0,
                active: false,
            })
        }
    }

    impl Extension for Switchable {
        fn name(&self) -> &str {
            self.name
        }
        fn matches(&self, _active: Option<&str>) -> bool {
            self.available.get()
        }
        fn initialize(&mut self) -> anyhow::Result<()> {
            if self.fail_init {
                anyhow::bail!("no device");
            }
            self.inits += 1;
            Ok(())
        }
        fn set_active(&mut self, active: bool) {
            self.active = active;
        }
    }

    impl Backend for Switchable {
        fn init_count(&self) -> u32 {
            self.inits
        }
        fn is_flagged_active(&self) -> bool {
            self.active
        }
    }

    fn flag(value: bool) -> Rc<Cell<bool>> {
        Rc::new(Cell::new(value))
    }

    #[test]
    fn test_empty_slot_has_no_active_implementation() {
        let mut slot: CapabilitySlot<dyn Backend> = CapabilitySlot::new();
        assert_eq!(slot.resolve().unwrap(), Resolution::Unchanged);
        assert!(matches!(
            slot.active(),
            Err(FrameworkError::NoActiveImplementation("Backend"))
        ));
    }

    #[test]
    fn test_single_match_is_stable() {
        let a_on = flag(true);
        let b_on = flag(false);
        let mut slot: CapabilitySlot<dyn Backend> = CapabilitySlot::new();
        slot.register(Switchable::boxed("a", &a_on));
        slot.register(Switchable::boxed("b", &b_on));

        assert_eq!(
            slot.resolve().unwrap(),
            Resolution::Swapped {
                previous: None,
                current: "a".into()
            }
        );
        for _ in 0..10 {
            assert_eq!(slot.resolve().unwrap(), Resolution::Unchanged);
        }
        assert_eq!(slot.active_name(), Some("a"));
        assert_eq!(slot.active().unwrap().init_count(), 1);
    }

    #[test]
    fn test_new_match_swaps_without_disposing_previous() {
        let a_on = flag(true);
        let b_on = flag(false);
        let mut slot: CapabilitySlot<dyn Backend> = CapabilitySlot::new();
        slot.register(Switchable::boxed("a", &a_on));
        slot.register(Switchable::boxed("b", &b_on));
        slot.resolve().unwrap();

        b_on.set(true);
        assert_eq!(
            slot.resolve().unwrap(),
            Resolution::Swapped {
                previous: Some("a".into()),
                current: "b".into()
            }
        );
        assert!(slot.is_active("b"));
        assert!(slot.is_initialized("a"), "a keeps its initialized state");
        assert!(!slot.candidate("a").unwrap().is_flagged_active());
        assert!(slot.candidate("b").unwrap().is_flagged_active());

        // Both still match: no flapping back to `a`.
        for _ in 0..5 {
            assert_eq!(slot.resolve().unwrap(), Resolution::Unchanged);
        }
        assert!(slot.is_active("b"));
    }

    #[test]
    fn test_swap_back_does_not_reinitialize() {
        let a_on = flag(true);
        let b_on = flag(false);
        let mut slot: CapabilitySlot<dyn Backend> = CapabilitySlot::new();
        slot.register(Switchable::boxed("a", &a_on));
        slot.register(Switchable::boxed("b", &b_on));
        slot.resolve().unwrap();

        b_on.set(true);
        slot.resolve().unwrap();
        b_on.set(false);
        assert_eq!(
            slot.resolve().unwrap(),
            Resolution::Swapped {
                previous: Some("b".into()),
                current: "a".into()
            }
        );
        assert_eq!(slot.candidate("a").unwrap().init_count(), 1);
        assert_eq!(slot.candidate("b").unwrap().init_count(), 1);
    }

    #[test]
    fn test_active_kept_when_nothing_matches() {
        let a_on = flag(true);
        let mut slot: CapabilitySlot<dyn Backend> = CapabilitySlot::new();
        slot.register(Switchable::boxed("a", &a_on));
        slot.resolve().unwrap();

        a_on.set(false);
        assert_eq!(slot.resolve().unwrap(), Resolution::Unchanged);
        assert_eq!(slot.active_name(), Some("a"));
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        let both = flag(true);
        let mut slot: CapabilitySlot<dyn Backend> = CapabilitySlot::new();
        slot.register(Switchable::boxed("first", &both));
        slot.register(Switchable::boxed("second", &both));

        slot.resolve().unwrap();
        assert_eq!(slot.active_name(), Some("first"));
        assert_eq!(slot.resolve().unwrap(), Resolution::Unchanged);
    }

    #[test]
    fn test_failed_initialization_keeps_previous_active() {
        let a_on = flag(true);
        let b_on = flag(false);
        let mut slot: CapabilitySlot<dyn Backend> = CapabilitySlot::new();
        slot.register(Switchable::boxed("a", &a_on));
        slot.register(Box::new(Switchable {
            name: "broken",
            available: Rc::clone(&b_on),
            fail_init: true,
            inits: 0,
            active: false,
        }));
        slot.resolve().unwrap();

        b_on.set(true);
        let err = slot.resolve().unwrap_err();
        assert!(matches!(
            err,
            FrameworkError::ExtensionInit { ref candidate, .. } if candidate == "broken"
        ));
        assert!(slot.is_active("a"));
        assert!(!slot.is_initialized("broken"));

        // The failed candidate is retried on the next evaluation.
        assert!(slot.resolve().is_err());
    }
}
