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

//! # Extensions
//!
//! An **Extension** is one swappable implementation of a capability (the
//! platform backend, the joystick backend...). Capabilities are expressed as
//! traits extending [`Extension`]; each capability gets one
//! [`CapabilitySlot`] holding every known candidate and the one that is
//! currently active.
//!
//! ## Architecture
//!
//! 1. **[`ExtensionRegistry`]** collects slots and candidates before the
//!    framework starts.
//! 2. The module hosting a capability claims its slot during init and calls
//!    [`CapabilitySlot::resolve`] once per frame, before any dependent module
//!    consumes it.
//!
//! ## Usage
//!
//! ```rust
//! use keystone_core::{CapabilitySlot, Extension, Resolution};
//!
//! trait Backend: Extension {
//!     fn label(&self) -> &'static str;
//! }
//!
//! struct Desktop;
//!
//! impl Extension for Desktop {
//!     fn name(&self) -> &str { "desktop" }
//!     fn matches(&self, _active: Option<&str>) -> bool { true }
//! }
//!
//! impl Backend for Desktop {
//!     fn label(&self) -> &'static str { "Desktop" }
//! }
//!
//! let mut slot: CapabilitySlot<dyn Backend> = CapabilitySlot::new();
//! slot.register(Box::new(Desktop));
//!
//! assert!(matches!(slot.resolve().unwrap(), Resolution::Swapped { .. }));
//! assert_eq!(slot.active().unwrap().label(), "Desktop");
//! assert!(matches!(slot.resolve().unwrap(), Resolution::Unchanged));
//! ```

mod registry;
mod slot;

pub use registry::ExtensionRegistry;
pub use slot::{CapabilitySlot, Resolution};

/// A candidate implementation of a capability.
pub trait Extension {
    /// A name unique among the candidates of one capability.
    fn name(&self) -> &str;

    /// Returns `true` if this candidate should be the active implementation.
    ///
    /// `active` is the name of the currently active candidate, if any. The
    /// predicate usually depends on external conditions (detected OS,
    /// connected hardware), not on the active candidate's internal state.
    fn matches(&self, active: Option<&str>) -> bool;

    /// Called once, the first time the candidate is swapped in.
    fn initialize(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called when the candidate becomes active or stops being active.
    ///
    /// Deactivation is not disposal: the candidate may be swapped back in
    /// later without being initialized again.
    fn set_active(&mut self, _active: bool) {}
}

/// Human-readable name of a capability type, e.g. `PlatformBackend` for
/// `dyn my_crate::platform::PlatformBackend`.
pub fn capability_name<E: ?Sized>() -> &'static str {
    let full = std::any::type_name::<E>();
    let trimmed = full.strip_prefix("dyn ").unwrap_or(full);
    let base = trimmed.split('<').next().unwrap_or(trimmed);
    match base.rfind("::") {
        Some(pos) => &trimmed[pos + 2..],
        None => trimmed,
    }
}
