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

//! Keyboard key state fed by the host and applied once per frame.

use crate::display::DisplayModule;
use crate::logger::LoggerModule;
use keystone_core::{Module, ModuleContext, ModuleDescriptor, PhaseSet, Profiler};
use std::any::Any;

/// Highest valid key code.
pub const KEY_LAST: i32 = 348;

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyAction {
    /// The key is up.
    #[default]
    Release,
    /// The key went down.
    Press,
    /// The key is held and auto-repeating.
    Repeat,
}

/// Tracks the last action seen for every key code.
///
/// Events queued between frames are applied during pre-update, in the order
/// they were queued. Codes outside `0..=KEY_LAST` are logged and dropped.
#[derive(Debug)]
pub struct KeyboardModule {
    keys: Vec<KeyAction>,
    pending: Vec<(i32, KeyAction)>,
    rejected: u64,
}

impl Default for KeyboardModule {
    fn default() -> Self {
        Self {
            keys: vec![KeyAction::Release; KEY_LAST as usize + 1],
            pending: Vec::new(),
            rejected: 0,
        }
    }
}

impl KeyboardModule {
    /// Descriptor registering this module.
    pub fn descriptor() -> ModuleDescriptor {
        ModuleDescriptor::new::<Self>()
            .depends_on::<LoggerModule>()
            .depends_on::<DisplayModule>()
            .phases(PhaseSet::STANDARD | PhaseSet::PROFILE)
            .profile_tab("Keyboard")
    }

    /// Queues a key event for the next frame.
    pub fn queue(&mut self, key: i32, action: KeyAction) {
        self.pending.push((key, action));
    }

    /// Returns `true` while `key` is pressed or repeating.
    pub fn is_down(&self, key: i32) -> bool {
        self.action(key)
            .is_some_and(|action| action != KeyAction::Release)
    }

    /// The last action applied to `key`, or `None` for invalid codes.
    pub fn action(&self, key: i32) -> Option<KeyAction> {
        usize::try_from(key)
            .ok()
            .and_then(|index| self.keys.get(index))
            .copied()
    }

    /// Number of keys currently down.
    pub fn down_count(&self) -> usize {
        self.keys
            .iter()
            .filter(|action| **action != KeyAction::Release)
            .count()
    }

    /// Number of events dropped for carrying an invalid key code.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl Module for KeyboardModule {
    fn on_init(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        let display = ctx.dependency::<DisplayModule>()?;
        log::debug!("Keyboard attached to '{}'", display.title());
        Ok(())
    }

    fn on_pre_update(&mut self, _ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        for (key, action) in self.pending.drain(..) {
            match usize::try_from(key).ok().and_then(|index| self.keys.get_mut(index)) {
                Some(state) => *state = action,
                None => {
                    self.rejected += 1;
                    log::error!("Invalid action attempted with key {}", key);
                }
            }
        }
        Ok(())
    }

    fn on_profile(&self, profiler: &mut Profiler) {
        profiler.add("Keys Down", self.down_count());
        profiler.add("Rejected", self.rejected);
    }

    fn on_dispose(&mut self) -> anyhow::Result<()> {
        self.pending.clear();
        self.keys.fill(KeyAction::Release);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
