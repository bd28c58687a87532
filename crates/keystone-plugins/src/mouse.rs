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

//! Mouse state derived from host-fed input, kept inside the display.

use crate::display::DisplayModule;
use crate::logger::LoggerModule;
use keystone_core::{Module, ModuleContext, ModuleDescriptor, PhaseSet, Profiler};
use std::any::Any;

/// Number of tracked mouse buttons.
pub const MOUSE_BUTTONS: usize = 8;

#[derive(Debug, Clone, Copy)]
enum Motion {
    To(f32, f32),
    By(f32, f32),
}

/// Cursor position, per-frame deltas and button state.
///
/// Host code queues input between frames; the queue is applied during the
/// pre-update phase and the position clamped to the display bounds.
#[derive(Debug, Default)]
pub struct MouseModule {
    x: f32,
    y: f32,
    delta_x: f32,
    delta_y: f32,
    delta_wheel: f32,
    pending_motion: Vec<Motion>,
    pending_wheel: f32,
    buttons: [bool; MOUSE_BUTTONS],
    cursor_hidden: bool,
    bounds: (f32, f32),
}

impl MouseModule {
    /// Descriptor registering this module.
    pub fn descriptor() -> ModuleDescriptor {
        ModuleDescriptor::new::<Self>()
            .depends_on::<LoggerModule>()
            .depends_on::<DisplayModule>()
            .phases(PhaseSet::STANDARD | PhaseSet::PROFILE)
            .profile_tab("Mouse")
    }

    /// Queues an absolute cursor move, in pixels.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.pending_motion.push(Motion::To(x, y));
    }

    /// Queues a relative cursor move, in pixels.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.pending_motion.push(Motion::By(dx, dy));
    }

    /// Queues a wheel movement.
    pub fn scroll(&mut self, amount: f32) {
        self.pending_wheel += amount;
    }

    /// Sets the state of `button`. Out-of-range buttons are ignored.
    pub fn set_button(&mut self, button: usize, pressed: bool) {
        if let Some(state) = self.buttons.get_mut(button) {
            *state = pressed;
        }
    }

    /// Returns `true` while `button` is held.
    pub fn button(&self, button: usize) -> bool {
        self.buttons.get(button).copied().unwrap_or(false)
    }

    /// Hides or shows the cursor.
    pub fn set_cursor_hidden(&mut self, hidden: bool) {
        self.cursor_hidden = hidden;
    }

    /// Returns `true` if the cursor is hidden.
    pub fn is_cursor_hidden(&self) -> bool {
        self.cursor_hidden
    }

    /// Cursor position in pixels.
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Cursor position in `[0, 1]` display coordinates.
    pub fn normalized_position(&self) -> (f32, f32) {
        let (width, height) = self.bounds;
        (
            if width > 0.0 { self.x / width } else { 0.0 },
            if height > 0.0 { self.y / height } else { 0.0 },
        )
    }

    /// Cursor movement over the last frame, in pixels.
    pub fn delta(&self) -> (f32, f32) {
        (self.delta_x, self.delta_y)
    }

    /// Wheel movement over the last frame.
    pub fn delta_wheel(&self) -> f32 {
        self.delta_wheel
    }
}

impl Module for MouseModule {
    fn on_init(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        let display = ctx.dependency::<DisplayModule>()?;
        self.bounds = (display.width() as f32, display.height() as f32);
        self.x = self.bounds.0 / 2.0;
        self.y = self.bounds.1 / 2.0;
        log::debug!("Mouse centred at ({}, {})", self.x, self.y);
        Ok(())
    }

    fn on_pre_update(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        let display = ctx.dependency::<DisplayModule>()?;
        self.bounds = (display.width() as f32, display.height() as f32);

        let (start_x, start_y) = (self.x, self.y);
        for motion in self.pending_motion.drain(..) {
            (self.x, self.y) = match motion {
                Motion::To(x, y) => (x, y),
                Motion::By(dx, dy) => (self.x + dx, self.y + dy),
            };
            self.x = self.x.clamp(0.0, self.bounds.0);
            self.y = self.y.clamp(0.0, self.bounds.1);
        }
        // A shrinking display drags the cursor along.
        self.x = self.x.clamp(0.0, self.bounds.0);
        self.y = self.y.clamp(0.0, self.bounds.1);
        self.delta_x = self.x - start_x;
        self.delta_y = self.y - start_y;
        self.delta_wheel = std::mem::take(&mut self.pending_wheel);
        Ok(())
    }

    fn on_profile(&self, profiler: &mut Profiler) {
        profiler.add("Position", format!("({:.1}, {:.1})", self.x, self.y));
        profiler.add("Delta", format!("({:.1}, {:.1})", self.delta_x, self.delta_y));
        profiler.add("Cursor Hidden", self.cursor_hidden);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_out_of_range_are_ignored() {
        let mut mouse = MouseModule::default();
        mouse.set_button(1, true);
        mouse.set_button(MOUSE_BUTTONS + 3, true);

        assert!(mouse.button(1));
        assert!(!mouse.button(0));
        assert!(!mouse.button(MOUSE_BUTTONS + 3));
    }

    #[test]
    fn test_normalized_position_without_bounds() {
        let mouse = MouseModule::default();
        assert_eq!(mouse.normalized_position(), (0.0, 0.0));
    }
}
