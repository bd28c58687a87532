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

//! Joystick input with hot-plugged backends.

use crate::logger::LoggerModule;
use crate::platform::PlatformModule;
use keystone_core::{
    CapabilitySlot, Extension, Module, ModuleContext, ModuleDescriptor, PhaseSet, Profiler,
    Resolution,
};
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Axes and buttons read from a joystick on one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JoystickState {
    /// Stick axes in `[-1, 1]`.
    pub axes: [f32; 2],
    /// Pressed buttons, one bit per button.
    pub buttons: u32,
}

impl JoystickState {
    /// Returns `true` if `button` is held.
    pub fn button(&self, button: u32) -> bool {
        button < 32 && self.buttons & (1 << button) != 0
    }
}

/// A joystick implementation.
pub trait JoystickBackend: Extension {
    /// Returns `true` while a device is attached.
    fn is_connected(&self) -> bool;

    /// Reads the device for a frame lasting `delta` seconds.
    fn poll(&mut self, delta: f32) -> JoystickState;
}

#[derive(Debug, Default)]
struct PortState {
    connected: AtomicBool,
    buttons: AtomicU32,
}

/// The host-side end of a virtual joystick socket.
///
/// Clones share state: the host keeps one to plug the device in and press
/// buttons, a [`VirtualJoystick`] reads the other.
#[derive(Debug, Clone, Default)]
pub struct JoystickPort(Arc<PortState>);

impl JoystickPort {
    /// Creates an empty port.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugs the device in.
    pub fn connect(&self) {
        self.0.connected.store(true, Ordering::Release);
    }

    /// Unplugs the device.
    pub fn disconnect(&self) {
        self.0.connected.store(false, Ordering::Release);
        self.0.buttons.store(0, Ordering::Release);
    }

    /// Returns `true` while a device is plugged in.
    pub fn is_connected(&self) -> bool {
        self.0.connected.load(Ordering::Acquire)
    }

    /// Presses or releases `button` (0..32).
    pub fn set_button(&self, button: u32, pressed: bool) {
        if button >= 32 {
            return;
        }
        let mask = 1 << button;
        if pressed {
            self.0.buttons.fetch_or(mask, Ordering::AcqRel);
        } else {
            self.0.buttons.fetch_and(!mask, Ordering::AcqRel);
        }
    }

    fn buttons(&self) -> u32 {
        self.0.buttons.load(Ordering::Acquire)
    }
}

/// A software joystick whose stick circles at a fixed rate.
#[derive(Debug)]
pub struct VirtualJoystick {
    name: String,
    port: JoystickPort,
    angle: f32,
    speed: f32,
}

impl VirtualJoystick {
    /// A joystick called `name`, present while `port` is connected.
    pub fn new(name: impl Into<String>, port: JoystickPort) -> Self {
        Self {
            name: name.into(),
            port,
            angle: 0.0,
            speed: std::f32::consts::PI,
        }
    }
}

impl Extension for VirtualJoystick {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, _active: Option<&str>) -> bool {
        self.port.is_connected()
    }

    fn initialize(&mut self) -> anyhow::Result<()> {
        log::debug!("Virtual joystick '{}' calibrated", self.name);
        Ok(())
    }

    fn set_active(&mut self, active: bool) {
        if !active {
            self.angle = 0.0;
        }
    }
}

impl JoystickBackend for VirtualJoystick {
    fn is_connected(&self) -> bool {
        self.port.is_connected()
    }

    fn poll(&mut self, delta: f32) -> JoystickState {
        self.angle = (self.angle + self.speed * delta) % std::f32::consts::TAU;
        JoystickState {
            axes: [self.angle.cos(), self.angle.sin()],
            buttons: self.port.buttons(),
        }
    }
}

/// Hosts the `dyn JoystickBackend` slot and polls the active joystick.
#[derive(Default)]
pub struct JoystickModule {
    joysticks: Option<CapabilitySlot<dyn JoystickBackend>>,
    state: JoystickState,
    connected: Option<String>,
}

impl JoystickModule {
    /// Descriptor registering this module.
    pub fn descriptor() -> ModuleDescriptor {
        ModuleDescriptor::new::<Self>()
            .depends_on::<LoggerModule>()
            .depends_on::<PlatformModule>()
            .phases(PhaseSet::STANDARD | PhaseSet::PROFILE)
            .profile_tab("Joysticks")
    }

    /// Returns `true` while a joystick is connected.
    pub fn is_connected(&self) -> bool {
        self.connected.is_some()
    }

    /// Name of the connected joystick.
    pub fn connected_name(&self) -> Option<&str> {
        self.connected.as_deref()
    }

    /// State read on the last frame; all zero while disconnected.
    pub fn state(&self) -> JoystickState {
        self.state
    }
}

impl Module for JoystickModule {
    fn on_init(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        self.joysticks = Some(ctx.claim_capability::<dyn JoystickBackend>()?);
        if let Ok(platform) = ctx.dependency::<PlatformModule>()?.platform() {
            log::debug!("Joystick support on {}", platform);
        }
        Ok(())
    }

    fn on_pre_update(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        let Some(slot) = self.joysticks.as_mut() else {
            return Ok(());
        };
        if let Resolution::Swapped { current, .. } = slot.resolve()? {
            log::debug!("Joystick backend is now '{}'", current);
        }

        let delta = ctx.frame().delta_secs();
        let reading = match slot.active_mut() {
            Ok(joystick) if joystick.is_connected() => {
                Some((joystick.name().to_owned(), joystick.poll(delta)))
            }
            _ => None,
        };

        match (reading, self.connected.take()) {
            (Some((name, state)), previous) => {
                if previous.as_deref() != Some(name.as_str()) {
                    log::info!("Connecting joystick: {}", name);
                }
                self.state = state;
                self.connected = Some(name);
            }
            (None, Some(previous)) => {
                log::info!("Disconnecting joystick: {}", previous);
                self.state = JoystickState::default();
            }
            (None, None) => {}
        }
        Ok(())
    }

    fn on_profile(&self, profiler: &mut Profiler) {
        profiler.add("Connected", self.connected.as_deref().unwrap_or("none"));
        profiler.add(
            "Axes",
            format!("({:.2}, {:.2})", self.state.axes[0], self.state.axes[1]),
        );
        profiler.add("Buttons", format!("{:#034b}", self.state.buttons));
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
    fn test_port_buttons_clear_on_disconnect() {
        let port = JoystickPort::new();
        port.connect();
        port.set_button(3, true);
        port.set_button(40, true);
        assert_eq!(port.buttons(), 1 << 3);

        port.disconnect();
        assert!(!port.is_connected());
        assert_eq!(port.buttons(), 0);
    }

    #[test]
    fn test_virtual_joystick_circles() {
        let port = JoystickPort::new();
        let mut joystick = VirtualJoystick::new("pad", port.clone());
        assert!(!joystick.matches(None));

        port.connect();
        port.set_button(0, true);
        let state = joystick.poll(0.5);

        assert!(joystick.matches(None));
        assert!(state.axes[0].abs() < 1e-5, "a quarter turn puts x at zero");
        assert!((state.axes[1] - 1.0).abs() < 1e-5);
        assert!(state.button(0));
        assert!(!state.button(1));
    }
}
