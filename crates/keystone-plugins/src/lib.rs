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

//! # Keystone Plugins
//!
//! Packaged sample modules: a logger, a platform layer with swappable
//! backends, a display, a mouse, a keyboard and hot-plugged joysticks. They
//! form the dependency graph
//!
//! ```text
//! Logger <- Platform <- Display <- Mouse
//!              ^           ^
//!              |           +------ Keyboard
//!              +------ Joystick
//! ```
//!
//! and are installed together with [`install`].

#![warn(missing_docs)]

pub mod display;
pub mod joystick;
pub mod keyboard;
pub mod logger;
pub mod mouse;
pub mod platform;

pub use display::{DisplayModule, DisplaySettings};
pub use joystick::{JoystickBackend, JoystickModule, JoystickPort, JoystickState, VirtualJoystick};
pub use keyboard::{KeyAction, KeyboardModule};
pub use logger::LoggerModule;
pub use mouse::MouseModule;
pub use platform::{
    DesktopBackend, HeadlessBackend, HeadlessSwitch, Platform, PlatformBackend, PlatformModule,
};

use keystone_sdk::{Framework, Result};

/// What [`install`] sets up.
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    /// Forces the headless platform backend while on.
    pub headless: HeadlessSwitch,
    /// Initial window settings.
    pub display: DisplaySettings,
    /// One virtual joystick is provided per port, named `Joystick {index}`.
    pub joystick_ports: Vec<JoystickPort>,
}

/// Declares the platform and joystick capabilities, provides their
/// candidates and registers every sample module.
pub fn install(framework: &mut Framework, options: PluginOptions) -> Result<()> {
    framework.declare_capability::<dyn PlatformBackend>()?;
    framework.provide_extension::<dyn PlatformBackend>(Box::new(
        DesktopBackend::new().yield_to(options.headless.clone()),
    ))?;
    framework
        .provide_extension::<dyn PlatformBackend>(Box::new(HeadlessBackend::new(options.headless)))?;

    framework.declare_capability::<dyn JoystickBackend>()?;
    for (index, port) in options.joystick_ports.into_iter().enumerate() {
        framework.provide_extension::<dyn JoystickBackend>(Box::new(VirtualJoystick::new(
            format!("Joystick {}", index),
            port,
        )))?;
    }

    framework.register(LoggerModule::descriptor())?;
    framework.register(PlatformModule::descriptor())?;
    framework.register(DisplayModule::descriptor(options.display))?;
    framework.register(MouseModule::descriptor())?;
    framework.register(KeyboardModule::descriptor())?;
    framework.register(JoystickModule::descriptor())?;
    log::info!("Installed sample plugins");
    Ok(())
}
