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

//! The display module: window size, title and presented frames.

use crate::logger::LoggerModule;
use crate::platform::{Platform, PlatformModule};
use keystone_core::{Module, ModuleContext, ModuleDescriptor, PhaseSet, Profiler};
use std::any::Any;

/// Initial window settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Keystone".to_owned(),
        }
    }
}

/// Tracks the window and counts presented frames.
///
/// The platform is re-read every frame, so a backend swap shows up here in
/// the same frame it happens.
#[derive(Debug)]
pub struct DisplayModule {
    settings: DisplaySettings,
    platform: Option<Platform>,
    frames_presented: u64,
}

impl DisplayModule {
    /// Creates the display with the given initial settings.
    pub fn new(settings: DisplaySettings) -> Self {
        Self {
            settings,
            platform: None,
            frames_presented: 0,
        }
    }

    /// Descriptor registering this module with `settings`.
    pub fn descriptor(settings: DisplaySettings) -> ModuleDescriptor {
        ModuleDescriptor::with_factory(move || Self::new(settings))
            .depends_on::<LoggerModule>()
            .depends_on::<PlatformModule>()
            .phases(PhaseSet::ALL)
            .profile_tab("Display")
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.settings.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.settings.height
    }

    /// Width over height; 1.0 for a degenerate window.
    pub fn aspect_ratio(&self) -> f32 {
        if self.settings.height == 0 {
            1.0
        } else {
            self.settings.width as f32 / self.settings.height as f32
        }
    }

    /// Window title.
    pub fn title(&self) -> &str {
        &self.settings.title
    }

    /// Platform seen on the last frame.
    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    /// Frames presented since start.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Resizes the window. Called by host code between frames.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!(
            "Display resized from {}x{} to {}x{}",
            self.settings.width,
            self.settings.height,
            width,
            height
        );
        self.settings.width = width;
        self.settings.height = height;
    }
}

impl Default for DisplayModule {
    fn default() -> Self {
        Self::new(DisplaySettings::default())
    }
}

impl Module for DisplayModule {
    fn on_init(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        let platform = ctx.dependency::<PlatformModule>()?.platform()?;
        self.platform = Some(platform);
        log::info!(
            "Display '{}' opened at {}x{} on {}",
            self.settings.title,
            self.settings.width,
            self.settings.height,
            platform
        );
        Ok(())
    }

    fn on_pre_update(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        let platform = ctx.dependency::<PlatformModule>()?.platform().ok();
        if platform != self.platform {
            log::info!(
                "Display now on {}",
                platform.map_or_else(|| "no platform".to_owned(), |p| p.to_string())
            );
            self.platform = platform;
        }
        Ok(())
    }

    fn on_post_update(&mut self, _ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        self.frames_presented += 1;
        Ok(())
    }

    fn on_profile(&self, profiler: &mut Profiler) {
        profiler.add("Size", format!("{}x{}", self.settings.width, self.settings.height));
        profiler.add("Title", &self.settings.title);
        profiler.add("Frames Presented", self.frames_presented);
    }

    fn on_dispose(&mut self) -> anyhow::Result<()> {
        log::info!("Display '{}' closed", self.settings.title);
        Ok(())
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
    fn test_aspect_ratio() {
        let mut display = DisplayModule::default();
        assert!((display.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);

        display.resize(800, 0);
        assert_eq!(display.aspect_ratio(), 1.0);
    }
}
