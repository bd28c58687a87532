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

//! Platform detection with a hot-swappable backend.
//!
//! The `dyn PlatformBackend` capability has two sample candidates: the
//! desktop backend for the OS the binary was built for, and a headless
//! backend that takes over while a [`HeadlessSwitch`] is on.

use crate::logger::LoggerModule;
use keystone_core::{
    CapabilitySlot, Extension, FrameworkError, Module, ModuleContext, ModuleDescriptor, PhaseSet,
    Profiler, Resolution,
};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The platform a backend runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    MacOs,
    /// Linux and other Unix desktops.
    Linux,
    /// No windowing system at all.
    Headless,
    /// A target without a dedicated backend.
    Unknown,
}

impl Platform {
    /// Maps a `std::env::consts::OS` value to a platform.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Platform::Linux,
            _ => Platform::Unknown,
        }
    }

    /// The platform this binary was compiled for.
    pub fn build_target() -> Self {
        Self::from_os(std::env::consts::OS)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
            Platform::Headless => "Headless",
            Platform::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// A platform implementation.
pub trait PlatformBackend: Extension {
    /// The platform served by this backend.
    fn platform(&self) -> Platform;

    /// Highest texture anisotropy the platform supports.
    fn max_anisotropy(&self) -> f32;
}

/// Backend for the desktop OS the binary was built for.
#[derive(Debug)]
pub struct DesktopBackend {
    platform: Platform,
    headless: Option<HeadlessSwitch>,
}

impl DesktopBackend {
    /// A backend for the build target.
    pub fn new() -> Self {
        Self::for_platform(Platform::build_target())
    }

    /// A backend serving `platform`; it only matches on that platform.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            headless: None,
        }
    }

    /// Stops matching while `switch` is on, leaving the slot to the
    /// headless backend.
    #[must_use]
    pub fn yield_to(mut self, switch: HeadlessSwitch) -> Self {
        self.headless = Some(switch);
        self
    }
}

impl Default for DesktopBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for DesktopBackend {
    fn name(&self) -> &str {
        "desktop"
    }

    fn matches(&self, _active: Option<&str>) -> bool {
        let forced_headless = self.headless.as_ref().is_some_and(HeadlessSwitch::is_on);
        !forced_headless
            && self.platform != Platform::Unknown
            && self.platform == Platform::build_target()
    }

    fn initialize(&mut self) -> anyhow::Result<()> {
        log::debug!("Desktop backend initialized for {}", self.platform);
        Ok(())
    }
}

impl PlatformBackend for DesktopBackend {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn max_anisotropy(&self) -> f32 {
        16.0
    }
}

/// Shared flag forcing the headless backend.
///
/// Clones share the same flag, so the host can keep one and hand another to
/// [`HeadlessBackend`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessSwitch(Arc<AtomicBool>);

impl HeadlessSwitch {
    /// Creates a switch in the given position.
    pub fn new(on: bool) -> Self {
        Self(Arc::new(AtomicBool::new(on)))
    }

    /// Turns headless mode on or off.
    pub fn set(&self, on: bool) {
        self.0.store(on, Ordering::Release);
    }

    /// Returns `true` while headless mode is requested.
    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Backend without a windowing system.
#[derive(Debug)]
pub struct HeadlessBackend {
    switch: HeadlessSwitch,
}

impl HeadlessBackend {
    /// A backend active while `switch` is on.
    pub fn new(switch: HeadlessSwitch) -> Self {
        Self { switch }
    }
}

impl Extension for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn matches(&self, _active: Option<&str>) -> bool {
        self.switch.is_on()
    }
}

impl PlatformBackend for HeadlessBackend {
    fn platform(&self) -> Platform {
        Platform::Headless
    }

    fn max_anisotropy(&self) -> f32 {
        1.0
    }
}

/// Hosts the `dyn PlatformBackend` slot and re-resolves it every frame.
#[derive(Default)]
pub struct PlatformModule {
    backends: Option<CapabilitySlot<dyn PlatformBackend>>,
    swaps: u32,
}

impl PlatformModule {
    /// Descriptor registering this module.
    pub fn descriptor() -> ModuleDescriptor {
        ModuleDescriptor::new::<Self>()
            .depends_on::<LoggerModule>()
            .phases(PhaseSet::STANDARD | PhaseSet::PROFILE)
            .profile_tab("Platform")
    }

    fn backend(&self) -> keystone_core::Result<&dyn PlatformBackend> {
        match &self.backends {
            Some(slot) => slot.active(),
            None => Err(FrameworkError::NoActiveImplementation("PlatformBackend")),
        }
    }

    /// The platform of the active backend.
    pub fn platform(&self) -> keystone_core::Result<Platform> {
        self.backend().map(|backend| backend.platform())
    }

    /// Highest texture anisotropy of the active backend.
    pub fn max_anisotropy(&self) -> keystone_core::Result<f32> {
        self.backend().map(|backend| backend.max_anisotropy())
    }

    /// Name of the active backend, if any.
    pub fn backend_name(&self) -> Option<&str> {
        self.backends.as_ref().and_then(|slot| slot.active_name())
    }

    /// Number of times the backend was swapped since start.
    pub fn swaps(&self) -> u32 {
        self.swaps
    }

    fn resolve(&mut self) -> anyhow::Result<()> {
        if let Some(slot) = self.backends.as_mut() {
            if let Resolution::Swapped { current, .. } = slot.resolve()? {
                self.swaps += 1;
                log::info!("Platform backend is now '{}'", current);
            }
        }
        Ok(())
    }
}

impl Module for PlatformModule {
    fn on_init(&mut self, ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        self.backends = Some(ctx.claim_capability::<dyn PlatformBackend>()?);
        // Dependents read the platform during their own init.
        self.resolve()?;
        log::info!(
            "Platform initialized on {}",
            self.platform()
                .map(|platform| platform.to_string())
                .unwrap_or_else(|_| "no backend".to_owned())
        );
        Ok(())
    }

    fn on_pre_update(&mut self, _ctx: &mut ModuleContext<'_>) -> anyhow::Result<()> {
        self.resolve()
    }

    fn on_profile(&self, profiler: &mut Profiler) {
        profiler.add("Backend", self.backend_name().unwrap_or("none"));
        if let Ok(anisotropy) = self.max_anisotropy() {
            profiler.add("Max Anisotropy", anisotropy);
        }
        profiler.add("Swaps", self.swaps);
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
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("plan9"), Platform::Unknown);
    }

    #[test]
    fn test_desktop_matches_only_its_build_target() {
        let native = DesktopBackend::new();
        let foreign = DesktopBackend::for_platform(match Platform::build_target() {
            Platform::Windows => Platform::Linux,
            _ => Platform::Windows,
        });

        assert_eq!(
            native.matches(None),
            Platform::build_target() != Platform::Unknown
        );
        assert!(!foreign.matches(None));
    }

    #[test]
    fn test_headless_follows_switch() {
        let switch = HeadlessSwitch::default();
        let backend = HeadlessBackend::new(switch.clone());
        assert!(!backend.matches(Some("desktop")));

        switch.set(true);
        assert!(backend.matches(Some("desktop")));
        assert_eq!(backend.platform(), Platform::Headless);
    }

    #[test]
    fn test_desktop_yields_while_headless_is_on() {
        let switch = HeadlessSwitch::new(true);
        let desktop = DesktopBackend::new().yield_to(switch.clone());
        assert!(!desktop.matches(None));

        switch.set(false);
        assert_eq!(
            desktop.matches(Some("headless")),
            Platform::build_target() != Platform::Unknown
        );
    }

    #[test]
    fn test_module_without_slot_has_no_platform() {
        let module = PlatformModule::default();
        assert!(matches!(
            module.platform(),
            Err(FrameworkError::NoActiveImplementation("PlatformBackend"))
        ));
    }
}
