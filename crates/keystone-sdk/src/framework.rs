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

//! The framework facade: the single entry point owning every module.

use crate::config::{FailurePolicy, FrameworkConfig};
use keystone_control::{
    DisposeReport, FrameworkState, ModuleRegistry, ModuleState, PhaseDispatcher,
};
use keystone_core::{
    Extension, ExtensionRegistry, FrameInfo, FrameworkError, Module, ModuleDescriptor, ModuleId,
    Profiler, Result,
};
use keystone_telemetry::{init_logging, FrameTimer, TelemetryService};
use std::time::Duration;

/// Owns the module registry and drives the frame loop.
///
/// # Lifecycle
///
/// 1. Configure: [`register`](Self::register) modules,
///    [`declare_capability`](Self::declare_capability) and
///    [`provide_extension`](Self::provide_extension).
/// 2. [`start`](Self::start): the scheduler order is computed and every
///    module initialized. Structural errors surface here, before any frame.
/// 3. [`tick`](Self::tick) once per frame.
/// 4. [`shutdown`](Self::shutdown), or let the framework drop.
pub struct Framework {
    config: FrameworkConfig,
    state: FrameworkState,
    modules: ModuleRegistry,
    extensions: ExtensionRegistry,
    dispatcher: PhaseDispatcher,
    timer: FrameTimer,
    telemetry: TelemetryService,
    skipped_frames: u64,
    last_skipped_error: Option<FrameworkError>,
}

impl Framework {
    /// Creates a framework in the configuring state and installs the logger.
    pub fn new(config: FrameworkConfig) -> Self {
        init_logging(&config.log_filter);

        let telemetry = if config.profiling.enabled {
            TelemetryService::new(config.profiling.interval())
        } else {
            TelemetryService::disabled()
        };

        Self {
            timer: FrameTimer::new(config.max_frame_delta()),
            telemetry,
            config,
            state: FrameworkState::Configuring,
            modules: ModuleRegistry::new(),
            extensions: ExtensionRegistry::new(),
            dispatcher: PhaseDispatcher::new(),
            skipped_frames: 0,
            last_skipped_error: None,
        }
    }

    /// The configuration the framework was built with.
    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    /// The current lifecycle state.
    pub fn state(&self) -> FrameworkState {
        self.state
    }

    /// Registers a module.
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> Result<()> {
        self.state
            .require(&[FrameworkState::Configuring], "register a module")?;
        self.modules.register(descriptor)
    }

    /// Declares the capability slot for `E`.
    pub fn declare_capability<E>(&mut self) -> Result<()>
    where
        E: ?Sized + Extension + 'static,
    {
        self.state
            .require(&[FrameworkState::Configuring], "declare a capability")?;
        self.extensions.declare::<E>()
    }

    /// Adds a candidate implementation for capability `E`.
    pub fn provide_extension<E>(&mut self, candidate: Box<E>) -> Result<()>
    where
        E: ?Sized + Extension + 'static,
    {
        self.state
            .require(&[FrameworkState::Configuring], "provide an extension")?;
        self.extensions.provide::<E>(candidate)
    }

    /// Computes the scheduler order and runs every module's init step.
    ///
    /// On failure the framework halts; modules that did initialize are
    /// still disposed by [`shutdown`](Self::shutdown).
    pub fn start(&mut self) -> Result<()> {
        self.state.require(&[FrameworkState::Configuring], "start")?;

        let started = self.modules.seal().and_then(|_| {
            self.dispatcher
                .run_init(&mut self.modules, &mut self.extensions, FrameInfo::STARTUP)
        });
        if let Err(error) = started {
            log::error!("Framework failed to start: {}", error);
            self.transition(FrameworkState::Halted);
            return Err(error);
        }

        self.timer.start();
        self.transition(FrameworkState::Running);
        log::info!("Framework started with {} modules", self.modules.len());
        Ok(())
    }

    /// Runs one frame, timed against the wall clock.
    pub fn tick(&mut self) -> Result<FrameInfo> {
        self.state.require(&[FrameworkState::Running], "tick")?;
        let frame = self.timer.tick();
        self.dispatch(frame)
    }

    /// Runs one frame with an explicit delta, for hosts that own the clock.
    pub fn tick_with_delta(&mut self, delta: Duration) -> Result<FrameInfo> {
        self.state.require(&[FrameworkState::Running], "tick")?;
        let frame = self.timer.advance(delta);
        self.dispatch(frame)
    }

    /// Runs `count` frames with a fixed `delta`, stopping at the first error.
    pub fn run_frames(&mut self, count: u64, delta: Duration) -> Result<FrameInfo> {
        let mut frame = self.timer.current();
        for _ in 0..count {
            frame = self.tick_with_delta(delta)?;
        }
        Ok(frame)
    }

    fn dispatch(&mut self, frame: FrameInfo) -> Result<FrameInfo> {
        if let Err(error) =
            self.dispatcher
                .run_update(&mut self.modules, &mut self.extensions, frame)
        {
            match self.config.failure_policy {
                FailurePolicy::Halt => {
                    log::error!("Framework halted at frame {}: {}", frame.frame, error);
                    self.transition(FrameworkState::Halted);
                    return Err(error);
                }
                FailurePolicy::SkipFrame => {
                    self.skipped_frames += 1;
                    log::warn!(
                        "Skipping the rest of frame {}: {}",
                        frame.frame,
                        error
                    );
                    self.last_skipped_error = Some(error);
                    return Ok(frame);
                }
            }
        }

        if self.telemetry.tick(frame) {
            let profiler = self.dispatcher.run_profile(&mut self.modules)?;
            self.telemetry.log_summary(frame, profiler);
        }
        Ok(frame)
    }

    /// Disposes every initialized module in reverse scheduler order.
    ///
    /// Dispose failures do not stop the sweep; they are returned in the
    /// report.
    pub fn shutdown(&mut self) -> Result<DisposeReport> {
        self.state.require(
            &[
                FrameworkState::Configuring,
                FrameworkState::Running,
                FrameworkState::Halted,
            ],
            "shut down",
        )?;
        Ok(self.dispose())
    }

    fn dispose(&mut self) -> DisposeReport {
        let report = self.dispatcher.run_dispose(&mut self.modules);
        self.transition(FrameworkState::Disposed);
        if !report.is_clean() {
            log::warn!(
                "Framework disposed with {} failing modules",
                report.failures().len()
            );
        }
        report
    }

    fn transition(&mut self, next: FrameworkState) {
        if self.state.can_transition_to(next) {
            log::debug!("Framework: {} -> {}", self.state, next);
            self.state = next;
        }
    }

    /// Typed access to a module singleton, constructing it if needed.
    pub fn instance<M: Module>(&mut self) -> Result<&M> {
        self.modules.instance::<M>()
    }

    /// Typed mutable access to a module singleton.
    ///
    /// Only available to host code between frames.
    pub fn instance_mut<M: Module>(&mut self) -> Result<&mut M> {
        self.modules.instance_mut::<M>()
    }

    /// Access to a module singleton by identity.
    pub fn instance_of(&mut self, id: ModuleId) -> Result<&dyn Module> {
        self.modules.instance_of(id)
    }

    /// The lifecycle state of one module.
    pub fn module_state(&self, id: ModuleId) -> Result<ModuleState> {
        self.modules.state(id)
    }

    /// Module identities in scheduler order once started.
    pub fn order(&self) -> Vec<ModuleId> {
        self.modules.order()
    }

    /// The most recently dispatched frame.
    pub fn frame(&self) -> FrameInfo {
        self.timer.current()
    }

    /// The profiler as filled by the last profile pass.
    pub fn profiler(&self) -> &Profiler {
        self.dispatcher.profiler()
    }

    /// Number of frames abandoned under [`FailurePolicy::SkipFrame`].
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// The error that caused the most recent skipped frame.
    pub fn last_skipped_error(&self) -> Option<&FrameworkError> {
        self.last_skipped_error.as_ref()
    }
}

impl Default for Framework {
    fn default() -> Self {
        Self::new(FrameworkConfig::default())
    }
}

impl Drop for Framework {
    fn drop(&mut self) {
        if self.state != FrameworkState::Disposed {
            log::debug!("Framework dropped while {}; disposing modules", self.state);
            self.dispose();
        }
    }
}
