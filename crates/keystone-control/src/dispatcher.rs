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

//! Drives modules through their lifecycle phases in scheduler order.

use crate::registry::{ModuleRegistry, ModuleState};
use keystone_core::{
    ExtensionRegistry, FrameInfo, FrameworkError, ModuleContext, ModuleId, Phase, Profiler,
    Result,
};

/// Outcome of the dispose sweep.
///
/// The sweep never stops early, so every failure is collected here.
#[derive(Debug, Default)]
pub struct DisposeReport {
    disposed: Vec<ModuleId>,
    failures: Vec<FrameworkError>,
}

impl DisposeReport {
    /// Modules whose dispose step ran, in the order it ran.
    pub fn disposed(&self) -> &[ModuleId] {
        &self.disposed
    }

    /// Failures raised by dispose callbacks.
    pub fn failures(&self) -> &[FrameworkError] {
        &self.failures
    }

    /// Returns `true` if every dispose callback succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Invokes module callbacks phase by phase.
///
/// The dispatcher enforces the init barrier: no update callback runs until
/// every module has gone through its init step.
#[derive(Debug, Default)]
pub struct PhaseDispatcher {
    init_complete: bool,
    profiler: Profiler,
}

impl PhaseDispatcher {
    /// Creates a dispatcher that has not run init yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once every module has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.init_complete
    }

    /// The profiler filled by the last [`run_profile`](Self::run_profile).
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    /// Runs the init step of every module, once, in scheduler order.
    ///
    /// Every module instance is constructed here, in order. The first
    /// callback failure stops the pass; modules initialized before it stay
    /// initialized and are disposed by the sweep.
    pub fn run_init(
        &mut self,
        modules: &mut ModuleRegistry,
        extensions: &mut ExtensionRegistry,
        frame: FrameInfo,
    ) -> Result<()> {
        if !modules.is_sealed() {
            return Err(FrameworkError::InvalidState {
                state: "configuring",
                operation: "run init before the module order is computed",
            });
        }
        if self.init_complete {
            return Err(FrameworkError::InvalidState {
                state: "running",
                operation: "run init twice",
            });
        }

        for position in 0..modules.len() {
            let entry = modules.entry_at(position);
            let id = entry.descriptor.id();
            if entry.state != ModuleState::Registered {
                continue;
            }

            if entry.descriptor.participates_in(Phase::Init) {
                log::debug!("PhaseDispatcher: init {}", id);
                modules
                    .with_module(position, |module, dependencies| {
                        let mut ctx = ModuleContext::new(frame, dependencies, &mut *extensions);
                        module.on_init(&mut ctx)
                    })?
                    .map_err(|source| fail(id, Phase::Init, source))?;
            } else {
                modules.with_module(position, |_, _| ())?;
            }
            modules.set_state(position, ModuleState::Initialized);
        }

        self.init_complete = true;
        let unclaimed = extensions.unclaimed();
        if !unclaimed.is_empty() {
            log::warn!(
                "PhaseDispatcher: capabilities declared but never claimed: {}",
                unclaimed.join(", ")
            );
        }
        log::info!("PhaseDispatcher: {} modules initialized", modules.len());
        Ok(())
    }

    /// Runs one frame: PreUpdate for every module, then PostUpdate.
    ///
    /// A callback failure stops the rest of the frame and is returned with
    /// the module and phase it came from.
    pub fn run_update(
        &mut self,
        modules: &mut ModuleRegistry,
        extensions: &mut ExtensionRegistry,
        frame: FrameInfo,
    ) -> Result<()> {
        if !self.init_complete {
            return Err(FrameworkError::InvalidState {
                state: "configuring",
                operation: "dispatch an update before init",
            });
        }

        self.run_phase(modules, extensions, frame, Phase::PreUpdate)?;
        self.run_phase(modules, extensions, frame, Phase::PostUpdate)
    }

    fn run_phase(
        &mut self,
        modules: &mut ModuleRegistry,
        extensions: &mut ExtensionRegistry,
        frame: FrameInfo,
        phase: Phase,
    ) -> Result<()> {
        for position in 0..modules.len() {
            let entry = modules.entry_at(position);
            if entry.state != ModuleState::Initialized || !entry.descriptor.participates_in(phase)
            {
                continue;
            }
            let id = entry.descriptor.id();

            modules
                .with_module(position, |module, dependencies| {
                    let mut ctx = ModuleContext::new(frame, dependencies, &mut *extensions);
                    match phase {
                        Phase::PreUpdate => module.on_pre_update(&mut ctx),
                        _ => module.on_post_update(&mut ctx),
                    }
                })?
                .map_err(|source| fail(id, phase, source))?;
        }
        Ok(())
    }

    /// Runs the profile step of every module that declared it.
    ///
    /// Modules only get `&self`, so profiling cannot change module state.
    pub fn run_profile(&mut self, modules: &mut ModuleRegistry) -> Result<&Profiler> {
        self.profiler.begin_pass();
        for position in 0..modules.len() {
            let entry = modules.entry_at(position);
            if entry.state != ModuleState::Initialized
                || !entry.descriptor.participates_in(Phase::Profile)
            {
                continue;
            }
            let tab = entry.descriptor.tab_name();

            let profiler = &mut self.profiler;
            modules.with_module(position, |module, _| {
                profiler.begin_tab(tab);
                module.on_profile(profiler);
            })?;
        }
        Ok(&self.profiler)
    }

    /// Disposes every initialized module in reverse scheduler order.
    ///
    /// Failures are logged and collected; the sweep always reaches the first
    /// module. Instances are dropped once disposed, and modules that never
    /// initialized are retired without a callback.
    pub fn run_dispose(&mut self, modules: &mut ModuleRegistry) -> DisposeReport {
        let mut report = DisposeReport::default();

        for position in (0..modules.len()).rev() {
            let entry = modules.entry_at(position);
            let id = entry.descriptor.id();
            let state = entry.state;
            let has_dispose = entry.descriptor.participates_in(Phase::Dispose);
            match state {
                ModuleState::Disposed => continue,
                ModuleState::Registered => {
                    modules.set_state(position, ModuleState::Disposed);
                    continue;
                }
                ModuleState::Initialized => {}
            }

            if has_dispose {
                log::debug!("PhaseDispatcher: dispose {}", id);
                let outcome = modules
                    .with_module(position, |module, _| module.on_dispose())
                    .and_then(|result| result.map_err(|source| fail(id, Phase::Dispose, source)));
                if let Err(error) = outcome {
                    log::warn!("PhaseDispatcher: {}", error);
                    report.failures.push(error);
                }
            }
            modules.set_state(position, ModuleState::Disposed);
            report.disposed.push(id);
        }

        self.init_complete = false;
        log::info!(
            "PhaseDispatcher: {} modules disposed ({} failures)",
            report.disposed.len(),
            report.failures.len()
        );
        report
    }
}

fn fail(module: ModuleId, phase: Phase, source: anyhow::Error) -> FrameworkError {
    log::error!(
        "PhaseDispatcher: module {} failed during {}: {:#}",
        module,
        phase,
        source
    );
    FrameworkError::callback(module, phase, source)
}
