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

//! Dependency scheduler: turns a set of descriptors into the order modules
//! are initialized, updated and (reversed) disposed in.

use keystone_core::graph::topological_sort;
use keystone_core::{FrameworkError, ModuleDescriptor, ModuleId, Result};
use std::collections::HashSet;

/// Computes the scheduler order for `descriptors`.
///
/// Every dependency precedes its dependent. Modules with no ordering
/// constraint between them keep their registration order, so the result is
/// stable for a given graph.
///
/// # Errors
///
/// * [`FrameworkError::DuplicateModule`] if an identity appears twice.
/// * [`FrameworkError::UnresolvedDependency`] for the first declared
///   dependency (in registration order) that names no descriptor.
/// * [`FrameworkError::CyclicDependency`] naming the members of a cycle,
///   including a module that depends on itself.
pub fn compute_order<'a>(
    descriptors: impl IntoIterator<Item = &'a ModuleDescriptor>,
) -> Result<Vec<ModuleId>> {
    let descriptors: Vec<&ModuleDescriptor> = descriptors.into_iter().collect();
    let mut known = HashSet::with_capacity(descriptors.len());
    for descriptor in &descriptors {
        if !known.insert(descriptor.id()) {
            return Err(FrameworkError::DuplicateModule(descriptor.id()));
        }
    }

    for descriptor in &descriptors {
        if let Some(missing) = descriptor
            .dependencies()
            .iter()
            .find(|dependency| !known.contains(*dependency))
        {
            return Err(FrameworkError::UnresolvedDependency {
                module: descriptor.id(),
                dependency: *missing,
            });
        }
    }

    let nodes = descriptors.iter().map(|descriptor| descriptor.id());
    let edges = descriptors.iter().flat_map(|descriptor| {
        descriptor
            .dependencies()
            .iter()
            .map(move |dependency| (*dependency, descriptor.id()))
    });

    let order = topological_sort(nodes, edges)
        .map_err(|cycle| FrameworkError::CyclicDependency(cycle.members))?;

    log::info!(
        "Scheduler: order = [{}]",
        order
            .iter()
            .map(ModuleId::name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(order)
}
