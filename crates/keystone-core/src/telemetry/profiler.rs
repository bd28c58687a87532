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

//! Tabbed key/value sink filled during the profile phase.

use std::collections::BTreeMap;
use std::fmt::Display;

/// A single titled value inside a profiler tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    /// What is being reported.
    pub title: String,
    /// The formatted value.
    pub value: String,
}

/// The entries reported by one module during the last profile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileTab {
    entries: Vec<ProfileEntry>,
}

impl ProfileTab {
    /// Entries in the order they were added.
    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    /// Value reported under `title`, if any.
    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.title == title)
            .map(|entry| entry.value.as_str())
    }
}

/// Collects diagnostics from modules, one tab per module.
///
/// The dispatcher opens a module's tab before calling its profile callback,
/// so modules only ever name the value they report.
#[derive(Debug, Default)]
pub struct Profiler {
    tabs: BTreeMap<String, ProfileTab>,
    current: Option<String>,
    passes: u64,
}

impl Profiler {
    /// Creates an empty profiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a profile pass, clearing every tab.
    pub fn begin_pass(&mut self) {
        self.passes += 1;
        self.current = None;
        for tab in self.tabs.values_mut() {
            tab.entries.clear();
        }
    }

    /// Number of profile passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Selects the tab subsequent [`add`](Self::add) calls write into.
    ///
    /// Several modules may share a tab; their entries accumulate until the
    /// next pass.
    pub fn begin_tab(&mut self, name: &str) {
        self.tabs.entry(name.to_owned()).or_default();
        self.current = Some(name.to_owned());
    }

    /// Records `value` under `title` in the current tab.
    ///
    /// Values added outside of a tab are dropped.
    pub fn add(&mut self, title: impl Into<String>, value: impl Display) {
        let Some(tab) = self
            .current
            .as_ref()
            .and_then(|name| self.tabs.get_mut(name))
        else {
            log::trace!("Profiler: value reported outside of a tab was dropped");
            return;
        };

        let title = title.into();
        let value = value.to_string();
        match tab.entries.iter_mut().find(|entry| entry.title == title) {
            Some(entry) => entry.value = value,
            None => tab.entries.push(ProfileEntry { title, value }),
        }
    }

    /// The tab called `name`, if any module reported into it.
    pub fn tab(&self, name: &str) -> Option<&ProfileTab> {
        self.tabs.get(name)
    }

    /// All tabs, sorted by name.
    pub fn tabs(&self) -> impl Iterator<Item = (&str, &ProfileTab)> {
        self.tabs.iter().map(|(name, tab)| (name.as_str(), tab))
    }

    /// Returns `true` if no tab holds any entry.
    pub fn is_empty(&self) -> bool {
        self.tabs.values().all(|tab| tab.entries.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_land_in_current_tab() {
        let mut profiler = Profiler::new();
        profiler.begin_pass();
        profiler.begin_tab("Platform");
        profiler.add("Backend", "desktop");
        profiler.begin_tab("Mouse");
        profiler.add("X", 12.5);

        assert_eq!(profiler.tab("Platform").unwrap().get("Backend"), Some("desktop"));
        assert_eq!(profiler.tab("Mouse").unwrap().get("X"), Some("12.5"));
        assert_eq!(profiler.passes(), 1);
    }

    #[test]
    fn test_same_title_replaces_value() {
        let mut profiler = Profiler::new();
        profiler.begin_tab("Mouse");
        profiler.add("X", 1);
        profiler.add("X", 2);
        assert_eq!(profiler.tab("Mouse").unwrap().entries().len(), 1);
        assert_eq!(profiler.tab("Mouse").unwrap().get("X"), Some("2"));
    }

    #[test]
    fn test_shared_tab_keeps_entries_until_next_pass() {
        let mut profiler = Profiler::new();
        profiler.begin_pass();
        profiler.begin_tab("Devices");
        profiler.add("Mouse X", 1);
        profiler.begin_tab("Devices");
        profiler.add("Joystick", "none");

        let devices = profiler.tab("Devices").unwrap();
        assert_eq!(devices.get("Mouse X"), Some("1"));
        assert_eq!(devices.get("Joystick"), Some("none"));

        profiler.begin_pass();
        assert!(profiler.tab("Devices").unwrap().entries().is_empty());
        assert!(profiler.is_empty());
    }

    #[test]
    fn test_values_outside_a_tab_are_dropped() {
        let mut profiler = Profiler::new();
        profiler.add("Orphan", 1);
        assert!(profiler.is_empty());
        assert_eq!(profiler.tabs().count(), 0);
    }
}
