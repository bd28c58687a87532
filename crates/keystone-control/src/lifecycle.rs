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

//! Framework lifecycle state.

use keystone_core::FrameworkError;
use std::fmt;

/// The coarse lifecycle of a framework instance.
///
/// Transitions only move forward: `Configuring -> Running -> Halted ->
/// Disposed`, where `Halted` may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameworkState {
    /// Modules and capabilities are being registered.
    #[default]
    Configuring,
    /// Init has completed; frames are being dispatched.
    Running,
    /// A fatal callback failure stopped the frame loop.
    Halted,
    /// The dispose sweep has run.
    Disposed,
}

impl FrameworkState {
    /// Lower-case name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            FrameworkState::Configuring => "configuring",
            FrameworkState::Running => "running",
            FrameworkState::Halted => "halted",
            FrameworkState::Disposed => "disposed",
        }
    }

    /// Returns `true` if moving from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: FrameworkState) -> bool {
        use FrameworkState::*;
        matches!(
            (self, next),
            (Configuring, Running)
                | (Configuring, Halted)
                | (Running, Halted)
                | (Configuring | Running | Halted, Disposed)
        )
    }

    /// Fails with [`FrameworkError::InvalidState`] unless `self` is one of
    /// `allowed`.
    pub fn require(
        &self,
        allowed: &[FrameworkState],
        operation: &'static str,
    ) -> Result<(), FrameworkError> {
        if allowed.contains(self) {
            Ok(())
        } else {
            Err(FrameworkError::InvalidState {
                state: self.name(),
                operation,
            })
        }
    }
}

impl fmt::Display for FrameworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(FrameworkState::Configuring.can_transition_to(FrameworkState::Running));
        assert!(FrameworkState::Running.can_transition_to(FrameworkState::Halted));
        assert!(FrameworkState::Running.can_transition_to(FrameworkState::Disposed));
        assert!(FrameworkState::Halted.can_transition_to(FrameworkState::Disposed));
    }

    #[test]
    fn test_backward_transitions_are_rejected() {
        assert!(!FrameworkState::Running.can_transition_to(FrameworkState::Configuring));
        assert!(!FrameworkState::Halted.can_transition_to(FrameworkState::Running));
        assert!(!FrameworkState::Disposed.can_transition_to(FrameworkState::Running));
        assert!(!FrameworkState::Disposed.can_transition_to(FrameworkState::Disposed));
    }

    #[test]
    fn test_require_reports_state_and_operation() {
        let err = FrameworkState::Halted
            .require(&[FrameworkState::Running], "tick")
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot tick while the framework is halted");
        assert!(FrameworkState::Running
            .require(&[FrameworkState::Running], "tick")
            .is_ok());
    }
}
