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

//! Lifecycle phases and the flag set a module uses to opt into them.

use std::fmt;

/// A named point in the frame lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Runs once per module, before any update.
    Init,
    /// First update pass of every frame.
    PreUpdate,
    /// Second update pass of every frame.
    PostUpdate,
    /// Diagnostics pass; read-only.
    Profile,
    /// Runs once per module at teardown, in reverse order.
    Dispose,
}

impl Phase {
    /// Every phase, in lifecycle order.
    pub const ALL: [Phase; 5] = [
        Phase::Init,
        Phase::PreUpdate,
        Phase::PostUpdate,
        Phase::Profile,
        Phase::Dispose,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Init => write!(f, "Init"),
            Phase::PreUpdate => write!(f, "PreUpdate"),
            Phase::PostUpdate => write!(f, "PostUpdate"),
            Phase::Profile => write!(f, "Profile"),
            Phase::Dispose => write!(f, "Dispose"),
        }
    }
}

/// Flags representing which phases a module participates in.
///
/// Multiple phases can be combined using bitwise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseSet {
    bits: u8,
}

impl PhaseSet {
    /// No phases.
    pub const NONE: Self = Self { bits: 0 };
    /// The init phase.
    pub const INIT: Self = Self { bits: 1 << 0 };
    /// The pre-update phase.
    pub const PRE_UPDATE: Self = Self { bits: 1 << 1 };
    /// The post-update phase.
    pub const POST_UPDATE: Self = Self { bits: 1 << 2 };
    /// The profile phase.
    pub const PROFILE: Self = Self { bits: 1 << 3 };
    /// The dispose phase.
    pub const DISPOSE: Self = Self { bits: 1 << 4 };
    /// Init, pre-update and dispose: what most modules need.
    pub const STANDARD: Self = Self {
        bits: Self::INIT.bits | Self::PRE_UPDATE.bits | Self::DISPOSE.bits,
    };
    /// All phases.
    pub const ALL: Self = Self {
        bits: Self::STANDARD.bits | Self::POST_UPDATE.bits | Self::PROFILE.bits,
    };

    /// Creates flags from a single phase.
    pub const fn from_phase(phase: Phase) -> Self {
        match phase {
            Phase::Init => Self::INIT,
            Phase::PreUpdate => Self::PRE_UPDATE,
            Phase::PostUpdate => Self::POST_UPDATE,
            Phase::Profile => Self::PROFILE,
            Phase::Dispose => Self::DISPOSE,
        }
    }

    /// Returns the raw bits.
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// Combines two sets of flags.
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Returns a copy of these flags without `other`.
    pub const fn without(self, other: Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Checks if these flags contain a specific phase.
    pub const fn contains(&self, phase: Phase) -> bool {
        let phase_bits = Self::from_phase(phase).bits;
        (self.bits & phase_bits) == phase_bits
    }

    /// Checks if these flags are empty (no phases).
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterates over the contained phases in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = Phase> + '_ {
        Phase::ALL.into_iter().filter(|phase| self.contains(*phase))
    }
}

impl Default for PhaseSet {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl From<Phase> for PhaseSet {
    fn from(phase: Phase) -> Self {
        Self::from_phase(phase)
    }
}

impl std::ops::BitOr for PhaseSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for PhaseSet {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for PhaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|phase| phase.to_string()).collect();
        write!(f, "{}", names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_phases_in_order() {
        let set = PhaseSet::DISPOSE | PhaseSet::INIT | PhaseSet::PROFILE;
        assert_eq!(set.to_string(), "Init|Profile|Dispose");
        assert_eq!(PhaseSet::NONE.to_string(), "");
    }

    #[test]
    fn test_standard_set() {
        let set = PhaseSet::STANDARD;
        assert!(set.contains(Phase::Init));
        assert!(set.contains(Phase::PreUpdate));
        assert!(set.contains(Phase::Dispose));
        assert!(!set.contains(Phase::PostUpdate));
        assert!(!set.contains(Phase::Profile));
    }

    #[test]
    fn test_union_and_without() {
        let set = PhaseSet::INIT | PhaseSet::PROFILE;
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Phase::Init, Phase::Profile]
        );
        assert!(set.without(PhaseSet::PROFILE).contains(Phase::Init));
        assert!(!set.without(PhaseSet::PROFILE).contains(Phase::Profile));
        assert!(PhaseSet::NONE.is_empty());
        assert_eq!(PhaseSet::ALL.iter().count(), 5);
    }
}
