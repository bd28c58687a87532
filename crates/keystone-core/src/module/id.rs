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

//! Type-derived module identities.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a module, derived from its Rust type.
///
/// Two identities are equal if and only if they were created from the same
/// type. The short type name is kept alongside for logs and error messages.
#[derive(Clone, Copy)]
pub struct ModuleId {
    type_id: TypeId,
    name: &'static str,
}

impl ModuleId {
    /// Returns the identity of the module type `M`.
    pub fn of<M: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            name: short_type_name(std::any::type_name::<M>()),
        }
    }

    /// The short type name of the module (e.g. `Display`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The underlying [`TypeId`].
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// Strips the module path from a type name, leaving generic arguments intact.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

impl PartialEq for ModuleId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ModuleId {}

impl Hash for ModuleId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl PartialOrd for ModuleId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.type_id.cmp(&other.type_id))
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.name)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Logger;
    struct Wrapper<T>(T);

    mod nested {
        pub struct Logger;
    }

    #[test]
    fn test_identity_follows_type() {
        assert_eq!(ModuleId::of::<Logger>(), ModuleId::of::<Logger>());
        assert_ne!(ModuleId::of::<Logger>(), ModuleId::of::<nested::Logger>());
    }

    #[test]
    fn test_short_names() {
        assert_eq!(ModuleId::of::<Logger>().name(), "Logger");
        assert_eq!(ModuleId::of::<nested::Logger>().to_string(), "Logger");
        assert!(ModuleId::of::<Wrapper<Logger>>().name().starts_with("Wrapper<"));
    }
}
