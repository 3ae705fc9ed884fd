// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types for jobs, tasks, and namespaces.
//!
//! Jobs and tasks are identified by the small sequential integers the wire
//! protocol carries (spec.md §3); namespaces are identified by the string
//! the client chose when registering the backend. None of these are
//! randomly generated — job/task ids are assigned by the registries that
//! own them, namespace ids are supplied by the caller.

use std::fmt;

macro_rules! define_int_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident(u32);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// The sentinel value used where "no id" needs to be represented
            /// without an `Option` (e.g. a task record before submission).
            pub const INVALID: Self = Self(0);

            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u32 {
                self.0
            }

            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

define_int_id! {
    /// Identifies a registered job. Assigned by the caller at registration
    /// time (spec.md §3: "a job id is supplied by the scheduler, not
    /// generated by the daemon").
    pub struct JobId(u32);
}

define_int_id! {
    /// Identifies a submitted task. Assigned by `TaskManager` from a
    /// monotonic counter starting at 1; `TaskId::INVALID` never appears as
    /// a live task.
    pub struct TaskId(u32);
}

/// Identifies a registered storage backend (namespace). Namespace ids are
/// caller-supplied short strings (e.g. `"nvm0"`, `"lustre-scratch"`), not
/// generated, so this wraps an owned `String` rather than a fixed-width
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NamespaceId(String);

impl NamespaceId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NamespaceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for NamespaceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for NamespaceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for NamespaceId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
