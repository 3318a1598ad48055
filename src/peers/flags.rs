//! Named boolean condition flags
//!
//! Flags are namespaced per endpoint: `cluster.available`,
//! `endpoint.cluster.changed.unit-clustered`, and so on.

use crate::peers::unit::RECOGNIZED_ATTRIBUTES;
use std::collections::BTreeSet;

/// Store for condition flags. Set and clear are idempotent.
pub trait FlagStore {
    fn set_flag(&mut self, name: &str);

    fn clear_flag(&mut self, name: &str);

    fn is_flag_set(&self, name: &str) -> bool;

    fn all_flags_set(&self, names: &[String]) -> bool {
        names.iter().all(|name| self.is_flag_set(name))
    }

    /// Currently set flags, sorted
    fn active_flags(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFlagStore {
    flags: BTreeSet<String>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn set_flag(&mut self, name: &str) {
        if self.flags.insert(name.to_string()) {
            tracing::trace!(flag = name, "flag set");
        }
    }

    fn clear_flag(&mut self, name: &str) {
        if self.flags.remove(name) {
            tracing::trace!(flag = name, "flag cleared");
        }
    }

    fn is_flag_set(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    fn active_flags(&self) -> Vec<String> {
        self.flags.iter().cloned().collect()
    }
}

/// Flag names expanded for one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagNames {
    pub connected: String,
    pub available: String,
    pub clustered: String,
    /// Settle markers, one per recognized attribute
    pub changed: Vec<String>,
}

impl FlagNames {
    pub fn new(endpoint_name: &str) -> Self {
        Self {
            connected: format!("{}.connected", endpoint_name),
            available: format!("{}.available", endpoint_name),
            clustered: format!("{}.clustered", endpoint_name),
            changed: RECOGNIZED_ATTRIBUTES
                .iter()
                .map(|attr| changed_marker(endpoint_name, attr))
                .collect(),
        }
    }
}

/// Marker the host raises when a peer updates `attribute`
pub fn changed_marker(endpoint_name: &str, attribute: &str) -> String {
    format!("endpoint.{}.changed.{}", endpoint_name, attribute)
}
