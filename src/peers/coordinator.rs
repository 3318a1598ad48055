//! Membership coordinator
//!
//! Reacts to peer lifecycle events and keeps the `connected`, `available`
//! and `clustered` flags in line with the current peer snapshot. Every
//! event recomputes from scratch; nothing accumulates between events, so
//! replaying an event against the same snapshot yields the same flags.
//!
//! `joined` and `departed`/`broken` never touch `clustered`: clustering is
//! announced by peers and only a `changed` event re-derives it.

use crate::peers::endpoint::PeerEndpoint;
use crate::peers::flags::{FlagNames, FlagStore, MemoryFlagStore};
use crate::peers::relation::RelationId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle events delivered by the host runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerEvent {
    /// A peer attached to this unit's relation
    Joined,
    /// One or more peers updated their published attributes
    Changed,
    /// A peer left
    Departed,
    /// The whole peer relation is being torn down
    Broken,
}

impl fmt::Display for PeerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerEvent::Joined => write!(f, "joined"),
            PeerEvent::Changed => write!(f, "changed"),
            PeerEvent::Departed => write!(f, "departed"),
            PeerEvent::Broken => write!(f, "broken"),
        }
    }
}

/// Point-in-time view of the three condition flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSnapshot {
    pub connected: bool,
    pub available: bool,
    pub clustered: bool,
}

pub struct MembershipCoordinator<F: FlagStore = MemoryFlagStore> {
    endpoint: PeerEndpoint,
    flags: F,
    names: FlagNames,
}

impl MembershipCoordinator<MemoryFlagStore> {
    pub fn new(endpoint: PeerEndpoint) -> Self {
        Self::with_flag_store(endpoint, MemoryFlagStore::new())
    }
}

impl<F: FlagStore> MembershipCoordinator<F> {
    pub fn with_flag_store(endpoint: PeerEndpoint, flags: F) -> Self {
        let names = FlagNames::new(endpoint.name());
        Self {
            endpoint,
            flags,
            names,
        }
    }

    pub fn endpoint(&self) -> &PeerEndpoint {
        &self.endpoint
    }

    pub fn endpoint_mut(&mut self) -> &mut PeerEndpoint {
        &mut self.endpoint
    }

    pub fn flags(&self) -> &F {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut F {
        &mut self.flags
    }

    pub fn flag_names(&self) -> &FlagNames {
        &self.names
    }

    pub fn relation_ids(&self) -> Vec<RelationId> {
        self.endpoint.relation_ids()
    }

    // === Event dispatch ===

    pub fn handle(&mut self, event: PeerEvent) {
        tracing::debug!(endpoint = self.endpoint.name(), %event, "handling peer event");
        match event {
            PeerEvent::Joined => self.joined(),
            PeerEvent::Changed => self.changed(),
            PeerEvent::Departed | PeerEvent::Broken => self.departed(),
        }
    }

    fn joined(&mut self) {
        self.endpoint.set_ingress_address();
        self.flags.set_flag(&self.names.connected);
        self.update_available();
    }

    fn changed(&mut self) {
        // Acknowledge a fully settled round of updates
        if self.flags.all_flags_set(&self.names.changed) {
            for marker in &self.names.changed {
                self.flags.clear_flag(marker);
            }
        }

        self.update_available();
        self.update_clustered();
    }

    fn departed(&mut self) {
        self.flags.clear_flag(&self.names.connected);
        self.flags.clear_flag(&self.names.available);
    }

    fn update_available(&mut self) {
        let available = self.endpoint.available();
        Self::toggle(&mut self.flags, &self.names.available, available);
    }

    fn update_clustered(&mut self) {
        let clustered = self.endpoint.clustered();
        Self::toggle(&mut self.flags, &self.names.clustered, clustered);
    }

    fn toggle(flags: &mut F, name: &str, value: bool) {
        if value {
            flags.set_flag(name);
        } else {
            flags.clear_flag(name);
        }
    }

    // === Queries ===

    pub fn is_connected(&self) -> bool {
        self.flags.is_flag_set(&self.names.connected)
    }

    pub fn is_available(&self) -> bool {
        self.flags.is_flag_set(&self.names.available)
    }

    pub fn is_clustered(&self) -> bool {
        self.flags.is_flag_set(&self.names.clustered)
    }

    pub fn snapshot(&self) -> FlagSnapshot {
        FlagSnapshot {
            connected: self.is_connected(),
            available: self.is_available(),
            clustered: self.is_clustered(),
        }
    }

    // === Publishing ===

    pub fn set_cluster_connection_info(
        &mut self,
        cluster_address: &str,
        cluster_user: &str,
        cluster_password: &str,
    ) {
        self.endpoint
            .set_cluster_connection_info(cluster_address, cluster_user, cluster_password);
    }

    pub fn set_unit_configure_ready(&mut self) {
        self.endpoint.set_unit_configure_ready();
    }

    pub fn set_unit_clustered(&mut self) {
        self.endpoint.set_unit_clustered();
    }
}
