//! Cluster-wide conditions derived from the joined peer set
//!
//! Both checks are fail-closed: once quorum is present, every joined peer
//! must report, not just a majority of them.

use crate::common::MINIMUM_CLUSTER_SIZE;
use crate::peers::unit::PeerUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumEvaluator {
    minimum_cluster_size: usize,
}

impl Default for QuorumEvaluator {
    fn default() -> Self {
        Self::new(MINIMUM_CLUSTER_SIZE)
    }
}

impl QuorumEvaluator {
    pub fn new(minimum_cluster_size: usize) -> Self {
        Self {
            minimum_cluster_size,
        }
    }

    pub fn minimum_cluster_size(&self) -> usize {
        self.minimum_cluster_size
    }

    /// Other units needed besides this one
    pub fn required_peers(&self) -> usize {
        self.minimum_cluster_size.saturating_sub(1)
    }

    pub fn has_quorum(&self, peer_count: usize) -> bool {
        peer_count > 0 && peer_count >= self.required_peers()
    }

    /// Every joined peer has published address, user and password
    pub fn is_available(&self, units: &[&PeerUnit]) -> bool {
        self.has_quorum(units.len()) && units.iter().all(|u| u.received().has_connection_info())
    }

    /// Every joined peer reports itself clustered
    pub fn is_clustered(&self, units: &[&PeerUnit]) -> bool {
        self.has_quorum(units.len()) && units.iter().all(|u| u.received().is_clustered())
    }
}
