//! # cluster-peers
//!
//! Peer membership tracking for bootstrapping a MySQL InnoDB Cluster
//! (three members or more):
//! - Tracks which peers joined the peer relation and what they published
//! - Publishes this unit's address, cluster credentials and readiness
//! - Derives `available` (every peer shared credentials) and `clustered`
//!   (every peer joined the database cluster) once quorum is present
//!
//! ## Architecture
//!
//! ```text
//!  host runtime ──RelationMessage──► PeerRuntime (tokio mpsc loop)
//!                                        │ membership + settle markers
//!                                        ▼
//!                              MembershipCoordinator ──► FlagStore
//!                                        │                connected
//!                                        ▼                available
//!                       PeerEndpoint ─► QuorumEvaluator   clustered
//!                       (0..1 PeerRelation)
//! ```
//!
//! ## Usage
//!
//! ### Replay a recorded scenario
//! ```bash
//! peerctl replay --scenario ./bootstrap.json --ingress-address 10.0.0.5
//! ```
//!
//! ### Evaluate a peer snapshot
//! ```bash
//! peerctl evaluate --units ./units.json
//! ```

pub mod common;
pub mod peers;

// Re-export commonly used types
pub use common::{Config, Error, Result};
pub use peers::{MembershipCoordinator, PeerEndpoint, PeerEvent, PeerRuntime};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build info
pub const BUILD_INFO: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARGO_PKG_NAME"), ")");
