//! Peer relation handling for cluster bootstrap
//!
//! - Unit and relation model (what each peer has published)
//! - Quorum evaluation (available / clustered)
//! - Condition flags, namespaced per endpoint
//! - Membership coordinator reacting to joined/changed/departed/broken
//! - Event loop fed by the host runtime

pub mod coordinator;
pub mod endpoint;
pub mod flags;
pub mod quorum;
pub mod relation;
pub mod runtime;
pub mod unit;

pub use coordinator::{FlagSnapshot, MembershipCoordinator, PeerEvent};
pub use endpoint::{AddressResolver, PeerEndpoint, RouteAddress, StaticAddress};
pub use flags::{FlagNames, FlagStore, MemoryFlagStore};
pub use quorum::QuorumEvaluator;
pub use relation::{PeerRelation, RelationId};
pub use runtime::{PeerRuntime, RelationMessage};
pub use unit::{PeerData, PeerUnit, UnitId};
