//! Peer endpoint: the single peer relation of this unit
//!
//! The endpoint holds zero or one `PeerRelation`. The relation is looked up
//! on every call so nothing outlives a teardown, and every publish
//! operation degrades to a logged no-op when no relation is active.

use crate::common::{local_route_address, Config, Error, Result};
use crate::peers::quorum::QuorumEvaluator;
use crate::peers::relation::{PeerRelation, RelationId};
use crate::peers::unit::{
    PeerUnit, CLUSTER_ADDRESS, CLUSTER_PASSWORD, CLUSTER_USER, INGRESS_ADDRESS, PRIVATE_ADDRESS,
    UNIT_CLUSTERED, UNIT_CONFIGURE_READY,
};
use std::net::IpAddr;

/// Resolves the address this unit advertises on the peer network
pub trait AddressResolver {
    fn relation_ip(&self, endpoint_name: &str) -> Result<IpAddr>;
}

/// Fixed address, typically from configuration
#[derive(Debug, Clone, Copy)]
pub struct StaticAddress(pub IpAddr);

impl AddressResolver for StaticAddress {
    fn relation_ip(&self, _endpoint_name: &str) -> Result<IpAddr> {
        Ok(self.0)
    }
}

/// Address of the interface holding the default route
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteAddress;

impl AddressResolver for RouteAddress {
    fn relation_ip(&self, endpoint_name: &str) -> Result<IpAddr> {
        let addr = local_route_address()?;
        tracing::debug!("Resolved {} ingress address: {}", endpoint_name, addr);
        Ok(addr)
    }
}

#[derive(Debug, Clone)]
pub struct PeerEndpoint {
    name: String,
    ingress_address: IpAddr,
    evaluator: QuorumEvaluator,
    relations: Vec<PeerRelation>,
}

impl PeerEndpoint {
    pub fn new(
        name: impl Into<String>,
        minimum_cluster_size: usize,
        resolver: &dyn AddressResolver,
    ) -> Result<Self> {
        let name = name.into();
        let ingress_address = resolver.relation_ip(&name)?;
        Ok(Self {
            name,
            ingress_address,
            evaluator: QuorumEvaluator::new(minimum_cluster_size),
            relations: Vec::new(),
        })
    }

    /// Build from configuration, falling back to the route address when no
    /// ingress address is configured
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        match config.ingress_address {
            Some(addr) => Self::new(
                &config.endpoint_name,
                config.minimum_cluster_size,
                &StaticAddress(addr),
            ),
            None => Self::new(
                &config.endpoint_name,
                config.minimum_cluster_size,
                &RouteAddress,
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ingress_address(&self) -> IpAddr {
        self.ingress_address
    }

    pub fn evaluator(&self) -> &QuorumEvaluator {
        &self.evaluator
    }

    // === Relation lifecycle ===

    pub fn attach_relation(&mut self, id: RelationId) -> Result<&mut PeerRelation> {
        if let Some(existing) = self.relations.first() {
            return Err(Error::RelationExists(existing.id().to_string()));
        }
        tracing::info!("Peer relation {} established on {}", id, self.name);
        self.relations.push(PeerRelation::new(id));
        Ok(&mut self.relations[0])
    }

    pub fn detach_relation(&mut self) -> Option<PeerRelation> {
        let relation = self.relations.pop();
        if let Some(rel) = &relation {
            tracing::info!("Peer relation {} removed from {}", rel.id(), self.name);
        }
        relation
    }

    pub fn relation_ids(&self) -> Vec<RelationId> {
        self.relations.iter().map(|r| r.id().clone()).collect()
    }

    /// Only one relation exists on a peer endpoint
    pub fn peer_relation(&self) -> Option<&PeerRelation> {
        self.relations.first()
    }

    pub fn peer_relation_mut(&mut self) -> Option<&mut PeerRelation> {
        self.relations.first_mut()
    }

    pub fn all_joined_units(&self) -> Vec<&PeerUnit> {
        self.relations.iter().flat_map(|r| r.units()).collect()
    }

    // === Conditions ===

    pub fn available(&self) -> bool {
        self.evaluator.is_available(&self.all_joined_units())
    }

    pub fn clustered(&self) -> bool {
        self.evaluator.is_clustered(&self.all_joined_units())
    }

    // === Publishing ===

    fn relation_for_publish(&mut self, what: &str) -> Option<&mut PeerRelation> {
        if self.relations.is_empty() {
            tracing::warn!(
                "No peer relation on {}, not publishing {}",
                self.name,
                what
            );
        }
        self.relations.first_mut()
    }

    /// Advertise this unit's address as both ingress and private address
    pub fn set_ingress_address(&mut self) {
        let address = self.ingress_address.to_string();
        for relation in &mut self.relations {
            relation.publish_raw(INGRESS_ADDRESS, address.clone());
            relation.publish_raw(PRIVATE_ADDRESS, address.clone());
        }
    }

    /// Send cluster connection information to peers
    pub fn set_cluster_connection_info(
        &mut self,
        cluster_address: &str,
        cluster_user: &str,
        cluster_password: &str,
    ) {
        if let Some(relation) = self.relation_for_publish("cluster connection info") {
            relation.publish(CLUSTER_ADDRESS, cluster_address);
            relation.publish(CLUSTER_USER, cluster_user);
            relation.publish(CLUSTER_PASSWORD, cluster_password);
        }
    }

    /// Tell peers this unit is ready for configuration
    pub fn set_unit_configure_ready(&mut self) {
        if let Some(relation) = self.relation_for_publish(UNIT_CONFIGURE_READY) {
            relation.publish(UNIT_CONFIGURE_READY, true);
        }
    }

    /// Tell peers this unit has joined the database cluster
    pub fn set_unit_clustered(&mut self) {
        if let Some(relation) = self.relation_for_publish(UNIT_CLUSTERED) {
            relation.publish(UNIT_CLUSTERED, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peers::unit::UnitId;

    struct Unreachable;

    impl AddressResolver for Unreachable {
        fn relation_ip(&self, _endpoint_name: &str) -> Result<IpAddr> {
            Err(Error::AddressResolution("network down".into()))
        }
    }

    fn endpoint() -> PeerEndpoint {
        let resolver = StaticAddress("10.10.10.10".parse().unwrap());
        PeerEndpoint::new("ep", 3, &resolver).unwrap()
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            endpoint_name: "db-peers".into(),
            ingress_address: Some("192.168.1.5".parse().unwrap()),
            ..Default::default()
        };
        let ep = PeerEndpoint::from_config(&config).unwrap();
        assert_eq!(ep.name(), "db-peers");
        assert_eq!(ep.ingress_address().to_string(), "192.168.1.5");
        assert_eq!(ep.evaluator().minimum_cluster_size(), 3);

        let bad = Config {
            minimum_cluster_size: 1,
            ..config
        };
        assert!(PeerEndpoint::from_config(&bad).is_err());
    }

    #[test]
    fn test_resolution_failure_is_fatal() {
        let result = PeerEndpoint::new("ep", 3, &Unreachable);
        assert!(matches!(result, Err(Error::AddressResolution(_))));
    }

    #[test]
    fn test_relation_ids() {
        let mut ep = endpoint();
        assert!(ep.relation_ids().is_empty());

        ep.attach_relation(RelationId::from("cluster:19")).unwrap();
        assert_eq!(ep.relation_ids(), vec![RelationId::from("cluster:19")]);

        let err = ep.attach_relation(RelationId::from("cluster:20")).unwrap_err();
        assert!(matches!(err, Error::RelationExists(id) if id == "cluster:19"));

        ep.detach_relation();
        assert!(ep.relation_ids().is_empty());
    }

    #[test]
    fn test_set_ingress_address() {
        let mut ep = endpoint();
        ep.attach_relation(RelationId::from("cluster:19")).unwrap();
        ep.set_ingress_address();

        let rel = ep.peer_relation().unwrap();
        assert_eq!(rel.published(INGRESS_ADDRESS), Some("10.10.10.10"));
        assert_eq!(rel.published(PRIVATE_ADDRESS), Some("10.10.10.10"));
    }

    #[test]
    fn test_set_cluster_connection_info() {
        let mut ep = endpoint();
        ep.attach_relation(RelationId::from("cluster:19")).unwrap();
        ep.set_cluster_connection_info("10.10.10.10", "fakeuser", "fakepassword");

        let rel = ep.peer_relation().unwrap();
        assert_eq!(rel.published(CLUSTER_ADDRESS), Some("\"10.10.10.10\""));
        assert_eq!(rel.published(CLUSTER_USER), Some("\"fakeuser\""));
        assert_eq!(rel.published(CLUSTER_PASSWORD), Some("\"fakepassword\""));
    }

    #[test]
    fn test_readiness_flags() {
        let mut ep = endpoint();
        ep.attach_relation(RelationId::from("cluster:19")).unwrap();
        ep.set_unit_configure_ready();
        ep.set_unit_clustered();

        let rel = ep.peer_relation().unwrap();
        assert_eq!(rel.published(UNIT_CONFIGURE_READY), Some("true"));
        assert_eq!(rel.published(UNIT_CLUSTERED), Some("true"));
    }

    #[test]
    fn test_publish_without_relation_is_noop() {
        let mut ep = endpoint();
        ep.set_ingress_address();
        ep.set_cluster_connection_info("a", "u", "p");
        ep.set_unit_configure_ready();
        ep.set_unit_clustered();
        assert!(ep.peer_relation().is_none());
    }

    #[test]
    fn test_all_joined_units() {
        let mut ep = endpoint();
        assert!(ep.all_joined_units().is_empty());
        let rel = ep.attach_relation(RelationId::from("cluster:19")).unwrap();
        rel.join(UnitId::from("mysql/1"));
        rel.join(UnitId::from("mysql/2"));
        assert_eq!(ep.all_joined_units().len(), 2);
        assert!(!ep.available());
        assert!(!ep.clustered());
    }
}
