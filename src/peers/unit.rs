//! Peer units and the attributes they publish

use crate::common::utils::{attribute_text, decode_attribute, is_truthy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const CLUSTER_ADDRESS: &str = "cluster-address";
pub const CLUSTER_USER: &str = "cluster-user";
pub const CLUSTER_PASSWORD: &str = "cluster-password";
pub const UNIT_CONFIGURE_READY: &str = "unit-configure-ready";
pub const UNIT_CLUSTERED: &str = "unit-clustered";
pub const INGRESS_ADDRESS: &str = "ingress-address";
pub const PRIVATE_ADDRESS: &str = "private-address";

/// Attributes the quorum logic understands, in settle-marker order
pub const RECOGNIZED_ATTRIBUTES: [&str; 5] = [
    CLUSTER_ADDRESS,
    CLUSTER_USER,
    CLUSTER_PASSWORD,
    UNIT_CONFIGURE_READY,
    UNIT_CLUSTERED,
];

/// Relation-scoped unit name, e.g. `mysql-innodb-cluster/1`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Decoded view of what a peer has published so far.
///
/// Every field starts absent; evaluation treats absent and falsy alike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerData {
    pub cluster_address: Option<String>,
    pub cluster_user: Option<String>,
    pub cluster_password: Option<String>,
    pub unit_configure_ready: Option<bool>,
    pub unit_clustered: Option<bool>,
}

impl PeerData {
    /// Decode the recognized keys out of a raw attribute bag
    pub fn from_attributes(attributes: &BTreeMap<String, String>) -> Self {
        // credentials count only when truthy, whatever their JSON type
        let text = |key: &str| {
            attributes
                .get(key)
                .map(|raw| decode_attribute(raw))
                .filter(is_truthy)
                .map(attribute_text)
        };
        let flag = |key: &str| attributes.get(key).map(|raw| is_truthy(&decode_attribute(raw)));

        Self {
            cluster_address: text(CLUSTER_ADDRESS),
            cluster_user: text(CLUSTER_USER),
            cluster_password: text(CLUSTER_PASSWORD),
            unit_configure_ready: flag(UNIT_CONFIGURE_READY),
            unit_clustered: flag(UNIT_CLUSTERED),
        }
    }

    /// All three connection credentials present and truthy
    pub fn has_connection_info(&self) -> bool {
        self.cluster_address.is_some()
            && self.cluster_user.is_some()
            && self.cluster_password.is_some()
    }

    pub fn is_clustered(&self) -> bool {
        self.unit_clustered.unwrap_or(false)
    }
}

/// A single joined peer and the attributes last received from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerUnit {
    id: UnitId,
    attributes: BTreeMap<String, String>,
    data: PeerData,
}

impl PeerUnit {
    pub fn new(id: UnitId) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
            data: PeerData::default(),
        }
    }

    pub fn with_attributes(id: UnitId, attributes: BTreeMap<String, String>) -> Self {
        let mut unit = Self::new(id);
        unit.update(attributes);
        unit
    }

    pub fn id(&self) -> &UnitId {
        &self.id
    }

    pub fn received(&self) -> &PeerData {
        &self.data
    }

    /// Raw attribute by name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Replace the attribute bag with a fresh snapshot from the peer.
    ///
    /// Returns the keys that were added, removed or changed value.
    pub fn update(&mut self, attributes: BTreeMap<String, String>) -> Vec<String> {
        let mut changed: Vec<String> = attributes
            .iter()
            .filter(|(k, v)| self.attributes.get(*k) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect();
        changed.extend(
            self.attributes
                .keys()
                .filter(|k| !attributes.contains_key(*k))
                .cloned(),
        );
        changed.sort();

        self.data = PeerData::from_attributes(&attributes);
        self.attributes = attributes;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_partial_attributes_decode_as_absent() {
        let data = PeerData::from_attributes(&attrs(&[(CLUSTER_ADDRESS, "\"10.5.0.21\"")]));
        assert_eq!(data.cluster_address.as_deref(), Some("10.5.0.21"));
        assert!(data.cluster_user.is_none());
        assert!(data.unit_clustered.is_none());
        assert!(!data.has_connection_info());
        assert!(!data.is_clustered());
    }

    #[test]
    fn test_full_connection_info() {
        let data = PeerData::from_attributes(&attrs(&[
            (CLUSTER_ADDRESS, "\"10.5.0.21\""),
            (CLUSTER_USER, "\"user\""),
            (CLUSTER_PASSWORD, "\"pw\""),
        ]));
        assert!(data.has_connection_info());
    }

    #[test]
    fn test_null_and_empty_credentials() {
        let data = PeerData::from_attributes(&attrs(&[
            (CLUSTER_ADDRESS, "\"10.5.0.26\""),
            (CLUSTER_USER, "null"),
            (CLUSTER_PASSWORD, "\"\""),
        ]));
        assert!(data.cluster_user.is_none());
        assert!(data.cluster_password.is_none());
        assert!(!data.has_connection_info());
    }

    #[test]
    fn test_credentials_follow_truthiness() {
        let with_password = |raw: &str| {
            PeerData::from_attributes(&attrs(&[
                (CLUSTER_ADDRESS, "\"10.5.0.21\""),
                (CLUSTER_USER, "\"user\""),
                (CLUSTER_PASSWORD, raw),
            ]))
        };

        let zero = with_password("0");
        assert!(zero.cluster_password.is_none());
        assert!(!zero.has_connection_info());

        let bool_true = with_password("true");
        assert_eq!(bool_true.cluster_password.as_deref(), Some("true"));
        assert!(bool_true.has_connection_info());

        let string_true = with_password("\"true\"");
        assert_eq!(string_true.cluster_password.as_deref(), Some("true"));
        assert!(string_true.has_connection_info());

        let numeric = with_password("1234");
        assert_eq!(numeric.cluster_password.as_deref(), Some("1234"));
        assert!(numeric.has_connection_info());

        assert!(!with_password("false").has_connection_info());
        assert!(!with_password("[]").has_connection_info());
    }

    #[test]
    fn test_clustered_truthiness() {
        let yes = PeerData::from_attributes(&attrs(&[(UNIT_CLUSTERED, "true")]));
        let null = PeerData::from_attributes(&attrs(&[(UNIT_CLUSTERED, "null")]));
        let no = PeerData::from_attributes(&attrs(&[(UNIT_CLUSTERED, "false")]));
        assert!(yes.is_clustered());
        assert_eq!(null.unit_clustered, Some(false));
        assert!(!null.is_clustered());
        assert!(!no.is_clustered());
    }

    #[test]
    fn test_update_reports_changed_keys() {
        let mut unit = PeerUnit::new(UnitId::from("mysql/1"));
        let changed = unit.update(attrs(&[(CLUSTER_ADDRESS, "\"a\""), (CLUSTER_USER, "\"u\"")]));
        assert_eq!(changed, vec![CLUSTER_ADDRESS.to_string(), CLUSTER_USER.to_string()]);

        let changed = unit.update(attrs(&[(CLUSTER_ADDRESS, "\"a\""), (UNIT_CLUSTERED, "true")]));
        assert_eq!(
            changed,
            vec![CLUSTER_USER.to_string(), UNIT_CLUSTERED.to_string()]
        );
        assert!(unit.received().is_clustered());
        assert_eq!(unit.get(CLUSTER_ADDRESS), Some("\"a\""));
        assert_eq!(unit.get(CLUSTER_USER), None);
    }
}
