//! The peer relation: joined units plus this unit's outbound data

use crate::peers::unit::{PeerUnit, UnitId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Relation identifier, e.g. `cluster:19`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(pub String);

impl RelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRelation {
    id: RelationId,
    units: BTreeMap<UnitId, PeerUnit>,
    to_publish: BTreeMap<String, String>,
}

impl PeerRelation {
    pub fn new(id: RelationId) -> Self {
        Self {
            id,
            units: BTreeMap::new(),
            to_publish: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &RelationId {
        &self.id
    }

    // === Membership ===

    /// Add a unit; a unit that is already joined keeps its attributes
    pub fn join(&mut self, id: UnitId) -> &mut PeerUnit {
        self.units
            .entry(id.clone())
            .or_insert_with(|| PeerUnit::new(id))
    }

    pub fn depart(&mut self, id: &UnitId) -> Option<PeerUnit> {
        self.units.remove(id)
    }

    pub fn unit(&self, id: &UnitId) -> Option<&PeerUnit> {
        self.units.get(id)
    }

    pub fn unit_mut(&mut self, id: &UnitId) -> Option<&mut PeerUnit> {
        self.units.get_mut(id)
    }

    pub fn units(&self) -> impl Iterator<Item = &PeerUnit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    // === Outbound data ===

    /// Publish a JSON-encoded value to every peer
    pub fn publish(&mut self, key: &str, value: impl Into<Value>) {
        self.to_publish.insert(key.to_string(), value.into().to_string());
    }

    /// Publish a value verbatim (addresses are not JSON encoded)
    pub fn publish_raw(&mut self, key: &str, value: impl Into<String>) {
        self.to_publish.insert(key.to_string(), value.into());
    }

    pub fn published(&self, key: &str) -> Option<&str> {
        self.to_publish.get(key).map(String::as_str)
    }

    pub fn to_publish(&self) -> &BTreeMap<String, String> {
        &self.to_publish
    }
}
