//! Host runtime plumbing
//!
//! Turns raw relation messages into membership changes plus one
//! `PeerEvent` each, and drives the coordinator from a tokio channel.
//! Messages are applied strictly in delivery order, one at a time.

use crate::common::{attribute_text, Error, Result};
use crate::peers::coordinator::{FlagSnapshot, MembershipCoordinator, PeerEvent};
use crate::peers::flags::{changed_marker, FlagStore, MemoryFlagStore};
use crate::peers::relation::{PeerRelation, RelationId};
use crate::peers::unit::{UnitId, RECOGNIZED_ATTRIBUTES};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Channel buffer for `PeerRuntime::spawn`
pub const DEFAULT_BUFFER: usize = 64;

/// What the host observed on the peer relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RelationMessage {
    RelationCreated {
        relation_id: RelationId,
    },
    UnitJoined {
        unit: UnitId,
    },
    /// Full attribute snapshot from one peer. String values are taken
    /// verbatim; anything else is stored as its JSON text.
    UnitChanged {
        unit: UnitId,
        #[serde(default)]
        data: BTreeMap<String, Value>,
    },
    UnitDeparted {
        unit: UnitId,
    },
    RelationBroken,
}

pub struct PeerRuntime<F: FlagStore = MemoryFlagStore> {
    coordinator: MembershipCoordinator<F>,
}

impl<F: FlagStore> PeerRuntime<F> {
    pub fn new(coordinator: MembershipCoordinator<F>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &MembershipCoordinator<F> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut MembershipCoordinator<F> {
        &mut self.coordinator
    }

    pub fn into_coordinator(self) -> MembershipCoordinator<F> {
        self.coordinator
    }

    fn relation_mut(&mut self) -> Result<&mut PeerRelation> {
        let endpoint = self.coordinator.endpoint_mut();
        let name = endpoint.name().to_string();
        endpoint.peer_relation_mut().ok_or(Error::NoRelation(name))
    }

    /// Apply one message; returns the event dispatched, if any
    pub fn apply(&mut self, message: RelationMessage) -> Result<Option<PeerEvent>> {
        let event = match message {
            RelationMessage::RelationCreated { relation_id } => {
                self.coordinator.endpoint_mut().attach_relation(relation_id)?;
                None
            }
            RelationMessage::UnitJoined { unit } => {
                tracing::info!("Peer {} joined", unit);
                self.relation_mut()?.join(unit);
                Some(PeerEvent::Joined)
            }
            RelationMessage::UnitChanged { unit, data } => {
                let attributes = data
                    .into_iter()
                    .map(|(k, v)| (k, attribute_text(v)))
                    .collect();
                let peer = self
                    .relation_mut()?
                    .unit_mut(&unit)
                    .ok_or_else(|| Error::UnknownUnit(unit.to_string()))?;
                let changed = peer.update(attributes);
                tracing::debug!("Peer {} changed: {:?}", unit, changed);

                let endpoint_name = self.coordinator.endpoint().name().to_string();
                for key in changed
                    .iter()
                    .filter(|k| RECOGNIZED_ATTRIBUTES.iter().any(|attr| *attr == k.as_str()))
                {
                    let marker = changed_marker(&endpoint_name, key);
                    self.coordinator.flags_mut().set_flag(&marker);
                }
                Some(PeerEvent::Changed)
            }
            RelationMessage::UnitDeparted { unit } => {
                self.relation_mut()?
                    .depart(&unit)
                    .ok_or_else(|| Error::UnknownUnit(unit.to_string()))?;
                tracing::info!("Peer {} departed", unit);
                Some(PeerEvent::Departed)
            }
            RelationMessage::RelationBroken => {
                self.relation_mut()?;
                self.coordinator.handle(PeerEvent::Broken);
                self.coordinator.endpoint_mut().detach_relation();
                return Ok(Some(PeerEvent::Broken));
            }
        };

        if let Some(event) = event {
            self.coordinator.handle(event);
        }
        Ok(event)
    }

    /// Consume messages until the sender side closes
    pub async fn run(self, rx: mpsc::Receiver<RelationMessage>) -> Result<Self> {
        self.run_with(rx, |_, _| {}).await
    }

    /// Like `run`, reporting the flags after every applied message
    pub async fn run_with<O>(
        mut self,
        mut rx: mpsc::Receiver<RelationMessage>,
        mut observer: O,
    ) -> Result<Self>
    where
        O: FnMut(&RelationMessage, FlagSnapshot),
    {
        while let Some(message) = rx.recv().await {
            if let Err(e) = self.apply(message.clone()) {
                tracing::error!("Failed to apply {:?}: {}", message, e);
                return Err(e);
            }
            observer(&message, self.coordinator.snapshot());
        }
        tracing::info!("Relation channel closed, event loop stopping");
        Ok(self)
    }
}

impl<F: FlagStore + Send + 'static> PeerRuntime<F> {
    /// Run the event loop on its own task
    pub fn spawn(
        self,
        buffer: usize,
    ) -> (mpsc::Sender<RelationMessage>, JoinHandle<Result<Self>>) {
        let (tx, rx) = mpsc::channel(buffer);
        let handle = tokio::spawn(async move { self.run(rx).await });
        (tx, handle)
    }
}
