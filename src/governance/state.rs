//! Governance state.
//!
//! The single mutable value every handler receives:
//! - Controllers: insertion-ordered registry
//! - Proposals: open proposals keyed by name
//! - Sequencer: next proposal number
//!
//! Snapshots are CBOR; identical message sequences produce identical bytes
//! and therefore identical digests.

use super::error::{GovernanceError, GovernanceResult};
use super::registry::{Address, ControllerRegistry};
use super::sequencer::ProposalSequencer;
use super::store::ProposalStore;
use super::threshold::Thresholds;
use crate::serialization::{cbor_digest, from_cbor, to_cbor, SerializationError};
use serde::{Deserialize, Serialize};

/// Current snapshot schema.
pub const SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceState {
    pub controllers: ControllerRegistry,
    pub proposals: ProposalStore,
    pub sequencer: ProposalSequencer,

    /// Schema version for evolution.
    #[serde(default = "default_schema_version")]
    pub schema_version: u64,
}

fn default_schema_version() -> u64 {
    SCHEMA_VERSION
}

impl GovernanceState {
    /// Create a state seeded with the initial controllers.
    ///
    /// Duplicates are collapsed, keeping first-seen order. At least one
    /// controller is required. Blank addresses are refused.
    pub fn new<I, A>(initial_controllers: I) -> GovernanceResult<Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<Address>,
    {
        let mut controllers = ControllerRegistry::new();
        for address in initial_controllers {
            let address = address.into();
            if address.as_str().trim().is_empty() {
                return Err(GovernanceError::InvalidController);
            }
            if !controllers.contains(&address) {
                controllers.add(address);
            }
        }

        if controllers.is_empty() {
            return Err(GovernanceError::NoControllers);
        }

        Ok(Self {
            controllers,
            proposals: ProposalStore::new(),
            sequencer: ProposalSequencer::new(),
            schema_version: SCHEMA_VERSION,
        })
    }

    /// Thresholds for the current controller count.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::for_controllers(self.controllers.count())
    }

    pub fn is_controller(&self, address: &Address) -> bool {
        self.controllers.contains(address)
    }

    /// Serialize to CBOR bytes for snapshot storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        to_cbor(self)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        from_cbor(bytes)
    }

    /// Hex SHA-256 of the CBOR snapshot.
    pub fn digest(&self) -> Result<String, SerializationError> {
        cbor_digest(self)
    }
}
