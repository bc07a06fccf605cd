//! Read-only views. Open to any sender.

use super::registry::Address;
use super::state::GovernanceState;
use crate::protocol::event::ProposalRecord;
use std::collections::BTreeMap;

/// Controllers in registry order.
pub fn controllers_snapshot(state: &GovernanceState) -> Vec<Address> {
    state.controllers.list().to_vec()
}

/// Open proposals keyed by name.
pub fn proposals_snapshot(state: &GovernanceState) -> BTreeMap<String, ProposalRecord> {
    state
        .proposals
        .iter()
        .map(|(name, proposal)| (name.clone(), ProposalRecord::from(proposal)))
        .collect()
}
