//! Open-proposal store.
//!
//! Keyed by proposal name (the dedup key), so at most one open proposal
//! exists per key. Holds pending proposals only: a proposal is removed the
//! moment it resolves or is revoked.

use super::proposal::Proposal;
use super::registry::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalStore {
    proposals: BTreeMap<String, Proposal>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.proposals.contains_key(name)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Proposal> {
        self.proposals.get(name)
    }

    pub fn get(&self, number: u64) -> Option<&Proposal> {
        self.proposals.values().find(|p| p.number == number)
    }

    pub fn get_mut(&mut self, number: u64) -> Option<&mut Proposal> {
        self.proposals.values_mut().find(|p| p.number == number)
    }

    /// Insert a proposal whose name is not yet taken.
    pub fn insert(&mut self, proposal: Proposal) {
        debug_assert!(!self.contains_name(&proposal.name));
        self.proposals.insert(proposal.name.clone(), proposal);
    }

    pub fn remove(&mut self, number: u64) -> Option<Proposal> {
        let name = self.get(number)?.name.clone();
        self.proposals.remove(&name)
    }

    /// Open proposal numbers in ascending order.
    pub fn numbers(&self) -> Vec<u64> {
        let mut numbers: Vec<u64> = self.proposals.values().map(|p| p.number).collect();
        numbers.sort_unstable();
        numbers
    }

    /// Remove `voter`'s votes from every open proposal.
    ///
    /// Returns the numbers of the proposals that lost a vote.
    pub fn strip_voter(&mut self, voter: &Address) -> Vec<u64> {
        let mut touched: Vec<u64> = self
            .proposals
            .values_mut()
            .filter_map(|p| p.strip_voter(voter).then_some(p.number))
            .collect();
        touched.sort_unstable();
        touched
    }

    /// Proposals keyed by name, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Proposal)> {
        self.proposals.iter()
    }
}
