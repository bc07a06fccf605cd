//! Proposal model.
//!
//! A proposal is a closed sum over its action; each variant carries exactly
//! the payload it needs. Votes are kept as address -> timestamp maps ordered
//! by address, and an address is never in both maps.

use super::registry::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Proposal type tag as it appears in `Proposal-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalType {
    #[serde(rename = "Add-Controller")]
    AddController,
    #[serde(rename = "Remove-Controller")]
    RemoveController,
    #[serde(rename = "Eval")]
    Eval,
}

impl ProposalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalType::AddController => "Add-Controller",
            ProposalType::RemoveController => "Remove-Controller",
            ProposalType::Eval => "Eval",
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Add-Controller" => Ok(ProposalType::AddController),
            "Remove-Controller" => Ok(ProposalType::RemoveController),
            "Eval" => Ok(ProposalType::Eval),
            _ => Err(()),
        }
    }
}

/// A controller's ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yay,
    Nay,
}

impl VoteChoice {
    /// Exact token match: no trimming, no case folding.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "yay" => Some(VoteChoice::Yay),
            "nay" => Some(VoteChoice::Nay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteChoice::Yay => "yay",
            VoteChoice::Nay => "nay",
        }
    }
}

/// Proposal status. `Revoked` only appears on events, never as an
/// evaluation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Pending,
    Passed,
    Failed,
    Revoked,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "Pending",
            ProposalStatus::Passed => "Passed",
            ProposalStatus::Failed => "Failed",
            ProposalStatus::Revoked => "Revoked",
        }
    }
}

/// What a proposal does once it passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProposalAction {
    AddController { controller: Address },
    RemoveController { controller: Address },
    Eval { target_process: String, code: String },
}

impl ProposalAction {
    pub fn proposal_type(&self) -> ProposalType {
        match self {
            ProposalAction::AddController { .. } => ProposalType::AddController,
            ProposalAction::RemoveController { .. } => ProposalType::RemoveController,
            ProposalAction::Eval { .. } => ProposalType::Eval,
        }
    }

    /// Deduplication key, also used as the proposal's name.
    ///
    /// Controller proposals key on `type_controller`. Eval proposals key on
    /// the target plus a short digest of the code, so only identical
    /// dispatches collide.
    pub fn dedup_key(&self) -> String {
        match self {
            ProposalAction::AddController { controller }
            | ProposalAction::RemoveController { controller } => {
                format!("{}_{}", self.proposal_type(), controller)
            }
            ProposalAction::Eval {
                target_process,
                code,
            } => {
                let digest = hex::encode(Sha256::digest(code.as_bytes()));
                format!("Eval_{}_{}", target_process, &digest[..16])
            }
        }
    }

    pub fn controller(&self) -> Option<&Address> {
        match self {
            ProposalAction::AddController { controller }
            | ProposalAction::RemoveController { controller } => Some(controller),
            ProposalAction::Eval { .. } => None,
        }
    }

    pub fn target_process(&self) -> Option<&str> {
        match self {
            ProposalAction::Eval { target_process, .. } => Some(target_process),
            _ => None,
        }
    }
}

/// An open proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub number: u64,
    pub name: String,
    pub action: ProposalAction,
    pub proposer: Address,
    /// Id of the `Propose` message that created this proposal.
    pub msg_id: String,
    pub created_at: u64,
    /// Yay voters -> timestamp of their latest vote.
    pub yays: BTreeMap<Address, u64>,
    /// Nay voters -> timestamp of their latest vote.
    pub nays: BTreeMap<Address, u64>,
}

impl Proposal {
    pub fn new(
        number: u64,
        action: ProposalAction,
        proposer: Address,
        msg_id: String,
        created_at: u64,
    ) -> Self {
        Self {
            number,
            name: action.dedup_key(),
            action,
            proposer,
            msg_id,
            created_at,
            yays: BTreeMap::new(),
            nays: BTreeMap::new(),
        }
    }

    pub fn proposal_type(&self) -> ProposalType {
        self.action.proposal_type()
    }

    /// Record a vote, replacing any earlier vote by the same voter.
    ///
    /// Returns the voter's previous choice, if any.
    pub fn cast_vote(
        &mut self,
        voter: Address,
        choice: VoteChoice,
        timestamp: u64,
    ) -> Option<VoteChoice> {
        let previous = if self.yays.remove(&voter).is_some() {
            Some(VoteChoice::Yay)
        } else if self.nays.remove(&voter).is_some() {
            Some(VoteChoice::Nay)
        } else {
            None
        };

        match choice {
            VoteChoice::Yay => self.yays.insert(voter, timestamp),
            VoteChoice::Nay => self.nays.insert(voter, timestamp),
        };

        previous
    }

    /// Drop any vote cast by `voter`. Returns true if one was removed.
    pub fn strip_voter(&mut self, voter: &Address) -> bool {
        let yay = self.yays.remove(voter).is_some();
        let nay = self.nays.remove(voter).is_some();
        yay || nay
    }

    pub fn vote_of(&self, voter: &Address) -> Option<VoteChoice> {
        if self.yays.contains_key(voter) {
            Some(VoteChoice::Yay)
        } else if self.nays.contains_key(voter) {
            Some(VoteChoice::Nay)
        } else {
            None
        }
    }

    pub fn yays_count(&self) -> usize {
        self.yays.len()
    }

    pub fn nays_count(&self) -> usize {
        self.nays.len()
    }
}
