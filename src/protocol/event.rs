//! Structured proposal events.
//!
//! A `ProposalEvent` is emitted for every proposal state transition the
//! engine observes (creation, vote, settlement, revocation) and is carried as
//! the data of the corresponding notice. It is the only durable record an
//! external history service gets, so every field is self-contained: tally,
//! thresholds, the full controller list, and the provenance of the message
//! that caused it.

use super::message::Provenance;
use crate::governance::proposal::{
    Proposal, ProposalAction, ProposalStatus, ProposalType, VoteChoice,
};
use crate::governance::registry::Address;
use crate::governance::state::GovernanceState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What caused the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    Propose,
    Vote,
    #[serde(rename = "Revoke-Proposal")]
    RevokeProposal,
    /// Re-evaluation after a controller-set change.
    Cascade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalEvent {
    #[serde(rename = "Trigger")]
    pub trigger: Trigger,
    #[serde(rename = "Proposal-Number")]
    pub proposal_number: u64,
    #[serde(rename = "Proposal-Name")]
    pub proposal_name: String,
    #[serde(rename = "Proposal-Type")]
    pub proposal_type: ProposalType,
    #[serde(rename = "Proposer")]
    pub proposer: Address,
    #[serde(rename = "Controller", default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<Address>,
    #[serde(rename = "Process-Id", default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,
    /// The vote carried by the triggering message, if any.
    #[serde(rename = "Vote", default, skip_serializing_if = "Option::is_none")]
    pub vote: Option<VoteChoice>,
    #[serde(rename = "Yays")]
    pub yays: Vec<Address>,
    #[serde(rename = "Nays")]
    pub nays: Vec<Address>,
    #[serde(rename = "Yays-Count")]
    pub yays_count: usize,
    #[serde(rename = "Nays-Count")]
    pub nays_count: usize,
    #[serde(rename = "Pass-Threshold")]
    pub pass_threshold: usize,
    #[serde(rename = "Fail-Threshold")]
    pub fail_threshold: usize,
    #[serde(rename = "Controllers")]
    pub controllers: Vec<Address>,
    #[serde(rename = "Controllers-Count")]
    pub controllers_count: usize,
    #[serde(rename = "Proposal-Status")]
    pub status: ProposalStatus,
    #[serde(
        rename = "Rejection-Reason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rejection_reason: Option<String>,
    #[serde(rename = "From")]
    pub from: Address,
    #[serde(rename = "Timestamp")]
    pub timestamp: u64,
    #[serde(rename = "Message-Id")]
    pub message_id: String,
}

impl ProposalEvent {
    /// Snapshot `proposal` against the current controller set.
    pub fn new(
        trigger: Trigger,
        proposal: &Proposal,
        status: ProposalStatus,
        state: &GovernanceState,
        provenance: &Provenance,
    ) -> Self {
        let thresholds = state.thresholds();
        Self {
            trigger,
            proposal_number: proposal.number,
            proposal_name: proposal.name.clone(),
            proposal_type: proposal.proposal_type(),
            proposer: proposal.proposer.clone(),
            controller: proposal.action.controller().cloned(),
            process_id: proposal.action.target_process().map(str::to_string),
            vote: None,
            yays: proposal.yays.keys().cloned().collect(),
            nays: proposal.nays.keys().cloned().collect(),
            yays_count: proposal.yays_count(),
            nays_count: proposal.nays_count(),
            pass_threshold: thresholds.pass,
            fail_threshold: thresholds.fail,
            controllers: state.controllers.list().to_vec(),
            controllers_count: state.controllers.count(),
            status,
            rejection_reason: None,
            from: provenance.from.clone(),
            timestamp: provenance.timestamp,
            message_id: provenance.message_id.clone(),
        }
    }

    pub fn with_vote(mut self, vote: Option<VoteChoice>) -> Self {
        self.vote = vote;
        self
    }

    pub fn with_rejection_reason(mut self, reason: impl Into<String>) -> Self {
        self.rejection_reason = Some(reason.into());
        self
    }
}

/// `Get-Proposals` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRecord {
    pub proposal_number: u64,
    pub msg_id: String,
    #[serde(rename = "type")]
    pub proposal_type: ProposalType,
    pub proposer: Address,
    pub yays: BTreeMap<Address, u64>,
    pub nays: BTreeMap<Address, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_str: Option<String>,
    pub created_at: u64,
}

impl From<&Proposal> for ProposalRecord {
    fn from(proposal: &Proposal) -> Self {
        let (controller, process_id, eval_str) = match &proposal.action {
            ProposalAction::AddController { controller }
            | ProposalAction::RemoveController { controller } => {
                (Some(controller.clone()), None, None)
            }
            ProposalAction::Eval {
                target_process,
                code,
            } => (None, Some(target_process.clone()), Some(code.clone())),
        };

        Self {
            proposal_number: proposal.number,
            msg_id: proposal.msg_id.clone(),
            proposal_type: proposal.proposal_type(),
            proposer: proposal.proposer.clone(),
            yays: proposal.yays.clone(),
            nays: proposal.nays.clone(),
            controller,
            process_id,
            eval_str,
            created_at: proposal.created_at,
        }
    }
}
