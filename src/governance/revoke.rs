//! Revoke-Proposal handler.
//!
//! Only the proposer can withdraw an open proposal. Revocation never changes
//! the controller set, so no cascade follows.

use super::error::{GovernanceError, GovernanceResult};
use super::proposal::ProposalStatus;
use super::state::GovernanceState;
use super::vote::parse_proposal_number;
use crate::protocol::event::{ProposalEvent, Trigger};
use crate::protocol::message::{Message, Provenance};
use crate::protocol::notice::{Outbox, PROPOSAL_REVOKED_NOTICE};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevokeRequest {
    pub proposal_number: Option<String>,
}

impl RevokeRequest {
    pub fn from_message(message: &Message) -> Self {
        Self {
            proposal_number: message.tag("Proposal-Number").map(str::to_string),
        }
    }
}

pub fn handle_revoke(
    state: &mut GovernanceState,
    request: &RevokeRequest,
    provenance: &Provenance,
    outbox: &mut Outbox,
) -> GovernanceResult<ProposalEvent> {
    if !state.is_controller(&provenance.from) {
        return Err(GovernanceError::NotController);
    }
    let number = parse_proposal_number(request.proposal_number.as_deref())?;
    let proposal = state
        .proposals
        .get(number)
        .ok_or(GovernanceError::ProposalNotFound)?;
    if proposal.proposer != provenance.from {
        return Err(GovernanceError::NotProposer);
    }

    let proposal = state
        .proposals
        .remove(number)
        .ok_or(GovernanceError::ProposalNotFound)?;
    let event = ProposalEvent::new(
        Trigger::RevokeProposal,
        &proposal,
        ProposalStatus::Revoked,
        state,
        provenance,
    );
    outbox.broadcast(&state.controllers, PROPOSAL_REVOKED_NOTICE, &event);
    outbox.record(event.clone());

    info!(proposal = number, name = %proposal.name, "proposal revoked");
    Ok(event)
}
