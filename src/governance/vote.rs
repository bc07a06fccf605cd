//! Vote handler.

use super::cascade;
use super::error::{GovernanceError, GovernanceResult};
use super::proposal::VoteChoice;
use super::settlement::settle;
use super::state::GovernanceState;
use super::threshold::evaluate;
use crate::protocol::event::{ProposalEvent, Trigger};
use crate::protocol::message::{Message, Provenance};
use crate::protocol::notice::Outbox;
use tracing::{debug, info};

/// Raw vote fields as they arrive on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteRequest {
    pub proposal_number: Option<String>,
    pub vote: Option<String>,
}

impl VoteRequest {
    pub fn from_message(message: &Message) -> Self {
        Self {
            proposal_number: message.tag("Proposal-Number").map(str::to_string),
            vote: message.tag("Vote").map(str::to_string),
        }
    }
}

/// Parse a `Proposal-Number` tag: a base-10 integer >= 1, nothing else.
pub fn parse_proposal_number(raw: Option<&str>) -> GovernanceResult<u64> {
    let raw = raw.ok_or(GovernanceError::ProposalNumberRequired)?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GovernanceError::InvalidProposalNumber);
    }
    match raw.parse::<u64>() {
        Ok(number) if number >= 1 => Ok(number),
        _ => Err(GovernanceError::InvalidProposalNumber),
    }
}

/// Record a vote and resolve the proposal if the tally allows.
///
/// A repeated vote replaces the earlier one; the proposal is re-evaluated
/// either way.
pub fn handle_vote(
    state: &mut GovernanceState,
    request: &VoteRequest,
    provenance: &Provenance,
    outbox: &mut Outbox,
) -> GovernanceResult<ProposalEvent> {
    if !state.is_controller(&provenance.from) {
        return Err(GovernanceError::NotController);
    }
    let number = parse_proposal_number(request.proposal_number.as_deref())?;
    if state.proposals.get(number).is_none() {
        return Err(GovernanceError::ProposalNotFound);
    }
    let choice = request
        .vote
        .as_deref()
        .and_then(VoteChoice::parse)
        .ok_or(GovernanceError::InvalidVote)?;

    let n = state.controllers.count();
    let (outcome, previous) = {
        let proposal = state
            .proposals
            .get_mut(number)
            .ok_or(GovernanceError::ProposalNotFound)?;
        let previous = proposal.cast_vote(provenance.from.clone(), choice, provenance.timestamp);
        (evaluate(proposal, n), previous)
    };

    if let Some(previous) = previous {
        debug!(
            proposal = number,
            voter = %provenance.from,
            previous = previous.as_str(),
            "vote replaced"
        );
    }
    info!(
        proposal = number,
        voter = %provenance.from,
        vote = choice.as_str(),
        status = outcome.as_str(),
        "vote recorded"
    );

    if !outcome.is_terminal() {
        let proposal = state
            .proposals
            .get(number)
            .ok_or(GovernanceError::ProposalNotFound)?;
        let event = ProposalEvent::new(Trigger::Vote, proposal, outcome, state, provenance)
            .with_vote(Some(choice));
        outbox.record(event.clone());
        return Ok(event);
    }

    let proposal = state
        .proposals
        .remove(number)
        .ok_or(GovernanceError::ProposalNotFound)?;
    let settlement = settle(
        state,
        proposal,
        outcome,
        Trigger::Vote,
        Some(choice),
        provenance,
        outbox,
    );
    if let Some(change) = settlement.change {
        cascade::resolve(state, change, provenance, outbox);
    }
    Ok(settlement.event)
}
