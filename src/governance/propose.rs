//! Propose handler.
//!
//! Validation is fail-fast and runs to completion before anything is
//! allocated, so a rejected proposal leaves no trace (not even a consumed
//! proposal number).

use super::cascade;
use super::error::{GovernanceError, GovernanceResult};
use super::proposal::{Proposal, ProposalAction, ProposalType, VoteChoice};
use super::registry::Address;
use super::settlement::settle;
use super::state::GovernanceState;
use super::threshold::evaluate;
use crate::protocol::event::{ProposalEvent, Trigger};
use crate::protocol::message::{Message, Provenance};
use crate::protocol::notice::Outbox;
use tracing::info;

/// Raw propose fields as they arrive on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposeRequest {
    pub proposal_type: Option<String>,
    pub controller: Option<String>,
    pub process_id: Option<String>,
    pub code: Option<String>,
    pub vote: Option<String>,
}

impl ProposeRequest {
    pub fn from_message(message: &Message) -> Self {
        Self {
            proposal_type: message.tag("Proposal-Type").map(str::to_string),
            controller: message.tag("Controller").map(str::to_string),
            process_id: message.tag("Process-Id").map(str::to_string),
            code: message.data.clone(),
            vote: message.tag("Vote").map(str::to_string),
        }
    }
}

/// A request that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProposal {
    pub action: ProposalAction,
    pub vote: Option<VoteChoice>,
}

/// Check a propose request against the current state without mutating it.
pub fn validate_propose(
    state: &GovernanceState,
    proposer: &Address,
    request: &ProposeRequest,
) -> GovernanceResult<ValidatedProposal> {
    if !state.is_controller(proposer) {
        return Err(GovernanceError::NotController);
    }

    let proposal_type = request
        .proposal_type
        .as_deref()
        .and_then(|raw| raw.parse::<ProposalType>().ok())
        .ok_or(GovernanceError::InvalidProposalType)?;

    let action = match proposal_type {
        ProposalType::AddController => {
            let controller = required_controller(request)?;
            if state.controllers.contains(&controller) {
                return Err(GovernanceError::ControllerExists);
            }
            ProposalAction::AddController { controller }
        }
        ProposalType::RemoveController => {
            let controller = required_controller(request)?;
            if !state.controllers.contains(&controller) {
                return Err(GovernanceError::ControllerNotRecognized);
            }
            if state.controllers.count() == 1 {
                return Err(GovernanceError::LastController);
            }
            ProposalAction::RemoveController { controller }
        }
        ProposalType::Eval => {
            let target_process = match request.process_id.as_deref() {
                None => return Err(GovernanceError::ProcessIdRequired),
                Some("") => return Err(GovernanceError::ProcessIdEmpty),
                Some(raw) if raw.trim().is_empty() => {
                    return Err(GovernanceError::ProcessIdWhitespace)
                }
                Some(raw) => raw.to_string(),
            };
            let code = match request.code.as_deref() {
                Some(code) if !code.is_empty() => code.to_string(),
                _ => return Err(GovernanceError::EvalStringRequired),
            };
            ProposalAction::Eval {
                target_process,
                code,
            }
        }
    };

    let vote = match request.vote.as_deref() {
        None => None,
        Some(raw) => Some(VoteChoice::parse(raw).ok_or(GovernanceError::InvalidInitialVote)?),
    };

    if state.proposals.contains_name(&action.dedup_key()) {
        return Err(GovernanceError::ProposalExists);
    }

    Ok(ValidatedProposal { action, vote })
}

fn required_controller(request: &ProposeRequest) -> GovernanceResult<Address> {
    match request.controller.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Ok(Address::from(raw)),
        _ => Err(GovernanceError::ControllerRequired),
    }
}

/// Create a proposal and resolve it as far as the current tally allows.
///
/// Returns the event the proposer's `Propose-Notice` carries: `Pending` when
/// the proposal stays open, otherwise the settlement event.
pub fn handle_propose(
    state: &mut GovernanceState,
    request: &ProposeRequest,
    provenance: &Provenance,
    outbox: &mut Outbox,
) -> GovernanceResult<ProposalEvent> {
    let validated = validate_propose(state, &provenance.from, request)?;

    let number = state.sequencer.allocate();
    let mut proposal = Proposal::new(
        number,
        validated.action,
        provenance.from.clone(),
        provenance.message_id.clone(),
        provenance.timestamp,
    );
    if let Some(choice) = validated.vote {
        proposal.cast_vote(provenance.from.clone(), choice, provenance.timestamp);
    }

    info!(
        proposal = number,
        name = %proposal.name,
        proposer = %provenance.from,
        vote = validated.vote.map(|v| v.as_str()),
        "proposal created"
    );

    let outcome = evaluate(&proposal, state.controllers.count());
    if !outcome.is_terminal() {
        let event = ProposalEvent::new(Trigger::Propose, &proposal, outcome, state, provenance)
            .with_vote(validated.vote);
        state.proposals.insert(proposal);
        outbox.record(event.clone());
        return Ok(event);
    }

    let settlement = settle(
        state,
        proposal,
        outcome,
        Trigger::Propose,
        validated.vote,
        provenance,
        outbox,
    );
    if let Some(change) = settlement.change {
        cascade::resolve(state, change, provenance, outbox);
    }
    Ok(settlement.event)
}
