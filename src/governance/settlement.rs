//! Proposal settlement.
//!
//! Shared by the propose and vote handlers and by the cascade. The caller has
//! already taken the proposal out of the store; settlement applies the
//! effect (if passed), broadcasts the outcome to every controller registered
//! after the effect, and records the event.

use super::executor::{execute_proposal, ControllerChange};
use super::proposal::{Proposal, ProposalStatus, VoteChoice};
use super::state::GovernanceState;
use crate::protocol::event::{ProposalEvent, Trigger};
use crate::protocol::message::Provenance;
use crate::protocol::notice::{Outbox, PROPOSAL_ACCEPTED_NOTICE, PROPOSAL_REJECTED_NOTICE};
use tracing::{info, warn};

/// Result of settling one proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub event: ProposalEvent,
    /// Set when the effect changed the controller set.
    pub change: Option<ControllerChange>,
}

/// Settle a proposal that evaluated to `Passed` or `Failed`.
///
/// The event's thresholds are the ones the tally was evaluated against; its
/// controller list is the registry after the effect. A passed proposal whose
/// effect is refused settles as `Failed` with a rejection reason.
pub fn settle(
    state: &mut GovernanceState,
    proposal: Proposal,
    outcome: ProposalStatus,
    trigger: Trigger,
    vote: Option<VoteChoice>,
    provenance: &Provenance,
    outbox: &mut Outbox,
) -> Settlement {
    debug_assert!(matches!(
        outcome,
        ProposalStatus::Passed | ProposalStatus::Failed
    ));

    let evaluated_against = state.thresholds();
    let (status, change, rejection_reason) = match outcome {
        ProposalStatus::Passed => match execute_proposal(state, &proposal, outbox) {
            Ok(change) => (ProposalStatus::Passed, change, None),
            Err(refusal) => {
                warn!(
                    proposal = proposal.number,
                    name = %proposal.name,
                    reason = %refusal,
                    "passed proposal could not be applied, rejecting"
                );
                (ProposalStatus::Failed, None, Some(refusal.to_string()))
            }
        },
        other => (other, None, None),
    };

    let mut event = ProposalEvent::new(trigger, &proposal, status, state, provenance).with_vote(vote);
    event.pass_threshold = evaluated_against.pass;
    event.fail_threshold = evaluated_against.fail;
    if let Some(reason) = rejection_reason {
        event = event.with_rejection_reason(reason);
    }

    let notice = if status == ProposalStatus::Passed {
        PROPOSAL_ACCEPTED_NOTICE
    } else {
        PROPOSAL_REJECTED_NOTICE
    };
    outbox.broadcast(&state.controllers, notice, &event);
    outbox.record(event.clone());

    info!(
        proposal = proposal.number,
        name = %proposal.name,
        status = status.as_str(),
        yays = proposal.yays_count(),
        nays = proposal.nays_count(),
        controllers = state.controllers.count(),
        "proposal settled"
    );

    Settlement { event, change }
}
