//! Proposal execution.
//!
//! Applies the effect of a passed proposal. Controller proposals mutate the
//! registry and report the change so the cascade can run; Eval proposals
//! emit one dispatch and never look at a response.

use super::error::{GovernanceError, GovernanceResult};
use super::proposal::{Proposal, ProposalAction};
use super::registry::Address;
use super::state::GovernanceState;
use crate::protocol::notice::Outbox;

/// A change to the controller set caused by an executed proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerChange {
    Added(Address),
    Removed(Address),
}

/// Execute a passed proposal.
///
/// Preconditions validated at propose time are re-checked here, because an
/// earlier settlement in the same cascade may have invalidated them. A
/// refused execution leaves the state untouched and the caller settles the
/// proposal as failed.
pub fn execute_proposal(
    state: &mut GovernanceState,
    proposal: &Proposal,
    outbox: &mut Outbox,
) -> GovernanceResult<Option<ControllerChange>> {
    match &proposal.action {
        ProposalAction::AddController { controller } => execute_add_controller(state, controller),
        ProposalAction::RemoveController { controller } => {
            execute_remove_controller(state, controller)
        }
        ProposalAction::Eval {
            target_process,
            code,
        } => {
            outbox.dispatch_eval(proposal.number, target_process, code);
            Ok(None)
        }
    }
}

fn execute_add_controller(
    state: &mut GovernanceState,
    controller: &Address,
) -> GovernanceResult<Option<ControllerChange>> {
    if state.controllers.contains(controller) {
        return Err(GovernanceError::ControllerExists);
    }

    state.controllers.add(controller.clone());
    Ok(Some(ControllerChange::Added(controller.clone())))
}

fn execute_remove_controller(
    state: &mut GovernanceState,
    controller: &Address,
) -> GovernanceResult<Option<ControllerChange>> {
    if !state.controllers.contains(controller) {
        return Err(GovernanceError::ControllerNotRecognized);
    }
    if state.controllers.count() == 1 {
        return Err(GovernanceError::LastController);
    }

    state.controllers.remove(controller);
    Ok(Some(ControllerChange::Removed(controller.clone())))
}
