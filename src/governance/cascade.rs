//! Cascade resolution.
//!
//! Runs after any settlement that changed the controller set:
//! 1. On removal, strip the removed controller's votes from every open proposal
//! 2. Re-evaluate open proposals in ascending number order at the new count
//! 3. Settle the first one that became terminal; if that settlement changed
//!    the controller set again, go back to 1
//!
//! The loop only continues after a settlement, and every settlement removes a
//! proposal from a finite store that nothing else grows here, so it
//! terminates. When a full sweep ends without a controller change, every
//! remaining proposal is pending at the current count: the fixpoint.

use super::executor::ControllerChange;
use super::settlement::settle;
use super::state::GovernanceState;
use super::threshold::evaluate;
use crate::protocol::event::Trigger;
use crate::protocol::message::Provenance;
use crate::protocol::notice::Outbox;
use tracing::debug;

/// Drive all open proposals to a fixpoint after `change`.
///
/// Returns the numbers of the proposals settled, in settlement order.
pub fn resolve(
    state: &mut GovernanceState,
    change: ControllerChange,
    provenance: &Provenance,
    outbox: &mut Outbox,
) -> Vec<u64> {
    let mut settled = Vec::new();
    let mut pending_change = Some(change);

    while let Some(change) = pending_change.take() {
        if let ControllerChange::Removed(address) = &change {
            let touched = state.proposals.strip_voter(address);
            if !touched.is_empty() {
                debug!(controller = %address, proposals = ?touched, "stripped votes of removed controller");
            }
        }

        for number in state.proposals.numbers() {
            let n = state.controllers.count();
            let outcome = match state.proposals.get(number) {
                Some(proposal) => evaluate(proposal, n),
                None => continue,
            };
            if !outcome.is_terminal() {
                continue;
            }

            let Some(proposal) = state.proposals.remove(number) else {
                continue;
            };
            let settlement = settle(
                state,
                proposal,
                outcome,
                Trigger::Cascade,
                None,
                provenance,
                outbox,
            );
            settled.push(number);

            if settlement.change.is_some() {
                pending_change = settlement.change;
                break;
            }
        }
    }

    if !settled.is_empty() {
        debug!(settled = ?settled, "cascade reached fixpoint");
    }
    settled
}
