//! Quorum thresholds.
//!
//! - pass(n) = floor(n/2) + 1
//! - fail(n) = n - pass(n) + 1
//! - pass(n) + fail(n) = n + 1, so a proposal can never be both

use super::proposal::{Proposal, ProposalStatus};
use serde::{Deserialize, Serialize};

/// Minimum yays to enact a proposal among `n` controllers.
pub fn pass_threshold(n: usize) -> usize {
    n / 2 + 1
}

/// Minimum nays to reject a proposal among `n` controllers.
pub fn fail_threshold(n: usize) -> usize {
    (n + 1).saturating_sub(pass_threshold(n))
}

/// Both thresholds for a controller count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub pass: usize,
    pub fail: usize,
}

impl Thresholds {
    pub fn for_controllers(n: usize) -> Self {
        Self {
            pass: pass_threshold(n),
            fail: fail_threshold(n),
        }
    }
}

/// Evaluate a proposal's tally against `n` controllers.
///
/// Pass is checked before fail. Never returns `Revoked`.
pub fn evaluate(proposal: &Proposal, n: usize) -> ProposalStatus {
    let thresholds = Thresholds::for_controllers(n);
    if proposal.yays_count() >= thresholds.pass {
        ProposalStatus::Passed
    } else if proposal.nays_count() >= thresholds.fail {
        ProposalStatus::Failed
    } else {
        ProposalStatus::Pending
    }
}
