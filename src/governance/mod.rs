//! Governance engine.
//!
//! Controllers propose, vote on, and revoke proposals; a proposal settles
//! once its tally crosses a majority threshold of the current controller
//! count. Controller-set changes re-evaluate every open proposal until
//! nothing else resolves.
//!
//! - Registry: who may act
//! - Store and sequencer: open proposals and their numbers
//! - Handlers: propose, vote, revoke, query
//! - Settlement and cascade: effects and their knock-on resolutions

pub mod cascade;
pub mod error;
pub mod executor;
pub mod proposal;
pub mod propose;
pub mod query;
pub mod registry;
pub mod revoke;
pub mod sequencer;
pub mod settlement;
pub mod state;
pub mod store;
pub mod threshold;
pub mod vote;

#[cfg(test)]
mod proptests;

pub use error::{ErrorKind, GovernanceError, GovernanceResult};
pub use executor::{execute_proposal, ControllerChange};
pub use proposal::{Proposal, ProposalAction, ProposalStatus, ProposalType, VoteChoice};
pub use propose::{handle_propose, validate_propose, ProposeRequest, ValidatedProposal};
pub use query::{controllers_snapshot, proposals_snapshot};
pub use registry::{Address, ControllerRegistry};
pub use revoke::{handle_revoke, RevokeRequest};
pub use sequencer::ProposalSequencer;
pub use settlement::{settle, Settlement};
pub use state::{GovernanceState, SCHEMA_VERSION};
pub use store::ProposalStore;
pub use threshold::{evaluate, fail_threshold, pass_threshold, Thresholds};
pub use vote::{handle_vote, parse_proposal_number, VoteRequest};
