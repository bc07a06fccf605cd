//! Message routing.
//!
//! One inbound message in, one `Outbox` out. The router owns the
//! `Invalid-*-Notice` mapping; handlers only return errors. Unknown or missing
//! actions are ignored without a reply.

use super::message::Message;
use super::notice::{
    NoticeData, Outbox, GET_CONTROLLERS_NOTICE, GET_PROPOSALS_NOTICE, INVALID_PROPOSE_NOTICE,
    INVALID_REVOKE_PROPOSAL_NOTICE, INVALID_VOTE_NOTICE, PROPOSE_NOTICE, REVOKE_PROPOSAL_NOTICE,
    VOTE_NOTICE,
};
use crate::governance::propose::{handle_propose, ProposeRequest};
use crate::governance::query::{controllers_snapshot, proposals_snapshot};
use crate::governance::revoke::{handle_revoke, RevokeRequest};
use crate::governance::state::GovernanceState;
use crate::governance::vote::{handle_vote, VoteRequest};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info_span, warn};

/// Actions the engine answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Propose,
    Vote,
    RevokeProposal,
    GetControllers,
    GetProposals,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Propose => "Propose",
            Action::Vote => "Vote",
            Action::RevokeProposal => "Revoke-Proposal",
            Action::GetControllers => "Get-Controllers",
            Action::GetProposals => "Get-Proposals",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Propose" => Ok(Action::Propose),
            "Vote" => Ok(Action::Vote),
            "Revoke-Proposal" => Ok(Action::RevokeProposal),
            "Get-Controllers" => Ok(Action::GetControllers),
            "Get-Proposals" => Ok(Action::GetProposals),
            _ => Err(()),
        }
    }
}

/// Handle one message against `state`.
///
/// Rejections leave `state` untouched. The direct reply, when there is one,
/// is the first message in the returned outbox.
pub fn handle_message(state: &mut GovernanceState, message: &Message) -> Outbox {
    let mut outbox = Outbox::new();

    let Some(action) = message.action().and_then(|raw| raw.parse::<Action>().ok()) else {
        debug!(
            id = %message.id,
            from = %message.from,
            action = message.action(),
            "ignoring message without a governance action"
        );
        return outbox;
    };

    let span = info_span!("handle_message", action = action.as_str(), id = %message.id, from = %message.from);
    let _guard = span.enter();

    let provenance = message.provenance();
    let mark = outbox.mark();

    match action {
        Action::Propose => {
            let request = ProposeRequest::from_message(message);
            match handle_propose(state, &request, &provenance, &mut outbox) {
                Ok(event) => outbox.reply_event_at(mark, &message.from, PROPOSE_NOTICE, &event),
                Err(error) => {
                    warn!(error = %error, kind = error.kind().as_tag(), "propose rejected");
                    outbox.reply_error_at(mark, &message.from, INVALID_PROPOSE_NOTICE, &error, None);
                }
            }
        }
        Action::Vote => {
            let request = VoteRequest::from_message(message);
            match handle_vote(state, &request, &provenance, &mut outbox) {
                Ok(event) => outbox.reply_event_at(mark, &message.from, VOTE_NOTICE, &event),
                Err(error) => {
                    warn!(error = %error, kind = error.kind().as_tag(), "vote rejected");
                    outbox.reply_error_at(
                        mark,
                        &message.from,
                        INVALID_VOTE_NOTICE,
                        &error,
                        request.proposal_number.as_deref(),
                    );
                }
            }
        }
        Action::RevokeProposal => {
            let request = RevokeRequest::from_message(message);
            match handle_revoke(state, &request, &provenance, &mut outbox) {
                Ok(event) => {
                    outbox.reply_event_at(mark, &message.from, REVOKE_PROPOSAL_NOTICE, &event)
                }
                Err(error) => {
                    warn!(error = %error, kind = error.kind().as_tag(), "revoke rejected");
                    outbox.reply_error_at(
                        mark,
                        &message.from,
                        INVALID_REVOKE_PROPOSAL_NOTICE,
                        &error,
                        request.proposal_number.as_deref(),
                    );
                }
            }
        }
        Action::GetControllers => outbox.reply_data(
            &message.from,
            GET_CONTROLLERS_NOTICE,
            NoticeData::Controllers(controllers_snapshot(state)),
        ),
        Action::GetProposals => outbox.reply_data(
            &message.from,
            GET_PROPOSALS_NOTICE,
            NoticeData::Proposals(proposals_snapshot(state)),
        ),
    }

    outbox
}

/// Apply `messages` in order, collecting every outbox.
pub fn replay<'a, I>(state: &mut GovernanceState, messages: I) -> Vec<Outbox>
where
    I: IntoIterator<Item = &'a Message>,
{
    messages
        .into_iter()
        .map(|message| handle_message(state, message))
        .collect()
}
