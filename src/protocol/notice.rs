//! Notice emission.
//!
//! Everything the engine says goes through an `Outbox`:
//! - Direct replies to the sender of the handled message
//! - Settlement broadcasts, one per controller registered at settlement time
//! - Fire-and-forget `Eval` dispatches to external processes
//! - Structured events for the history service
//!
//! The direct reply is always the first message produced for a request, even
//! though it is built last (it reflects the final tally).

use super::event::{ProposalEvent, ProposalRecord};
use super::message::Tag;
use crate::governance::error::GovernanceError;
use crate::governance::registry::{Address, ControllerRegistry};
use serde::Serialize;
use std::collections::BTreeMap;

pub const PROPOSE_NOTICE: &str = "Propose-Notice";
pub const INVALID_PROPOSE_NOTICE: &str = "Invalid-Propose-Notice";
pub const VOTE_NOTICE: &str = "Vote-Notice";
pub const INVALID_VOTE_NOTICE: &str = "Invalid-Vote-Notice";
pub const REVOKE_PROPOSAL_NOTICE: &str = "Revoke-Proposal-Notice";
pub const INVALID_REVOKE_PROPOSAL_NOTICE: &str = "Invalid-Revoke-Proposal-Notice";
pub const PROPOSAL_ACCEPTED_NOTICE: &str = "Proposal-Accepted-Notice";
pub const PROPOSAL_REJECTED_NOTICE: &str = "Proposal-Rejected-Notice";
pub const PROPOSAL_REVOKED_NOTICE: &str = "Proposal-Revoked-Notice";
pub const GET_CONTROLLERS_NOTICE: &str = "Get-Controllers-Notice";
pub const GET_PROPOSALS_NOTICE: &str = "Get-Proposals-Notice";
pub const EVAL_ACTION: &str = "Eval";

/// Typed message body. Serialized untagged, so each variant is the JSON the
/// recipient expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NoticeData {
    Event(Box<ProposalEvent>),
    Text(String),
    Controllers(Vec<Address>),
    Proposals(BTreeMap<String, ProposalRecord>),
}

/// Outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundMessage {
    pub target: String,
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NoticeData>,
}

impl OutboundMessage {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    pub fn action(&self) -> Option<&str> {
        self.tag("Action")
    }

    pub fn event(&self) -> Option<&ProposalEvent> {
        match &self.data {
            Some(NoticeData::Event(event)) => Some(event),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            Some(NoticeData::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// Messages and events produced while handling one inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outbox {
    pub messages: Vec<OutboundMessage>,
    pub events: Vec<ProposalEvent>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position at which a later reply will be inserted.
    pub fn mark(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.events.is_empty()
    }

    /// Reply to `to` with a proposal event, inserted at `mark`.
    pub fn reply_event_at(
        &mut self,
        mark: usize,
        to: &Address,
        action: &str,
        event: &ProposalEvent,
    ) {
        let message = OutboundMessage {
            target: to.to_string(),
            tags: proposal_tags(action, event),
            data: Some(NoticeData::Event(Box::new(event.clone()))),
        };
        self.messages.insert(mark.min(self.messages.len()), message);
    }

    /// Reply to `to` with a rejection, inserted at `mark`.
    pub fn reply_error_at(
        &mut self,
        mark: usize,
        to: &Address,
        action: &str,
        error: &GovernanceError,
        proposal_number: Option<&str>,
    ) {
        let text = error.to_string();
        let mut tags = vec![
            Tag::new("Action", action),
            Tag::new("Error", text.clone()),
            Tag::new("Error-Kind", error.kind().as_tag()),
        ];
        if let Some(number) = proposal_number {
            tags.push(Tag::new("Proposal-Number", number));
        }

        let message = OutboundMessage {
            target: to.to_string(),
            tags,
            data: Some(NoticeData::Text(text)),
        };
        self.messages.insert(mark.min(self.messages.len()), message);
    }

    /// Reply to `to` with a read-only snapshot.
    pub fn reply_data(&mut self, to: &Address, action: &str, data: NoticeData) {
        self.messages.push(OutboundMessage {
            target: to.to_string(),
            tags: vec![Tag::new("Action", action)],
            data: Some(data),
        });
    }

    /// One copy of `event` per registered controller, in registry order.
    pub fn broadcast(&mut self, controllers: &ControllerRegistry, action: &str, event: &ProposalEvent) {
        for controller in controllers.iter() {
            self.messages.push(OutboundMessage {
                target: controller.to_string(),
                tags: proposal_tags(action, event),
                data: Some(NoticeData::Event(Box::new(event.clone()))),
            });
        }
    }

    /// Fire-and-forget code dispatch to an external process.
    pub fn dispatch_eval(&mut self, proposal_number: u64, target_process: &str, code: &str) {
        self.messages.push(OutboundMessage {
            target: target_process.to_string(),
            tags: vec![
                Tag::new("Action", EVAL_ACTION),
                Tag::new("Proposal-Number", proposal_number.to_string()),
            ],
            data: Some(NoticeData::Text(code.to_string())),
        });
    }

    pub fn record(&mut self, event: ProposalEvent) {
        self.events.push(event);
    }

    /// Messages tagged with `action`, in emission order.
    pub fn with_action<'a>(&'a self, action: &'a str) -> impl Iterator<Item = &'a OutboundMessage> {
        self.messages
            .iter()
            .filter(move |m| m.action() == Some(action))
    }

    /// Messages addressed to `target`, in emission order.
    pub fn to<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a OutboundMessage> {
        self.messages.iter().filter(move |m| m.target == target)
    }
}

fn proposal_tags(action: &str, event: &ProposalEvent) -> Vec<Tag> {
    vec![
        Tag::new("Action", action),
        Tag::new("Proposal-Number", event.proposal_number.to_string()),
        Tag::new("Proposal-Type", event.proposal_type.as_str()),
        Tag::new("Proposal-Status", event.status.as_str()),
    ]
}
