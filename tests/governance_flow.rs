//! End-to-end governance flows driven through the message router.
//!
//! Each test builds a council, feeds it tagged messages, and checks both the
//! resulting state and the notices/events the engine emitted.

use council::governance::{Address, GovernanceState, ProposalStatus, VoteChoice};
use council::protocol::notice::{
    GET_CONTROLLERS_NOTICE, INVALID_PROPOSE_NOTICE, INVALID_REVOKE_PROPOSAL_NOTICE,
    INVALID_VOTE_NOTICE, PROPOSAL_ACCEPTED_NOTICE, PROPOSAL_REJECTED_NOTICE,
    PROPOSAL_REVOKED_NOTICE, PROPOSE_NOTICE, REVOKE_PROPOSAL_NOTICE, VOTE_NOTICE,
};
use council::protocol::{handle_message, Message, NoticeData, Outbox, Trigger};

struct Council {
    state: GovernanceState,
    clock: u64,
}

impl Council {
    fn new(controllers: &[&str]) -> Self {
        Self {
            state: GovernanceState::new(controllers.iter().copied()).unwrap(),
            clock: 0,
        }
    }

    fn send(&mut self, message: Message) -> Outbox {
        handle_message(&mut self.state, &message)
    }

    fn message(&mut self, from: &str, action: &str) -> Message {
        self.clock += 1;
        Message::new(format!("msg-{}", self.clock), from, self.clock).with_tag("Action", action)
    }

    fn propose_controller(&mut self, from: &str, kind: &str, controller: &str, vote: Option<&str>) -> Outbox {
        let mut message = self
            .message(from, "Propose")
            .with_tag("Proposal-Type", kind)
            .with_tag("Controller", controller);
        if let Some(vote) = vote {
            message = message.with_tag("Vote", vote);
        }
        self.send(message)
    }

    fn propose_eval(&mut self, from: &str, target: &str, code: &str, vote: Option<&str>) -> Outbox {
        let mut message = self
            .message(from, "Propose")
            .with_tag("Proposal-Type", "Eval")
            .with_tag("Process-Id", target)
            .with_data(code);
        if let Some(vote) = vote {
            message = message.with_tag("Vote", vote);
        }
        self.send(message)
    }

    fn vote(&mut self, from: &str, number: u64, vote: &str) -> Outbox {
        let message = self
            .message(from, "Vote")
            .with_tag("Proposal-Number", number.to_string())
            .with_tag("Vote", vote);
        self.send(message)
    }

    fn revoke(&mut self, from: &str, number: u64) -> Outbox {
        let message = self
            .message(from, "Revoke-Proposal")
            .with_tag("Proposal-Number", number.to_string());
        self.send(message)
    }

    fn controllers(&self) -> Vec<&str> {
        self.state.controllers.iter().map(Address::as_str).collect()
    }
}

fn targets<'a>(outbox: &'a Outbox, action: &'a str) -> Vec<&'a str> {
    outbox.with_action(action).map(|m| m.target.as_str()).collect()
}

#[test]
fn test_single_controller_adds_second() {
    let mut council = Council::new(&["A"]);

    let outbox = council.propose_controller("A", "Add-Controller", "B", Some("yay"));

    assert_eq!(council.controllers(), vec!["A", "B"]);
    assert!(council.state.proposals.is_empty());

    let reply = &outbox.messages[0];
    assert_eq!(reply.target, "A");
    assert_eq!(reply.action(), Some(PROPOSE_NOTICE));
    assert_eq!(reply.tag("Proposal-Status"), Some("Passed"));
    assert_eq!(targets(&outbox, PROPOSAL_ACCEPTED_NOTICE), vec!["A", "B"]);

    let event = reply.event().unwrap();
    assert_eq!(event.pass_threshold, 1);
    assert_eq!(event.controllers_count, 2);
    assert_eq!(outbox.events.len(), 1);
}

#[test]
fn test_removal_rejected_by_single_nay() {
    let mut council = Council::new(&["A", "B"]);

    let outbox = council.propose_controller("A", "Remove-Controller", "B", None);
    let event = outbox.messages[0].event().unwrap();
    assert_eq!(event.status, ProposalStatus::Pending);
    assert_eq!(event.pass_threshold, 2);
    assert_eq!(event.fail_threshold, 1);

    let outbox = council.vote("B", 1, "nay");
    assert_eq!(outbox.messages[0].action(), Some(VOTE_NOTICE));
    assert_eq!(outbox.messages[0].tag("Proposal-Status"), Some("Failed"));
    assert_eq!(targets(&outbox, PROPOSAL_REJECTED_NOTICE), vec!["A", "B"]);
    assert_eq!(council.controllers(), vec!["A", "B"]);
    assert!(council.state.proposals.is_empty());
}

#[test]
fn test_removal_cascades_into_open_proposal() {
    let mut council = Council::new(&["A", "B", "C", "D", "E"]);

    // Proposal 1: Add F with yays {B, C}, nays {D, E}.
    council.propose_controller("B", "Add-Controller", "F", Some("yay"));
    council.vote("C", 1, "yay");
    council.vote("D", 1, "nay");
    let outbox = council.vote("E", 1, "nay");
    assert_eq!(outbox.messages[0].tag("Proposal-Status"), Some("Pending"));

    // Proposal 2: Remove B, passes on the third yay.
    council.propose_controller("A", "Remove-Controller", "B", Some("yay"));
    council.vote("C", 2, "yay");
    let outbox = council.vote("D", 2, "yay");

    assert_eq!(council.controllers(), vec!["A", "C", "D", "E"]);
    assert!(council.state.proposals.is_empty());

    let reply = &outbox.messages[0];
    assert_eq!(reply.target, "D");
    assert_eq!(reply.tag("Proposal-Number"), Some("2"));
    assert_eq!(reply.tag("Proposal-Status"), Some("Passed"));

    assert_eq!(outbox.events.len(), 2);
    let removal = &outbox.events[0];
    assert_eq!(removal.proposal_number, 2);
    assert_eq!(removal.trigger, Trigger::Vote);

    let cascaded = &outbox.events[1];
    assert_eq!(cascaded.proposal_number, 1);
    assert_eq!(cascaded.trigger, Trigger::Cascade);
    assert_eq!(cascaded.status, ProposalStatus::Failed);
    assert_eq!(cascaded.yays, vec![Address::from("C")]);
    assert_eq!(cascaded.nays_count, 2);
    assert_eq!(cascaded.fail_threshold, 2);
    assert_eq!(cascaded.vote, None);

    // B is gone, so it hears about neither settlement.
    assert_eq!(targets(&outbox, PROPOSAL_ACCEPTED_NOTICE), vec!["A", "C", "D", "E"]);
    assert_eq!(targets(&outbox, PROPOSAL_REJECTED_NOTICE), vec!["A", "C", "D", "E"]);
    assert!(outbox.to("B").next().is_none());
}

#[test]
fn test_eval_dispatched_once() {
    let mut council = Council::new(&["A"]);

    let outbox = council.propose_eval("A", "X", "do-thing", Some("yay"));

    let dispatches: Vec<_> = outbox.with_action("Eval").collect();
    assert_eq!(dispatches.len(), 1);
    assert_eq!(dispatches[0].target, "X");
    assert_eq!(dispatches[0].text(), Some("do-thing"));
    assert_eq!(dispatches[0].tag("Proposal-Number"), Some("1"));

    assert_eq!(outbox.messages[0].action(), Some(PROPOSE_NOTICE));
    assert_eq!(targets(&outbox, PROPOSAL_ACCEPTED_NOTICE), vec!["A"]);
    assert_eq!(council.controllers(), vec!["A"]);
}

#[test]
fn test_duplicate_proposals_are_rejected() {
    let mut council = Council::new(&["A", "B", "C"]);

    council.propose_controller("A", "Add-Controller", "D", Some("yay"));
    let first = council.state.proposals.get(1).unwrap().clone();
    let outbox = council.propose_controller("B", "Add-Controller", "D", Some("nay"));

    let reply = &outbox.messages[0];
    assert_eq!(reply.action(), Some(INVALID_PROPOSE_NOTICE));
    assert_eq!(reply.tag("Error"), Some("Proposal already exists"));
    assert_eq!(reply.tag("Error-Kind"), Some("Conflict"));
    assert_eq!(council.state.proposals.len(), 1);

    // The duplicate's vote does not leak into the open proposal's tally.
    let open = council.state.proposals.get(1).unwrap();
    assert_eq!(open.yays, first.yays);
    assert_eq!(open.nays, first.nays);
    assert_eq!(open.vote_of(&Address::from("A")), Some(VoteChoice::Yay));
    assert_eq!(open.vote_of(&Address::from("B")), None);
    assert_eq!(council.state.sequencer.peek(), 2);

    // Identical Eval is a duplicate; different code to the same target is not.
    council.propose_eval("A", "X", "one", None);
    let outbox = council.propose_eval("B", "X", "one", None);
    assert_eq!(outbox.messages[0].action(), Some(INVALID_PROPOSE_NOTICE));
    let outbox = council.propose_eval("B", "X", "two", None);
    assert_eq!(outbox.messages[0].action(), Some(PROPOSE_NOTICE));
    assert_eq!(council.state.proposals.len(), 3);
}

#[test]
fn test_last_vote_wins() {
    let mut council = Council::new(&["A", "B", "C"]);
    council.propose_controller("A", "Add-Controller", "D", None);

    council.vote("B", 1, "nay");
    let outbox = council.vote("B", 1, "yay");
    let event = outbox.messages[0].event().unwrap();
    assert_eq!(event.yays, vec![Address::from("B")]);
    assert!(event.nays.is_empty());
    assert_eq!(event.status, ProposalStatus::Pending);

    let outbox = council.vote("C", 1, "yay");
    assert_eq!(outbox.messages[0].tag("Proposal-Status"), Some("Passed"));
    assert_eq!(council.controllers(), vec!["A", "B", "C", "D"]);
}

#[test]
fn test_invalid_votes_leave_state_untouched() {
    let mut council = Council::new(&["A", "B", "C"]);
    council.propose_controller("A", "Add-Controller", "D", None);
    let before = council.state.clone();

    let cases = [
        ("Z", "1", "yay", "Sender is not a registered Controller!"),
        ("B", "0", "yay", "Proposal-Number must be a positive integer"),
        ("B", "7", "yay", "Proposal does not exist"),
        ("B", "1", "YAY", "A Vote of 'yay' or 'nay' is required"),
    ];
    for (from, number, vote, error) in cases {
        let message = council
            .message(from, "Vote")
            .with_tag("Proposal-Number", number)
            .with_tag("Vote", vote);
        let outbox = council.send(message);

        assert_eq!(outbox.messages.len(), 1, "case {error}");
        assert_eq!(outbox.messages[0].target, from);
        assert_eq!(outbox.messages[0].action(), Some(INVALID_VOTE_NOTICE));
        assert_eq!(outbox.messages[0].tag("Error"), Some(error));
        assert!(outbox.events.is_empty());
    }
    assert_eq!(council.state, before);
}

#[test]
fn test_revoke_by_proposer_only() {
    let mut council = Council::new(&["A", "B", "C"]);
    council.propose_eval("A", "X", "code", Some("yay"));

    let outbox = council.revoke("B", 1);
    assert_eq!(outbox.messages[0].action(), Some(INVALID_REVOKE_PROPOSAL_NOTICE));
    assert_eq!(
        outbox.messages[0].tag("Error"),
        Some("Only the proposer may revoke a Proposal")
    );
    assert_eq!(outbox.messages[0].tag("Error-Kind"), Some("Unauthorized"));

    let outbox = council.revoke("A", 1);
    assert_eq!(outbox.messages[0].action(), Some(REVOKE_PROPOSAL_NOTICE));
    assert_eq!(outbox.messages[0].tag("Proposal-Status"), Some("Revoked"));
    assert_eq!(targets(&outbox, PROPOSAL_REVOKED_NOTICE), vec!["A", "B", "C"]);
    assert!(outbox.with_action("Eval").next().is_none());
    assert!(council.state.proposals.is_empty());

    // A vote on the revoked number no longer finds it.
    let outbox = council.vote("B", 1, "yay");
    assert_eq!(outbox.messages[0].tag("Error"), Some("Proposal does not exist"));

    // The freed name can be proposed again, under a new number.
    let outbox = council.propose_eval("A", "X", "code", None);
    assert_eq!(outbox.messages[0].tag("Proposal-Number"), Some("2"));
}

#[test]
fn test_last_controller_cannot_be_removed() {
    let mut council = Council::new(&["A"]);

    let outbox = council.propose_controller("A", "Remove-Controller", "A", Some("yay"));
    assert_eq!(outbox.messages[0].action(), Some(INVALID_PROPOSE_NOTICE));
    assert_eq!(
        outbox.messages[0].tag("Error"),
        Some("Cannot remove the last Controller")
    );
    assert_eq!(council.controllers(), vec!["A"]);
}

#[test]
fn test_removal_that_would_empty_registry_settles_as_failed() {
    let mut council = Council::new(&["A", "B"]);

    council.propose_controller("A", "Remove-Controller", "B", Some("yay"));
    council.propose_controller("B", "Remove-Controller", "A", Some("yay"));

    // Proposal 2 passes and removes A; A's yay on proposal 1 is stripped.
    council.vote("A", 2, "yay");
    assert_eq!(council.controllers(), vec!["B"]);
    assert_eq!(council.state.proposals.get(1).unwrap().yays_count(), 0);

    // At n = 1 a single yay passes proposal 1, but B is the last controller.
    let outbox = council.vote("B", 1, "yay");
    let reply = &outbox.messages[0];
    assert_eq!(reply.action(), Some(VOTE_NOTICE));
    assert_eq!(reply.tag("Proposal-Status"), Some("Failed"));
    let event = reply.event().unwrap();
    assert_eq!(
        event.rejection_reason.as_deref(),
        Some("Cannot remove the last Controller")
    );
    assert_eq!(targets(&outbox, PROPOSAL_REJECTED_NOTICE), vec!["B"]);
    assert_eq!(council.controllers(), vec!["B"]);
    assert!(council.state.proposals.is_empty());
}

#[test]
fn test_removal_lowers_fail_threshold() {
    let mut council = Council::new(&["A", "B", "C"]);

    // 1: remove C (yays A). 2: remove B (yays A, C).
    council.propose_controller("A", "Remove-Controller", "C", Some("yay"));
    council.propose_controller("A", "Remove-Controller", "B", Some("yay"));
    council.vote("C", 2, "yay");

    // 2 passed at n = 3; registry {A, C}; 1 still open with yays {A}.
    assert_eq!(council.controllers(), vec!["A", "C"]);
    let open = council.state.proposals.get(1).unwrap();
    assert_eq!(open.yays_count(), 1);

    // C votes nay on its own removal: n = 2, fail threshold 1.
    let outbox = council.vote("C", 1, "nay");
    assert_eq!(outbox.messages[0].tag("Proposal-Status"), Some("Failed"));
    assert_eq!(council.controllers(), vec!["A", "C"]);
}

#[test]
fn test_queries() {
    let mut council = Council::new(&["A", "B"]);
    council.propose_controller("A", "Add-Controller", "C", Some("yay"));

    let message = council.message("outsider", "Get-Controllers");
    let outbox = council.send(message);
    assert_eq!(outbox.messages[0].target, "outsider");
    assert_eq!(outbox.messages[0].action(), Some(GET_CONTROLLERS_NOTICE));
    assert_eq!(
        outbox.messages[0].data,
        Some(NoticeData::Controllers(vec![Address::from("A"), Address::from("B")]))
    );

    let message = council.message("outsider", "Get-Proposals");
    let outbox = council.send(message);
    let json = serde_json::to_value(&outbox.messages[0]).unwrap();
    let record = &json["Data"]["Add-Controller_C"];
    assert_eq!(record["proposalNumber"], 1);
    assert_eq!(record["proposer"], "A");
    assert_eq!(record["controller"], "C");
    assert_eq!(record["msgId"], "msg-1");
    assert_eq!(record["yays"]["A"], 1);
    assert!(outbox.events.is_empty());
}
