//! Property tests over random message sequences.

use crate::governance::state::GovernanceState;
use crate::governance::threshold::evaluate;
use crate::protocol::message::Message;
use crate::protocol::router::{handle_message, replay};
use proptest::prelude::*;

const ADDRESSES: [&str; 5] = ["a", "b", "c", "d", "e"];

fn address() -> impl Strategy<Value = &'static str> {
    prop::sample::select(ADDRESSES.to_vec())
}

fn vote_token() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::of(prop::sample::select(vec!["yay", "nay", "Yay"]))
}

/// Any governance message a participant might send, valid or not.
fn message() -> impl Strategy<Value = Message> {
    prop_oneof![
        (address(), address(), vote_token(), any::<bool>()).prop_map(
            |(from, target, vote, add)| {
                let kind = if add { "Add-Controller" } else { "Remove-Controller" };
                let mut m = Message::new("", from, 0)
                    .with_tag("Action", "Propose")
                    .with_tag("Proposal-Type", kind)
                    .with_tag("Controller", target);
                if let Some(vote) = vote {
                    m = m.with_tag("Vote", vote);
                }
                m
            }
        ),
        (address(), 0u8..3, vote_token()).prop_map(|(from, code, vote)| {
            let mut m = Message::new("", from, 0)
                .with_tag("Action", "Propose")
                .with_tag("Proposal-Type", "Eval")
                .with_tag("Process-Id", "target")
                .with_data(format!("code-{code}"));
            if let Some(vote) = vote {
                m = m.with_tag("Vote", vote);
            }
            m
        }),
        (address(), 1u64..8, prop::sample::select(vec!["yay", "nay"])).prop_map(
            |(from, number, vote)| {
                Message::new("", from, 0)
                    .with_tag("Action", "Vote")
                    .with_tag("Proposal-Number", number.to_string())
                    .with_tag("Vote", vote)
            }
        ),
        (address(), 1u64..8).prop_map(|(from, number)| {
            Message::new("", from, 0)
                .with_tag("Action", "Revoke-Proposal")
                .with_tag("Proposal-Number", number.to_string())
        }),
    ]
}

/// Stamp ids and timestamps so every message in a sequence is distinct.
fn sequence() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(message(), 1..40).prop_map(|messages| {
        messages
            .into_iter()
            .enumerate()
            .map(|(i, mut m)| {
                m.id = format!("msg-{i}");
                m.timestamp = i as u64 + 1;
                m
            })
            .collect()
    })
}

fn initial_state() -> GovernanceState {
    GovernanceState::new(["a", "b", "c"]).unwrap()
}

proptest! {
    /// Votes are disjoint and only cast by current controllers; nothing
    /// left open could already be settled; the registry is never empty.
    #[test]
    fn prop_state_invariants_hold(messages in sequence()) {
        let mut state = initial_state();
        for message in &messages {
            handle_message(&mut state, message);

            prop_assert!(state.controllers.count() >= 1);
            let n = state.controllers.count();
            for (name, proposal) in state.proposals.iter() {
                prop_assert_eq!(name, &proposal.name);
                for voter in proposal.yays.keys() {
                    prop_assert!(!proposal.nays.contains_key(voter));
                    prop_assert!(state.controllers.contains(voter));
                }
                for voter in proposal.nays.keys() {
                    prop_assert!(state.controllers.contains(voter));
                }
                prop_assert!(!evaluate(proposal, n).is_terminal());
                prop_assert!(proposal.number < state.sequencer.peek());
            }
        }
    }

    /// Replaying the same sequence yields the same outputs and snapshot.
    #[test]
    fn prop_replay_is_deterministic(messages in sequence()) {
        let mut first = initial_state();
        let mut second = initial_state();

        let first_out = replay(&mut first, &messages);
        let second_out = replay(&mut second, &messages);

        prop_assert_eq!(first_out, second_out);
        prop_assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    }

    /// A rejected message leaves the state exactly as it was.
    #[test]
    fn prop_rejections_do_not_mutate(messages in sequence()) {
        let mut state = initial_state();
        for message in &messages {
            let before = state.clone();
            let outbox = handle_message(&mut state, message);
            let rejected = outbox
                .messages
                .first()
                .map(|reply| reply.tag("Error").is_some())
                .unwrap_or(false);
            if rejected {
                prop_assert_eq!(&state, &before);
                prop_assert!(outbox.events.is_empty());
                prop_assert_eq!(outbox.messages.len(), 1);
            }
        }
    }

    /// Every settlement broadcast reaches exactly the controllers registered
    /// after it, and each settled proposal emits exactly one event.
    #[test]
    fn prop_events_match_broadcasts(messages in sequence()) {
        let mut state = initial_state();
        for message in &messages {
            let outbox = handle_message(&mut state, message);
            for event in &outbox.events {
                if event.status.is_terminal() {
                    let copies = outbox
                        .messages
                        .iter()
                        .filter(|m| {
                            m.tag("Proposal-Number") == Some(event.proposal_number.to_string().as_str())
                                && m.action() != Some("Eval")
                                && m.event().map(|e| e == event).unwrap_or(false)
                        })
                        .count();
                    // One per controller, plus the sender's direct reply when
                    // the settlement was the handled proposal itself.
                    prop_assert!(copies >= event.controllers_count);
                    prop_assert!(copies <= event.controllers_count + 1);
                }
            }
        }
    }
}
