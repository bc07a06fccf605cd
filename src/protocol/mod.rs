//! Wire protocol: tagged messages in, notices and events out.

pub mod event;
pub mod message;
pub mod notice;
pub mod router;

pub use event::{ProposalEvent, ProposalRecord, Trigger};
pub use message::{Message, MessageError, Provenance, Tag};
pub use notice::{NoticeData, OutboundMessage, Outbox};
pub use router::{handle_message, replay, Action};
