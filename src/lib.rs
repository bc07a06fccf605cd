//! Council - Multi-Controller Governance Engine
//!
//! A set of controllers collectively decides, by majority vote, who else is
//! a controller and which code gets dispatched to external processes.
//!
//! Key principles:
//! - Single-threaded, message-at-a-time state machine
//! - Every handler validates fully before it mutates anything
//! - Controller-set changes re-evaluate open proposals to a fixpoint
//! - Deterministic: the same message sequence yields the same outputs and
//!   the same snapshot digest

pub mod governance;
pub mod observability;
pub mod protocol;
pub mod serialization;
