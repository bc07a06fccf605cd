//! Monotonic proposal numbers, starting at 1. Numbers are never reused,
//! including after revocation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSequencer {
    next: u64,
}

impl Default for ProposalSequencer {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl ProposalSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number the next allocation will return.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn allocate(&mut self) -> u64 {
        let number = self.next;
        self.next += 1;
        number
    }
}
