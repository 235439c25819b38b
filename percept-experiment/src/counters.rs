use serde::{Deserialize, Serialize};

/// Block and within-block trial numbering for one session.
///
/// Both counters are 1-based. Mutation is serialized by the caller's event
/// order; sharing one across threads needs external locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub block_number: u32,
    pub trial_number: u32,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self {
            block_number: 1,
            trial_number: 1,
        }
    }

    pub fn advance_trial(&mut self) {
        self.trial_number += 1;
    }

    /// Called once the block debrief has been shown.
    pub fn complete_block(&mut self) {
        self.block_number += 1;
        self.trial_number = 1;
    }

    /// Starts the next block under the same block number.
    pub fn restart_block(&mut self) {
        self.trial_number = 1;
    }
}

impl Default for SessionCounters {
    fn default() -> Self {
        Self::new()
    }
}
