//! Cancellation slots for in-flight LLM work.
//!
//! At most one run per slot is ever live: starting a new run first
//! cancels whatever the slot held. `Review` covers the streaming review;
//! `Operation` covers one-shot commit/PR generations. Quitting cancels
//! both so no background task outlives the terminal.

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Review,
    Operation,
}

#[derive(Debug, Default)]
pub struct Slots {
    review: Option<CancellationToken>,
    operation: Option<CancellationToken>,
}

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<CancellationToken> {
        match slot {
            Slot::Review => &mut self.review,
            Slot::Operation => &mut self.operation,
        }
    }

    /// Cancels whatever the slot currently holds and installs a fresh
    /// token for the next run. Returns the token to hand to the bridge.
    pub fn supersede(&mut self, slot: Slot) -> CancellationToken {
        let entry = self.slot_mut(slot);
        if let Some(old) = entry.take() {
            old.cancel();
        }
        let token = CancellationToken::new();
        *entry = Some(token.clone());
        token
    }

    /// Cancels the slot's run, if any, and leaves the slot empty.
    pub fn cancel(&mut self, slot: Slot) {
        if let Some(token) = self.slot_mut(slot).take() {
            token.cancel();
        }
    }

    /// Clears the slot without cancelling — for runs that finished on
    /// their own.
    pub fn finish(&mut self, slot: Slot) {
        self.slot_mut(slot).take();
    }

    pub fn is_active(&self, slot: Slot) -> bool {
        match slot {
            Slot::Review => self.review.is_some(),
            Slot::Operation => self.operation.is_some(),
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel(Slot::Review);
        self.cancel(Slot::Operation);
    }
}
