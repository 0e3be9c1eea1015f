//! Prompt lifecycle state.
//!
//! `PromptLifecycle` is the single slot holding the state of the active prompt
//! submission (`idle → loading → success|error → idle`). It is created once by
//! whoever wires the toolbar together and passed by reference to the components
//! that need it.
//!
//! Each accepted submission gets a [`SubmissionTicket`]. Transitions made with a
//! ticket only apply while that ticket is still the active one; starting a newer
//! submission or calling [`PromptLifecycle::reset`] supersedes it and cancels its
//! token, so delayed callbacks and late bridge responses of the old submission
//! cannot touch newer state.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use strum::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Observable state of the prompt lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PromptState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Identity of one accepted submission.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    generation: u64,
    token: CancellationToken,
}

impl SubmissionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancelled once the submission is superseded.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
struct ActiveSubmission {
    generation: u64,
    token: CancellationToken,
}

/// The global prompt lifecycle slot.
#[derive(Debug)]
pub struct PromptLifecycle {
    state: watch::Sender<PromptState>,
    active: Mutex<ActiveSubmission>,
}

impl PromptLifecycle {
    /// Creates a lifecycle in `Idle`.
    pub fn new() -> Self {
        let (state, _) = watch::channel(PromptState::Idle);
        Self {
            state,
            active: Mutex::new(ActiveSubmission {
                generation: 0,
                token: CancellationToken::new(),
            }),
        }
    }

    pub fn state(&self) -> PromptState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<PromptState> {
        self.state.subscribe()
    }

    /// Starts a submission and moves to `Loading`.
    ///
    /// Returns `None` while another submission is `Loading`. Any previous
    /// submission still in its display window is superseded.
    pub fn try_begin(&self) -> Option<SubmissionTicket> {
        let mut active = self.lock();
        if self.state() == PromptState::Loading {
            tracing::debug!(
                target: "promptbar::lifecycle",
                "[PromptLifecycle] Submission rejected, another one is loading"
            );
            return None;
        }

        active.token.cancel();
        active.generation += 1;
        active.token = CancellationToken::new();
        self.publish(PromptState::Loading);

        Some(SubmissionTicket {
            generation: active.generation,
            token: active.token.clone(),
        })
    }

    /// True while `ticket` belongs to the active submission.
    pub fn is_current(&self, ticket: &SubmissionTicket) -> bool {
        self.lock().generation == ticket.generation && !ticket.is_cancelled()
    }

    /// Moves to `next` on behalf of `ticket`. Returns `false` (and changes
    /// nothing) when the ticket has been superseded.
    pub fn transition(&self, ticket: &SubmissionTicket, next: PromptState) -> bool {
        let active = self.lock();
        if active.generation != ticket.generation || ticket.is_cancelled() {
            tracing::debug!(
                target: "promptbar::lifecycle",
                generation = ticket.generation,
                state = %next,
                "[PromptLifecycle] Stale transition discarded"
            );
            return false;
        }
        self.publish(next);
        true
    }

    /// Forces the lifecycle back to `Idle` and supersedes the active submission.
    ///
    /// Outstanding work of that submission is not aborted; its results are
    /// discarded when they arrive.
    pub fn reset(&self) {
        let mut active = self.lock();
        active.token.cancel();
        active.generation += 1;
        active.token = CancellationToken::new();
        self.publish(PromptState::Idle);
    }

    fn publish(&self, next: PromptState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::info!(
                target: "promptbar::lifecycle",
                from = %previous,
                to = %next,
                "[PromptLifecycle] State changed"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, ActiveSubmission> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PromptLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
