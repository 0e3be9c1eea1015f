//! Hotkey listener.
//!
//! Resolves key events against the live mode and dispatches the resulting
//! actions. Delayed steps are scheduled on the runtime so the caller is never
//! blocked by the settle delay.

use crate::mode_coordinator::ModeCoordinator;
use promptbar_core::hotkey::{KeyEvent, resolve};
use promptbar_core::mode::UiMode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub struct HotkeyListener {
    mode: watch::Receiver<UiMode>,
    coordinator: Arc<ModeCoordinator>,
    settle: Duration,
}

impl HotkeyListener {
    pub fn new(coordinator: Arc<ModeCoordinator>, settle: Duration) -> Self {
        Self {
            mode: coordinator.subscribe(),
            coordinator,
            settle,
        }
    }

    /// Handles one key-down event. Returns `true` when the event was consumed.
    pub async fn handle(&self, event: &KeyEvent) -> bool {
        let snapshot = *self.mode.borrow();
        let Some(resolution) = resolve(event, &snapshot, self.settle) else {
            return false;
        };

        tracing::debug!(
            target: "promptbar::mode",
            chord = %resolution.chord,
            steps = resolution.steps.len(),
            "[HotkeyListener] Chord matched"
        );

        for step in resolution.steps {
            if step.delay.is_zero() {
                self.coordinator.dispatch(step.action).await;
            } else {
                let coordinator = self.coordinator.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(step.delay).await;
                    coordinator.dispatch(step.action).await;
                });
            }
        }
        true
    }
}
