//! Hotkey resolution.
//!
//! Maps a raw key event to the actions it should trigger, given the current
//! [`UiMode`]. Resolution has no side effects: it returns a schedule of actions
//! and the caller dispatches them.
//!
//! Chords, checked in this order (first match wins):
//!
//! | Chord              | Behavior                                                      |
//! |--------------------|---------------------------------------------------------------|
//! | `Alt+.`            | open prompt creation (expanding first), else toggle selector  |
//! | `Cmd/Ctrl+Alt+.`   | open prompt creation and then the selector, else toggle       |
//! | `Escape`           | close the innermost active thing                              |

use crate::mode::{Action, UiMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::Display;

/// Key identity, independent of modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Period,
    Escape,
    Char(char),
    Other(String),
}

/// A key-down event from the input device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            alt: false,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

/// The recognized chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Chord {
    #[strum(serialize = "Alt+.")]
    AltPeriod,
    #[strum(serialize = "Cmd+Alt+.")]
    CmdAltPeriod,
    #[strum(serialize = "Esc")]
    Escape,
}

impl Chord {
    /// Chords in resolution priority order.
    pub const ALL: [Chord; 3] = [Chord::AltPeriod, Chord::CmdAltPeriod, Chord::Escape];

    pub fn matches(self, event: &KeyEvent) -> bool {
        let command = event.ctrl || event.meta;
        match self {
            Chord::AltPeriod => event.key == Key::Period && event.alt && !command,
            Chord::CmdAltPeriod => event.key == Key::Period && event.alt && command,
            Chord::Escape => event.key == Key::Escape,
        }
    }
}

/// An action to dispatch after `delay` from the moment the event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAction {
    pub delay: Duration,
    pub action: Action,
}

impl ScheduledAction {
    pub fn now(action: Action) -> Self {
        Self {
            delay: Duration::ZERO,
            action,
        }
    }

    pub fn after(delay: Duration, action: Action) -> Self {
        Self { delay, action }
    }
}

/// Result of a matched chord. The event is consumed even when `steps` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyResolution {
    pub chord: Chord,
    pub steps: Vec<ScheduledAction>,
}

/// Resolves `event` against `mode`.
///
/// Returns `None` when no chord matches (the event is not consumed).
/// `settle` is the delay that lets the expand transition finish before the
/// follow-up action runs.
pub fn resolve(event: &KeyEvent, mode: &UiMode, settle: Duration) -> Option<HotkeyResolution> {
    let chord = Chord::ALL.into_iter().find(|c| c.matches(event))?;

    let steps = match chord {
        Chord::AltPeriod => {
            if mode.minimized {
                vec![
                    ScheduledAction::now(Action::ExpandToolbar),
                    ScheduledAction::after(settle, Action::StartPromptCreation),
                ]
            } else if !mode.prompt_creation_active {
                vec![ScheduledAction::now(Action::StartPromptCreation)]
            } else {
                vec![ScheduledAction::now(Action::ToggleDomSelector)]
            }
        }
        Chord::CmdAltPeriod => {
            if !mode.prompt_creation_active {
                let mut steps = Vec::with_capacity(3);
                if mode.minimized {
                    steps.push(ScheduledAction::now(Action::ExpandToolbar));
                }
                steps.push(ScheduledAction::now(Action::StartPromptCreation));
                steps.push(ScheduledAction::after(settle, Action::StartDomSelector));
                steps
            } else {
                vec![ScheduledAction::now(Action::ToggleDomSelector)]
            }
        }
        Chord::Escape => {
            let action = if mode.search_results_focused {
                Some(Action::CloseSearchResults)
            } else if mode.dom_selector_active {
                Some(Action::StopDomSelector)
            } else if mode.prompt_creation_active {
                Some(Action::StopPromptCreation)
            } else if !mode.minimized {
                Some(Action::MinimizeToolbar)
            } else {
                None
            };
            action.map(ScheduledAction::now).into_iter().collect()
        }
    };

    Some(HotkeyResolution { chord, steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ChatAreaState;

    const SETTLE: Duration = Duration::from_millis(100);

    fn alt_period() -> KeyEvent {
        KeyEvent::new(Key::Period).with_alt()
    }

    fn cmd_alt_period() -> KeyEvent {
        KeyEvent::new(Key::Period).with_alt().with_meta()
    }

    fn escape() -> KeyEvent {
        KeyEvent::new(Key::Escape)
    }

    fn actions(resolution: &HotkeyResolution) -> Vec<Action> {
        resolution.steps.iter().map(|s| s.action).collect()
    }

    #[test]
    fn test_unrelated_key_is_not_consumed() {
        let mode = UiMode::expanded();
        assert!(resolve(&KeyEvent::new(Key::Char('a')).with_alt(), &mode, SETTLE).is_none());
        assert!(resolve(&KeyEvent::new(Key::Period), &mode, SETTLE).is_none());
    }

    #[test]
    fn test_alt_period_when_minimized_expands_then_starts() {
        let resolution = resolve(&alt_period(), &UiMode::default(), SETTLE).unwrap();
        assert_eq!(resolution.chord, Chord::AltPeriod);
        assert_eq!(
            resolution.steps,
            vec![
                ScheduledAction::now(Action::ExpandToolbar),
                ScheduledAction::after(SETTLE, Action::StartPromptCreation),
            ]
        );
    }

    #[test]
    fn test_alt_period_when_expanded_starts_prompt_creation() {
        let resolution = resolve(&alt_period(), &UiMode::expanded(), SETTLE).unwrap();
        assert_eq!(actions(&resolution), vec![Action::StartPromptCreation]);
    }

    #[test]
    fn test_alt_period_when_prompting_toggles_selector() {
        let mode = UiMode {
            prompt_creation_active: true,
            chat_area: ChatAreaState::Compact,
            ..UiMode::expanded()
        };
        let resolution = resolve(&alt_period(), &mode, SETTLE).unwrap();
        assert_eq!(actions(&resolution), vec![Action::ToggleDomSelector]);
    }

    #[test]
    fn test_ctrl_alt_period_matches_command_chord() {
        let event = KeyEvent::new(Key::Period).with_alt().with_ctrl();
        let resolution = resolve(&event, &UiMode::expanded(), SETTLE).unwrap();
        assert_eq!(resolution.chord, Chord::CmdAltPeriod);
    }

    #[test]
    fn test_cmd_alt_period_when_minimized() {
        let resolution = resolve(&cmd_alt_period(), &UiMode::default(), SETTLE).unwrap();
        assert_eq!(
            resolution.steps,
            vec![
                ScheduledAction::now(Action::ExpandToolbar),
                ScheduledAction::now(Action::StartPromptCreation),
                ScheduledAction::after(SETTLE, Action::StartDomSelector),
            ]
        );
    }

    #[test]
    fn test_cmd_alt_period_when_expanded_skips_expand() {
        let resolution = resolve(&cmd_alt_period(), &UiMode::expanded(), SETTLE).unwrap();
        assert_eq!(
            actions(&resolution),
            vec![Action::StartPromptCreation, Action::StartDomSelector]
        );
    }

    #[test]
    fn test_cmd_alt_period_when_prompting_toggles() {
        let mode = UiMode {
            prompt_creation_active: true,
            dom_selector_active: true,
            ..UiMode::expanded()
        };
        let resolution = resolve(&cmd_alt_period(), &mode, SETTLE).unwrap();
        assert_eq!(actions(&resolution), vec![Action::ToggleDomSelector]);
    }

    #[test]
    fn test_escape_closes_search_results_first() {
        let mode = UiMode {
            search_results_focused: true,
            dom_selector_active: true,
            prompt_creation_active: true,
            ..UiMode::expanded()
        };
        let resolution = resolve(&escape(), &mode, SETTLE).unwrap();
        assert_eq!(actions(&resolution), vec![Action::CloseSearchResults]);

        let mut after = mode;
        for step in &resolution.steps {
            after.apply(step.action);
        }
        assert!(!after.search_results_focused);
        assert!(after.dom_selector_active);
        assert!(after.prompt_creation_active);
    }

    #[test]
    fn test_escape_priority_chain() {
        let selector = UiMode {
            dom_selector_active: true,
            prompt_creation_active: true,
            ..UiMode::expanded()
        };
        assert_eq!(
            actions(&resolve(&escape(), &selector, SETTLE).unwrap()),
            vec![Action::StopDomSelector]
        );

        let prompting = UiMode {
            prompt_creation_active: true,
            ..UiMode::expanded()
        };
        assert_eq!(
            actions(&resolve(&escape(), &prompting, SETTLE).unwrap()),
            vec![Action::StopPromptCreation]
        );

        assert_eq!(
            actions(&resolve(&escape(), &UiMode::expanded(), SETTLE).unwrap()),
            vec![Action::MinimizeToolbar]
        );
    }

    #[test]
    fn test_escape_when_minimized_is_consumed_without_action() {
        let resolution = resolve(&escape(), &UiMode::default(), SETTLE).unwrap();
        assert_eq!(resolution.chord, Chord::Escape);
        assert!(resolution.steps.is_empty());
    }
}
