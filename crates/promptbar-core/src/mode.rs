//! Top-level UI modes of the toolbar and the reducer that moves between them.
//!
//! [`UiMode::apply`] is pure: it updates the flags and returns the side effects
//! the caller must perform (plugin notifications, lifecycle reset, clearing the
//! current session's DOM context).
//!
//! Invariants kept by every transition:
//! - `dom_selector_active ⇒ ¬minimized`
//! - `prompt_creation_active ⇒ ¬minimized`
//! - `minimized ⇒` no prompt creation, DOM selector or search activity

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Visibility of the chat area.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatAreaState {
    #[default]
    Hidden,
    Compact,
    Normal,
}

/// Abstract UI actions, produced by hotkeys or UI controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Action {
    ExpandToolbar,
    MinimizeToolbar,
    StartPromptCreation,
    StopPromptCreation,
    ToggleDomSelector,
    StartDomSelector,
    StopDomSelector,
    CloseSearchResults,
    SetSearchActivated(bool),
    SetSearchResultsFocused(bool),
    SetChatAreaState(ChatAreaState),
}

/// Side effects requested by a mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEffect {
    NotifyPromptingStart,
    NotifyPromptingAbort,
    ResetLifecycle,
    ClearDomContext,
}

/// The toolbar's mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiMode {
    pub minimized: bool,
    pub prompt_creation_active: bool,
    pub dom_selector_active: bool,
    pub search_results_focused: bool,
    pub search_activated: bool,
    pub chat_area: ChatAreaState,
}

impl Default for UiMode {
    fn default() -> Self {
        Self {
            minimized: true,
            prompt_creation_active: false,
            dom_selector_active: false,
            search_results_focused: false,
            search_activated: false,
            chat_area: ChatAreaState::Hidden,
        }
    }
}

impl UiMode {
    /// An expanded toolbar with nothing active.
    pub fn expanded() -> Self {
        Self {
            minimized: false,
            ..Self::default()
        }
    }

    /// Applies `action` and returns the effects to run, in order.
    pub fn apply(&mut self, action: Action) -> Vec<ModeEffect> {
        let mut effects = Vec::new();
        match action {
            Action::ExpandToolbar => self.minimized = false,
            Action::MinimizeToolbar => {
                self.minimized = true;
                self.prompt_creation_active = false;
                self.dom_selector_active = false;
                self.search_activated = false;
                self.search_results_focused = false;
                self.chat_area = ChatAreaState::Hidden;
            }
            Action::StartPromptCreation => {
                // Prompt creation cannot coexist with a minimized toolbar.
                self.minimized = false;
                self.prompt_creation_active = true;
                if self.chat_area == ChatAreaState::Hidden {
                    self.chat_area = ChatAreaState::Compact;
                }
                effects.push(ModeEffect::NotifyPromptingStart);
            }
            Action::StopPromptCreation => self.stop_prompt_creation(&mut effects),
            Action::ToggleDomSelector => {
                if !self.minimized {
                    self.dom_selector_active = !self.dom_selector_active;
                }
            }
            Action::StartDomSelector => {
                if !self.minimized {
                    self.dom_selector_active = true;
                }
            }
            Action::StopDomSelector => self.dom_selector_active = false,
            Action::CloseSearchResults => {
                self.search_activated = false;
                self.search_results_focused = false;
            }
            Action::SetSearchActivated(activated) => {
                self.search_activated = activated && !self.minimized;
            }
            Action::SetSearchResultsFocused(focused) => {
                self.search_results_focused = focused && !self.minimized;
            }
            Action::SetChatAreaState(state) => {
                self.chat_area = state;
                if state == ChatAreaState::Hidden {
                    self.stop_prompt_creation(&mut effects);
                }
            }
        }
        effects
    }

    fn stop_prompt_creation(&mut self, effects: &mut Vec<ModeEffect>) {
        self.prompt_creation_active = false;
        self.dom_selector_active = false;
        self.search_activated = false;
        self.search_results_focused = false;
        if self.chat_area == ChatAreaState::Compact {
            self.chat_area = ChatAreaState::Hidden;
        }
        effects.push(ModeEffect::ResetLifecycle);
        effects.push(ModeEffect::ClearDomContext);
        effects.push(ModeEffect::NotifyPromptingAbort);
    }

    /// Checks the mode invariants.
    pub fn is_consistent(&self) -> bool {
        let busy = self.prompt_creation_active
            || self.dom_selector_active
            || self.search_activated
            || self.search_results_focused;
        !(self.minimized && busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn everything_active() -> UiMode {
        UiMode {
            minimized: false,
            prompt_creation_active: true,
            dom_selector_active: true,
            search_results_focused: true,
            search_activated: true,
            chat_area: ChatAreaState::Normal,
        }
    }

    #[test]
    fn test_minimize_clears_activity_from_any_state() {
        let starts = [
            UiMode::default(),
            UiMode::expanded(),
            everything_active(),
            UiMode {
                dom_selector_active: true,
                ..UiMode::expanded()
            },
        ];
        for mut mode in starts {
            let effects = mode.apply(Action::MinimizeToolbar);
            assert!(effects.is_empty());
            assert!(mode.minimized);
            assert!(!mode.prompt_creation_active);
            assert!(!mode.dom_selector_active);
            assert_eq!(mode.chat_area, ChatAreaState::Hidden);
            assert!(mode.is_consistent());
        }
    }

    #[test]
    fn test_start_prompt_creation_opens_compact_chat() {
        let mut mode = UiMode::expanded();
        let effects = mode.apply(Action::StartPromptCreation);
        assert!(mode.prompt_creation_active);
        assert_eq!(mode.chat_area, ChatAreaState::Compact);
        assert_eq!(effects, vec![ModeEffect::NotifyPromptingStart]);
    }

    #[test]
    fn test_start_prompt_creation_keeps_normal_chat() {
        let mut mode = UiMode {
            chat_area: ChatAreaState::Normal,
            ..UiMode::expanded()
        };
        mode.apply(Action::StartPromptCreation);
        assert_eq!(mode.chat_area, ChatAreaState::Normal);
    }

    #[test]
    fn test_stop_prompt_creation_resets_activity() {
        let mut mode = everything_active();
        mode.chat_area = ChatAreaState::Compact;
        let effects = mode.apply(Action::StopPromptCreation);

        assert!(!mode.prompt_creation_active);
        assert!(!mode.dom_selector_active);
        assert!(!mode.search_activated);
        assert!(!mode.search_results_focused);
        assert_eq!(mode.chat_area, ChatAreaState::Hidden);
        assert_eq!(
            effects,
            vec![
                ModeEffect::ResetLifecycle,
                ModeEffect::ClearDomContext,
                ModeEffect::NotifyPromptingAbort
            ]
        );
    }

    #[test]
    fn test_hiding_chat_area_stops_prompt_creation() {
        let mut mode = everything_active();
        let effects = mode.apply(Action::SetChatAreaState(ChatAreaState::Hidden));
        assert!(!mode.prompt_creation_active);
        assert_eq!(mode.chat_area, ChatAreaState::Hidden);
        assert!(effects.contains(&ModeEffect::NotifyPromptingAbort));
    }

    #[test]
    fn test_dom_selector_requires_expanded_toolbar() {
        let mut mode = UiMode::default();
        mode.apply(Action::ToggleDomSelector);
        mode.apply(Action::StartDomSelector);
        assert!(!mode.dom_selector_active);

        mode.apply(Action::ExpandToolbar);
        mode.apply(Action::ToggleDomSelector);
        assert!(mode.dom_selector_active);
        mode.apply(Action::ToggleDomSelector);
        assert!(!mode.dom_selector_active);
    }

    #[test]
    fn test_close_search_results() {
        let mut mode = everything_active();
        mode.apply(Action::CloseSearchResults);
        assert!(!mode.search_activated);
        assert!(!mode.search_results_focused);
        assert!(mode.dom_selector_active);
        assert!(mode.prompt_creation_active);
    }
}
